// FILE: src/compiler/frontend/mod.rs

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod semantic;

use crate::compiler::middle_end::registry::ComponentRegistry;
use crate::error::Result;
use ast::Program;
use lexer::Lexer;
use parser::Parser;

/// Lex and parse one source text. Template definitions land in `registry`.
pub fn parse_source(source: &str, filename: &str, registry: &mut ComponentRegistry) -> Result<Program> {
    let tokens = Lexer::new(source, filename).tokenize()?;
    let mut parser = Parser::new(tokens, registry, filename);
    parser.parse()
}
