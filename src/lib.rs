//! Nota UI Language Compiler
//!
//! Compiles Nota component trees into a standalone HTML document with its
//! stylesheet and the scripts that drive loops, states and delegated events.
//!
//! # Features
//!
//! - Reusable `Item` templates with overrides and deep `child.prop` overrides
//! - Namespaced imports (`import ui.button as ui`, `package`, `export`)
//! - Compile-time expression folding with `calc()` fallback
//! - Conditionals, loops over runtime data, and per-element states
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use notac::{compile_file, Result};
//!
//! fn main() -> Result<()> {
//!     compile_file("app.nota", "app.html")?;
//!     Ok(())
//! }
//! ```
//!
//! # Compilation Pipeline
//!
//! 1. **Lexer & Parser**: tokenize, build the AST, register templates
//! 2. **Semantic**: resolve imports into the component registry
//! 3. **Code Generator**: merge overrides, evaluate, emit HTML/CSS/JS
//! 4. **Document**: assemble the final page with the runtime prelude

pub mod cli;
pub mod compiler;
pub mod core;
pub mod error;
pub mod utils;

use serde::Serialize;
use std::fs;
use std::time::Instant;

pub use cli::EnhancedCli;
pub use compiler::backend::codegen::{CodeGenerator, GeneratedOutput};
pub use compiler::backend::document::{assemble_document, DocumentOptions};
pub use compiler::frontend::ast::Program;
pub use compiler::frontend::parse_source;
pub use compiler::middle_end::registry::ComponentRegistry;
pub use error::{CompilerError, Result};

/// Compiler version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Compiler build information
pub const BUILD_INFO: CompilerInfo = CompilerInfo {
    version: VERSION,
    name: NAME,
    description: DESCRIPTION,
    supported_features: &[
        "templates",
        "deep-overrides",
        "imports",
        "packages",
        "expressions",
        "conditionals",
        "loops",
        "states",
        "delegates",
        "structs",
    ],
};

#[derive(Debug, Clone)]
pub struct CompilerInfo {
    pub version: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub supported_features: &'static [&'static str],
}

/// Where element declarations are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleMode {
    /// One generated class per element, rules collected in the stylesheet
    #[default]
    Stylesheet,
    /// `style="..."` attributes on every element
    Inline,
}

/// Compilation options and settings
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Enable debug logging of pipeline phases
    pub debug_mode: bool,

    pub style_mode: StyleMode,

    /// `<title>` of the assembled document
    pub document_title: String,

    /// Whether to ship the `NotaComponent` runtime with the document
    pub emit_runtime: bool,

    /// Extra directories searched for imports
    pub search_paths: Vec<String>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            debug_mode: false,
            style_mode: StyleMode::Stylesheet,
            document_title: DocumentOptions::default().title,
            emit_runtime: true,
            search_paths: Vec::new(),
        }
    }
}

impl CompilerOptions {
    pub fn document_options(&self) -> DocumentOptions {
        DocumentOptions {
            title: self.document_title.clone(),
            emit_runtime: self.emit_runtime,
        }
    }
}

/// Compilation statistics and metrics
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompilationStats {
    /// Original source size in bytes
    pub source_size: u64,

    /// Size of the written output in bytes
    pub output_size: u64,

    pub element_count: usize,

    /// Templates in the registry after imports
    pub template_count: usize,

    /// Imported files loaded, counting each file once
    pub import_count: usize,

    pub loop_count: usize,
    pub conditional_count: usize,
    pub stateful_count: usize,

    /// Skipped imports and ignored constructs
    pub warnings: Vec<String>,

    /// Compilation time in milliseconds
    pub compile_time_ms: u64,
}

/// Main compiler entry point with default options
pub fn compile_file(input_path: &str, output_path: &str) -> Result<CompilationStats> {
    compile_file_with_options(input_path, output_path, CompilerOptions::default())
}

/// Compile a file and write the assembled document to `output_path`
pub fn compile_file_with_options(
    input_path: &str,
    output_path: &str,
    options: CompilerOptions,
) -> Result<CompilationStats> {
    let start_time = Instant::now();

    if options.debug_mode {
        log::info!("{} v{}", NAME, VERSION);
        log::info!("Compiling '{}' to '{}'...", input_path, output_path);
        log::debug!("Compiler options: {:?}", options);
    }

    let (document, mut stats) = compile_document(input_path, &options)?;
    fs::write(output_path, &document)?;
    stats.compile_time_ms = start_time.elapsed().as_millis() as u64;

    if options.debug_mode {
        log::info!("Compilation successful!");
        log::info!("Source size: {} bytes", stats.source_size);
        log::info!("Output size: {} bytes", stats.output_size);
        log::info!("Compile time: {}ms", stats.compile_time_ms);
        log::debug!("Full stats: {:?}", stats);
    }

    Ok(stats)
}

/// Compile a file into a complete HTML document without writing it
pub fn compile_document(input_path: &str, options: &CompilerOptions) -> Result<(String, CompilationStats)> {
    let source = fs::read_to_string(input_path).map_err(|e| CompilerError::FileNotFound {
        path: format!("{}: {}", input_path, e),
    })?;

    let (output, mut stats) = compiler::compile_with_options(&source, input_path, options)?;
    let document = assemble_document(&output, &options.document_options());
    stats.output_size = document.len() as u64;

    Ok((document, stats))
}

/// Compile Nota source to HTML, CSS and JS fragments with default options
pub fn compile_source(source: &str, filename: &str) -> Result<GeneratedOutput> {
    let (output, _stats) = compile_source_with_options(source, filename, CompilerOptions::default())?;
    Ok(output)
}

/// Compile Nota source to fragments with custom options
pub fn compile_source_with_options(
    source: &str,
    filename: &str,
    options: CompilerOptions,
) -> Result<(GeneratedOutput, CompilationStats)> {
    compiler::compile_with_options(source, filename, &options)
}

pub fn supports_feature(feature: &str) -> bool {
    BUILD_INFO.supported_features.contains(&feature)
}

pub fn build_info() -> &'static CompilerInfo {
    &BUILD_INFO
}
