// FILE: src/compiler/backend/mod.rs

pub mod codegen;
pub mod document;
pub mod runtime;
pub mod style;
