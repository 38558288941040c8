// FILE: src/compiler/middle_end/mod.rs

pub mod evaluator;
pub mod registry;
pub mod scope;
