// FILE: src/compiler/mod.rs

// The main "compiler" module. Orchestrates the pipeline from source to output.

pub mod backend;
pub mod frontend;
pub mod middle_end;

use crate::compiler::backend::codegen::{CodeGenerator, GeneratedOutput};
use crate::compiler::frontend::semantic::SemanticAnalyzer;
use crate::compiler::middle_end::registry::ComponentRegistry;
use crate::error::Result;
use crate::{CompilationStats, CompilerOptions};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Run the full pipeline over one source text.
///
/// `filename` anchors relative imports and seeds the visited set, so a file
/// importing itself (directly or through a cycle) is only loaded once.
pub fn compile_with_options(
    source: &str,
    filename: &str,
    options: &CompilerOptions,
) -> Result<(GeneratedOutput, CompilationStats)> {
    let start_time = Instant::now();

    if options.debug_mode {
        log::debug!("Starting compilation pipeline for {}", filename);
        log::debug!("Source length: {} characters", source.len());
    }

    // STAGE 1: PARSING (Frontend)
    // Definitions register as they are parsed, so later instances clone them.
    let mut registry = ComponentRegistry::new();
    let program = frontend::parse_source(source, filename, &mut registry)?;

    if options.debug_mode {
        log::debug!(
            "Parsed {} statements, {} local templates",
            program.statements.len(),
            registry.len()
        );
    }

    // STAGE 2: IMPORT RESOLUTION (Frontend)
    let path = Path::new(filename);
    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut visited = HashSet::new();
    if let Ok(canonical) = path.canonicalize() {
        visited.insert(canonical);
    }

    let search_paths = options.search_paths.iter().map(PathBuf::from).collect();
    let mut analyzer = SemanticAnalyzer::new(&mut registry, base_dir).with_search_paths(search_paths);
    analyzer.analyze(&program, &mut visited)?;
    let import_count = analyzer.imports_processed();
    let mut warnings = analyzer.warnings().to_vec();

    if options.debug_mode {
        log::debug!("Resolved {} imports; registry holds {} templates", import_count, registry.len());
    }

    // STAGE 3: CODE GENERATION (Backend)
    let mut generator = CodeGenerator::new(&registry, options);
    let output = generator.generate(&program)?;
    let generation = generator.stats();
    warnings.extend(generation.warnings.iter().cloned());

    let stats = CompilationStats {
        source_size: source.len() as u64,
        output_size: (output.html.len() + output.css.len() + output.js.len()) as u64,
        element_count: generation.element_count,
        template_count: registry.len(),
        import_count,
        loop_count: generation.loop_count,
        conditional_count: generation.conditional_count,
        stateful_count: generation.stateful_count,
        warnings,
        compile_time_ms: start_time.elapsed().as_millis() as u64,
    };

    if options.debug_mode {
        log::debug!("Generation complete in {}ms", stats.compile_time_ms);
    }

    Ok((output, stats))
}
