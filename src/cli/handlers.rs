// FILE: src/cli/handlers.rs
use crate::core::constants::SOURCE_EXTENSION;
use crate::{compile_document, CompilationStats, CompilerError, CompilerOptions, Result};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Instant;

const STDOUT_TARGET: &str = "-";

// --- COMPILE ---
pub fn handle_compile_command(cli: &super::EnhancedCli, matches: &clap::ArgMatches) -> Result<()> {
    let input_path = required_input(matches)?;
    let output_path = match matches.get_one::<String>("output") {
        Some(path) => path.clone(),
        None => default_output_path(input_path, cli.output_directory()),
    };

    let options = cli.build_compiler_options(matches);

    if matches.get_flag("watch") {
        watch_and_compile(input_path, &output_path, options)
    } else {
        compile_single_file(input_path, &output_path, &options, matches.get_flag("stats"))?;
        log::debug!("Finished in {}ms", cli.elapsed_ms());
        Ok(())
    }
}

fn required_input(matches: &clap::ArgMatches) -> Result<&str> {
    matches
        .get_one::<String>("input")
        .map(String::as_str)
        .ok_or_else(|| CompilerError::InvalidFormat {
            message: "No input file given".to_string(),
        })
}

/// `app.nota` becomes `app.html`, inside `output_directory` when configured
fn default_output_path(input_path: &str, output_directory: Option<&str>) -> String {
    let html = Path::new(input_path).with_extension("html");
    let path = match (output_directory, html.file_name()) {
        (Some(dir), Some(name)) => PathBuf::from(dir).join(name),
        _ => html,
    };
    path.to_string_lossy().into_owned()
}

fn compile_once(input_path: &str, output_path: &str, options: &CompilerOptions) -> Result<CompilationStats> {
    let start = Instant::now();
    let (document, mut stats) = compile_document(input_path, options)?;

    if output_path == STDOUT_TARGET {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(document.as_bytes())?;
        stdout.flush()?;
    } else {
        if let Some(parent) = Path::new(output_path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(output_path, &document)?;
    }

    stats.compile_time_ms = start.elapsed().as_millis() as u64;
    Ok(stats)
}

fn compile_single_file(input_path: &str, output_path: &str, options: &CompilerOptions, show_stats: bool) -> Result<()> {
    let to_stdout = output_path == STDOUT_TARGET;
    if !to_stdout {
        println!("🔨 Compiling {} -> {}", input_path, output_path);
    }

    let stats = compile_once(input_path, output_path, options)?;

    for warning in &stats.warnings {
        eprintln!("⚠️  {}", warning);
    }

    if !to_stdout {
        println!("✅ Compilation successful!");
        println!("   Output: {} bytes", stats.output_size);
        println!("   Time: {}ms", stats.compile_time_ms);
    }

    if show_stats {
        print_detailed_stats(&stats)?;
    }

    Ok(())
}

fn print_detailed_stats(stats: &CompilationStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats).map_err(|e| CompilerError::InvalidFormat {
        message: format!("JSON serialization error: {}", e),
    })?;
    eprintln!("{}", json);
    Ok(())
}

fn watch_and_compile(input_path: &str, output_path: &str, options: CompilerOptions) -> Result<()> {
    println!("👀 Watching {} for changes...", input_path);

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                if let Err(e) = tx.send(event) {
                    eprintln!("Watch error: {}", e);
                }
            }
        },
        notify::Config::default(),
    )
    .map_err(|e| watch_error("Failed to create file watcher", e))?;

    // Watch the directory so imported siblings trigger a rebuild too
    let watch_root = match Path::new(input_path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    watcher
        .watch(&watch_root, RecursiveMode::Recursive)
        .map_err(|e| watch_error("Failed to watch directory", e))?;

    match compile_once(input_path, output_path, &options) {
        Ok(_) => println!("✅ Initial compilation successful"),
        Err(e) => eprintln!("❌ Initial compilation failed: {}", e),
    }

    let output = fs::canonicalize(output_path).ok();
    loop {
        match rx.recv() {
            Ok(event) => {
                let is_source = event.paths.iter().any(|path| {
                    Some(path) != output.as_ref()
                        && path.extension().map_or(false, |ext| ext == SOURCE_EXTENSION)
                });
                if !is_source {
                    continue;
                }
                println!("🔄 File changed, recompiling...");
                match compile_once(input_path, output_path, &options) {
                    Ok(stats) => println!(
                        "✅ Recompiled successfully ({} bytes, {}ms)",
                        stats.output_size, stats.compile_time_ms
                    ),
                    Err(e) => eprintln!("❌ Compilation failed: {}", e),
                }
            }
            Err(e) => {
                eprintln!("Watch error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

fn watch_error(context: &str, error: notify::Error) -> CompilerError {
    CompilerError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("{}: {}", context, error),
    ))
}

// --- CHECK ---
pub fn handle_check_command(cli: &super::EnhancedCli, matches: &clap::ArgMatches) -> Result<()> {
    let input_path = required_input(matches)?;
    let options = cli.base_options();

    if matches.get_flag("recursive") && Path::new(input_path).is_dir() {
        check_directory_recursive(input_path, &options)
    } else {
        check_single_file(input_path, &options).map(|_| ())
    }
}

/// Returns the number of warnings reported for the file
fn check_single_file(input_path: &str, options: &CompilerOptions) -> Result<usize> {
    println!("🔍 Checking {}", input_path);
    match compile_document(input_path, options) {
        Ok((_, stats)) if stats.warnings.is_empty() => {
            println!("✅ {} - No issues found", input_path);
            Ok(0)
        }
        Ok((_, stats)) => {
            for warning in &stats.warnings {
                println!("⚠️  {} - {}", input_path, warning);
            }
            Ok(stats.warnings.len())
        }
        Err(e) => {
            println!("❌ {} - {}", input_path, e);
            Err(e)
        }
    }
}

fn check_directory_recursive(dir_path: &str, options: &CompilerOptions) -> Result<()> {
    let mut total_files = 0;
    let mut error_files = 0;
    let mut warning_count = 0;

    for entry in walkdir::WalkDir::new(dir_path) {
        let entry = entry.map_err(|e| {
            CompilerError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Directory traversal error: {}", e),
            ))
        })?;
        let is_source = entry.file_type().is_file()
            && entry.path().extension().map_or(false, |ext| ext == SOURCE_EXTENSION);
        if !is_source {
            continue;
        }

        total_files += 1;
        match check_single_file(&entry.path().to_string_lossy(), options) {
            Ok(warnings) => warning_count += warnings,
            Err(_) => error_files += 1,
        }
    }

    println!("\n📊 Check Summary:");
    println!("   Total files: {}", total_files);
    println!("   Files with errors: {}", error_files);
    println!("   Warnings: {}", warning_count);

    if error_files > 0 {
        Err(CompilerError::InvalidFormat {
            message: format!("{} files have errors", error_files),
        })
    } else {
        Ok(())
    }
}
