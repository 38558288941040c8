// FILE: src/cli/mod.rs

mod config;
mod handlers;

use crate::error::Result;
use crate::{CompilerOptions, StyleMode};
use clap::{Arg, ArgAction, Command};
use std::time::Instant;

pub struct EnhancedCli {
    config: config::ConfigFile,
    start_time: Instant,
}

impl Default for EnhancedCli {
    fn default() -> Self {
        Self::new()
    }
}

impl EnhancedCli {
    pub fn new() -> Self {
        Self {
            config: config::ConfigFile::default(),
            start_time: Instant::now(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.start_time = Instant::now();
        let matches = self.build_cli().get_matches();

        if let Some(config_path) = matches.get_one::<String>("config") {
            self.config = config::load(config_path)?;
        }

        self.setup_logging(matches.get_count("verbose"));

        match matches.subcommand() {
            Some(("compile", sub_matches)) => handlers::handle_compile_command(self, sub_matches),
            Some(("check", sub_matches)) => handlers::handle_check_command(self, sub_matches),
            _ => {
                println!("No subcommand specified. Use --help for usage information.");
                Ok(())
            }
        }
    }

    fn build_cli(&self) -> Command {
        Command::new(crate::NAME)
            .version(crate::VERSION)
            .about(crate::DESCRIPTION)
            .author("Nota Development Team")
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Configuration file path (.json or .toml)")
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .help("Increase verbosity (can be used multiple times)")
                    .action(ArgAction::Count),
            )
            .subcommand(
                Command::new("compile")
                    .about("Compile a Nota file to a standalone HTML document")
                    .arg(Arg::new("input").help("Input Nota file").required(true).index(1))
                    .arg(Arg::new("output").short('o').long("output").value_name("FILE").help("Output HTML file, or '-' for stdout"))
                    .arg(Arg::new("inline-styles").long("inline-styles").help("Write styles as style attributes instead of a stylesheet").action(ArgAction::SetTrue))
                    .arg(Arg::new("title").long("title").value_name("TITLE").help("Document title"))
                    .arg(Arg::new("no-runtime").long("no-runtime").help("Do not embed the component runtime").action(ArgAction::SetTrue))
                    .arg(Arg::new("include").short('I').long("include").value_name("DIR").help("Add an import search directory").action(ArgAction::Append))
                    .arg(Arg::new("debug").short('d').long("debug").help("Enable debug logging of compiler phases").action(ArgAction::SetTrue))
                    .arg(Arg::new("stats").long("stats").help("Print compilation statistics as JSON").action(ArgAction::SetTrue))
                    .arg(Arg::new("watch").short('w').long("watch").help("Watch for file changes and recompile").action(ArgAction::SetTrue)),
            )
            .subcommand(
                Command::new("check")
                    .about("Check Nota files for syntax errors and unresolved imports")
                    .arg(Arg::new("input").help("Input Nota file or directory").required(true).index(1))
                    .arg(Arg::new("recursive").short('r').long("recursive").help("Check all Nota files in directory recursively").action(ArgAction::SetTrue)),
            )
    }

    fn setup_logging(&self, verbose_count: u8) {
        let log_level = match verbose_count {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        // Logger may already be installed
        let _ = env_logger::Builder::from_default_env()
            .filter_level(log_level)
            .format_timestamp_secs()
            .try_init();
    }

    /// Defaults with the config file applied
    pub fn base_options(&self) -> CompilerOptions {
        let mut options = CompilerOptions::default();
        self.config.apply(&mut options);
        options
    }

    /// Options from the config file, overridden by command-line flags
    pub fn build_compiler_options(&self, matches: &clap::ArgMatches) -> CompilerOptions {
        let mut options = self.base_options();

        if matches.get_flag("inline-styles") {
            options.style_mode = StyleMode::Inline;
        }
        if let Some(title) = matches.get_one::<String>("title") {
            options.document_title = title.clone();
        }
        if matches.get_flag("no-runtime") {
            options.emit_runtime = false;
        }
        if let Some(dirs) = matches.get_many::<String>("include") {
            options.search_paths.extend(dirs.cloned());
        }
        options.debug_mode = matches.get_flag("debug");
        options
    }

    pub fn output_directory(&self) -> Option<&str> {
        self.config.output_directory.as_deref()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_matches(args: &[&str]) -> clap::ArgMatches {
        let cli = EnhancedCli::new();
        let matches = cli.build_cli().try_get_matches_from(args).unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        sub.clone()
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = EnhancedCli::new();
        let matches = compile_matches(&[
            "notac", "compile", "app.nota", "--inline-styles", "--title", "Demo", "--no-runtime", "-I", "lib",
        ]);
        let options = cli.build_compiler_options(&matches);

        assert_eq!(options.style_mode, StyleMode::Inline);
        assert_eq!(options.document_title, "Demo");
        assert!(!options.emit_runtime);
        assert_eq!(options.search_paths, vec!["lib".to_string()]);
    }

    #[test]
    fn test_config_values_apply_before_flags() {
        let mut cli = EnhancedCli::new();
        cli.config = config::ConfigFile {
            inline_styles: Some(true),
            title: Some("From config".to_string()),
            ..Default::default()
        };
        let matches = compile_matches(&["notac", "compile", "app.nota", "--title", "From flag"]);
        let options = cli.build_compiler_options(&matches);

        assert_eq!(options.style_mode, StyleMode::Inline);
        assert_eq!(options.document_title, "From flag");
    }
}
