// FILE: src/cli/config.rs

use crate::error::{CompilerError, Result};
use crate::{CompilerOptions, StyleMode};
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub inline_styles: Option<bool>,
    pub title: Option<String>,
    pub emit_runtime: Option<bool>,
    pub search_paths: Option<Vec<String>>,
    pub output_directory: Option<String>,
}

impl ConfigFile {
    pub fn apply(&self, options: &mut CompilerOptions) {
        if self.inline_styles == Some(true) {
            options.style_mode = StyleMode::Inline;
        }
        if let Some(title) = &self.title {
            options.document_title = title.clone();
        }
        if let Some(emit_runtime) = self.emit_runtime {
            options.emit_runtime = emit_runtime;
        }
        if let Some(paths) = &self.search_paths {
            options.search_paths.extend(paths.iter().cloned());
        }
    }
}

pub fn load(config_path: &str) -> Result<ConfigFile> {
    let config_content = fs::read_to_string(config_path).map_err(|e| CompilerError::FileNotFound {
        path: format!("Config file {}: {}", config_path, e),
    })?;
    let config = parse(config_path, &config_content)?;
    log::info!("Loaded configuration from {}", config_path);
    Ok(config)
}

fn parse(config_path: &str, content: &str) -> Result<ConfigFile> {
    if config_path.ends_with(".json") {
        serde_json::from_str(content).map_err(|e| CompilerError::InvalidFormat {
            message: format!("Invalid JSON config: {}", e),
        })
    } else if config_path.ends_with(".toml") {
        toml::from_str(content).map_err(|e| CompilerError::InvalidFormat {
            message: format!("Invalid TOML config: {}", e),
        })
    } else {
        Err(CompilerError::InvalidFormat {
            message: "Config file must be .json or .toml format".to_string(),
        })
    }
}
