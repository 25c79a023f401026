/// `load_config` module: reads the static YAML build config and injects secrets from the environment.
///
/// # Responsibilities
/// - Parse the YAML file into [`ResumeConfig`]; every field is optional and defaults apply
/// - Resolve relative paths against the config file's directory
/// - Read `YOUTUBE_API_KEY` and `GITHUB_TOKEN` from the environment; absence is not an error
///
/// When no path is given, [`DEFAULT_CONFIG_PATH`] is tried and the built-in
/// defaults are used if it does not exist. An explicitly named file must exist.
use anyhow::{Context, Result};
use resume_stats_core::config::{Credentials, ResumeConfig};
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "resume-stats.yaml";
pub const YOUTUBE_API_KEY_VAR: &str = "YOUTUBE_API_KEY";
pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";

#[derive(Debug)]
pub struct LoadedConfig {
    pub resume: ResumeConfig,
    pub credentials: Credentials,
}

pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig> {
    let (config_path, explicit) = match path {
        Some(p) => (p, true),
        None => (Path::new(DEFAULT_CONFIG_PATH), false),
    };
    info!(config_path = ?config_path, explicit, "Loading configuration from file");

    let resume = if !explicit && !config_path.exists() {
        info!(config_path = ?config_path, "No config file found, using built-in defaults");
        ResumeConfig::default()
    } else {
        let config_content = match fs::read_to_string(config_path) {
            Ok(content) => content,
            Err(e) => {
                error!(error = ?e, config_path = ?config_path, "Failed to read config file");
                return Err(anyhow::anyhow!(
                    "Failed to read config file {:?}: {}",
                    config_path,
                    e
                ));
            }
        };

        let parsed: ResumeConfig = if config_content.trim().is_empty() {
            ResumeConfig::default()
        } else {
            serde_yaml::from_str(&config_content)
                .map_err(|e| {
                    error!(error = ?e, config_path = ?config_path, "Failed to parse config YAML");
                    e
                })
                .context("Failed to parse config YAML")?
        };

        let base = config_path.parent().unwrap_or_else(|| Path::new(""));
        parsed.resolve_paths(base)
    };
    resume.trace_loaded();

    let credentials = Credentials {
        youtube_api_key: non_empty_env(YOUTUBE_API_KEY_VAR),
        github_token: non_empty_env(GITHUB_TOKEN_VAR),
    };
    if credentials.youtube_api_key.is_none() {
        info!("{YOUTUBE_API_KEY_VAR} not set; view counts will not be refreshed");
    }

    Ok(LoadedConfig {
        resume,
        credentials,
    })
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
