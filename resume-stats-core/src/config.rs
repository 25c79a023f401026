//! Static configuration of a resume build.
//!
//! Mirrors the YAML file read by the CLI. Secrets are not part of it; they
//! travel separately in [`Credentials`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::patch::{PatchError, PatchRule};

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_YOUTUBE_API: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_COMPILER_ENDPOINT: &str = "https://latex.ytotech.com/builds/sync";
pub const DEFAULT_COMPILER_NAME: &str = "pdflatex";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResumeConfig {
    /// LaTeX source containing the placeholder phrases.
    pub source_path: PathBuf,
    /// Where the compiled PDF is written.
    pub artifact_path: PathBuf,
    /// Write the patched text back to `source_path` before compiling.
    pub persist_source: bool,
    pub repos: Vec<RepoTarget>,
    pub video: Option<VideoTarget>,
    pub compiler: CompilerConfig,
    pub endpoints: ApiEndpoints,
    pub fetch_timeout_secs: u64,
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("public/resume.tex"),
            artifact_path: PathBuf::from("public/resume.pdf"),
            persist_source: true,
            repos: vec![
                RepoTarget {
                    owner: "PulseBeat02".into(),
                    repo: "mcav".into(),
                    keyword: "multimedia".into(),
                },
                RepoTarget {
                    owner: "PulseBeat02".into(),
                    repo: "yt-media-storage".into(),
                    keyword: "encoding".into(),
                },
            ],
            video: None,
            compiler: CompilerConfig::default(),
            endpoints: ApiEndpoints::default(),
            fetch_timeout_secs: 10,
        }
    }
}

/// A repository whose stars and forks are written next to `keyword` in the resume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepoTarget {
    pub owner: String,
    pub repo: String,
    pub keyword: String,
}

impl RepoTarget {
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// The video whose view count is written as "over N viewers".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoTarget {
    pub video_id: String,
    /// When set, "over N impressions" is patched with `views * multiplier`.
    #[serde(default)]
    pub impressions_multiplier: Option<u64>,
    /// Use one fractional digit when abbreviating.
    #[serde(default)]
    pub decimal: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompilerConfig {
    pub endpoint: String,
    pub name: String,
    pub timeout_secs: u64,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_COMPILER_ENDPOINT.into(),
            name: DEFAULT_COMPILER_NAME.into(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiEndpoints {
    pub github_api: String,
    pub youtube_api: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            github_api: DEFAULT_GITHUB_API.into(),
            youtube_api: DEFAULT_YOUTUBE_API.into(),
        }
    }
}

/// Secrets injected from the environment. Both are optional.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub youtube_api_key: Option<String>,
    pub github_token: Option<String>,
}

impl ResumeConfig {
    /// Resolve relative file paths against `base`, normally the config file's directory.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        if self.source_path.is_relative() {
            self.source_path = base.join(&self.source_path);
        }
        if self.artifact_path.is_relative() {
            self.artifact_path = base.join(&self.artifact_path);
        }
        self
    }

    /// Build the placeholder rules described by this config, in application order.
    pub fn patch_rules(&self) -> Result<Vec<PatchRule>, PatchError> {
        let mut rules = Vec::with_capacity(self.repos.len() + 2);
        for target in &self.repos {
            rules.push(PatchRule::repo(&target.owner, &target.repo, &target.keyword)?);
        }
        if let Some(video) = &self.video {
            rules.push(PatchRule::viewers(video.decimal)?);
            if let Some(multiplier) = video.impressions_multiplier {
                rules.push(PatchRule::impressions(multiplier, video.decimal)?);
            }
        }
        Ok(rules)
    }

    pub fn trace_loaded(&self) {
        info!(
            source_path = %self.source_path.display(),
            artifact_path = %self.artifact_path.display(),
            repos = self.repos.len(),
            video = self.video.is_some(),
            "Loaded ResumeConfig"
        );
        debug!(?self, "ResumeConfig loaded (full debug)");
    }
}
