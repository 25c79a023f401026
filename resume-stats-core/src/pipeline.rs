//! High-level pipeline: read → fetch + patch → persist source → compile and save.
//!
//! [`build_resume`] runs the four steps in order for one configuration:
//!   - Reads the LaTeX source named by [`ResumeConfig::source_path`]
//!   - Fetches all configured statistics concurrently through a [`StatsSource`]
//!     and applies the placeholder rules to the text
//!   - Writes the patched text back (unless `persist_source` is off or nothing changed)
//!   - Submits the text to a [`DocumentCompiler`] and saves the returned artifact
//!
//! # Error Handling
//! Fetch failures are absorbed by the fetchers and show up only as
//! [`PatchStatus::Unavailable`] outcomes. Every other failure stops the run with a
//! [`PipelineError`]. There is no retry and no partial artifact; note that the
//! source may already be patched on disk when compilation fails.

use std::path::PathBuf;

use tracing::{error, info};

use crate::compile::save_artifact;
use crate::config::ResumeConfig;
use crate::contract::{CompileError, DocumentCompiler, StatsSource};
use crate::fetch::fetch_all;
use crate::patch::{apply_rules, PatchOutcome, PatchRule, PatchStatus};

/// What a successful build did.
#[derive(Debug)]
pub struct BuildReport {
    pub outcomes: Vec<PatchOutcome>,
    pub source_persisted: bool,
    pub artifact_path: PathBuf,
    pub artifact_size: usize,
}

impl BuildReport {
    pub fn applied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, PatchStatus::Applied { .. }))
            .count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to read resume source {}", .path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write patched source {}", .path.display())]
    WriteSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("failed to write compiled artifact {}", .path.display())]
    WriteArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub async fn build_resume<S, C>(
    config: &ResumeConfig,
    rules: &[PatchRule],
    stats_source: &S,
    compiler: &C,
) -> Result<BuildReport, PipelineError>
where
    S: StatsSource + ?Sized,
    C: DocumentCompiler + ?Sized,
{
    info!("[BUILD] Starting resume build");

    // --- Read ---
    let source_path = &config.source_path;
    let original = tokio::fs::read_to_string(source_path)
        .await
        .map_err(|source| {
            error!(
                error = ?source,
                path = %source_path.display(),
                "[BUILD][ERROR] Failed to read resume source"
            );
            PipelineError::ReadSource {
                path: source_path.clone(),
                source,
            }
        })?;
    info!(path = %source_path.display(), size = original.len(), "[BUILD] Read resume source");

    // --- Fetch + patch ---
    let stats = fetch_all(stats_source, &config.repos, config.video.as_ref()).await;
    let (patched, outcomes) = apply_rules(&original, rules, &stats);

    // --- Persist source ---
    let changed = patched != original;
    let source_persisted = config.persist_source && changed;
    if source_persisted {
        tokio::fs::write(source_path, &patched)
            .await
            .map_err(|source| {
                error!(
                    error = ?source,
                    path = %source_path.display(),
                    "[BUILD][ERROR] Failed to write patched source"
                );
                PipelineError::WriteSource {
                    path: source_path.clone(),
                    source,
                }
            })?;
        info!(path = %source_path.display(), "[BUILD] Persisted patched source");
    } else {
        info!(
            changed,
            persist_source = config.persist_source,
            "[BUILD] Source file left as is"
        );
    }

    // --- Compile + save ---
    // The compiler client logs the status and cause; the body is left to the caller.
    let artifact = compiler.compile(&patched).await.map_err(|e| {
        error!("[BUILD][ERROR] Compilation failed, no artifact written");
        PipelineError::Compile(e)
    })?;
    let artifact_size = artifact.len();

    let artifact_path = config.artifact_path.clone();
    let target = artifact_path.clone();
    tokio::task::spawn_blocking(move || save_artifact(&target, &artifact))
        .await
        .unwrap_or_else(|join_err| Err(std::io::Error::other(join_err)))
        .map_err(|source| {
            error!(
                error = ?source,
                path = %artifact_path.display(),
                "[BUILD][ERROR] Failed to write artifact"
            );
            PipelineError::WriteArtifact {
                path: artifact_path.clone(),
                source,
            }
        })?;

    let report = BuildReport {
        outcomes,
        source_persisted,
        artifact_size,
        artifact_path,
    };
    info!(
        applied = report.applied(),
        rules = rules.len(),
        artifact = %report.artifact_path.display(),
        "[BUILD] Resume build complete"
    );
    Ok(report)
}
