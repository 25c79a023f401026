//! CLI glue for resume-stats: argument parsing and wiring of the real clients.
//!
//! All domain logic lives in `resume-stats-core`. Running the binary without a
//! subcommand performs a resume build.

use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use resume_stats_core::blog::load_posts;
use resume_stats_core::compile::LatexOnlineCompiler;
use resume_stats_core::fetch::HttpStatsFetcher;
use resume_stats_core::patch::PatchStatus;
use resume_stats_core::pipeline::{build_resume, PipelineError};
use std::path::PathBuf;
use std::time::Duration;

/// CLI for resume-stats: refresh live statistics in the resume and compile it.
#[derive(Parser)]
#[clap(
    name = "resume-stats",
    version,
    about = "Refresh project statistics in a LaTeX resume and compile it to PDF"
)]
pub struct Cli {
    /// Path to the YAML config file (defaults to ./resume-stats.yaml if present)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Patch the resume with fresh statistics and compile it (the default)
    Build,
    /// Write the blog post index as JSON
    Blog {
        /// Directory containing the .mdx posts
        #[clap(long, default_value = "public/blog")]
        dir: PathBuf,
        /// Output file; stdout when omitted
        #[clap(long)]
        out: Option<PathBuf>,
    },
}

/// Async CLI entrypoint shared by main() and integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command.unwrap_or(Commands::Build) {
        Commands::Build => run_build(cli.config).await,
        Commands::Blog { dir, out } => run_blog(dir, out),
    }
}

async fn run_build(config: Option<PathBuf>) -> Result<()> {
    let loaded = load_config(config.as_deref())?;
    let resume = &loaded.resume;
    let rules = resume.patch_rules()?;

    let fetcher = HttpStatsFetcher::new(
        &resume.endpoints,
        loaded.credentials.clone(),
        Duration::from_secs(resume.fetch_timeout_secs),
    )
    .context("Failed to construct statistics client")?;
    let compiler =
        LatexOnlineCompiler::new(&resume.compiler).context("Failed to construct compiler client")?;

    tracing::info!(command = "build", "Starting resume build");
    match build_resume(resume, &rules, &fetcher, &compiler).await {
        Ok(report) => {
            println!("Resume build complete.");
            for outcome in &report.outcomes {
                match &outcome.status {
                    PatchStatus::Applied { replacement } => {
                        println!("  {}: {}", outcome.rule, replacement)
                    }
                    PatchStatus::Unavailable => println!("  {}: unavailable, kept", outcome.rule),
                    PatchStatus::NotFound => println!("  {}: placeholder not found", outcome.rule),
                }
            }
            println!(
                "Wrote {} ({} bytes)",
                report.artifact_path.display(),
                report.artifact_size
            );
            Ok(())
        }
        Err(e @ PipelineError::Compile(_)) => {
            Err(anyhow::Error::new(e).context("Resume compilation failed"))
        }
        Err(e) => Err(anyhow::Error::new(e).context("Resume build failed")),
    }
}

fn run_blog(dir: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let posts = load_posts(&dir)?;
    let json = serde_json::to_string_pretty(&posts).context("Failed to serialise blog index")?;

    match out {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write blog index to {}", path.display()))?;
            tracing::info!(path = %path.display(), posts = posts.len(), "Wrote blog index");
        }
        None => println!("{json}"),
    }
    Ok(())
}
