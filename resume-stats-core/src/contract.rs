//! # contract: interfaces to the outside world
//!
//! The build pipeline talks to two kinds of remote service: statistics APIs
//! (repository stars/forks, video views) and a document compilation service.
//! Each is expressed here as an async trait so that the pipeline in
//! [`crate::pipeline`] can be driven by the reqwest-backed implementations in
//! [`crate::fetch`] and [`crate::compile`], or by `mockall` mocks in tests.
//!
//! ## Failure contract
//! - [`StatsSource`] methods never fail. An unavailable statistic is `None`;
//!   the implementor is responsible for logging why.
//! - [`DocumentCompiler::compile`] returns a typed [`CompileError`], which the
//!   pipeline treats as fatal.

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Star and fork counts of one code repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepoStats {
    pub stars: u64,
    pub forks: u64,
}

/// Audience statistics of one video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoStats {
    pub views: u64,
}

/// Errors from the remote compilation step.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("compile request failed")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status; `body` is its diagnostic output.
    #[error("compilation rejected (status {status}):\n{body}")]
    Rejected { status: u16, body: String },
}

/// Source of public statistics.
///
/// Implementations must resolve every failure (missing credentials, bad status,
/// transport errors, unexpected payloads) to `None` and never panic.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fetch stars and forks for `owner/repo`.
    async fn repo_stats(&self, owner: &str, repo: &str) -> Option<RepoStats>;

    /// Fetch the view count for a video id.
    async fn video_stats(&self, video_id: &str) -> Option<VideoStats>;
}

/// Remote service turning document source text into a rendered artifact.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocumentCompiler: Send + Sync {
    /// Compile `source` and return the artifact bytes.
    async fn compile(&self, source: &str) -> Result<Vec<u8>, CompileError>;
}
