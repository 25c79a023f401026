//! Remote LaTeX compilation and artifact persistence.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::CompilerConfig;
use crate::contract::{CompileError, DocumentCompiler};

#[derive(Debug, Serialize)]
struct CompileRequest<'a> {
    compiler: &'a str,
    resources: Vec<CompileResource<'a>>,
}

#[derive(Debug, Serialize)]
struct CompileResource<'a> {
    main: bool,
    content: &'a str,
}

/// Client for a LaTeX-Online style `builds/sync` endpoint.
pub struct LatexOnlineCompiler {
    client: Client,
    endpoint: String,
    compiler: String,
}

impl LatexOnlineCompiler {
    pub fn new(config: &CompilerConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        info!(
            endpoint = %config.endpoint,
            compiler = %config.name,
            timeout_secs = config.timeout_secs,
            "Initialized LatexOnlineCompiler"
        );
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            compiler: config.name.clone(),
        })
    }
}

#[async_trait]
impl DocumentCompiler for LatexOnlineCompiler {
    async fn compile(&self, source: &str) -> Result<Vec<u8>, CompileError> {
        let payload = CompileRequest {
            compiler: &self.compiler,
            resources: vec![CompileResource {
                main: true,
                content: source,
            }],
        };
        info!(
            endpoint = %self.endpoint,
            compiler = %self.compiler,
            source_len = source.len(),
            "Submitting document for compilation"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, endpoint = %self.endpoint, "Compilation request failed");
                CompileError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            error!(status = status.as_u16(), "Compilation service rejected the document");
            return Err(CompileError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        debug!(size = bytes.len(), "Received compiled artifact");
        Ok(bytes.to_vec())
    }
}

/// Write `bytes` to `path` through a temporary file in the same directory, so
/// the destination only ever holds a complete artifact.
pub fn save_artifact(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    info!(path = %path.display(), size = bytes.len(), "Wrote compiled artifact");
    Ok(())
}
