//! Statistic fetchers and the all-settled fan-out used by the pipeline.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{ApiEndpoints, Credentials, RepoTarget, VideoTarget};
use crate::contract::{RepoStats, StatsSource, VideoStats};

const USER_AGENT: &str = concat!("resume-stats/", env!("CARGO_PKG_VERSION"));

/// Settled results of one fetch round. Only successful fetches are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedStats {
    /// Keyed by `owner/repo`.
    pub repos: HashMap<String, RepoStats>,
    pub video: Option<VideoStats>,
}

impl FetchedStats {
    pub fn repo(&self, slug: &str) -> Option<RepoStats> {
        self.repos.get(slug).copied()
    }

    pub fn with_repo(mut self, slug: impl Into<String>, stats: RepoStats) -> Self {
        self.repos.insert(slug.into(), stats);
        self
    }

    pub fn with_video(mut self, stats: VideoStats) -> Self {
        self.video = Some(stats);
        self
    }
}

/// Dispatch every repository fetch and the video fetch concurrently and wait
/// for all of them to settle. A failed fetch only drops its own entry.
pub async fn fetch_all<S>(
    source: &S,
    repos: &[RepoTarget],
    video: Option<&VideoTarget>,
) -> FetchedStats
where
    S: StatsSource + ?Sized,
{
    let repo_fetches = repos.iter().map(|target| async move {
        let stats = source.repo_stats(&target.owner, &target.repo).await;
        (target.slug(), stats)
    });
    let video_fetch = async {
        match video {
            Some(target) => source.video_stats(&target.video_id).await,
            None => None,
        }
    };

    let (repo_results, video) = futures::join!(join_all(repo_fetches), video_fetch);

    let requested = repo_results.len();
    let repos: HashMap<String, RepoStats> = repo_results
        .into_iter()
        .filter_map(|(slug, stats)| stats.map(|s| (slug, s)))
        .collect();

    info!(
        repos_requested = requested,
        repos_fetched = repos.len(),
        video_fetched = video.is_some(),
        "All statistic fetches settled"
    );

    FetchedStats { repos, video }
}

/// Fetches statistics from the GitHub REST API and the YouTube Data API.
pub struct HttpStatsFetcher {
    client: Client,
    github_api: String,
    youtube_api: String,
    credentials: Credentials,
}

impl HttpStatsFetcher {
    pub fn new(
        endpoints: &ApiEndpoints,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        info!(
            github_api = %endpoints.github_api,
            youtube_api = %endpoints.youtube_api,
            youtube_key_set = credentials.youtube_api_key.is_some(),
            github_token_set = credentials.github_token.is_some(),
            "Initialized HttpStatsFetcher"
        );
        Ok(Self {
            client,
            github_api: endpoints.github_api.trim_end_matches('/').to_owned(),
            youtube_api: endpoints.youtube_api.trim_end_matches('/').to_owned(),
            credentials,
        })
    }

    /// Send `request` and decode a JSON body, logging a warning for any failure.
    async fn get_json(&self, resource: &str, request: RequestBuilder) -> Option<Value> {
        let response = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(resource = %resource, error = %e, "Statistics request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<Failed to decode response body>"));
            warn!(
                resource = %resource,
                status = status.as_u16(),
                body = %body,
                "Statistics API returned non-success status"
            );
            return None;
        }

        match response.json::<Value>().await {
            Ok(json) => {
                debug!(resource = %resource, "Decoded statistics response");
                Some(json)
            }
            Err(e) => {
                warn!(resource = %resource, error = %e, "Statistics response was not valid JSON");
                None
            }
        }
    }
}

#[async_trait]
impl StatsSource for HttpStatsFetcher {
    async fn repo_stats(&self, owner: &str, repo: &str) -> Option<RepoStats> {
        let slug = format!("{owner}/{repo}");
        let url = format!("{}/repos/{}/{}", self.github_api, owner, repo);
        info!(repo = %slug, url = %url, "Fetching repository statistics");

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.credentials.github_token {
            request = request.bearer_auth(token);
        }

        let body = self.get_json(&slug, request).await?;
        let stars = body.get("stargazers_count").and_then(Value::as_u64);
        let forks = body.get("forks_count").and_then(Value::as_u64);

        match (stars, forks) {
            (Some(stars), Some(forks)) => {
                info!(repo = %slug, stars, forks, "Fetched repository statistics");
                Some(RepoStats { stars, forks })
            }
            _ => {
                warn!(
                    repo = %slug,
                    "Repository response missing stargazers_count or forks_count"
                );
                None
            }
        }
    }

    async fn video_stats(&self, video_id: &str) -> Option<VideoStats> {
        if video_id.is_empty() {
            warn!("No video id configured, skipping view count fetch");
            return None;
        }
        let Some(api_key) = self.credentials.youtube_api_key.as_deref() else {
            warn!(video_id = %video_id, "YOUTUBE_API_KEY not set, skipping view count fetch");
            return None;
        };

        let url = format!("{}/videos", self.youtube_api);
        info!(video_id = %video_id, url = %url, "Fetching video statistics");
        let request = self.client.get(&url).query(&[
            ("part", "statistics"),
            ("id", video_id),
            ("key", api_key),
        ]);

        let resource = format!("video:{video_id}");
        let body = self.get_json(&resource, request).await?;
        let views = body
            .pointer("/items/0/statistics/viewCount")
            .and_then(|v| match v {
                Value::String(s) => s.parse::<u64>().ok(),
                other => other.as_u64(),
            });

        match views {
            Some(views) => {
                info!(video_id = %video_id, views, "Fetched video statistics");
                Some(VideoStats { views })
            }
            None => {
                warn!(
                    video_id = %video_id,
                    "Video response missing items[0].statistics.viewCount"
                );
                None
            }
        }
    }
}
