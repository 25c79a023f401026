//! Placeholder rules: where a statistic goes in the resume text and how it is rendered.
//!
//! Each [`PatchRule`] pairs a pattern with the statistic it reads and the
//! formatter that renders it. Rules are built once from configuration
//! (see [`crate::config::ResumeConfig::patch_rules`]) and applied in order by
//! [`apply_rules`], which cannot fail: a rule whose statistic is missing, or
//! whose phrase does not occur, leaves the text exactly as it was.

use regex::Regex;
use tracing::{debug, info};

use crate::fetch::FetchedStats;
use crate::format::{abbreviate, round_stat};

#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("invalid placeholder pattern for rule {rule}")]
    Pattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
}

/// Which fetched statistic a rule reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatSource {
    /// Stars and forks of the repository with this `owner/repo` slug.
    Repo(String),
    Views,
}

/// How the statistic is rendered into replacement text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formatter {
    StarsAndForks { keyword: String },
    Viewers { decimal: bool },
    Impressions { multiplier: u64, decimal: bool },
}

#[derive(Debug, Clone)]
pub struct PatchRule {
    pub name: String,
    pattern: Regex,
    source: StatSource,
    formatter: Formatter,
}

/// Result of applying one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub rule: String,
    pub status: PatchStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchStatus {
    Applied { replacement: String },
    /// The statistic could not be fetched.
    Unavailable,
    /// The placeholder phrase is not in the text.
    NotFound,
}

const NUMBER: &str = r"\d+(?:\.\d+)?[kKmM]?";

impl PatchRule {
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        source: StatSource,
        formatter: Formatter,
    ) -> Result<Self, PatchError> {
        let name = name.into();
        let pattern = Regex::new(pattern).map_err(|source| PatchError::Pattern {
            rule: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            pattern,
            source,
            formatter,
        })
    }

    /// `(<stars> stars, <forks> forks) for <keyword>`
    pub fn repo(owner: &str, repo: &str, keyword: &str) -> Result<Self, PatchError> {
        let slug = format!("{owner}/{repo}");
        Self::new(
            format!("repo:{slug}"),
            &format!(r"\(\d+\+? stars, \d+\+? forks\) for {}", regex::escape(keyword)),
            StatSource::Repo(slug),
            Formatter::StarsAndForks {
                keyword: keyword.to_owned(),
            },
        )
    }

    /// `over <number> viewers`
    pub fn viewers(decimal: bool) -> Result<Self, PatchError> {
        Self::new(
            "viewers",
            &format!("over {NUMBER} viewers"),
            StatSource::Views,
            Formatter::Viewers { decimal },
        )
    }

    /// `over <number> impressions`, rendered from `views * multiplier`.
    pub fn impressions(multiplier: u64, decimal: bool) -> Result<Self, PatchError> {
        Self::new(
            "impressions",
            &format!("over {NUMBER} impressions"),
            StatSource::Views,
            Formatter::Impressions {
                multiplier,
                decimal,
            },
        )
    }

    pub fn source(&self) -> &StatSource {
        &self.source
    }

    /// Replacement text for this rule, or `None` when its statistic is unavailable.
    pub fn render(&self, stats: &FetchedStats) -> Option<String> {
        match (&self.source, &self.formatter) {
            (StatSource::Repo(slug), Formatter::StarsAndForks { keyword }) => {
                let repo = stats.repo(slug)?;
                Some(format!(
                    "({} stars, {} forks) for {}",
                    round_stat(repo.stars),
                    round_stat(repo.forks),
                    keyword
                ))
            }
            (StatSource::Views, Formatter::Viewers { decimal }) => {
                let video = stats.video?;
                Some(format!("over {} viewers", abbreviate(video.views, *decimal)))
            }
            (
                StatSource::Views,
                Formatter::Impressions {
                    multiplier,
                    decimal,
                },
            ) => {
                let video = stats.video?;
                let impressions = video.views.saturating_mul(*multiplier);
                Some(format!("over {} impressions", abbreviate(impressions, *decimal)))
            }
            // Mismatched pairs only arise from hand-built rules; treat as no data.
            _ => None,
        }
    }

    /// Replace the first match in `text`. Leaves `text` untouched otherwise.
    pub fn apply(&self, text: &mut String, stats: &FetchedStats) -> PatchStatus {
        let Some(replacement) = self.render(stats) else {
            return PatchStatus::Unavailable;
        };
        match self.pattern.find(text) {
            Some(found) => {
                let range = found.range();
                text.replace_range(range, &replacement);
                PatchStatus::Applied { replacement }
            }
            None => PatchStatus::NotFound,
        }
    }
}

/// Apply every rule in order and report what happened to each.
pub fn apply_rules(
    text: &str,
    rules: &[PatchRule],
    stats: &FetchedStats,
) -> (String, Vec<PatchOutcome>) {
    let mut patched = text.to_owned();
    let mut outcomes = Vec::with_capacity(rules.len());

    for rule in rules {
        let status = rule.apply(&mut patched, stats);
        match &status {
            PatchStatus::Applied { replacement } => {
                info!(rule = %rule.name, replacement = %replacement, "Patched placeholder")
            }
            PatchStatus::Unavailable => {
                info!(rule = %rule.name, "Statistic unavailable, placeholder left unchanged")
            }
            PatchStatus::NotFound => {
                debug!(rule = %rule.name, "Placeholder not present in document")
            }
        }
        outcomes.push(PatchOutcome {
            rule: rule.name.clone(),
            status,
        });
    }

    (patched, outcomes)
}
