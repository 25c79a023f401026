#![doc = "resume-stats-core: core logic library for resume-stats."]

//! This crate holds the data models, fetchers, patch rules and the build pipeline
//! behind the `resume-stats` binary. Network services sit behind the traits in
//! [`contract`] so the pipeline can run against mocks.
//!
//! # Usage
//! Depend on this crate for everything except argument parsing and process setup.

pub mod blog;
pub mod compile;
pub mod config;
pub mod contract;
pub mod fetch;
pub mod format;
pub mod patch;
pub mod pipeline;
