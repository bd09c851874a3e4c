#![doc = "var-sync-core: core logic library for var-sync."]

//! This crate contains the data models and pipeline for pushing environment
//! variables into GitLab projects as CI/CD variables.
//! CLI argument handling and file loading live in the `var-sync` binary crate.
//!
//! # Usage
//! Add this as a dependency for the mapping model, environment resolution,
//! the upsert pipeline and result reporting.

pub mod config;
pub mod contract;
pub mod environment;
pub mod gitlab;
pub mod plan;
pub mod report;
pub mod synchronise;
