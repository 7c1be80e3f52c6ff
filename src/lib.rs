//! Graph Composer - dependency graph visualizer with version staleness reporting
//!
//! This crate renders a project's resolved dependency tree as a styled,
//! deduplicated graph and summarizes how far each dependency lags behind
//! its latest release.

pub mod config;
pub mod export;
pub mod graph;
pub mod model;
pub mod render;
pub mod rules;
pub mod status;
