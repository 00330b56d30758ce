//! Data layer for the cluster report.
//!
//! Loads the diagnostics documents from disk, classifies nodes into tiers,
//! attributes index storage to each node and runs the top-level pipeline
//! that produces a [`report_core::models::ProcessedReport`].

pub mod attribution;
pub mod classifier;
pub mod grouping;
pub mod loader;
pub mod pipeline;
pub mod raw;
pub mod shards;

pub use report_core as core;
