//! Output layer for the cluster report.
//!
//! Validates a [`report_core::models::ProcessedReport`] and renders it into
//! the self-contained HTML report or plain JSON.

pub mod renderer;

pub use report_core as core;
