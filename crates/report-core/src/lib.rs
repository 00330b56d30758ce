//! Shared domain types for the cluster report.
//!
//! Holds the report data model, the permissive field accessors used to read
//! diagnostics documents, error types, formatting helpers and CLI settings.

pub mod error;
pub mod fields;
pub mod filter;
pub mod formatting;
pub mod models;
pub mod settings;
