//! Diagnostics bundle loading.
//!
//! Reads the node statistics, node info and index statistics dumps from a
//! diagnostics directory and hands them over as a [`RawDiagnostics`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use report_core::error::{ReportError, Result};
use tracing::{debug, error, info};

use crate::raw::{DocumentKind, RawDiagnostics};

/// Loads the required documents of one diagnostics bundle.
pub struct DiagnosticsLoader {
    diagnostics_dir: PathBuf,
}

impl DiagnosticsLoader {
    pub fn new(diagnostics_dir: impl Into<PathBuf>) -> Self {
        Self {
            diagnostics_dir: diagnostics_dir.into(),
        }
    }

    pub fn diagnostics_dir(&self) -> &Path {
        &self.diagnostics_dir
    }

    /// Check that every required file exists, then read and parse them all.
    ///
    /// Fails with [`ReportError::MissingInput`] naming the first absent file,
    /// or [`ReportError::InvalidContent`] naming the first file that is not
    /// valid JSON. Nothing is parsed before all files are known to exist.
    pub fn load(&self) -> Result<RawDiagnostics> {
        self.check_required_files()?;

        let mut documents = HashMap::new();
        for kind in DocumentKind::ALL {
            let value = self.load_document(kind)?;
            debug!("Loaded {}", kind.relative_path());
            documents.insert(kind.key().to_string(), value);
        }

        info!("Diagnostic files loaded successfully.");
        Ok(RawDiagnostics::new(documents))
    }

    /// Absolute path of a required document.
    pub fn document_path(&self, kind: DocumentKind) -> PathBuf {
        self.diagnostics_dir.join(kind.relative_path())
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn check_required_files(&self) -> Result<()> {
        for kind in DocumentKind::ALL {
            let path = self.document_path(kind);
            if !path.is_file() {
                error!("Required file not found: {}", path.display());
                return Err(ReportError::MissingInput(kind.relative_path().to_string()));
            }
        }
        Ok(())
    }

    fn load_document(&self, kind: DocumentKind) -> Result<serde_json::Value> {
        let path = self.document_path(kind);
        let content = std::fs::read_to_string(&path).map_err(|source| ReportError::FileRead {
            path: path.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| {
            error!("Invalid JSON in file: {}", path.display());
            ReportError::InvalidContent {
                document: kind.relative_path().to_string(),
                source,
            }
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
