//! In-memory diagnostics bundle handed from the loader to the pipeline.

use std::collections::HashMap;

use report_core::error::{ReportError, Result};
use report_core::fields::object_at;
use serde_json::{Map, Value};

// ── DocumentKind ──────────────────────────────────────────────────────────────

/// The three documents a diagnostics bundle must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    NodesStats,
    NodesInfo,
    IndicesStats,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::NodesStats,
        DocumentKind::NodesInfo,
        DocumentKind::IndicesStats,
    ];

    /// Path of the document relative to the diagnostics directory.
    pub fn relative_path(&self) -> &'static str {
        match self {
            DocumentKind::NodesStats => "nodes/nodes_stats.json",
            DocumentKind::NodesInfo => "nodes/nodes_info.json",
            DocumentKind::IndicesStats => "indices/indices_stats.json",
        }
    }

    /// Logical key the document is stored under (its file name).
    pub fn key(&self) -> &'static str {
        match self {
            DocumentKind::NodesStats => "nodes_stats.json",
            DocumentKind::NodesInfo => "nodes_info.json",
            DocumentKind::IndicesStats => "indices_stats.json",
        }
    }

    /// Name of the envelope object Elasticsearch wraps the id map in.
    fn envelope(&self) -> &'static str {
        match self {
            DocumentKind::NodesStats | DocumentKind::NodesInfo => "nodes",
            DocumentKind::IndicesStats => "indices",
        }
    }
}

// ── RawDiagnostics ────────────────────────────────────────────────────────────

/// Parsed diagnostics documents keyed by logical name. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct RawDiagnostics {
    documents: HashMap<String, Value>,
}

impl RawDiagnostics {
    pub fn new(documents: HashMap<String, Value>) -> Self {
        Self { documents }
    }

    /// Build from the three required documents.
    pub fn from_parts(nodes_stats: Value, nodes_info: Value, indices_stats: Value) -> Self {
        let documents = HashMap::from([
            (DocumentKind::NodesStats.key().to_string(), nodes_stats),
            (DocumentKind::NodesInfo.key().to_string(), nodes_info),
            (DocumentKind::IndicesStats.key().to_string(), indices_stats),
        ]);
        Self { documents }
    }

    /// Raw document of the given kind.
    pub fn document(&self, kind: DocumentKind) -> Result<&Value> {
        self.documents
            .get(kind.key())
            .ok_or_else(|| ReportError::MissingInput(kind.key().to_string()))
    }

    /// Fail with [`ReportError::MissingInput`] unless all three documents are present.
    pub fn ensure_complete(&self) -> Result<()> {
        for kind in DocumentKind::ALL {
            self.document(kind)?;
        }
        Ok(())
    }

    /// The id → object map of a document.
    ///
    /// Accepts the Elasticsearch envelope (`{"nodes": {...}}` or
    /// `{"indices": {...}}`) as well as a bare map. A document that is not an
    /// object at all yields `None`.
    pub fn entries(&self, kind: DocumentKind) -> Result<Option<&Map<String, Value>>> {
        let doc = self.document(kind)?;
        Ok(object_at(doc, &[kind.envelope()]).or_else(|| doc.as_object()))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_kind_paths() {
        assert_eq!(DocumentKind::NodesStats.relative_path(), "nodes/nodes_stats.json");
        assert_eq!(DocumentKind::NodesInfo.relative_path(), "nodes/nodes_info.json");
        assert_eq!(
            DocumentKind::IndicesStats.relative_path(),
            "indices/indices_stats.json"
        );
        assert_eq!(DocumentKind::IndicesStats.key(), "indices_stats.json");
    }

    #[test]
    fn test_missing_document_is_missing_input() {
        let raw = RawDiagnostics::new(HashMap::from([(
            "nodes_info.json".to_string(),
            json!({}),
        )]));
        let err = raw.document(DocumentKind::NodesStats).unwrap_err();
        assert!(matches!(err, ReportError::MissingInput(ref doc) if doc == "nodes_stats.json"));
        assert!(raw.ensure_complete().is_err());
    }

    #[test]
    fn test_ensure_complete_with_all_parts() {
        let raw = RawDiagnostics::from_parts(json!({}), json!({}), json!({}));
        assert!(raw.ensure_complete().is_ok());
        assert_eq!(raw.len(), 3);
    }

    #[test]
    fn test_entries_unwraps_envelope() {
        let raw = RawDiagnostics::from_parts(
            json!({"_nodes": {"total": 1}, "nodes": {"n1": {}}}),
            json!({}),
            json!({"_shards": {}, "indices": {"logs-1": {}, "logs-2": {}}}),
        );
        let nodes = raw.entries(DocumentKind::NodesStats).unwrap().unwrap();
        assert_eq!(nodes.keys().collect::<Vec<_>>(), vec!["n1"]);
        let indices = raw.entries(DocumentKind::IndicesStats).unwrap().unwrap();
        assert_eq!(indices.len(), 2);
    }

    #[test]
    fn test_entries_accepts_bare_map() {
        let raw = RawDiagnostics::from_parts(
            json!({}),
            json!({"n1": {"name": "node-a"}}),
            json!({}),
        );
        let info = raw.entries(DocumentKind::NodesInfo).unwrap().unwrap();
        assert!(info.contains_key("n1"));
    }

    #[test]
    fn test_entries_non_object_document_is_none() {
        let raw = RawDiagnostics::from_parts(json!([1, 2]), json!({}), json!({}));
        assert!(raw.entries(DocumentKind::NodesStats).unwrap().is_none());
    }
}
