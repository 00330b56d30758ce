//! Normalization of per-shard statistics.
//!
//! Index statistics report each shard id either as one stats object or as an
//! array of stats objects (one per primary/replica copy). Both shapes are
//! resolved here once so attribution only ever sees a sequence of copies.

use report_core::fields::{f64_at, str_at};
use serde_json::Value;

/// The copies reported for one shard id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShardCopies<'a> {
    Single(&'a Value),
    Many(&'a [Value]),
}

impl<'a> ShardCopies<'a> {
    /// Classify a raw shard value. Anything other than an object or an array
    /// has no usable copies and yields `None`.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Object(_) => Some(ShardCopies::Single(value)),
            Value::Array(items) => Some(ShardCopies::Many(items.as_slice())),
            _ => None,
        }
    }

    /// Iterate every copy in document order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Value> {
        let slice: &'a [Value] = match *self {
            ShardCopies::Single(value) => std::slice::from_ref(value),
            ShardCopies::Many(items) => items,
        };
        slice.iter()
    }

    /// First copy whose routing names `node_id` as its host.
    pub fn hosted_on(&self, node_id: &str) -> Option<&'a Value> {
        self.iter().find(|copy| routing_node(copy) == Some(node_id))
    }
}

/// Node id a shard copy is routed to.
pub fn routing_node(copy: &Value) -> Option<&str> {
    str_at(copy, &["routing", "node"])
}

/// On-disk size of a shard copy in bytes, `0.0` when unreported.
pub fn store_size_bytes(copy: &Value) -> f64 {
    f64_at(copy, &["store", "size_in_bytes"])
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_single_object() {
        let shard = json!({"routing": {"node": "n1"}});
        let copies = ShardCopies::from_value(&shard).unwrap();
        assert!(matches!(copies, ShardCopies::Single(_)));
        assert_eq!(copies.iter().count(), 1);
    }

    #[test]
    fn test_from_value_list() {
        let shard = json!([{"routing": {"node": "n1"}}, {"routing": {"node": "n2"}}]);
        let copies = ShardCopies::from_value(&shard).unwrap();
        assert!(matches!(copies, ShardCopies::Many(_)));
        assert_eq!(copies.iter().count(), 2);
    }

    #[test]
    fn test_from_value_scalar_is_none() {
        assert!(ShardCopies::from_value(&json!("0")).is_none());
        assert!(ShardCopies::from_value(&json!(3)).is_none());
        assert!(ShardCopies::from_value(&json!(null)).is_none());
    }

    #[test]
    fn test_hosted_on_single() {
        let shard = json!({"routing": {"node": "n1"}, "store": {"size_in_bytes": 10}});
        let copies = ShardCopies::from_value(&shard).unwrap();
        assert!(copies.hosted_on("n1").is_some());
        assert!(copies.hosted_on("n2").is_none());
    }

    #[test]
    fn test_hosted_on_returns_first_match() {
        let shard = json!([
            {"routing": {"node": "n2"}, "store": {"size_in_bytes": 1}},
            {"routing": {"node": "n1"}, "store": {"size_in_bytes": 2}},
            {"routing": {"node": "n1"}, "store": {"size_in_bytes": 3}}
        ]);
        let copies = ShardCopies::from_value(&shard).unwrap();
        let copy = copies.hosted_on("n1").unwrap();
        assert_eq!(store_size_bytes(copy), 2.0);
    }

    #[test]
    fn test_hosted_on_skips_copies_without_routing() {
        let shard = json!([{"store": {"size_in_bytes": 1}}, 5, {"routing": {"node": "n1"}}]);
        let copies = ShardCopies::from_value(&shard).unwrap();
        assert!(copies.hosted_on("n1").is_some());
    }

    #[test]
    fn test_store_size_defaults_to_zero() {
        assert_eq!(store_size_bytes(&json!({"routing": {"node": "n1"}})), 0.0);
    }
}
