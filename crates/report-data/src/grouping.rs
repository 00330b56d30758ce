//! Node grouping and role inspection.
//!
//! Groups data-bearing nodes by hostname prefix and /24 network, and lists
//! the role configuration of every node. Both operate on the same raw
//! documents as the report pipeline.

use std::collections::BTreeMap;
use std::net::IpAddr;

use regex::Regex;
use report_core::error::Result;
use report_core::fields::{str_at, string_list_at};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::raw::{DocumentKind, RawDiagnostics};

static NO_INFO: Value = Value::Null;

// ── Types ─────────────────────────────────────────────────────────────────────

/// A node placed in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedNode {
    pub node_id: String,
    pub ip: String,
    pub hostname: String,
    pub roles: Vec<String>,
}

/// Role flags of a single node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeRoleSummary {
    pub node_id: String,
    pub hostname: String,
    pub roles: Vec<String>,
    pub is_kibana: bool,
    pub is_master: bool,
    pub is_data: bool,
    pub is_ingest: bool,
    pub is_ml: bool,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// First three octets of an IPv4 address, e.g. `"10.1.2"`.
///
/// IPv6 addresses are returned whole. Unparseable input yields an empty
/// string.
pub fn extract_ip_prefix(ip: &str) -> String {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => {
            let [a, b, c, _] = v4.octets();
            format!("{}.{}.{}", a, b, c)
        }
        Ok(IpAddr::V6(v6)) => v6.to_string(),
        Err(_) => {
            warn!("Invalid IP address: {}", ip);
            String::new()
        }
    }
}

/// Leading run of ASCII letters of a hostname, e.g. `"esdata"` for `"esdata01"`.
pub fn extract_hostname_prefix(hostname: &str) -> String {
    let re = Regex::new(r"^([a-zA-Z]+)").expect("regex is valid");
    re.captures(hostname)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Whether a node runs Kibana, either by role or by the
/// `kibana.connected` attribute.
pub fn is_kibana_node(node_info: &Value) -> bool {
    string_list_at(node_info, &["roles"]).contains(&"kibana")
        || str_at(node_info, &["attributes", "kibana.connected"])
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Nodes excluded from grouping: Kibana, master and machine-learning nodes.
pub fn is_ignored_node(node_info: &Value) -> bool {
    let roles = string_list_at(node_info, &["roles"]);
    roles.contains(&"master") || roles.contains(&"ml") || is_kibana_node(node_info)
}

// ── Operations ────────────────────────────────────────────────────────────────

/// Group the nodes of the stats document by
/// `"<hostname prefix>-<network prefix>"`.
///
/// The address comes from the stats `transport_address` (port stripped) and
/// the hostname from the info `name`. Ignored nodes are skipped.
pub fn group_nodes(raw: &RawDiagnostics) -> Result<BTreeMap<String, Vec<GroupedNode>>> {
    let nodes_stats = raw.entries(DocumentKind::NodesStats)?;
    let nodes_info = raw.entries(DocumentKind::NodesInfo)?;

    let mut groups: BTreeMap<String, Vec<GroupedNode>> = BTreeMap::new();

    for (node_id, stats) in nodes_stats.into_iter().flatten() {
        let node_info = nodes_info
            .and_then(|info| info.get(node_id))
            .unwrap_or(&NO_INFO);

        if is_ignored_node(node_info) {
            info!("Ignoring node {} ({})", node_id, ignored_reason(node_info));
            continue;
        }

        let ip = str_at(stats, &["transport_address"])
            .unwrap_or_default()
            .split(':')
            .next()
            .unwrap_or_default()
            .to_string();
        let hostname = str_at(node_info, &["name"]).unwrap_or_default().to_string();

        let group_name = format!(
            "{}-{}",
            extract_hostname_prefix(&hostname),
            extract_ip_prefix(&ip)
        );
        groups.entry(group_name).or_default().push(GroupedNode {
            node_id: node_id.clone(),
            ip,
            hostname,
            roles: owned_roles(node_info),
        });
    }

    Ok(groups)
}

/// Role flags of every node in the info document, in document order.
pub fn summarize_roles(raw: &RawDiagnostics) -> Result<Vec<NodeRoleSummary>> {
    let nodes_info = raw.entries(DocumentKind::NodesInfo)?;

    let summaries = nodes_info
        .into_iter()
        .flatten()
        .map(|(node_id, node_info)| {
            let roles = owned_roles(node_info);
            let has = |role: &str| roles.iter().any(|r| r == role);
            NodeRoleSummary {
                node_id: node_id.clone(),
                hostname: str_at(node_info, &["name"]).unwrap_or("N/A").to_string(),
                is_kibana: is_kibana_node(node_info),
                is_master: has("master"),
                is_data: has("data"),
                is_ingest: has("ingest"),
                is_ml: has("ml"),
                roles,
            }
        })
        .collect();

    Ok(summaries)
}

fn owned_roles(node_info: &Value) -> Vec<String> {
    string_list_at(node_info, &["roles"])
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn ignored_reason(node_info: &Value) -> &'static str {
    if is_kibana_node(node_info) {
        "Kibana"
    } else if string_list_at(node_info, &["roles"]).contains(&"master") {
        "master"
    } else {
        "ML"
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
