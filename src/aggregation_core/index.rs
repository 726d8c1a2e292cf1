//! Allocation index builder
//!
//! Maps each scope identifier to the hierarchy nodes claiming a share of it.
//! Pure function over the hierarchy document; no I/O.

use serde::Serialize;
use std::collections::HashMap;

use super::types::{AssignmentStatus, ProcessHierarchy, ScopeType};

/// Filtering flags threaded explicitly through index construction and
/// validation. Passed by value at each call, never ambient state.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOptions {
    /// Include assignments imported from another hierarchy.
    pub include_imported: bool,
    /// Include soft-deleted assignments.
    pub include_deleted: bool,
}

/// One node's claim on a scope identifier, flattened with the node context
/// the aggregation loop needs (category, activity, department, location).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationEntry {
    pub node_id: String,
    pub node_label: String,
    pub allocation_pct: f64,
    pub scope_type: ScopeType,
    pub category_name: String,
    pub activity: String,
    pub department: Option<String>,
    pub location: Option<String>,
}

pub type AllocationIndex = HashMap<String, Vec<AllocationEntry>>;

/// Scope identifiers are matched case-insensitively with surrounding
/// whitespace ignored; raw entries and hierarchy documents have historically
/// disagreed on both.
pub fn normalize_scope_identifier(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Build the scope-identifier → allocation-entry index from a hierarchy.
/// Missing allocation percentages default to 100 (pre-allocation documents).
pub fn build_allocation_index(
    hierarchy: &ProcessHierarchy,
    options: IndexOptions,
) -> AllocationIndex {
    let mut index: AllocationIndex = HashMap::new();

    for node in &hierarchy.nodes {
        for assignment in &node.scope_assignments {
            let included = match assignment.status {
                AssignmentStatus::Active => true,
                AssignmentStatus::Deleted => options.include_deleted,
                AssignmentStatus::Imported => options.include_imported,
            };
            if !included {
                continue;
            }

            let key = normalize_scope_identifier(&assignment.scope_identifier);
            if key.is_empty() {
                continue;
            }

            index.entry(key).or_default().push(AllocationEntry {
                node_id: node.id.clone(),
                node_label: node.label.clone(),
                allocation_pct: assignment.effective_pct(),
                scope_type: assignment.scope_type,
                category_name: assignment.category_name.clone(),
                activity: assignment.activity.clone(),
                department: node.department.clone(),
                location: node.location.clone(),
            });
        }
    }

    index
}
