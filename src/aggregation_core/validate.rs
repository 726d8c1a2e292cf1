//! Allocation validator - percentage conservation checks
//!
//! Advisory only. Detected imbalance is reported to hierarchy-editing
//! callers; it never gates the aggregation engine, which instead tracks the
//! imbalance as an unallocated remainder per scope identifier.

use serde::Serialize;

use super::index::{build_allocation_index, AllocationIndex, IndexOptions};
use super::types::ProcessHierarchy;

/// Tolerance on |sum - 100| for shared identifiers.
pub const CONSERVATION_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationError {
    pub scope_identifier: String,
    pub current_sum: f64,
    pub expected_sum: f64,
    /// Labels of the nodes contributing to the broken group.
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationValidation {
    pub is_valid: bool,
    pub errors: Vec<AllocationError>,
    pub warnings: Vec<String>,
}

/// Check percentage conservation for every shared scope identifier in the
/// hierarchy. Violations are reported, never corrected.
pub fn validate_allocations(
    hierarchy: &ProcessHierarchy,
    options: IndexOptions,
) -> AllocationValidation {
    let index = build_allocation_index(hierarchy, options);
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (identifier, entries) in &index {
        if entries.len() < 2 {
            continue;
        }

        let sum: f64 = entries.iter().map(|e| e.allocation_pct).sum();
        if (sum - 100.0).abs() > CONSERVATION_EPSILON {
            errors.push(AllocationError {
                scope_identifier: identifier.clone(),
                current_sum: sum,
                expected_sum: 100.0,
                nodes: entries.iter().map(|e| e.node_label.clone()).collect(),
            });
        }

        // A shared identifier where some node still carries the 100% default
        // almost always means the split was never configured.
        for entry in entries {
            if entry.allocation_pct == 100.0 {
                warnings.push(format!(
                    "scope identifier '{}' is shared by {} nodes but '{}' still has the default 100% allocation",
                    identifier,
                    entries.len(),
                    entry.node_label
                ));
            }
        }
    }

    AllocationValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeAllocationDetail {
    pub scope_identifier: String,
    pub node_count: usize,
    pub total_pct: f64,
    pub shared: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationIndexSummary {
    pub total_scope_identifiers: usize,
    pub shared_scope_identifiers: usize,
    pub unique_scope_identifiers: usize,
    pub details: Vec<ScopeAllocationDetail>,
}

/// Read-only display aid for hierarchy-editing UIs.
pub fn allocation_summary(index: &AllocationIndex) -> AllocationIndexSummary {
    let mut details: Vec<ScopeAllocationDetail> = index
        .iter()
        .map(|(identifier, entries)| ScopeAllocationDetail {
            scope_identifier: identifier.clone(),
            node_count: entries.len(),
            total_pct: entries.iter().map(|e| e.allocation_pct).sum(),
            shared: entries.len() > 1,
        })
        .collect();
    details.sort_by(|a, b| a.scope_identifier.cmp(&b.scope_identifier));

    let shared = details.iter().filter(|d| d.shared).count();
    AllocationIndexSummary {
        total_scope_identifiers: details.len(),
        shared_scope_identifiers: shared,
        unique_scope_identifiers: details.len() - shared,
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation_core::types::{
        AssignmentStatus, ProcessNode, ScopeAssignment, ScopeType,
    };

    fn node_with(id: &str, identifier: &str, pct: Option<f64>) -> ProcessNode {
        ProcessNode {
            id: id.to_string(),
            label: format!("Node {}", id),
            department: None,
            location: None,
            scope_assignments: vec![ScopeAssignment {
                scope_identifier: identifier.to_string(),
                scope_type: ScopeType::Scope2,
                category_name: String::new(),
                activity: String::new(),
                allocation_pct: pct,
                status: AssignmentStatus::Active,
            }],
        }
    }

    #[test]
    fn test_balanced_split_is_valid() {
        let hierarchy = ProcessHierarchy {
            nodes: vec![
                node_with("a", "elec-01", Some(60.0)),
                node_with("b", "elec-01", Some(40.0)),
            ],
        };

        let result = validate_allocations(&hierarchy, IndexOptions::default());
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_imbalance_reported() {
        let hierarchy = ProcessHierarchy {
            nodes: vec![
                node_with("a", "elec-01", Some(60.0)),
                node_with("b", "elec-01", Some(30.0)),
            ],
        };

        let result = validate_allocations(&hierarchy, IndexOptions::default());
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        let err = &result.errors[0];
        assert_eq!(err.scope_identifier, "elec-01");
        assert!((err.current_sum - 90.0).abs() < 1e-9);
        assert_eq!(err.expected_sum, 100.0);
        assert_eq!(err.nodes.len(), 2);
    }

    #[test]
    fn test_shared_default_100_warns() {
        let hierarchy = ProcessHierarchy {
            nodes: vec![
                node_with("a", "elec-01", None),
                node_with("b", "elec-01", Some(50.0)),
            ],
        };

        let result = validate_allocations(&hierarchy, IndexOptions::default());
        // 150% sum is an error and the default-100 entry warns.
        assert!(!result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("default 100%"));
    }

    #[test]
    fn test_single_owner_never_flagged() {
        let hierarchy = ProcessHierarchy {
            nodes: vec![node_with("a", "elec-01", None)],
        };

        let result = validate_allocations(&hierarchy, IndexOptions::default());
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_allocation_summary_counts() {
        let hierarchy = ProcessHierarchy {
            nodes: vec![
                node_with("a", "elec-01", Some(60.0)),
                node_with("b", "elec-01", Some(40.0)),
                node_with("c", "gas-01", None),
            ],
        };

        let index = build_allocation_index(&hierarchy, IndexOptions::default());
        let summary = allocation_summary(&index);
        assert_eq!(summary.total_scope_identifiers, 2);
        assert_eq!(summary.shared_scope_identifiers, 1);
        assert_eq!(summary.unique_scope_identifiers, 1);
        assert_eq!(summary.details[0].scope_identifier, "elec-01");
        assert!(summary.details[0].shared);
        assert_eq!(summary.details[0].total_pct, 100.0);
    }
}
