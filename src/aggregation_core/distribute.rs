//! Auto-distribution helper - one-time equal-split fix-up
//!
//! Used by maintenance tooling to repair shared scope identifiers whose
//! allocations were never configured. Not on the aggregation hot path.

use serde::Serialize;

use super::index::normalize_scope_identifier;
use super::types::{AssignmentStatus, ProcessHierarchy};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedAllocation {
    pub node_id: String,
    pub allocation_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionOutcome {
    pub distributed: bool,
    pub allocations: Vec<AppliedAllocation>,
}

/// Split a shared scope identifier equally across its active assignments,
/// mutating the hierarchy in place. Each share is floored to 2 decimals and
/// the rounding remainder goes to the last assignment so the sum is exactly
/// 100. No-op if the identifier is not actually shared.
pub fn auto_distribute(
    hierarchy: &mut ProcessHierarchy,
    scope_identifier: &str,
) -> DistributionOutcome {
    let key = normalize_scope_identifier(scope_identifier);

    let mut targets: Vec<(usize, usize)> = Vec::new();
    for (node_idx, node) in hierarchy.nodes.iter().enumerate() {
        for (assignment_idx, assignment) in node.scope_assignments.iter().enumerate() {
            if assignment.status == AssignmentStatus::Active
                && normalize_scope_identifier(&assignment.scope_identifier) == key
            {
                targets.push((node_idx, assignment_idx));
            }
        }
    }

    if targets.len() < 2 {
        return DistributionOutcome {
            distributed: false,
            allocations: Vec::new(),
        };
    }

    let count = targets.len();
    let share = (100.0 / count as f64 * 100.0).floor() / 100.0;
    let last_share = round2(100.0 - share * (count - 1) as f64);

    let mut allocations = Vec::with_capacity(count);
    for (position, (node_idx, assignment_idx)) in targets.into_iter().enumerate() {
        let pct = if position == count - 1 { last_share } else { share };
        let node = &mut hierarchy.nodes[node_idx];
        node.scope_assignments[assignment_idx].allocation_pct = Some(pct);
        allocations.push(AppliedAllocation {
            node_id: node.id.clone(),
            allocation_pct: pct,
        });
    }

    log::info!(
        "auto-distributed '{}' across {} assignments ({}% base share)",
        key,
        count,
        share
    );

    DistributionOutcome {
        distributed: true,
        allocations,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation_core::types::{ProcessNode, ScopeAssignment, ScopeType};

    fn node_with(id: &str, identifier: &str, status: AssignmentStatus) -> ProcessNode {
        ProcessNode {
            id: id.to_string(),
            label: format!("Node {}", id),
            department: None,
            location: None,
            scope_assignments: vec![ScopeAssignment {
                scope_identifier: identifier.to_string(),
                scope_type: ScopeType::Scope1,
                category_name: String::new(),
                activity: String::new(),
                allocation_pct: None,
                status,
            }],
        }
    }

    #[test]
    fn test_three_way_split_sums_to_exactly_100() {
        let mut hierarchy = ProcessHierarchy {
            nodes: vec![
                node_with("a", "fuel-01", AssignmentStatus::Active),
                node_with("b", "fuel-01", AssignmentStatus::Active),
                node_with("c", "fuel-01", AssignmentStatus::Active),
            ],
        };

        let outcome = auto_distribute(&mut hierarchy, "fuel-01");
        assert!(outcome.distributed);
        let pcts: Vec<f64> = outcome.allocations.iter().map(|a| a.allocation_pct).collect();
        assert_eq!(pcts, vec![33.33, 33.33, 33.34]);
        assert_eq!(pcts.iter().sum::<f64>(), 100.0);

        // Hierarchy mutated in place
        assert_eq!(
            hierarchy.nodes[0].scope_assignments[0].allocation_pct,
            Some(33.33)
        );
        assert_eq!(
            hierarchy.nodes[2].scope_assignments[0].allocation_pct,
            Some(33.34)
        );
    }

    #[test]
    fn test_even_split_has_no_remainder() {
        let mut hierarchy = ProcessHierarchy {
            nodes: vec![
                node_with("a", "fuel-01", AssignmentStatus::Active),
                node_with("b", "fuel-01", AssignmentStatus::Active),
            ],
        };

        let outcome = auto_distribute(&mut hierarchy, "fuel-01");
        let pcts: Vec<f64> = outcome.allocations.iter().map(|a| a.allocation_pct).collect();
        assert_eq!(pcts, vec![50.0, 50.0]);
    }

    #[test]
    fn test_not_shared_is_noop() {
        let mut hierarchy = ProcessHierarchy {
            nodes: vec![node_with("a", "fuel-01", AssignmentStatus::Active)],
        };

        let outcome = auto_distribute(&mut hierarchy, "fuel-01");
        assert!(!outcome.distributed);
        assert!(outcome.allocations.is_empty());
        assert_eq!(hierarchy.nodes[0].scope_assignments[0].allocation_pct, None);
    }

    #[test]
    fn test_deleted_and_imported_do_not_participate() {
        let mut hierarchy = ProcessHierarchy {
            nodes: vec![
                node_with("a", "fuel-01", AssignmentStatus::Active),
                node_with("b", "fuel-01", AssignmentStatus::Deleted),
                node_with("c", "fuel-01", AssignmentStatus::Imported),
            ],
        };

        // Only one active assignment, so the identifier is not shared.
        let outcome = auto_distribute(&mut hierarchy, "fuel-01");
        assert!(!outcome.distributed);
    }

    #[test]
    fn test_match_is_normalized() {
        let mut hierarchy = ProcessHierarchy {
            nodes: vec![
                node_with("a", "Fuel-01", AssignmentStatus::Active),
                node_with("b", " fuel-01", AssignmentStatus::Active),
            ],
        };

        let outcome = auto_distribute(&mut hierarchy, "FUEL-01");
        assert!(outcome.distributed);
        assert_eq!(outcome.allocations.len(), 2);
    }
}
