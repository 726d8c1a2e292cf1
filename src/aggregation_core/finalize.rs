//! Allocation breakdown finalizer
//!
//! Post-processes the per-scope-identifier ledgers built during aggregation:
//! computes unallocated remainders, emits deduplicated warnings, rounds all
//! reportable gas values, and produces aggregate allocation statistics.
//! Rounding happens only here - accumulation carries full precision.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::apply::apply_allocation;
use super::types::{EmissionSummary, GasValues};

/// Unallocated percentage below this is treated as fully allocated.
pub const UNALLOCATED_EPSILON: f64 = 0.01;

const REPORT_DECIMALS: f64 = 10_000.0;

/// Aggregate allocation statistics for one finalized summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationStats {
    pub total_scopes_processed: u64,
    pub total_unallocated_scopes: u64,
    pub total_fully_allocated_scopes: u64,
    pub allocation_coverage_percent: f64,
}

/// Finalize a summary in place and return the allocation statistics. Also
/// records the statistics and any unallocated-remainder warnings in the
/// summary metadata.
pub fn finalize_breakdowns(summary: &mut EmissionSummary) -> AllocationStats {
    let mut warnings: BTreeSet<String> = BTreeSet::new();
    let mut unallocated_scopes = 0u64;

    for (identifier, breakdown) in summary.by_scope_identifier.iter_mut() {
        let allocated: f64 = breakdown.nodes.values().map(|n| n.allocation_pct).sum();
        let unallocated = (100.0 - allocated).max(0.0);

        breakdown.allocated_pct = allocated;
        breakdown.unallocated_pct = unallocated;
        breakdown.unallocated_emissions = apply_allocation(&breakdown.raw_emissions, unallocated);
        breakdown.has_unallocated = unallocated > UNALLOCATED_EPSILON;

        if breakdown.has_unallocated {
            unallocated_scopes += 1;
            warnings.insert(format!(
                "scope identifier '{}' has {:.2}% unallocated emissions ({:.4} tCO2e unassigned)",
                identifier,
                unallocated,
                round4(breakdown.unallocated_emissions.co2e)
            ));
        }
    }

    round_summary(summary);

    let processed = summary.by_scope_identifier.len() as u64;
    let fully_allocated = processed - unallocated_scopes;
    let stats = AllocationStats {
        total_scopes_processed: processed,
        total_unallocated_scopes: unallocated_scopes,
        total_fully_allocated_scopes: fully_allocated,
        allocation_coverage_percent: if processed == 0 {
            100.0
        } else {
            fully_allocated as f64 / processed as f64 * 100.0
        },
    };

    summary.metadata.allocation_warnings = warnings.into_iter().collect();
    summary.metadata.allocation_stats = Some(stats.clone());
    stats
}

fn round4(value: f64) -> f64 {
    (value * REPORT_DECIMALS).round() / REPORT_DECIMALS
}

fn round_gases(values: &mut GasValues) {
    values.co2e = round4(values.co2e);
    values.co2 = round4(values.co2);
    values.ch4 = round4(values.ch4);
    values.n2o = round4(values.n2o);
    values.uncertainty = round4(values.uncertainty);
}

/// Round every reportable gas value to 4 decimal places.
fn round_summary(summary: &mut EmissionSummary) {
    round_gases(&mut summary.total_emissions);

    for breakdown in summary.by_scope_type.values_mut() {
        round_gases(&mut breakdown.emissions);
    }
    for breakdown in summary.by_category.values_mut() {
        round_gases(&mut breakdown.emissions);
        for values in breakdown.activities.values_mut() {
            round_gases(values);
        }
    }
    for values in summary.by_activity.values_mut() {
        round_gases(values);
    }
    for breakdown in summary.by_node.values_mut() {
        round_gases(&mut breakdown.emissions);
        for values in breakdown.by_scope_identifier.values_mut() {
            round_gases(values);
        }
        for values in breakdown.by_scope_type.values_mut() {
            round_gases(values);
        }
    }
    for breakdown in summary.by_scope_identifier.values_mut() {
        round_gases(&mut breakdown.raw_emissions);
        round_gases(&mut breakdown.allocated_emissions);
        round_gases(&mut breakdown.unallocated_emissions);
        for share in breakdown.nodes.values_mut() {
            round_gases(&mut share.emissions);
        }
    }
    for values in summary.by_department.values_mut() {
        round_gases(values);
    }
    for values in summary.by_location.values_mut() {
        round_gases(values);
    }
    for values in summary.by_input_type.values_mut() {
        round_gases(values);
    }
    for breakdown in summary.by_emission_factor.values_mut() {
        round_gases(&mut breakdown.emissions);
    }
}
