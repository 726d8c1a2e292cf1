//! Aggregation engine - orchestrates filtering, allocation and accumulation
//!
//! One invocation is a linear pipeline over immutable snapshots: fetch the
//! hierarchy and the period's raw entries (concurrently, no data dependency),
//! then run the pure accumulation loop and finalize. The engine never
//! propagates an error to its caller; any failure inside the pipeline is
//! converted into a zero-shaped summary with `has_errors` set.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use super::extract::extract_gas_values;
use super::apply::apply_allocation;
use super::finalize::finalize_breakdowns;
use super::index::{build_allocation_index, normalize_scope_identifier, AllocationIndex, IndexOptions};
use super::period::ReportingPeriod;
use super::types::{EmissionSummary, RawEmissionEntry};
use crate::storage::{HierarchyStore, MeasurementStore};

/// Allocated CO2e below this contributes nothing and is dropped. The raw
/// entry still counts toward filtering statistics.
pub const NEGLIGIBLE_CO2E: f64 = 0.0001;

const PROCESSED_STATUS: &str = "processed";

pub struct AggregationEngine {
    hierarchies: Arc<dyn HierarchyStore>,
    measurements: Arc<dyn MeasurementStore>,
}

impl AggregationEngine {
    pub fn new(
        hierarchies: Arc<dyn HierarchyStore>,
        measurements: Arc<dyn MeasurementStore>,
    ) -> Self {
        Self {
            hierarchies,
            measurements,
        }
    }

    /// Compute the allocation-correct emission summary for one client and
    /// period. Never fails: configuration absence yields a complete zero
    /// summary, and pipeline failures yield the same shape with
    /// `has_errors=true` and `is_complete=false`.
    pub async fn compute_summary(
        &self,
        client_id: &str,
        period: &ReportingPeriod,
        actor_id: &str,
    ) -> EmissionSummary {
        let started = Instant::now();
        log::info!(
            "computing emission summary for client {} period {}",
            client_id,
            period.storage_key()
        );

        let mut summary = match self.compute_inner(client_id, period, actor_id).await {
            Ok(summary) => summary,
            Err(e) => {
                log::error!(
                    "emission summary failed for client {} period {}: {}",
                    client_id,
                    period.storage_key(),
                    e
                );
                let mut failed = EmissionSummary::zeroed(client_id, period, actor_id);
                failed.metadata.is_complete = false;
                failed.metadata.has_errors = true;
                failed.metadata.errors.push(e.to_string());
                failed
            }
        };

        summary.metadata.calculation_duration_ms = started.elapsed().as_millis() as u64;
        log::info!(
            "summary for client {} period {}: {:.4} tCO2e from {} entries ({} filtered) in {}ms",
            client_id,
            period.storage_key(),
            summary.total_emissions.co2e,
            summary.metadata.data_entries_included,
            summary.metadata.data_entries_filtered,
            summary.metadata.calculation_duration_ms
        );
        summary
    }

    async fn compute_inner(
        &self,
        client_id: &str,
        period: &ReportingPeriod,
        actor_id: &str,
    ) -> Result<EmissionSummary, Box<dyn std::error::Error>> {
        let (from, to) = period.date_range()?;

        // Independent fetches; both must complete before accumulation.
        let (hierarchy, entries) = tokio::join!(
            self.hierarchies.active_hierarchy(client_id),
            self.measurements.entries_in_range(client_id, from, to)
        );
        let hierarchy = hierarchy?;
        let entries = entries?;

        let mut summary = EmissionSummary::zeroed(client_id, period, actor_id);

        let hierarchy = match hierarchy {
            Some(h) if !h.nodes.is_empty() => h,
            _ => {
                // Absence of configuration is not an error.
                summary
                    .metadata
                    .notes
                    .push("no active hierarchy configured".to_string());
                finalize_breakdowns(&mut summary);
                return Ok(summary);
            }
        };

        let index = build_allocation_index(&hierarchy, IndexOptions::default());
        if index.is_empty() {
            summary
                .metadata
                .notes
                .push("hierarchy has no aggregatable scope assignments".to_string());
            finalize_breakdowns(&mut summary);
            return Ok(summary);
        }

        log::debug!(
            "client {}: {} index entries, {} raw entries in [{}, {}]",
            client_id,
            index.len(),
            entries.len(),
            from,
            to
        );

        accumulate_entries(&mut summary, &index, &entries);
        finalize_breakdowns(&mut summary);
        Ok(summary)
    }
}

fn accumulate_entries(
    summary: &mut EmissionSummary,
    index: &AllocationIndex,
    entries: &[RawEmissionEntry],
) {
    let mut included: u64 = 0;
    let mut filtered: u64 = 0;
    let mut included_ids: BTreeSet<String> = BTreeSet::new();
    let mut shared_identifiers: BTreeSet<String> = BTreeSet::new();

    for entry in entries {
        // The store pre-filters, but the contract belongs to the engine.
        if entry.processing_status != PROCESSED_STATUS {
            continue;
        }

        let key = normalize_scope_identifier(&entry.scope_identifier);
        let allocations = match index.get(&key) {
            Some(allocations) => allocations,
            None => {
                filtered += 1;
                continue;
            }
        };

        let raw = extract_gas_values(&entry.calculated_emissions);
        if raw.co2e == 0.0 {
            // Empty contribution; neither included nor filtered.
            continue;
        }

        included += 1;
        included_ids.insert(entry.id.clone());
        if allocations.len() > 1 {
            shared_identifiers.insert(key.clone());
        }

        // Raw totals are per entry, before any split.
        summary
            .by_scope_identifier
            .entry(key.clone())
            .or_default()
            .raw_emissions
            .accumulate(&raw);

        for allocation in allocations {
            let allocated = apply_allocation(&raw, allocation.allocation_pct);
            if allocated.co2e < NEGLIGIBLE_CO2E {
                continue;
            }

            let scope_type_key = allocation.scope_type.as_str();

            summary.total_emissions.accumulate(&allocated);

            let scope_bucket = summary
                .by_scope_type
                .entry(scope_type_key.to_string())
                .or_default();
            scope_bucket.emissions.accumulate(&allocated);
            scope_bucket.data_points += 1;

            if !allocation.category_name.is_empty() {
                let category = summary
                    .by_category
                    .entry(allocation.category_name.clone())
                    .or_default();
                category.emissions.accumulate(&allocated);
                if !allocation.activity.is_empty() {
                    category
                        .activities
                        .entry(allocation.activity.clone())
                        .or_default()
                        .accumulate(&allocated);
                }
            }

            if !allocation.activity.is_empty() {
                summary
                    .by_activity
                    .entry(allocation.activity.clone())
                    .or_default()
                    .accumulate(&allocated);
            }

            let node = summary
                .by_node
                .entry(allocation.node_id.clone())
                .or_default();
            if node.label.is_empty() {
                node.label = allocation.node_label.clone();
            }
            node.emissions.accumulate(&allocated);
            node.by_scope_identifier
                .entry(key.clone())
                .or_default()
                .accumulate(&allocated);
            node.by_scope_type
                .entry(scope_type_key.to_string())
                .or_default()
                .accumulate(&allocated);

            let identifier_bucket = summary
                .by_scope_identifier
                .entry(key.clone())
                .or_default();
            identifier_bucket.allocated_emissions.accumulate(&allocated);
            let share = identifier_bucket
                .nodes
                .entry(allocation.node_id.clone())
                .or_default();
            if share.label.is_empty() {
                share.label = allocation.node_label.clone();
            }
            share.allocation_pct = allocation.allocation_pct;
            share.emissions.accumulate(&allocated);

            if let Some(department) = &allocation.department {
                if !department.is_empty() {
                    summary
                        .by_department
                        .entry(department.clone())
                        .or_default()
                        .accumulate(&allocated);
                }
            }

            if let Some(location) = &allocation.location {
                if !location.is_empty() {
                    summary
                        .by_location
                        .entry(location.clone())
                        .or_default()
                        .accumulate(&allocated);
                }
            }

            summary
                .by_input_type
                .entry(entry.input_type.as_str().to_string())
                .or_default()
                .accumulate(&allocated);

            if let Some(factor_id) = &entry.emission_factor_id {
                if !factor_id.is_empty() {
                    let factor = summary
                        .by_emission_factor
                        .entry(factor_id.clone())
                        .or_default();
                    factor.emissions.accumulate(&allocated);
                    *factor
                        .contributions_by_scope_type
                        .entry(scope_type_key.to_string())
                        .or_default() += 1;
                }
            }
        }
    }

    summary.metadata.total_data_points = included;
    summary.metadata.data_entries_included = included;
    summary.metadata.data_entries_filtered = filtered;
    summary.metadata.included_entry_ids = included_ids.into_iter().collect();
    summary.metadata.shared_scope_identifiers = shared_identifiers.len() as u64;
}
