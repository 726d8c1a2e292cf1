//! Data model for the emission aggregation engine
//!
//! Hierarchy and measurement documents are owned by external collaborators
//! and deserialized from their camelCase JSON shape. The engine never mutates
//! them; the only artifact it produces is `EmissionSummary`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::period::ReportingPeriod;

/// Canonical per-gas totals. All values are additive and carried at full
/// precision until the finalizer rounds for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GasValues {
    #[serde(default)]
    pub co2e: f64,
    #[serde(default)]
    pub co2: f64,
    #[serde(default)]
    pub ch4: f64,
    #[serde(default)]
    pub n2o: f64,
    #[serde(default)]
    pub uncertainty: f64,
}

impl GasValues {
    pub fn accumulate(&mut self, other: &GasValues) {
        self.co2e += other.co2e;
        self.co2 += other.co2;
        self.ch4 += other.ch4;
        self.n2o += other.n2o;
        self.uncertainty += other.uncertainty;
    }
}

/// GHG Protocol scope classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeType {
    #[serde(rename = "scope1", alias = "Scope1")]
    Scope1,
    #[serde(rename = "scope2", alias = "Scope2")]
    Scope2,
    #[serde(rename = "scope3", alias = "Scope3")]
    Scope3,
}

impl ScopeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeType::Scope1 => "scope1",
            ScopeType::Scope2 => "scope2",
            ScopeType::Scope3 => "scope3",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "scope1" | "Scope1" => Some(ScopeType::Scope1),
            "scope2" | "Scope2" => Some(ScopeType::Scope2),
            "scope3" | "Scope3" => Some(ScopeType::Scope3),
            _ => None,
        }
    }
}

/// Lifecycle status of a scope assignment. A single exhaustive enum rather
/// than two independent booleans, so filtering can match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStatus {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "deleted")]
    Deleted,
    /// Imported from another hierarchy; excluded from validation and
    /// aggregation unless explicitly requested.
    #[serde(rename = "imported", alias = "imported-from-other-hierarchy")]
    Imported,
}

impl Default for AssignmentStatus {
    fn default() -> Self {
        AssignmentStatus::Active
    }
}

/// How a raw measurement was captured upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputType {
    #[serde(rename = "manual")]
    Manual,
    #[serde(rename = "API", alias = "api")]
    Api,
    #[serde(rename = "IOT", alias = "iot")]
    Iot,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Manual => "manual",
            InputType::Api => "api",
            InputType::Iot => "iot",
        }
    }
}

impl Default for InputType {
    fn default() -> Self {
        InputType::Manual
    }
}

/// One measurable emission source attached to a process node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeAssignment {
    pub scope_identifier: String,
    pub scope_type: ScopeType,
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub activity: String,
    /// Share (0-100) of the identifier's emissions attributed to this node.
    /// Absent means 100 (pre-allocation documents).
    #[serde(default)]
    pub allocation_pct: Option<f64>,
    #[serde(default)]
    pub status: AssignmentStatus,
}

impl ScopeAssignment {
    /// Effective allocation percentage, with the backward-compatible default.
    pub fn effective_pct(&self) -> f64 {
        self.allocation_pct.unwrap_or(100.0)
    }
}

/// Organizational node in the process hierarchy. Read-only to this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub scope_assignments: Vec<ScopeAssignment>,
}

/// The client's active process hierarchy document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessHierarchy {
    #[serde(default)]
    pub nodes: Vec<ProcessNode>,
}

/// One gas contribution inside a raw entry's `calculatedEmissions.incoming`
/// bucket. The CO2e value has shipped under several field names over the
/// product's lifetime; all known variants are kept as optional fields and
/// resolved by `extract::extract_gas_values`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasContribution {
    /// Canonical CO2-equivalent field.
    #[serde(default)]
    pub co2e: Option<f64>,
    /// Legacy field name used by early manual-entry documents.
    #[serde(default)]
    pub emission: Option<f64>,
    /// Legacy uncertainty-inclusive variant.
    #[serde(default)]
    pub co2e_incl_uncertainty: Option<f64>,
    #[serde(default)]
    pub co2: f64,
    #[serde(default)]
    pub ch4: f64,
    #[serde(default)]
    pub n2o: f64,
    #[serde(default)]
    pub uncertainty: f64,
}

/// Calculated emissions attached to a raw entry. Only `incoming` is ever
/// aggregated; `cumulative` carries cross-period running totals and reading
/// it would double count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedEmissions {
    #[serde(default)]
    pub incoming: Vec<GasContribution>,
    #[serde(default)]
    pub cumulative: Vec<GasContribution>,
}

/// Raw per-period measurement produced upstream. Immutable here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEmissionEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub scope_identifier: String,
    pub scope_type: ScopeType,
    #[serde(default)]
    pub input_type: InputType,
    #[serde(default)]
    pub emission_factor_id: Option<String>,
    #[serde(default)]
    pub calculated_emissions: CalculatedEmissions,
    #[serde(default)]
    pub processing_status: String,
}

/// Per-scope-type slice of the summary, with a contribution counter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeTypeBreakdown {
    pub emissions: GasValues,
    pub data_points: u64,
}

/// Per-category slice with nested per-activity sub-totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub emissions: GasValues,
    #[serde(default)]
    pub activities: HashMap<String, GasValues>,
}

/// Per-node slice, with its own scope-identifier and scope-type ledgers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeBreakdown {
    pub label: String,
    pub emissions: GasValues,
    #[serde(default)]
    pub by_scope_identifier: HashMap<String, GasValues>,
    #[serde(default)]
    pub by_scope_type: HashMap<String, GasValues>,
}

/// One node's share of a scope identifier's emissions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeShare {
    pub label: String,
    pub allocation_pct: f64,
    pub emissions: GasValues,
}

/// Per-scope-identifier ledger. Raw totals are summed once per entry;
/// allocated totals and node shares come from the allocation loop. The
/// unallocated fields are filled in by the finalizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeIdentifierBreakdown {
    pub raw_emissions: GasValues,
    pub allocated_emissions: GasValues,
    #[serde(default)]
    pub nodes: HashMap<String, NodeShare>,
    pub allocated_pct: f64,
    pub unallocated_pct: f64,
    pub unallocated_emissions: GasValues,
    pub has_unallocated: bool,
}

/// Per-emission-factor slice with per-scope-type contribution counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionFactorBreakdown {
    pub emissions: GasValues,
    #[serde(default)]
    pub contributions_by_scope_type: HashMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetadata {
    pub total_data_points: u64,
    pub data_entries_included: u64,
    pub data_entries_filtered: u64,
    /// Deduplicated, sorted ids of the raw entries that contributed,
    /// kept for audit traceability.
    #[serde(default)]
    pub included_entry_ids: Vec<String>,
    pub last_calculated: DateTime<Utc>,
    pub calculated_by: String,
    pub is_complete: bool,
    pub has_errors: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    pub calculation_duration_ms: u64,
    pub allocation_applied: bool,
    pub shared_scope_identifiers: u64,
    #[serde(default)]
    pub allocation_warnings: Vec<String>,
    #[serde(default)]
    pub allocation_stats: Option<super::finalize::AllocationStats>,
    /// Non-error annotations, e.g. why a summary is zero-valued.
    #[serde(default)]
    pub notes: Vec<String>,
}

/// The sole output artifact: one reporting period's allocation-correct
/// emission totals and breakdowns. Created fresh per invocation, never
/// mutated in place; persisted by the summary store via upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionSummary {
    pub client_id: String,
    pub period: ReportingPeriod,
    pub total_emissions: GasValues,
    #[serde(default)]
    pub by_scope_type: HashMap<String, ScopeTypeBreakdown>,
    #[serde(default)]
    pub by_category: HashMap<String, CategoryBreakdown>,
    #[serde(default)]
    pub by_activity: HashMap<String, GasValues>,
    #[serde(default)]
    pub by_node: HashMap<String, NodeBreakdown>,
    #[serde(default)]
    pub by_scope_identifier: HashMap<String, ScopeIdentifierBreakdown>,
    #[serde(default)]
    pub by_department: HashMap<String, GasValues>,
    #[serde(default)]
    pub by_location: HashMap<String, GasValues>,
    #[serde(default)]
    pub by_input_type: HashMap<String, GasValues>,
    #[serde(default)]
    pub by_emission_factor: HashMap<String, EmissionFactorBreakdown>,
    pub metadata: SummaryMetadata,
}

impl EmissionSummary {
    /// Fresh all-zero summary. Callers set completeness and error fields.
    pub fn zeroed(client_id: &str, period: &ReportingPeriod, actor_id: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            period: period.clone(),
            total_emissions: GasValues::default(),
            by_scope_type: HashMap::new(),
            by_category: HashMap::new(),
            by_activity: HashMap::new(),
            by_node: HashMap::new(),
            by_scope_identifier: HashMap::new(),
            by_department: HashMap::new(),
            by_location: HashMap::new(),
            by_input_type: HashMap::new(),
            by_emission_factor: HashMap::new(),
            metadata: SummaryMetadata {
                total_data_points: 0,
                data_entries_included: 0,
                data_entries_filtered: 0,
                included_entry_ids: Vec::new(),
                last_calculated: Utc::now(),
                calculated_by: actor_id.to_string(),
                is_complete: true,
                has_errors: false,
                errors: Vec::new(),
                calculation_duration_ms: 0,
                allocation_applied: true,
                shared_scope_identifiers: 0,
                allocation_warnings: Vec::new(),
                allocation_stats: None,
                notes: Vec::new(),
            },
        }
    }
}
