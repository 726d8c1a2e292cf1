//! Aggregation Core - Allocation-Aware Emission Aggregation Engine
//!
//! This module turns a client's process hierarchy and its raw emission
//! measurements into a multi-dimensional, allocation-correct summary for one
//! reporting period.
//!
//! # Architecture
//!
//! ```text
//! ProcessHierarchy → build_allocation_index → AllocationIndex
//!     ↓                                           ↓
//! validate_allocations (advisory)         AggregationEngine
//!     ↓                                           ↓
//! RawEmissionEntry stream → extract → apply_allocation → accumulators
//!     ↓
//! finalize_breakdowns (unallocated remainders, rounding, stats)
//!     ↓
//! EmissionSummary → SummaryStore (upsert keyed on client + period)
//! ```

pub mod apply;
pub mod distribute;
pub mod engine;
pub mod extract;
pub mod finalize;
pub mod index;
pub mod period;
pub mod types;
pub mod validate;

pub use apply::apply_allocation;
pub use distribute::{auto_distribute, DistributionOutcome};
pub use engine::AggregationEngine;
pub use extract::extract_gas_values;
pub use finalize::{finalize_breakdowns, AllocationStats};
pub use index::{build_allocation_index, normalize_scope_identifier, AllocationEntry, AllocationIndex, IndexOptions};
pub use period::{PeriodType, ReportingPeriod};
pub use types::{
    AssignmentStatus, EmissionSummary, GasValues, InputType, ProcessHierarchy, ProcessNode,
    RawEmissionEntry, ScopeAssignment, ScopeType, SummaryMetadata,
};
pub use validate::{allocation_summary, validate_allocations, AllocationValidation};
