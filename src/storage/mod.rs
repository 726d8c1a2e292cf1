//! Storage collaborators for the aggregation engine
//!
//! The engine consumes read-only hierarchy and measurement snapshots and
//! hands the finished summary to a materialization store. All three seams
//! are async traits so callers can back them with SQLite, a remote API, or
//! in-memory fixtures.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::aggregation_core::types::{EmissionSummary, ProcessHierarchy, RawEmissionEntry};

/// Read access to a client's active process hierarchy document.
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    /// `None` when the client has no active hierarchy; the engine treats
    /// that as absence of configuration, not an error.
    async fn active_hierarchy(
        &self,
        client_id: &str,
    ) -> Result<Option<ProcessHierarchy>, Box<dyn std::error::Error>>;
}

/// Read access to raw emission measurements.
#[async_trait]
pub trait MeasurementStore: Send + Sync {
    /// All entries for the client inside the closed interval [from, to]
    /// whose processing status is "processed".
    async fn entries_in_range(
        &self,
        client_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<RawEmissionEntry>, Box<dyn std::error::Error>>;
}

/// Materialization seam for finished summaries. Upsert is keyed on
/// (client id, period storage key).
#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn upsert_summary(
        &self,
        summary: &EmissionSummary,
    ) -> Result<(), Box<dyn std::error::Error>>;

    async fn load_summary(
        &self,
        client_id: &str,
        period_key: &str,
    ) -> Result<Option<EmissionSummary>, Box<dyn std::error::Error>>;
}

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
