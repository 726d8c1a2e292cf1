//! In-memory store backend, used by tests and scenario fixtures

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use super::{HierarchyStore, MeasurementStore, SummaryStore};
use crate::aggregation_core::types::{EmissionSummary, ProcessHierarchy, RawEmissionEntry};

#[derive(Default)]
pub struct InMemoryStore {
    hierarchies: Mutex<HashMap<String, ProcessHierarchy>>,
    entries: Mutex<Vec<(String, RawEmissionEntry)>>,
    summaries: Mutex<HashMap<(String, String), EmissionSummary>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_hierarchy(&self, client_id: &str, hierarchy: ProcessHierarchy) {
        self.hierarchies
            .lock()
            .unwrap()
            .insert(client_id.to_string(), hierarchy);
    }

    pub fn add_entry(&self, client_id: &str, entry: RawEmissionEntry) {
        self.entries
            .lock()
            .unwrap()
            .push((client_id.to_string(), entry));
    }
}

#[async_trait]
impl HierarchyStore for InMemoryStore {
    async fn active_hierarchy(
        &self,
        client_id: &str,
    ) -> Result<Option<ProcessHierarchy>, Box<dyn std::error::Error>> {
        Ok(self.hierarchies.lock().unwrap().get(client_id).cloned())
    }
}

#[async_trait]
impl MeasurementStore for InMemoryStore {
    async fn entries_in_range(
        &self,
        client_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<RawEmissionEntry>, Box<dyn std::error::Error>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(client, entry)| {
                client == client_id
                    && entry.timestamp >= from
                    && entry.timestamp <= to
                    && entry.processing_status == "processed"
            })
            .map(|(_, entry)| entry.clone())
            .collect())
    }
}

#[async_trait]
impl SummaryStore for InMemoryStore {
    async fn upsert_summary(
        &self,
        summary: &EmissionSummary,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let key = (summary.client_id.clone(), summary.period.storage_key());
        self.summaries.lock().unwrap().insert(key, summary.clone());
        Ok(())
    }

    async fn load_summary(
        &self,
        client_id: &str,
        period_key: &str,
    ) -> Result<Option<EmissionSummary>, Box<dyn std::error::Error>> {
        Ok(self
            .summaries
            .lock()
            .unwrap()
            .get(&(client_id.to_string(), period_key.to_string()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation_core::period::ReportingPeriod;
    use crate::aggregation_core::types::{CalculatedEmissions, InputType, ScopeType};
    use chrono::TimeZone;

    fn make_entry(id: &str, timestamp: DateTime<Utc>, status: &str) -> RawEmissionEntry {
        RawEmissionEntry {
            id: id.to_string(),
            timestamp,
            scope_identifier: "elec-01".to_string(),
            scope_type: ScopeType::Scope2,
            input_type: InputType::Manual,
            emission_factor_id: None,
            calculated_emissions: CalculatedEmissions::default(),
            processing_status: status.to_string(),
        }
    }

    #[tokio::test]
    async fn test_entries_filtered_by_range_and_status() {
        let store = InMemoryStore::new();
        let in_range = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let out_of_range = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();

        store.add_entry("c1", make_entry("e1", in_range, "processed"));
        store.add_entry("c1", make_entry("e2", out_of_range, "processed"));
        store.add_entry("c1", make_entry("e3", in_range, "pending"));
        store.add_entry("c2", make_entry("e4", in_range, "processed"));

        let (from, to) = ReportingPeriod::monthly(2026, 3).date_range().unwrap();
        let entries = store.entries_in_range("c1", from, to).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "e1");
    }

    #[tokio::test]
    async fn test_summary_upsert_replaces() {
        let store = InMemoryStore::new();
        let period = ReportingPeriod::monthly(2026, 3);

        let mut summary = EmissionSummary::zeroed("c1", &period, "tester");
        store.upsert_summary(&summary).await.unwrap();

        summary.total_emissions.co2e = 42.0;
        store.upsert_summary(&summary).await.unwrap();

        let loaded = store
            .load_summary("c1", &period.storage_key())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.total_emissions.co2e, 42.0);
    }
}
