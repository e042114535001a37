use crate::core::{IngestOutcome, Record, Storage};
use crate::utils::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;

// 候選人以 phone 唯一識別 (資料表上有 unique constraint)，批次標籤寫入 uploadBatch
pub const CANDIDATE_UNIQUE_KEY: &str = "phone";
pub const UPLOAD_BATCH_FIELD: &str = "uploadBatch";

/// Caller label when present and non-empty, otherwise `now` as ISO-8601 (UTC, millis).
pub fn resolve_batch_label(label: Option<&str>, now: DateTime<Utc>) -> String {
    match label {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

pub fn annotate_records(records: Vec<Record>, batch_label: &str) -> Vec<Record> {
    records
        .into_iter()
        .map(|mut record| {
            record.insert(UPLOAD_BATCH_FIELD, batch_label);
            record
        })
        .collect()
}

#[derive(Clone)]
pub struct IngestEngine {
    storage: Arc<dyn Storage>,
}

impl IngestEngine {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn ingest(
        &self,
        records: Vec<Record>,
        upload_batch: Option<&str>,
    ) -> Result<IngestOutcome> {
        let submitted = records.len();
        if submitted == 0 {
            tracing::debug!("Empty candidate batch, nothing to insert");
            return Ok(IngestOutcome {
                submitted,
                inserted: 0,
            });
        }

        let label = resolve_batch_label(upload_batch, Utc::now());
        let annotated = annotate_records(records, &label);

        tracing::debug!("Inserting {} candidates for batch {}", submitted, label);
        let inserted = self
            .storage
            .insert_candidates_skipping_conflicts(annotated, CANDIDATE_UNIQUE_KEY)
            .await?;

        let outcome = IngestOutcome {
            submitted,
            inserted,
        };
        tracing::info!(
            batch = %label,
            submitted,
            inserted,
            skipped = outcome.skipped(),
            "📥 Candidate batch ingested"
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::memory::MemoryStorage;
    use crate::utils::error::IntakeError;
    use chrono::TimeZone;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    fn phones(values: &[&str]) -> Vec<Record> {
        values
            .iter()
            .map(|p| record(json!({ "phone": p, "name": format!("Candidate {}", p) })))
            .collect()
    }

    fn engine() -> (IngestEngine, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (IngestEngine::new(storage.clone()), storage)
    }

    #[test]
    fn test_resolve_batch_label_prefers_caller_label() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(resolve_batch_label(Some("march-campaign"), now), "march-campaign");
    }

    #[test]
    fn test_resolve_batch_label_defaults_to_iso_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        assert_eq!(resolve_batch_label(None, now), "2024-03-01T09:30:00.000Z");
        assert_eq!(resolve_batch_label(Some(""), now), "2024-03-01T09:30:00.000Z");
    }

    #[test]
    fn test_annotate_overwrites_caller_supplied_batch_field() {
        let records = vec![record(json!({ "phone": "1", "uploadBatch": "stale" }))];
        let annotated = annotate_records(records, "fresh");
        assert_eq!(annotated[0].get_str(UPLOAD_BATCH_FIELD), Some("fresh"));
    }

    #[tokio::test]
    async fn test_unique_batch_inserts_everything() {
        let (engine, _) = engine();
        let outcome = engine.ingest(phones(&["100", "200", "300"]), None).await.unwrap();
        assert_eq!(outcome.inserted, 3);
        assert_eq!(outcome.skipped(), 0);
    }

    #[tokio::test]
    async fn test_intra_batch_duplicate_is_skipped() {
        let (engine, _) = engine();
        let outcome = engine.ingest(phones(&["111", "111", "222"]), None).await.unwrap();
        assert_eq!(outcome.submitted, 3);
        assert_eq!(outcome.inserted, 2);
    }

    #[tokio::test]
    async fn test_existing_phone_is_skipped() {
        let (engine, _) = engine();
        engine.ingest(phones(&["222"]), None).await.unwrap();

        let outcome = engine.ingest(phones(&["222", "333"]), None).await.unwrap();
        assert_eq!(outcome.inserted, 1);
    }

    #[tokio::test]
    async fn test_resubmitting_same_batch_inserts_nothing() {
        let (engine, _) = engine();
        let batch = phones(&["1", "2", "3", "4"]);

        assert_eq!(engine.ingest(batch.clone(), None).await.unwrap().inserted, 4);
        assert_eq!(engine.ingest(batch, None).await.unwrap().inserted, 0);
    }

    #[tokio::test]
    async fn test_default_label_is_shared_and_parses() {
        let (engine, storage) = engine();
        engine.ingest(phones(&["1", "2", "3"]), None).await.unwrap();

        let stored = storage.candidates().await;
        let labels: Vec<&str> = stored
            .iter()
            .map(|c| c.get_str(UPLOAD_BATCH_FIELD).unwrap())
            .collect();
        assert_eq!(labels.len(), 3);
        assert!(labels.iter().all(|l| *l == labels[0]));
        assert!(DateTime::parse_from_rfc3339(labels[0]).is_ok());
    }

    #[tokio::test]
    async fn test_caller_label_is_applied_to_every_record() {
        let (engine, storage) = engine();
        engine
            .ingest(phones(&["1", "2"]), Some("job-fair-2024"))
            .await
            .unwrap();

        let stored = storage.candidates().await;
        assert!(stored
            .iter()
            .all(|c| c.get_str(UPLOAD_BATCH_FIELD) == Some("job-fair-2024")));
    }

    #[tokio::test]
    async fn test_empty_batch_succeeds_with_zero() {
        let (engine, storage) = engine();
        let outcome = engine.ingest(Vec::new(), None).await.unwrap();
        assert_eq!(outcome.inserted, 0);
        assert!(storage.candidates().await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_record_fails_whole_batch() {
        let (engine, storage) = engine();
        let mut batch = phones(&["1"]);
        batch.push(record(json!({ "phone": "2", "age": "not a number" })));

        let result = engine.ingest(batch, None).await;
        assert!(matches!(result, Err(IntakeError::StorageError { .. })));
        assert!(storage.candidates().await.is_empty());
    }
}
