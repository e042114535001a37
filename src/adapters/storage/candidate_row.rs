use crate::core::ingest::{CANDIDATE_UNIQUE_KEY, UPLOAD_BATCH_FIELD};
use crate::core::Record;
use crate::utils::error::{IntakeError, Result};
use serde_json::{Map, Value};

/// `candidates` 資料表的一列。已知欄位對應到欄位，其餘欄位放進 `extra` (jsonb)。
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRow {
    pub phone: String,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub address: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub education: Option<String>,
    pub upload_batch: String,
    pub extra: Map<String, Value>,
}

fn optional_text(field: &str, value: Option<Value>) -> Result<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(IntakeError::storage(format!(
            "field `{}` must be a string, got {}",
            field, other
        ))),
    }
}

fn optional_age(value: Option<Value>) -> Result<Option<i32>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| IntakeError::storage(format!("field `age` out of range: {}", n))),
        Some(other) => Err(IntakeError::storage(format!(
            "field `age` must be an integer, got {}",
            other
        ))),
    }
}

impl CandidateRow {
    pub fn from_record(record: Record) -> Result<Self> {
        let mut data = record.data;

        let phone = match data.remove(CANDIDATE_UNIQUE_KEY) {
            Some(Value::String(phone)) => phone,
            Some(other) => {
                return Err(IntakeError::storage(format!(
                    "field `phone` must be a string, got {}",
                    other
                )))
            }
            None => return Err(IntakeError::storage("field `phone` is required")),
        };

        let upload_batch = optional_text(UPLOAD_BATCH_FIELD, data.remove(UPLOAD_BATCH_FIELD))?
            .ok_or_else(|| IntakeError::storage("field `uploadBatch` is required"))?;

        Ok(Self {
            phone,
            name: optional_text("name", data.remove("name"))?,
            age: optional_age(data.remove("age"))?,
            address: optional_text("address", data.remove("address"))?,
            company: optional_text("company", data.remove("company"))?,
            position: optional_text("position", data.remove("position"))?,
            education: optional_text("education", data.remove("education"))?,
            upload_batch,
            extra: data,
        })
    }

    pub fn from_records(records: Vec<Record>) -> Result<Vec<Self>> {
        records.into_iter().map(Self::from_record).collect()
    }

    pub fn into_record(self) -> Record {
        let mut data = self.extra;
        data.insert(CANDIDATE_UNIQUE_KEY.to_string(), Value::String(self.phone));
        let text_fields = [
            ("name", self.name),
            ("address", self.address),
            ("company", self.company),
            ("position", self.position),
            ("education", self.education),
        ];
        for (field, value) in text_fields {
            data.insert(field.to_string(), value.map(Value::String).unwrap_or(Value::Null));
        }
        data.insert(
            "age".to_string(),
            self.age.map(Value::from).unwrap_or(Value::Null),
        );
        data.insert(UPLOAD_BATCH_FIELD.to_string(), Value::String(self.upload_batch));
        Record { data }
    }
}

/// Only `phone` carries a unique constraint on `candidates`.
pub fn ensure_unique_key(unique_key: &str) -> Result<()> {
    if unique_key != CANDIDATE_UNIQUE_KEY {
        return Err(IntakeError::storage(format!(
            "no unique constraint on candidates.{}",
            unique_key
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_known_fields_map_to_columns_and_rest_to_extra() {
        let row = CandidateRow::from_record(record(json!({
            "phone": "01012345678",
            "name": "Omar Khaled",
            "age": 29,
            "company": "Acme",
            "linkedin": "omar-k",
            "uploadBatch": "b1"
        })))
        .unwrap();

        assert_eq!(row.phone, "01012345678");
        assert_eq!(row.name.as_deref(), Some("Omar Khaled"));
        assert_eq!(row.age, Some(29));
        assert_eq!(row.address, None);
        assert_eq!(row.upload_batch, "b1");
        assert_eq!(row.extra.get("linkedin"), Some(&json!("omar-k")));
        assert!(!row.extra.contains_key("phone"));
    }

    #[test]
    fn test_missing_phone_is_storage_error() {
        let result = CandidateRow::from_record(record(json!({ "name": "x", "uploadBatch": "b" })));
        assert!(matches!(result, Err(IntakeError::StorageError { .. })));
    }

    #[test]
    fn test_numeric_phone_is_rejected() {
        let result = CandidateRow::from_record(record(json!({ "phone": 123, "uploadBatch": "b" })));
        assert!(result.is_err());
    }

    #[test]
    fn test_null_age_is_allowed() {
        let row = CandidateRow::from_record(record(json!({
            "phone": "1", "age": null, "uploadBatch": "b"
        })))
        .unwrap();
        assert_eq!(row.age, None);
    }

    #[test]
    fn test_ensure_unique_key() {
        assert!(ensure_unique_key("phone").is_ok());
        assert!(ensure_unique_key("name").is_err());
    }
}
