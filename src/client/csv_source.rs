use crate::core::Record;
use crate::utils::error::Result;
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// 範本欄位順序：Name, Phone, Age, Address, Company, Position, Education
pub const TEMPLATE_COLUMNS: [&str; 7] = [
    "name",
    "phone",
    "age",
    "address",
    "company",
    "position",
    "education",
];

pub fn read_candidates_file<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let file = std::fs::File::open(path)?;
    parse_candidates(file)
}

/// 取開頭的整數部分 ("29 years" -> 29)，無數字或為 0 時視為未填
fn parse_age(cell: &str) -> Option<i64> {
    let unsigned = cell.trim_start_matches(['+', '-']);
    let sign_len = cell.len() - unsigned.len();
    if sign_len > 1 {
        return None;
    }
    let digits_len = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    cell[..sign_len + digits_len]
        .parse::<i64>()
        .ok()
        .filter(|age| *age != 0)
}

/// Columns are positional; the header row is skipped, not interpreted.
/// Rows without both a name and a phone are dropped.
pub fn parse_candidates<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut candidates = Vec::new();
    let mut dropped = 0usize;

    for row in csv_reader.records() {
        let row = row?;
        let cell = |i: usize| row.get(i).unwrap_or("").to_string();

        let mut record = Record::default();
        for (i, column) in TEMPLATE_COLUMNS.iter().enumerate() {
            let value = if *column == "age" {
                parse_age(&cell(i)).map(Value::from).unwrap_or(Value::Null)
            } else {
                Value::String(cell(i))
            };
            record.insert(column, value);
        }

        let has_name = record.get_str("name").is_some_and(|s| !s.is_empty());
        let has_phone = record.get_str("phone").is_some_and(|s| !s.is_empty());
        if has_name && has_phone {
            candidates.push(record);
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        tracing::warn!("Dropped {} rows without name or phone", dropped);
    }
    tracing::debug!("Parsed {} candidates from CSV", candidates.len());

    Ok(candidates)
}
