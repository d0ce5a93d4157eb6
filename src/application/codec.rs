//! Record codecs for the two supported source formats.
//!
//! Tabular sources are CSV with one row per item; structured sources are a
//! JSON array of records. Both decode to `ItemRecord`s in file order.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{ItemId, ItemRecord, Metadata, Nested, Scalar};

/// Columns with a fixed meaning; anything else is metadata.
pub const RECORD_COLUMNS: [&str; 8] = [
    "id", "name", "level", "grouping", "parent", "score", "weight", "children",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Spreadsheet-like rows (CSV)
    Tabular,
    /// Array of record objects (JSON)
    Records,
}

impl SourceFormat {
    /// Format implied by a file extension.
    pub fn from_path(path: &Path) -> ApplicationResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Tabular => "csv",
            SourceFormat::Records => "json",
        }
    }
}

impl FromStr for SourceFormat {
    type Err = ApplicationError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.to_ascii_lowercase().as_str() {
            "csv" | "tabular" => Ok(SourceFormat::Tabular),
            "json" | "records" => Ok(SourceFormat::Records),
            _ => Err(ApplicationError::UnsupportedFormat(tag.to_string())),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

#[instrument(level = "debug", skip(content))]
pub fn decode_records(content: &str, format: SourceFormat) -> ApplicationResult<Vec<ItemRecord>> {
    let records = match format {
        SourceFormat::Tabular => decode_csv(content)?,
        SourceFormat::Records => serde_json::from_str(content)
            .map_err(|e| ApplicationError::codec("parse json records", e))?,
    };
    debug!("decoded {} records", records.len());
    Ok(records)
}

pub fn encode_records(records: &[ItemRecord], format: SourceFormat) -> ApplicationResult<String> {
    match format {
        SourceFormat::Tabular => encode_csv(records),
        SourceFormat::Records => serde_json::to_string_pretty(records)
            .map_err(|e| ApplicationError::codec("serialize json records", e)),
    }
}

pub fn encode_nested(nested: &Nested) -> ApplicationResult<String> {
    serde_json::to_string_pretty(nested)
        .map_err(|e| ApplicationError::codec("serialize nested taxonomy", e))
}

fn decode_csv(content: &str) -> ApplicationResult<Vec<ItemRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| ApplicationError::codec("read csv header", e))?
        .clone();

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let line = result.map_err(|e| ApplicationError::codec(format!("read csv row {}", row + 1), e))?;
        records.push(
            row_to_record(&headers, &line)
                .map_err(|reason| ApplicationError::codec(format!("decode csv row {}", row + 1), reason))?,
        );
    }
    Ok(records)
}

fn row_to_record(headers: &StringRecord, row: &StringRecord) -> Result<ItemRecord, String> {
    let cell = |column: &str| cell_at(headers, row, column);

    let id = parse_id(cell("id"))?.ok_or("missing id")?;
    let metadata: Metadata = headers
        .iter()
        .zip(row.iter())
        .filter(|(h, _)| !h.is_empty() && !RECORD_COLUMNS.contains(h))
        .map(|(h, v)| (h.to_string(), Scalar::parse(v)))
        .collect();

    Ok(ItemRecord {
        id,
        name: cell("name").to_string(),
        level: parse_level(cell("level"))?,
        grouping: Some(cell("grouping"))
            .filter(|g| !g.is_empty())
            .map(str::to_string),
        parent: parse_id(cell("parent"))?,
        weight: parse_number(cell("weight"), 1.0)?,
        score: parse_number(cell("score"), 0.0)?,
        children: parse_id_list(cell("children"))?,
        metadata,
    })
}

fn cell_at<'a>(headers: &StringRecord, row: &'a StringRecord, column: &str) -> &'a str {
    headers
        .iter()
        .position(|h| h == column)
        .and_then(|pos| row.get(pos))
        .unwrap_or_default()
}

/// Ids may come through spreadsheets as floats ("3.0").
fn parse_id(raw: &str) -> Result<Option<ItemId>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Ok(Some(ItemId(i)));
    }
    match raw.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 => Ok(Some(ItemId(f as i64))),
        _ => Err(format!("invalid id: {}", raw)),
    }
}

fn parse_number(raw: &str, default: f64) -> Result<f64, String> {
    if raw.is_empty() {
        return Ok(default);
    }
    raw.parse::<f64>()
        .map_err(|_| format!("invalid number: {}", raw))
}

/// Non-negative whole numbers only; "2.0" is accepted like ids are.
fn parse_level(raw: &str) -> Result<u32, String> {
    if raw.is_empty() {
        return Ok(0);
    }
    let invalid = || format!("invalid level: {}", raw);
    if let Ok(i) = raw.parse::<i64>() {
        return u32::try_from(i).map_err(|_| invalid());
    }
    match raw.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&f) => Ok(f as u32),
        _ => Err(invalid()),
    }
}

/// `[1, 2, 3]` or `1, 2, 3`; empty means no children.
fn parse_id_list(raw: &str) -> Result<Option<Vec<ItemId>>, String> {
    let inner = raw.trim_start_matches('[').trim_end_matches(']').trim();
    if inner.is_empty() {
        return Ok(None);
    }
    inner
        .split(',')
        .map(|part| parse_id(part.trim())?.ok_or_else(|| format!("invalid children: {}", raw)))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn encode_csv(records: &[ItemRecord]) -> ApplicationResult<String> {
    let meta_columns: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.metadata.keys().map(String::as_str))
        .collect();

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    let header = RECORD_COLUMNS.iter().copied().chain(meta_columns.iter().copied());
    writer
        .write_record(header)
        .map_err(|e| ApplicationError::codec("write csv header", e))?;

    for record in records {
        let mut row = vec![
            record.id.to_string(),
            record.name.clone(),
            record.level.to_string(),
            record.grouping.clone().unwrap_or_default(),
            record.parent.map(|p| p.to_string()).unwrap_or_default(),
            record.score.to_string(),
            record.weight.to_string(),
            record
                .children
                .as_ref()
                .map(|c| format!("[{}]", c.iter().join(", ")))
                .unwrap_or_default(),
        ];
        row.extend(
            meta_columns
                .iter()
                .map(|col| record.metadata.get(*col).map(|v| v.to_string()).unwrap_or_default()),
        );
        writer
            .write_record(&row)
            .map_err(|e| ApplicationError::codec(format!("write csv row {}", record.id), e))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ApplicationError::codec("flush csv", e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ApplicationError::codec("encode csv as utf-8", e))
}
