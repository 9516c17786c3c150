use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Column parsed as a timestamp when an endpoint returns it.
pub const TIME_COLUMN: &str = "hour";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Cell {
    fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(flag) => Cell::Bool(flag),
            Value::Number(number) => match number.as_i64() {
                Some(int) => Cell::Int(int),
                None => number.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
            },
            Value::String(text) => Cell::Text(text),
            nested => Cell::Text(nested.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric view of the cell. Text is parsed leniently; everything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(int) => Some(*int as f64),
            Cell::Float(float) if float.is_finite() => Some(*float),
            Cell::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Cell::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(flag) => write!(f, "{flag}"),
            Cell::Int(int) => write!(f, "{int}"),
            Cell::Float(float) => write!(f, "{float}"),
            Cell::Text(text) => f.write_str(text),
            Cell::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Tabular form of one endpoint response.
///
/// Columns are the union of record keys in first-seen order. A record that
/// lacks a column holds [`Cell::Null`] there, so every row has one cell per
/// column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ResultTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.iter().any(|column| column == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|column| record.remove(column).map(Cell::from_json).unwrap_or(Cell::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of one column, top to bottom. Empty when the column is absent.
    pub fn column(&self, name: &str) -> Vec<&Cell> {
        match self.column_index(name) {
            Some(index) => self.rows.iter().map(|row| &row[index]).collect(),
            None => Vec::new(),
        }
    }

    /// Converts every non-null cell in `name` into a UTC timestamp.
    pub fn parse_timestamps(&mut self, name: &str) -> Result<(), String> {
        let Some(index) = self.column_index(name) else {
            return Ok(());
        };

        for row in &mut self.rows {
            let parsed = match &row[index] {
                Cell::Null => Cell::Null,
                Cell::Timestamp(ts) => Cell::Timestamp(*ts),
                Cell::Text(text) => Cell::Timestamp(
                    parse_timestamp(text)
                        .ok_or_else(|| format!("column '{name}': cannot parse '{text}' as a timestamp"))?,
                ),
                Cell::Int(epoch) => Cell::Timestamp(epoch_timestamp(*epoch).ok_or_else(|| {
                    format!("column '{name}': epoch {epoch} is out of range")
                })?),
                other => {
                    return Err(format!(
                        "column '{name}': expected a timestamp, got '{other}'"
                    ));
                }
            };
            row[index] = parsed;
        }

        Ok(())
    }
}

/// Unix epoch in seconds, milliseconds, microseconds or nanoseconds, told
/// apart by magnitude.
pub fn epoch_timestamp(epoch: i64) -> Option<DateTime<Utc>> {
    match epoch.unsigned_abs() {
        0..100_000_000_000 => DateTime::from_timestamp(epoch, 0),
        100_000_000_000..100_000_000_000_000 => DateTime::from_timestamp_millis(epoch),
        100_000_000_000_000..100_000_000_000_000_000 => DateTime::from_timestamp_micros(epoch),
        _ => Some(DateTime::from_timestamp_nanos(epoch)),
    }
}

/// Accepts RFC 3339 plus the naive `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`
/// forms, which are read as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
