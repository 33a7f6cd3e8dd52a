use super::normalizer::{canonical_header, fold_header};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::io::Read;
use tracing::warn;

/// One line of a single-subject grade export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubjectRow {
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub email: Option<String>,
    /// Raw cell, e.g. `"14 / 20"`; parsed by the merger.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub score: Option<String>,
}

/// One line of the identity export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdentityRow {
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub choice: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub email: Option<String>,
}

pub(crate) const NAME_COLUMNS: [&str; 2] = ["last_name", "first_name"];
pub(crate) const SUBJECT_OPTIONAL_COLUMNS: [&str; 1] = ["score"];
pub(crate) const IDENTITY_OPTIONAL_COLUMNS: [&str; 2] = ["birth_date", "choice"];

/// Deserialized rows plus the optional columns the header row lacked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRows<T> {
    pub rows: Vec<T>,
    pub missing_optional: Vec<&'static str>,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),
}

pub(crate) fn parse_rows<R, T>(
    reader: R,
    required: &[&'static str],
    optional: &[&'static str],
) -> Result<ParsedRows<T>, ParseError>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = canonicalize_headers(csv_reader.headers()?);
    let missing = absent_columns(&headers, required);
    if !missing.is_empty() {
        return Err(ParseError::MissingColumns(missing));
    }
    let missing_optional = absent_columns(&headers, optional);
    csv_reader.set_headers(headers);

    let mut rows = Vec::new();
    for row in csv_reader.deserialize::<T>() {
        rows.push(row?);
    }
    Ok(ParsedRows {
        rows,
        missing_optional,
    })
}

fn absent_columns(headers: &csv::StringRecord, columns: &[&'static str]) -> Vec<&'static str> {
    columns
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect()
}

/// Renames recognised headers to field names. Only the first occurrence of a
/// field is mapped so duplicate columns never collide during deserialization.
fn canonicalize_headers(raw: &csv::StringRecord) -> csv::StringRecord {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|header| match canonical_header(header) {
            Some(field) if seen.insert(field) => field.to_string(),
            _ => format!("unmapped:{}", fold_header(header)),
        })
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.and_then(|value| {
        let parsed = parse_date(&value);
        if parsed.is_none() && !value.trim().is_empty() {
            warn!(value = %value.trim(), "unrecognised birth date, leaving it empty");
        }
        parsed
    }))
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }

    None
}
