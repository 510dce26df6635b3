use std::{fs::File, io::BufReader, path::Path};

use serde_json::Value;

use super::uvcl_struct::{Variant, UVCL};

/// Error type for importing a [`UVCL`]
#[derive(Debug)]
pub enum UVCLImportError {
    /// IO Error
    IO(std::io::Error),
    /// The input is not valid JSON
    JSON(serde_json::Error),
    /// The input is JSON, but does not describe a compressed log
    MalformedInput {
        /// Index of the offending entry (`None` if the top-level value is wrong)
        entry: Option<usize>,
        /// What is wrong with the entry
        reason: String,
    },
}

impl std::fmt::Display for UVCLImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UVCLImportError::IO(e) => write!(f, "IO Error: {}", e),
            UVCLImportError::JSON(e) => write!(f, "JSON Error: {}", e),
            UVCLImportError::MalformedInput {
                entry: Some(i),
                reason,
            } => write!(f, "Malformed log entry {}: {}", i, reason),
            UVCLImportError::MalformedInput {
                entry: None,
                reason,
            } => write!(f, "Malformed log: {}", reason),
        }
    }
}

impl std::error::Error for UVCLImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UVCLImportError::IO(e) => Some(e),
            UVCLImportError::JSON(e) => Some(e),
            UVCLImportError::MalformedInput { .. } => None,
        }
    }
}

impl From<std::io::Error> for UVCLImportError {
    fn from(e: std::io::Error) -> Self {
        UVCLImportError::IO(e)
    }
}

impl From<serde_json::Error> for UVCLImportError {
    fn from(e: serde_json::Error) -> Self {
        UVCLImportError::JSON(e)
    }
}

fn malformed(entry: usize, reason: impl Into<String>) -> UVCLImportError {
    UVCLImportError::MalformedInput {
        entry: Some(entry),
        reason: reason.into(),
    }
}

fn parse_activities(entry: usize, value: &Value) -> Result<Variant, UVCLImportError> {
    let events = value
        .as_array()
        .ok_or_else(|| malformed(entry, "activities must be an array"))?;
    events
        .iter()
        .map(|e| match e {
            Value::String(s) => Ok(s.clone()),
            other => Err(malformed(
                entry,
                format!("activity labels must be strings, found {}", other),
            )),
        })
        .collect()
}

fn parse_count(entry: usize, value: Option<&Value>) -> Result<u64, UVCLImportError> {
    let Some(value) = value else {
        return Ok(1);
    };
    match value.as_u64() {
        Some(0) => Err(malformed(entry, "count must be at least 1")),
        Some(c) => Ok(c),
        None if value.as_i64().is_some() => Err(malformed(
            entry,
            format!("count must not be negative, found {}", value),
        )),
        None => Err(malformed(
            entry,
            format!("count must be an integer, found {}", value),
        )),
    }
}

fn add_checked(
    log: &mut UVCL,
    entry: usize,
    variant: Variant,
    count: u64,
) -> Result<(), UVCLImportError> {
    let stored = log.variants.get(&variant).copied().unwrap_or(0);
    if stored.checked_add(count).is_none() {
        return Err(malformed(entry, "variant count exceeds the u64 range"));
    }
    log.add_variant(variant, count);
    Ok(())
}

///
/// Check that a [`UVCL`] can be mined
///
/// Rejects variants with count 0 and logs whose number of traces or events
/// does not fit into a [`u64`].
///
pub fn validate_uvcl(log: &UVCL) -> Result<(), UVCLImportError> {
    if let Some(entry) = log.iter().position(|(_, count)| *count == 0) {
        return Err(malformed(entry, "variant with count 0"));
    }
    let too_large = |what: &str| UVCLImportError::MalformedInput {
        entry: None,
        reason: format!("number of {} exceeds the u64 range", what),
    };
    log.checked_number_of_traces()
        .ok_or_else(|| too_large("traces"))?;
    log.checked_number_of_events()
        .ok_or_else(|| too_large("events"))?;
    Ok(())
}

///
/// Build a [`UVCL`] from a parsed JSON value
///
/// Two shapes are accepted:
/// - an array of traces, each an array of activity labels (`[["a","b"],["a"]]`)
/// - an array of variant records (`[{"activities": ["a","b"], "count": 3}]`), where
///   `count` defaults to 1
///
/// The resulting log is checked with [`validate_uvcl`].
///
pub fn uvcl_from_json_value(value: &Value) -> Result<UVCL, UVCLImportError> {
    let entries = value
        .as_array()
        .ok_or_else(|| UVCLImportError::MalformedInput {
            entry: None,
            reason: "expected an array of traces".to_string(),
        })?;
    let mut log = UVCL::new();
    for (i, entry) in entries.iter().enumerate() {
        match entry {
            Value::Array(_) => add_checked(&mut log, i, parse_activities(i, entry)?, 1)?,
            Value::Object(record) => {
                let activities = record
                    .get("activities")
                    .ok_or_else(|| malformed(i, "missing field `activities`"))?;
                let variant = parse_activities(i, activities)?;
                let count = parse_count(i, record.get("count"))?;
                add_checked(&mut log, i, variant, count)?;
            }
            other => {
                return Err(malformed(
                    i,
                    format!("expected a trace or a variant record, found {}", other),
                ))
            }
        }
    }
    validate_uvcl(&log)?;
    Ok(log)
}

/// Import a [`UVCL`] from a JSON string (see [`uvcl_from_json_value`] for the accepted shapes)
pub fn import_uvcl_json_from_str(json: &str) -> Result<UVCL, UVCLImportError> {
    let value: Value = serde_json::from_str(json)?;
    uvcl_from_json_value(&value)
}

/// Import a [`UVCL`] from a JSON byte slice
pub fn import_uvcl_json_from_slice(slice: &[u8]) -> Result<UVCL, UVCLImportError> {
    let value: Value = serde_json::from_slice(slice)?;
    uvcl_from_json_value(&value)
}

/// Import a [`UVCL`] from a JSON file given by a filepath
pub fn import_uvcl_json_from_path<P: AsRef<Path>>(path: P) -> Result<UVCL, UVCLImportError> {
    let reader = BufReader::new(File::open(path)?);
    let value: Value = serde_json::from_reader(reader)?;
    uvcl_from_json_value(&value)
}
