use crate::domain::model::UnknownTypeLabel;
use crate::utils::error::{EtlError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> EtlError {
    EtlError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// HealthCenters endpoint or detail-page base: an absolute http(s) URL.
pub fn validate_http_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("Invalid URL: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(field, value, format!("Unsupported URL scheme: {}", scheme))),
    }
}

/// Root directory that the CSV and JSON files are written under.
pub fn validate_output_root(field: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field, path, "Output directory cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field, path, "Path contains null bytes"));
    }
    Ok(())
}

/// CSV / JSON file name, relative to the output root.
pub fn validate_output_file(field: &str, path: &str) -> Result<()> {
    validate_output_root(field, path)?;
    if Path::new(path).is_absolute() {
        return Err(invalid(
            field,
            path,
            "Output file must be relative to the output directory",
        ));
    }
    if path.ends_with('/') || path.ends_with('\\') {
        return Err(invalid(field, path, "Output file must name a file, not a directory"));
    }
    Ok(())
}

pub fn validate_concurrency(field: &str, requests: usize) -> Result<()> {
    if requests == 0 {
        return Err(invalid(field, requests, "At least one page request must be allowed in flight"));
    }
    Ok(())
}

pub fn validate_timeout(field: &str, timeout: Option<Duration>) -> Result<()> {
    match timeout {
        Some(timeout) if timeout.as_secs() == 0 => Err(invalid(
            field,
            timeout.as_secs(),
            "Timeout must be at least one second",
        )),
        _ => Ok(()),
    }
}

pub fn validate_unknown_label(field: &str, label: &UnknownTypeLabel) -> Result<()> {
    match label {
        UnknownTypeLabel::Sentinel(text) if text.trim().is_empty() => Err(invalid(
            field,
            text,
            "Sentinel label cannot be empty; use the blank policy instead",
        )),
        _ => Ok(()),
    }
}

/// Parses `[type_labels]` entries: integer type codes to non-empty labels.
pub fn parse_type_labels(field: &str, raw: &BTreeMap<String, String>) -> Result<BTreeMap<i64, String>> {
    raw.iter()
        .map(|(code, label)| {
            let parsed = code
                .trim()
                .parse::<i64>()
                .map_err(|e| invalid(field, code, format!("Type code must be an integer: {}", e)))?;
            if label.trim().is_empty() {
                return Err(invalid(field, code, "Type label cannot be empty"));
            }
            Ok((parsed, label.clone()))
        })
        .collect()
}
