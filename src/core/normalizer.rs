//! Raw employee JSON → canonical rows.
//!
//! Text fields are forgiving (anything can be rendered as text), `phone_clean` nulls out
//! per row, but `age`, `years_of_experience` and `salary` must coerce to integers or the
//! whole batch is rejected.

use crate::domain::model::{Designation, NormalizedRecord, NormalizedTable, RawRecord};
use crate::utils::error::{EtlError, Result};
use serde_json::Value;

/// Characters treated as phone formatting and removed before parsing.
const PHONE_FORMATTING: &[char] = &['+', '-', '(', ')', '.'];

/// Parses a response body that must be a JSON array of objects.
pub fn parse_raw_records(body: &str) -> Result<Vec<RawRecord>> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| EtlError::schema(format!("response body is not valid JSON: {}", e)))?;

    let items = match json {
        Value::Array(items) => items,
        other => {
            return Err(EtlError::schema(format!(
                "expected a JSON array of employee objects, got {}",
                json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(obj) => Ok(RawRecord::from(obj)),
            other => Err(EtlError::schema(format!(
                "element {} is {}, expected an object",
                index,
                json_kind(&other)
            ))),
        })
        .collect()
}

pub fn normalize_table(records: Vec<RawRecord>) -> Result<NormalizedTable> {
    let normalized = records
        .iter()
        .enumerate()
        .map(|(index, raw)| normalize_record(index, raw))
        .collect::<Result<Vec<_>>>()?;

    let null_phones = normalized.iter().filter(|r| r.phone_clean.is_none()).count();
    tracing::debug!(
        "Normalized {} records ({} without a usable phone number)",
        normalized.len(),
        null_phones
    );

    Ok(NormalizedTable::new(normalized))
}

pub fn normalize_record(index: usize, raw: &RawRecord) -> Result<NormalizedRecord> {
    let years_of_experience = required_int(index, raw, "years_of_experience")?;

    Ok(NormalizedRecord {
        full_name: format!(
            "{} {}",
            coerce_text(raw.get("first_name")),
            coerce_text(raw.get("last_name"))
        ),
        email: coerce_text(raw.get("email")),
        phone_clean: clean_phone(raw.get("phone")),
        gender: coerce_text(raw.get("gender")),
        age: required_int(index, raw, "age")?,
        job_title: coerce_text(raw.get("job_title")),
        years_of_experience,
        salary: required_int(index, raw, "salary")?,
        department: coerce_text(raw.get("department")),
        designation: Designation::from_years(years_of_experience),
    })
}

/// Null when the number carries an extension (`x`/`X` anywhere) or does not parse.
pub fn clean_phone(value: Option<&Value>) -> Option<i64> {
    let text = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    if text.chars().any(|c| c.eq_ignore_ascii_case(&'x')) {
        return None;
    }

    let digits: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !PHONE_FORMATTING.contains(c))
        .collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<i64>().ok()
}

pub fn coerce_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Integers, integral floats and integer-looking strings. Everything else is `None`.
pub fn coerce_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                Some(f as i64)
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn required_int(index: usize, raw: &RawRecord, field: &str) -> Result<i64> {
    coerce_int(raw.get(field)).ok_or_else(|| {
        let found = raw
            .get(field)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "<missing>".to_string());
        EtlError::schema(format!(
            "record {}: field '{}' is not an integer (found {})",
            index, field, found
        ))
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
