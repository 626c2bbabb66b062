use crate::utils::error::{FlowError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One business/contact entity as a field-name-to-value mapping.
///
/// Fields vary by source (search result vs. externally edited JSON) but
/// converge on a common schema: name, type, location, phone, emails,
/// website, rating, s_no, timestamp, id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn get(&self, field: &str) -> Option<&serde_json::Value> {
        self.data.get(field)
    }

    /// Renders a field as display text. Null and absent fields yield None;
    /// non-string scalars are stringified.
    pub fn display(&self, field: &str) -> Option<String> {
        match self.data.get(field)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Aggregate outcome of submitting many rows to a webhook.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<RowFailure>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.succeeded == self.total
    }

    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }
}

#[derive(Debug, Clone)]
pub struct RowFailure {
    pub label: String,
    pub reason: String,
}

/// Fields every record set must expose before a batch update is attempted.
pub const UPDATE_REQUIRED_FIELDS: [&str; 3] = ["id", "s_no", "name"];

/// Fields every email record must expose before a batch send is attempted.
pub const EMAIL_REQUIRED_FIELDS: [&str; 4] = ["email_id", "recipient_email", "subject", "body"];

/// Label for a row in batch-update progress and failure reporting.
pub fn update_row_label(index: usize, record: &Record) -> String {
    let s_no = record
        .display("s_no")
        .unwrap_or_else(|| (index + 1).to_string());
    let name = record
        .display("name")
        .unwrap_or_else(|| "No Name".to_string());
    format!("S.No {} - {}", s_no, name)
}

/// Label for an email row in batch-send progress and failure reporting.
pub fn email_row_label(index: usize, record: &Record) -> String {
    let email_id = record
        .display("email_id")
        .unwrap_or_else(|| (index + 1).to_string());
    let recipient = record
        .display("recipient_email")
        .unwrap_or_else(|| "No Recipient".to_string());
    format!("ID {} to {}", email_id, recipient)
}

/// Parses a JSON document into a table of records.
///
/// Only a non-empty array of objects is accepted; a bare object is the most
/// common paste mistake and gets a dedicated message. Loaded records are
/// preprocessed (emails normalized, timestamps sanity-checked).
pub fn records_from_json(input: &str) -> Result<Vec<Record>> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    let mut records = records_from_value(value)?;
    preprocess_records(&mut records);
    Ok(records)
}

/// Converts an already-parsed JSON value into records, enforcing the
/// list-of-objects response contract shared by the loader and the webhook
/// client.
pub fn records_from_value(value: serde_json::Value) -> Result<Vec<Record>> {
    match value {
        serde_json::Value::Array(items) => {
            if items.is_empty() {
                return Err(FlowError::EmptyResponseError {
                    message: "received an empty record list".to_string(),
                });
            }
            let mut records = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                match item {
                    serde_json::Value::Object(obj) => {
                        records.push(Record {
                            data: obj.into_iter().collect(),
                        });
                    }
                    other => {
                        return Err(FlowError::SchemaError {
                            message: format!("element {} is not an object: {}", index, other),
                        });
                    }
                }
            }
            Ok(records)
        }
        serde_json::Value::Object(_) => Err(FlowError::SchemaError {
            message: "the JSON appears to be a single object, expected an array of records"
                .to_string(),
        }),
        other => Err(FlowError::SchemaError {
            message: format!("expected a JSON array of records, got: {}", other),
        }),
    }
}

/// Normalizes freshly loaded records for table handling: the `emails` field
/// becomes a string ("" instead of null or the literal "None"), and
/// `timestamp` values that do not parse as RFC 3339 are flagged.
pub fn preprocess_records(records: &mut [Record]) {
    for record in records.iter_mut() {
        if let Some(emails) = record.data.get_mut("emails") {
            let normalized = match emails {
                serde_json::Value::Null => String::new(),
                serde_json::Value::String(s) if s.as_str() == "None" => String::new(),
                serde_json::Value::String(s) => s.clone(),
                ref other => other.to_string(),
            };
            *emails = serde_json::Value::String(normalized);
        }

        if let Some(serde_json::Value::String(ts)) = record.data.get("timestamp") {
            if DateTime::parse_from_rfc3339(ts).is_err() {
                tracing::warn!("Could not parse 'timestamp' value as a datetime: {}", ts);
            }
        }
    }
}

/// Rewrites every record's `timestamp` to the canonical wire form: ISO-8601
/// with millisecond precision and a UTC `Z` suffix. Runs before update
/// submission, never inside the submitter. Unparseable timestamps become
/// null; null or absent timestamps are left alone.
pub fn canonicalize_timestamps(records: &mut [Record]) {
    for record in records.iter_mut() {
        let Some(current) = record.data.get("timestamp") else {
            continue;
        };
        let rewritten = match current {
            serde_json::Value::String(ts) => match DateTime::parse_from_rfc3339(ts) {
                Ok(parsed) => Some(serde_json::Value::String(
                    parsed
                        .with_timezone(&Utc)
                        .to_rfc3339_opts(SecondsFormat::Millis, true),
                )),
                Err(e) => {
                    tracing::warn!("Dropping unparseable timestamp '{}': {}", ts, e);
                    Some(serde_json::Value::Null)
                }
            },
            serde_json::Value::Null => None,
            other => {
                tracing::warn!("Dropping non-string timestamp: {}", other);
                Some(serde_json::Value::Null)
            }
        };
        if let Some(value) = rewritten {
            record.data.insert("timestamp".to_string(), value);
        }
    }
}

/// The email-draft webhook sometimes returns `recipient` where every other
/// consumer expects `recipient_email` (upstream schema inconsistency). The
/// rename applies only when `recipient_email` is absent and only to the
/// draft response.
pub fn normalize_draft_records(records: &mut [Record]) {
    for record in records.iter_mut() {
        if record.data.contains_key("recipient_email") {
            continue;
        }
        if let Some(value) = record.data.remove("recipient") {
            record.data.insert("recipient_email".to_string(), value);
        }
    }
}
