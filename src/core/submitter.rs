use crate::domain::model::{BatchReport, Record, RowFailure};
use crate::domain::ports::ProgressSink;
use crate::utils::error::{FlowError, Result};
use reqwest::Client;
use std::time::Duration;

/// Submits one HTTP POST per record, in sequence order, against a single
/// webhook endpoint and aggregates the outcome.
///
/// Requests are strictly sequential: row k is sent only after rows 1..k-1
/// have completed. There is no retry; failure on one row never aborts the
/// rest. The batch counts as fully successful only when every row returned
/// HTTP 200.
pub struct BatchSubmitter<'a> {
    client: &'a Client,
    endpoint: &'a str,
    timeout: Duration,
}

impl<'a> BatchSubmitter<'a> {
    pub fn new(client: &'a Client, endpoint: &'a str, timeout: Duration) -> Self {
        Self {
            client,
            endpoint,
            timeout,
        }
    }

    /// Runs the batch. `required_fields` are checked against the record set
    /// schema before anything is sent: a field no record carries aborts the
    /// whole batch with zero network calls. `label` names a row for progress
    /// and failure reporting; `payload` maps a record to its wire body.
    pub async fn submit<L, P>(
        &self,
        records: &[Record],
        required_fields: &[&str],
        label: L,
        payload: P,
        progress: &dyn ProgressSink,
    ) -> Result<BatchReport>
    where
        L: Fn(usize, &Record) -> String,
        P: Fn(&Record) -> serde_json::Value,
    {
        let missing: Vec<&str> = required_fields
            .iter()
            .copied()
            .filter(|field| !records.iter().any(|r| r.data.contains_key(*field)))
            .collect();
        if !missing.is_empty() {
            return Err(FlowError::SchemaError {
                message: format!(
                    "record set is missing required columns: {}",
                    missing.join(", ")
                ),
            });
        }

        let total = records.len();
        let mut report = BatchReport {
            total,
            ..Default::default()
        };

        for (index, record) in records.iter().enumerate() {
            let row_label = label(index, record);
            tracing::debug!(
                "Submitting record {}/{} to {}: {}",
                index + 1,
                total,
                self.endpoint,
                row_label
            );

            let outcome = self
                .client
                .post(self.endpoint)
                .header("Content-Type", "application/json")
                .timeout(self.timeout)
                .json(&payload(record))
                .send()
                .await;

            match outcome {
                Ok(response) => {
                    let status = response.status();
                    if status == reqwest::StatusCode::OK {
                        report.succeeded += 1;
                    } else {
                        let body = response.text().await.unwrap_or_default();
                        tracing::error!(
                            "Failed to submit {}: Status {}. Response: {}",
                            row_label,
                            status.as_u16(),
                            body
                        );
                        report.failures.push(RowFailure {
                            label: row_label.clone(),
                            reason: format!("Status {}. Response: {}", status.as_u16(), body),
                        });
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to send request for {}: {}", row_label, e);
                    report.failures.push(RowFailure {
                        label: row_label.clone(),
                        reason: e.to_string(),
                    });
                }
            }

            progress.on_progress(index + 1, total, &row_label);
        }

        Ok(report)
    }
}
