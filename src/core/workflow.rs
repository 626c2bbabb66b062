use crate::core::client::WebhookClient;
use crate::core::submitter::BatchSubmitter;
use crate::domain::model::{
    canonicalize_timestamps, email_row_label, update_row_label, BatchReport, Record,
    EMAIL_REQUIRED_FIELDS, UPDATE_REQUIRED_FIELDS,
};
use crate::domain::ports::{EndpointProvider, ProgressSink};
use crate::utils::error::{FlowError, Result};
use serde_json::json;

/// The two screens of the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Rows are being reviewed/edited; batch update is available.
    Editor,
    /// Updates are saved; drafts are composed and sent from here.
    Composer,
}

/// A single operator session: owns the current record set and the stage,
/// replacing the ad hoc process-wide flags of earlier revisions with an
/// explicit state machine. Editor -> Composer only on a fully successful
/// batch update; Composer -> Editor on request.
pub struct WorkflowSession<C: EndpointProvider> {
    client: WebhookClient<C>,
    stage: Stage,
    rows: Vec<Record>,
    drafts: Vec<Record>,
}

impl<C: EndpointProvider> WorkflowSession<C> {
    pub fn new(client: WebhookClient<C>, rows: Vec<Record>) -> Self {
        Self {
            client,
            stage: Stage::Editor,
            rows,
            drafts: Vec::new(),
        }
    }

    /// Resumes a session at the composer stage with an already-approved
    /// draft set, e.g. drafts edited externally between CLI invocations.
    pub fn resume_composer(client: WebhookClient<C>, drafts: Vec<Record>) -> Self {
        Self {
            client,
            stage: Stage::Composer,
            rows: Vec::new(),
            drafts,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn drafts(&self) -> &[Record] {
        &self.drafts
    }

    pub fn client(&self) -> &WebhookClient<C> {
        &self.client
    }

    /// Batch-updates every row against the sheet-management webhook.
    ///
    /// Timestamps are canonicalized to the millisecond-Z wire form first.
    /// Only a fully successful batch advances the session to the composer
    /// stage; any failure keeps it in the editor for correction and
    /// resubmission.
    pub async fn submit_updates(&mut self, progress: &dyn ProgressSink) -> Result<BatchReport> {
        self.expect_stage(Stage::Editor, "submit_updates")?;
        if self.rows.is_empty() {
            return Err(FlowError::SchemaError {
                message: "no rows loaded to update".to_string(),
            });
        }

        canonicalize_timestamps(&mut self.rows);

        tracing::info!("Sending batch updates for {} records", self.rows.len());
        let submitter = BatchSubmitter::new(
            self.client.http(),
            self.client.config().update_url(),
            self.client.config().request_timeout(),
        );
        let report = submitter
            .submit(
                &self.rows,
                &UPDATE_REQUIRED_FIELDS,
                update_row_label,
                update_payload,
                progress,
            )
            .await?;

        if report.is_complete() {
            tracing::info!(
                "Batch update complete, all {} records saved",
                report.succeeded
            );
            self.stage = Stage::Composer;
        } else {
            tracing::warn!(
                "Batch update finished with {} successful updates and {} failures",
                report.succeeded,
                report.failed()
            );
        }
        Ok(report)
    }

    /// Stores the draft table produced by the email-draft webhook (or an
    /// externally edited copy of it) for sending.
    pub fn load_drafts(&mut self, drafts: Vec<Record>) -> Result<()> {
        self.expect_stage(Stage::Composer, "load_drafts")?;
        self.drafts = drafts;
        Ok(())
    }

    /// Batch-sends the loaded drafts. The wire payload is restricted to
    /// exactly the four send fields regardless of what else a draft record
    /// carries. The stage does not change on either outcome; the operator
    /// reviews the report and may resend.
    pub async fn send_emails(&mut self, progress: &dyn ProgressSink) -> Result<BatchReport> {
        self.expect_stage(Stage::Composer, "send_emails")?;
        if self.drafts.is_empty() {
            return Err(FlowError::SchemaError {
                message: "no email records loaded to send".to_string(),
            });
        }

        tracing::info!("Sending {} emails (batch send)", self.drafts.len());
        let submitter = BatchSubmitter::new(
            self.client.http(),
            self.client.config().email_send_url(),
            self.client.config().request_timeout(),
        );
        let report = submitter
            .submit(
                &self.drafts,
                &EMAIL_REQUIRED_FIELDS,
                email_row_label,
                email_payload,
                progress,
            )
            .await?;

        if report.is_complete() {
            tracing::info!("Email batch send complete, {} emails sent", report.succeeded);
        } else {
            tracing::warn!(
                "Email batch send finished with {} successful sends and {} failures",
                report.succeeded,
                report.failed()
            );
        }
        Ok(report)
    }

    /// Composer -> Editor, discarding the draft table.
    pub fn back_to_editor(&mut self) -> Result<()> {
        self.expect_stage(Stage::Composer, "back_to_editor")?;
        self.drafts.clear();
        self.stage = Stage::Editor;
        Ok(())
    }

    fn expect_stage(&self, expected: Stage, operation: &str) -> Result<()> {
        if self.stage != expected {
            return Err(FlowError::StageError {
                message: format!(
                    "{} requires the {:?} stage, session is in {:?}",
                    operation, expected, self.stage
                ),
            });
        }
        Ok(())
    }
}

/// Update payload: the row's fields plus the action tag. A row field named
/// `action` wins over the tag, matching the upstream contract.
fn update_payload(record: &Record) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert("action".to_string(), json!("update task"));
    for (key, value) in &record.data {
        body.insert(key.clone(), value.clone());
    }
    serde_json::Value::Object(body)
}

/// Send payload: exactly the four documented fields, absent ones as null.
fn email_payload(record: &Record) -> serde_json::Value {
    json!({
        "email_id": record.get("email_id"),
        "recipient_email": record.get("recipient_email"),
        "subject": record.get("subject"),
        "body": record.get("body"),
    })
}
