use crate::domain::model::{
    normalize_draft_records, preprocess_records, records_from_value, Record,
};
use crate::domain::ports::EndpointProvider;
use crate::utils::error::{FlowError, Result};
use crate::utils::validation::validate_non_empty_string;
use chrono::{SecondsFormat, Utc};
use reqwest::Client;
use serde_json::json;
use uuid::Uuid;

/// Thin client over the workflow engine's webhook endpoints.
///
/// Every call is a plain HTTP POST with a JSON body; success is HTTP 200
/// with a non-empty JSON array of objects, and anything else is surfaced
/// verbatim to the operator. No retry anywhere.
pub struct WebhookClient<C: EndpointProvider> {
    config: C,
    client: Client,
}

impl<C: EndpointProvider> WebhookClient<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// The underlying HTTP client, shared with the batch submitter so one
    /// connection pool serves the whole session.
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Business lookup: posts the search query and parses the resulting
    /// row table.
    pub async fn search(&self, query: &str) -> Result<Vec<Record>> {
        validate_non_empty_string("search query", query)?;

        let payload = json!({
            "searchQuery": query,
            "requestId": format!("req-{}", Uuid::new_v4()),
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        });

        tracing::info!(
            "Sending search request to {} with query: {} (timeout {}s)",
            self.config.search_url(),
            query,
            self.config.request_timeout().as_secs()
        );

        let mut records = self
            .post_expecting_list(self.config.search_url(), &payload)
            .await?;
        preprocess_records(&mut records);
        tracing::info!("Search successful, {} records received", records.len());
        Ok(records)
    }

    /// Email draft generation: posts the campaign subject/body and parses
    /// the generated per-contact drafts.
    pub async fn generate_drafts(&self, subject: &str, body: &str) -> Result<Vec<Record>> {
        validate_non_empty_string("subject", subject)?;
        validate_non_empty_string("body", body)?;

        let payload = json!({"subject": subject, "body": body});

        tracing::info!(
            "Sending draft generation request to {}",
            self.config.email_draft_url()
        );

        let mut records = self
            .post_expecting_list(self.config.email_draft_url(), &payload)
            .await?;
        normalize_draft_records(&mut records);
        tracing::info!("Generated {} email drafts", records.len());
        Ok(records)
    }

    async fn post_expecting_list(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<Vec<Record>> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .timeout(self.config.request_timeout())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Webhook response status: {}", status);
        let body = response.text().await?;

        if status != reqwest::StatusCode::OK {
            return Err(FlowError::StatusError {
                status: status.as_u16(),
                body,
            });
        }

        let value: serde_json::Value = serde_json::from_str(&body)?;
        records_from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::time::Duration;

    #[derive(Clone)]
    struct TestEndpoints {
        base: String,
    }

    impl EndpointProvider for TestEndpoints {
        fn search_url(&self) -> &str {
            &self.base
        }
        fn update_url(&self) -> &str {
            &self.base
        }
        fn email_draft_url(&self) -> &str {
            &self.base
        }
        fn email_send_url(&self) -> &str {
            &self.base
        }
        fn request_timeout(&self) -> Duration {
            Duration::from_secs(5)
        }
    }

    fn client_for(server: &MockServer, path: &str) -> WebhookClient<TestEndpoints> {
        WebhookClient::new(TestEndpoints {
            base: server.url(path),
        })
    }

    #[tokio::test]
    async fn test_search_parses_and_preprocesses_rows() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/search")
                .header("content-type", "application/json")
                .json_body_partial(r#"{"searchQuery": "AI startups in Pakistan"}"#)
                .body_contains(r#""requestId":"req-"#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"name": "Acme AI", "emails": null, "s_no": 1, "id": "a1"},
                    {"name": "Beta ML", "emails": "b@beta.ai", "s_no": 2, "id": "b2"}
                ]));
        });

        let client = client_for(&server, "/search");
        let records = client.search("AI startups in Pakistan").await.unwrap();

        mock.assert();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("emails").unwrap(), "");
        assert_eq!(records[1].get("emails").unwrap(), "b@beta.ai");
    }

    #[tokio::test]
    async fn test_search_surfaces_non_200_with_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/search");
            then.status(502).body("bad gateway");
        });

        let client = client_for(&server, "/search");
        let err = client.search("anything").await.unwrap_err();

        match err {
            FlowError::StatusError { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("expected status error, got: {}", other),
        }
    }

    #[tokio::test]
    async fn test_search_rejects_bare_object_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/search");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"name": "x"}));
        });

        let client = client_for(&server, "/search");
        let err = client.search("anything").await.unwrap_err();
        assert!(matches!(err, FlowError::SchemaError { .. }));
    }

    #[tokio::test]
    async fn test_search_rejects_empty_array_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/search");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([]));
        });

        let client = client_for(&server, "/search");
        let err = client.search("anything").await.unwrap_err();
        assert!(matches!(err, FlowError::EmptyResponseError { .. }));
    }

    #[tokio::test]
    async fn test_search_rejects_malformed_json_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/search");
            then.status(200).body("not json at all");
        });

        let client = client_for(&server, "/search");
        let err = client.search("anything").await.unwrap_err();
        assert!(matches!(err, FlowError::JsonError(_)));
    }

    #[tokio::test]
    async fn test_drafts_rename_recipient_field() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/draft")
                .json_body(serde_json::json!({"subject": "Hello", "body": "World"}));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"email_id": 1, "recipient": "a@b.com", "subject": "Hello", "body": "Hi A"},
                    {"email_id": 2, "recipient_email": "c@d.com", "subject": "Hello", "body": "Hi C"}
                ]));
        });

        let client = client_for(&server, "/draft");
        let drafts = client.generate_drafts("Hello", "World").await.unwrap();

        mock.assert();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].get("recipient_email").unwrap(), "a@b.com");
        assert!(drafts[0].get("recipient").is_none());
        assert_eq!(drafts[1].get("recipient_email").unwrap(), "c@d.com");
    }

    #[tokio::test]
    async fn test_drafts_require_subject_and_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/draft");
            then.status(200);
        });

        let client = client_for(&server, "/draft");
        assert!(client.generate_drafts("", "body").await.is_err());
        assert!(client.generate_drafts("subject", "  ").await.is_err());
        mock.assert_hits(0);
    }
}
