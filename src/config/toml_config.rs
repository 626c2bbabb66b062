use crate::utils::error::{FlowError, Result};
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File-based configuration for the webhook endpoints and timeouts.
///
/// Every field is optional; anything unset falls back to the CLI flag or
/// the built-in default. Values may reference environment variables as
/// `${VAR_NAME}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub webhooks: Option<WebhookUrls>,
    pub timeouts: Option<TimeoutConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookUrls {
    pub search: Option<String>,
    pub update: Option<String>,
    pub email_draft: Option<String>,
    pub email_send: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub request_seconds: Option<u64>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FlowError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FlowError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` references with the environment value,
    /// leaving unknown variables untouched so validation can flag them.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn webhook(&self, pick: impl Fn(&WebhookUrls) -> &Option<String>) -> Option<&String> {
        self.webhooks.as_ref().and_then(|w| pick(w).as_ref())
    }

    pub fn request_seconds(&self) -> Option<u64> {
        self.timeouts.as_ref().and_then(|t| t.request_seconds)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(webhooks) = &self.webhooks {
            if let Some(url) = &webhooks.search {
                validate_url("webhooks.search", url)?;
            }
            if let Some(url) = &webhooks.update {
                validate_url("webhooks.update", url)?;
            }
            if let Some(url) = &webhooks.email_draft {
                validate_url("webhooks.email_draft", url)?;
            }
            if let Some(url) = &webhooks.email_send {
                validate_url("webhooks.email_send", url)?;
            }
        }
        if let Some(seconds) = self.request_seconds() {
            validate_positive_number("timeouts.request_seconds", seconds, 1)?;
        }
        Ok(())
    }
}
