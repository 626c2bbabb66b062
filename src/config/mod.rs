pub mod toml_config;

use crate::domain::ports::EndpointProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_SEARCH_URL: &str = "http://localhost:5678/webhook/ai-business-lookup";
pub const DEFAULT_UPDATE_URL: &str = "http://localhost:5678/webhook/Sheet_management";
pub const DEFAULT_EMAIL_DRAFT_URL: &str = "http://localhost:5678/webhook/email_writting";
pub const DEFAULT_EMAIL_SEND_URL: &str = "http://localhost:5678/webhook/email_management";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Parser)]
#[command(name = "leadflow")]
#[command(about = "Drive webhook-based lead lookup, update and outreach workflows")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,

    /// Optional TOML config file with webhook endpoints and timeouts
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub search_url: Option<String>,

    #[arg(long, global = true)]
    pub update_url: Option<String>,

    #[arg(long, global = true)]
    pub email_draft_url: Option<String>,

    #[arg(long, global = true)]
    pub email_send_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a business lookup and export the resulting row table
    Search {
        /// Search query, e.g. "AI startups in Pakistan"
        #[arg(long)]
        query: String,

        /// Write the rows as an indented JSON array
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the rows as CSV with a header row
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Batch-update every row from a JSON table against the update webhook
    Update {
        /// JSON array of row records (search output, possibly edited)
        #[arg(long)]
        input: PathBuf,
    },
    /// Generate per-contact email drafts from a subject and body
    Draft {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        body: String,

        #[arg(long)]
        json: Option<PathBuf>,

        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Batch-send a JSON table of email drafts
    Send {
        /// JSON array of email records (draft output, possibly edited)
        #[arg(long)]
        input: PathBuf,
    },
    /// Validate a JSON table and re-export it as JSON and/or CSV
    Export {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        json: Option<PathBuf>,

        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

/// Endpoints and timeout after merging CLI flags, the TOML file and the
/// built-in defaults. CLI wins over file, file wins over defaults.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub search_url: String,
    pub update_url: String,
    pub email_draft_url: String,
    pub email_send_url: String,
    pub timeout: Duration,
}

impl CliConfig {
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let file_config = match &self.config {
            Some(path) => {
                let config = TomlConfig::from_file(path)?;
                config.validate()?;
                config
            }
            None => TomlConfig::default(),
        };

        let pick = |cli: &Option<String>, file: Option<&String>, default: &str| {
            cli.clone()
                .or_else(|| file.cloned())
                .unwrap_or_else(|| default.to_string())
        };

        let timeout_secs = self
            .timeout_secs
            .or_else(|| file_config.request_seconds())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(ResolvedConfig {
            search_url: pick(
                &self.search_url,
                file_config.webhook(|w| &w.search),
                DEFAULT_SEARCH_URL,
            ),
            update_url: pick(
                &self.update_url,
                file_config.webhook(|w| &w.update),
                DEFAULT_UPDATE_URL,
            ),
            email_draft_url: pick(
                &self.email_draft_url,
                file_config.webhook(|w| &w.email_draft),
                DEFAULT_EMAIL_DRAFT_URL,
            ),
            email_send_url: pick(
                &self.email_send_url,
                file_config.webhook(|w| &w.email_send),
                DEFAULT_EMAIL_SEND_URL,
            ),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl Validate for ResolvedConfig {
    fn validate(&self) -> Result<()> {
        validate_url("search_url", &self.search_url)?;
        validate_url("update_url", &self.update_url)?;
        validate_url("email_draft_url", &self.email_draft_url)?;
        validate_url("email_send_url", &self.email_send_url)?;
        validate_positive_number("timeout_secs", self.timeout.as_secs(), 1)?;
        Ok(())
    }
}

impl EndpointProvider for ResolvedConfig {
    fn search_url(&self) -> &str {
        &self.search_url
    }

    fn update_url(&self) -> &str {
        &self.update_url
    }

    fn email_draft_url(&self) -> &str {
        &self.email_draft_url
    }

    fn email_send_url(&self) -> &str {
        &self.email_send_url
    }

    fn request_timeout(&self) -> Duration {
        self.timeout
    }
}
