pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{CliConfig, Command, ResolvedConfig};
pub use core::client::WebhookClient;
pub use core::submitter::BatchSubmitter;
pub use core::workflow::{Stage, WorkflowSession};
pub use domain::model::{records_from_json, BatchReport, Record, RowFailure};
pub use domain::ports::{EndpointProvider, ProgressSink, TracingProgress};
pub use utils::error::{FlowError, Result};
