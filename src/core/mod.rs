pub mod client;
pub mod submitter;
pub mod workflow;

pub use crate::domain::model::{BatchReport, Record, RowFailure};
pub use crate::domain::ports::{EndpointProvider, ProgressSink, TracingProgress};
pub use crate::utils::error::Result;
