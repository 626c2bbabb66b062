use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Webhook request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Webhook returned status code {status}. Response: {body}")]
    StatusError { status: u16, body: String },

    #[error("Empty or invalid response data: {message}")]
    EmptyResponseError { message: String },

    #[error("Schema mismatch: {message}")]
    SchemaError { message: String },

    #[error("Workflow stage error: {message}")]
    StageError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, FlowError>;
