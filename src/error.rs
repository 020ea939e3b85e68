use thiserror::Error;

/// Fatal startup errors. Per-tick gameplay paths never produce these;
/// degraded cases (empty question set, speech failure, relay loss) are
/// logged and absorbed where they occur.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("adapter failure: {0}")]
    Adapter(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
