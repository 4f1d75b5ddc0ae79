use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {key}: {reason}")]
    Configuration { key: &'static str, reason: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Stream handshake failed: {0}")]
    Handshake(String),

    #[error("Execution stream error: {0}")]
    Stream(String),

    #[error("{call} call failed: {status}")]
    Call {
        call: &'static str,
        #[source]
        status: tonic::Status,
    },
}

impl RunnerError {
    pub fn configuration(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Configuration {
            key,
            reason: reason.into(),
        }
    }

    pub fn call(call: &'static str, status: tonic::Status) -> Self {
        Self::Call { call, status }
    }
}

impl From<tonic::transport::Error> for RunnerError {
    fn from(e: tonic::transport::Error) -> Self {
        Self::Connection(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RunnerError>;
