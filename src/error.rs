//! Error types for the console core.
//!
//! Library operations return [`Result`]; the CLI wraps these in `anyhow`
//! with extra context at the edge.

use thiserror::Error;

/// Convenience alias used across the library.
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Everything that can go wrong outside of field validation.
///
/// Validation problems are not errors: they live in
/// [`FieldErrors`](crate::wizard::FieldErrors) and never reach this type.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Transport-level failure (DNS, connect, TLS, timeout).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status or a failed envelope.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// A response or stored record did not have the expected shape.
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A state store could not be read or written.
    #[error("state store error: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// The payment-provider handoff could not proceed.
    #[error("payment handoff failed: {0}")]
    Handoff(String),
}

impl ConsoleError {
    pub fn decode(what: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { what, source }
    }

    /// Banner-level text shown to the user. The full error goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(e) if e.is_timeout() => {
                "The server took too long to respond. Please try again.".to_string()
            }
            Self::Http(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            Self::Status { status, .. } if *status == 401 || *status == 403 => {
                "Your session has expired or you are not allowed to do this.".to_string()
            }
            Self::Status { status, .. } if *status >= 500 => {
                "The server ran into a problem. Please try again in a moment.".to_string()
            }
            Self::Status { body, .. } if !body.is_empty() && body.len() <= 200 => body.clone(),
            Self::Status { .. } => "The request was rejected by the server.".to_string(),
            Self::Decode { .. } => "The server sent an unexpected response.".to_string(),
            Self::Storage(_) | Self::Io(_) => {
                "Local state could not be saved. Please try again.".to_string()
            }
            Self::Config(msg) => format!("Configuration problem: {msg}"),
            Self::Handoff(msg) => msg.clone(),
        }
    }
}
