//! Error types
//!
//! Every fallible operation of the table returns [`Error`]. Callers that need to
//! tell "doesn't exist" apart from "couldn't check" use [`Error::kind`].

/// Result alias used throughout the library
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Broad error classes exposed to the host query engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or API failure while listing, getting or hydrating
    Transient,
    /// The requested resource does not exist
    NotFound,
    /// A derived value could not be computed from malformed input
    Format,
    /// The query execution was cancelled
    Cancelled,
    /// The query itself is invalid (unknown column, missing key)
    Invalid,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed: {status} {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unexpected format: {0}")]
    Format(String),

    #[error("Query cancelled")]
    Cancelled,

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Missing value for key column '{0}'")]
    MissingKey(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Http(_) | Error::Api { .. } | Error::Decode(_) | Error::Auth(_) => {
                ErrorKind::Transient
            }
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Format(_) => ErrorKind::Format,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::UnknownColumn(_) | Error::MissingKey(_) => ErrorKind::Invalid,
        }
    }

    /// Short message for display
    /// Security: avoids leaking raw API error bodies to the terminal
    pub fn user_message(&self) -> String {
        match self {
            Error::Api { status, .. } => match status {
                401 => "Authentication failed. Run 'gcloud auth application-default login'."
                    .to_string(),
                403 => "Permission denied. Check your GCP IAM permissions.".to_string(),
                404 => "Resource not found. Check the project and API endpoint.".to_string(),
                429 => "Rate limit exceeded. Please try again later.".to_string(),
                400 => "Invalid request. Check your parameters.".to_string(),
                500 | 503 => "GCP service temporarily unavailable. Please try again.".to_string(),
                _ => "Request failed. Check your network connection and try again.".to_string(),
            },
            Error::Http(_) => {
                "Request failed. Check your network connection and try again.".to_string()
            }
            Error::Auth(_) => {
                "Authentication failed. Run 'gcloud auth application-default login'.".to_string()
            }
            Error::NotFound(name) => format!("Resource not found: {}", truncate(name, 120)),
            other => truncate(&other.to_string(), 160),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    let sanitized: String = s
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .take(max)
        .collect();

    if sanitized.len() < s.len() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}
