use std::path::PathBuf;

use thiserror::Error;

/// Configuration problems that abort the run before any network traffic.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{flag} must not be empty")]
    EmptyArgument { flag: &'static str },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Login failures. Fatal to the whole run, no report is attempted once
/// login has failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("login rejected: invalid username or password")]
    BadCredentials,

    #[error("the account requires a multi-factor code and none was provided")]
    MfaRequired,

    #[error("the service rejected the multi-factor code")]
    MfaRejected,

    #[error("login endpoint not found, the service API may have changed")]
    EndpointMoved,

    #[error("login failed with HTTP {status}")]
    Http { status: reqwest::StatusCode },

    #[error("network error during login: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed login response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("failed to read the multi-factor code: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Failure while retrieving the data for one report. Scoped to that
/// report, sibling reports still run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{operation}: network error: {source}")]
    Network {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation}: server returned HTTP {status}")]
    Status {
        operation: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("{operation}: {}", .messages.join("; "))]
    Graphql {
        operation: &'static str,
        messages: Vec<String>,
    },

    #[error("{operation}: response carried no data")]
    MissingData { operation: &'static str },

    #[error("{operation}: malformed response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("session expired and logging in again failed: {source}")]
    Reauth {
        #[source]
        source: AuthError,
    },
}

impl FetchError {
    /// A 401 means the auth token went stale. Recoverable by logging in
    /// again with the credentials we still hold.
    pub(crate) fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Status { status, .. } if *status == reqwest::StatusCode::UNAUTHORIZED)
    }

    /// Worth one more attempt after a short delay.
    pub(crate) fn is_transient(&self) -> bool {
        match self {
            FetchError::Network { .. } => true,
            FetchError::Status { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

/// Why a single report ended up failed in the run summary.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Errors that end the run before any report was attempted.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}
