use std::time::Duration;
use thiserror::Error;

/// Provider error codes that mean "this subscription cannot use the
/// feature", not "the request was wrong".
const CAPABILITY_ERROR_CODES: [&str; 4] = [
    "MissingRegistrationForResourceProvider",
    "MissingSubscriptionRegistration",
    "DisallowedOperation",
    "SubscriptionNotRegistered",
];

/// Failure of a call against a cloud provider endpoint.
#[derive(Debug, Clone, Error)]
pub enum CloudApiError {
    #[error("request throttled by the provider (HTTP 429)")]
    Throttled { retry_after: Option<Duration> },

    #[error("provider server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request rejected (HTTP {status}, code {code}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },

    #[error("no access token available: {0}")]
    Unauthenticated(String),

    #[error("failed to decode provider response: {0}")]
    Decode(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation not supported: {0}")]
    Unsupported(String),
}

impl CloudApiError {
    /// Throttling, 5xx and network failures are worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CloudApiError::Throttled { .. } | CloudApiError::Server { .. } | CloudApiError::Network(_)
        )
    }

    /// The subscription is not registered for the feature
    pub fn is_capability_error(&self) -> bool {
        match self {
            CloudApiError::Rejected { code, message, .. } => {
                CAPABILITY_ERROR_CODES
                    .iter()
                    .any(|c| code.eq_ignore_ascii_case(c) || message.contains(c))
                    || message.contains("Subscription Not Registered")
            }
            _ => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CloudApiError::Cancelled)
    }
}
