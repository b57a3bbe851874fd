use crate::ports::outbound::CloudApiError;
use reqwest::header::HeaderMap;
use reqwest::RequestBuilder;
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Base URL of the resource manager endpoint
pub const MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Builds the shared HTTP client (timeout and user agent)
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, CloudApiError> {
    let user_agent = format!("azqr/{}", env!("CARGO_PKG_VERSION"));
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| CloudApiError::Network(e.to_string()))
}

/// Sends a request and reads the body, racing both against `cancel`.
///
/// Non-success statuses are classified into [`CloudApiError`] variants.
pub async fn execute(
    request: RequestBuilder,
    cancel: &CancellationToken,
) -> Result<(HeaderMap, String), CloudApiError> {
    let response = tokio::select! {
        _ = cancel.cancelled() => return Err(CloudApiError::Cancelled),
        sent = request.send() => sent.map_err(|e| CloudApiError::Network(e.to_string()))?,
    };

    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = tokio::select! {
        _ = cancel.cancelled() => return Err(CloudApiError::Cancelled),
        text = response.text() => text.map_err(|e| CloudApiError::Network(e.to_string()))?,
    };

    if !(200..300).contains(&status) {
        return Err(classify_failure(status, retry_after(&headers), &body));
    }
    Ok((headers, body))
}

/// Maps a failed status and its body to an error variant
pub fn classify_failure(status: u16, retry_after: Option<Duration>, body: &str) -> CloudApiError {
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.code, envelope.error.message),
        Err(_) => (String::new(), body.trim().to_string()),
    };

    match status {
        429 => CloudApiError::Throttled { retry_after },
        500..=599 => CloudApiError::Server { status, message },
        _ => CloudApiError::Rejected {
            status,
            code,
            message,
        },
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Parses an `hh:mm:ss` duration
pub fn parse_hms(value: &str) -> Option<Duration> {
    let mut parts = value.trim().split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Duration::from_secs(hours * 3600 + minutes * 60 + seconds))
}

/// Percent-encodes each segment of a resource id for use in a URL path
pub fn encode_resource_path(resource_id: &str) -> String {
    resource_id
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_arm_error_body() {
        let body = r#"{"error":{"code":"MissingSubscriptionRegistration","message":"not registered"}}"#;
        let error = classify_failure(409, None, body);
        assert!(error.is_capability_error());
        assert!(!error.is_transient());
    }

    #[test]
    fn test_classify_throttled_and_server() {
        let throttled = classify_failure(429, Some(Duration::from_secs(3)), "");
        assert!(matches!(
            throttled,
            CloudApiError::Throttled {
                retry_after: Some(d)
            } if d == Duration::from_secs(3)
        ));
        assert!(classify_failure(502, None, "bad gateway").is_transient());
    }

    #[test]
    fn test_classify_plain_text_body() {
        match classify_failure(400, None, " bad query ") {
            CloudApiError::Rejected { code, message, .. } => {
                assert_eq!(code, "");
                assert_eq!(message, "bad query");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_hms() {
        assert_eq!(parse_hms("00:00:05"), Some(Duration::from_secs(5)));
        assert_eq!(parse_hms("01:02:03"), Some(Duration::from_secs(3723)));
        assert_eq!(parse_hms("5"), None);
        assert_eq!(parse_hms("a:b:c"), None);
    }

    #[test]
    fn test_encode_resource_path_keeps_separators() {
        assert_eq!(
            encode_resource_path("/subscriptions/s1/resourceGroups/my rg"),
            "/subscriptions/s1/resourceGroups/my%20rg"
        );
    }
}
