//! Shared HTTP response helpers for the model client.
//!
//! Centralizes status-code checks (429 with `Retry-After` parsing,
//! non-success → [`ModelError::Api`]) so the client stays focused on request
//! construction and reply mapping.

use crate::error::ModelError;

/// Check an HTTP response for common error conditions.
///
/// Returns the response unchanged on success. Handles:
/// - **429 Too Many Requests** → [`ModelError::RateLimited`] carrying the
///   `Retry-After` seconds when the header is present and numeric.
/// - **Non-success status** → [`ModelError::Api`] with status code and
///   response body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ModelError> {
    if resp.status() == 429 {
        return Err(ModelError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    if !resp.status().is_success() {
        return Err(ModelError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Parse the `Retry-After` header as delta-seconds.
fn parse_retry_after(resp: &reqwest::Response) -> Option<u64> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, retry_after: Option<&str>) -> reqwest::Response {
        let mut builder = ::http::Response::builder().status(status);
        if let Some(value) = retry_after {
            builder = builder.header("Retry-After", value);
        }
        reqwest::Response::from(builder.body("quota exhausted").expect("response should build"))
    }

    #[test]
    fn retry_after_header_parsing() {
        assert_eq!(parse_retry_after(&mock_response(429, Some("120"))), Some(120));
        assert_eq!(parse_retry_after(&mock_response(429, None)), None);
        assert_eq!(parse_retry_after(&mock_response(429, Some("soon"))), None);
    }

    #[tokio::test]
    async fn rate_limit_is_transient() {
        let err = check_response(mock_response(429, Some("30"))).await.expect_err("check_response should fail");
        assert!(matches!(err, ModelError::RateLimited { retry_after_secs: Some(30) }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn server_error_is_transient_client_error_is_not() {
        let server = check_response(mock_response(503, None)).await.expect_err("check_response should fail");
        assert!(server.is_transient());

        let client = check_response(mock_response(401, None)).await.expect_err("check_response should fail");
        assert!(matches!(client, ModelError::Api { status: 401, ref message } if message == "quota exhausted"));
        assert!(!client.is_transient());
    }

    #[tokio::test]
    async fn success_passes_through() {
        assert!(check_response(mock_response(200, None)).await.is_ok());
    }
}
