//! Mapping of reqwest failures onto `PanelError`.

use panel_core::{PanelError, Result};
use reqwest::Response;
use std::time::Duration;

/// Maps a transport-level reqwest error.
pub(crate) fn transport_error(operation: &str, timeout: Duration, e: reqwest::Error) -> PanelError {
    if e.is_timeout() {
        PanelError::timeout(operation, timeout)
    } else if let Some(status) = e.status() {
        PanelError::http(status.as_u16(), format!("{operation}: {e}"))
    } else {
        PanelError::transport(format!("{operation}: {e}"))
    }
}

/// Passes 2xx responses through; turns anything else into `PanelError::Http`
/// carrying the response body.
pub(crate) async fn ensure_success(operation: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let reason = status.canonical_reason().unwrap_or("error");
    Err(PanelError::http(
        status.as_u16(),
        format!("{operation} failed ({reason}): {}", body.trim()),
    ))
}

/// Decodes a JSON body, reporting the operation on failure.
pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
    operation: &str,
    response: Response,
) -> Result<T> {
    response.json::<T>().await.map_err(|e| PanelError::Serialization {
        format: "JSON".to_string(),
        message: format!("{operation}: {e}"),
    })
}

/// Joins a base URL and a path without doubling slashes.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:8000/", "/api/health"),
            "http://localhost:8000/api/health"
        );
        assert_eq!(join_url("http://h", "x"), "http://h/x");
    }
}
