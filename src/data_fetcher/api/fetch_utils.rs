//! Sends one request and turns the outcome into text or an [`AppError`].

use reqwest::RequestBuilder;
use tracing::{debug, error, instrument};

use crate::error::AppError;

/// Sends `request` and returns the response body.
///
/// No retries and no caching happen here. Non-success statuses map onto the
/// matching `AppError` variant, and so do timeouts and connection failures.
#[instrument(skip(request))]
pub(super) async fn fetch_text(request: RequestBuilder, url: &str) -> Result<String, AppError> {
    debug!("Sending request to {url}");

    let response = match request.send().await {
        Ok(resp) => resp,
        Err(e) => {
            error!("Request failed for URL {}: {}", url, e);
            return Err(if e.is_timeout() {
                AppError::network_timeout(url)
            } else if e.is_connect() {
                AppError::network_connection(url, e.to_string())
            } else {
                AppError::ApiFetch(e)
            });
        }
    };

    let status = response.status();
    debug!("Response status: {status}");

    if !status.is_success() {
        let status_code = status.as_u16();
        let reason = status.canonical_reason().unwrap_or("Unknown error");

        error!("HTTP {} - {} (URL: {})", status_code, reason, url);

        return Err(match status_code {
            404 => AppError::api_not_found(url),
            429 => AppError::api_rate_limit(reason, url),
            502 | 503 => AppError::api_service_unavailable(status_code, reason, url),
            400..=499 => AppError::api_client_error(status_code, reason, url),
            _ => AppError::api_server_error(status_code, reason, url),
        });
    }

    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to read response text from URL {}: {}", url, e);
            return Err(AppError::ApiFetch(e));
        }
    };

    debug!("Response length: {} bytes", text.len());
    let preview: String = text.chars().take(512).collect();
    debug!("Response text (first 512 chars): {preview}");

    if text.trim().is_empty() {
        return Err(AppError::api_no_data("Response body is empty", url));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::api::http_client::create_test_http_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn fetch_status(status: u16) -> Result<String, AppError> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(status).set_body_string("body"))
            .mount(&server)
            .await;

        let url = format!("{}/page", server.uri());
        let client = create_test_http_client();
        fetch_text(client.get(&url), &url).await
    }

    #[tokio::test]
    async fn test_fetch_text_success() {
        assert_eq!(fetch_status(200).await.unwrap(), "body");
    }

    #[tokio::test]
    async fn test_fetch_text_status_mapping() {
        assert!(matches!(fetch_status(404).await, Err(AppError::ApiNotFound { .. })));
        assert!(matches!(fetch_status(429).await, Err(AppError::ApiRateLimit { .. })));
        assert!(matches!(
            fetch_status(400).await,
            Err(AppError::ApiClientError { status: 400, .. })
        ));
        assert!(matches!(
            fetch_status(500).await,
            Err(AppError::ApiServerError { status: 500, .. })
        ));
        assert!(matches!(
            fetch_status(502).await,
            Err(AppError::ApiServiceUnavailable { status: 502, .. })
        ));
        assert!(matches!(
            fetch_status(503).await,
            Err(AppError::ApiServiceUnavailable { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_text_empty_body_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("  "))
            .mount(&server)
            .await;

        let url = server.uri();
        let client = create_test_http_client();
        let result = fetch_text(client.get(&url), &url).await;
        assert!(matches!(result, Err(AppError::ApiNoData { .. })));
    }

    #[tokio::test]
    async fn test_fetch_text_connection_refused() {
        // Port 9 (discard) is closed on test machines
        let url = "http://127.0.0.1:9/nothing".to_string();
        let client = create_test_http_client();
        let result = fetch_text(client.get(&url), &url).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().is_transport_error());
    }
}
