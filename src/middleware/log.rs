use axum::{extract::Request, middleware::Next, response::Response};

/// Logs every failed request with method, URL, status and timestamp.
/// Error messages and internal detail are logged at the classification
/// sites; this layer guarantees the request context is always recorded.
pub async fn log_failures(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        tracing::error!(
            method = %method,
            url = %uri,
            status = status.as_u16(),
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "request failed"
        );
    }

    response
}
