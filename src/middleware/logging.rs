use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{error, info, warn};

/// Attached to failing responses by `ShopError` so the failure reason reaches
/// the request log without leaking into the body.
#[derive(Clone, Debug)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = start.elapsed();

    match response.extensions().get::<ErrorReport>() {
        Some(report) if status.is_server_error() => error!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            kind = report.kind,
            error = %report.message,
            "Failed to process request"
        ),
        Some(report) => warn!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            kind = report.kind,
            error = %report.message,
            "Rejected request"
        ),
        None => info!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            "Processed request"
        ),
    }

    response
}
