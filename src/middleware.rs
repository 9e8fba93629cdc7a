use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    context::{RequestContext, REQUEST_TIMEOUT},
    students::error::ErrorBody,
};

/// Timeout stage. Hands downstream a [`RequestContext`] derived from the
/// server's shutdown token that is cancelled when this request finishes, on
/// every exit path. Anything still running at the deadline gets a 504.
pub async fn with_timeout(
    State(shutdown): State<CancellationToken>,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = RequestContext::with_timeout(&shutdown, REQUEST_TIMEOUT);
    let _release = ctx.token().clone().drop_guard();
    let deadline = ctx.deadline();
    req.extensions_mut().insert(ctx);

    match tokio::time::timeout_at(deadline, next.run(req)).await {
        Ok(res) => res,
        Err(_) => {
            warn!(timeout_secs = REQUEST_TIMEOUT.as_secs(), "request deadline exceeded");
            (
                StatusCode::GATEWAY_TIMEOUT,
                Json(ErrorBody {
                    error: "request timed out".into(),
                }),
            )
                .into_response()
        }
    }
}

/// One "handled request" event per request, emitted when dropped. A request
/// abandoned by an outer stage (the timeout backstop) still gets its event,
/// without a status.
struct RequestLog {
    method: Method,
    path: String,
    status: Option<StatusCode>,
}

impl Drop for RequestLog {
    fn drop(&mut self) {
        let (method, path) = (&self.method, &self.path);
        match self.status {
            Some(status) if status.is_server_error() => {
                error!(%method, %path, %status, "handled request")
            }
            Some(status) => info!(%method, %path, %status, "handled request"),
            None => warn!(%method, %path, abandoned = true, "handled request"),
        }
    }
}

/// Logging stage: method and path are captured before dispatch, the status
/// once the inner stages have produced a response.
pub async fn log_request(req: Request, next: Next) -> Response {
    let mut log = RequestLog {
        method: req.method().clone(),
        path: req.uri().path().to_owned(),
        status: None,
    };

    let res = next.run(req).await;
    log.status = Some(res.status());
    res
}
