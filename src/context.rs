use std::{convert::Infallible, future::Future, time::Duration};

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Deadline given to every request by the timeout stage.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The context fired before the wrapped call finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request context cancelled")]
pub struct Cancelled;

/// Request-scoped cancellation: a token that is cancelled when the request
/// ends (or the server shuts down) plus a hard deadline.
#[derive(Debug, Clone)]
pub struct RequestContext {
    token: CancellationToken,
    deadline: Instant,
}

impl RequestContext {
    /// Derives a child of `parent` that expires after `timeout`.
    pub fn with_timeout(parent: &CancellationToken, timeout: Duration) -> Self {
        Self {
            token: parent.child_token(),
            deadline: Instant::now() + timeout,
        }
    }

    pub fn background() -> Self {
        Self::with_timeout(&CancellationToken::new(), REQUEST_TIMEOUT)
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_done(&self) -> bool {
        self.token.is_cancelled() || Instant::now() >= self.deadline
    }

    /// Drives `fut` until it completes or the context fires, whichever is first.
    /// A context that is already done never polls `fut`.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, Cancelled>
    where
        F: Future,
    {
        if self.is_done() {
            return Err(Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Cancelled),
            _ = tokio::time::sleep_until(self.deadline) => Err(Cancelled),
            out = fut => Ok(out),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(RequestContext::background))
    }
}
