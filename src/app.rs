use std::net::SocketAddr;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue},
    middleware,
    routing::get,
    Json, Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    config::AppConfig,
    middleware::{log_request, with_timeout},
    state::AppState,
    students,
};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Stages run outermost first: content-type, timeout, logging, then the
/// per-route auth stage inside the students router.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(students::router(&state))
                .route("/health", get(|| async { Json("ok") })),
        )
        .layer(middleware::from_fn(log_request))
        .layer(middleware::from_fn_with_state(
            state.shutdown.clone(),
            with_timeout,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            CONTENT_TYPE,
            HeaderValue::from_static(JSON_CONTENT_TYPE),
        ))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_request(())
                .on_response(())
                .on_failure(()),
        )
        .with_state(state)
}

pub async fn serve(
    app: Router,
    config: &AppConfig,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM and cancels every in-flight request context.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
    shutdown.cancel();
}
