use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Request, State};
use axum::http::{Method, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::RunError;
use crate::executor::AdminCli;
use crate::response::{json_response, ErrorBody, Health, StatusReport};

const LISTENER_SHOW: &[&str] = &["listener", "show"];
const CLUSTER_SHOW: &[&str] = &["cluster", "show"];
const METRICS_SHOW: &[&str] = &["metrics", "show"];

type SharedAdmin = Arc<AdminCli>;

/// Build the observer router.
///
/// Routes (all GET, exact path match):
/// - `/health` - liveness of the observer itself, never touches vmq-admin
/// - `/listeners` - `vmq-admin listener show`
/// - `/cluster` - `vmq-admin cluster show`
/// - `/metrics` - `vmq-admin metrics show`
/// - `/status` - cluster then listeners, combined
///
/// Anything else gets `{"error":"not_found"}` with a 404, including a known
/// path carrying a query string (`/health?x=1`, `/status?`).
pub fn build_router(admin: AdminCli) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/listeners", get(listeners))
        .route("/cluster", get(cluster))
        .route("/metrics", get(metrics))
        .route("/status", get(status))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(middleware::from_fn(reject_query))
        .with_state(Arc::new(admin))
}

/// Bind the configured address and serve until ctrl-c.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;

    // Printed regardless of RUST_LOG; deployments watch stdout for it
    println!("{}", listening_line(config));

    let admin = config.admin();
    info!(
        vmq_admin = %admin.bin().display(),
        timeout = ?admin.timeout(),
        host = %config.host,
        port = config.port,
        "serving"
    );

    axum::serve(listener, build_router(admin))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    info!("vernemq-observer stopped");
    Ok(())
}

fn listening_line(config: &Config) -> String {
    format!("vernemq-observer listening on {}:{}", config.host, config.port)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c, serving until killed");
        std::future::pending::<()>().await;
    }
}

/// Run one vmq-admin subcommand and frame its result. Subprocess failure is
/// payload, so the status is always 200.
async fn run_admin(admin: &AdminCli, args: &[&str]) -> Result<Response, RunError> {
    let result = admin.run(args).await?;
    Ok(json_response(StatusCode::OK, &result))
}

async fn health() -> Response {
    json_response(StatusCode::OK, &Health::ok())
}

async fn listeners(State(admin): State<SharedAdmin>) -> Result<Response, RunError> {
    run_admin(&admin, LISTENER_SHOW).await
}

async fn cluster(State(admin): State<SharedAdmin>) -> Result<Response, RunError> {
    run_admin(&admin, CLUSTER_SHOW).await
}

async fn metrics(State(admin): State<SharedAdmin>) -> Result<Response, RunError> {
    run_admin(&admin, METRICS_SHOW).await
}

async fn status(State(admin): State<SharedAdmin>) -> Result<Response, RunError> {
    // Sequential: listeners must not start before cluster has exited
    let cluster = admin.run(CLUSTER_SHOW).await?;
    let listeners = admin.run(LISTENER_SHOW).await?;
    Ok(json_response(
        StatusCode::OK,
        &StatusReport::new(cluster, listeners),
    ))
}

async fn not_found(uri: Uri) -> Response {
    debug!(path = %uri.path(), "no route");
    not_found_response()
}

/// Routes match the raw request target, so any query component is a miss.
async fn reject_query(request: Request, next: Next) -> Response {
    if let Some(query) = request.uri().query() {
        debug!(path = %request.uri().path(), query, "no route for path with query");
        return not_found_response();
    }
    next.run(request).await
}

fn not_found_response() -> Response {
    json_response(StatusCode::NOT_FOUND, &ErrorBody::code("not_found"))
}

async fn method_not_allowed(method: Method, uri: Uri) -> Response {
    debug!(%method, path = %uri.path(), "method not allowed");
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &ErrorBody::code("method_not_allowed"),
    )
}
