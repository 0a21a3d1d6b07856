//! HTTP server wiring, post-start self-check, and graceful shutdown.

use anyhow::{Context, Result, anyhow};
use axum::Router;
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use url::Url;

use crate::api::create_api_router;
use crate::services::QueryService;
use crate::services::database::traits::SharedConnection;

pub mod middleware;
pub mod self_check;

/// Port the API listens on.
pub const LISTEN_PORT: u16 = 7080;

/// Delay between the listener starting and the endpoint self-check.
pub const SELF_CHECK_DELAY: Duration = Duration::from_secs(2);

/// How long in-flight requests may run after a shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub addr: SocketAddr,
    /// `None` disables the post-start self-check.
    pub self_check_delay: Option<Duration>,
    pub shutdown_grace: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], LISTEN_PORT)),
            self_check_delay: Some(SELF_CHECK_DELAY),
            shutdown_grace: SHUTDOWN_GRACE,
        }
    }
}

/// The full application: API routes, request logging, and allow-all CORS.
pub fn build_app(service: QueryService) -> Router {
    create_api_router(service)
        .layer(axum::middleware::from_fn(middleware::log_request))
        .layer(middleware::cors_layer())
}

/// Serve the API until `shutdown` resolves, then drain for at most
/// `options.shutdown_grace` and close the connection pool.
///
/// # Errors
///
/// Fails if the listener cannot be bound, the server stops with an I/O
/// error, or in-flight requests outlive the grace period. The pool is closed
/// in every case.
pub async fn serve<F>(
    connection: SharedConnection,
    options: ServerOptions,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let result = match TcpListener::bind(options.addr)
        .await
        .with_context(|| format!("Failed to bind {}", options.addr))
    {
        Ok(listener) => serve_on(listener, connection.clone(), &options, shutdown).await,
        Err(e) => Err(e),
    };

    connection.close().await;
    result
}

async fn serve_on<F>(
    listener: TcpListener,
    connection: SharedConnection,
    options: &ServerOptions,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let local_addr = listener.local_addr()?;
    let base = self_check_base(local_addr)?;
    let app = build_app(QueryService::new(connection));

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        let _ = stop_rx.await;
    });
    let mut server_task = tokio::spawn(server.into_future());
    tracing::info!("API server running at {}", local_addr);

    let self_check = options.self_check_delay.map(|delay| {
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            self_check::perform_endpoint_health_checks(&base).await;
        })
    });

    let finished_early = tokio::select! {
        res = &mut server_task => Some(res),
        _ = shutdown => None,
    };

    let result = match finished_early {
        Some(res) => server_outcome(res),
        None => {
            tracing::info!("Shutting down server...");
            let _ = stop_tx.send(());
            match tokio::time::timeout(options.shutdown_grace, &mut server_task).await {
                Ok(res) => server_outcome(res),
                Err(_) => {
                    server_task.abort();
                    Err(anyhow!(
                        "Server forced to shutdown: requests still running after {:?}",
                        options.shutdown_grace
                    ))
                }
            }
        }
    };

    if let Some(task) = self_check {
        task.abort();
    }
    result
}

fn server_outcome(res: Result<std::io::Result<()>, JoinError>) -> Result<()> {
    match res {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(anyhow!(e).context("HTTP server error")),
        Err(e) => Err(anyhow!(e).context("HTTP server task failed")),
    }
}

/// Loopback URL the self-check uses to reach this process.
pub fn self_check_base(local_addr: SocketAddr) -> Result<Url, url::ParseError> {
    Url::parse(&format!("http://127.0.0.1:{}/", local_addr.port()))
}

/// Resolve on SIGINT or SIGTERM (Ctrl-C only on non-unix platforms).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
}
