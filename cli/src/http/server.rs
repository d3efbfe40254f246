//! HTTP server lifecycle

use crate::http::{
    middleware::{create_middleware_stack, request_logger},
    routes::create_router,
    AppState,
};
use axum::middleware;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
}

impl ServerConfig {
    pub fn from_state(state: &AppState) -> Self {
        let http = &state.config.http_server;
        Self {
            host: http.host.clone(),
            port: http.port,
            request_timeout: Duration::from_secs(http.request_timeout_secs),
        }
    }
}

/// Binds the listener and serves until Ctrl+C, SIGTERM or a broadcast on
/// `state.shutdown_tx`.
pub async fn start_server(config: ServerConfig, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    serve(listener, config.request_timeout, state).await
}

/// Serves on an already bound listener. Port 0 listeners report their real
/// address here.
pub async fn serve(
    listener: TcpListener,
    request_timeout: Duration,
    state: AppState,
) -> std::io::Result<()> {
    let app = create_router(state.clone())
        .layer(middleware::from_fn(request_logger))
        .layer(create_middleware_stack(request_timeout));

    info!(
        "HTTP server listening on http://{}",
        listener.local_addr()?
    );
    if state.config.auth.token().is_none() {
        warn!("No auth token configured; all endpoints are open");
    }

    let mut shutdown_rx = state.shutdown_tx.subscribe();

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = wait_for_ctrl_c() => {
                    info!("Received Ctrl+C signal");
                }
                _ = shutdown_rx.recv() => {
                    info!("Received shutdown signal");
                }
                _ = wait_for_sigterm() => {
                    info!("Received SIGTERM signal");
                }
            }

            info!("Starting graceful shutdown...");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn wait_for_ctrl_c() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await
    }
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to set up SIGTERM handler: {}", e);
            std::future::pending::<()>().await
        }
    }
}

/// No SIGTERM on this platform; Ctrl+C or the shutdown channel ends the server.
#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bft_core::api::{
        AppConfig, ExecutorError, ResultsStore, Services, SuiteOrchestrator, TestCase,
        TestExecutor, TestOutcome, TranscriptLoader, TranscriptTurn,
    };
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::sync::broadcast;

    struct Noop;

    #[async_trait]
    impl TestExecutor for Noop {
        fn name(&self) -> &str {
            "noop"
        }

        async fn execute(&self, test: &TestCase) -> Result<TestOutcome, ExecutorError> {
            Ok(TestOutcome::pass(&test.name))
        }
    }

    #[async_trait]
    impl TranscriptLoader for Noop {
        async fn load(&self, _url: &str) -> Result<Vec<TranscriptTurn>, ExecutorError> {
            Ok(Vec::new())
        }
    }

    fn test_state(shutdown_tx: broadcast::Sender<()>) -> AppState {
        let config = AppConfig::default();
        let services = Services {
            executor: Arc::new(Noop),
            loader: Arc::new(Noop),
        };
        let orchestrator = Arc::new(SuiteOrchestrator::new(
            Arc::new(ResultsStore::new()),
            services,
            &config.suite,
        ));
        AppState::new(orchestrator, config, shutdown_tx)
    }

    #[tokio::test]
    async fn test_server_config_from_defaults() {
        let (shutdown_tx, _) = broadcast::channel(1);
        let config = ServerConfig::from_state(&test_state(shutdown_tx));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_server_lifecycle() {
        let (shutdown_tx, _) = broadcast::channel(1);
        let state = test_state(shutdown_tx.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server_handle =
            tokio::spawn(async move { serve(listener, Duration::from_secs(5), state).await });

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("\"status\":\"healthy\""));

        let _ = shutdown_tx.send(());

        let result = tokio::time::timeout(Duration::from_secs(5), server_handle).await;
        assert!(result.is_ok(), "Server should shutdown gracefully");
        assert!(result.unwrap().unwrap().is_ok());
    }
}
