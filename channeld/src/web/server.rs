// File: channeld/src/web/server.rs
use crate::config::AdminConfig;
use crate::constants::urls;
use crate::errors::ParticipationError;
use crate::web::{handlers, tls, AppState};
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::Request,
    routing::{get, post},
    Router,
};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use rustls::ServerConfig;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;
use tower::Service;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

/// Mutually authenticated HTTPS server for the participation API
pub struct AdminServer {
    listener: TcpListener,
    acceptor: TlsAcceptor,
    router: Router,
}

impl AdminServer {
    /// Load TLS material named in `config` and bind the listen address
    pub async fn bind(config: &AdminConfig, state: AppState) -> Result<Self, ParticipationError> {
        let tls_config = tls::load_server_config(&config.tls).await?;
        Ok(Self::bind_with_tls(&config.listen_address, tls_config, state).await?)
    }

    pub async fn bind_with_tls(
        listen_address: &str,
        tls_config: Arc<ServerConfig>,
        state: AppState,
    ) -> Result<Self> {
        let listener = TcpListener::bind(listen_address)
            .await
            .with_context(|| format!("binding admin endpoint {}", listen_address))?;
        Ok(Self {
            listener,
            acceptor: TlsAcceptor::from(tls_config),
            router: create_router(state),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` resolves
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        info!("Admin server running on https://{}", self.local_addr()?);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Admin server stopped accepting connections");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            warn!("Failed to accept connection: {}", e);
                            continue;
                        }
                    };
                    let acceptor = self.acceptor.clone();
                    let router = self.router.clone();
                    tokio::spawn(serve_connection(acceptor, router, stream, peer));
                }
            }
        }
    }
}

async fn serve_connection(acceptor: TlsAcceptor, router: Router, stream: TcpStream, peer: SocketAddr) {
    let tls_stream = match acceptor.accept(stream).await {
        Ok(tls_stream) => tls_stream,
        Err(e) => {
            debug!("TLS handshake with {} failed: {}", peer, e);
            return;
        }
    };

    let service = service_fn(move |request: Request<Incoming>| router.clone().call(request));
    if let Err(e) = auto::Builder::new(TokioExecutor::new())
        .serve_connection(TokioIo::new(tls_stream), service)
        .await
    {
        debug!("Connection with {} ended: {}", peer, e);
    }
}

pub fn create_router(state: AppState) -> Router {
    let max_request_body_size = state.max_request_body_size;

    Router::new()
        // === CHANNEL ROUTES ===
        .route(
            urls::CHANNELS,
            get(handlers::list_channels).post(handlers::join_channel),
        )
        .route(
            urls::CHANNEL,
            get(handlers::get_channel).delete(handlers::remove_channel),
        )
        // === SNAPSHOT ROUTES ===
        .route(urls::SNAPSHOT_JOIN, post(handlers::join_by_snapshot))
        .route(urls::SNAPSHOT_STATUS, get(handlers::join_by_snapshot_status))
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::not_found)
        // Add middleware
        .layer(DefaultBodyLimit::max(max_request_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
