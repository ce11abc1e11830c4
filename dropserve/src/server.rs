//! Connection loop
//!
//! One task per accepted connection, HTTP/1.1 only, optionally behind TLS.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use dropserve_core::{Error, Result};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

use crate::handler::{AppState, handle};

/// Bind the listening socket
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind {}: {}", addr, e)))
}

/// Accept connections until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    tls: Option<TlsAcceptor>,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    tokio::pin!(shutdown);

    loop {
        let (stream, remote) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("Accept error: {}", e);
                    continue;
                }
            },
            _ = &mut shutdown => {
                tracing::info!("👋 Shutting down");
                return Ok(());
            }
        };

        let state = state.clone();
        let tls = tls.clone();

        tokio::task::spawn(async move {
            match tls {
                Some(acceptor) => match acceptor.accept(stream).await {
                    Ok(stream) => serve_connection(TokioIo::new(stream), state, remote).await,
                    Err(e) => tracing::debug!("TLS handshake with {} failed: {}", remote, e),
                },
                None => serve_connection(TokioIo::new(stream), state, remote).await,
            }
        });
    }
}

async fn serve_connection<I>(io: I, state: Arc<AppState>, remote: SocketAddr)
where
    I: hyper::rt::Read + hyper::rt::Write + Unpin,
{
    let service = service_fn(move |req| handle(req, state.clone(), remote));

    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
        tracing::debug!("Error serving connection from {}: {:?}", remote, err);
    }
}
