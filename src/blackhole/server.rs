use crate::blackhole::model::Scheme;
use crate::blackhole::{routes, tls};
use crate::commands::ServerCommand;
use crate::error::Error;
use axum::Router;
use hyper::server::conn::Http;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_rustls::TlsAcceptor;

/// Serve the blackhole for `cmd` until interrupted. Blocks the calling thread.
///
/// # Errors
///
/// Returns [`Error::IO`] if the runtime can't start or the address can't be resolved or bound,
/// [`Error::InvalidTls`] if the TLS files can't be loaded, and [`Error::HTTP`] if the HTTP server
/// fails.
pub fn serve(cmd: &ServerCommand) -> Result<(), Error> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cmd))
}

async fn run(cmd: &ServerCommand) -> Result<(), Error> {
    let addr = resolve(&cmd.host, cmd.port).await?;
    match cmd.tls_files() {
        Some((cert, key)) => {
            let acceptor = tls::acceptor(cert, key)?;
            tracing::info!("HTTPS listening on {addr}");
            serve_https(addr, acceptor).await
        }
        None => {
            tracing::info!("HTTP listening on {addr}, redirecting to HTTPS");
            serve_http(addr).await
        }
    }
}

async fn resolve(host: &str, port: u16) -> Result<SocketAddr, Error> {
    tokio::net::lookup_host((host, port))
        .await?
        .next()
        .ok_or_else(|| Error::Server(format!("host {host:?} did not resolve to an address")))
}

async fn serve_http(addr: SocketAddr) -> Result<(), Error> {
    let server = axum::Server::try_bind(&addr)?.serve(routes::new(Scheme::Http).into_make_service());
    tokio::select! {
        res = server => res?,
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
    }
    tracing::info!("goodbye");
    Ok(())
}

async fn serve_https(addr: SocketAddr, acceptor: TlsAcceptor) -> Result<(), Error> {
    let listener = TcpListener::bind(addr).await?;
    let app = routes::new(Scheme::Https);
    tokio::select! {
        res = accept_loop(listener, acceptor, app) => res?,
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
    }
    tracing::info!("goodbye");
    Ok(())
}

async fn accept_loop(listener: TcpListener, acceptor: TlsAcceptor, app: Router) -> Result<(), Error> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let acceptor = acceptor.clone();
        let app = app.clone();
        tokio::spawn(async move {
            let stream = match acceptor.accept(stream).await {
                Ok(stream) => stream,
                Err(err) => {
                    tracing::debug!("TLS handshake with {peer} failed: {err}");
                    return;
                }
            };
            if let Err(err) = Http::new().serve_connection(stream, app).await {
                tracing::debug!("connection from {peer} ended with error: {err}");
            }
        });
    }
}
