//! HTTP listener implementation.
//!
//! Accepts incoming connections and serves each one with the demo handler
//! wrapped by the request ID middleware.

use crate::middleware::RequestIdLayer;
use crate::server::{handle, ClientAddr};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::{service_fn, Service};
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

/// HTTP server that accepts and handles connections.
pub struct HttpServer {
    /// TCP listener.
    listener: TcpListener,
    /// Middleware applied to every request.
    layer: RequestIdLayer,
}

impl HttpServer {
    /// Bind the server to an address.
    pub async fn bind(addr: SocketAddr, layer: RequestIdLayer) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;

        info!(
            listen = %listener.local_addr()?,
            header = %layer.header(),
            "http server bound"
        );

        Ok(Self { listener, layer })
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the server, accepting connections until shutdown.
    #[instrument(skip_all)]
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!("http server starting");

        loop {
            tokio::select! {
                // Accept new connections
                accept_result = self.listener.accept() => {
                    match accept_result {
                        Ok((stream, addr)) => {
                            self.handle_connection(stream, addr);
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                        }
                    }
                }

                // Handle shutdown signal
                _ = shutdown.recv() => {
                    info!("http server shutting down");
                    break;
                }
            }
        }
    }

    /// Handle an incoming connection.
    fn handle_connection(&self, stream: TcpStream, client_addr: SocketAddr) {
        if let Err(e) = stream.set_nodelay(true) {
            warn!(error = %e, "failed to set TCP_NODELAY on client connection");
        }

        let service = self.layer.layer(service_fn(handle::<Incoming>));

        // Record the client address before the middleware sees the request
        let service = service_fn(move |mut req: Request<Incoming>| {
            req.extensions_mut().insert(ClientAddr(client_addr));
            service.call(req)
        });

        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                warn!(client = %client_addr, error = %e, "connection handling failed");
            } else {
                debug!(client = %client_addr, "connection completed");
            }
        });
    }
}
