// src/serve/mod.rs

//! Development HTTP server.
//!
//! Routes the freshness path to the long-poll endpoint and everything else
//! to [`static_files`]. Each request is handled on its own thread so a
//! waiting poll never holds up file requests.

pub mod static_files;

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::anyhow;
use tiny_http::{Header, Request, Response, Server};
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::errors::{FreshError, Result};
use crate::freshness::FreshnessEndpoint;

pub use static_files::{content_type, StaticFiles, StaticLookup};

/// Everything a request handler needs.
#[derive(Debug, Clone)]
pub struct Routes {
    pub freshness_path: String,
    pub endpoint: FreshnessEndpoint,
    pub static_files: StaticFiles,
}

/// Bound server ready to accept requests.
pub struct HttpServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

impl std::fmt::Debug for HttpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpServer").field("addr", &self.addr).finish()
    }
}

impl HttpServer {
    pub fn bind(addr: SocketAddr) -> Result<Self> {
        let server = Server::http(addr)
            .map_err(|e| FreshError::Other(anyhow!("binding HTTP server on {addr}: {e}")))?;
        // Port 0 binds an ephemeral port; report the real one.
        let addr = server.server_addr().to_ip().unwrap_or(addr);
        info!("listening on http://{addr}");
        Ok(Self {
            server: Arc::new(server),
            addr,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the request loop on a dedicated thread.
    ///
    /// `runtime` is the Tokio runtime the freshness channel lives on.
    pub fn spawn(self, routes: Routes, runtime: Handle) -> ServerHandle {
        let server = Arc::clone(&self.server);
        let thread = thread::spawn(move || run_request_loop(&server, routes, runtime));
        ServerHandle {
            server: self.server,
            thread: Some(thread),
        }
    }
}

/// Running server; [`ServerHandle::shutdown`] unblocks the accept loop.
pub struct ServerHandle {
    server: Arc<Server>,
    thread: Option<JoinHandle<()>>,
}

impl ServerHandle {
    pub fn shutdown(mut self) {
        self.server.unblock();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run_request_loop(server: &Server, routes: Routes, runtime: Handle) {
    for request in server.incoming_requests() {
        let routes = routes.clone();
        let runtime = runtime.clone();
        thread::spawn(move || handle_request(request, &routes, &runtime));
    }
    debug!("HTTP request loop finished");
}

fn handle_request(request: Request, routes: &Routes, runtime: &Handle) {
    let url = request.url().to_string();
    let path = url.split(['?', '#']).next().unwrap_or("/");

    let response = if path == routes.freshness_path {
        let reply = routes.endpoint.respond_blocking(runtime);
        with_header(text_response(reply.status, reply.body), "Cache-Control", "no-store")
    } else {
        static_response(path, &routes.static_files)
    };

    debug!(url = %url, status = response.status_code().0, "responding");
    if let Err(err) = request.respond(response) {
        warn!(url = %url, error = %err, "failed to send response");
    }
}

fn static_response(path: &str, files: &StaticFiles) -> Response<Cursor<Vec<u8>>> {
    match files.lookup(path) {
        StaticLookup::File(file) => match files.read(&file) {
            Ok(body) => with_header(Response::from_data(body), "Content-Type", content_type(&file)),
            Err(err) => {
                warn!(file = %file.display(), error = %err, "failed to read static file");
                text_response(500, "500 Internal Server Error".to_string())
            }
        },
        StaticLookup::NotFound => text_response(404, "404 Not Found".to_string()),
        StaticLookup::Forbidden => text_response(403, "403 Forbidden".to_string()),
    }
}

fn text_response(status: u16, body: String) -> Response<Cursor<Vec<u8>>> {
    let response = Response::from_data(body.into_bytes()).with_status_code(status);
    with_header(response, "Content-Type", "text/plain; charset=utf-8")
}

fn with_header(
    response: Response<Cursor<Vec<u8>>>,
    name: &str,
    value: &str,
) -> Response<Cursor<Vec<u8>>> {
    match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => {
            warn!(name, value, "skipping invalid header");
            response
        }
    }
}
