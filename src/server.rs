//! HTTP server, dispatch and graceful shutdown.
//!
//! An [`App`] ties a [`RouteList`] to one handler per presenter. Every request
//! is turned into a [`RouteRequest`], matched against the routes in order,
//! and the [`RouteMatch`](crate::RouteMatch) handed to the presenter's handler. No match is a
//! `404`; so is a presenter nobody registered a handler for.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or Ctrl-C the server stops accepting, lets every in-flight
//! connection finish, then returns from [`Server::serve`].

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::handler::{BoxedHandler, Handler};
use crate::request::RouteRequest;
use crate::response::Response;
use crate::router::RouteList;

// ── App ───────────────────────────────────────────────────────────────────────

/// Routes plus the handlers they dispatch to.
pub struct App {
    routes: RouteList,
    handlers: HashMap<String, BoxedHandler>,
    base_path: String,
}

impl App {
    pub fn new(routes: RouteList) -> Self {
        Self { routes, handlers: HashMap::new(), base_path: "/".to_owned() }
    }

    /// Register the handler for `presenter`. Returns `self` for chaining.
    pub fn handler(mut self, presenter: impl Into<String>, handler: impl Handler) -> Self {
        self.handlers.insert(presenter.into(), handler.into_boxed_handler());
        self
    }

    /// URL prefix the application is deployed under.
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn routes(&self) -> &RouteList {
        &self.routes
    }

    /// Routes one request and produces one response.
    ///
    /// The app's base path replaces whatever base path `req` carries.
    pub async fn respond(&self, req: RouteRequest) -> Response {
        let req = req.with_base_path(&self.base_path);
        let Some((route, matched)) = self.routes.match_request(&req) else {
            debug!(method = req.method(), path = req.path(), "no route matched");
            return Response::status(StatusCode::NOT_FOUND);
        };

        match self.handlers.get(route.presenter()) {
            Some(handler) => handler.call(matched).await,
            None => {
                warn!(presenter = route.presenter(), "no handler registered for presenter");
                Response::status(StatusCode::NOT_FOUND)
            }
        }
    }
}

// ── Server ────────────────────────────────────────────────────────────────────

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    /// Starts accepting connections and dispatching them through `app`.
    ///
    /// Returns only after a full graceful shutdown.
    pub async fn serve(self, app: App) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let app = Arc::new(app);

        info!(addr = %self.addr, routes = app.routes().len(), "apiroute listening");

        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // check shutdown first so a SIGTERM stops accepting immediately
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        let svc = service_fn(move |req| {
                            let app = Arc::clone(&app);
                            async move { dispatch(app, req).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("apiroute stopped");
        Ok(())
    }
}

/// Core hot path: reads the body, routes, answers.
///
/// Infallible towards hyper: every failure becomes a status code.
async fn dispatch(
    app: Arc<App>,
    req: hyper::Request<hyper::body::Incoming>,
) -> Result<http::Response<Full<Bytes>>, std::convert::Infallible> {
    let (parts, body) = req.into_parts();

    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            error!(path = parts.uri.path(), "failed to read request body: {e}");
            return Ok(Response::status(StatusCode::BAD_REQUEST).into_inner());
        }
    };

    Ok(app.respond(RouteRequest::from_parts(&parts, body)).await.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C on Windows).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
