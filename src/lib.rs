//! # apiroute
//!
//! REST routes described by masks, for Rust services behind a reverse proxy.
//!
//! A route mask is a URL template with `<name>` placeholders and `[…]`
//! optional segments, which may nest:
//!
//! ```text
//! /users/<id>[/<f>-<b>]
//! ```
//!
//! apiroute does three things with it:
//!
//! - **Compile** the mask once, when the route is built, into an anchored
//!   pattern. Bad masks fail at startup, never per request.
//! - **Match** a request: path, effective method (with override header and
//!   query parameter), response format, and the placeholders' values.
//! - **Build** the URL back from a presenter, an action and parameters.
//!
//! Each route maps HTTP methods to actions (`GET` → `read`, `POST` →
//! `create`, …). A method without an action does not match, exactly like a
//! path that does not fit.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use apiroute::{App, ParameterSpec, Response, Route, RouteList, RouteMatch, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), apiroute::Error> {
//!     let routes = RouteList::new().route(
//!         Route::builder("/users[/<id>]", "Resources:Users")
//!             .parameter("id", ParameterSpec::new().requirement(r"\d+"))
//!             .build()?,
//!     );
//!
//!     let app = App::new(routes).handler("Resources:Users", users);
//!     Server::bind("0.0.0.0:3000").serve(app).await
//! }
//!
//! async fn users(m: RouteMatch) -> Response {
//!     let id = m.param("id").unwrap_or("all");
//!     Response::json(format!(r#"{{"action":"{}","id":"{id}"}}"#, m.action).into_bytes())
//! }
//! ```

mod error;
mod handler;
mod mask;
mod method;
mod negotiate;
mod param;
mod request;
mod response;
mod route;
mod router;
mod server;

pub mod config;

pub use error::{ConfigError, Error};
pub use handler::Handler;
pub use mask::{CaptureRole, CompiledPattern, Mask};
pub use method::{ActionTable, Method};
pub use negotiate::{
    Format, METHOD_OVERRIDE_HEADER, METHOD_OVERRIDE_QUERY, resolve_format, resolve_method,
};
pub use param::{INFO_KEYS, ParameterSpec, Params};
pub use request::{Destination, RouteMatch, RouteRequest, UploadedFile};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use route::{DEFAULT_TAG_COLOR, MatchHook, Route, RouteBuilder, RouteDescription};
pub use router::RouteList;
pub use server::{App, Server};
