//! # reqlog
//!
//! A minimal HTTP framework for services behind a reverse proxy, with one
//! structured access-log event per request.
//!
//! ## The contract
//!
//! The proxy terminates TLS, limits bodies and rate, and handles slow
//! clients. reqlog routes requests, runs middleware and writes an access log
//! that carries what the proxy forwarded: the client IP from
//! `X-Forwarded-For`, the `X-Request-Id` correlation id, the host and the
//! user agent.
//!
//! - Radix-tree routing via [`matchit`]
//! - HTTP/1.1 and HTTP/2 via hyper on tokio
//! - Graceful shutdown on SIGTERM / Ctrl-C
//! - [`middleware::Logger`]: access logging through [`tracing`]
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::StatusCode;
//! use reqlog::middleware::Logger;
//! use reqlog::{Error, Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let app = Router::new()
//!         .get("/users/{id}", get_user)
//!         .post("/users", create_user)
//!         .layer(Logger::new());
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//!
//! async fn create_user(req: Request) -> Result<Response, Error> {
//!     if req.body().is_empty() {
//!         return Err(Error::http(StatusCode::BAD_REQUEST, "empty body"));
//!     }
//!     Ok(Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/users/99")
//!         .json(r#"{"id":"99"}"#))
//! }
//! ```
//!
//! The crate never installs a `tracing` subscriber; the binary does.

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use error::{Error, ErrorHandler, default_error_handler};
pub use handler::{BoxFuture, Handler, IntoOutcome};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{Router, Service};
pub use server::Server;
