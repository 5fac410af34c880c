//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns such as access logging, metrics and request-id
//! handling. A middleware receives the request plus a [`Next`] handle for the
//! rest of the chain:
//!
//! ```rust,no_run
//! use reqlog::middleware::Next;
//! use reqlog::{Error, Request, Response, Router};
//!
//! async fn stamp(req: Request, next: Next) -> Result<Response, Error> {
//!     let mut res = next.run(req).await?;
//!     res.headers_mut().insert("x-served-by", "reqlog".parse().unwrap());
//!     Ok(res)
//! }
//!
//! let app = Router::new().layer(stamp);
//! ```
//!
//! Layers wrap each other in registration order: the first one added is the
//! outermost, so it sees the request first and the response last.
//!
//! Built-in middleware:
//! - [`Logger`] — one structured access-log event per request

use std::future::Future;
use std::sync::Arc;

use crate::error::{Error, ErrorHandler};
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::request::Request;
use crate::response::Response;

mod logger;

pub use logger::{Logger, LoggerConfig, Severity, Skipper, X_REQUEST_ID, classify, default_skipper};

/// A request interceptor.
///
/// Implemented for every `Fn(Request, Next) -> impl Future<Output =
/// Result<Response, Error>>`, so a plain `async fn` works.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin(self(req, next))
    }
}

/// The remainder of the chain, handed to a middleware.
pub struct Next {
    inner: BoxedHandler,
    errors: Arc<dyn ErrorHandler>,
}

impl Next {
    /// Runs the rest of the chain. Call it once per request.
    pub fn run(&self, req: Request) -> BoxFuture {
        self.inner.call(req)
    }

    /// Hands `err` to the application's error handler and returns the
    /// response it produced.
    pub fn report_error(&self, err: &Error) -> Response {
        self.errors.handle(err)
    }
}

/// One middleware bound to the handler it wraps.
struct Layered {
    middleware: Arc<dyn Middleware>,
    inner: BoxedHandler,
    errors: Arc<dyn ErrorHandler>,
}

impl ErasedHandler for Layered {
    fn call(&self, req: Request) -> BoxFuture {
        let next = Next { inner: Arc::clone(&self.inner), errors: Arc::clone(&self.errors) };
        self.middleware.call(req, next)
    }
}

/// Wraps `endpoint` in `layers`, first layer outermost.
pub(crate) fn stack(
    endpoint: BoxedHandler,
    layers: &[Arc<dyn Middleware>],
    errors: &Arc<dyn ErrorHandler>,
) -> BoxedHandler {
    layers.iter().rev().fold(endpoint, |inner, middleware| {
        Arc::new(Layered {
            middleware: Arc::clone(middleware),
            inner,
            errors: Arc::clone(errors),
        }) as BoxedHandler
    })
}
