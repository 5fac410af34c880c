//! Unified error type.

use http::StatusCode;

use crate::response::Response;

/// The error type returned by handlers, middleware and the server.
///
/// A handler that returns `Err(_)` hands the error to the application's
/// [`ErrorHandler`], which turns it into a [`Response`]. [`Error::status`]
/// is the status the default handler answers with.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("body: {0}")]
    Body(#[from] hyper::Error),

    #[error("{status}: {message}")]
    Http { status: StatusCode, message: String },

    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// An error that maps to a specific HTTP status.
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http { status, message: message.into() }
    }

    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(err))
    }

    pub(crate) fn not_found() -> Self {
        Self::http(StatusCode::NOT_FOUND, "Not Found")
    }

    pub(crate) fn method_not_allowed() -> Self {
        Self::http(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Http { status, .. } => *status,
            Self::Body(_) => StatusCode::BAD_REQUEST,
            Self::Io(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ── Error sink ────────────────────────────────────────────────────────────────

/// Turns a handler error into the response sent to the client.
///
/// Installed with [`Router::error_handler`](crate::Router::error_handler).
/// Middleware reaches it through [`Next::report_error`](crate::middleware::Next::report_error).
pub trait ErrorHandler: Send + Sync + 'static {
    fn handle(&self, err: &Error) -> Response;
}

impl<F> ErrorHandler for F
where
    F: Fn(&Error) -> Response + Send + Sync + 'static,
{
    fn handle(&self, err: &Error) -> Response {
        self(err)
    }
}

/// Plain-text response carrying the error's status.
///
/// Internal failures are not echoed back to the client; only
/// [`Error::Http`] messages are.
pub fn default_error_handler(err: &Error) -> Response {
    let status = err.status();
    let body = match err {
        Error::Http { message, .. } => message.clone(),
        _ => status.canonical_reason().unwrap_or_default().to_owned(),
    };
    Response::builder().status(status).text(body)
}
