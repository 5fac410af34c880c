//! Structured access logging.
//!
//! [`Logger`] emits exactly one `tracing` event per request once the
//! downstream chain has produced a response:
//!
//! | status    | level   | message          |
//! |-----------|---------|------------------|
//! | 500 and up| `ERROR` | `Server error`   |
//! | 400–499   | `WARN`  | `Client error`   |
//! | 300–399   | `INFO`  | `Redirection`    |
//! | otherwise | `INFO`  | `Success`        |
//!
//! Fields: `remote_ip`, `latency`, `host`, `request`, `status`, `size`,
//! `user_agent`, `request_id`, and `error` on the `WARN`/`ERROR` tiers.
//!
//! ```rust,no_run
//! use reqlog::middleware::{Logger, LoggerConfig};
//! use reqlog::{Router, health};
//!
//! let app = Router::new()
//!     .get("/healthz", health::liveness)
//!     .layer(Logger::with_config(
//!         LoggerConfig::default()
//!             .skipper(|req| req.path() == "/healthz")
//!             .include_request_in_message(true),
//!     ));
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use http::header::HeaderName;
use tracing::{error, info, warn};

use super::{Middleware, Next};
use crate::error::Error;
use crate::handler::BoxFuture;
use crate::request::{Request, lossy};

/// Correlation-id header, read from the request and then the response.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Decides per request whether logging is bypassed.
pub type Skipper = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// Never skips.
pub fn default_skipper(_req: &Request) -> bool {
    false
}

/// Configuration for [`Logger`].
#[derive(Clone)]
pub struct LoggerConfig {
    /// Requests for which this returns `true` are passed through untouched.
    pub skipper: Skipper,
    /// Append `": METHOD URI"` to the message, for log viewers that only
    /// show the message line by default.
    pub include_request_in_message: bool,
}

impl LoggerConfig {
    pub fn skipper(mut self, skipper: impl Fn(&Request) -> bool + Send + Sync + 'static) -> Self {
        self.skipper = Arc::new(skipper);
        self
    }

    pub fn include_request_in_message(mut self, include: bool) -> Self {
        self.include_request_in_message = include;
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self { skipper: Arc::new(default_skipper), include_request_in_message: false }
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("include_request_in_message", &self.include_request_in_message)
            .finish_non_exhaustive()
    }
}

// ── Classification ────────────────────────────────────────────────────────────

/// Level an access-log event is emitted at.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Maps a status code to its level and base message.
pub fn classify(status: u16) -> (Severity, &'static str) {
    match status {
        500.. => (Severity::Error, "Server error"),
        400..=499 => (Severity::Warn, "Client error"),
        300..=399 => (Severity::Info, "Redirection"),
        _ => (Severity::Info, "Success"),
    }
}

// ── Logger ────────────────────────────────────────────────────────────────────

/// Access-log middleware. See the [module docs](self).
#[derive(Clone, Debug, Default)]
pub struct Logger {
    config: LoggerConfig,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LoggerConfig) -> Self {
        Self { config }
    }
}

impl Middleware for Logger {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        if (self.config.skipper)(&req) {
            return next.run(req);
        }

        let include_request = self.config.include_request_in_message;

        Box::pin(async move {
            // `next` takes the request, so grab what the event needs first.
            let remote_ip = req.real_ip();
            let host = req.host().into_owned();
            let request = format!("{} {}", req.method(), req.request_uri());
            let user_agent = req.user_agent().into_owned();
            let inbound_id = header_text(req.headers()).into_owned();

            let start = Instant::now();
            let outcome = next.run(req).await;
            let latency = start.elapsed();

            let (res, err) = match outcome {
                Ok(res) => (res, None),
                Err(e) => (next.report_error(&e), Some(e)),
            };

            let request_id = if inbound_id.is_empty() {
                header_text(res.headers()).into_owned()
            } else {
                inbound_id
            };

            let status = res.status_code().as_u16();
            let size = res.size();
            let (severity, base) = classify(status);
            let message = if include_request {
                format!("{base}: {request}")
            } else {
                base.to_owned()
            };
            let err = ErrorField(err.as_ref());

            match severity {
                Severity::Error => error!(
                    remote_ip = %remote_ip,
                    latency = ?latency,
                    host = %host,
                    request = %request,
                    status,
                    size,
                    user_agent = %user_agent,
                    request_id = %request_id,
                    error = %err,
                    "{message}"
                ),
                Severity::Warn => warn!(
                    remote_ip = %remote_ip,
                    latency = ?latency,
                    host = %host,
                    request = %request,
                    status,
                    size,
                    user_agent = %user_agent,
                    request_id = %request_id,
                    error = %err,
                    "{message}"
                ),
                Severity::Info => info!(
                    remote_ip = %remote_ip,
                    latency = ?latency,
                    host = %host,
                    request = %request,
                    status,
                    size,
                    user_agent = %user_agent,
                    request_id = %request_id,
                    "{message}"
                ),
            }

            Ok(res)
        })
    }
}

fn header_text(headers: &http::HeaderMap) -> Cow<'_, str> {
    headers.get(&X_REQUEST_ID).map_or(Cow::Borrowed(""), lossy)
}

/// Renders the downstream error, or nothing when the handler succeeded.
struct ErrorField<'a>(Option<&'a Error>);

impl fmt::Display for ErrorField<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(err) => fmt::Display::fmt(err, f),
            None => Ok(()),
        }
    }
}
