//! Built-in Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Probes hit every few seconds, so they are usually kept out of the access
//! log with a skipper:
//!
//! ```rust,no_run
//! use reqlog::middleware::{Logger, LoggerConfig};
//! use reqlog::{Router, health};
//!
//! let app = Router::new()
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness)
//!     .layer(Logger::with_config(
//!         LoggerConfig::default().skipper(|req| health::is_probe(req.path())),
//!     ));
//! ```

use crate::{Request, Response};

pub const LIVENESS_PATH: &str = "/healthz";
pub const READINESS_PATH: &str = "/readyz";

/// Whether `path` is one of the default probe paths.
pub fn is_probe(path: &str) -> bool {
    path == LIVENESS_PATH || path == READINESS_PATH
}

/// Kubernetes liveness probe handler.
///
/// Always returns `200 OK` with body `"ok"`.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Kubernetes readiness probe handler (default implementation).
///
/// Returns `200 OK` with body `"ready"`. Replace it if the application must
/// verify dependencies before accepting traffic.
pub async fn readiness(_req: Request) -> Response {
    Response::text("ready")
}
