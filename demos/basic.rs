//! Minimal reqlog example — JSON endpoints, health checks and an access log.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!   LOG_FORMAT=json RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42 -H 'x-request-id: abc'
//!   curl -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -X POST http://localhost:3000/users          # 400, logged as a warning
//!   curl http://localhost:3000/boom                   # 500, logged as an error
//!   curl http://localhost:3000/healthz                # not logged

use http::StatusCode;
use reqlog::middleware::{Logger, LoggerConfig};
use reqlog::{Error, Request, Response, Router, Server, health};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f == "json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let access_log = LoggerConfig::default()
        .skipper(|req| health::is_probe(req.path()))
        .include_request_in_message(true);

    let app = Router::new()
        .get("/users/{id}",    get_user)
        .post("/users",        create_user)
        .delete("/users/{id}", delete_user)
        .get("/boom",          boom)
        .get(health::LIVENESS_PATH,  health::liveness)
        .get(health::READINESS_PATH, health::readiness)
        .layer(Logger::with_config(access_log));

    Server::bind("0.0.0.0:3000").serve(app).await
}

// GET /users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}

// POST /users
async fn create_user(req: Request) -> Result<Response, Error> {
    if req.body().is_empty() {
        return Err(Error::http(StatusCode::BAD_REQUEST, "empty body"));
    }

    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(r#"{"id":"99","name":"new_user"}"#))
}

// DELETE /users/{id} → 204 No Content
async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}

// GET /boom → handler error, rendered by the default error handler
async fn boom(_req: Request) -> Result<Response, Error> {
    Err(Error::other(std::io::Error::other("database unreachable")))
}
