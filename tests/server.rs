//! End-to-end: a real `Server` on loopback, driven over raw TCP.

mod support;

use std::time::Duration;

use reqlog::middleware::Logger;
use reqlog::{Request, Router, Server};
use support::Capture;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::Level;

/// Starts the app on an ephemeral port. Send on the returned channel to stop it.
async fn start(router: Router) -> (std::net::SocketAddr, oneshot::Sender<()>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        Server::from_listener(listener)
            .serve_with_shutdown(router, async {
                let _ = stopped.await;
            })
            .await
            .unwrap();
    });
    (addr, stop, server)
}

/// Writes `raw` and reads until the server closes the connection.
async fn exchange(addr: std::net::SocketAddr, raw: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();
    let mut buf = Vec::new();
    // A reset after a broken body still leaves the log entry behind.
    let _ = tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf)).await;
    String::from_utf8_lossy(&buf).into_owned()
}

fn app() -> Router {
    Router::new()
        .get("/ping", |_req: Request| async { "pong" })
        .post("/", |req: Request| async move { req.body().len().to_string() })
        .layer(Logger::new())
}

#[tokio::test]
async fn served_request_is_logged_with_tcp_peer() {
    let capture = Capture::default();
    let _guard = capture.install();

    let (addr, stop, server) = start(app()).await;
    let reply = exchange(
        addr,
        b"GET /ping?n=1 HTTP/1.1\r\nHost: localhost\r\nUser-Agent: it/1.0\r\nConnection: close\r\n\r\n",
    )
    .await;
    stop.send(()).unwrap();
    server.await.unwrap();

    assert!(reply.starts_with("HTTP/1.1 200"), "{reply}");
    assert!(reply.ends_with("pong"), "{reply}");

    let entries = capture.take();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.level, Level::INFO);
    assert_eq!(entry.message(), "Success");
    assert_eq!(entry.get("remote_ip"), Some("127.0.0.1"));
    assert_eq!(entry.get("host"), Some("localhost"));
    assert_eq!(entry.get("request"), Some("GET /ping?n=1"));
    assert_eq!(entry.get("status"), Some("200"));
    assert_eq!(entry.get("size"), Some("4"));
    assert_eq!(entry.get("user_agent"), Some("it/1.0"));
}

#[tokio::test]
async fn malformed_chunked_body_is_logged_as_client_error() {
    let capture = Capture::default();
    let _guard = capture.install();

    let (addr, stop, server) = start(app()).await;
    exchange(
        addr,
        b"POST / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\nTransfer-Encoding: chunked\r\n\r\nZZ\r\n\r\n",
    )
    .await;
    stop.send(()).unwrap();
    server.await.unwrap();

    let entries = capture.take();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.level, Level::WARN);
    assert_eq!(entry.message(), "Client error");
    assert_eq!(entry.get("status"), Some("400"));
    assert_eq!(entry.get("remote_ip"), Some("127.0.0.1"));
    assert_eq!(entry.get("request"), Some("POST /"));
    assert!(entry.get("error").is_some_and(|e| e.starts_with("body:")), "{entry:?}");
}
