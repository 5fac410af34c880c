//! Incoming HTTP request type.

use std::borrow::Cow;
use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use http::header::{HOST, HeaderMap, USER_AGENT};
use http::{HeaderValue, Method, Uri};

use crate::error::Error;

/// An incoming HTTP request with its body fully read.
#[derive(Debug)]
pub struct Request {
    pub(crate) parts: http::request::Parts,
    pub(crate) body: Bytes,
    pub(crate) remote_addr: Option<SocketAddr>,
    pub(crate) params: HashMap<String, String>,
    /// Set when the body could not be read; routing answers with it.
    pub(crate) body_error: Option<Error>,
}

impl Request {
    /// Wraps an `http::Request`. `remote_addr` is the TCP peer, if known.
    pub fn from_http(req: http::Request<Bytes>, remote_addr: Option<SocketAddr>) -> Self {
        let (parts, body) = req.into_parts();
        Self { parts, body, remote_addr, params: HashMap::new(), body_error: None }
    }

    /// A request whose body failed to arrive. It still runs through the
    /// middleware chain so the failure is observed like any other error.
    pub(crate) fn with_body_error(
        parts: http::request::Parts,
        err: Error,
        remote_addr: Option<SocketAddr>,
    ) -> Self {
        Self { parts, body: Bytes::new(), remote_addr, params: HashMap::new(), body_error: Some(err) }
    }

    pub fn method(&self) -> &Method { &self.parts.method }
    pub fn uri(&self) -> &Uri { &self.parts.uri }
    pub fn path(&self) -> &str { self.parts.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.parts.headers }
    pub fn body(&self) -> &Bytes { &self.body }
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// Path and query exactly as the client sent them, e.g. `/users?page=2`.
    pub fn request_uri(&self) -> &str {
        self.parts.uri.path_and_query().map_or("/", |pq| pq.as_str())
    }

    /// Case-insensitive header lookup. Values that are not visible ASCII
    /// count as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `Host` header, or the URI authority for HTTP/2 requests.
    ///
    /// Non-UTF-8 bytes are replaced rather than dropped, here and in
    /// [`user_agent`](Self::user_agent).
    pub fn host(&self) -> Cow<'_, str> {
        match self.parts.headers.get(HOST) {
            Some(v) => lossy(v),
            None => Cow::Borrowed(self.parts.uri.authority().map_or("", |a| a.as_str())),
        }
    }

    pub fn user_agent(&self) -> Cow<'_, str> {
        self.parts.headers.get(USER_AGENT).map_or(Cow::Borrowed(""), lossy)
    }

    /// Client address as seen through the reverse proxy.
    ///
    /// First entry of `X-Forwarded-For`, then `X-Real-IP`, then the TCP
    /// peer's IP. Empty when none of them is available.
    pub fn real_ip(&self) -> String {
        if let Some(xff) = self.header("x-forwarded-for") {
            let first = xff.split(',').next().unwrap_or_default().trim();
            if !first.is_empty() {
                return first.to_owned();
            }
        }
        if let Some(ip) = self.header("x-real-ip").map(str::trim).filter(|ip| !ip.is_empty()) {
            return ip.to_owned();
        }
        self.remote_addr.map(|addr| addr.ip().to_string()).unwrap_or_default()
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Header value as text. Invalid UTF-8 is replaced, not dropped.
pub(crate) fn lossy(value: &HeaderValue) -> Cow<'_, str> {
    String::from_utf8_lossy(value.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(builder: http::request::Builder) -> Request {
        let peer: SocketAddr = "10.0.0.7:51234".parse().unwrap();
        Request::from_http(builder.body(Bytes::new()).unwrap(), Some(peer))
    }

    #[test]
    fn real_ip_prefers_forwarded_for() {
        let req = request(
            http::Request::builder()
                .header("x-forwarded-for", " 203.0.113.9 , 10.0.0.1")
                .header("x-real-ip", "198.51.100.2"),
        );
        assert_eq!(req.real_ip(), "203.0.113.9");
    }

    #[test]
    fn real_ip_falls_back_to_real_ip_then_peer() {
        let req = request(http::Request::builder().header("x-real-ip", "198.51.100.2"));
        assert_eq!(req.real_ip(), "198.51.100.2");

        let req = request(http::Request::builder());
        assert_eq!(req.real_ip(), "10.0.0.7");

        let req = Request::from_http(http::Request::new(Bytes::new()), None);
        assert_eq!(req.real_ip(), "");
    }

    #[test]
    fn host_uses_header_then_authority() {
        let req = request(http::Request::builder().uri("/a").header("host", "api.local"));
        assert_eq!(req.host(), "api.local");

        let req = request(http::Request::builder().uri("https://h2.local/a?b=1"));
        assert_eq!(req.host(), "h2.local");
        assert_eq!(req.request_uri(), "/a?b=1");

        let req = request(http::Request::builder().uri("/a"));
        assert_eq!(req.host(), "");
    }

    #[test]
    fn missing_user_agent_is_empty() {
        let req = request(http::Request::builder());
        assert_eq!(req.user_agent(), "");

        let req = request(http::Request::builder().header("User-Agent", "curl/8.5"));
        assert_eq!(req.user_agent(), "curl/8.5");
        assert_eq!(req.header("USER-AGENT"), Some("curl/8.5"));
    }

    #[test]
    fn non_ascii_header_values_are_kept() {
        let req = request(
            http::Request::builder()
                .header("user-agent", HeaderValue::from_bytes("naïve-agent/1.0".as_bytes()).unwrap())
                .header("host", HeaderValue::from_bytes(b"h\xf4te.local").unwrap()),
        );
        assert_eq!(req.user_agent(), "naïve-agent/1.0");
        assert_eq!(req.host(), "h\u{fffd}te.local");
    }
}
