//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Middleware registered
//! with [`Router::layer`] wraps routing itself, so unmatched requests pass
//! through it too.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use matchit::Router as MatchitRouter;

use crate::error::{Error, ErrorHandler, default_error_handler};
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::middleware::{self, Middleware};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Every builder method returns `self` so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    layers: Vec<Arc<dyn Middleware>>,
    errors: Arc<dyn ErrorHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            layers: Vec::new(),
            errors: Arc::new(default_error_handler),
        }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use http::Method;
    /// # use reqlog::{Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Adds a middleware. The first layer added runs outermost.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Replaces the handler that turns errors into responses.
    pub fn error_handler(mut self, handler: impl ErrorHandler) -> Self {
        self.errors = Arc::new(handler);
        self
    }

    /// Freezes the routing table and middleware stack into a [`Service`].
    pub fn into_service(self) -> Service {
        let endpoint: BoxedHandler = Arc::new(Routes { routes: self.routes });
        Service {
            chain: middleware::stack(endpoint, &self.layers, &self.errors),
            errors: self.errors,
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

// ── Routing endpoint ──────────────────────────────────────────────────────────

/// Innermost handler of every chain: picks the route and calls it.
struct Routes {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Routes {
    fn lookup(&self, method: &Method, path: &str) -> Result<(BoxedHandler, HashMap<String, String>), Error> {
        let matched = self.routes.get(method).and_then(|tree| tree.at(path).ok());
        match matched {
            Some(matched) => {
                let params = matched.params.iter()
                    .map(|(k, v)| (k.to_owned(), v.to_owned()))
                    .collect();
                Ok((Arc::clone(matched.value), params))
            }
            None if self.routes.values().any(|tree| tree.at(path).is_ok()) => {
                Err(Error::method_not_allowed())
            }
            None => Err(Error::not_found()),
        }
    }
}

impl ErasedHandler for Routes {
    fn call(&self, mut req: Request) -> BoxFuture {
        if let Some(e) = req.body_error.take() {
            return Box::pin(async move { Err(e) });
        }
        match self.lookup(req.method(), req.path()) {
            Ok((handler, params)) => {
                req.params = params;
                handler.call(req)
            }
            Err(e) => Box::pin(async move { Err(e) }),
        }
    }
}

// ── Service ───────────────────────────────────────────────────────────────────

/// A finished application: middleware, routing and error handling.
///
/// [`Server`](crate::Server) drives one of these per process; tests can
/// call it directly.
#[derive(Clone)]
pub struct Service {
    chain: BoxedHandler,
    errors: Arc<dyn ErrorHandler>,
}

impl Service {
    /// Runs `req` through the whole chain. Errors nobody handled are turned
    /// into responses by the error handler here.
    pub async fn call(&self, req: Request) -> Response {
        match self.chain.call(req).await {
            Ok(res) => res,
            Err(e) => self.errors.handle(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    fn request(method: Method, uri: &str) -> Request {
        let req = http::Request::builder().method(method).uri(uri).body(bytes::Bytes::new()).unwrap();
        Request::from_http(req, None)
    }

    async fn echo_id(req: Request) -> String {
        req.param("id").unwrap_or_default().to_owned()
    }

    #[tokio::test]
    async fn routes_by_method_and_path() {
        let app = Router::new().get("/users/{id}", echo_id).into_service();

        let res = app.call(request(Method::GET, "/users/42")).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(&res.body()[..], b"42");
    }

    #[tokio::test]
    async fn unmatched_path_is_404_and_wrong_method_is_405() {
        let app = Router::new().get("/users/{id}", echo_id).into_service();

        let res = app.call(request(Method::GET, "/nope")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

        let res = app.call(request(Method::DELETE, "/users/42")).await;
        assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn handler_errors_reach_the_error_handler() {
        let app = Router::new()
            .post("/fail", |_req: Request| async {
                Err::<Response, _>(Error::http(StatusCode::UNPROCESSABLE_ENTITY, "bad input"))
            })
            .error_handler(|err: &Error| Response::builder().status(err.status()).text("custom"))
            .into_service();

        let res = app.call(request(Method::POST, "/fail")).await;
        assert_eq!(res.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(&res.body()[..], b"custom");
    }

    #[tokio::test]
    async fn first_layer_is_outermost() {
        async fn outer(req: Request, next: middleware::Next) -> Result<Response, Error> {
            let mut res = next.run(req).await?;
            res.headers_mut().append("x-trail", "outer".parse().unwrap());
            Ok(res)
        }
        async fn inner(req: Request, next: middleware::Next) -> Result<Response, Error> {
            let mut res = next.run(req).await?;
            res.headers_mut().append("x-trail", "inner".parse().unwrap());
            Ok(res)
        }

        let app = Router::new()
            .get("/", |_req: Request| async { "ok" })
            .layer(outer)
            .layer(inner)
            .into_service();

        let res = app.call(request(Method::GET, "/")).await;
        let trail: Vec<_> = res.headers().get_all("x-trail").iter().collect();
        assert_eq!(trail, ["inner", "outer"]);
    }
}
