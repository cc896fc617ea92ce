//! Exact `(Method, path)` route dispatch, composed with the static file cache
//! and the intrusion detector behind a single top-level [`Handler`] impl.

use std::{future::Future, pin::Pin};

use rustc_hash::FxHashMap;

use crate::{
    brig::IntrusionDetector,
    http::request::Request,
    http::response::{Handled, Response},
    server::connection::ConnectionData,
    server::server_impl::Handler,
    static_files::StaticFilesCache,
    Method, StatusCode,
};

type BoxedHandle<'a> = Pin<Box<dyn Future<Output = Handled> + Send + 'a>>;

trait ErasedHandler<S: ConnectionData>: Send + Sync + 'static {
    fn handle<'a>(&'a self, data: &'a mut S, req: &'a Request, resp: &'a mut Response) -> BoxedHandle<'a>;
}

impl<S: ConnectionData, H: Handler<S>> ErasedHandler<S> for H {
    fn handle<'a>(&'a self, data: &'a mut S, req: &'a Request, resp: &'a mut Response) -> BoxedHandle<'a> {
        Box::pin(Handler::handle(self, data, req, resp))
    }
}

/// A route table mapping `(Method, path)` to a handler, with optional static
/// file serving and honeypot-based jailing layered underneath.
///
/// Implements [`Handler`] itself, so it can be passed directly to
/// [`ServerBuilder::handler`](crate::ServerBuilder::handler): route lookup
/// first, then the static file cache, then a plain 404.
pub struct HandlerRegistry<S: ConnectionData = ()> {
    routes: FxHashMap<(Method, String), Box<dyn ErasedHandler<S>>>,
    static_files: Option<StaticFilesCache>,
    brig: Option<IntrusionDetector>,
}

impl<S: ConnectionData> HandlerRegistry<S> {
    /// Creates an empty registry with no routes, static files, or jail.
    pub fn new() -> Self {
        Self {
            routes: FxHashMap::default(),
            static_files: None,
            brig: None,
        }
    }

    /// Registers a handler for an exact `(method, path)` pair.
    ///
    /// `path` is matched against [`Url::path`](crate::Url::path), case
    /// insensitively, including the leading slash (e.g. `"/api/users"`).
    pub fn route(mut self, method: Method, path: impl Into<String>, handler: impl Handler<S>) -> Self {
        self.routes.insert((method, path.into().to_ascii_lowercase()), Box::new(handler));
        self
    }

    /// Attaches a static file cache, consulted when no route matches.
    pub fn static_files(mut self, cache: StaticFilesCache) -> Self {
        self.static_files = Some(cache);
        self
    }

    /// Attaches an intrusion detector. Requests that trip a honeypot route
    /// jail the client's IP for subsequent connections to reject outright.
    pub fn brig(mut self, brig: IntrusionDetector) -> Self {
        self.brig = Some(brig);
        self
    }
}

impl<S: ConnectionData> Default for HandlerRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ConnectionData> Handler<S> for HandlerRegistry<S> {
    async fn handle(&self, data: &mut S, req: &Request, resp: &mut Response) -> Handled {
        if let Some(brig) = &self.brig {
            if brig.is_honeypot(req.method(), req.url().path()) {
                brig.jail(req.client_addr().ip());
            }
        }

        let path = String::from_utf8_lossy(req.url().path()).to_ascii_lowercase();

        if let Some(handler) = self.routes.get(&(req.method(), path)) {
            return handler.handle(data, req, resp).await;
        }

        if let Some(cache) = &self.static_files {
            if let Some(handled) = cache.serve(req.url().path(), resp) {
                return handled;
            }
        }

        resp.status(StatusCode::NotFound).body("Not Found")
    }

    fn is_jailed(&self, client_addr: std::net::SocketAddr) -> bool {
        match &self.brig {
            Some(brig) => brig.is_jailed(client_addr.ip()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Handler<()> for Echo {
        async fn handle(&self, _: &mut (), _: &Request, resp: &mut Response) -> Handled {
            resp.status(StatusCode::Ok).body("echo")
        }
    }

    #[test]
    fn route_matches_exact_method_and_path() {
        let registry: HandlerRegistry = HandlerRegistry::new().route(Method::Get, "/echo", Echo);
        assert!(registry.routes.contains_key(&(Method::Get, "/echo".to_string())));
        assert!(!registry.routes.contains_key(&(Method::Post, "/echo".to_string())));
    }

    #[test]
    fn unmatched_route_has_no_static_files_or_brig() {
        let registry: HandlerRegistry = HandlerRegistry::new();
        assert!(registry.static_files.is_none());
        assert!(registry.brig.is_none());
    }
}
