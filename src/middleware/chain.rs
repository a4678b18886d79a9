//! Ordered composition of middlewares around a final handler.
//!
//! A [`Handler`] is any boxed service from request to response that cannot
//! fail at the transport level: rejections are ordinary responses. A
//! [`Middleware`] turns one handler into another.
//!
//! [`compose`] wraps the handler with the listed middlewares so that the
//! **last** one listed is outermost:
//!
//! ```text
//! compose(h, [a, b, c])  ==  c(b(a(h)))
//!
//! request  ─▶ c ─▶ b ─▶ a ─▶ h
//! response ◀─ c ◀─ b ◀─ a ◀─ h
//! ```
//!
//! A middleware that rejects a request returns its own response and never
//! calls the handler it wraps, so nothing inside it runs.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use axum::extract::Request;
use axum::response::Response;
use tower::util::BoxCloneSyncService;
use tower::{Layer, Service};

/// A type-erased request handler.
pub type Handler = BoxCloneSyncService<Request, Response, Infallible>;

/// Boxes any cloneable, infallible service into a [`Handler`].
pub fn handler<S>(service: S) -> Handler
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
{
    BoxCloneSyncService::new(service)
}

type Wrap = dyn Fn(Handler) -> Handler + Send + Sync;

/// A named transformation from one handler to another.
#[derive(Clone)]
pub struct Middleware {
    name: &'static str,
    wrap: Arc<Wrap>,
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Middleware").field(&self.name).finish()
    }
}

impl Middleware {
    pub fn new<F>(name: &'static str, wrap: F) -> Self
    where
        F: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        Self {
            name,
            wrap: Arc::new(wrap),
        }
    }

    /// Adapts a tower layer whose services keep the handler's request and response types.
    pub fn from_layer<L>(name: &'static str, layer: L) -> Self
    where
        L: Layer<Handler> + Send + Sync + 'static,
        L::Service: Service<Request, Response = Response, Error = Infallible>
            + Clone
            + Send
            + Sync
            + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        Self::new(name, move |inner| handler(layer.layer(inner)))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn wrap(&self, inner: Handler) -> Handler {
        (self.wrap)(inner)
    }
}

/// Wraps `inner` with `middlewares`, the last one listed outermost.
pub fn compose(inner: Handler, middlewares: &[Middleware]) -> Handler {
    middlewares
        .iter()
        .fold(inner, |wrapped, middleware| middleware.wrap(wrapped))
}

/// Builder over [`compose`].
///
/// Middlewares are listed innermost first, the same order `compose` takes.
#[derive(Clone, Debug, Default)]
pub struct Chain {
    middlewares: Vec<Middleware>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, middleware: Middleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Middleware names in the order a request meets them.
    pub fn request_order(&self) -> Vec<&'static str> {
        self.middlewares.iter().rev().map(Middleware::name).collect()
    }

    pub fn then<S>(&self, service: S) -> Handler
    where
        S: Service<Request, Response = Response, Error = Infallible>
            + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
    {
        compose(handler(service), &self.middlewares)
    }
}
