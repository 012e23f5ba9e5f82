//! Request routing.
//!
//! Pure dispatch over the immutable namespace: `/` goes to the synthetic
//! root, any other path is matched by its first segment against the bound
//! volume identifiers, and everything else is a 404. Matching is
//! segment-exact, not a raw string-prefix comparison, so `/ca` never
//! lands on a `/c` binding.

use crate::namespace::{Binding, Namespace};
use dav_server::body::Body;
use hyper::body::Buf;
use hyper::{Request, Response, StatusCode};
use std::error::Error as StdError;
use std::sync::Arc;
use tracing::{debug, trace};

/// Outcome of matching a request path against the namespace.
#[derive(Debug)]
pub enum RouteDecision<'a> {
    /// Path is exactly the root; serve the synthetic listing.
    Root,
    /// Path belongs to a bound volume (including the bare prefix).
    Volume(&'a Binding),
    /// No binding matched; terminal for the request.
    NotFound,
}

/// Match a request path against the namespace.
///
/// The first path segment is compared exactly against binding
/// identifiers, in registration order.
pub fn route_decision<'a>(namespace: &'a Namespace, path: &str) -> RouteDecision<'a> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return RouteDecision::Root;
    }

    let segment = trimmed.split('/').next().unwrap_or(trimmed);
    match namespace.find(segment) {
        Some(binding) => RouteDecision::Volume(binding),
        None => RouteDecision::NotFound,
    }
}

/// Dispatches each request to the synthetic root or the matched volume
/// backend.
///
/// Holds the namespace snapshot by reference; nothing here is mutated
/// during request serving, so the router needs no synchronization of its
/// own.
#[derive(Clone)]
pub struct Router {
    namespace: Arc<Namespace>,
}

impl Router {
    /// Create a router over a namespace snapshot.
    pub fn new(namespace: Arc<Namespace>) -> Self {
        Self { namespace }
    }

    /// The namespace this router dispatches into.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Route a request and await the selected backend.
    pub async fn dispatch<ReqBody, ReqData, ReqError>(
        &self,
        req: Request<ReqBody>,
    ) -> Response<Body>
    where
        ReqBody: hyper::body::Body<Data = ReqData, Error = ReqError> + Send + 'static,
        ReqData: Buf + Send + 'static,
        ReqError: StdError + Send + Sync + 'static,
    {
        let path = req.uri().path().to_string();

        match route_decision(&self.namespace, &path) {
            RouteDecision::Root => {
                trace!(path = %path, "dispatching to synthetic root");
                self.namespace.root_handler().handle(req).await
            }
            RouteDecision::Volume(binding) => {
                trace!(path = %path, prefix = %binding.prefix, "dispatching to volume");
                binding.handler().handle(req).await
            }
            RouteDecision::NotFound => {
                // Not a server error: the client asked for an unbound path.
                debug!(path = %path, "no route match");
                not_found()
            }
        }
    }
}

/// The terminal 404 response for unmatched paths.
fn not_found() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
}
