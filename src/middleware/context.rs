//! Read-only view of an inbound request.

use http::Extensions;
use hyper::header::HeaderName;
use hyper::{HeaderMap, Method, Request, Uri};

/// Borrowed view of the parts of a request the middleware and its
/// callbacks may look at.
///
/// It does not depend on the body type, so skip predicates and generators
/// can be written once for any `Request<B>`.
#[derive(Clone, Copy, Debug)]
pub struct RequestContext<'a> {
    method: &'a Method,
    uri: &'a Uri,
    headers: &'a HeaderMap,
    extensions: &'a Extensions,
}

impl<'a> RequestContext<'a> {
    /// Borrow a context from a request.
    pub fn new<B>(req: &'a Request<B>) -> Self {
        Self {
            method: req.method(),
            uri: req.uri(),
            headers: req.headers(),
            extensions: req.extensions(),
        }
    }

    pub fn method(&self) -> &'a Method {
        self.method
    }

    pub fn uri(&self) -> &'a Uri {
        self.uri
    }

    pub fn path(&self) -> &'a str {
        self.uri.path()
    }

    pub fn headers(&self) -> &'a HeaderMap {
        self.headers
    }

    /// Request extensions, e.g. the client address inserted by the server.
    pub fn extensions(&self) -> &'a Extensions {
        self.extensions
    }

    /// Get a header as a string, skipping values that are not visible ASCII.
    pub fn header_str(&self, name: &HeaderName) -> Option<&'a str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
