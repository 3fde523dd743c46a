//! The request ID service wrapper.

use super::config::{Generator, RequestIdHook, Skipper};
use super::context::RequestContext;
use crate::request_id::{RequestId, X_REQUEST_ID};
use hyper::header::HeaderName;
use hyper::service::Service;
use hyper::{Request, Response};
use pin_project_lite::pin_project;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use tower::Layer;
use tracing::{trace, warn};

/// Validated, immutable middleware settings shared by every clone of a
/// layer and its services.
pub(crate) struct Interceptor {
    pub(crate) skip: Option<Skipper>,
    pub(crate) generator: Generator,
    pub(crate) header: HeaderName,
    pub(crate) on_request_id: Option<RequestIdHook>,
}

impl Interceptor {
    /// Decide the request ID for a request, or `None` if it is skipped.
    fn resolve(&self, ctx: &RequestContext<'_>) -> Option<RequestId> {
        if let Some(skip) = &self.skip {
            if skip(ctx) {
                trace!(path = %ctx.path(), "request id middleware skipped");
                return None;
            }
        }

        if let Some(id) = ctx.headers().get(&self.header).and_then(RequestId::from_header) {
            trace!(request_id = %id, "using client supplied request id");
            return Some(id);
        }

        let generated = self.generator.generate(ctx);
        let id = match RequestId::from_generated(generated) {
            Some(id) => id,
            None => {
                warn!(
                    header = %self.header,
                    "generator produced an empty or invalid request id, using a random one"
                );
                RequestId::new()
            }
        };
        trace!(request_id = %id, "generated request id");
        Some(id)
    }
}

/// Wraps services so every response carries a request ID header.
///
/// Cloning is cheap; all clones share the same settings.
#[derive(Clone)]
pub struct RequestIdLayer {
    interceptor: Arc<Interceptor>,
}

impl fmt::Debug for RequestIdLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestIdLayer")
            .field("header", &self.interceptor.header)
            .field("generator", &self.interceptor.generator)
            .field("skip", &self.interceptor.skip.is_some())
            .field("on_request_id", &self.interceptor.on_request_id.is_some())
            .finish()
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdLayer::layer(self, inner)
    }
}

impl RequestIdLayer {
    pub(crate) fn from_interceptor(interceptor: Interceptor) -> Self {
        Self {
            interceptor: Arc::new(interceptor),
        }
    }

    /// Wrap an inner service.
    pub fn layer<S>(&self, inner: S) -> RequestIdService<S> {
        RequestIdService {
            inner,
            interceptor: Arc::clone(&self.interceptor),
        }
    }

    /// Header this layer reads and writes.
    pub fn header(&self) -> &HeaderName {
        &self.interceptor.header
    }
}

impl Default for RequestIdLayer {
    fn default() -> Self {
        Self::from_interceptor(Interceptor {
            skip: None,
            generator: Generator::default(),
            header: X_REQUEST_ID,
            on_request_id: None,
        })
    }
}

/// Build a layer with the default configuration: never skip, 32 character
/// random IDs, `X-Request-ID` header.
pub fn request_id() -> RequestIdLayer {
    RequestIdLayer::default()
}

/// Service produced by [`RequestIdLayer::layer`].
///
/// Resolves the request ID before the inner service is called, makes it
/// available through the request extensions, and sets it on the response
/// unless the handler already did. Errors from the inner service are returned untouched.
#[derive(Clone)]
pub struct RequestIdService<S> {
    inner: S,
    interceptor: Arc<Interceptor>,
}

impl<S> RequestIdService<S> {
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestIdService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;

    fn call(&self, mut req: Request<ReqBody>) -> Self::Future {
        let resolved = {
            let ctx = RequestContext::new(&req);
            let id = self.interceptor.resolve(&ctx);
            if let (Some(id), Some(hook)) = (&id, &self.interceptor.on_request_id) {
                hook(&ctx, id);
            }
            id
        };

        if let Some(id) = &resolved {
            req.extensions_mut().insert(id.clone());
        }

        ResponseFuture {
            inner: self.inner.call(req),
            request_id: resolved,
            header: self.interceptor.header.clone(),
        }
    }
}

pin_project! {
    /// Response future of [`RequestIdService`].
    pub struct ResponseFuture<F> {
        #[pin]
        inner: F,
        request_id: Option<RequestId>,
        header: HeaderName,
    }
}

impl<F, ResBody, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = Result<Response<ResBody>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let mut response = match ready!(this.inner.poll(cx)) {
            Ok(response) => response,
            Err(e) => return Poll::Ready(Err(e)),
        };

        // A value set by the handler wins, as if the header had been
        // written before the handler ran.
        if let Some(id) = this.request_id.take() {
            response
                .headers_mut()
                .entry(this.header.clone())
                .or_insert(id.into_header_value());
        }

        Poll::Ready(Ok(response))
    }
}
