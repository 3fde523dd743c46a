//! Demo request handler hosted behind the request ID middleware.

use crate::request_id::RequestId;
use crate::util::request_span;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use tracing::{info, Span};

/// Liveness endpoint path.
pub const HEALTH_PATH: &str = "/healthz";

/// Address of the client that sent a request.
///
/// Inserted into the request extensions by the listener before the
/// middleware runs, so skip predicates and generators can use it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClientAddr(pub SocketAddr);

/// Handle a request: report the request ID the handler was given.
pub async fn handle<B>(req: Request<B>) -> Result<Response<Full<Bytes>>, Infallible> {
    Ok(respond(&req))
}

fn respond<B>(req: &Request<B>) -> Response<Full<Bytes>> {
    if req.uri().path() == HEALTH_PATH {
        return text_response(StatusCode::OK, "ok\n".to_string());
    }

    let id = req.extensions().get::<RequestId>();
    let span = id.map(request_span).unwrap_or_else(Span::none);
    let _enter = span.enter();

    let client = req.extensions().get::<ClientAddr>().map(|c| c.0);
    info!(
        method = %req.method(),
        path = %req.uri().path(),
        client = ?client,
        "handling request"
    );

    let body = format!(
        "request-id: {}\nmethod: {}\npath: {}\n",
        id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
        req.method(),
        req.uri().path()
    );
    text_response(StatusCode::OK, body)
}

fn text_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("text/plain"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(res: Response<Full<Bytes>>) -> String {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let req = Request::builder().uri(HEALTH_PATH).body(()).unwrap();
        let res = handle(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "ok\n");
    }

    #[tokio::test]
    async fn test_reports_request_id_from_extensions() {
        let mut req = Request::builder().uri("/orders").body(()).unwrap();
        req.extensions_mut()
            .insert(RequestId::from_generated("abc123".to_string()).unwrap());

        let res = handle(req).await.unwrap();
        let text = body_text(res).await;
        assert!(text.contains("request-id: abc123"));
        assert!(text.contains("path: /orders"));
    }

    #[tokio::test]
    async fn test_without_request_id() {
        let req = Request::builder().uri("/orders").body(()).unwrap();
        let res = handle(req).await.unwrap();

        assert!(body_text(res).await.contains("request-id: -"));
    }
}
