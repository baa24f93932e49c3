use crate::blackhole::model::{render_block_page, RequestContext, Scheme};
use axum::extract::Extension;
use axum::http::uri::{Authority, PathAndQuery};
use axum::http::{header, HeaderMap, Method, Request, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::any;
use axum::Router;
use lazy_static::lazy_static;
use tower_http::trace::TraceLayer;

/// Status returned for every blackholed request.
pub const GO_AWAY_STATUS_CODE: u16 = 599;

lazy_static! {
    static ref GO_AWAY_STATUS: StatusCode = StatusCode::from_u16(GO_AWAY_STATUS_CODE).unwrap();
}

/// Build the blackhole router for connections accepted over `scheme`.
pub fn new(scheme: Scheme) -> Router {
    Router::new()
        .route("/", any(go_away))
        .route("/*path", any(go_away))
        .fallback(go_away)
        .layer(middleware::from_fn(https_only))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(scheme))
}

#[allow(clippy::unused_async)]
async fn go_away(
    Extension(scheme): Extension<Scheme>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let ctx = RequestContext::new(scheme, &method, &uri, &headers);
    tracing::debug!("refusing {} {}", ctx.method, ctx.url());
    (*GO_AWAY_STATUS, render_block_page(&ctx))
}

async fn https_only<B>(req: Request<B>, next: Next<B>) -> Response {
    if req.extensions().get::<Scheme>() == Some(&Scheme::Https) {
        return next.run(req).await;
    }

    let host = req
        .uri()
        .authority()
        .map(Authority::as_str)
        .or_else(|| req.headers().get(header::HOST)?.to_str().ok());
    match host.and_then(|host| https_location(host, req.uri())) {
        Some(location) => Redirect::temporary(&location).into_response(),
        None => (StatusCode::BAD_REQUEST, "missing or invalid Host header").into_response(),
    }
}

// The HTTPS equivalent of `uri` on `host`. Default ports are dropped.
fn https_location(host: &str, uri: &Uri) -> Option<String> {
    let authority: Authority = host.parse().ok()?;
    let netloc = match authority.port_u16() {
        None | Some(80 | 443) => authority.host().to_string(),
        Some(port) => format!("{}:{port}", authority.host()),
    };
    let path = uri.path_and_query().map_or("/", PathAndQuery::as_str);
    Some(format!("https://{netloc}{path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use tower::ServiceExt;

    fn request(method: Method, uri: &str, host: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(host) = host {
            builder = builder.header(header::HOST, host);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body(resp: Response) -> String {
        let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_https_always_599() {
        let cases = [
            (Method::GET, "/"),
            (Method::GET, "/pixel.gif"),
            (Method::POST, "/a/b/c?x=1&y=2"),
            (Method::DELETE, "/api/v1/events"),
            (Method::OPTIONS, "/"),
            (Method::PUT, "/deeply/nested/path/"),
        ];
        for (method, uri) in cases {
            let resp = new(Scheme::Https)
                .oneshot(request(method.clone(), uri, Some("ads.example.com")))
                .await
                .unwrap();
            assert_eq!(resp.status().as_u16(), GO_AWAY_STATUS_CODE, "{method} {uri}");
            assert_eq!(
                resp.headers()[header::CONTENT_TYPE],
                "text/plain; charset=utf-8"
            );
            let page = body(resp).await;
            assert!(page.contains("ads.example.com is blocked"), "{page}");
        }
    }

    #[tokio::test]
    async fn test_http_redirects_to_https() {
        let cases = [
            ("ads.example.com", "/", "https://ads.example.com/"),
            ("ads.example.com:80", "/x?y=1", "https://ads.example.com/x?y=1"),
            ("ads.example.com:443", "/x", "https://ads.example.com/x"),
            ("ads.example.com:8080", "/x", "https://ads.example.com:8080/x"),
        ];
        for (host, uri, location) in cases {
            let resp = new(Scheme::Http)
                .oneshot(request(Method::GET, uri, Some(host)))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT, "{host}{uri}");
            assert_eq!(resp.headers()[header::LOCATION], location);
        }
    }

    #[tokio::test]
    async fn test_http_without_host_is_bad_request() {
        let resp = new(Scheme::Http)
            .oneshot(request(Method::GET, "/", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_scheme_is_treated_as_http() {
        let app = Router::new()
            .route("/", any(go_away))
            .layer(middleware::from_fn(https_only));
        let resp = app
            .oneshot(request(Method::GET, "/", Some("ads.example.com")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    }

    #[test]
    fn test_https_location() {
        let uri: Uri = "/p?q=1".parse().unwrap();
        assert_eq!(
            https_location("h.example", &uri).as_deref(),
            Some("https://h.example/p?q=1")
        );
        assert_eq!(https_location("bad host", &uri), None);
    }
}
