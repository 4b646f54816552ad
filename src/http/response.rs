//! HTTP response building module
//!
//! Builders for every response shape the handlers produce. Builders never
//! panic: a failed build is logged and replaced by a bare response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, ALLOW, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, ETAG,
    LOCATION,
};
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::mime;

pub type HttpResponse = Response<Full<Bytes>>;

/// Build plain text response with the given status
pub fn build_text_response(status: StatusCode, body: impl Into<Bytes>) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, mime::TEXT_PLAIN_UTF8)
        .body(Full::new(body.into()))
        .unwrap_or_else(|e| fallback(status.as_str(), &e))
}

/// Build 200 HTML response
pub fn build_html_response(content: String) -> HttpResponse {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, mime::TEXT_HTML_UTF8)
        .body(Full::new(Bytes::from(content)))
        .unwrap_or_else(|e| fallback("HTML", &e))
}

/// Build JSON response
pub fn build_json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    match serde_json::to_vec(body) {
        Ok(json) => Response::builder()
            .status(status)
            .header(CONTENT_TYPE, mime::APPLICATION_JSON)
            .body(Full::new(Bytes::from(json)))
            .unwrap_or_else(|e| fallback("JSON", &e)),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            build_text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

/// Build a response the client should save as `filename` instead of rendering
pub fn build_attachment_response(
    data: impl Into<Bytes>,
    content_type: &str,
    filename: &str,
) -> HttpResponse {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_DISPOSITION, format!("attachment; filename={filename}"))
        .header(CACHE_CONTROL, "no-cache")
        .body(Full::new(data.into()))
        .unwrap_or_else(|e| fallback("attachment", &e))
}

/// Build an empty-bodied response with an explicit content type
pub fn build_empty_response(status: StatusCode, content_type: &str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback(status.as_str(), &e))
}

/// Build 302 redirect response
pub fn build_redirect_response(target: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::FOUND)
        .header(LOCATION, target)
        .header(CONTENT_TYPE, mime::TEXT_HTML_UTF8)
        .body(Full::new(Bytes::from(format!(
            "<!doctype html>\n<title>Redirecting...</title>\n<h1>Redirecting...</h1>\n\
             <p>You should be redirected automatically to the target URL: \
             <a href=\"{target}\">{target}</a>. If not, click the link.\n"
        ))))
        .unwrap_or_else(|e| fallback("302", &e))
}

/// Build 200 response for a static file with an `ETag`
pub fn build_cached_response(data: Bytes, content_type: &str, etag: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(ETAG, etag)
        .header(CACHE_CONTROL, "public, max-age=3600")
        .body(Full::new(data))
        .unwrap_or_else(|e| fallback("200", &e))
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, etag)
        .header(CACHE_CONTROL, "public, max-age=3600")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback("304", &e))
}

/// Build 404 Not Found response
pub fn build_404_response() -> HttpResponse {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response listing the accepted methods
pub fn build_405_response(allow: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, mime::TEXT_PLAIN_UTF8)
        .header(ALLOW, allow)
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| fallback("405", &e))
}

/// Build OPTIONS response
pub fn build_options_response(allow: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, allow)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback("OPTIONS", &e))
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> HttpResponse {
    build_text_response(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large")
}

/// Turn a GET response into its HEAD counterpart: same headers, no body
pub fn into_head_response(response: HttpResponse) -> HttpResponse {
    let (mut parts, body) = response.into_parts();
    let length = hyper::body::Body::size_hint(&body).exact().unwrap_or(0);
    parts
        .headers
        .insert(CONTENT_LENGTH, HeaderValue::from(length));
    Response::from_parts(parts, Full::new(Bytes::new()))
}

fn fallback(status: &str, error: &hyper::http::Error) -> HttpResponse {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
