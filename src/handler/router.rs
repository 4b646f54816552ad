//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: body buffering, route lookup,
//! method handling and dispatch to the per-route handlers.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_LENGTH, SERVER};
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, StatusCode, Uri};

use super::error::HandlerResult;
use super::{demo, download, echo, login, pages, static_files, upload};
use crate::config::AppState;
use crate::http::{self, form, HttpResponse};
use crate::logger;
use crate::routing::{Endpoint, PathParams, Resolution};

/// Everything a handler may read from the request, body already buffered
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub params: PathParams,
}

impl RequestContext {
    pub fn query(&self) -> HashMap<String, String> {
        form::parse_query(&self.uri)
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<HttpResponse, Infallible>
where
    B: hyper::body::Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut response = buffer_and_dispatch(req, &state).await;
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }
    Ok(response)
}

async fn buffer_and_dispatch<B>(req: Request<B>, state: &AppState) -> HttpResponse
where
    B: hyper::body::Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max_body_size = state.config.http.max_body_size;

    // 1. Reject declared oversize bodies before reading anything
    if let Some(resp) = check_body_size(req.headers(), max_body_size) {
        return resp;
    }

    // 2. Buffer the body, enforcing the same limit on what actually arrives
    let (parts, body) = req.into_parts();
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_error(&format!(
                "Request body too large (max: {max_body_size} bytes)"
            ));
            return http::build_413_response();
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return http::build_text_response(
                StatusCode::BAD_REQUEST,
                "400 Bad Request: unreadable body",
            );
        }
    };

    // 3. Route and run the handler
    dispatch(Request::from_parts(parts, body), state).await
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<HttpResponse> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Route a buffered request and produce its response
pub async fn dispatch(req: Request<Bytes>, state: &AppState) -> HttpResponse {
    let (parts, body) = req.into_parts();
    let is_head = parts.method == Method::HEAD;

    let response = match state.router.resolve(&parts.method, parts.uri.path()) {
        Resolution::Matched { route, params } => {
            if parts.method == Method::OPTIONS {
                return http::build_options_response(&route.allow_header());
            }
            let ctx = RequestContext {
                // HEAD is served by the GET handler; the body is dropped below
                method: if is_head { Method::GET } else { parts.method },
                uri: parts.uri,
                headers: parts.headers,
                body,
                params,
            };
            route_request(route.endpoint, &ctx, state)
                .await
                .unwrap_or_else(|e| e.into_response(state.config.http.debug))
        }
        Resolution::MethodNotAllowed { allowed } => {
            logger::log_warning(&format!(
                "Method not allowed: {} {}",
                parts.method,
                parts.uri.path()
            ));
            http::build_405_response(&allowed)
        }
        Resolution::NotFound => serve_fallback(&parts, state).await,
    };

    if is_head {
        http::into_head_response(response)
    } else {
        response
    }
}

/// Call the handler registered for `endpoint`
async fn route_request(endpoint: Endpoint, ctx: &RequestContext, state: &AppState) -> HandlerResult {
    match endpoint {
        Endpoint::Index => login::index(ctx, state),
        Endpoint::FileUpload => upload::file_upload(ctx).await,
        Endpoint::ConvertCsv => upload::convert_csv(ctx).await,
        Endpoint::ConvertCsvTwo => upload::convert_csv_two(ctx, state).await,
        Endpoint::Download => download::download(ctx, state).await,
        Endpoint::HandlePost => echo::handle_post(ctx, state).await,
        Endpoint::Index2 => pages::index2(state),
        Endpoint::RedirectEndpoint => pages::redirect_endpoint(state),
        Endpoint::Other => pages::other(state),
        Endpoint::Hello => Ok(demo::hello()),
        Endpoint::HelloMakeResponse => Ok(demo::hello_make_response()),
        Endpoint::HelloMethods => Ok(demo::hello_methods(&ctx.method)),
        Endpoint::Greet => demo::greet(ctx),
        Endpoint::Add => demo::add(ctx),
        Endpoint::HandleParams => Ok(demo::handle_params(ctx)),
    }
}

/// Unmatched paths: static files for GET/HEAD, otherwise 404
async fn serve_fallback(parts: &Parts, state: &AppState) -> HttpResponse {
    if parts.method != Method::GET && parts.method != Method::HEAD {
        return http::build_404_response();
    }
    let if_none_match = parts
        .headers
        .get(hyper::header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());
    static_files::serve(&state.static_dir, parts.uri.path(), if_none_match).await
}
