//! Small routes showing status, header, method, capture and query handling

use hyper::{Method, StatusCode};

use super::error::{HandlerError, HandlerResult};
use super::router::RequestContext;
use crate::http::{self, mime, HttpResponse};

/// A body with a deliberately unusual status
pub fn hello() -> HttpResponse {
    http::build_text_response(StatusCode::NOT_FOUND, "Hello World")
}

pub fn hello_make_response() -> HttpResponse {
    http::build_empty_response(StatusCode::ACCEPTED, mime::OCTET_STREAM)
}

pub fn hello_methods(method: &Method) -> HttpResponse {
    let body = match *method {
        Method::GET => "You made a GET request \n",
        Method::POST => "You made a POST request \n",
        // The route only admits GET and POST
        _ => "You will never see this message",
    };
    http::build_text_response(StatusCode::OK, body)
}

pub fn greet(ctx: &RequestContext) -> HandlerResult {
    let name = ctx.params.get("name").ok_or(HandlerError::NotFound)?;
    Ok(http::build_text_response(StatusCode::OK, format!("Hello {name}")))
}

pub fn add(ctx: &RequestContext) -> HandlerResult {
    let (Some(a), Some(b)) = (ctx.params.int("number1"), ctx.params.int("number2")) else {
        return Err(HandlerError::NotFound);
    };
    let sum = u128::from(a) + u128::from(b);
    Ok(http::build_text_response(
        StatusCode::OK,
        format!("{a} + {b} = {sum}"),
    ))
}

/// Missing parameters are reported in a normal 200 response
pub fn handle_params(ctx: &RequestContext) -> HttpResponse {
    let query = ctx.query();
    let body = match (query.get("greeting"), query.get("name")) {
        (Some(greeting), Some(name)) => format!("{greeting}, {name}"),
        _ => "Some parameters are missing".to_string(),
    };
    http::build_text_response(StatusCode::OK, body)
}
