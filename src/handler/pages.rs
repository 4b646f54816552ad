//! Template-rendered pages and the redirect demo

use serde::Serialize;

use super::error::{HandlerError, HandlerResult};
use crate::config::AppState;
use crate::http;
use crate::routing::Endpoint;

#[derive(Serialize)]
struct Index2Page {
    myvalue: &'static str,
    myresult: u32,
    mylist: [u32; 5],
}

#[derive(Serialize)]
struct OtherPage {
    some_text: &'static str,
}

pub fn index2(state: &AppState) -> HandlerResult {
    let page = Index2Page {
        myvalue: "Deadpool",
        myresult: 10 + 30,
        mylist: [10, 20, 30, 40, 50],
    };
    Ok(http::build_html_response(
        state.templates.render("index2.html", page)?,
    ))
}

pub fn other(state: &AppState) -> HandlerResult {
    let page = OtherPage {
        some_text: "Other World",
    };
    Ok(http::build_html_response(
        state.templates.render("other.html", page)?,
    ))
}

/// 302 to wherever the `other` page is routed
pub fn redirect_endpoint(state: &AppState) -> HandlerResult {
    let target = state
        .router
        .url_for(Endpoint::Other.name(), &[])
        .ok_or_else(|| HandlerError::Internal("no route for `other`".to_string()))?;
    Ok(http::build_redirect_response(&target))
}
