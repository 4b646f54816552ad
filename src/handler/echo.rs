//! JSON echo into the shared note file

use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{HandlerError, HandlerResult};
use super::router::RequestContext;
use crate::config::AppState;
use crate::http;

/// Both fields must be present; any JSON value is accepted
#[derive(Debug, Deserialize)]
struct EchoRequest {
    greeting: Value,
    name: Value,
}

#[derive(Serialize)]
struct EchoResponse {
    message: &'static str,
}

/// Overwrite the echo file with `<greeting>,<name>`.
///
/// Unlike the query-string demo, a missing field is a client error.
pub async fn handle_post(ctx: &RequestContext, state: &AppState) -> HandlerResult {
    let request: EchoRequest = serde_json::from_slice(&ctx.body)
        .map_err(|e| HandlerError::bad_request(format!("invalid JSON body ({e})")))?;

    state
        .storage
        .write_echo(&echo_text(&request.greeting), &echo_text(&request.name))
        .await?;

    Ok(http::build_json_response(
        StatusCode::OK,
        &EchoResponse {
            message: "Successfully written!",
        },
    ))
}

/// Strings are written raw; `null` and booleans use their Python spelling and
/// everything else its JSON text
fn echo_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}
