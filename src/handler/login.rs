//! Form login on the home page

use hyper::{Method, StatusCode};
use serde::Serialize;

use super::error::HandlerResult;
use super::router::RequestContext;
use crate::config::AppState;
use crate::http::{self, form};

const USERNAME: &str = "deadpool";
const PASSWORD: &str = "password";

#[derive(Serialize)]
struct IndexPage {}

/// GET renders the login form; POST checks the submitted credentials
pub fn index(ctx: &RequestContext, state: &AppState) -> HandlerResult {
    if ctx.method != Method::POST {
        let html = state.templates.render("index.html", IndexPage {})?;
        return Ok(http::build_html_response(html));
    }

    let fields = form::parse_urlencoded(&ctx.body);
    let body = if check_credentials(
        fields.get("username").map(String::as_str),
        fields.get("password").map(String::as_str),
    ) {
        "Success"
    } else {
        "Failure"
    };
    Ok(http::build_text_response(StatusCode::OK, body))
}

/// Missing fields never match
fn check_credentials(username: Option<&str>, password: Option<&str>) -> bool {
    username == Some(USERNAME) && password == Some(PASSWORD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::dispatch;
    use crate::handler::router::tests::{body_text, request, request_with_body, test_state};

    const FORM: &str = "application/x-www-form-urlencoded";

    #[test]
    fn test_check_credentials() {
        assert!(check_credentials(Some("deadpool"), Some("password")));
        assert!(!check_credentials(Some("deadpool"), Some("wrong")));
        assert!(!check_credentials(Some("Deadpool"), Some("password")));
        assert!(!check_credentials(None, Some("password")));
        assert!(!check_credentials(None, None));
    }

    #[tokio::test]
    async fn test_get_renders_form() {
        let (_dir, state) = test_state();
        let response = dispatch(request(Method::GET, "/"), &state).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("name=\"username\""));
        assert!(html.contains("action=\"/\""));
    }

    #[tokio::test]
    async fn test_post_login() {
        let (_dir, state) = test_state();
        let cases = [
            ("username=deadpool&password=password", "Success"),
            ("username=deadpool&password=nope", "Failure"),
            ("username=deadpool", "Failure"),
            ("", "Failure"),
        ];
        for (form_body, expected) in cases {
            let req = request_with_body(Method::POST, "/", FORM, form_body.to_string());
            let response = dispatch(req, &state).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_text(response).await, expected, "{form_body:?}");
        }
    }
}
