//! Routing module
//!
//! The fixed route table. Every route has a logical name (its `Endpoint`), a
//! rule with typed captures, and the methods it accepts. Lookup goes through a
//! `matchit` radix tree; reverse routing rebuilds paths from the same rules.

mod rule;

pub use rule::{Converter, Rule, RuleError};

use hyper::Method;
use thiserror::Error;

/// Logical route names, shared by dispatch and reverse routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Index,
    FileUpload,
    ConvertCsv,
    ConvertCsvTwo,
    Download,
    HandlePost,
    Index2,
    RedirectEndpoint,
    Other,
    Hello,
    HelloMakeResponse,
    HelloMethods,
    Greet,
    Add,
    HandleParams,
}

impl Endpoint {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::FileUpload => "file_upload",
            Self::ConvertCsv => "convert_csv",
            Self::ConvertCsvTwo => "convert_csv_two",
            Self::Download => "download",
            Self::HandlePost => "handle_post",
            Self::Index2 => "index2",
            Self::RedirectEndpoint => "redirect_endpoint",
            Self::Other => "other",
            Self::Hello => "hello",
            Self::HelloMakeResponse => "hello_make_response",
            Self::HelloMethods => "hello_methods",
            Self::Greet => "greet",
            Self::Add => "add",
            Self::HandleParams => "handle_params",
        }
    }
}

/// `(endpoint, rule, methods)` for every route the server exposes
fn route_table() -> Vec<(Endpoint, &'static str, Vec<Method>)> {
    use Endpoint as E;
    vec![
        (E::Index, "/", vec![Method::GET, Method::POST]),
        (E::FileUpload, "/file_upload", vec![Method::POST]),
        (E::ConvertCsv, "/convert_csv", vec![Method::POST]),
        (E::ConvertCsvTwo, "/convert_csv_two", vec![Method::POST]),
        (E::Download, "/download/<filename>", vec![Method::GET]),
        (E::HandlePost, "/handle_post", vec![Method::POST]),
        (E::Index2, "/index2", vec![Method::GET]),
        (E::RedirectEndpoint, "/redirect_endpoint", vec![Method::GET]),
        (E::Other, "/other", vec![Method::GET]),
        (E::Hello, "/hello", vec![Method::GET]),
        (E::HelloMakeResponse, "/hello_make_response", vec![Method::GET]),
        (E::HelloMethods, "/hello_methods", vec![Method::GET, Method::POST]),
        (E::Greet, "/greet/<name>", vec![Method::GET]),
        (E::Add, "/add/<int:number1>/<int:number2>", vec![Method::GET]),
        (E::HandleParams, "/handle_url_params", vec![Method::GET]),
    ]
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("invalid route rule: {0}")]
    Rule(#[from] RuleError),
    #[error("conflicting route: {0}")]
    Insert(#[from] matchit::InsertError),
}

/// One entry of the route table
#[derive(Debug)]
pub struct Route {
    pub endpoint: Endpoint,
    rule: Rule,
    methods: Vec<Method>,
}

impl Route {
    /// Whether `method` reaches this route's handler. HEAD rides on GET and
    /// OPTIONS is answered for every route.
    pub fn accepts(&self, method: &Method) -> bool {
        self.methods.contains(method)
            || (*method == Method::HEAD && self.methods.contains(&Method::GET))
            || *method == Method::OPTIONS
    }

    /// Value for the `Allow` header
    pub fn allow_header(&self) -> String {
        let mut allowed: Vec<&str> = self.methods.iter().map(Method::as_str).collect();
        if self.methods.contains(&Method::GET) {
            allowed.push(Method::HEAD.as_str());
        }
        allowed.push(Method::OPTIONS.as_str());
        allowed.sort_unstable();
        allowed.dedup();
        allowed.join(", ")
    }
}

/// Decoded, converter-checked path captures
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// An `int` capture; already validated at match time
    pub fn int(&self, name: &str) -> Option<u64> {
        self.get(name)?.parse().ok()
    }
}

/// Outcome of looking up a request
#[derive(Debug)]
pub enum Resolution<'r> {
    Matched {
        route: &'r Route,
        params: PathParams,
    },
    MethodNotAllowed {
        allowed: String,
    },
    NotFound,
}

pub struct Router {
    tree: matchit::Router<usize>,
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Result<Self, RouterError> {
        let mut tree = matchit::Router::new();
        let mut routes = Vec::new();

        for (endpoint, rule, methods) in route_table() {
            let rule = Rule::parse(rule)?;
            tree.insert(rule.pattern(), routes.len())?;
            routes.push(Route {
                endpoint,
                rule,
                methods,
            });
        }

        Ok(Self { tree, routes })
    }

    /// Find the route for `(method, path)`
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        let Ok(matched) = self.tree.at(path) else {
            return Resolution::NotFound;
        };
        let Some(route) = self.routes.get(*matched.value) else {
            return Resolution::NotFound;
        };
        let Some(params) = route.rule.convert(matched.params.iter()) else {
            return Resolution::NotFound;
        };

        if route.accepts(method) {
            Resolution::Matched {
                route,
                params: PathParams(params),
            }
        } else {
            Resolution::MethodNotAllowed {
                allowed: route.allow_header(),
            }
        }
    }

    /// Build the path of the route named `name`, filling its captures from
    /// `params`
    pub fn url_for(&self, name: &str, params: &[(&str, String)]) -> Option<String> {
        self.routes
            .iter()
            .find(|route| route.endpoint.name() == name)?
            .rule
            .build(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        Router::new().unwrap()
    }

    fn endpoint_of(resolution: &Resolution<'_>) -> Option<Endpoint> {
        match resolution {
            Resolution::Matched { route, .. } => Some(route.endpoint),
            _ => None,
        }
    }

    #[test]
    fn test_every_route_resolves() {
        let router = router();
        for (endpoint, rule, methods) in route_table() {
            let path = rule
                .replace("<int:number1>", "1")
                .replace("<int:number2>", "2")
                .replace("<filename>", "a.csv")
                .replace("<name>", "Wade");
            for method in &methods {
                assert_eq!(
                    endpoint_of(&router.resolve(method, &path)),
                    Some(endpoint),
                    "{method} {path}"
                );
            }
        }
    }

    #[test]
    fn test_unknown_path() {
        assert!(matches!(
            router().resolve(&Method::GET, "/nowhere"),
            Resolution::NotFound
        ));
    }

    #[test]
    fn test_wrong_method() {
        match router().resolve(&Method::POST, "/hello") {
            Resolution::MethodNotAllowed { allowed } => assert_eq!(allowed, "GET, HEAD, OPTIONS"),
            other => panic!("unexpected {other:?}"),
        }
        match router().resolve(&Method::DELETE, "/") {
            Resolution::MethodNotAllowed { allowed } => {
                assert_eq!(allowed, "GET, HEAD, OPTIONS, POST");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_head_and_options_accepted() {
        let router = router();
        assert!(endpoint_of(&router.resolve(&Method::HEAD, "/hello")).is_some());
        assert!(endpoint_of(&router.resolve(&Method::OPTIONS, "/file_upload")).is_some());
        // HEAD does not ride on a POST-only route
        assert!(matches!(
            router.resolve(&Method::HEAD, "/file_upload"),
            Resolution::MethodNotAllowed { .. }
        ));
    }

    #[test]
    fn test_int_captures() {
        let router = router();
        match router.resolve(&Method::GET, "/add/5/7") {
            Resolution::Matched { params, .. } => {
                assert_eq!(params.int("number1"), Some(5));
                assert_eq!(params.int("number2"), Some(7));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            router.resolve(&Method::GET, "/add/x/1"),
            Resolution::NotFound
        ));
        assert!(matches!(
            router.resolve(&Method::GET, "/add/-1/1"),
            Resolution::NotFound
        ));
    }

    #[test]
    fn test_string_capture_is_decoded() {
        match router().resolve(&Method::GET, "/greet/Wade%20Wilson") {
            Resolution::Matched { params, .. } => assert_eq!(params.get("name"), Some("Wade Wilson")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_url_for() {
        let router = router();
        assert_eq!(router.url_for("other", &[]).as_deref(), Some("/other"));
        assert_eq!(router.url_for("index", &[]).as_deref(), Some("/"));
        assert_eq!(
            router
                .url_for("download", &[("filename", "abc.csv".to_string())])
                .as_deref(),
            Some("/download/abc.csv")
        );
        assert_eq!(
            router
                .url_for("add", &[("number1", "1".to_string()), ("number2", "2".to_string())])
                .as_deref(),
            Some("/add/1/2")
        );
        assert_eq!(router.url_for("download", &[]), None);
        assert_eq!(router.url_for("nowhere", &[]), None);
    }
}
