//! Page templates
//!
//! A `minijinja` environment holding every page template compiled into the
//! binary, the text filters, and a `url_for(endpoint, **params)` global
//! backed by the route table.

pub mod filters;

use std::sync::Arc;

use minijinja::value::{Kwargs, Value};
use minijinja::{Environment, Error, ErrorKind};
use serde::Serialize;

use crate::routing::Router;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("index2.html", include_str!("../../templates/index2.html")),
    ("other.html", include_str!("../../templates/other.html")),
    ("download.html", include_str!("../../templates/download.html")),
];

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new(router: Arc<Router>) -> Result<Self, Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }

        env.add_filter("reverse_string", filters::reverse_string);
        env.add_filter("repeat", filters::repeat_filter);
        env.add_filter("alternate_case", filters::alternate_case);

        env.add_function("url_for", move |endpoint: String, kwargs: Kwargs| {
            url_for(&router, &endpoint, &kwargs)
        });

        Ok(Self { env })
    }

    /// Render the named template with a view model
    pub fn render<S: Serialize>(&self, name: &str, view: S) -> Result<String, Error> {
        self.env.get_template(name)?.render(view)
    }
}

/// Built paths are percent-encoded, so they go into markup unescaped
fn url_for(router: &Router, endpoint: &str, kwargs: &Kwargs) -> Result<Value, Error> {
    let mut params = Vec::new();
    for key in kwargs.args() {
        let value: Value = kwargs.get(key)?;
        params.push((key, value.to_string()));
    }

    router
        .url_for(endpoint, &params)
        .map(Value::from_safe_string)
        .ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("could not build url for endpoint {endpoint:?}"),
            )
        })
}
