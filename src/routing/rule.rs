//! Route rule parsing
//!
//! Rules are written with typed captures, e.g. `/add/<int:a>/<int:b>` or
//! `/greet/<name>` (the converter defaults to `string`). A rule is parsed once
//! into segments that serve both directions: the `matchit` pattern used for
//! lookup, and path building for reverse routing.

use std::fmt::Write as _;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use thiserror::Error;

/// Characters escaped when a value is placed into a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Capture type of a dynamic segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// Any non-empty segment without a slash
    String,
    /// ASCII digits only, fitting in a `u64`
    Int,
}

impl Converter {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "int" => Some(Self::Int),
            _ => None,
        }
    }

    /// Check a decoded capture against this converter
    pub fn accepts(self, value: &str) -> bool {
        match self {
            Self::String => !value.is_empty() && !value.contains('/'),
            Self::Int => {
                !value.is_empty()
                    && value.bytes().all(|b| b.is_ascii_digit())
                    && value.parse::<u64>().is_ok()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Capture { name: String, converter: Converter },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("unterminated capture in rule {0:?}")]
    Unterminated(String),
    #[error("unknown converter {0:?}")]
    UnknownConverter(String),
}

/// A parsed route rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    segments: Vec<Segment>,
}

impl Rule {
    pub fn parse(rule: &str) -> Result<Self, RuleError> {
        let mut segments = Vec::new();
        let mut rest = rule;

        while let Some(start) = rest.find('<') {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let end = rest[start..]
                .find('>')
                .ok_or_else(|| RuleError::Unterminated(rule.to_string()))?;
            let inner = &rest[start + 1..start + end];
            let (converter, name) = match inner.split_once(':') {
                Some((conv, name)) => (
                    Converter::parse(conv)
                        .ok_or_else(|| RuleError::UnknownConverter(conv.to_string()))?,
                    name,
                ),
                None => (Converter::String, inner),
            };
            segments.push(Segment::Capture {
                name: name.to_string(),
                converter,
            });
            rest = &rest[start + end + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// Pattern in `matchit` syntax, e.g. `/add/{a}/{b}`
    pub fn pattern(&self) -> String {
        self.segments
            .iter()
            .fold(String::new(), |mut out, segment| {
                match segment {
                    Segment::Literal(text) => out.push_str(text),
                    Segment::Capture { name, .. } => {
                        let _ = write!(out, "{{{name}}}");
                    }
                }
                out
            })
    }

    /// Decode raw `matchit` captures and check each against its converter.
    ///
    /// Returns `None` when any capture fails conversion, which makes the rule
    /// not match.
    pub fn convert<'k, 'v>(
        &self,
        raw: impl IntoIterator<Item = (&'k str, &'v str)>,
    ) -> Option<Vec<(String, String)>> {
        let mut params = Vec::new();
        for (key, value) in raw {
            let decoded = percent_decode_str(value).decode_utf8().ok()?;
            let converter = self.converter_of(key)?;
            if !converter.accepts(&decoded) {
                return None;
            }
            params.push((key.to_string(), decoded.into_owned()));
        }
        Some(params)
    }

    /// Build a path by substituting every capture.
    ///
    /// Returns `None` when a capture has no value or the value does not fit
    /// its converter. Extra values are ignored.
    pub fn build(&self, params: &[(&str, String)]) -> Option<String> {
        let mut path = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => path.push_str(text),
                Segment::Capture { name, converter } => {
                    let (_, value) = params.iter().find(|(key, _)| key == name)?;
                    if !converter.accepts(value) {
                        return None;
                    }
                    path.extend(utf8_percent_encode(value, SEGMENT));
                }
            }
        }
        Some(path)
    }

    fn converter_of(&self, key: &str) -> Option<Converter> {
        self.segments.iter().find_map(|segment| match segment {
            Segment::Capture { name, converter } if name == key => Some(*converter),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_static_rule() {
        let rule = Rule::parse("/hello_methods").unwrap();
        assert_eq!(rule.pattern(), "/hello_methods");
        assert_eq!(rule.build(&[]).as_deref(), Some("/hello_methods"));
    }

    #[test]
    fn test_parse_typed_captures() {
        let rule = Rule::parse("/add/<int:number1>/<int:number2>").unwrap();
        assert_eq!(rule.pattern(), "/add/{number1}/{number2}");

        let rule = Rule::parse("/greet/<name>").unwrap();
        assert_eq!(rule.pattern(), "/greet/{name}");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Rule::parse("/a/<name"),
            Err(RuleError::Unterminated(_))
        ));
        assert!(matches!(
            Rule::parse("/a/<uuid:id>"),
            Err(RuleError::UnknownConverter(_))
        ));
    }

    #[test]
    fn test_int_converter() {
        assert!(Converter::Int.accepts("0"));
        assert!(Converter::Int.accepts("42"));
        assert!(!Converter::Int.accepts("-1"));
        assert!(!Converter::Int.accepts("x"));
        assert!(!Converter::Int.accepts("1.5"));
        assert!(!Converter::Int.accepts("+1"));
        assert!(!Converter::Int.accepts(""));
        assert!(!Converter::Int.accepts("99999999999999999999999"));
    }

    #[test]
    fn test_convert_decodes_and_checks() {
        let rule = Rule::parse("/greet/<name>").unwrap();
        assert_eq!(
            rule.convert([("name", "Wade%20Wilson")]),
            Some(vec![("name".to_string(), "Wade Wilson".to_string())])
        );
        // An encoded slash does not sneak into a string segment
        assert_eq!(rule.convert([("name", "a%2Fb")]), None);

        let rule = Rule::parse("/add/<int:a>/<int:b>").unwrap();
        assert!(rule.convert([("a", "1"), ("b", "2")]).is_some());
        assert_eq!(rule.convert([("a", "x"), ("b", "2")]), None);
    }

    #[test]
    fn test_build_encodes_values() {
        let rule = Rule::parse("/download/<filename>").unwrap();
        assert_eq!(
            rule.build(&[("filename", "a b.csv".to_string())]).as_deref(),
            Some("/download/a%20b.csv")
        );
        assert_eq!(
            rule.build(&[("filename", "x&y'z.csv".to_string())]).as_deref(),
            Some("/download/x%26y%27z.csv")
        );
        assert_eq!(rule.build(&[]), None);

        let rule = Rule::parse("/add/<int:a>/<int:b>").unwrap();
        assert_eq!(rule.build(&[("a", "1".to_string()), ("b", "x".to_string())]), None);
    }
}
