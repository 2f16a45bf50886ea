//! Route pattern parsing and matching.
//!
//! A route is written with `<type:name>` placeholders, e.g. `<int:id>/change`.
//! [`RoutePattern`] compiles it to an anchored regex for matching, renders the
//! equivalent axum path (`{id}/change`), and substitutes arguments back into
//! the route for reverse resolution.

use std::collections::HashMap;
use std::fmt::Write as _;

use regex::Regex;

use thanos_core::{ThanosError, ThanosResult};

/// A typed path placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// `<int:name>`: one or more ASCII digits.
    Int,
    /// `<str:name>`: any non-empty segment without `/`.
    Str,
}

impl Converter {
    /// Looks up a converter by its type name.
    pub fn from_name(name: &str) -> ThanosResult<Self> {
        match name {
            "int" => Ok(Self::Int),
            "str" => Ok(Self::Str),
            other => Err(ThanosError::ImproperlyConfigured(format!(
                "Unknown path converter '{other}'"
            ))),
        }
    }

    /// The regex fragment matched by this converter.
    pub const fn regex(self) -> &'static str {
        match self {
            Self::Int => "[0-9]+",
            Self::Str => "[^/]+",
        }
    }

    /// Returns `true` if `raw` is a value this converter accepts.
    pub fn accepts(self, raw: &str) -> bool {
        match self {
            Self::Int => !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()),
            Self::Str => !raw.is_empty() && !raw.contains('/'),
        }
    }
}

/// One segment of a parsed route.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String, Converter),
}

/// A compiled route pattern.
///
/// # Examples
///
/// ```
/// use thanos_http::urls::pattern::RoutePattern;
///
/// let pattern = RoutePattern::parse("<int:id>/change").unwrap();
/// assert_eq!(pattern.to_axum_path(), "{id}/change");
/// assert_eq!(pattern.full_match("7/change").unwrap()["id"], "7");
/// assert!(pattern.full_match("abc/change").is_none());
/// assert_eq!(pattern.substitute(&["7"]).unwrap(), "7/change");
/// ```
#[derive(Debug, Clone)]
pub struct RoutePattern {
    route: String,
    regex: Regex,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parses a route string.
    ///
    /// # Errors
    ///
    /// Returns [`ThanosError::ImproperlyConfigured`] for unclosed placeholders
    /// or unknown converter types.
    pub fn parse(route: &str) -> ThanosResult<Self> {
        let mut segments = Vec::new();
        let mut regex_str = String::from("^");
        let mut remaining = route;

        while !remaining.is_empty() {
            let Some(start) = remaining.find('<') else {
                regex_str.push_str(&regex::escape(remaining));
                segments.push(Segment::Literal(remaining.to_string()));
                break;
            };

            let prefix = &remaining[..start];
            if !prefix.is_empty() {
                regex_str.push_str(&regex::escape(prefix));
                segments.push(Segment::Literal(prefix.to_string()));
            }

            let end = remaining[start..].find('>').ok_or_else(|| {
                ThanosError::ImproperlyConfigured(format!(
                    "Unclosed angle bracket in route: {route}"
                ))
            })? + start;

            let inner = &remaining[start + 1..end];
            let (type_name, param_name) = inner.split_once(':').unwrap_or(("str", inner));
            if param_name.is_empty() {
                return Err(ThanosError::ImproperlyConfigured(format!(
                    "Empty parameter name in route: {route}"
                )));
            }
            let converter = Converter::from_name(type_name)?;

            write!(regex_str, "(?P<{param_name}>{})", converter.regex()).ok();
            segments.push(Segment::Param(param_name.to_string(), converter));

            remaining = &remaining[end + 1..];
        }

        regex_str.push('$');
        let regex = Regex::new(&regex_str).map_err(|e| {
            ThanosError::ImproperlyConfigured(format!("Invalid route '{route}': {e}"))
        })?;

        Ok(Self {
            route: route.to_string(),
            regex,
            segments,
        })
    }

    /// Returns the original route string.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Returns the placeholder names in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name, _) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Returns a new pattern with `prefix` prepended to the route.
    ///
    /// # Errors
    ///
    /// Returns an error if the combined route does not parse.
    pub fn with_prefix(&self, prefix: &str) -> ThanosResult<Self> {
        Self::parse(&format!("{prefix}{}", self.route))
    }

    /// Matches the whole of `path`, returning captured arguments by name.
    pub fn full_match(&self, path: &str) -> Option<HashMap<String, String>> {
        let captures = self.regex.captures(path)?;
        Some(
            self.param_names()
                .filter_map(|name| {
                    captures
                        .name(name)
                        .map(|m| (name.to_string(), m.as_str().to_string()))
                })
                .collect(),
        )
    }

    /// Checks router-captured arguments against this pattern's converters.
    ///
    /// Every placeholder must be present and accepted by its converter.
    pub fn accepts_args(&self, args: &HashMap<String, String>) -> bool {
        self.segments.iter().all(|segment| match segment {
            Segment::Param(name, converter) => {
                args.get(name).is_some_and(|raw| converter.accepts(raw))
            }
            Segment::Literal(_) => true,
        })
    }

    /// Renders the route in axum's path syntax (`{name}` placeholders).
    pub fn to_axum_path(&self) -> String {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.clone(),
                Segment::Param(name, _) => format!("{{{name}}}"),
            })
            .collect()
    }

    /// Substitutes positional arguments into the placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`ThanosError::NoReverseMatch`] if the argument count differs
    /// from the number of placeholders or an argument is rejected by its
    /// converter.
    pub fn substitute(&self, args: &[&str]) -> ThanosResult<String> {
        let expected = self.param_names().count();
        if args.len() != expected {
            return Err(ThanosError::NoReverseMatch(format!(
                "{} (expected {expected} arguments, got {})",
                self.route,
                args.len()
            )));
        }

        let mut args = args.iter();
        let mut url = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Param(name, converter) => {
                    let value = args.next().copied().unwrap_or_default();
                    if !converter.accepts(value) {
                        return Err(ThanosError::NoReverseMatch(format!(
                            "{} (invalid value '{value}' for '{name}')",
                            self.route
                        )));
                    }
                    url.push_str(value);
                }
            }
        }
        Ok(url)
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.route == other.route
    }
}

impl Eq for RoutePattern {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_route() {
        let pattern = RoutePattern::parse("add/").unwrap();
        assert!(pattern.full_match("add/").unwrap().is_empty());
        assert!(pattern.full_match("add").is_none());
        assert!(pattern.full_match("add/x").is_none());
        assert_eq!(pattern.to_axum_path(), "add/");
    }

    #[test]
    fn test_empty_route() {
        let pattern = RoutePattern::parse("").unwrap();
        assert!(pattern.full_match("").is_some());
        assert!(pattern.full_match("x").is_none());
        assert_eq!(pattern.substitute(&[]).unwrap(), "");
    }

    #[test]
    fn test_int_converter() {
        let pattern = RoutePattern::parse("<int:id>/delete").unwrap();
        let args = pattern.full_match("42/delete").unwrap();
        assert_eq!(args.get("id").map(String::as_str), Some("42"));
        assert!(pattern.full_match("x42/delete").is_none());
        assert!(pattern.full_match("/delete").is_none());
        assert_eq!(pattern.param_names().collect::<Vec<_>>(), vec!["id"]);
    }

    #[test]
    fn test_str_converter_and_default() {
        let pattern = RoutePattern::parse("<slug>/<str:tab>/").unwrap();
        let args = pattern.full_match("acme/orders/").unwrap();
        assert_eq!(args["slug"], "acme");
        assert_eq!(args["tab"], "orders");
        assert_eq!(pattern.to_axum_path(), "{slug}/{tab}/");
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            RoutePattern::parse("<int:id/change"),
            Err(ThanosError::ImproperlyConfigured(_))
        ));
        assert!(matches!(
            RoutePattern::parse("<uuid:id>/"),
            Err(ThanosError::ImproperlyConfigured(_))
        ));
        assert!(RoutePattern::parse("<int:>/").is_err());
    }

    #[test]
    fn test_with_prefix() {
        let pattern = RoutePattern::parse("<int:id>/change")
            .unwrap()
            .with_prefix("crm/customer/")
            .unwrap();
        assert_eq!(pattern.route(), "crm/customer/<int:id>/change");
        assert!(pattern.full_match("crm/customer/3/change").is_some());
    }

    #[test]
    fn test_accepts_args() {
        let pattern = RoutePattern::parse("<int:id>/change").unwrap();
        let mut args = HashMap::new();
        assert!(!pattern.accepts_args(&args));
        args.insert("id".to_string(), "abc".to_string());
        assert!(!pattern.accepts_args(&args));
        args.insert("id".to_string(), "12".to_string());
        assert!(pattern.accepts_args(&args));
    }

    #[test]
    fn test_substitute_errors() {
        let pattern = RoutePattern::parse("<int:id>/change").unwrap();
        assert_eq!(pattern.substitute(&["5"]).unwrap(), "5/change");
        assert!(matches!(
            pattern.substitute(&[]),
            Err(ThanosError::NoReverseMatch(_))
        ));
        assert!(matches!(
            pattern.substitute(&["five"]),
            Err(ThanosError::NoReverseMatch(_))
        ));
    }
}
