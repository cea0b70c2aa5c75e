//! Route resolution: identifier + params → concrete path
//!
//! The URL builder only needs [`RouteResolver`]. [`RouteTable`] is a small
//! in-memory implementation fed from config or registered in code.

use std::collections::BTreeMap;

use signet_core::config::RouteConfig;
use url::form_urlencoded;

use crate::error::UrlError;

/// Parameters substituted into a route pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RouteParams {
    #[default]
    None,
    /// Filled into placeholders left to right
    Positional(Vec<String>),
    /// Looked up by placeholder name; the wildcard is keyed `*`
    Named(BTreeMap<String, String>),
}

impl RouteParams {
    pub fn positional<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self::Positional(values.into_iter().map(|v| v.to_string()).collect())
    }

    pub fn named<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        Self::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_string()))
                .collect(),
        )
    }
}

/// A route after parameter substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub path: String,
    pub domain: Option<String>,
}

/// Turns a route identifier (pattern, name or handler) into a path.
pub trait RouteResolver {
    fn resolve(&self, identifier: &str, params: &RouteParams) -> Result<ResolvedRoute, UrlError>;
}

/// A registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub pattern: String,
    pub name: Option<String>,
    pub handler: Option<String>,
    pub domain: Option<String>,
}

impl RouteDefinition {
    pub fn new(pattern: impl AsRef<str>) -> Self {
        Self {
            pattern: normalize_pattern(pattern.as_ref()),
            name: None,
            handler: None,
            domain: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    fn matches(&self, identifier: &str) -> bool {
        self.pattern == normalize_pattern(identifier)
            || self.name.as_deref() == Some(identifier)
            || self.handler.as_deref() == Some(identifier)
    }
}

impl From<&RouteConfig> for RouteDefinition {
    fn from(config: &RouteConfig) -> Self {
        Self {
            pattern: normalize_pattern(&config.pattern),
            name: config.name.clone(),
            handler: config.handler.clone(),
            domain: config.domain.clone(),
        }
    }
}

/// In-memory route table. The first route matching an identifier wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(routes: &[RouteConfig]) -> Self {
        Self {
            routes: routes.iter().map(RouteDefinition::from).collect(),
        }
    }

    pub fn add(&mut self, route: RouteDefinition) -> &mut Self {
        self.routes.push(route);
        self
    }

    pub fn find(&self, identifier: &str) -> Option<&RouteDefinition> {
        self.routes.iter().find(|r| r.matches(identifier))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteResolver for RouteTable {
    fn resolve(&self, identifier: &str, params: &RouteParams) -> Result<ResolvedRoute, UrlError> {
        let route = self
            .find(identifier)
            .ok_or_else(|| UrlError::RouteNotFound(identifier.to_string()))?;

        Ok(ResolvedRoute {
            path: process_pattern(&route.pattern, params)?,
            domain: route.domain.clone(),
        })
    }
}

/// Substitute `params` into `pattern`.
///
/// Supports `:name` placeholders, optional `:name?` placeholders (dropped
/// when no value is given) and a trailing `*` wildcard (which swallows the
/// remaining positional values, or the named `*` value).
///
/// Substituted values are percent-encoded, so `?`, `#` or spaces in a value
/// stay inside their path segment. Wildcard values keep their `/` separators.
pub fn process_pattern(pattern: &str, params: &RouteParams) -> Result<String, UrlError> {
    let mut position = 0;
    let mut segments: Vec<String> = Vec::new();

    for segment in pattern.split('/').filter(|s| !s.is_empty()) {
        if segment == "*" {
            let wildcard = match params {
                RouteParams::Positional(values) => {
                    let rest = values.get(position..).unwrap_or_default();
                    position = values.len();
                    rest.iter()
                        .map(|v| encode_wildcard(v))
                        .collect::<Vec<_>>()
                        .join("/")
                }
                RouteParams::Named(map) => map
                    .get("*")
                    .map(|v| encode_wildcard(v))
                    .unwrap_or_default(),
                RouteParams::None => String::new(),
            };
            if wildcard.is_empty() {
                return Err(missing_param("*", pattern));
            }
            segments.push(wildcard);
            continue;
        }

        let Some(placeholder) = segment.strip_prefix(':') else {
            segments.push(segment.to_string());
            continue;
        };

        let (name, optional) = match placeholder.strip_suffix('?') {
            Some(name) => (name, true),
            None => (placeholder, false),
        };

        let value = match params {
            RouteParams::Positional(values) => {
                let value = values.get(position).cloned();
                position += 1;
                value
            }
            RouteParams::Named(map) => map.get(name).cloned(),
            RouteParams::None => None,
        }
        .filter(|v| !v.is_empty());

        match (value, optional) {
            (Some(value), _) => segments.push(encode_segment(&value)),
            (None, true) => {}
            (None, false) => return Err(missing_param(name, pattern)),
        }
    }

    Ok(format!("/{}", segments.join("/")))
}

/// Percent-encode one path segment. Spaces become `%20`, not `+`.
fn encode_segment(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .map(|chunk| if chunk == "+" { "%20" } else { chunk })
        .collect()
}

fn encode_wildcard(value: &str) -> String {
    value
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

fn missing_param(param: &str, pattern: &str) -> UrlError {
    UrlError::MissingParam {
        param: param.to_string(),
        pattern: pattern.to_string(),
    }
}

/// Leading slash, no trailing slash (except for the root).
fn normalize_pattern(pattern: &str) -> String {
    let trimmed = pattern.trim().trim_matches('/');
    format!("/{trimmed}")
}
