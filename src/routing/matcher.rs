//! URL template compilation, matching and rendering.
//!
//! # Responsibilities
//! - Parse a route's url segment (`/foo/:fooId?tab&sort`) into tokens
//! - Concatenate segments along the ancestor chain into a full template
//! - Match a concrete path against a template, binding params positionally
//! - Render params back into a path plus query string
//!
//! # Design Decisions
//! - Path params occupy a whole `/`-delimited segment; their values are
//!   percent-encoded on render and decoded on match
//! - Token counts must match exactly; a longer template never matches a
//!   shorter path and vice versa
//! - Only declared query names are lifted out of the query string
//! - No regex; matching is a single pass over the segments

use std::fmt;

use std::borrow::Cow;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value;
use url::form_urlencoded;

use crate::routing::error::RouterError;
use crate::routing::params::Params;

/// Bytes escaped inside a path segment value.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn decode_segment(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment).decode_utf8_lossy()
}

/// One `/`-delimited piece of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Must equal the path segment exactly.
    Literal(String),
    /// Binds the path segment to the named param.
    Param(String),
}

/// A compiled url template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlTemplate {
    tokens: Vec<Token>,
    query: Vec<String>,
}

impl UrlTemplate {
    /// Parse a single url segment as written in a route definition.
    pub fn parse(template: &str) -> Result<Self, RouterError> {
        let (path, query) = match template.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (template, None),
        };

        let mut tokens = Vec::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            match segment.strip_prefix(':') {
                Some("") => {
                    return Err(RouterError::InvalidTemplate {
                        template: template.to_string(),
                        reason: "path param without a name".to_string(),
                    })
                }
                Some(name) => tokens.push(Token::Param(name.to_string())),
                None => tokens.push(Token::Literal(segment.to_string())),
            }
        }

        let mut declared: Vec<String> = Vec::new();
        for name in query.into_iter().flat_map(|q| q.split('&')) {
            let name = name.trim().trim_start_matches(':');
            if name.is_empty() {
                continue;
            }
            if !declared.iter().any(|d| d == name) {
                declared.push(name.to_string());
            }
        }

        Ok(Self {
            tokens,
            query: declared,
        })
    }

    /// `self` followed by `child`, as a child route's full template.
    pub fn join(&self, child: &UrlTemplate) -> UrlTemplate {
        let mut joined = self.clone();
        joined.tokens.extend(child.tokens.iter().cloned());
        for name in &child.query {
            if !joined.query.contains(name) {
                joined.query.push(name.clone());
            }
        }
        joined
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Path param names in template order.
    pub fn path_params(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|token| match token {
            Token::Param(name) => Some(name.as_str()),
            Token::Literal(_) => None,
        })
    }

    /// Declared query param names in declaration order.
    pub fn query_params(&self) -> &[String] {
        &self.query
    }

    /// Every param name the template declares, path first.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.path_params()
            .chain(self.query.iter().map(String::as_str))
    }

    /// Match a path (without prefix) and optional raw query string.
    pub fn matches(&self, path: &str, query: Option<&str>) -> Option<Params> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let mut params = Params::new();

        for token in &self.tokens {
            let segment = decode_segment(segments.next()?);
            match token {
                Token::Literal(literal) if *literal == segment => {}
                Token::Literal(_) => return None,
                Token::Param(name) => {
                    params.insert(name.clone(), segment.into_owned());
                }
            }
        }
        if segments.next().is_some() {
            return None;
        }

        if let Some(query) = query {
            for (key, value) in form_urlencoded::parse(query.as_bytes()) {
                if self.query.iter().any(|name| *name == key) {
                    params.insert(key.into_owned(), Value::String(value.into_owned()));
                }
            }
        }

        Some(params)
    }

    /// Render `params` into `/path?query`.
    ///
    /// Returns the name of the first path param that is absent, `null` or
    /// empty. Query params are skipped only when absent or `null`.
    pub fn render(&self, params: &Params) -> Result<String, &str> {
        let mut path = String::new();
        for token in &self.tokens {
            path.push('/');
            match token {
                Token::Literal(literal) => path.push_str(literal),
                Token::Param(name) => match params.text(name) {
                    Some(text) if !text.is_empty() => {
                        path.extend(utf8_percent_encode(&text, SEGMENT));
                    }
                    _ => return Err(name.as_str()),
                },
            }
        }
        if path.is_empty() {
            path.push('/');
        }

        let mut query = form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        for name in &self.query {
            if let Some(text) = params.text(name) {
                query.append_pair(name, &text);
                any = true;
            }
        }
        if any {
            path.push('?');
            path.push_str(&query.finish());
        }

        Ok(path)
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tokens.is_empty() {
            f.write_str("/")?;
        }
        for token in &self.tokens {
            match token {
                Token::Literal(literal) => write!(f, "/{literal}")?,
                Token::Param(name) => write!(f, "/:{name}")?,
            }
        }
        if !self.query.is_empty() {
            write!(f, "?{}", self.query.join("&"))?;
        }
        Ok(())
    }
}
