//! URI templates: `scheme://literal{var}...{?a,b,c}`.
//!
//! A template compiles once into an immutable segment list. Extraction and
//! completion both walk that list, so the grammar lives in one place.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use url::form_urlencoded;

use crate::filter::{contains_ignore_case, Criteria};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("malformed uri template `{template}`: {reason}")]
    Malformed {
        template: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Variable(String),
    /// Trailing `{?a,b,c}` list.
    Query(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl UriTemplate {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let malformed = |reason: &'static str| TemplateError::Malformed {
            template: source.to_string(),
            reason,
        };
        if source.is_empty() {
            return Err(malformed("template is empty"));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;
        let mut seen = Vec::<String>::new();

        while let Some(pos) = rest.find(['{', '}']) {
            let (head, tail) = rest.split_at(pos);
            literal.push_str(head);
            let Some(body_and_after) = tail.strip_prefix('{') else {
                return Err(malformed("unmatched `}`"));
            };
            let Some(close) = body_and_after.find('}') else {
                return Err(malformed("unclosed `{`"));
            };
            let (body, after) = body_and_after.split_at(close);
            if body.contains('{') {
                return Err(malformed("nested `{`"));
            }
            let query_seen = segments.iter().any(|s| matches!(s, Segment::Query(_)));
            let is_query = body.starts_with('?');
            if query_seen && is_query {
                return Err(malformed("more than one query variable list"));
            }
            if query_seen {
                return Err(malformed("query variable list must be the last segment"));
            }
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }

            if let Some(list) = body.strip_prefix('?') {
                let mut names = Vec::new();
                for name in list.split(',').map(str::trim) {
                    validate_name(name).map_err(malformed)?;
                    if seen.iter().any(|n| n == name) {
                        return Err(malformed("duplicate variable name"));
                    }
                    seen.push(name.to_string());
                    names.push(name.to_string());
                }
                segments.push(Segment::Query(names));
            } else {
                validate_name(body).map_err(malformed)?;
                if matches!(segments.last(), Some(Segment::Variable(_))) {
                    return Err(malformed("adjacent path variables need a literal between them"));
                }
                if seen.iter().any(|n| n == body) {
                    return Err(malformed("duplicate variable name"));
                }
                seen.push(body.to_string());
                segments.push(Segment::Variable(body.to_string()));
            }
            rest = after.strip_prefix('}').unwrap_or(after);
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            if segments.iter().any(|s| matches!(s, Segment::Query(_))) {
                return Err(malformed("query variable list must be the last segment"));
            }
            segments.push(Segment::Literal(literal));
        }
        if segments
            .iter()
            .any(|s| matches!(s, Segment::Literal(text) if text.contains('?')))
        {
            return Err(malformed("literal `?` is not allowed, declare query variables with `{?...}`"));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn path_variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Variable(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn query_variables(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Query(names) => Some(names.iter().map(String::as_str)),
                _ => None,
            })
            .flatten()
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.path_variables().chain(self.query_variables())
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables().any(|v| v == name)
    }

    pub fn is_path_variable(&self, name: &str) -> bool {
        self.path_variables().any(|v| v == name)
    }

    fn has_query(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Query(_)))
    }

    /// Binds template variables against a concrete URI. `None` means the URI
    /// does not belong to this template.
    pub fn extract(&self, uri: &str) -> Option<Bindings> {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };
        if query.is_some() && !self.has_query() {
            return None;
        }

        let mut bindings = Bindings::default();
        let mut rest = path;
        let mut segments = self.segments.iter().peekable();
        while let Some(segment) = segments.next() {
            match segment {
                Segment::Literal(text) => rest = rest.strip_prefix(text.as_str())?,
                Segment::Variable(name) => {
                    let end = match segments.peek() {
                        Some(Segment::Literal(next)) => rest.find(next.as_str())?,
                        _ => rest.len(),
                    };
                    let (value, tail) = rest.split_at(end);
                    if value.is_empty() || value.contains('/') {
                        return None;
                    }
                    bindings.push(name, value.to_string());
                    rest = tail;
                }
                Segment::Query(names) => {
                    let pairs = query
                        .map(|q| form_urlencoded::parse(q.as_bytes()))
                        .into_iter()
                        .flatten();
                    for (key, value) in pairs {
                        if names.iter().any(|name| *name == key) {
                            bindings.push(&key, value.into_owned());
                        }
                    }
                }
            }
        }

        rest.is_empty().then_some(bindings)
    }

    /// Candidate values for `variable` containing `partial` (case-insensitive).
    /// Variables the template does not declare yield nothing.
    pub fn complete<'a, I>(
        &self,
        variable: &str,
        partial: &'a str,
        candidates: I,
    ) -> impl Iterator<Item = String> + use<'a, I>
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: 'a,
    {
        self.has_variable(variable)
            .then_some(candidates)
            .into_iter()
            .flatten()
            .filter(move |candidate| contains_ignore_case(candidate, partial))
    }
}

impl FromStr for UriTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("empty variable name");
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("variable names may only contain letters, digits and `_`");
    }
    Ok(())
}

/// Value bound to one variable. Repeated query keys collect into `Many`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Binding {
    One(String),
    Many(Vec<String>),
}

impl Binding {
    pub fn values(&self) -> &[String] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }

    pub fn first(&self) -> Option<&str> {
        self.values().first().map(String::as_str)
    }

    fn push(&mut self, value: String) {
        match self {
            Self::One(first) => *self = Self::Many(vec![std::mem::take(first), value]),
            Self::Many(values) => values.push(value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Bindings(BTreeMap<String, Binding>);

impl Bindings {
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.0.get(name)
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Binding::first)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn push(&mut self, name: &str, value: String) {
        match self.0.get_mut(name) {
            Some(binding) => binding.push(value),
            None => {
                self.0.insert(name.to_string(), Binding::One(value));
            }
        }
    }

    /// Splits the bindings into criteria passes: pass `n` holds the `n`-th
    /// value of every variable that has one. Filtering through every pass in
    /// turn requires each repeated value to match.
    pub fn criteria_passes<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> Vec<Criteria> {
        let mut passes: Vec<Criteria> = Vec::new();
        for name in names {
            let Some(binding) = self.get(name) else {
                continue;
            };
            for (depth, value) in binding.values().iter().enumerate() {
                if depth == passes.len() {
                    passes.push(Criteria::new());
                }
                if let Some(pass) = passes.get_mut(depth) {
                    pass.insert(name, value.as_str());
                }
            }
        }
        passes
    }
}
