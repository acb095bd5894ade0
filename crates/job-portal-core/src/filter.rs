//! Attribute filter engine.
//!
//! Records expose their fields as [`FieldValue`]s and every criterion is
//! matched with the rule that belongs to the field's variant. All criteria
//! are combined with logical AND and the relative order of the input is kept.

use std::collections::btree_map;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declared shape of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    TextList,
    Structured,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// A field value as seen by the matcher.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    TextList(Vec<&'a str>),
    /// Canonical JSON text of a nested structure.
    Structured(String),
    Number(f64),
    Other(String),
}

impl<'a> FieldValue<'a> {
    /// Maps an untyped JSON value onto the matcher variants. `null` counts as absent.
    pub fn from_json(value: &'a Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(Self::Text(text)),
            Value::Number(number) => number.as_f64().map(Self::Number),
            Value::Bool(flag) => Some(Self::Other(flag.to_string())),
            Value::Array(items) => {
                let texts = items.iter().map(Value::as_str).collect::<Option<Vec<_>>>();
                Some(match texts {
                    Some(texts) => Self::TextList(texts),
                    None => Self::Structured(value.to_string()),
                })
            }
            Value::Object(_) => Some(Self::Structured(value.to_string())),
        }
    }

    #[allow(clippy::float_cmp)]
    pub fn matches(&self, target: &str) -> bool {
        match self {
            Self::Text(text) => contains_ignore_case(text, target),
            Self::TextList(items) => items
                .iter()
                .any(|item| contains_ignore_case(item, target)),
            Self::Structured(json) => contains_ignore_case(json, target),
            Self::Number(number) => parse_number(target).is_some_and(|wanted| wanted == *number),
            Self::Other(text) => text == target,
        }
    }

    /// Individual searchable terms, used as completion candidates.
    pub fn terms(&self) -> Vec<String> {
        match self {
            Self::Text(text) => vec![(*text).to_string()],
            Self::TextList(items) => items.iter().map(|item| (*item).to_string()).collect(),
            Self::Number(number) => vec![number.to_string()],
            Self::Other(text) => vec![text.clone()],
            Self::Structured(_) => Vec::new(),
        }
    }
}

/// Anything the filter engine can look into by field name.
pub trait Filterable {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

impl Filterable for Map<String, Value> {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.get(name).and_then(FieldValue::from_json)
    }
}

impl Filterable for Value {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.as_object().and_then(|object| object.field(name))
    }
}

impl<T: Filterable + ?Sized> Filterable for &T {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        (**self).field(name)
    }
}

/// Field name to string-encoded target value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criteria(BTreeMap<String, String>);

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(field.into(), value.into())
    }

    /// Inserts only when a value is present and non-empty.
    pub fn insert_opt(&mut self, field: impl Into<String>, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.insert(field, value);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys of `other` win on conflict.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        merged.0.extend(other.0.clone());
        merged
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Criteria {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

pub fn matches<R: Filterable + ?Sized>(record: &R, criteria: &Criteria) -> bool {
    criteria.iter().all(|(name, target)| {
        record
            .field(name)
            .is_some_and(|value| value.matches(target))
    })
}

/// Returns the records matching every criterion, in input order.
pub fn filter<'a, R: Filterable>(records: &'a [R], criteria: &Criteria) -> Vec<&'a R> {
    if criteria.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|record| matches(*record, criteria))
        .collect()
}

/// Distinct searchable terms of one field across `records`, first-seen order.
pub fn field_terms<R: Filterable>(records: &[R], name: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|record| record.field(name))
        .flat_map(|value| value.terms())
        .filter(|term| !term.is_empty() && seen.insert(term.clone()))
        .collect()
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}
