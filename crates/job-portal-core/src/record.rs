use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::{FieldKind, FieldSpec, FieldValue, Filterable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Profile,
    Job,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Profile => "Profile",
            Self::Job => "Job",
        }
    }

    pub const fn not_found_code(self) -> &'static str {
        match self {
            Self::Profile => "PROFILE_NOT_FOUND",
            Self::Job => "JOB_NOT_FOUND",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A stored entity with a store-assigned id and a declared field table.
pub trait Record: Filterable + Clone {
    /// The record as submitted, before an id is assigned.
    type Draft;

    const KIND: EntityKind;
    const FIELDS: &'static [FieldSpec];

    fn id(&self) -> u64;
    fn from_draft(id: u64, draft: Self::Draft) -> Self;

    /// Typed accessors consulted by [`declared_field`]. Each one only sees
    /// names declared with its kind.
    fn text(&self, _name: &str) -> Option<&str> {
        None
    }

    fn text_list(&self, _name: &str) -> Option<Vec<&str>> {
        None
    }

    fn number(&self, _name: &str) -> Option<f64> {
        None
    }

    fn structured(&self, _name: &str) -> Option<String> {
        None
    }

    fn field_spec(name: &str) -> Option<FieldSpec> {
        Self::FIELDS.iter().copied().find(|spec| spec.name == name)
    }
}

/// Reads `name` through the accessor its table entry declares. Names missing
/// from the table are absent.
pub fn declared_field<'a, R: Record>(record: &'a R, name: &str) -> Option<FieldValue<'a>> {
    let spec = R::field_spec(name)?;
    match spec.kind {
        FieldKind::Text => record.text(name).map(FieldValue::Text),
        FieldKind::TextList => record.text_list(name).map(FieldValue::TextList),
        FieldKind::Structured => record.structured(name).map(FieldValue::Structured),
        FieldKind::Number => record.number(name).map(FieldValue::Number),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub company: String,
    pub role: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<Experience>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Option<Vec<Experience>>,
    #[serde(default)]
    pub location: Option<String>,
}

impl Filterable for Profile {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        declared_field(self, name)
    }
}

impl Record for Profile {
    type Draft = NewProfile;

    const KIND: EntityKind = EntityKind::Profile;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", FieldKind::Number),
        FieldSpec::new("name", FieldKind::Text),
        FieldSpec::new("email", FieldKind::Text),
        FieldSpec::new("phone", FieldKind::Text),
        FieldSpec::new("location", FieldKind::Text),
        FieldSpec::new("skills", FieldKind::TextList),
        FieldSpec::new("experience", FieldKind::Structured),
        FieldSpec::new("company", FieldKind::TextList),
        FieldSpec::new("role", FieldKind::TextList),
    ];

    fn id(&self) -> u64 {
        self.id
    }

    fn text(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(&self.name),
            "email" => Some(&self.email),
            "phone" => Some(&self.phone),
            "location" => self.location.as_deref(),
            _ => None,
        }
    }

    fn text_list(&self, name: &str) -> Option<Vec<&str>> {
        let entries = self.experience.as_deref();
        match name {
            "skills" => Some(str_refs(&self.skills)),
            // Derived views over the experience entries.
            "company" => entries.map(|e| e.iter().map(|entry| entry.company.as_str()).collect()),
            "role" => entries.map(|e| e.iter().map(|entry| entry.role.as_str()).collect()),
            _ => None,
        }
    }

    fn number(&self, name: &str) -> Option<f64> {
        (name == "id").then(|| as_number(self.id))
    }

    fn structured(&self, name: &str) -> Option<String> {
        match name {
            "experience" => self
                .experience
                .as_ref()
                .and_then(|entries| serde_json::to_string(entries).ok()),
            _ => None,
        }
    }

    fn from_draft(id: u64, draft: NewProfile) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            skills: draft.skills,
            experience: draft.experience,
            location: draft.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: u64,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_required: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<u64>,
    pub description: String,
    pub skills_required: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub experience_required: Option<String>,
    #[serde(default)]
    pub salary: Option<u64>,
    pub description: String,
    pub skills_required: Vec<String>,
}

impl Filterable for Job {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        declared_field(self, name)
    }
}

impl Record for Job {
    type Draft = NewJob;

    const KIND: EntityKind = EntityKind::Job;
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", FieldKind::Number),
        FieldSpec::new("title", FieldKind::Text),
        FieldSpec::new("company", FieldKind::Text),
        FieldSpec::new("location", FieldKind::Text),
        FieldSpec::new("experienceRequired", FieldKind::Text),
        FieldSpec::new("salary", FieldKind::Number),
        FieldSpec::new("description", FieldKind::Text),
        FieldSpec::new("skillsRequired", FieldKind::TextList),
    ];

    fn id(&self) -> u64 {
        self.id
    }

    fn text(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(&self.title),
            "company" => Some(&self.company),
            "location" => Some(&self.location),
            "experienceRequired" => self.experience_required.as_deref(),
            "description" => Some(&self.description),
            _ => None,
        }
    }

    fn text_list(&self, name: &str) -> Option<Vec<&str>> {
        (name == "skillsRequired").then(|| str_refs(&self.skills_required))
    }

    fn number(&self, name: &str) -> Option<f64> {
        match name {
            "id" => Some(as_number(self.id)),
            "salary" => self.salary.map(as_number),
            _ => None,
        }
    }

    fn from_draft(id: u64, draft: NewJob) -> Self {
        Self {
            id,
            title: draft.title,
            company: draft.company,
            location: draft.location,
            experience_required: draft.experience_required,
            salary: draft.salary,
            description: draft.description,
            skills_required: draft.skills_required,
        }
    }
}

fn str_refs(items: &[String]) -> Vec<&str> {
    items.iter().map(String::as_str).collect()
}

#[allow(clippy::cast_precision_loss)]
fn as_number(value: u64) -> f64 {
    value as f64
}
