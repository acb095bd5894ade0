use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use job_portal_core::{filter, field_terms, Criteria, EntityKind, Job, Profile, Record};
use serde::Deserialize;
use thiserror::Error;

const DEMO_SEED: &str = include_str!("../data/seed.json");

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} with ID {id} not found")]
    NotFound { kind: EntityKind, id: u64 },
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: EntityKind, id: u64 },
    #[error("seed data error: {0}")]
    Seed(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// How a collection picks the id for a new record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdPolicy {
    /// `max(existing) + 1`, recomputed per insert. Deleting the highest id
    /// frees it for reuse.
    #[default]
    MaxPlusOne,
    /// Never hands out an id lower than or equal to one handed out before.
    Monotonic,
}

impl IdPolicy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::MaxPlusOne => "max-plus-one",
            Self::Monotonic => "monotonic",
        }
    }
}

impl fmt::Display for IdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IdPolicy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max-plus-one" | "max_plus_one" | "reuse" => Ok(Self::MaxPlusOne),
            "monotonic" | "strict" => Ok(Self::Monotonic),
            other => Err(StoreError::InvalidInput(format!(
                "unknown id policy `{other}` (expected max-plus-one or monotonic)"
            ))),
        }
    }
}

/// One ordered collection of records. Callers only ever get clones.
#[derive(Debug, Clone)]
pub struct Collection<R> {
    records: Vec<R>,
    policy: IdPolicy,
    high_water: u64,
}

impl<R: Record> Collection<R> {
    pub const fn new(policy: IdPolicy) -> Self {
        Self {
            records: Vec::new(),
            policy,
            high_water: 0,
        }
    }

    pub fn with_records(policy: IdPolicy, records: Vec<R>) -> Result<Self, StoreError> {
        let mut seen = HashSet::new();
        for record in &records {
            if record.id() == 0 || !seen.insert(record.id()) {
                return Err(StoreError::DuplicateId {
                    kind: R::KIND,
                    id: record.id(),
                });
            }
        }
        let high_water = records.iter().map(Record::id).max().unwrap_or(0);
        Ok(Self {
            records,
            policy,
            high_water,
        })
    }

    pub const fn policy(&self) -> IdPolicy {
        self.policy
    }

    pub fn allocate_id(&self) -> u64 {
        let max_existing = self.records.iter().map(Record::id).max().unwrap_or(0);
        match self.policy {
            IdPolicy::MaxPlusOne => max_existing + 1,
            IdPolicy::Monotonic => self.high_water.max(max_existing) + 1,
        }
    }

    pub fn insert(&mut self, draft: R::Draft) -> R {
        let id = self.allocate_id();
        let record = R::from_draft(id, draft);
        self.high_water = self.high_water.max(id);
        self.records.push(record.clone());
        record
    }

    pub fn delete(&mut self, id: u64) -> Result<R, StoreError> {
        let index = self
            .records
            .iter()
            .position(|record| record.id() == id)
            .ok_or(StoreError::NotFound { kind: R::KIND, id })?;
        Ok(self.records.remove(index))
    }

    pub fn get(&self, id: u64) -> Option<R> {
        self.records.iter().find(|record| record.id() == id).cloned()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.records.iter().any(|record| record.id() == id)
    }

    pub fn list(&self) -> Vec<R> {
        self.records.clone()
    }

    pub fn filter(&self, criteria: &Criteria) -> Vec<R> {
        filter(&self.records, criteria).into_iter().cloned().collect()
    }

    /// Applies each pass in turn; a record survives only if it matches all of them.
    pub fn filter_passes(&self, passes: &[Criteria]) -> Vec<R> {
        let mut survivors = filter(&self.records, &Criteria::new());
        for pass in passes {
            survivors = filter(&survivors, pass).into_iter().copied().collect();
        }
        survivors.into_iter().cloned().collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.records.iter().map(Record::id)
    }

    pub fn field_terms(&self, field: &str) -> Vec<String> {
        field_terms(&self.records, field)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct Seed {
    profiles: Vec<Profile>,
    jobs: Vec<Job>,
}

/// Owns both collections. The only place records are created or removed.
#[derive(Debug, Clone)]
pub struct EntityStore {
    profiles: Collection<Profile>,
    jobs: Collection<Job>,
}

impl EntityStore {
    pub const fn new() -> Self {
        Self::with_policy(IdPolicy::MaxPlusOne)
    }

    pub const fn with_policy(policy: IdPolicy) -> Self {
        Self {
            profiles: Collection::new(policy),
            jobs: Collection::new(policy),
        }
    }

    /// Store preloaded with the demo profiles and jobs.
    pub fn seeded(policy: IdPolicy) -> Result<Self, StoreError> {
        let seed: Seed = serde_json::from_str(DEMO_SEED)?;
        Ok(Self {
            profiles: Collection::with_records(policy, seed.profiles)?,
            jobs: Collection::with_records(policy, seed.jobs)?,
        })
    }

    pub const fn profiles(&self) -> &Collection<Profile> {
        &self.profiles
    }

    pub fn profiles_mut(&mut self) -> &mut Collection<Profile> {
        &mut self.profiles
    }

    pub const fn jobs(&self) -> &Collection<Job> {
        &self.jobs
    }

    pub fn jobs_mut(&mut self) -> &mut Collection<Job> {
        &mut self.jobs
    }

}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
