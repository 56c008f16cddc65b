//! Campus Ledger: Activity Catalog
//!
//! Activities in seed order. Immutable after load except for the
//! registration counter, whose only mutator is crate-private and is
//! called from the Join transition alone.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::arithmetic::{bump_counter, is_valid_id};
use crate::domain::{Activity, ActivityCategory};
use crate::error::LedgerError;

/// Maximum characters of description carried into a prompt digest.
pub const DIGEST_DESCRIPTION_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Activity>", into = "Vec<Activity>")]
pub struct Catalog {
    activities: Vec<Activity>,
}

/// Prompt-sized view of one activity: (title, category, description prefix).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDigest {
    pub title: String,
    pub category: ActivityCategory,
    pub description_prefix: String,
}

impl Catalog {
    /// Build a catalog, rejecting malformed or duplicate ids.
    pub fn new(activities: Vec<Activity>) -> Result<Self, LedgerError> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for a in &activities {
            if !is_valid_id(&a.id) {
                return Err(LedgerError::InvalidCatalog(format!(
                    "activity id {:?} must match [a-zA-Z0-9_-]+",
                    a.id
                )));
            }
            if !seen.insert(a.id.as_str()) {
                return Err(LedgerError::InvalidCatalog(format!(
                    "duplicate activity id {:?}",
                    a.id
                )));
            }
        }
        Ok(Self { activities })
    }

    /// Static seed data; ids are literals checked by the seed tests.
    pub(crate) fn from_seed(activities: Vec<Activity>) -> Self {
        Self { activities }
    }

    pub fn get(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.activities.iter()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn by_category(&self, category: ActivityCategory) -> impl Iterator<Item = &Activity> {
        self.activities.iter().filter(move |a| a.category == category)
    }

    /// Seats left before `max_capacity`. Informational only; Join never checks it.
    pub fn remaining_capacity(&self, id: &str) -> Option<u32> {
        self.get(id)
            .map(|a| a.max_capacity.saturating_sub(a.registered_count))
    }

    pub fn is_full(&self, id: &str) -> bool {
        self.remaining_capacity(id) == Some(0)
    }

    /// First `limit` activities as prompt digests.
    pub fn digest(&self, limit: usize) -> Vec<ActivityDigest> {
        self.activities
            .iter()
            .take(limit)
            .map(|a| ActivityDigest {
                title: a.title.clone(),
                category: a.category,
                description_prefix: a.description.chars().take(DIGEST_DESCRIPTION_CHARS).collect(),
            })
            .collect()
    }

    /// +1 on `registered_count`. Returns the new count, or `None` when the
    /// id is unknown or the counter would overflow.
    pub(crate) fn increment_registration(&mut self, id: &str) -> Option<u32> {
        let activity = self.activities.iter_mut().find(|a| a.id == id)?;
        let next = bump_counter(activity.registered_count)?;
        activity.registered_count = next;
        Some(next)
    }
}

impl TryFrom<Vec<Activity>> for Catalog {
    type Error = LedgerError;

    fn try_from(activities: Vec<Activity>) -> Result<Self, Self::Error> {
        Catalog::new(activities)
    }
}

impl From<Catalog> for Vec<Activity> {
    fn from(catalog: Catalog) -> Self {
        catalog.activities
    }
}
