//! Campus Ledger: Canonical Hashing
//!
//! Deterministic canonical serialization + SHA-256 hashing.
//!
//! Rules:
//!   - ledger_version first
//!   - Id sets emitted sorted (BTreeSet order)
//!   - Activities and rewards in catalog order
//!   - redeemed_rewards and reviews in insertion order
//!   - UTF-8 JSON, no whitespace, no float

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::{Activity, ActivityStatus, LedgerState, Review, User};
use crate::LEDGER_VERSION;

/// Canonical serialization of LedgerState to UTF-8 JSON bytes.
pub fn canonical_serialize(state: &LedgerState) -> Vec<u8> {
    build_canonical_value(state).to_string().into_bytes()
}

/// SHA-256 of canonical serialization. Lowercase hex string.
pub fn canonical_hash(state: &LedgerState) -> String {
    hex_digest(&canonical_serialize(state))
}

/// Lowercase hex SHA-256 of arbitrary bytes.
pub fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn strings<'a>(items: impl Iterator<Item = &'a String>) -> Value {
    Value::Array(items.map(|s| Value::String(s.clone())).collect())
}

fn opt_string(v: &Option<String>) -> Value {
    v.as_ref().map_or(Value::Null, |s| Value::String(s.clone()))
}

/// Field order: ledger_version, user, activities, rewards, completion_points
fn build_canonical_value(state: &LedgerState) -> Value {
    let mut root = Map::new();
    root.insert(
        "ledger_version".to_string(),
        Value::Number(LEDGER_VERSION.into()),
    );
    root.insert("user".to_string(), user_value(&state.user));
    root.insert(
        "activities".to_string(),
        Value::Array(state.catalog.iter().map(activity_value).collect()),
    );

    let rewards = state
        .rewards
        .iter()
        .map(|r| {
            let mut m = Map::new();
            m.insert("id".to_string(), Value::String(r.id.clone()));
            m.insert("title".to_string(), Value::String(r.title.clone()));
            m.insert("cost".to_string(), Value::Number(r.cost.into()));
            m.insert("icon".to_string(), Value::String(r.icon.clone()));
            m.insert("description".to_string(), Value::String(r.description.clone()));
            Value::Object(m)
        })
        .collect();
    root.insert("rewards".to_string(), Value::Array(rewards));
    root.insert(
        "completion_points".to_string(),
        Value::Number(state.constants.completion_points.into()),
    );

    Value::Object(root)
}

fn user_value(user: &User) -> Value {
    let mut m = Map::new();
    m.insert("name".to_string(), Value::String(user.name.clone()));
    m.insert("avatar".to_string(), opt_string(&user.avatar));
    m.insert("role".to_string(), Value::String(user.role.as_str().to_string()));
    m.insert(
        "preferences".to_string(),
        Value::Array(
            user.preferences
                .iter()
                .map(|c| Value::String(c.as_str().to_string()))
                .collect(),
        ),
    );
    m.insert("joined_activities".to_string(), strings(user.joined_activities.iter()));
    m.insert(
        "completed_activities".to_string(),
        strings(user.completed_activities.iter()),
    );
    m.insert("saved_activities".to_string(), strings(user.saved_activities.iter()));
    m.insert("redeemed_rewards".to_string(), strings(user.redeemed_rewards.iter()));
    m.insert("points".to_string(), Value::Number(user.points.into()));
    m.insert(
        "reviews".to_string(),
        Value::Array(user.reviews.iter().map(review_value).collect()),
    );
    Value::Object(m)
}

fn review_value(r: &Review) -> Value {
    let mut m = Map::new();
    m.insert("id".to_string(), Value::String(r.id.clone()));
    m.insert("activity_id".to_string(), Value::String(r.activity_id.clone()));
    m.insert("activity_title".to_string(), Value::String(r.activity_title.clone()));
    m.insert("rating".to_string(), Value::Number(r.rating.into()));
    m.insert("content".to_string(), Value::String(r.content.clone()));
    m.insert("timestamp".to_string(), Value::String(r.timestamp.clone()));
    Value::Object(m)
}

fn activity_value(a: &Activity) -> Value {
    let mut m = Map::new();
    m.insert("id".to_string(), Value::String(a.id.clone()));
    m.insert("title".to_string(), Value::String(a.title.clone()));
    m.insert("title_en".to_string(), opt_string(&a.title_en));
    m.insert("organizer".to_string(), Value::String(a.organizer.clone()));
    m.insert("date".to_string(), Value::String(a.date.clone()));
    m.insert("time".to_string(), Value::String(a.time.clone()));
    m.insert("location".to_string(), Value::String(a.location.clone()));
    m.insert("category".to_string(), Value::String(a.category.as_str().to_string()));
    m.insert("description".to_string(), Value::String(a.description.clone()));
    m.insert("description_en".to_string(), opt_string(&a.description_en));
    m.insert("image".to_string(), Value::String(a.image.clone()));
    m.insert("external_link".to_string(), opt_string(&a.external_link));
    m.insert("tags".to_string(), strings(a.tags.iter()));
    m.insert(
        "registered_count".to_string(),
        Value::Number(a.registered_count.into()),
    );
    m.insert("max_capacity".to_string(), Value::Number(a.max_capacity.into()));
    let status = a.status.map_or(Value::Null, |s| {
        Value::String(
            match s {
                ActivityStatus::Upcoming => "upcoming",
                ActivityStatus::Completed => "completed",
                ActivityStatus::Cancelled => "cancelled",
            }
            .to_string(),
        )
    });
    m.insert("status".to_string(), status);
    Value::Object(m)
}
