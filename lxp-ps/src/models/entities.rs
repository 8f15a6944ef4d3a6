//! Rows read from the relational store

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Identity row (`users`)
#[derive(Debug, Clone, PartialEq)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
    pub display_name: String,
}

/// Most recent skill-profile snapshot for a user
#[derive(Debug, Clone, PartialEq)]
pub struct SkillProfileSnapshot {
    pub id: String,
    pub user_id: String,
    /// Category name → score
    pub categories: BTreeMap<String, f64>,
    pub created_at: DateTime<Utc>,
}

/// Journal reflection row
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionRow {
    pub id: String,
    pub question_id: String,
    pub response_text: String,
    /// Capability scores exactly as stored; never parsed here
    pub capability_scores: String,
    pub created_at: DateTime<Utc>,
}
