use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::feedback::Feedback;

/// Key-value key under which a record with the given id is stored.
pub fn record_key(id: &str) -> String {
    format!("resume:{id}")
}

/// Pattern matching every stored record key.
pub const RECORD_PATTERN: &str = "resume:*";

/// A persisted resume submission.
///
/// Created with empty feedback at upload time and rewritten once when
/// feedback arrives. Only removed by the bulk clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub id: String,
    pub resume_path: String,
    pub image_path: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub feedback: FeedbackSlot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Feedback as stored: empty, a JSON-encoded string, or an already
/// structured value. Never fails to deserialize so a bad payload cannot
/// make the whole record unreadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedbackSlot {
    Encoded(String),
    Structured(Value),
}

impl Default for FeedbackSlot {
    fn default() -> Self {
        FeedbackSlot::Encoded(String::new())
    }
}

impl FeedbackSlot {
    pub fn structured(feedback: &Feedback) -> Result<Self, serde_json::Error> {
        serde_json::to_value(feedback).map(FeedbackSlot::Structured)
    }

    pub fn encoded(feedback: &Feedback) -> Result<Self, serde_json::Error> {
        serde_json::to_string(feedback).map(FeedbackSlot::Encoded)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FeedbackSlot::Encoded(s) => s.trim().is_empty(),
            FeedbackSlot::Structured(v) => v.is_null(),
        }
    }

    /// Decodes the slot. `Ok(None)` when nothing has been stored yet.
    pub fn decode(&self) -> Result<Option<Feedback>, serde_json::Error> {
        if self.is_empty() {
            return Ok(None);
        }
        match self {
            FeedbackSlot::Encoded(s) => serde_json::from_str(s).map(Some),
            FeedbackSlot::Structured(v) => Feedback::deserialize(v).map(Some),
        }
    }
}

impl ResumeRecord {
    pub fn key(&self) -> String {
        record_key(&self.id)
    }
}
