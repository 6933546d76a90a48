use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Emotional state recorded against a trade
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Emotion {
    Fearful,
    Greedy,
    Calm,
    Anxious,
    Neutral,
}

impl Emotion {
    pub fn all() -> &'static [Emotion] {
        &[
            Emotion::Fearful,
            Emotion::Greedy,
            Emotion::Calm,
            Emotion::Anxious,
            Emotion::Neutral,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Fearful => "Fearful",
            Emotion::Greedy => "Greedy",
            Emotion::Calm => "Calm",
            Emotion::Anxious => "Anxious",
            Emotion::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::all()
            .iter()
            .copied()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| format!("Unknown emotion: {}", s))
    }
}

/// Body of `PATCH /journal/{positionId}` (already validated)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypothetical_exit_price: Option<f64>,
}

/// Stored journal annotation for a position
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub position_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypothetical_exit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_bias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl JournalEntry {
    /// Entry carrying exactly the fields of `payload`.
    pub fn from_payload(position_id: impl Into<String>, payload: &JournalPayload) -> Self {
        Self {
            position_id: position_id.into(),
            notes: payload.notes.clone(),
            emotion: payload.emotion,
            rating: payload.rating,
            hypothetical_exit_price: payload.hypothetical_exit_price,
            ..Self::default()
        }
    }
}

/// AI review of a journal entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalAnalysis {
    pub summary: String,
    pub detected_bias: String,
    pub score: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
}

/// `PATCH /journal/{positionId}` response payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalResponse {
    pub data: JournalEntry,
    pub analysis: JournalAnalysis,
}
