//! Inline-button callback payloads
//!
//! Formats on the wire:
//! - `ans:<option text>`: questionnaire answer
//! - `admin:stats`, `admin:export`: dashboard buttons

use veltocore::config::onboarding::ANSWER_CALLBACK_PREFIX as ANSWER_PREFIX;

const ADMIN_STATS: &str = "admin:stats";
const ADMIN_EXPORT: &str = "admin:export";

/// Parsed callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackData {
    Answer(String),
    AdminStats,
    AdminExport,
}

impl CallbackData {
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(option) = data.strip_prefix(ANSWER_PREFIX) {
            return Some(Self::Answer(option.to_string()));
        }
        match data {
            ADMIN_STATS => Some(Self::AdminStats),
            ADMIN_EXPORT => Some(Self::AdminExport),
            _ => None,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Answer(option) => format!("{ANSWER_PREFIX}{option}"),
            Self::AdminStats => ADMIN_STATS.to_string(),
            Self::AdminExport => ADMIN_EXPORT.to_string(),
        }
    }
}
