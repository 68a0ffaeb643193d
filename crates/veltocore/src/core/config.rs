//! Configuration for the bot
//!
//! Every value is read once from the environment on first access and never
//! changes afterwards. `.env` is loaded by the binary before anything here is
//! touched.

use once_cell::sync::Lazy;
use secrecy::SecretString;
use std::env;

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<SecretString> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_default()
        .into()
});

/// Target group the bot onboards members into
/// Read from GROUP_ID environment variable (e.g. -1001234567890)
/// `None` when unset or not an integer; the bot refuses to start then
pub static GROUP_ID: Lazy<Option<i64>> = Lazy::new(|| env::var("GROUP_ID").ok().and_then(|raw| parse_chat_id(&raw)));

/// Port for the keep-alive HTTP endpoint
/// Read from PORT environment variable
/// Default: 10000
pub static PORT: Lazy<u16> = Lazy::new(|| {
    env::var("PORT")
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(10000)
});

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: velto.db
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "velto.db".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: velto.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "velto.log".to_string()));

/// Optional JSON file with the question catalog
/// Read from QUESTIONS_PATH environment variable
/// When unset the built-in questionnaire is used
pub static QUESTIONS_PATH: Lazy<Option<String>> = Lazy::new(|| {
    env::var("QUESTIONS_PATH").ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
});

fn parse_chat_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Onboarding configuration
pub mod onboarding {
    use chrono::Duration;

    /// Lifetime of a freshly minted invite link (in seconds)
    pub const INVITE_TTL_SECS: i64 = 600; // 10 minutes

    /// How many people may join through one invite link
    pub const INVITE_MEMBER_LIMIT: u32 = 1;

    /// Invite lifetime duration
    pub fn invite_ttl() -> Duration {
        Duration::seconds(INVITE_TTL_SECS)
    }

    /// Callback data of an answer button is this prefix followed by the option text
    pub const ANSWER_CALLBACK_PREFIX: &str = "ans:";

    /// Bot API limit on inline-button callback data (in bytes)
    pub const MAX_CALLBACK_DATA_BYTES: usize = 64;

    /// Longest option text that still fits in an answer button's callback data
    pub const fn max_option_bytes() -> usize {
        MAX_CALLBACK_DATA_BYTES - ANSWER_CALLBACK_PREFIX.len()
    }
}

/// Network configuration
pub mod network {
    use std::time::Duration;

    /// Request timeout for Bot API calls (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Database configuration
pub mod database {
    use std::time::Duration;

    /// Maximum pooled SQLite connections
    pub const MAX_CONNECTIONS: u32 = 8;

    /// How long a writer waits for the SQLite lock (in milliseconds)
    pub const BUSY_TIMEOUT_MS: u64 = 5000;

    pub fn busy_timeout() -> Duration {
        Duration::from_millis(BUSY_TIMEOUT_MS)
    }
}
