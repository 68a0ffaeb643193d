//! Telegram bot handler tree configuration
//!
//! The dispatcher schema routes commands, inline-button callbacks and
//! `chat_member` updates into the onboarding core.

mod admin;
mod membership;
mod onboarding;
mod schema;
mod types;

pub use schema::schema;
pub use types::HandlerDeps;
