//! Telegram transport for the onboarding core

pub mod bot;
pub mod callback;
pub mod export;
pub mod gateway;
pub mod handlers;
pub mod keyboard;
pub mod messages;

pub use bot::{create_bot, setup_bot_commands};
pub use gateway::TelegramGateway;
pub use handlers::{schema, HandlerDeps};
