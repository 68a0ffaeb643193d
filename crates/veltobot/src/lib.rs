//! Velto bot: Telegram transport around `veltocore`
//!
//! The binary in `main.rs` wires these modules together; integration tests
//! drive the same handler schema against a mocked Bot API.

pub mod cli;
pub mod health;
pub mod telegram;
