//! Velto core - onboarding state machine and membership reconciliation
//!
//! This library holds everything the Velto bot does that is not Telegram I/O:
//! the questionnaire flow, the user record store, join/leave reconciliation
//! and admin reporting. The transport plugs in through [`membership::GroupGateway`].
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging and shared value types
//! - `storage`: SQLite pool, migrations and the record store
//! - `onboarding`: Question catalog, conversation sessions and the engine
//! - `membership`: Member statuses, the transport gateway and the reconciler
//! - `admin`: Admin check, stats and export

pub mod admin;
pub mod core;
pub mod membership;
pub mod onboarding;
pub mod storage;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult, Answers, UserRef};
pub use admin::{AdminReporting, Stats};
pub use membership::{GatewayError, GroupGateway, InviteLink, MemberStatus, MembershipEvent, MembershipReconciler};
pub use onboarding::{OnboardingEngine, OnboardingError, QuestionCatalog, Reply};
pub use storage::{create_pool, DbPool, RecordStore, SqliteStore, UserRecord};
