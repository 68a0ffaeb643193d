//! Onboarding questionnaire: catalog, per-user sessions and the engine

pub mod catalog;
pub mod engine;
pub mod session;

pub use catalog::{Question, QuestionCatalog};
pub use engine::{FinalizeResult, OnboardingEngine, OnboardingError, Prompt, Reply};
pub use session::{ConversationSession, InMemorySessionStore, SessionState, SessionStore};
