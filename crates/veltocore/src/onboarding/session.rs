//! Conversation state tracker - per-user questionnaire progress

use async_trait::async_trait;
use dashmap::DashMap;

use crate::core::{AppResult, Answers};

/// Where a session stands relative to a catalog of `total` questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the answer to the question at this index
    AwaitingAnswer(usize),
    /// Every question answered; the session is due for finalize
    Completed,
}

/// Ephemeral progress of one user's single active questionnaire run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationSession {
    index: usize,
    answers: Answers,
    username: Option<String>,
}

impl ConversationSession {
    pub fn new(username: Option<String>) -> Self {
        Self {
            index: 0,
            answers: Answers::new(),
            username,
        }
    }

    /// Cursor into the catalog, `0..=catalog.len()`.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    /// Stores `option` under `key` and moves the cursor one question forward.
    pub fn record_answer(&mut self, key: &str, option: &str) {
        self.answers.insert(key, option);
        self.index += 1;
    }

    pub fn state(&self, total: usize) -> SessionState {
        if self.index < total {
            SessionState::AwaitingAnswer(self.index)
        } else {
            SessionState::Completed
        }
    }

    pub fn into_parts(self) -> (Answers, Option<String>) {
        (self.answers, self.username)
    }
}

/// Backing store for active sessions, at most one per user.
///
/// The in-memory implementation serves a single process; a shared backend can
/// be plugged in when the bot is scaled out.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, user_id: i64) -> AppResult<Option<ConversationSession>>;

    /// Creates or overwrites the user's session (last write wins).
    async fn save(&self, user_id: i64, session: ConversationSession) -> AppResult<()>;

    async fn remove(&self, user_id: i64) -> AppResult<Option<ConversationSession>>;
}

/// Process-local [`SessionStore`] on a sharded concurrent map.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<i64, ConversationSession>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, user_id: i64) -> AppResult<Option<ConversationSession>> {
        Ok(self.sessions.get(&user_id).map(|entry| entry.value().clone()))
    }

    async fn save(&self, user_id: i64, session: ConversationSession) -> AppResult<()> {
        self.sessions.insert(user_id, session);
        Ok(())
    }

    async fn remove(&self, user_id: i64) -> AppResult<Option<ConversationSession>> {
        Ok(self.sessions.remove(&user_id).map(|(_, session)| session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_answer_advances_cursor() {
        let mut session = ConversationSession::new(Some("alice".to_string()));
        assert_eq!(session.state(2), SessionState::AwaitingAnswer(0));

        session.record_answer("experience", "Beginner");
        assert_eq!(session.index(), 1);
        assert_eq!(session.state(2), SessionState::AwaitingAnswer(1));

        session.record_answer("rules", "Yes");
        assert_eq!(session.state(2), SessionState::Completed);
        assert_eq!(session.answers().len(), 2);
    }

    #[tokio::test]
    async fn test_in_memory_store_last_save_wins() {
        let store = InMemorySessionStore::new();

        let mut first = ConversationSession::new(None);
        first.record_answer("experience", "Advanced");
        store.save(1, first).await.unwrap();
        store.save(1, ConversationSession::new(None)).await.unwrap();

        let loaded = store.load(1).await.unwrap().unwrap();
        assert_eq!(loaded.index(), 0);
        assert!(loaded.answers().is_empty());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_store_remove() {
        let store = InMemorySessionStore::new();
        store.save(7, ConversationSession::new(None)).await.unwrap();

        assert!(store.remove(7).await.unwrap().is_some());
        assert!(store.remove(7).await.unwrap().is_none());
        assert!(store.load(7).await.unwrap().is_none());
        assert!(store.is_empty());
    }
}
