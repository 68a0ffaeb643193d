//! Onboarding engine - drives a user from `/start` to an invite link
//!
//! State machine per user:
//!
//! ```text
//! NoSession ──start──▶ AwaitingAnswer(0) ──answer──▶ … ──answer──▶ AwaitingAnswer(N-1) ──answer──▶ Completed
//!     ▲                      ▲                                                                     │
//!     │                      └──────────────────────── start (from any state) ─────────────────────┤
//!     └──────────────────────────────────────── finalize (record + invite) ◀──────────────────────┘
//! ```
//!
//! Completing the last question finalizes in the same call; there is no
//! separate "completed, awaiting input" state.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

use super::catalog::QuestionCatalog;
use super::session::{ConversationSession, SessionState, SessionStore};
use crate::core::config;
use crate::core::{AppError, UserRef};
use crate::membership::{GatewayError, GroupGateway, InviteLink};
use crate::storage::{RecordStore, UserRecord};

/// A question ready to be shown, with its fixed choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub key: String,
    pub text: String,
    pub options: Vec<String>,
    /// 1-based position in the questionnaire
    pub position: usize,
    pub total: usize,
}

/// Successful end of a questionnaire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeResult {
    pub invite: InviteLink,
}

/// What the transport should tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Ask the next question
    Question(Prompt),
    /// The user already has a record and is in the group; nothing changed
    AlreadyMember,
    /// Questionnaire finished, record stored, invite minted
    Finished(FinalizeResult),
    /// An answer arrived without an active session; dropped
    NoSession,
}

/// Failures the user has to hear about.
#[derive(Error, Debug)]
pub enum OnboardingError {
    /// Reading or writing the user record failed. When this comes out of
    /// finalize the session is already gone and the answers are lost.
    #[error("record store failed: {0}")]
    Store(#[source] AppError),

    /// The session backend failed.
    #[error("session store failed: {0}")]
    Session(#[source] AppError),

    /// The record was saved but no invite could be minted.
    #[error("invite issuance failed: {0}")]
    Invite(#[source] GatewayError),
}

/// Drives the questionnaire for every user.
///
/// Handlers for different users run concurrently; nothing serializes access
/// to one user's session or record beyond the transport's per-chat ordering.
pub struct OnboardingEngine {
    catalog: Arc<QuestionCatalog>,
    records: Arc<dyn RecordStore>,
    sessions: Arc<dyn SessionStore>,
    gateway: Arc<dyn GroupGateway>,
}

impl OnboardingEngine {
    pub fn new(
        catalog: Arc<QuestionCatalog>,
        records: Arc<dyn RecordStore>,
        sessions: Arc<dyn SessionStore>,
        gateway: Arc<dyn GroupGateway>,
    ) -> Self {
        Self {
            catalog,
            records,
            sessions,
            gateway,
        }
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    /// Current session of the user, if one is active.
    pub async fn session(&self, user_id: i64) -> Result<Option<ConversationSession>, OnboardingError> {
        self.sessions.load(user_id).await.map_err(OnboardingError::Session)
    }

    /// Starts (or restarts) the questionnaire.
    ///
    /// A user who already has a record and is currently in the group gets
    /// [`Reply::AlreadyMember`] and nothing is modified. A failed membership
    /// lookup counts as "not a member", so the user can still run the flow.
    /// Otherwise any previous session is discarded and the first question is
    /// returned.
    pub async fn start_session(&self, user: &UserRef) -> Result<Reply, OnboardingError> {
        let existing = self.records.get(user.id).await.map_err(OnboardingError::Store)?;

        if existing.is_some() && self.is_active_member(user.id).await {
            log::info!("User {} is already a member, not starting a session", user.id);
            return Ok(Reply::AlreadyMember);
        }

        self.sessions
            .save(user.id, ConversationSession::new(user.username.clone()))
            .await
            .map_err(OnboardingError::Session)?;
        log::info!("Started onboarding session for user {}", user.id);

        self.advance_or_finish(user.id).await
    }

    /// Records an answer for the current question and moves on.
    ///
    /// `option` is accepted as-is: it is not checked against the current
    /// question's choices. The keyboard only ever offers valid choices, and
    /// the stored record carries whatever the transport delivered.
    ///
    /// Without an active session this is a no-op returning [`Reply::NoSession`].
    pub async fn submit_answer(&self, user: &UserRef, option: &str) -> Result<Reply, OnboardingError> {
        let Some(mut session) = self.session(user.id).await? else {
            log::debug!("Answer from user {} without an active session, ignoring", user.id);
            return Ok(Reply::NoSession);
        };

        // A session saved with index == len would already have been finalized
        let Some(question) = self.catalog.get(session.index()) else {
            return self.finalize(user.id).await;
        };

        session.record_answer(&question.key, option);
        // The record carries the handle as of the last answer, including its removal
        session.set_username(user.username.clone());
        log::debug!(
            "User {} answered '{}' ({}/{})",
            user.id,
            question.key,
            session.index(),
            self.catalog.len()
        );

        self.sessions
            .save(user.id, session)
            .await
            .map_err(OnboardingError::Session)?;

        self.advance_or_finish(user.id).await
    }

    /// Returns the question at the session's cursor, or finalizes once every
    /// question is answered.
    pub async fn advance_or_finish(&self, user_id: i64) -> Result<Reply, OnboardingError> {
        let Some(session) = self.session(user_id).await? else {
            return Ok(Reply::NoSession);
        };

        match session.state(self.catalog.len()) {
            SessionState::AwaitingAnswer(index) => match self.catalog.get(index) {
                Some(question) => Ok(Reply::Question(Prompt {
                    key: question.key.clone(),
                    text: question.prompt.clone(),
                    options: question.options.clone(),
                    position: index + 1,
                    total: self.catalog.len(),
                })),
                None => self.finalize(user_id).await,
            },
            SessionState::Completed => self.finalize(user_id).await,
        }
    }

    /// Persists the completed answers and mints the invite.
    ///
    /// The session is cleared before anything else happens, so neither step
    /// is retried: a failed record write loses the answers, and a failed
    /// invite leaves the record in place without a link. Both surface as
    /// errors so the user is told.
    pub async fn finalize(&self, user_id: i64) -> Result<Reply, OnboardingError> {
        let Some(session) = self.sessions.remove(user_id).await.map_err(OnboardingError::Session)? else {
            return Ok(Reply::NoSession);
        };

        let now = Utc::now();
        let (answers, username) = session.into_parts();
        let record = UserRecord {
            user_id,
            username,
            answers: Some(answers),
            joined: false,
            created_at: now.timestamp(),
        };

        if let Err(e) = self.records.upsert(record).await {
            log::error!("Failed to store completed questionnaire for user {}: {}", user_id, e);
            return Err(OnboardingError::Store(e));
        }

        let expires_at = now + config::onboarding::invite_ttl();
        let invite = self
            .gateway
            .create_invite(config::onboarding::INVITE_MEMBER_LIMIT, expires_at)
            .await
            .map_err(|e| {
                log::error!("Failed to create invite link for user {}: {}", user_id, e);
                OnboardingError::Invite(e)
            })?;

        log::info!("User {} completed onboarding, invite expires at {}", user_id, invite.expires_at);
        Ok(Reply::Finished(FinalizeResult { invite }))
    }

    /// Membership check with lookup failures collapsed to "not a member".
    async fn is_active_member(&self, user_id: i64) -> bool {
        match self.gateway.member_status(user_id).await {
            Ok(status) => status.is_active_member(),
            Err(e) => {
                log::warn!("Membership lookup for user {} failed, treating as non-member: {}", user_id, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::MemberStatus;
    use crate::onboarding::session::InMemorySessionStore;
    use crate::storage::{create_pool, SqliteStore};
    use async_trait::async_trait;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeGateway {
        status: Mutex<Option<MemberStatus>>,
        fail_invites: bool,
        invites: Mutex<Vec<(u32, DateTime<Utc>)>>,
    }

    #[async_trait]
    impl GroupGateway for FakeGateway {
        async fn member_status(&self, user_id: i64) -> Result<MemberStatus, GatewayError> {
            (*self.status.lock().unwrap()).ok_or(GatewayError::UserNotFound(user_id))
        }

        async fn create_invite(&self, member_limit: u32, expires_at: DateTime<Utc>) -> Result<InviteLink, GatewayError> {
            if self.fail_invites {
                return Err(GatewayError::Request("CHAT_ADMIN_REQUIRED".to_string()));
            }
            self.invites.lock().unwrap().push((member_limit, expires_at));
            Ok(InviteLink {
                url: "https://t.me/+abc".to_string(),
                member_limit,
                expires_at,
            })
        }
    }

    struct Harness {
        _dir: tempfile::TempDir,
        records: Arc<SqliteStore>,
        sessions: Arc<InMemorySessionStore>,
        gateway: Arc<FakeGateway>,
        engine: OnboardingEngine,
    }

    fn harness(gateway: FakeGateway) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_pool(dir.path().join("velto.db").to_str().unwrap()).unwrap();
        let records = Arc::new(SqliteStore::new(Arc::new(pool)));
        let sessions = Arc::new(InMemorySessionStore::new());
        let gateway = Arc::new(gateway);
        let engine = OnboardingEngine::new(
            Arc::new(QuestionCatalog::default()),
            records.clone(),
            sessions.clone(),
            gateway.clone(),
        );
        Harness {
            _dir: dir,
            records,
            sessions,
            gateway,
            engine,
        }
    }

    fn alice() -> UserRef {
        UserRef::new(100, Some("alice".to_string()))
    }

    #[tokio::test]
    async fn test_start_returns_first_question() {
        let h = harness(FakeGateway::default());

        let reply = h.engine.start_session(&alice()).await.unwrap();

        let Reply::Question(prompt) = reply else {
            panic!("expected a question, got {reply:?}");
        };
        assert_eq!(prompt.key, "experience");
        assert_eq!(prompt.options, vec!["Beginner", "Intermediate", "Advanced"]);
        assert_eq!((prompt.position, prompt.total), (1, 4));
    }

    #[tokio::test]
    async fn test_restart_resets_cursor() {
        let h = harness(FakeGateway::default());
        h.engine.start_session(&alice()).await.unwrap();
        h.engine.submit_answer(&alice(), "Beginner").await.unwrap();

        h.engine.start_session(&alice()).await.unwrap();
        let session = h.engine.session(100).await.unwrap().unwrap();
        assert_eq!(session.index(), 0);
        assert!(session.answers().is_empty());

        h.engine.start_session(&alice()).await.unwrap();
        assert_eq!(h.engine.session(100).await.unwrap().unwrap().index(), 0);
        assert_eq!(h.records.count_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_answer_without_session_is_noop() {
        let h = harness(FakeGateway::default());

        let reply = h.engine.submit_answer(&alice(), "Beginner").await.unwrap();

        assert_eq!(reply, Reply::NoSession);
        assert!(h.sessions.is_empty());
        assert_eq!(h.records.count_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_answer_is_not_validated_against_options() {
        let h = harness(FakeGateway::default());
        h.engine.start_session(&alice()).await.unwrap();

        h.engine.submit_answer(&alice(), "Grandmaster").await.unwrap();

        let session = h.engine.session(100).await.unwrap().unwrap();
        assert_eq!(session.answers().get("experience"), Some("Grandmaster"));
    }

    #[tokio::test]
    async fn test_full_flow_persists_record_and_mints_invite() {
        let h = harness(FakeGateway::default());
        h.engine.start_session(&alice()).await.unwrap();

        let mut last = Reply::NoSession;
        for option in ["Intermediate", "Trading", "5–10 hrs", "Yes"] {
            last = h.engine.submit_answer(&alice(), option).await.unwrap();
        }

        let Reply::Finished(result) = last else {
            panic!("expected finish, got {last:?}");
        };
        let record = h.records.get(100).await.unwrap().unwrap();
        assert_eq!(
            record.answers.as_ref().unwrap().to_json().unwrap(),
            r#"{"experience":"Intermediate","interest":"Trading","time":"5–10 hrs","rules":"Yes"}"#
        );
        assert!(!record.joined);
        assert_eq!(record.username.as_deref(), Some("alice"));
        assert_eq!(result.invite.member_limit, 1);
        assert_eq!(result.invite.expires_at.timestamp() - record.created_at, 600);
        assert_eq!(h.gateway.invites.lock().unwrap().len(), 1);

        assert!(h.engine.session(100).await.unwrap().is_none());
        assert_eq!(h.engine.submit_answer(&alice(), "Yes").await.unwrap(), Reply::NoSession);
        assert_eq!(h.records.count_all().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_record_keeps_handle_from_last_answer() {
        let h = harness(FakeGateway::default());
        let renamed = UserRef::new(100, None);
        h.engine.start_session(&alice()).await.unwrap();
        for option in ["Beginner", "Learning", "< 5 hrs"] {
            h.engine.submit_answer(&alice(), option).await.unwrap();
        }

        // Handle dropped right before the last answer
        h.engine.submit_answer(&renamed, "Yes").await.unwrap();

        let record = h.records.get(100).await.unwrap().unwrap();
        assert_eq!(record.username, None);
    }

    #[tokio::test]
    async fn test_existing_active_member_short_circuits() {
        let h = harness(FakeGateway {
            status: Mutex::new(Some(MemberStatus::Member)),
            ..Default::default()
        });
        let record = UserRecord {
            user_id: 100,
            username: Some("alice".to_string()),
            answers: Some([("rules", "Yes")].into_iter().collect()),
            joined: true,
            created_at: 1,
        };
        h.records.upsert(record.clone()).await.unwrap();

        let reply = h.engine.start_session(&alice()).await.unwrap();

        assert_eq!(reply, Reply::AlreadyMember);
        assert!(h.sessions.is_empty());
        assert_eq!(h.records.get(100).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_member_without_record_still_onboards() {
        let h = harness(FakeGateway {
            status: Mutex::new(Some(MemberStatus::Member)),
            ..Default::default()
        });

        let reply = h.engine.start_session(&alice()).await.unwrap();

        assert!(matches!(reply, Reply::Question(_)));
    }

    #[tokio::test]
    async fn test_record_but_lookup_failure_starts_flow() {
        let h = harness(FakeGateway::default());
        h.records
            .upsert(UserRecord {
                user_id: 100,
                username: None,
                answers: None,
                joined: false,
                created_at: 1,
            })
            .await
            .unwrap();

        let reply = h.engine.start_session(&alice()).await.unwrap();

        assert!(matches!(reply, Reply::Question(_)));
        assert_eq!(h.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_invite_failure_keeps_record() {
        let h = harness(FakeGateway {
            fail_invites: true,
            ..Default::default()
        });
        h.engine.start_session(&alice()).await.unwrap();
        for option in ["Beginner", "Learning", "< 5 hrs"] {
            h.engine.submit_answer(&alice(), option).await.unwrap();
        }

        let err = h.engine.submit_answer(&alice(), "Yes").await.unwrap_err();

        assert!(matches!(err, OnboardingError::Invite(_)));
        assert!(h.records.get(100).await.unwrap().is_some());
        assert!(h.sessions.is_empty());
    }
}
