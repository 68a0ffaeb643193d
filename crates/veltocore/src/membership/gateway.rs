//! Transport capability: membership lookup and invite minting for the group

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::status::MemberStatus;

/// Failure at the transport boundary.
///
/// Callers decide what a failure means; the engine and the admin check both
/// collapse it to "not a member" / "not an admin".
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The transport has no membership entry for the user
    #[error("user {0} not found in group")]
    UserNotFound(i64),

    /// The request itself failed (network, API error, ...)
    #[error("transport request failed: {0}")]
    Request(String),
}

#[cfg(feature = "telegram")]
impl From<teloxide::RequestError> for GatewayError {
    fn from(err: teloxide::RequestError) -> Self {
        GatewayError::Request(err.to_string())
    }
}

/// A membership-limited, time-expiring invite link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteLink {
    pub url: String,
    pub member_limit: u32,
    pub expires_at: DateTime<Utc>,
}

/// Group-scoped operations the core needs from the chat transport.
#[async_trait]
pub trait GroupGateway: Send + Sync {
    /// Current status of `user_id` in the group.
    async fn member_status(&self, user_id: i64) -> Result<MemberStatus, GatewayError>;

    /// Mints an invite usable by `member_limit` people until `expires_at`.
    async fn create_invite(&self, member_limit: u32, expires_at: DateTime<Utc>) -> Result<InviteLink, GatewayError>;
}
