//! Membership reconciler - keeps the `joined` flag in step with the group

use std::sync::Arc;

use super::status::MemberStatus;
use crate::core::AppResult;
use crate::storage::RecordStore;

/// A membership change reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipEvent {
    pub chat_id: i64,
    pub user_id: i64,
    /// Human-readable name for the welcome message
    pub display_name: String,
    pub old_status: MemberStatus,
    pub new_status: MemberStatus,
}

/// What the reconciler did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Different chat or a status we don't track; nothing was touched
    Ignored,
    /// Marked as joined; the transport should greet the user
    Welcomed {
        user_id: i64,
        display_name: String,
        record_found: bool,
    },
    /// Marked as not joined
    MarkedLeft { user_id: i64, record_found: bool },
}

/// Applies join/leave events to stored records.
///
/// Only ever updates the flag on an existing record; records are created by
/// the onboarding finalize step alone. Applying the same event twice leaves
/// the same state.
pub struct MembershipReconciler {
    records: Arc<dyn RecordStore>,
    group_id: i64,
}

impl MembershipReconciler {
    pub fn new(records: Arc<dyn RecordStore>, group_id: i64) -> Self {
        Self { records, group_id }
    }

    pub fn group_id(&self) -> i64 {
        self.group_id
    }

    pub async fn on_membership_changed(&self, event: &MembershipEvent) -> AppResult<ReconcileOutcome> {
        if event.chat_id != self.group_id {
            log::debug!(
                "Ignoring membership change in chat {} (watching {})",
                event.chat_id,
                self.group_id
            );
            return Ok(ReconcileOutcome::Ignored);
        }

        match event.new_status {
            MemberStatus::Member => {
                let touched = self.records.set_joined(event.user_id, true).await?;
                log::info!(
                    "User {} joined the group ({} -> member, record found: {})",
                    event.user_id,
                    event.old_status,
                    touched > 0
                );
                Ok(ReconcileOutcome::Welcomed {
                    user_id: event.user_id,
                    display_name: event.display_name.clone(),
                    record_found: touched > 0,
                })
            }
            status if status.is_gone() => {
                let touched = self.records.set_joined(event.user_id, false).await?;
                log::info!(
                    "User {} left the group ({} -> {}, record found: {})",
                    event.user_id,
                    event.old_status,
                    status,
                    touched > 0
                );
                Ok(ReconcileOutcome::MarkedLeft {
                    user_id: event.user_id,
                    record_found: touched > 0,
                })
            }
            other => {
                log::debug!("Ignoring status change to {} for user {}", other, event.user_id);
                Ok(ReconcileOutcome::Ignored)
            }
        }
    }
}
