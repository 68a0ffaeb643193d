//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::{ChatMemberUpdated, User};

use veltocore::{AdminReporting, MembershipEvent, MembershipReconciler, OnboardingEngine, UserRef};

use crate::telegram::gateway::status_from;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub engine: Arc<OnboardingEngine>,
    pub reconciler: Arc<MembershipReconciler>,
    pub reporting: Arc<AdminReporting>,
    pub group_id: i64,
}

impl HandlerDeps {
    pub fn new(
        engine: Arc<OnboardingEngine>,
        reconciler: Arc<MembershipReconciler>,
        reporting: Arc<AdminReporting>,
        group_id: i64,
    ) -> Self {
        Self {
            engine,
            reconciler,
            reporting,
            group_id,
        }
    }
}

/// Telegram user ids fit in i64; anything else is dropped.
pub fn user_ref(user: &User) -> Option<UserRef> {
    let id = i64::try_from(user.id.0).ok()?;
    Some(UserRef::new(id, user.username.clone()))
}

pub fn membership_event(update: &ChatMemberUpdated) -> Option<MembershipEvent> {
    let user = &update.new_chat_member.user;
    Some(MembershipEvent {
        chat_id: update.chat.id.0,
        user_id: i64::try_from(user.id.0).ok()?,
        display_name: user.full_name(),
        old_status: status_from(update.old_chat_member.status()),
        new_status: status_from(update.new_chat_member.status()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use veltocore::MemberStatus;

    fn update(chat_id: i64, user_id: u64, old: &str, new: &str) -> ChatMemberUpdated {
        let user = serde_json::json!({
            "id": user_id,
            "is_bot": false,
            "first_name": "Dana",
            "last_name": "Velto",
            "username": "dana"
        });
        serde_json::from_value(serde_json::json!({
            "chat": { "id": chat_id, "type": "supergroup", "title": "Velto" },
            "from": user.clone(),
            "date": 1_700_000_000,
            "old_chat_member": { "user": user.clone(), "status": old },
            "new_chat_member": { "user": user, "status": new }
        }))
        .unwrap()
    }

    #[test]
    fn test_membership_event_from_join() {
        let event = membership_event(&update(-1001234567890, 42, "left", "member")).unwrap();

        assert_eq!(event.chat_id, -1001234567890);
        assert_eq!(event.user_id, 42);
        assert_eq!(event.display_name, "Dana Velto");
        assert_eq!(event.old_status, MemberStatus::Left);
        assert_eq!(event.new_status, MemberStatus::Member);
    }

    #[test]
    fn test_membership_event_from_leave() {
        let event = membership_event(&update(-100, 7, "member", "left")).unwrap();
        assert_eq!(event.old_status, MemberStatus::Member);
        assert_eq!(event.new_status, MemberStatus::Left);
    }
}
