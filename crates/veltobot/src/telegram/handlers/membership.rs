use teloxide::prelude::*;
use teloxide::types::{ChatMemberUpdated, ParseMode};

use veltocore::membership::ReconcileOutcome;

use super::types::{membership_event, HandlerDeps, HandlerError};
use crate::telegram::messages;

/// Applies a join/leave to the stored record and greets new members in the group.
pub async fn handle_chat_member(bot: &Bot, update: &ChatMemberUpdated, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(event) = membership_event(update) else {
        return Ok(());
    };

    match deps.reconciler.on_membership_changed(&event).await {
        Ok(ReconcileOutcome::Welcomed {
            user_id, display_name, ..
        }) => {
            bot.send_message(ChatId(deps.group_id), messages::welcome(user_id, &display_name))
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Ok(_) => {}
        Err(e) => log::error!("Failed to reconcile membership of user {}: {}", event.user_id, e),
    }
    Ok(())
}
