//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{ChatMemberUpdated, Message};

use super::admin::{handle_admin_command, handle_export, handle_stats};
use super::membership::handle_chat_member;
use super::onboarding::{handle_answer, handle_start_command};
use super::types::{user_ref, HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::callback::CallbackData;

/// Creates the dispatcher schema for the bot.
///
/// The Polling listener has to request `chat_member` updates explicitly or
/// the membership branch never fires.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_callback = deps.clone();
    let deps_members = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(callback_handler(deps_callback))
        .branch(chat_member_handler(deps_members))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("🎯 Received command: {:?} from chat {}", cmd, msg.chat.id);

                match cmd {
                    Command::Start => {
                        if !msg.chat.is_private() {
                            log::debug!("Ignoring /start outside a private chat ({})", msg.chat.id);
                            return Ok(());
                        }
                        handle_start_command(&bot, &msg, &deps).await?;
                    }
                    Command::Admin => {
                        handle_admin_command(&bot, &msg, &deps).await?;
                    }
                }
                Ok(())
            }
        },
    ))
}

fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            // Stop the button spinner regardless of what follows
            if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                log::warn!("Failed to answer callback query {}: {}", q.id, e);
            }

            let Some(data) = q.data.as_deref().and_then(CallbackData::parse) else {
                log::debug!("Unknown callback data: {:?}", q.data);
                return Ok(());
            };
            let Some(user) = user_ref(&q.from) else {
                return Ok(());
            };
            let chat_id = q
                .message
                .as_ref()
                .map(|m| m.chat().id)
                .unwrap_or_else(|| ChatId::from(q.from.id));

            match data {
                CallbackData::Answer(option) => handle_answer(&bot, chat_id, &user, &option, &deps).await,
                CallbackData::AdminStats => handle_stats(&bot, chat_id, user.id, &deps).await,
                CallbackData::AdminExport => handle_export(&bot, chat_id, user.id, &deps).await,
            }
        }
    })
}

fn chat_member_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_chat_member().endpoint(move |bot: Bot, update: ChatMemberUpdated| {
        let deps = deps.clone();
        async move { handle_chat_member(&bot, &update, &deps).await }
    })
}
