//! /start and questionnaire answers

use teloxide::prelude::*;

use veltocore::{OnboardingError, Reply, UserRef};

use super::types::{user_ref, HandlerDeps, HandlerError};
use crate::telegram::keyboard::question_keyboard;
use crate::telegram::messages;

pub async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(user) = msg.from.as_ref().and_then(user_ref) else {
        return Ok(());
    };
    log::info!("/start from user {} in chat {}", user.id, msg.chat.id);

    match deps.engine.start_session(&user).await {
        Ok(reply) => send_reply(bot, msg.chat.id, &user, reply).await,
        Err(e) => {
            log::error!("Failed to start onboarding for user {}: {}", user.id, e);
            bot.send_message(msg.chat.id, messages::START_FAILED).await?;
            Ok(())
        }
    }
}

pub async fn handle_answer(
    bot: &Bot,
    chat_id: ChatId,
    user: &UserRef,
    option: &str,
    deps: &HandlerDeps,
) -> Result<(), HandlerError> {
    log::info!("Answer {:?} from user {}", option, user.id);

    match deps.engine.submit_answer(user, option).await {
        Ok(reply) => send_reply(bot, chat_id, user, reply).await,
        Err(e) => report_failure(bot, chat_id, user, &e).await,
    }
}

async fn send_reply(bot: &Bot, chat_id: ChatId, user: &UserRef, reply: Reply) -> Result<(), HandlerError> {
    match reply {
        Reply::Question(prompt) => {
            bot.send_message(chat_id, prompt.text.clone())
                .reply_markup(question_keyboard(&prompt))
                .await?;
        }
        Reply::AlreadyMember => {
            bot.send_message(chat_id, messages::ALREADY_MEMBER).await?;
        }
        Reply::Finished(result) => {
            log::info!("User {} approved, invite expires at {}", user.id, result.invite.expires_at);
            bot.send_message(chat_id, messages::approved(&result.invite)).await?;
        }
        Reply::NoSession => {
            log::debug!("Dropping answer from user {} without a session", user.id);
        }
    }
    Ok(())
}

async fn report_failure(bot: &Bot, chat_id: ChatId, user: &UserRef, err: &OnboardingError) -> Result<(), HandlerError> {
    log::error!("Onboarding failed for user {}: {}", user.id, err);
    bot.send_message(chat_id, messages::finalize_failed(err)).await?;
    Ok(())
}
