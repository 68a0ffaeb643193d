//! Admin dashboard: /admin, stats and CSV export
//!
//! Every entry point re-checks the invoker against the live group; denied
//! requests get no reply at all.

use teloxide::prelude::*;
use teloxide::types::InputFile;

use super::types::{HandlerDeps, HandlerError};
use crate::telegram::export::{render_csv, EXPORT_FILE_NAME};
use crate::telegram::keyboard::admin_keyboard;
use crate::telegram::messages;

pub async fn handle_admin_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(invoker) = msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok()) else {
        return Ok(());
    };

    if !deps.reporting.is_admin(invoker).await {
        log::info!("Ignoring /admin from non-admin {}", invoker);
        return Ok(());
    }

    bot.send_message(msg.chat.id, messages::ADMIN_DASHBOARD)
        .reply_markup(admin_keyboard())
        .await?;
    Ok(())
}

pub async fn handle_stats(bot: &Bot, chat_id: ChatId, invoker: i64, deps: &HandlerDeps) -> Result<(), HandlerError> {
    match deps.reporting.stats(invoker).await {
        Ok(Some(stats)) => {
            log::info!("Stats requested by admin {}: {}/{}", invoker, stats.joined, stats.total);
            bot.send_message(chat_id, messages::stats(&stats)).await?;
        }
        Ok(None) => log::info!("Ignoring stats request from non-admin {}", invoker),
        Err(e) => log::error!("Failed to compute stats for {}: {}", invoker, e),
    }
    Ok(())
}

pub async fn handle_export(bot: &Bot, chat_id: ChatId, invoker: i64, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let records = match deps.reporting.export_all(invoker).await {
        Ok(Some(records)) => records,
        Ok(None) => {
            log::info!("Ignoring export request from non-admin {}", invoker);
            return Ok(());
        }
        Err(e) => {
            log::error!("Failed to export records for {}: {}", invoker, e);
            return Ok(());
        }
    };

    log::info!("Exporting {} records for admin {}", records.len(), invoker);
    let csv = render_csv(&records);
    bot.send_document(chat_id, InputFile::memory(csv.into_bytes()).file_name(EXPORT_FILE_NAME))
        .await?;
    Ok(())
}
