//! Inline keyboards for the questionnaire and the admin dashboard

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use veltocore::onboarding::Prompt;

use super::callback::CallbackData;

fn cb(text: impl Into<String>, data: &CallbackData) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text.into(), data.encode())
}

/// One button per option, one option per row.
pub fn question_keyboard(prompt: &Prompt) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        prompt
            .options
            .iter()
            .map(|option| vec![cb(option.clone(), &CallbackData::Answer(option.clone()))]),
    )
}

pub fn admin_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![cb("📊 Stats", &CallbackData::AdminStats)],
        vec![cb("📁 Export CSV", &CallbackData::AdminExport)],
    ])
}
