//! User-facing texts

use indoc::formatdoc;
use teloxide::utils::html;

use veltocore::onboarding::OnboardingError;
use veltocore::{InviteLink, Stats};

pub const ALREADY_MEMBER: &str = "✅ You are already in Velto.";
pub const ADMIN_DASHBOARD: &str = "🛠 Admin Dashboard";
pub const START_FAILED: &str = "⚠️ Something went wrong. Please send /start again in a moment.";

pub fn approved(invite: &InviteLink) -> String {
    formatdoc! {"
        🎉 Approved!

        Here is your private invite link:

        {url}

        It works once and expires at {expires} UTC.",
        url = invite.url,
        expires = invite.expires_at.format("%H:%M"),
    }
}

/// Shown when the questionnaire could not be completed.
pub fn finalize_failed(err: &OnboardingError) -> String {
    match err {
        OnboardingError::Store(_) | OnboardingError::Session(_) => {
            "⚠️ We couldn't save your answers. Please send /start to try again.".to_string()
        }
        OnboardingError::Invite(_) => {
            "⚠️ Your answers are saved, but we couldn't create an invite link. Please send /start to try again."
                .to_string()
        }
    }
}

pub fn stats(stats: &Stats) -> String {
    formatdoc! {"
        📊 Stats

        Total users: {total}
        Joined: {joined}
        Not joined: {not_joined}
        Join rate: {rate:.1}%",
        total = stats.total,
        joined = stats.joined,
        not_joined = stats.not_joined(),
        rate = stats.join_rate(),
    }
}

/// HTML, send with `ParseMode::Html`.
pub fn welcome(user_id: i64, display_name: &str) -> String {
    format!(
        "🎉 Welcome <a href=\"tg://user?id={}\">{}</a> to Velto!",
        user_id,
        html::escape(display_name)
    )
}
