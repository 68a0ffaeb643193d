//! `GroupGateway` backed by the Telegram Bot API

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use teloxide::prelude::*;
use teloxide::types::ChatMemberStatus;
use teloxide::{ApiError, RequestError};

use veltocore::{GatewayError, GroupGateway, InviteLink, MemberStatus};

/// Maps Telegram's member status onto the core's status set.
pub fn status_from(status: ChatMemberStatus) -> MemberStatus {
    match status {
        ChatMemberStatus::Owner => MemberStatus::Creator,
        ChatMemberStatus::Administrator => MemberStatus::Administrator,
        ChatMemberStatus::Member => MemberStatus::Member,
        ChatMemberStatus::Restricted => MemberStatus::Restricted,
        ChatMemberStatus::Left => MemberStatus::Left,
        ChatMemberStatus::Banned => MemberStatus::Kicked,
    }
}

fn user_id_from(user_id: i64) -> Result<UserId, GatewayError> {
    u64::try_from(user_id)
        .map(UserId)
        .map_err(|_| GatewayError::UserNotFound(user_id))
}

/// Gateway scoped to the one managed group.
#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
    group_id: ChatId,
}

impl TelegramGateway {
    pub fn new(bot: Bot, group_id: i64) -> Self {
        Self {
            bot,
            group_id: ChatId(group_id),
        }
    }
}

#[async_trait]
impl GroupGateway for TelegramGateway {
    async fn member_status(&self, user_id: i64) -> Result<MemberStatus, GatewayError> {
        let member = self
            .bot
            .get_chat_member(self.group_id, user_id_from(user_id)?)
            .await
            .map_err(|e| match e {
                RequestError::Api(ApiError::UserNotFound) => GatewayError::UserNotFound(user_id),
                other => GatewayError::from(other),
            })?;
        Ok(status_from(member.status()))
    }

    async fn create_invite(&self, member_limit: u32, expires_at: DateTime<Utc>) -> Result<InviteLink, GatewayError> {
        let link = self
            .bot
            .create_chat_invite_link(self.group_id)
            .member_limit(member_limit)
            .expire_date(expires_at)
            .await?;
        Ok(InviteLink {
            url: link.invite_link,
            member_limit,
            expires_at,
        })
    }
}
