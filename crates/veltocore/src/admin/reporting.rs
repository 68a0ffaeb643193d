//! Admin reporting: admin check, aggregate stats and full export
//!
//! Every report first checks that the invoker is an admin of the group.
//! Denied calls return `Ok(None)` without reading the store.

use std::sync::Arc;

use crate::core::AppResult;
use crate::membership::GroupGateway;
use crate::storage::{RecordStore, UserRecord};

/// Aggregate counts over all records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: u64,
    pub joined: u64,
}

impl Stats {
    /// Completed the questionnaire but not (or no longer) in the group
    pub fn not_joined(&self) -> u64 {
        self.total.saturating_sub(self.joined)
    }

    /// Share of onboarded users currently in the group, in percent
    pub fn join_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.joined as f64 * 100.0 / self.total as f64
        }
    }
}

pub struct AdminReporting {
    records: Arc<dyn RecordStore>,
    gateway: Arc<dyn GroupGateway>,
}

impl AdminReporting {
    pub fn new(records: Arc<dyn RecordStore>, gateway: Arc<dyn GroupGateway>) -> Self {
        Self { records, gateway }
    }

    /// True iff the user is an administrator or the creator of the group.
    /// Any lookup failure means "not an admin".
    pub async fn is_admin(&self, user_id: i64) -> bool {
        match self.gateway.member_status(user_id).await {
            Ok(status) => status.is_admin(),
            Err(e) => {
                log::debug!("Admin lookup for user {} failed, denying: {}", user_id, e);
                false
            }
        }
    }

    pub async fn stats(&self, invoker: i64) -> AppResult<Option<Stats>> {
        if !self.is_admin(invoker).await {
            return Ok(None);
        }

        let total = self.records.count_all().await?;
        let joined = self.records.count_joined().await?;
        log::info!("Admin {} requested stats: total={}, joined={}", invoker, total, joined);
        // Two separate reads; clamp in case a join landed in between
        Ok(Some(Stats {
            total,
            joined: joined.min(total),
        }))
    }

    /// All records in store-native order, for an external formatter.
    pub async fn export_all(&self, invoker: i64) -> AppResult<Option<Vec<UserRecord>>> {
        if !self.is_admin(invoker).await {
            return Ok(None);
        }

        let records = self.records.all().await?;
        log::info!("Admin {} exported {} records", invoker, records.len());
        Ok(Some(records))
    }
}
