use crate::clients::OrderClient;
use crate::clock::Clock;
use crate::config::RateLimitConfig;
use crate::error::AllocationError;
use crate::model::{OrderId, RateLimitKey, RateLimitRecord, Requester, UserId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Rolling-window throttle on order creation.
///
/// Records are kept per identity in arrival order, so expiry is a pop from the front.
/// Check and record are separate calls: two concurrent submissions from one identity can
/// both pass the check. The thresholds are a soft limit under that race.
#[derive(Clone)]
pub struct RateLimiter {
    records: Arc<DashMap<RateLimitKey, VecDeque<RateLimitRecord>>>,
    orders: OrderClient,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

struct Limits {
    per_window: usize,
    max_pending: usize,
}

impl RateLimiter {
    pub fn new(orders: OrderClient, config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            orders,
            config,
            clock,
        }
    }

    #[instrument(skip(self))]
    pub async fn check_user_rate_limit(&self, user_id: UserId) -> Result<(), AllocationError> {
        let limits = Limits {
            per_window: self.config.user_orders_per_window,
            max_pending: self.config.user_max_pending,
        };
        self.check(RateLimitKey::User(user_id), limits).await
    }

    /// Blank or missing IPs are rejected as invalid input.
    #[instrument(skip(self))]
    pub async fn check_guest_rate_limit(&self, ip: &str) -> Result<(), AllocationError> {
        let ip = ip.trim();
        if ip.is_empty() {
            return Err(AllocationError::InvalidInput(
                "guest requests need a client IP".into(),
            ));
        }
        let limits = Limits {
            per_window: self.config.guest_orders_per_window,
            max_pending: self.config.guest_max_pending,
        };
        self.check(RateLimitKey::Ip(ip.to_string()), limits).await
    }

    /// Dispatches to the user or guest check.
    pub async fn check_requester(&self, requester: &Requester) -> Result<(), AllocationError> {
        match requester {
            Requester::User(user_id) => self.check_user_rate_limit(*user_id).await,
            Requester::Guest { ip } => self.check_guest_rate_limit(ip).await,
        }
    }

    #[instrument(skip(self))]
    pub fn record_order_creation(&self, key: RateLimitKey, order_id: OrderId) {
        let record = RateLimitRecord {
            key: key.clone(),
            recorded_at: self.clock.now(),
            order_id,
        };
        self.records.entry(key).or_default().push_back(record);
    }

    /// Drops records older than the retention window. Returns how many were removed.
    #[instrument(skip(self))]
    pub fn cleanup_old_records(&self) -> usize {
        let cutoff = self.clock.now() - self.config.retention();
        let mut removed = 0;
        self.records.retain(|_, records| {
            removed += expire(records, cutoff);
            !records.is_empty()
        });
        info!(removed, identities = self.records.len(), "Rate-limit records cleaned up");
        removed
    }

    async fn check(&self, key: RateLimitKey, limits: Limits) -> Result<(), AllocationError> {
        let since = self.clock.now() - self.config.window();
        let recent = self.recent_count(&key, since);
        if recent >= limits.per_window {
            warn!(%key, recent, "Order rate limit hit");
            return Err(AllocationError::RateLimitExceeded(format!(
                "{} orders in the last {} minutes (limit {})",
                recent,
                self.config.window().num_minutes(),
                limits.per_window
            )));
        }

        let pending = self.orders.pending_count_for(&key).await?;
        if pending >= limits.max_pending {
            warn!(%key, pending, "Pending order limit hit");
            return Err(AllocationError::RateLimitExceeded(format!(
                "{} pending orders (limit {})",
                pending, limits.max_pending
            )));
        }
        debug!(%key, recent, pending, "Within limits");
        Ok(())
    }

    fn recent_count(&self, key: &RateLimitKey, since: DateTime<Utc>) -> usize {
        self.records
            .get(key)
            .map(|records| records.iter().filter(|r| r.recorded_at > since).count())
            .unwrap_or(0)
    }
}

/// Pops records at or before `cutoff` off the front.
fn expire(records: &mut VecDeque<RateLimitRecord>, cutoff: DateTime<Utc>) -> usize {
    let mut removed = 0;
    while records.front().is_some_and(|r| r.recorded_at <= cutoff) {
        records.pop_front();
        removed += 1;
    }
    removed
}
