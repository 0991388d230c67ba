use crate::model::{OrderId, Requester, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The identity an order-creation budget is tracked against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateLimitKey {
    User(UserId),
    Ip(String),
}

impl From<&Requester> for RateLimitKey {
    fn from(requester: &Requester) -> Self {
        match requester {
            Requester::User(id) => RateLimitKey::User(*id),
            Requester::Guest { ip } => RateLimitKey::Ip(ip.trim().to_string()),
        }
    }
}

impl Display for RateLimitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateLimitKey::User(id) => write!(f, "{}", id),
            RateLimitKey::Ip(ip) => write!(f, "ip:{}", ip),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitRecord {
    pub key: RateLimitKey,
    pub recorded_at: DateTime<Utc>,
    pub order_id: OrderId,
}
