//! Shared setup for the end-to-end tests: a full system on a hand-driven clock with a
//! seeded lottery and a sink that records every delivered notification.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use outreach_allocator::clock::ManualClock;
use outreach_allocator::config::AllocatorConfig;
use outreach_allocator::lifecycle::OutreachSystem;
use outreach_allocator::model::{
    Capability, InventoryItemCreate, ItemId, OrderLine, RoundCreate, RoundId, UserCreate, UserId,
};
use outreach_allocator::notification::{
    Notification, NotificationError, NotificationKind, NotificationSink,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<(String, Notification)>>,
}

impl RecordingSink {
    pub fn delivered(&self) -> Vec<(String, Notification)> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn count_of(&self, kind: NotificationKind) -> usize {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, n)| n.kind == kind)
            .count()
    }

    /// The worker runs on its own task; poll until `expected` notifications of `kind` arrived.
    pub async fn wait_for(&self, kind: NotificationKind, expected: usize) -> usize {
        for _ in 0..100 {
            if self.count_of(kind) >= expected {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        self.count_of(kind)
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(
        &self,
        address: &str,
        notification: &Notification,
    ) -> Result<(), NotificationError> {
        self.delivered
            .lock()
            .unwrap()
            .push((address.to_string(), notification.clone()));
        Ok(())
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap()
}

pub struct Harness {
    pub system: OutreachSystem,
    pub clock: ManualClock,
    pub sink: Arc<RecordingSink>,
    pub staff: UserId,
}

impl Harness {
    pub async fn start() -> Self {
        Self::with_config(AllocatorConfig::default()).await
    }

    pub async fn with_config(mut config: AllocatorConfig) -> Self {
        config.signup.lottery_seed = Some(7);
        let clock = ManualClock::new(start_time());
        let sink = Arc::new(RecordingSink::default());
        let system = OutreachSystem::start(config, Arc::new(clock.clone()), sink.clone());

        let staff = system
            .users
            .create_user(
                UserCreate::volunteer("Staff", "staff@example.org")
                    .with_capability(Capability::Staff),
            )
            .await
            .expect("Failed to create staff user");

        Self {
            system,
            clock,
            sink,
            staff,
        }
    }

    pub async fn volunteer(&self, name: &str) -> UserId {
        self.user_with(name, None).await
    }

    pub async fn user_with(&self, name: &str, capability: Option<Capability>) -> UserId {
        let email = format!("{}@example.org", name.to_lowercase());
        let mut params = UserCreate::volunteer(name, email);
        if let Some(capability) = capability {
            params = params.with_capability(capability);
        }
        self.system
            .users
            .create_user(params)
            .await
            .expect("Failed to create user")
    }

    /// Schedules a three-hour round starting `starts_in` from now.
    pub async fn round(
        &self,
        max_participants: u32,
        starts_in: Duration,
        order_capacity: Option<u32>,
    ) -> RoundId {
        let starts_at = self.clock_now() + starts_in;
        self.system
            .scheduler
            .create_round(
                self.staff,
                RoundCreate {
                    title: "Evening walk".to_string(),
                    starts_at,
                    ends_at: starts_at + Duration::hours(3),
                    location: "Market square".to_string(),
                    max_participants,
                    order_capacity,
                },
            )
            .await
            .expect("Failed to create round")
    }

    pub async fn item(&self, quantity: u32) -> ItemId {
        self.system
            .inventory
            .create_item(InventoryItemCreate {
                name: "Sleeping bag".to_string(),
                size: None,
                quantity,
            })
            .await
            .expect("Failed to create item")
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        use outreach_allocator::clock::Clock;
        self.clock.now()
    }

    pub async fn shutdown(self) {
        self.system.shutdown().await.expect("Shutdown failed");
    }
}

pub fn line(item_id: ItemId, quantity: u32) -> Vec<OrderLine> {
    vec![OrderLine { item_id, quantity }]
}
