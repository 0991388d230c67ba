//! # Outbound Notifications
//!
//! Allocation code publishes [`Notification`]s onto a bounded queue and moves on. A separate
//! [`NotificationWorker`] task resolves each recipient's contact address and hands the message
//! to a [`NotificationSink`]. Nothing on the allocation path waits on, or fails because of,
//! delivery.

use crate::clients::UserClient;
use crate::model::{RoundSummary, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    SignupConfirmed,
    SignupWaitlisted,
    RoundCanceled,
    /// Promoted from the waitlist by a lottery run.
    LotteryWon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub recipient: UserId,
    pub round: RoundSummary,
}

impl Notification {
    pub fn new(kind: NotificationKind, recipient: UserId, round: RoundSummary) -> Self {
        Self {
            kind,
            recipient,
            round,
        }
    }

    pub fn subject(&self) -> String {
        let headline = match self.kind {
            NotificationKind::SignupConfirmed => "You're confirmed for",
            NotificationKind::SignupWaitlisted => "You're on the waitlist for",
            NotificationKind::RoundCanceled => "Canceled:",
            NotificationKind::LotteryWon => "You've been selected for",
        };
        format!(
            "{} {} ({} at {})",
            headline,
            self.round.title,
            self.round.starts_at.format("%Y-%m-%d %H:%M"),
            self.round.location
        )
    }
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Where notifications end up (mail relay, push gateway, ...).
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(
        &self,
        address: &str,
        notification: &Notification,
    ) -> Result<(), NotificationError>;
}

/// Writes every notification to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSink;

#[async_trait]
impl NotificationSink for LoggingSink {
    async fn deliver(
        &self,
        address: &str,
        notification: &Notification,
    ) -> Result<(), NotificationError> {
        info!(to = address, kind = ?notification.kind, round_id = %notification.round.round_id, subject = %notification.subject(), "Notification");
        Ok(())
    }
}

/// Publishing half of the notification queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    sender: mpsc::Sender<Notification>,
}

impl NotificationQueue {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Never blocks. A full or closed queue drops the notification with a warning.
    pub fn publish(&self, notification: Notification) {
        let recipient = notification.recipient;
        let kind = notification.kind;
        match self.sender.try_send(notification) {
            Ok(()) => debug!(%recipient, ?kind, "Notification queued"),
            Err(e) => warn!(%recipient, ?kind, error = %e, "Dropped notification (queue full/closed)"),
        }
    }
}

/// Drains the queue until every [`NotificationQueue`] clone is dropped.
pub struct NotificationWorker {
    receiver: mpsc::Receiver<Notification>,
    users: UserClient,
    sink: Arc<dyn NotificationSink>,
}

impl NotificationWorker {
    pub fn new(
        receiver: mpsc::Receiver<Notification>,
        users: UserClient,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            receiver,
            users,
            sink,
        }
    }

    pub async fn run(mut self) {
        info!("Notification worker started");
        let mut delivered = 0usize;
        while let Some(notification) = self.receiver.recv().await {
            let address = match self.users.contact_email(notification.recipient).await {
                Ok(address) => address,
                Err(e) => {
                    warn!(recipient = %notification.recipient, error = %e, "No contact address");
                    continue;
                }
            };
            match self.sink.deliver(&address, &notification).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!(recipient = %notification.recipient, error = %e, "Notification delivery failed"),
            }
        }
        info!(delivered, "Notification worker stopped");
    }
}
