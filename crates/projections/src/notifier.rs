//! Outbound notification collaborator.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{ProjectionError, Result};

/// Sends a message to a customer. Delivery is fire-and-forget.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: &str, subject: &str, body: &str) -> Result<()>;
}

/// A sent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub email: String,
    pub subject: String,
    pub body: String,
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send(&self, email: &str, subject: &str, body: &str) -> Result<()> {
        tracing::info!(%email, %subject, %body, "notification");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Outbox {
    sent: Vec<Notification>,
    failing: bool,
}

/// Keeps sent notifications in memory, for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    outbox: Arc<RwLock<Outbox>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.outbox.read().await.sent.clone()
    }

    /// Makes every following send fail.
    pub async fn set_failing(&self, failing: bool) {
        self.outbox.write().await.failing = failing;
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn send(&self, email: &str, subject: &str, body: &str) -> Result<()> {
        let mut outbox = self.outbox.write().await;
        if outbox.failing {
            return Err(ProjectionError::Notification(format!(
                "mail server rejected message to {email}"
            )));
        }
        outbox.sent.push(Notification {
            email: email.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
