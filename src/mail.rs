//! Outbound email, decoupled from request handling.
//!
//! Handlers push an [`OutboundEmail`] onto a bounded [`MailQueue`] and return
//! immediately. A background worker drains the queue and hands each email to a
//! [`Mailer`], retrying failed deliveries. Nothing on this path can fail a
//! request: a full queue or an exhausted retry budget is only logged.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};

use crate::config::MailConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> anyhow::Result<()>;
}

/// Writes emails to the log instead of delivering them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> anyhow::Result<()> {
        tracing::info!(to = %email.to, subject = %email.subject, body = %email.body, "email (log only)");
        Ok(())
    }
}

/// Posts emails as JSON to an HTTP relay.
pub struct HttpMailer {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    from: String,
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl HttpMailer {
    pub fn new(url: String, api_key: Option<String>, from: String) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url,
            api_key,
            from,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutboundEmail) -> anyhow::Result<()> {
        let payload = RelayPayload {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            text: &email.body,
        };
        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        request.send().await?.error_for_status()?;
        Ok(())
    }
}

pub fn mailer_from_config(config: &MailConfig) -> anyhow::Result<Arc<dyn Mailer>> {
    match &config.api_url {
        Some(url) => Ok(Arc::new(HttpMailer::new(
            url.clone(),
            config.api_key.clone(),
            config.from.clone(),
        )?)),
        None => {
            tracing::warn!("MAIL_API_URL not set; emails will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Sending half of the mail channel, cheap to clone into application state.
#[derive(Clone)]
pub struct MailQueue {
    sender: mpsc::Sender<OutboundEmail>,
}

impl MailQueue {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<OutboundEmail>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Never blocks and never fails the caller.
    pub fn enqueue(&self, email: OutboundEmail) {
        match self.sender.try_send(email) {
            Ok(()) => {}
            Err(TrySendError::Full(email)) => {
                tracing::warn!(to = %email.to, subject = %email.subject, "mail queue full, email dropped");
            }
            Err(TrySendError::Closed(email)) => {
                tracing::warn!(to = %email.to, subject = %email.subject, "mail worker stopped, email dropped");
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before attempt `n + 1` is `backoff * n`.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Duration::from_millis(500),
        }
    }
}

pub fn spawn_mail_worker(
    mut receiver: mpsc::Receiver<OutboundEmail>,
    mailer: Arc<dyn Mailer>,
    policy: RetryPolicy,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(email) = receiver.recv().await {
            deliver(mailer.as_ref(), &email, policy).await;
        }
        tracing::debug!("mail queue closed, worker exiting");
    })
}

/// Returns whether the email was delivered within the retry budget.
pub async fn deliver(mailer: &dyn Mailer, email: &OutboundEmail, policy: RetryPolicy) -> bool {
    for attempt in 1..=policy.max_attempts {
        match mailer.send(email).await {
            Ok(()) => {
                tracing::debug!(to = %email.to, attempt, "email sent");
                return true;
            }
            Err(err) if attempt < policy.max_attempts => {
                tracing::warn!(to = %email.to, attempt, error = %err, "email send failed, retrying");
                tokio::time::sleep(policy.backoff * attempt).await;
            }
            Err(err) => {
                tracing::warn!(to = %email.to, attempt, error = %err, "email send failed, giving up");
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Flaky {
        failures_left: AtomicU32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Mailer for Flaky {
        async fn send(&self, _email: &OutboundEmail) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                anyhow::bail!("relay unavailable");
            }
            Ok(())
        }
    }

    fn email() -> OutboundEmail {
        OutboundEmail {
            to: "ann@x.com".into(),
            subject: "Hi".into(),
            body: "Hello".into(),
        }
    }

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn retries_until_delivered() {
        let mailer = Flaky {
            failures_left: AtomicU32::new(2),
            calls: AtomicU32::new(0),
        };
        assert!(deliver(&mailer, &email(), fast(3)).await);
        assert_eq!(mailer.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_budget() {
        let mailer = Flaky {
            failures_left: AtomicU32::new(10),
            calls: AtomicU32::new(0),
        };
        assert!(!deliver(&mailer, &email(), fast(2)).await);
        assert_eq!(mailer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn full_queue_drops_without_blocking() {
        let (queue, mut receiver) = MailQueue::channel(1);
        queue.enqueue(email());
        queue.enqueue(email());
        assert_eq!(receiver.recv().await, Some(email()));
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn worker_drains_queue() {
        let mailer = Arc::new(Flaky {
            failures_left: AtomicU32::new(0),
            calls: AtomicU32::new(0),
        });
        let (queue, receiver) = MailQueue::channel(4);
        let handle = spawn_mail_worker(receiver, mailer.clone(), fast(1));
        queue.enqueue(email());
        queue.enqueue(email());
        drop(queue);
        handle.await.unwrap();
        assert_eq!(mailer.calls.load(Ordering::SeqCst), 2);
    }
}
