//! Best-effort one-time code notification after a successful login.
//!
//! The request path only enqueues the recipient. A detached worker generates
//! the code and sends the email; its failures are logged and dropped.

mod mailer;
pub mod otp;

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

pub use mailer::{MailConfig, MailEncryption, Mailer, SmtpMailer};

const QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("could not generate one-time code: {0}")]
    Code(String),

    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Handle to the notification worker. Cheap to clone.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<String>,
}

impl Notifier {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(mailer: Arc<dyn Mailer>) -> Self {
        Self::spawn_with_capacity(mailer, QUEUE_CAPACITY)
    }

    fn spawn_with_capacity(mailer: Arc<dyn Mailer>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        tokio::spawn(run_worker(mailer, rx));
        Self { tx }
    }

    /// Queue a code for `recipient` without waiting. Returns whether it was queued.
    pub fn notify(&self, recipient: &str) -> bool {
        match self.tx.try_send(recipient.to_string()) {
            Ok(()) => true,
            Err(TrySendError::Full(recipient)) => {
                tracing::warn!("Notification queue full, dropping code for {}", recipient);
                false
            }
            Err(TrySendError::Closed(recipient)) => {
                tracing::error!("Notification worker gone, dropping code for {}", recipient);
                false
            }
        }
    }
}

async fn run_worker(mailer: Arc<dyn Mailer>, mut rx: mpsc::Receiver<String>) {
    while let Some(recipient) = rx.recv().await {
        if let Err(e) = deliver(mailer.as_ref(), &recipient).await {
            tracing::error!("Failed to send one-time code to {}: {}", recipient, e);
        }
    }
    tracing::debug!("Notification worker stopped");
}

async fn deliver(mailer: &dyn Mailer, recipient: &str) -> Result<(), NotifyError> {
    let code = otp::generate_code()?;
    mailer.send_code(recipient, &code).await?;
    tracing::info!("Sent one-time code to {}", recipient);
    Ok(())
}
