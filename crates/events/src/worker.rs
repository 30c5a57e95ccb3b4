//! Background consumer for the notification queue.
//!
//! [`NotificationWorker`] receives [`NotificationTask`]s, fans each one out
//! into one [`OfficerMessage`] per assigned officer, and delivers them through
//! a [`NotificationSink`]. Transient failures are retried with linear backoff;
//! a message that still fails is logged and dropped. The loop ends when every
//! queue handle has been dropped or the cancellation token fires.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::queue::NotificationTask;
use crate::sink::{DeliveryError, NotificationSink, OfficerMessage};

/// Delivery attempts per message, including the first.
pub const MAX_DELIVERY_ATTEMPTS: u32 = 3;

/// Base delay between attempts; attempt `n` waits `n * base`.
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

pub struct NotificationWorker<S> {
    sink: S,
    retry_backoff: Duration,
}

impl<S: NotificationSink> NotificationWorker<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Override the base retry delay.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Drain `receiver` until it closes or `cancel` fires.
    pub async fn run(
        self,
        mut receiver: mpsc::Receiver<NotificationTask>,
        cancel: CancellationToken,
    ) {
        tracing::info!("Notification worker started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(
                        pending = receiver.len(),
                        "Notification worker cancelled"
                    );
                    break;
                }
                task = receiver.recv() => {
                    match task {
                        Some(task) => {
                            self.process(&task).await;
                        }
                        None => {
                            tracing::info!("Notification queue closed, worker shutting down");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Deliver one message per officer in `task`. Returns how many succeeded.
    pub async fn process(&self, task: &NotificationTask) -> usize {
        let text = task.message();
        let mut delivered = 0;

        for &officer_id in &task.officer_ids {
            let message = OfficerMessage {
                officer_id,
                shift_id: Some(task.shift_id),
                kind: task.kind,
                message: text.clone(),
            };

            match self.deliver_with_retry(&message).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        officer_id,
                        shift_id = task.shift_id,
                        kind = task.kind.as_str(),
                        "Notification delivery failed, dropping message"
                    );
                }
            }
        }

        tracing::debug!(
            shift_id = task.shift_id,
            kind = task.kind.as_str(),
            delivered,
            recipients = task.officer_ids.len(),
            "Notification task processed"
        );
        delivered
    }

    async fn deliver_with_retry(&self, message: &OfficerMessage) -> Result<(), DeliveryError> {
        let mut attempt = 1;
        loop {
            match self.sink.deliver(message).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < MAX_DELIVERY_ATTEMPTS && e.is_retryable() => {
                    tracing::warn!(
                        attempt,
                        officer_id = message.officer_id,
                        error = %e,
                        "Notification delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
