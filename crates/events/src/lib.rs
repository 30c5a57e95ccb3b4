//! Officer notification pipeline.
//!
//! Shift writes enqueue a [`NotificationTask`] on an explicit work queue;
//! a single [`NotificationWorker`] drains it and hands one
//! [`OfficerMessage`] per assigned officer to a [`NotificationSink`].
//!
//! - [`queue`]: task type and the bounded queue handle.
//! - [`worker`]: the consumer loop with per-delivery retry.
//! - [`sink`]: the delivery seam and its Postgres implementation.

pub mod queue;
pub mod sink;
pub mod worker;

pub use queue::{
    NotificationKind, NotificationQueue, NotificationTask, QueueError, DEFAULT_QUEUE_CAPACITY,
};
pub use sink::{DbNotificationSink, DeliveryError, NotificationSink, OfficerMessage};
pub use worker::{NotificationWorker, MAX_DELIVERY_ATTEMPTS};
