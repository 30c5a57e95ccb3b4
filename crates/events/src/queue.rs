//! Notification tasks and the bounded work queue that carries them.

use civicwatch_core::types::{DbId, Timestamp};
use tokio::sync::mpsc;

/// Default number of tasks the queue buffers before rejecting new ones.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// What happened to the shift an officer is being told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    ShiftAssigned,
    ShiftUpdated,
    ShiftCancelled,
}

impl NotificationKind {
    /// Value stored in `officer_notifications.kind`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShiftAssigned => "shift_assigned",
            Self::ShiftUpdated => "shift_updated",
            Self::ShiftCancelled => "shift_cancelled",
        }
    }
}

/// One unit of work for the notification worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTask {
    pub kind: NotificationKind,
    pub shift_id: DbId,
    pub officer_ids: Vec<DbId>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub location: Option<String>,
}

impl NotificationTask {
    /// Human-readable notification text shared by every recipient.
    pub fn message(&self) -> String {
        let verb = match self.kind {
            NotificationKind::ShiftAssigned => "You have been assigned to",
            NotificationKind::ShiftUpdated => "Your assignment changed for",
            NotificationKind::ShiftCancelled => "Cancelled:",
        };
        let window = format!(
            "shift {} from {} to {}",
            self.shift_id,
            self.start_time.format("%Y-%m-%d %H:%M UTC"),
            self.end_time.format("%Y-%m-%d %H:%M UTC"),
        );
        match &self.location {
            Some(location) => format!("{verb} {window} at {location}"),
            None => format!("{verb} {window}"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("notification queue is full")]
    Full,

    #[error("notification queue is closed")]
    Closed,
}

/// Producer handle for the notification work queue.
///
/// Cheap to clone; the worker owns the matching receiver. Enqueueing never
/// waits: a full or closed queue is reported to the caller.
#[derive(Clone)]
pub struct NotificationQueue {
    sender: mpsc::Sender<NotificationTask>,
}

impl NotificationQueue {
    /// Create a queue with room for `capacity` pending tasks.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<NotificationTask>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Hand a task to the worker.
    pub fn enqueue(&self, task: NotificationTask) -> Result<(), QueueError> {
        self.sender.try_send(task).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => QueueError::Full,
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })
    }

    /// Maximum number of buffered tasks.
    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    /// Tasks buffered and not yet picked up by the worker.
    pub fn pending(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    /// Whether the worker has gone away.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
