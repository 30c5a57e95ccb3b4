//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` (or an open transaction) as the first argument.

pub mod notification_repo;
pub mod officer_repo;
pub mod shift_repo;

pub use notification_repo::NotificationRepo;
pub use officer_repo::OfficerRepo;
pub use shift_repo::ShiftRepo;
