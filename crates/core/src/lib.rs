//! Domain logic for the CivicWatch scheduling backend.
//!
//! Everything here is free of database and HTTP dependencies so it can be
//! shared by the repository layer, the API server, and the notification
//! worker.

pub mod error;
pub mod roster;
pub mod scheduling;
pub mod shift_lifecycle;
pub mod types;
