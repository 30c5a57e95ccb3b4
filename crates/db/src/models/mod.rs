//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - An update DTO for patches where the entity is mutable

pub mod notification;
pub mod officer;
pub mod shift;
pub mod status;
