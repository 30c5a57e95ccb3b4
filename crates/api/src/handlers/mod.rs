pub mod officers;
pub mod shifts;
