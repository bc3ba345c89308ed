//! Helpers shared by the resource modules.

pub mod clock;
pub mod enums;
pub mod filter;

pub(crate) use enums::closed_enum;
