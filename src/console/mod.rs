//! Back office interaction state, held by the caller and passed explicitly.
//!
//! These types carry no transport of their own: every server call is a
//! closure handed in by the caller, so the same rules hold for a browser
//! front end, the CLI, or a test driving the router directly.

pub mod confirm;
pub mod desk;
pub mod toggle;

pub use confirm::ConfirmPrompt;
pub use toggle::StatusToggle;
