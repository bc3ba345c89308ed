//! Savanna application library
//!
//! Site and back office modules for a safari tour operator, plus the
//! bootstrap that wires them into the kernel registry and HTTP server.

pub mod app;
pub mod console;
pub mod modules;
pub mod utils;

pub use app::App;
