//! Terminal front end for the live view control panel: app loop, components and key handling.

pub mod app;
pub mod components;
pub mod handlers;
pub mod state;
pub mod utils;

// Re-export main types for convenience
pub use app::{render, App};
pub use state::{AppState, Focus};
