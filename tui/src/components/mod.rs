// UI components for the TUI

pub mod button;
pub mod greet;
pub mod preview;
pub mod status;
pub mod thresholds;

pub use button::LiveViewButtonComponent;
pub use greet::GreetComponent;
pub use preview::PreviewComponent;
pub use status::StatusComponent;
pub use thresholds::ThresholdsComponent;
