pub mod config;
pub mod events;
pub mod gateway;
pub mod live_view;
pub mod protocol;
pub mod shell;
pub mod threshold;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use config::Config;
pub use events::{AppEvent, EventBus, EventSender};
pub use gateway::{CommandGateway, GatewayError, GatewayFactory, GatewayInfo, LocalGateway};
pub use live_view::{LiveViewState, Transition};
pub use protocol::{Command, CommandKind, Reply, RequestId, PROTOCOL_VERSION};
pub use shell::{Notice, NoticeLevel, ViewShell};
pub use threshold::{ThresholdBounds, ThresholdError};
