//! Chat Service Layer
//!
//! Presence tracking, AFK eviction and message visibility.

pub mod handlers;
pub mod messages;
pub mod monitor;
pub mod presence;

pub use handlers::router;
pub use messages::{visibility_filter, MessageRouter};
pub use monitor::{LivenessMonitor, MonitorConfig, SweepReport};
pub use presence::PresenceRegistry;
