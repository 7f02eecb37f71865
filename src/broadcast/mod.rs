//! Event fan-out to connected clients
//!
//! Transport adapters hold the receiving end of a per-connection channel;
//! the coordinator pushes room events into it. Delivery order across members
//! is unspecified, but each connection observes events in the order the core
//! produced them.

pub mod coordinator;
pub mod event;

pub use coordinator::{BroadcastCoordinator, EventSender};
pub use event::RoomEvent;
