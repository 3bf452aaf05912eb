// Server module entry
// Listener creation, accept loops and shutdown signalling

pub mod connection;
pub mod listener;
pub mod signal;

pub use connection::{run, ServiceKind};
pub use listener::create_listener;
pub use signal::shutdown_signal;
