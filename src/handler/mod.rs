//! Request handler module
//!
//! The delivery engine and the routing layer that connects it to hyper.

pub mod delivery;
pub mod router;

// Re-export main entry points
pub use delivery::{Delivery, DeliveryEngine};
pub use router::handle_request;
