//! Range-aware content delivery server
//!
//! Serves catalogued content over HTTP with single-range partial delivery,
//! backed by a notification-driven existence cache in front of the store.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod notify;
pub mod server;
pub mod store;
