//! Request caching layer
//!
//! Keyed caches over backend calls, one namespace per loader, plus the
//! loading counters that drive the advisory loading flags.

pub mod loading;
pub mod request;

pub use loading::{LoadingCounter, LoadingGuard};
pub use request::RequestCache;
