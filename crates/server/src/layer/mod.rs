//! Server decorators.
//!
//! Each decorator is a [`tower_layer::Layer`] producing a [`Server`](crate::Server)
//! that wraps another one. Layers can be composed with
//! [`tower_layer::Stack`] or applied one by one.

mod caching;
mod lifecycle;
mod logging;

pub use caching::{Caching, CachingLayer};
pub use lifecycle::{Lifecycle, LifecycleLayer};
pub use logging::{Logging, LoggingLayer};
