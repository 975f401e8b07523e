//! Refresh-and-retry coordination
//! - marker.rs: per-request retry markers keyed by coordinator tag
//! - strategy.rs: the capability set a retry reason must supply
//! - coordinator.rs: single-flight refresh gating and the waiter queue
//! - timeout.rs: refresh deadline combinator

pub mod coordinator;
pub mod marker;
pub mod strategy;
pub mod timeout;

pub use coordinator::{QueueSnapshot, RetryCoordinator};
pub use marker::{RetryMarker, RetryMarks, marker_key};
pub use strategy::{RequestFailure, RetryStrategy};
pub use timeout::{RetryStrategyExt, WithRefreshTimeout};
