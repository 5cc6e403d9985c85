//! Core primitives for the voxelnav navigation state.
//!
//! This crate provides the building blocks shared by every navigation entity:
//! - [`Signal`] and [`Subscription`] for payload-free change notification
//! - The [`Trackable`] trait for JSON persistence
//! - Finite-vector parsing of untrusted JSON input
//! - Axis-aligned rotation snapping
//! - Common error types

pub mod error;
pub mod math;
pub mod parse;
pub mod signal;
pub mod trackable;

pub use error::{Error, ParseError, Result};
pub use parse::{parse_finite_positive, parse_finite_vec, parse_positive_vec};
pub use signal::{Signal, Subscription};
pub use trackable::Trackable;

/// Workspace-wide constants
pub mod constants {
    /// Prefix written before the JSON state in a URL fragment.
    pub const FRAGMENT_PREFIX: &str = "#!";
}
