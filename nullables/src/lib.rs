//! Nullable infrastructure for deterministic testing.
//!
//! External effects (the network, page navigation) are abstracted behind
//! traits. This crate provides test-friendly implementations that:
//! - Return scripted values
//! - Record what they were asked to do
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod reset;
pub mod transport;

pub use reset::RecordingSessionReset;
pub use transport::NullTransport;
