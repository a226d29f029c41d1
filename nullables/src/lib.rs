//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies of the engine (clock, storage) are abstracted so
//! tests can swap in implementations that return deterministic values, can
//! be controlled programmatically, and never touch the network.

pub mod clock;
pub mod failing_store;

pub use clock::NullClock;
pub use failing_store::FailingStore;
