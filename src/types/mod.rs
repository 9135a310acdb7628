//! types/mod.rs
//!
//! Domain types shared across the crate.

pub mod record;

pub use record::{Timeline, VitalRecord};
