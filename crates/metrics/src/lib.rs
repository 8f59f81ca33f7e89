//! Metric names for switchboard.
//!
//! Crates record through the `metrics` facade behind their own optional
//! `metrics` feature. Installing an exporter is left to the host process.
//!
//! ```rust,ignore
//! use switchboard_metrics::{counter, inbound, labels};
//!
//! counter!(inbound::EVENTS_TOTAL, labels::CHANNEL => "discord").increment(1);
//! ```

mod definitions;

pub use definitions::*;

pub use metrics::{counter, gauge, histogram};
