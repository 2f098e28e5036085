//! Cycle-stepped emulation of the spibeam steering firmware.
//!
//! Everything here advances in lock-step on a single global `tick`; the only
//! suspension point is the serial-bus ready/valid boundary.

pub mod array;
pub mod calculator;
pub mod converter;
pub mod delay_line;
pub mod multiplier;
pub mod serial;
pub mod sweep;

pub use array::{ArrayController, LaneStatus};
pub use serial::{SpiBus, SpiConfig};
