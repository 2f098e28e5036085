#![warn(rustdoc::unescaped_backticks)]

//! Host-side computation of spibeam element commands.
//!
//! The pipeline here is the pure-function twin of the steering firmware: for
//! one [`BeamCommand`] it produces, per lane, the ordered sequence of 5-byte
//! command frames the firmware serializes, bit for bit.
//!
//! [`BeamCommand`]: spibeam_core::beam::BeamCommand

pub mod error;
pub mod frame;
pub mod steering;
pub mod sweep;

pub use error::DriverError;
