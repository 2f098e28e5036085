#![warn(missing_docs)]
#![warn(rustdoc::unescaped_backticks)]

//! Core types and contracts for the spibeam beam-steering stack.

/// Beam command and steering mode.
pub mod beam;
/// Fixed-point unit types.
pub mod common;
/// Aperture geometry and element addressing.
pub mod geometry;
/// Fixed constants of the aperture and the steering arithmetic.
pub mod params;
/// Phase codes, samples and indices.
pub mod phase;
/// The trigonometric-primitive contract.
pub mod trig;
