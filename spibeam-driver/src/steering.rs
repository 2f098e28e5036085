use spibeam_core::{
    beam::{BeamCommand, BeamMode},
    common::Millimeters,
    phase::{PhaseCode, PhaseResult, PhaseTurn, SinCos},
    trig::{TrigFault, TrigPrimitive},
};

/// Truncates a Q9.7 × Q1.15 offset product (Q10.22) to Q10.14.
#[must_use]
pub const fn q14_from_offset_product(product: i64) -> i32 {
    (product >> 8) as i32
}

/// Truncates a Q10.14 × Q1.15 tilt product (Q11.29) to Q11.14.
#[must_use]
pub const fn q14_from_tilt_product(product: i64) -> i32 {
    (product >> 15) as i32
}

/// Reinterprets the low 32 bits of a Q11.14 × Q0.17 product (Q11.31) as a
/// signed Q1.31 phase turn. Values beyond ±1 turn wrap; that is the periodic
/// semantics, not an error.
#[must_use]
pub const fn turn_from_product(product: i64) -> PhaseTurn {
    PhaseTurn::from_raw(product as i32)
}

/// Computes one element's fraction of a rotation:
/// `kturn · cos(el) · (x·cos(az) − y·sin(az))`.
#[must_use]
pub const fn steer_turn(
    x: Millimeters,
    y: Millimeters,
    azimuth: SinCos,
    cos_elevation: i16,
    mode: BeamMode,
) -> PhaseTurn {
    let x_cos = q14_from_offset_product(x.raw() as i64 * azimuth.cos as i64);
    let y_sin = q14_from_offset_product(y.raw() as i64 * azimuth.sin as i64);
    let aim = x_cos - y_sin; // Q10.14
    let tilted = q14_from_tilt_product(aim as i64 * cos_elevation as i64);
    turn_from_product(tilted as i64 * mode.kturn() as i64)
}

/// Per-sweep steering context: the trigonometry of one beam command,
/// resolved once and applied to every element offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Steering {
    azimuth: SinCos,
    cos_elevation: i16,
    mode: BeamMode,
}

impl Steering {
    /// Resolves the command's angles through the trigonometric primitive.
    pub fn new(command: &BeamCommand, trig: &impl TrigPrimitive) -> Result<Self, TrigFault> {
        let azimuth = trig.sin_cos(PhaseCode::from_degrees(command.azimuth))?;
        let elevation = trig.sin_cos(PhaseCode::from_degrees(command.elevation))?;
        Ok(Self {
            azimuth,
            cos_elevation: elevation.cos,
            mode: command.mode,
        })
    }

    /// The phase command of an element offset (x, y) mm from the aperture
    /// center.
    #[must_use]
    pub const fn phase_at(&self, x: Millimeters, y: Millimeters) -> PhaseResult {
        let turn = steer_turn(x, y, self.azimuth, self.cos_elevation, self.mode);
        PhaseResult {
            turn,
            index: turn.index(),
        }
    }
}
