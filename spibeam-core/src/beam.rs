use crate::{
    common::Degrees,
    params::{KTURN_RECEIVE, KTURN_TRANSMIT},
};

/// Whether the aperture is steering its transmit or its receive pattern.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum BeamMode {
    /// Transmit pattern, 5.0 mm element pitch.
    Transmit,
    /// Receive pattern, 7.5 mm element pitch.
    Receive,
}

impl BeamMode {
    /// The per-millimeter phase slope of this mode, signed Q0.17 turns/mm.
    #[must_use]
    pub const fn kturn(self) -> i32 {
        match self {
            Self::Transmit => KTURN_TRANSMIT,
            Self::Receive => KTURN_RECEIVE,
        }
    }
}

/// A commanded beam direction, immutable for the duration of one sweep.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BeamCommand {
    /// Azimuth in [0°, 360°), Q9.7.
    pub azimuth: Degrees,
    /// Elevation in [0°, 90°], Q9.7.
    pub elevation: Degrees,
    /// Transmit or receive steering.
    pub mode: BeamMode,
}

impl BeamCommand {
    /// Boresight transmit command: azimuth 0°, elevation 0°.
    pub const BORESIGHT: Self = Self {
        azimuth: Degrees::ZERO,
        elevation: Degrees::ZERO,
        mode: BeamMode::Transmit,
    };
}
