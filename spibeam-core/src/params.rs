/// Number of element rows in the aperture.
pub const ROWS: usize = 32;
/// Number of element columns in the aperture.
pub const COLUMNS: usize = 32;
/// Number of independent serial lanes.
pub const LANES: usize = 8;
/// Number of columns owned by one lane.
pub const LANE_COLUMNS: usize = 4;
/// Number of elements one lane sweeps per beam command.
pub const ELEMENTS_PER_LANE: usize = ROWS * LANE_COLUMNS;

/// Gain of the degree → phase-code conversion, unsigned Q8.8.
///
/// `ceil(2^23 / 180)`: the unique Q8.8 value for which the truncating
/// conversion sends 180° to 2^15 and 360° to 0 mod 2^16.
pub const PHASE_CODE_GAIN: u16 = 46604;

/// Phase slope in transmit mode, signed Q0.17 turns per millimeter
/// (−1/λ at λ = 10 mm).
pub const KTURN_TRANSMIT: i32 = -13107;
/// Phase slope in receive mode, signed Q0.17 turns per millimeter
/// (−1/λ at λ = 15 mm).
pub const KTURN_RECEIVE: i32 = -8738;

/// Start-of-frame byte of every element command.
pub const FRAME_START: u8 = 0x28;
/// Length of one element command frame on the wire.
pub const FRAME_LEN: usize = 5;
