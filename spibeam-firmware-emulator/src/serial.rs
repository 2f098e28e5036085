use thiserror::Error;

use crate::sweep::ByteOut;

/// Clock idle level of the serial bus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClockPolarity {
    /// Clock rests low between bits and frames.
    #[default]
    IdleLow,
    /// Clock rests high. Not supported by the encoder.
    IdleHigh,
}

/// Which clock edge the receiver samples data on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClockPhase {
    /// Data is stable before the first (rising) edge of each bit.
    #[default]
    CaptureOnFirstEdge,
    /// Data is launched on the first edge. Not supported by the encoder.
    CaptureOnSecondEdge,
}

/// Serial bus timing configuration.
///
/// The bit clock runs at the reference tick rate divided by `2 × divider`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpiConfig {
    /// Half-period of the bit clock, in reference ticks. At least 2.
    pub divider: u32,
    pub polarity: ClockPolarity,
    pub phase: ClockPhase,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            divider: 2,
            polarity: ClockPolarity::default(),
            phase: ClockPhase::default(),
        }
    }
}

/// A bus configuration rejected at construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// The clock divider must be at least 2.
    #[error("clock divider ({0}) must be at least 2")]
    DividerTooSmall(u32),
    /// Only an idle-low clock with data captured on the first edge is
    /// supported; anything else is refused rather than approximated.
    #[error("unsupported clock polarity/phase combination")]
    UnsupportedClockShape,
}

/// Snapshot of the three bus wires after one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpiBus {
    pub clock: bool,
    pub data: bool,
    pub select: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    Shift,
    Load,
}

/// Bit-bangs a byte stream onto clock/data/chip-select, MSB first.
///
/// Chip-select asserts with the first byte of a frame and holds through the
/// terminator byte's last bit; the clock pauses low while waiting for the
/// next byte of a frame.
#[derive(Clone, Debug)]
pub struct SpiEncoder {
    divider: u32,
    state: State,
    shift: u8,
    bits_left: u8,
    terminator: bool,
    phase_ticks: u32,
    clock: bool,
    data: bool,
    select: bool,
}

impl SpiEncoder {
    pub fn new(config: SpiConfig) -> Result<Self, ConfigError> {
        if config.divider < 2 {
            return Err(ConfigError::DividerTooSmall(config.divider));
        }
        if (config.polarity, config.phase)
            != (ClockPolarity::IdleLow, ClockPhase::CaptureOnFirstEdge)
        {
            return Err(ConfigError::UnsupportedClockShape);
        }
        Ok(Self {
            divider: config.divider,
            state: State::Idle,
            shift: 0,
            bits_left: 0,
            terminator: false,
            phase_ticks: 0,
            clock: false,
            data: false,
            select: false,
        })
    }

    /// Whether a byte presented on the next step will be taken.
    pub const fn ready(&self) -> bool {
        matches!(self.state, State::Idle | State::Load)
    }

    /// Whether the bus is between frames (chip-select low).
    pub const fn idle(&self) -> bool {
        matches!(self.state, State::Idle)
    }

    /// Advances one reference tick, consuming `byte` if one is presented
    /// while ready.
    pub fn tick(&mut self, byte: Option<ByteOut>) -> SpiBus {
        match self.state {
            State::Idle | State::Load => {
                if let Some(input) = byte {
                    self.shift = input.byte;
                    self.terminator = input.last;
                    self.bits_left = 8;
                    self.phase_ticks = 0;
                    self.clock = false;
                    self.data = self.shift & 0x80 != 0;
                    self.select = true;
                    self.state = State::Shift;
                }
            }
            State::Shift => {
                self.phase_ticks += 1;
                if self.phase_ticks == self.divider {
                    self.phase_ticks = 0;
                    self.clock = !self.clock;
                    if !self.clock {
                        // falling edge: the sampled bit is done
                        self.bits_left -= 1;
                        if self.bits_left == 0 {
                            if self.terminator {
                                self.state = State::Idle;
                                self.select = false;
                                self.data = false;
                            } else {
                                self.state = State::Load;
                            }
                        } else {
                            self.shift <<= 1;
                            self.data = self.shift & 0x80 != 0;
                        }
                    }
                }
            }
        }
        SpiBus {
            clock: self.clock,
            data: self.data,
            select: self.select,
        }
    }

    /// Drops all three wires and discards the byte in flight.
    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.shift = 0;
        self.bits_left = 0;
        self.terminator = false;
        self.phase_ticks = 0;
        self.clock = false;
        self.data = false;
        self.select = false;
    }
}
