use spibeam_core::{
    beam::BeamMode,
    geometry::ElementAddress,
    params::{FRAME_LEN, FRAME_START},
    phase::PhaseIndex,
};
use zerocopy::{Immutable, IntoBytes};

/// Bits below the phase index in a transmit-mode register value:
/// [9:8] = 0b11, [7:1] = 0x7F, [0] = 0.
const TRANSMIT_VALUE_BASE: u16 = 0x03FE;
/// Bits below the phase index in a receive-mode register value:
/// [9:4] = 0x3F, [3] = 1, rest 0.
const RECEIVE_VALUE_BASE: u16 = 0x03F8;

/// Packs a phase index into the 16-bit register value for `mode`; the index
/// occupies bits [15:10] in both modes.
#[must_use]
pub const fn pack_value(index: PhaseIndex, mode: BeamMode) -> u16 {
    let base = match mode {
        BeamMode::Transmit => TRANSMIT_VALUE_BASE,
        BeamMode::Receive => RECEIVE_VALUE_BASE,
    };
    ((index.value() as u16) << 10) | base
}

/// One element command exactly as it appears on the wire:
/// [0x28][chip][channel][value >> 8][value & 0xFF].
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoBytes, Immutable)]
pub struct CommandFrame {
    start: u8,
    chip: u8,
    channel: u8,
    value_hi: u8,
    value_lo: u8,
}

impl CommandFrame {
    /// Builds the frame addressing `address` with the register value `value`.
    #[must_use]
    pub const fn new(address: ElementAddress, value: u16) -> Self {
        Self {
            start: FRAME_START,
            chip: address.chip(),
            channel: address.channel(),
            value_hi: (value >> 8) as u8,
            value_lo: (value & 0xFF) as u8,
        }
    }

    /// The chip id the frame addresses.
    #[must_use]
    pub const fn chip(self) -> u8 {
        self.chip
    }

    /// The channel code the frame addresses.
    #[must_use]
    pub const fn channel(self) -> u8 {
        self.channel
    }

    /// The 16-bit register value the frame carries.
    #[must_use]
    pub const fn value(self) -> u16 {
        ((self.value_hi as u16) << 8) | self.value_lo as u16
    }

    /// The frame as the exact byte sequence sent on the bus.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; FRAME_LEN] {
        [
            self.start,
            self.chip,
            self.channel,
            self.value_hi,
            self.value_lo,
        ]
    }
}
