use crate::{
    beam::BeamMode,
    common::Millimeters,
    params::{LANES, LANE_COLUMNS},
};

/// Half the transmit element pitch (2.5 mm), Q9.7.
const TRANSMIT_HALF_PITCH: i16 = 320;
/// Half the receive element pitch (3.75 mm), Q9.7.
const RECEIVE_HALF_PITCH: i16 = 480;

const fn offset_table(half_pitch: i16) -> [i16; 32] {
    let mut table = [0i16; 32];
    let mut i = 0;
    while i < 32 {
        // (i − 15.5) · pitch, centered on the aperture
        table[i] = (2 * (i as i16) - 31) * half_pitch;
        i += 1;
    }
    table
}

const TRANSMIT_OFFSETS: [i16; 32] = offset_table(TRANSMIT_HALF_PITCH);
const RECEIVE_OFFSETS: [i16; 32] = offset_table(RECEIVE_HALF_PITCH);

/// Centered offset of grid index `i` (a row or a global column) from the
/// aperture center, for the element pitch of `mode`.
///
/// # Panics
///
/// Panics if `i` is 32 or more.
#[must_use]
pub const fn grid_offset(mode: BeamMode, i: u8) -> Millimeters {
    let table = match mode {
        BeamMode::Transmit => &TRANSMIT_OFFSETS,
        BeamMode::Receive => &RECEIVE_OFFSETS,
    };
    Millimeters::from_raw(table[i as usize])
}

/// First global column owned by `lane`; lanes are numbered so that lane 7
/// owns columns 0–3 and lane 0 owns columns 28–31.
///
/// # Panics
///
/// Panics if `lane` is 8 or more.
#[must_use]
pub const fn lane_column_base(lane: u8) -> u8 {
    assert!(lane < LANES as u8);
    (LANES as u8 - 1 - lane) * LANE_COLUMNS as u8
}

/// Physical offsets of one element from the aperture center.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ElementGeometry {
    row: u8,
    column: u8,
    x: Millimeters,
    y: Millimeters,
}

impl ElementGeometry {
    /// Computes the geometry of the element at (`row`, lane-local `column`)
    /// of `lane`, for the element pitch of `mode`.
    #[must_use]
    pub const fn of(lane: u8, row: u8, column: u8, mode: BeamMode) -> Self {
        Self {
            row,
            column,
            x: grid_offset(mode, lane_column_base(lane) + column),
            y: grid_offset(mode, row),
        }
    }

    /// The element's row, 0–31.
    #[must_use]
    pub const fn row(self) -> u8 {
        self.row
    }

    /// The element's lane-local column, 0–3.
    #[must_use]
    pub const fn column(self) -> u8 {
        self.column
    }

    /// Offset along the column axis, Q9.7 mm.
    #[must_use]
    pub const fn x(self) -> Millimeters {
        self.x
    }

    /// Offset along the row axis, Q9.7 mm.
    #[must_use]
    pub const fn y(self) -> Millimeters {
        self.y
    }
}

const TRANSMIT_CHANNELS: [u8; 4] = [0x27, 0x3F, 0x47, 0x5F];
const RECEIVE_CHANNELS: [u8; 4] = [0x22, 0x3A, 0x42, 0x5A];

/// Bus address of one element's phase register; a fixed function of (row,
/// lane-local column, mode), never recomputed mid-transmission.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct ElementAddress {
    chip: u8,
    channel: u8,
}

impl ElementAddress {
    /// Derives the address of the element at (`row`, lane-local `column`).
    ///
    /// The chip id folds two rows and two columns together; the channel code
    /// is looked up by row mod 4, reversed on odd columns.
    #[must_use]
    pub const fn of(row: u8, column: u8, mode: BeamMode) -> Self {
        let chip = if column % (LANE_COLUMNS as u8) < 2 {
            16 + (row >> 1)
        } else {
            row >> 1
        };
        let table = match mode {
            BeamMode::Transmit => &TRANSMIT_CHANNELS,
            BeamMode::Receive => &RECEIVE_CHANNELS,
        };
        let i = (row % 4) as usize;
        let channel = if column % 2 == 0 { table[i] } else { table[3 - i] };
        Self { chip, channel }
    }

    /// The chip id, 0–63.
    #[must_use]
    pub const fn chip(self) -> u8 {
        self.chip
    }

    /// The channel code byte.
    #[must_use]
    pub const fn channel(self) -> u8 {
        self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[test]
    #[case(-9920, BeamMode::Transmit, 0)]
    #[case(-320, BeamMode::Transmit, 15)]
    #[case(320, BeamMode::Transmit, 16)]
    #[case(9920, BeamMode::Transmit, 31)]
    #[case(-14880, BeamMode::Receive, 0)]
    #[case(14880, BeamMode::Receive, 31)]
    fn offsets_are_centered(#[case] expected: i16, #[case] mode: BeamMode, #[case] i: u8) {
        assert_eq!(expected, grid_offset(mode, i).raw());
    }

    #[test]
    fn offsets_are_symmetric() {
        (0..32u8).for_each(|i| {
            assert_eq!(
                -grid_offset(BeamMode::Transmit, i).raw(),
                grid_offset(BeamMode::Transmit, 31 - i).raw()
            );
        });
    }

    #[rstest::rstest]
    #[test]
    #[case(28, 0)]
    #[case(16, 3)]
    #[case(4, 6)]
    #[case(0, 7)]
    fn column_base(#[case] expected: u8, #[case] lane: u8) {
        assert_eq!(expected, lane_column_base(lane));
    }

    #[test]
    #[should_panic]
    fn column_base_checks_bounds() {
        let _ = lane_column_base(8);
    }

    #[rstest::rstest]
    #[test]
    #[case(16, 0x27, 0, 0, BeamMode::Transmit)]
    #[case(16, 0x5F, 0, 1, BeamMode::Transmit)]
    #[case(16, 0x3F, 1, 0, BeamMode::Transmit)]
    #[case(0, 0x27, 0, 2, BeamMode::Transmit)]
    #[case(31, 0x5F, 31, 0, BeamMode::Transmit)]
    #[case(16, 0x22, 0, 0, BeamMode::Receive)]
    #[case(15, 0x22, 31, 3, BeamMode::Receive)]
    fn addresses(
        #[case] chip: u8,
        #[case] channel: u8,
        #[case] row: u8,
        #[case] column: u8,
        #[case] mode: BeamMode,
    ) {
        let address = ElementAddress::of(row, column, mode);
        assert_eq!(chip, address.chip());
        assert_eq!(channel, address.channel());
    }

    #[test]
    fn addresses_are_distinct_within_a_lane() {
        let mut seen = std::collections::HashSet::new();
        for row in 0..32u8 {
            for column in 0..4u8 {
                assert!(seen.insert(ElementAddress::of(row, column, BeamMode::Receive)));
            }
        }
        assert_eq!(128, seen.len());
    }
}
