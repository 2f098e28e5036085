use spibeam_core::{
    beam::BeamCommand,
    geometry::{ElementAddress, ElementGeometry},
    params::{ELEMENTS_PER_LANE, LANES, LANE_COLUMNS, ROWS},
    trig::TrigPrimitive,
};

use crate::{
    error::DriverError,
    frame::{pack_value, CommandFrame},
    steering::Steering,
};

/// Computes the ordered command sequence one lane sends for `command`:
/// 32 rows × 4 lane-local columns, row-major, one frame per element.
pub fn lane_frames(
    command: &BeamCommand,
    lane: u8,
    trig: &impl TrigPrimitive,
) -> Result<Vec<CommandFrame>, DriverError> {
    let steering = Steering::new(command, trig)?;
    let mut frames = Vec::with_capacity(ELEMENTS_PER_LANE);
    for row in 0..ROWS as u8 {
        for column in 0..LANE_COLUMNS as u8 {
            let geometry = ElementGeometry::of(lane, row, column, command.mode);
            let phase = steering.phase_at(geometry.x(), geometry.y());
            tracing::trace!(lane, row, column, ?phase, "element command");
            frames.push(CommandFrame::new(
                ElementAddress::of(row, column, command.mode),
                pack_value(phase.index, command.mode),
            ));
        }
    }
    tracing::debug!(lane, count = frames.len(), "lane sweep computed");
    Ok(frames)
}

/// Computes [`lane_frames`] for all 8 lanes, lane 0 first.
pub fn array_frames(
    command: &BeamCommand,
    trig: &impl TrigPrimitive,
) -> Result<Vec<Vec<CommandFrame>>, DriverError> {
    (0..LANES as u8)
        .map(|lane| lane_frames(command, lane, trig))
        .collect()
}
