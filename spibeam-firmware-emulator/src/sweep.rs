use getset::CopyGetters;
use spibeam_core::{
    beam::BeamCommand,
    geometry::{ElementAddress, ElementGeometry},
    params::{FRAME_LEN, LANE_COLUMNS, ROWS},
    phase::PhaseResult,
    trig::TrigPrimitive,
};
use spibeam_driver::frame::{pack_value, CommandFrame};

use crate::calculator::{PhaseCalculator, PhaseRequest};

/// One byte handed to the serial encoder; `last` marks the frame terminator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteOut {
    pub byte: u8,
    pub last: bool,
}

/// What one step of the sweep produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepTick {
    /// A byte presented to the encoder, taken on the next step.
    pub byte: Option<ByteOut>,
    /// One-step pulse: the sweep finished and the bus returned to idle.
    pub done: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    WaitForPhase,
    SendBytes { frame: [u8; FRAME_LEN], index: usize },
    Drain,
}

/// Per-lane element sweep: iterates the lane's 32 rows × 4 columns, runs the
/// phase calculator for each element, and feeds the resulting command frame
/// to the serial encoder under ready/valid backpressure.
///
/// If the encoder never signals ready the controller stalls indefinitely;
/// that is flow control, not a fault.
#[derive(Clone, Debug, CopyGetters)]
pub struct SweepController<T> {
    calculator: PhaseCalculator<T>,
    #[getset(get_copy = "pub")]
    lane: u8,
    command: BeamCommand,
    state: State,
    row: u8,
    column: u8,
    pending: Option<PhaseRequest>,
    /// The lane is mid-sweep.
    #[getset(get_copy = "pub")]
    busy: bool,
    /// Sticky: the trig primitive faulted on at least one element this sweep.
    #[getset(get_copy = "pub")]
    fault: bool,
    /// Debug tap: the last phase command this lane computed.
    #[getset(get_copy = "pub")]
    last_result: Option<PhaseResult>,
}

impl<T: TrigPrimitive> SweepController<T> {
    pub fn new(lane: u8, trig: T) -> Self {
        Self {
            calculator: PhaseCalculator::new(trig),
            lane,
            command: BeamCommand::BORESIGHT,
            state: State::Idle,
            row: 0,
            column: 0,
            pending: None,
            busy: false,
            fault: false,
            last_result: None,
        }
    }

    fn request(&self) -> PhaseRequest {
        let geometry = ElementGeometry::of(self.lane, self.row, self.column, self.command.mode);
        PhaseRequest::new(&self.command, geometry.x(), geometry.y())
    }

    fn step_element(&mut self) {
        if self.row as usize == ROWS - 1 && self.column as usize == LANE_COLUMNS - 1 {
            self.state = State::Drain;
        } else if self.column as usize == LANE_COLUMNS - 1 {
            self.column = 0;
            self.row += 1;
            self.pending = Some(self.request());
            self.state = State::WaitForPhase;
        } else {
            self.column += 1;
            self.pending = Some(self.request());
            self.state = State::WaitForPhase;
        }
    }

    /// Advances one step. `encoder_ready` and `encoder_idle` are the
    /// encoder's state after its own tick this step; a presented byte is
    /// taken by the encoder on the next step.
    pub fn tick(
        &mut self,
        start: Option<&BeamCommand>,
        encoder_ready: bool,
        encoder_idle: bool,
    ) -> SweepTick {
        if let (State::Idle, Some(command)) = (self.state, start) {
            self.command = *command;
            self.row = 0;
            self.column = 0;
            self.busy = true;
            self.fault = false;
            self.pending = Some(self.request());
            self.state = State::WaitForPhase;
            tracing::debug!(lane = self.lane, "sweep started");
        }

        let request = self.pending.take();
        let phase = self.calculator.tick(request.as_ref());

        let mut out = SweepTick::default();
        match self.state {
            State::Idle => {}
            State::WaitForPhase => {
                if let Some(result) = phase {
                    match result {
                        Ok(result) => {
                            self.last_result = Some(result);
                            let frame = CommandFrame::new(
                                ElementAddress::of(self.row, self.column, self.command.mode),
                                pack_value(result.index, self.command.mode),
                            );
                            self.state = State::SendBytes {
                                frame: frame.to_bytes(),
                                index: 0,
                            };
                        }
                        Err(fault) => {
                            tracing::debug!(
                                lane = self.lane,
                                row = self.row,
                                column = self.column,
                                %fault,
                                "element skipped"
                            );
                            self.fault = true;
                            self.step_element();
                        }
                    }
                }
            }
            State::SendBytes { frame, index } => {
                if encoder_ready {
                    let last = index == FRAME_LEN - 1;
                    out.byte = Some(ByteOut {
                        byte: frame[index],
                        last,
                    });
                    if last {
                        self.step_element();
                    } else {
                        self.state = State::SendBytes {
                            frame,
                            index: index + 1,
                        };
                    }
                }
            }
            State::Drain => {
                if encoder_idle {
                    out.done = true;
                    self.busy = false;
                    self.state = State::Idle;
                    tracing::debug!(lane = self.lane, "sweep complete");
                }
            }
        }
        out
    }

    /// Unconditionally returns the lane to idle, discarding in-flight state.
    pub fn reset(&mut self) {
        self.calculator.reset();
        self.state = State::Idle;
        self.row = 0;
        self.column = 0;
        self.pending = None;
        self.busy = false;
        self.fault = false;
        self.last_result = None;
    }
}

#[cfg(test)]
mod tests {
    use spibeam_core::{
        beam::BeamMode,
        common::deg,
        params::ELEMENTS_PER_LANE,
        phase::{PhaseCode, SinCos},
        trig::{QuantizedTrig, TrigFault},
    };
    use spibeam_driver::sweep::lane_frames;

    use super::*;

    fn command(mode: BeamMode) -> BeamCommand {
        BeamCommand {
            azimuth: 20.0 * deg,
            elevation: 10.0 * deg,
            mode,
        }
    }

    /// Runs a full sweep with a scripted ready signal; returns the bytes in
    /// presentation order. `ready_gap` withholds readiness for that many
    /// steps between consecutive accepts.
    fn run_sweep<T: TrigPrimitive>(
        controller: &mut SweepController<T>,
        command: &BeamCommand,
        ready_gap: usize,
    ) -> (Vec<u8>, usize) {
        let mut bytes = Vec::new();
        let mut done_pulses = 0;
        let mut gap = 0;
        let mut start = Some(command);
        for _ in 0..1_000_000 {
            let ready = gap == 0;
            let out = controller.tick(start.take(), ready, true);
            if let Some(byte) = out.byte {
                bytes.push(byte.byte);
                gap = ready_gap;
            } else {
                gap = gap.saturating_sub(1);
            }
            if out.done {
                done_pulses += 1;
                break;
            }
        }
        (bytes, done_pulses)
    }

    #[test]
    fn sweep_emits_every_element_in_order() {
        let command = command(BeamMode::Transmit);
        let expected: Vec<u8> = lane_frames(&command, 7, &QuantizedTrig)
            .unwrap()
            .iter()
            .flat_map(|frame| frame.to_bytes())
            .collect();
        let mut controller = SweepController::new(7, QuantizedTrig);
        let (bytes, done_pulses) = run_sweep(&mut controller, &command, 0);
        assert_eq!(ELEMENTS_PER_LANE * FRAME_LEN, bytes.len());
        assert_eq!(expected, bytes);
        assert_eq!(1, done_pulses);
        assert!(!controller.busy());
    }

    #[test]
    fn backpressure_changes_neither_count_nor_order() {
        let command = command(BeamMode::Receive);
        let mut free_running = SweepController::new(2, QuantizedTrig);
        let (reference, _) = run_sweep(&mut free_running, &command, 0);
        let mut throttled = SweepController::new(2, QuantizedTrig);
        let (bytes, done_pulses) = run_sweep(&mut throttled, &command, 17);
        assert_eq!(reference, bytes);
        assert_eq!(1, done_pulses);
    }

    #[test]
    fn stalled_encoder_stalls_the_sweep() {
        let command = command(BeamMode::Transmit);
        let mut controller = SweepController::new(0, QuantizedTrig);
        let mut start = Some(&command);
        for _ in 0..10_000 {
            let out = controller.tick(start.take(), false, false);
            assert_eq!(None, out.byte);
            assert!(!out.done);
        }
        assert!(controller.busy());
    }

    #[test]
    fn terminator_marks_every_fifth_byte() {
        let command = command(BeamMode::Receive);
        let mut controller = SweepController::new(5, QuantizedTrig);
        let mut count = 0usize;
        let mut start = Some(&command);
        for _ in 0..1_000_000 {
            let out = controller.tick(start.take(), true, true);
            if let Some(byte) = out.byte {
                assert_eq!(count % FRAME_LEN == FRAME_LEN - 1, byte.last);
                count += 1;
            }
            if out.done {
                break;
            }
        }
        assert_eq!(ELEMENTS_PER_LANE * FRAME_LEN, count);
    }

    #[test]
    fn faulted_elements_are_skipped_and_latched() {
        #[derive(Clone)]
        struct FaultyTrig;
        impl TrigPrimitive for FaultyTrig {
            fn latency(&self) -> usize {
                2
            }
            fn sin_cos(&self, code: PhaseCode) -> Result<SinCos, TrigFault> {
                Err(TrigFault { code })
            }
        }
        let command = command(BeamMode::Transmit);
        let mut controller = SweepController::new(1, FaultyTrig);
        let (bytes, done_pulses) = run_sweep(&mut controller, &command, 0);
        assert!(bytes.is_empty());
        assert_eq!(1, done_pulses);
        assert!(controller.fault());
        assert!(!controller.busy());
    }

    #[test]
    fn reset_returns_to_idle() {
        let command = command(BeamMode::Transmit);
        let mut controller = SweepController::new(4, QuantizedTrig);
        controller.tick(Some(&command), true, true);
        for _ in 0..100 {
            controller.tick(None, true, true);
        }
        assert!(controller.busy());
        controller.reset();
        assert!(!controller.busy());
        let (bytes, done_pulses) = run_sweep(&mut controller, &command, 0);
        assert_eq!(ELEMENTS_PER_LANE * FRAME_LEN, bytes.len());
        assert_eq!(1, done_pulses);
    }
}
