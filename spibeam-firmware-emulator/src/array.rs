use spibeam_core::{beam::BeamCommand, params::LANES, phase::PhaseResult, trig::TrigPrimitive};

use crate::{
    serial::{ConfigError, SpiBus, SpiConfig, SpiEncoder},
    sweep::{ByteOut, SweepController},
};

/// Externally visible state of one lane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LaneStatus {
    /// The lane is mid-sweep.
    pub busy: bool,
    /// One-step pulse when the lane finishes its sweep.
    pub done: bool,
    /// Sticky: the trig primitive faulted on at least one element this sweep.
    pub fault: bool,
}

/// What one step of the array produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrayTick {
    /// Per-lane bus wires after this step.
    pub buses: [SpiBus; LANES],
    /// Per-lane status after this step.
    pub lanes: [LaneStatus; LANES],
}

struct Lane<T> {
    controller: SweepController<T>,
    encoder: SpiEncoder,
    staged: Option<ByteOut>,
}

impl<T: TrigPrimitive> Lane<T> {
    fn tick(&mut self, start: Option<&BeamCommand>) -> (SpiBus, LaneStatus) {
        // the encoder advances first so the controller sees its state for
        // this step; a presented byte crosses on the next step
        let bus = self.encoder.tick(self.staged.take());
        let step = self
            .controller
            .tick(start, self.encoder.ready(), self.encoder.idle());
        self.staged = step.byte;
        (
            bus,
            LaneStatus {
                busy: self.controller.busy(),
                done: step.done,
                fault: self.controller.fault(),
            },
        )
    }

    fn reset(&mut self) {
        self.controller.reset();
        self.encoder.reset();
        self.staged = None;
    }
}

/// Eight sweep lanes behind one start trigger and one broadcast beam
/// command. Lane i owns global columns (7 − i)·4 … (7 − i)·4 + 3.
///
/// The controller exposes per-lane busy/done; combining them into one
/// "sweep complete" is the external driver's job.
pub struct ArrayController<T> {
    lanes: Vec<Lane<T>>,
    start_level: bool,
}

impl<T: TrigPrimitive + Clone> ArrayController<T> {
    pub fn new(trig: T, config: SpiConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            lanes: (0..LANES as u8)
                .map(|lane| {
                    Ok(Lane {
                        controller: SweepController::new(lane, trig.clone()),
                        encoder: SpiEncoder::new(config)?,
                        staged: None,
                    })
                })
                .collect::<Result<_, ConfigError>>()?,
            start_level: false,
        })
    }

    /// Advances every lane one step. A low→high transition of `start`
    /// begins one sweep of `command` on all lanes at once; holding the line
    /// high does not retrigger.
    pub fn tick(&mut self, start: bool, command: &BeamCommand) -> ArrayTick {
        let trigger = start && !self.start_level;
        self.start_level = start;
        if trigger {
            tracing::debug!(?command, "array sweep triggered");
        }
        let begin = if trigger { Some(command) } else { None };
        let mut out = ArrayTick {
            buses: [SpiBus::default(); LANES],
            lanes: [LaneStatus::default(); LANES],
        };
        for (i, lane) in self.lanes.iter_mut().enumerate() {
            let (bus, status) = lane.tick(begin);
            out.buses[i] = bus;
            out.lanes[i] = status;
        }
        out
    }

    /// Debug tap: the last phase command computed by `lane`.
    ///
    /// # Panics
    ///
    /// Panics if `lane` is 8 or more.
    pub fn last_phase(&self, lane: usize) -> Option<PhaseResult> {
        self.lanes[lane].controller.last_result()
    }

    /// Unconditionally returns every lane to idle and discards in-flight
    /// state.
    pub fn reset(&mut self) {
        self.lanes.iter_mut().for_each(Lane::reset);
        self.start_level = false;
        tracing::debug!("array reset");
    }
}
