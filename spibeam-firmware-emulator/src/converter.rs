use spibeam_core::{common::Degrees, params::PHASE_CODE_GAIN, phase::PhaseCode};

use crate::multiplier::PipelinedMultiplier;

/// Degree-to-phase-code stage: multiplies an unsigned Q9.7 degree value by
/// the Q8.8 conversion gain (a Q17.15 product) and truncates to the 16-bit
/// phase code. 360° wraps to code 0.
#[derive(Clone, Debug)]
pub struct DegreeConverter {
    multiplier: PipelinedMultiplier,
}

impl DegreeConverter {
    pub fn new(input_delay: usize, output_delay: usize) -> Self {
        Self {
            multiplier: PipelinedMultiplier::new(input_delay, output_delay),
        }
    }

    pub const fn latency(&self) -> usize {
        self.multiplier.latency()
    }

    pub fn tick(&mut self, degrees: Degrees, valid: bool) -> Option<PhaseCode> {
        self.multiplier
            .tick(degrees.raw() as i64, PHASE_CODE_GAIN as i64, valid)
            .map(|product| PhaseCode(((product >> 15) & 0xFFFF) as u16))
    }

    pub fn reset(&mut self) {
        self.multiplier.reset();
    }
}
