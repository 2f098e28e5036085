use spibeam_core::{
    beam::{BeamCommand, BeamMode},
    common::{Degrees, Millimeters},
    phase::{PhaseCode, PhaseResult, SinCos},
    trig::{TrigFault, TrigPrimitive},
};
use spibeam_driver::steering::{q14_from_offset_product, q14_from_tilt_product, turn_from_product};

use crate::{converter::DegreeConverter, delay_line::DelayLine, multiplier::PipelinedMultiplier};

/// Input-alignment registers of every multiply stage, in steps.
pub(crate) const MUL_INPUT_DELAY: usize = 1;
/// Output-alignment registers of every multiply stage, in steps.
pub(crate) const MUL_OUTPUT_DELAY: usize = 1;

/// One element's inputs, presented together with the start pulse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseRequest {
    pub azimuth: Degrees,
    pub elevation: Degrees,
    pub mode: BeamMode,
    pub x: Millimeters,
    pub y: Millimeters,
}

impl PhaseRequest {
    pub fn new(command: &BeamCommand, x: Millimeters, y: Millimeters) -> Self {
        Self {
            azimuth: command.azimuth,
            elevation: command.elevation,
            mode: command.mode,
            x,
            y,
        }
    }
}

/// A faulted lookup rides the pipeline as a flag beside zeroed data, so that
/// it reaches the output at the same step a healthy result would.
type Fault = Option<PhaseCode>;

fn lookup<T: TrigPrimitive>(trig: &T, code: PhaseCode) -> (SinCos, Fault) {
    match trig.sin_cos(code) {
        Ok(sample) => (sample, None),
        Err(TrigFault { code }) => (SinCos { sin: 0, cos: 0 }, Some(code)),
    }
}

/// The per-element phase pipeline: two degree converters, the external
/// trigonometric primitive behind its fixed latency, and four multiply
/// stages with their alignment registers.
///
/// A start pulse on `tick` begins one element; the result emerges exactly
/// `latency()` steps later. At most one element is in flight.
#[derive(Clone, Debug)]
pub struct PhaseCalculator<T> {
    trig: T,
    azimuth_conv: DegreeConverter,
    elevation_conv: DegreeConverter,
    azimuth_rom: DelayLine<Option<(SinCos, Fault)>>,
    elevation_rom: DelayLine<Option<(SinCos, Fault)>>,
    offset_align: DelayLine<Option<(Millimeters, Millimeters, BeamMode)>>,
    mul_x: PipelinedMultiplier,
    mul_y: PipelinedMultiplier,
    mode_offset: DelayLine<Option<(BeamMode, Fault)>>,
    cos_elevation_align: DelayLine<Option<(i16, Fault)>>,
    x_cos: Option<i32>,
    y_sin: Option<i32>,
    mode_shifted: Option<(BeamMode, Fault)>,
    aim: Option<i32>,
    mode_aim: Option<(BeamMode, Fault)>,
    mul_tilt: PipelinedMultiplier,
    mode_tilt: DelayLine<Option<(BeamMode, Fault)>>,
    mul_turn: PipelinedMultiplier,
    fault_turn: DelayLine<Option<Fault>>,
    busy: bool,
}

impl<T: TrigPrimitive> PhaseCalculator<T> {
    pub fn new(trig: T) -> Self {
        let converter = || DegreeConverter::new(MUL_INPUT_DELAY, MUL_OUTPUT_DELAY);
        let multiplier = || PipelinedMultiplier::new(MUL_INPUT_DELAY, MUL_OUTPUT_DELAY);
        let mul_latency = multiplier().latency();
        let trig_latency = trig.latency();
        Self {
            azimuth_conv: converter(),
            elevation_conv: converter(),
            azimuth_rom: DelayLine::new(trig_latency),
            elevation_rom: DelayLine::new(trig_latency),
            offset_align: DelayLine::new(converter().latency() + trig_latency),
            mul_x: multiplier(),
            mul_y: multiplier(),
            mode_offset: DelayLine::new(mul_latency),
            cos_elevation_align: DelayLine::new(mul_latency + 2),
            x_cos: None,
            y_sin: None,
            mode_shifted: None,
            aim: None,
            mode_aim: None,
            mul_tilt: multiplier(),
            mode_tilt: DelayLine::new(mul_latency),
            mul_turn: multiplier(),
            fault_turn: DelayLine::new(mul_latency),
            busy: false,
            trig,
        }
    }

    /// Steps from a start pulse to the matching output pulse.
    pub fn latency(&self) -> usize {
        self.azimuth_conv.latency() + self.trig.latency() + 3 * self.mul_x.latency() + 2
    }

    pub const fn busy(&self) -> bool {
        self.busy
    }

    /// Advances the pipeline one step, optionally starting a new element.
    pub fn tick(&mut self, request: Option<&PhaseRequest>) -> Option<Result<PhaseResult, TrigFault>> {
        if request.is_some() {
            debug_assert!(!self.busy, "one element in flight per lane");
            self.busy = true;
        }

        // register outputs of the previous step
        let x_cos = self.x_cos.take();
        let y_sin = self.y_sin.take();
        let mode_shifted = self.mode_shifted.take();
        let aim = self.aim.take();
        let mode_aim = self.mode_aim.take();

        // degree conversion
        let azimuth_code = self
            .azimuth_conv
            .tick(request.map_or(Degrees::ZERO, |r| r.azimuth), request.is_some());
        let elevation_code = self
            .elevation_conv
            .tick(request.map_or(Degrees::ZERO, |r| r.elevation), request.is_some());

        // trigonometric primitive, behind its fixed latency
        let azimuth_lookup = azimuth_code.map(|code| lookup(&self.trig, code));
        let azimuth_sample = self.azimuth_rom.tick(azimuth_lookup);
        let elevation_lookup = elevation_code.map(|code| lookup(&self.trig, code));
        let elevation_sample = self.elevation_rom.tick(elevation_lookup);

        // offsets and mode re-synchronized with the trig outputs
        let aligned = self
            .offset_align
            .tick(request.map(|r| (r.x, r.y, r.mode)));
        debug_assert_eq!(azimuth_sample.is_some(), aligned.is_some());

        // x·cos(az) and y·sin(az), Q9.7 × Q1.15 → Q10.22
        let (x_operands, y_operands, offset_lane) = match (azimuth_sample, aligned) {
            (Some((sample, fault)), Some((x, y, mode))) => (
                Some((x.raw() as i64, sample.cos as i64)),
                Some((y.raw() as i64, sample.sin as i64)),
                Some((mode, fault)),
            ),
            _ => (None, None, None),
        };
        let (xa, xb) = x_operands.unwrap_or((0, 0));
        let (ya, yb) = y_operands.unwrap_or((0, 0));
        let x_product = self.mul_x.tick(xa, xb, x_operands.is_some());
        let y_product = self.mul_y.tick(ya, yb, y_operands.is_some());
        let mode_product = self.mode_offset.tick(offset_lane);
        let cos_elevation = self
            .cos_elevation_align
            .tick(elevation_sample.map(|(sample, fault)| (sample.cos, fault)));

        // truncate to Q10.14 and register
        self.x_cos = x_product.map(q14_from_offset_product);
        self.y_sin = y_product.map(q14_from_offset_product);
        self.mode_shifted = mode_product;

        // aim difference, registered
        if let (Some(x_cos), Some(y_sin)) = (x_cos, y_sin) {
            self.aim = Some(x_cos - y_sin);
            self.mode_aim = mode_shifted;
        }

        // tilt product, Q10.14 × Q1.15 → Q11.29, truncated to Q11.14
        debug_assert_eq!(aim.is_some(), cos_elevation.is_some());
        let tilt_lane = match (aim, cos_elevation, mode_aim) {
            (Some(aim), Some((cos_elevation, elevation_fault)), Some((mode, azimuth_fault))) => {
                Some((aim, cos_elevation, mode, azimuth_fault.or(elevation_fault)))
            }
            _ => None,
        };
        let (ta, tb) = tilt_lane.map_or((0, 0), |(aim, cos, _, _)| (aim as i64, cos as i64));
        let tilt_product = self.mul_tilt.tick(ta, tb, tilt_lane.is_some());
        let mode_turn = self
            .mode_tilt
            .tick(tilt_lane.map(|(_, _, mode, fault)| (mode, fault)));

        // turn product, Q11.14 × Q0.17 → Q11.31, low 32 bits as Q1.31
        let turn_lane = match (tilt_product, mode_turn) {
            (Some(product), Some((mode, fault))) => {
                Some((q14_from_tilt_product(product) as i64, mode.kturn() as i64, fault))
            }
            _ => None,
        };
        let (ka, kb) = turn_lane.map_or((0, 0), |(tilted, kturn, _)| (tilted, kturn));
        let turn_product = self.mul_turn.tick(ka, kb, turn_lane.is_some());
        let fault_out = self.fault_turn.tick(turn_lane.map(|(_, _, fault)| fault));

        match (turn_product, fault_out) {
            (Some(product), Some(fault)) => {
                self.busy = false;
                Some(match fault {
                    Some(code) => Err(TrigFault { code }),
                    None => {
                        let turn = turn_from_product(product);
                        Ok(PhaseResult {
                            turn,
                            index: turn.index(),
                        })
                    }
                })
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.azimuth_conv.reset();
        self.elevation_conv.reset();
        self.azimuth_rom.reset();
        self.elevation_rom.reset();
        self.offset_align.reset();
        self.mul_x.reset();
        self.mul_y.reset();
        self.mode_offset.reset();
        self.cos_elevation_align.reset();
        self.x_cos = None;
        self.y_sin = None;
        self.mode_shifted = None;
        self.aim = None;
        self.mode_aim = None;
        self.mul_tilt.reset();
        self.mode_tilt.reset();
        self.mul_turn.reset();
        self.fault_turn.reset();
        self.busy = false;
    }
}

#[cfg(test)]
mod tests {
    use spibeam_core::{common::deg, trig::QuantizedTrig};
    use spibeam_driver::steering::Steering;

    use super::*;

    fn run<T: TrigPrimitive>(
        calculator: &mut PhaseCalculator<T>,
        request: PhaseRequest,
    ) -> (usize, Result<PhaseResult, TrigFault>) {
        let mut out = calculator.tick(Some(&request));
        let mut steps = 0;
        while out.is_none() {
            steps += 1;
            assert!(steps <= calculator.latency(), "no output pulse");
            out = calculator.tick(None);
        }
        (steps, out.unwrap())
    }

    #[rstest::rstest]
    #[test]
    #[case(0.0, 0.0, BeamMode::Transmit, 0, 0)]
    #[case(0.0, 0.0, BeamMode::Transmit, 128, 0)]
    #[case(45.0, 30.0, BeamMode::Transmit, 9920, -9920)]
    #[case(123.5, 60.0, BeamMode::Receive, -14880, 480)]
    #[case(359.5, 89.5, BeamMode::Receive, 320, 14880)]
    fn matches_the_pure_pipeline(
        #[case] azimuth: f32,
        #[case] elevation: f32,
        #[case] mode: BeamMode,
        #[case] x: i16,
        #[case] y: i16,
    ) {
        let command = BeamCommand {
            azimuth: azimuth * deg,
            elevation: elevation * deg,
            mode,
        };
        let x = Millimeters::from_raw(x);
        let y = Millimeters::from_raw(y);
        let expected = Steering::new(&command, &QuantizedTrig)
            .unwrap()
            .phase_at(x, y);

        let mut calculator = PhaseCalculator::new(QuantizedTrig);
        let (steps, result) = run(&mut calculator, PhaseRequest::new(&command, x, y));
        assert_eq!(calculator.latency(), steps);
        assert_eq!(Ok(expected), result);
    }

    #[test]
    fn busy_spans_the_computation() {
        let mut calculator = PhaseCalculator::new(QuantizedTrig);
        assert!(!calculator.busy());
        let request = PhaseRequest::new(&BeamCommand::BORESIGHT, Millimeters::ZERO, Millimeters::ZERO);
        let mut out = calculator.tick(Some(&request));
        assert!(calculator.busy());
        while out.is_none() {
            assert!(calculator.busy());
            out = calculator.tick(None);
        }
        assert!(!calculator.busy());
    }

    #[test]
    fn back_to_back_elements_reuse_the_pipeline() {
        let command = BeamCommand {
            azimuth: 10.0 * deg,
            elevation: 5.0 * deg,
            mode: BeamMode::Receive,
        };
        let steering = Steering::new(&command, &QuantizedTrig).unwrap();
        let mut calculator = PhaseCalculator::new(QuantizedTrig);
        for raw in [-9920i16, -320, 320, 9920] {
            let x = Millimeters::from_raw(raw);
            let (_, result) = run(&mut calculator, PhaseRequest::new(&command, x, Millimeters::ZERO));
            assert_eq!(Ok(steering.phase_at(x, Millimeters::ZERO)), result);
        }
    }

    #[derive(Clone)]
    struct FaultyTrig;
    impl TrigPrimitive for FaultyTrig {
        fn latency(&self) -> usize {
            4
        }
        fn sin_cos(&self, code: PhaseCode) -> Result<SinCos, TrigFault> {
            Err(TrigFault { code })
        }
    }

    #[test]
    fn fault_emerges_at_the_output_latency() {
        let mut calculator = PhaseCalculator::new(FaultyTrig);
        let request = PhaseRequest::new(&BeamCommand::BORESIGHT, Millimeters::ZERO, Millimeters::ZERO);
        let (steps, result) = run(&mut calculator, request);
        assert_eq!(calculator.latency(), steps);
        assert_eq!(Err(TrigFault { code: PhaseCode::ZERO }), result);
    }

    #[test]
    fn reset_discards_the_element_in_flight() {
        let mut calculator = PhaseCalculator::new(QuantizedTrig);
        let request = PhaseRequest::new(&BeamCommand::BORESIGHT, Millimeters::ZERO, Millimeters::ZERO);
        calculator.tick(Some(&request));
        calculator.tick(None);
        calculator.reset();
        assert!(!calculator.busy());
        for _ in 0..2 * calculator.latency() {
            assert_eq!(None, calculator.tick(None));
        }
    }
}
