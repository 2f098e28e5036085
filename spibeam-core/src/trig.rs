use thiserror::Error;

use crate::phase::{PhaseCode, SinCos};

/// A fault signalled by the trigonometric collaborator for a pathological
/// phase code. Fatal for the affected element's result; there is no retry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("trigonometric primitive fault on phase code {code:?}")]
pub struct TrigFault {
    /// The phase code that produced the fault.
    pub code: PhaseCode,
}

/// The contract of the external phase-code → sine/cosine primitive.
///
/// Implementations return signed Q1.15 samples of the sine and cosine of
/// `2π · code / 2^16` after a fixed pipeline latency.
pub trait TrigPrimitive {
    /// The fixed pipeline latency, in steps of the global clock.
    fn latency(&self) -> usize;

    /// Looks up the sine and cosine of the given phase code.
    fn sin_cos(&self, code: PhaseCode) -> Result<SinCos, TrigFault>;
}

/// Reference implementation quantizing `f64` trigonometry into Q1.15.
///
/// Rounds to nearest and saturates +1.0 to the largest representable value;
/// never faults. The latency matches the pipeline depth of the hardware
/// rotator this stands in for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuantizedTrig;

impl QuantizedTrig {
    /// Pipeline depth of the primitive this stands in for.
    pub const LATENCY: usize = 18;

    fn quantize(value: f64) -> i16 {
        ((value * 32768.0).round() as i32).clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }
}

impl TrigPrimitive for QuantizedTrig {
    fn latency(&self) -> usize {
        Self::LATENCY
    }

    fn sin_cos(&self, code: PhaseCode) -> Result<SinCos, TrigFault> {
        let theta = code.0 as f64 / 65536.0 * std::f64::consts::TAU;
        Ok(SinCos {
            sin: Self::quantize(theta.sin()),
            cos: Self::quantize(theta.cos()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[test]
    #[case(0, 32767, 0x0000)]
    #[case(32767, 0, 0x4000)]
    #[case(0, -32768, 0x8000)]
    #[case(-32768, 0, 0xC000)]
    #[case(23170, 23170, 0x2000)]
    fn quantized_samples(#[case] sin: i16, #[case] cos: i16, #[case] code: u16) {
        assert_eq!(
            Ok(SinCos { sin, cos }),
            QuantizedTrig.sin_cos(PhaseCode(code))
        );
    }

    #[test]
    fn latency_is_fixed() {
        assert_eq!(QuantizedTrig::LATENCY, QuantizedTrig.latency());
    }
}
