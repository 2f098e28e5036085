use derive_more::Debug;

/// Marker to construct [`Degrees`] from a float literal, e.g. `90.0 * deg`.
#[allow(non_camel_case_types)]
pub struct deg;

/// Marker to construct [`Millimeters`] from a float literal, e.g. `2.5 * mm`.
#[allow(non_camel_case_types)]
pub struct mm;

/// An unsigned angle in degrees, stored as Q9.7 fixed point.
///
/// The raw value represents `degrees × 128`. Values at or beyond 360° are
/// accepted; they simply represent more than one turn.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Debug)]
#[debug("{}°", self.0 as f32 / 128.0)]
pub struct Degrees(u16);

impl Degrees {
    /// An angle of zero.
    pub const ZERO: Self = Self(0);

    /// Creates an angle from its raw Q9.7 representation.
    #[must_use]
    pub const fn from_raw(value: u16) -> Self {
        Self(value)
    }

    /// Returns the raw Q9.7 representation.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl std::ops::Mul<deg> for f32 {
    type Output = Degrees;

    fn mul(self, _rhs: deg) -> Self::Output {
        Degrees((((self * 128.0).round() as i64).rem_euclid(1 << 16)) as u16)
    }
}

/// A signed length in millimeters, stored as Q9.7 fixed point.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Debug)]
#[debug("{}mm", self.0 as f32 / 128.0)]
pub struct Millimeters(i16);

impl Millimeters {
    /// A length of zero.
    pub const ZERO: Self = Self(0);

    /// Creates a length from its raw Q9.7 representation.
    #[must_use]
    pub const fn from_raw(value: i16) -> Self {
        Self(value)
    }

    /// Returns the raw Q9.7 representation.
    #[must_use]
    pub const fn raw(self) -> i16 {
        self.0
    }
}

impl std::ops::Mul<mm> for f32 {
    type Output = Millimeters;

    fn mul(self, _rhs: mm) -> Self::Output {
        Millimeters(((self * 128.0).round() as i64 & 0xFFFF) as u16 as i16)
    }
}
