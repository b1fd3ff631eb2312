//! Integer heading arithmetic over whole degrees.

use core::fmt;
use core::ops::{Add, Sub};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One full revolution in degrees.
pub const FULL_TURN: i32 = 360;
/// Half a revolution in degrees.
pub const HALF_TURN: i32 = 180;

/// A heading in whole degrees, always within `[0, 360)`.
///
/// Arithmetic wraps with a single step: a result above 359 has 360 subtracted
/// once, a result below 0 has 360 added once. Operands must therefore stay
/// strictly within one revolution (`|delta| < 360`).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "i32", into = "i32"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Angle(i32);

impl Angle {
    /// Construct a heading, normalizing any integer into `[0, 360)`.
    pub const fn new(degrees: i32) -> Self {
        Angle(degrees.rem_euclid(FULL_TURN))
    }

    /// The heading in degrees, within `[0, 360)`.
    pub const fn degrees(self) -> i32 {
        self.0
    }

    /// The mirrored heading, i.e. the base facing backwards.
    pub fn inverse(self) -> Self {
        self - HALF_TURN
    }

    /// Unsigned shortest-arc distance to `other`, within `[0, 180]`.
    pub fn distance(self, other: Angle) -> i32 {
        let d = (other - self).degrees();
        d.min(FULL_TURN - d)
    }

    /// The heading in radians.
    pub fn to_radians(self) -> f64 {
        (self.0 as f64).to_radians()
    }

    fn wrap(raw: i32) -> Self {
        let wrapped = if raw > FULL_TURN - 1 {
            raw - FULL_TURN
        } else if raw < 0 {
            raw + FULL_TURN
        } else {
            raw
        };
        debug_assert!(
            (0..FULL_TURN).contains(&wrapped),
            "angle operand exceeded one revolution: {raw}"
        );
        Angle(wrapped)
    }
}

impl From<i32> for Angle {
    fn from(degrees: i32) -> Self {
        Angle::new(degrees)
    }
}

impl From<Angle> for i32 {
    fn from(angle: Angle) -> Self {
        angle.0
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle {
        Angle::wrap(self.0 + rhs.0)
    }
}

impl Add<i32> for Angle {
    type Output = Angle;

    fn add(self, rhs: i32) -> Angle {
        Angle::wrap(self.0 + rhs)
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Angle {
        Angle::wrap(self.0 - rhs.0)
    }
}

impl Sub<i32> for Angle {
    type Output = Angle;

    fn sub(self, rhs: i32) -> Angle {
        Angle::wrap(self.0 - rhs)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_normalizes() {
        assert_eq!(Angle::new(0).degrees(), 0);
        assert_eq!(Angle::new(360).degrees(), 0);
        assert_eq!(Angle::new(725).degrees(), 5);
        assert_eq!(Angle::new(-90).degrees(), 270);
    }

    #[test]
    fn test_add_simple() {
        assert_eq!(Angle::new(5) + Angle::new(10), Angle::new(15));
        assert_eq!(Angle::new(5) + 10, Angle::new(15));
    }

    #[test]
    fn test_add_rollover() {
        assert_eq!(Angle::new(300) + Angle::new(90), Angle::new(30));
        assert_eq!(Angle::new(300) + 90, Angle::new(30));
        assert_eq!(Angle::new(359) + 1, Angle::new(0));
    }

    #[test]
    fn test_sub_simple() {
        assert_eq!(Angle::new(10) - Angle::new(8), Angle::new(2));
        assert_eq!(Angle::new(10) - 8, Angle::new(2));
    }

    #[test]
    fn test_sub_rollover() {
        assert_eq!(Angle::new(90) - Angle::new(130), Angle::new(320));
        assert_eq!(Angle::new(90) - 130, Angle::new(320));
        assert_eq!(Angle::new(0) - 1, Angle::new(359));
    }

    #[test]
    fn test_negative_delta() {
        assert_eq!(Angle::new(10) + -20, Angle::new(350));
        assert_eq!(Angle::new(350) - -20, Angle::new(10));
    }

    #[test]
    fn test_inverse() {
        assert_eq!(Angle::new(32).inverse(), Angle::new(212));
        assert_eq!(Angle::new(0).inverse(), Angle::new(180));
        assert_eq!(Angle::new(180).inverse(), Angle::new(0));
        assert_eq!(Angle::new(359).inverse(), Angle::new(179));
    }

    #[test]
    fn test_distance() {
        assert_eq!(Angle::new(2).distance(Angle::new(358)), 4);
        assert_eq!(Angle::new(358).distance(Angle::new(2)), 4);
        assert_eq!(Angle::new(0).distance(Angle::new(180)), 180);
        assert_eq!(Angle::new(190).distance(Angle::new(225)), 35);
        assert_eq!(Angle::new(45).distance(Angle::new(45)), 0);
    }

    #[test]
    fn test_ordering() {
        assert!(Angle::new(10) < Angle::new(11));
        assert!(Angle::new(359) > Angle::new(0));
        assert_eq!(Angle::new(370).cmp(&Angle::new(10)), core::cmp::Ordering::Equal);
    }

    proptest! {
        #[test]
        fn add_stays_in_range(a in -1000i32..1000, b in -359i32..360) {
            let sum = Angle::new(a) + b;
            prop_assert!((0..360).contains(&sum.degrees()));
        }

        #[test]
        fn add_then_sub_round_trips(a in -1000i32..1000, b in -359i32..360) {
            prop_assert_eq!((Angle::new(a) + b) - b, Angle::new(a.rem_euclid(360)));
        }

        #[test]
        fn double_inverse_is_identity(a in 0i32..360) {
            prop_assert_eq!(Angle::new(a).inverse().inverse(), Angle::new(a));
        }
    }
}
