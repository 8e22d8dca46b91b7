use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Simulation time in seconds. Fixed-point so that movement and production
/// timers advance identically on every platform.
pub type Seconds = Fixed64;

/// Ticks count calls to `World::update`.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization, never in sim loop.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display and geometry.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Convert a frame delta in seconds into simulation time.
///
/// Negative and NaN deltas become zero; deltas beyond the representable
/// range saturate at [`Fixed64::MAX`].
pub fn seconds(v: f64) -> Seconds {
    if v.is_nan() || v <= 0.0 {
        return Seconds::ZERO;
    }
    Seconds::checked_from_num(v).unwrap_or(Seconds::MAX)
}

/// Checked division for Fixed64 that returns None on zero divisor or overflow.
#[inline]
pub fn checked_div_64(a: Fixed64, b: Fixed64) -> Option<Fixed64> {
    a.checked_div(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed64_basic_arithmetic() {
        let a = f64_to_fixed64(1.5);
        let b = f64_to_fixed64(2.0);
        assert_eq!(fixed64_to_f64(a + b), 3.5);
    }

    #[test]
    fn fixed64_checked_div_by_zero() {
        let a = f64_to_fixed64(1.0);
        assert!(checked_div_64(a, Fixed64::ZERO).is_none());
    }

    #[test]
    fn seconds_clamps_negative_and_nan() {
        assert_eq!(seconds(-3.0), Seconds::ZERO);
        assert_eq!(seconds(f64::NAN), Seconds::ZERO);
        assert_eq!(seconds(0.0), Seconds::ZERO);
    }

    #[test]
    fn seconds_saturates_huge_deltas() {
        assert_eq!(seconds(1e300), Seconds::MAX);
        assert_eq!(seconds(f64::INFINITY), Seconds::MAX);
    }

    #[test]
    fn seconds_keeps_ordinary_values() {
        assert_eq!(fixed64_to_f64(seconds(0.25)), 0.25);
        assert_eq!(fixed64_to_f64(seconds(2.0)), 2.0);
    }
}
