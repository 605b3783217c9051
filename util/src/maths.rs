//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value into the inclusive range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap an angle in degrees into the range [0, 360).
pub fn wrap_360<T>(value_deg: T) -> T
where
    T: Float,
{
    let full_turn = T::from(360.0).unwrap_or_else(T::max_value);
    let wrapped = rem_euclid(value_deg, full_turn);

    // Guard the round-off case documented on rem_euclid
    if wrapped >= full_turn {
        T::zero()
    } else {
        wrapped
    }
}

/// Zero a value whose magnitude is below the threshold.
pub fn deadband<T>(value: T, threshold: T) -> T
where
    T: Float,
{
    if value.abs() < threshold {
        T::zero()
    } else {
        value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-5.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(0.5, 0.0, 1.0), 0.5);
    }

    #[test]
    fn test_wrap_360() {
        assert_eq!(wrap_360(370.0), 10.0);
        assert_eq!(wrap_360(-90.0), 270.0);
        assert_eq!(wrap_360(360.0), 0.0);
        assert_eq!(wrap_360(0.0), 0.0);
        assert!(wrap_360(-1e-20f64) < 360.0);
    }

    #[test]
    fn test_deadband() {
        assert_eq!(deadband(0.05f32, 0.1), 0.0);
        assert_eq!(deadband(-0.05f32, 0.1), 0.0);
        assert_eq!(deadband(0.5f32, 0.1), 0.5);
    }
}
