//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map an angle in the range (-pi, pi] to (0, 2pi].
///
/// Zero maps to 2pi, so the result is never zero. Headings from the localisation source follow
/// this convention and bearing calculations rely on it.
pub fn map_pi_to_2pi<T>(value: T) -> T
where
    T: Float
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap_or_else(T::nan);

    if value <= T::zero() {
        tau_t + value
    }
    else {
        value
    }
}

/// Wrap an angle into the range (-pi, pi].
///
/// Angles already in range are returned unchanged (bit for bit). Non-finite values are returned
/// as is.
pub fn wrap_pi<T>(value: T) -> T
where
    T: Float
{
    if !value.is_finite() {
        return value
    }

    let pi_t: T = T::from(std::f64::consts::PI).unwrap_or_else(T::nan);
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap_or_else(T::nan);

    let mut wrapped = value;
    while wrapped > pi_t {
        wrapped = wrapped - tau_t;
    }
    while wrapped <= -pi_t {
        wrapped = wrapped + tau_t;
    }

    wrapped
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn test_map_pi_to_2pi() {
        assert_eq!(map_pi_to_2pi(1f64), 1f64);
        assert_eq!(map_pi_to_2pi(PI), PI);
        assert_eq!(map_pi_to_2pi(0f64), TAU);
        assert_eq!(map_pi_to_2pi(-1f64), TAU - 1f64);
        assert_eq!(map_pi_to_2pi(-PI), PI);
    }

    #[test]
    fn test_wrap_pi() {
        assert_eq!(wrap_pi(0.5f64), 0.5f64);
        assert_eq!(wrap_pi(PI), PI);
        assert_eq!(wrap_pi(-PI), PI);
        assert!((wrap_pi(-TAU) - 0.0).abs() < 1e-12);
        assert!((wrap_pi(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!((wrap_pi(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-12);
        assert!(wrap_pi(f64::NAN).is_nan());
        assert_eq!(wrap_pi(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_wrap_pi_range() {
        let mut a = -10.0 * PI;
        while a < 10.0 * PI {
            let w = wrap_pi(a);
            assert!(w > -PI && w <= PI, "wrap_pi({}) = {}", a, w);
            a += 0.01;
        }
    }
}
