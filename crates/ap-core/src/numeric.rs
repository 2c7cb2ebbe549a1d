use crate::CoreError;

/// Floating point type used throughout the autopilot
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// True when `interval` is large enough to divide by.
///
/// Anything at or below the smallest positive normal double is treated as no
/// elapsed time at all.
pub fn is_usable_interval(interval: Real) -> bool {
    interval > Real::MIN_POSITIVE
}

/// Wrap `value` into the half-open range `[min, max)`.
///
/// Returns `value` unchanged when the range is empty or inverted.
pub fn wrap_periodic(value: Real, min: Real, max: Real) -> Real {
    let span = max - min;
    if !(span > 0.0) || !value.is_finite() {
        return value;
    }
    let wrapped = (value - min).rem_euclid(span) + min;
    // rem_euclid can round up to exactly `span` for tiny negative offsets
    if wrapped >= max { min } else { wrapped }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn wrapped_value_stays_in_range(v in -1.0e6_f64..1.0e6_f64) {
            let w = wrap_periodic(v, -180.0, 180.0);
            prop_assert!(w >= -180.0 && w < 180.0);
        }
    }
}
