//! Safe casting utilities for pointer deltas and keypoint counts

use crate::{Error, Result};

/// Safely convert usize to u32 with overflow checking
///
/// # Errors
///
/// Returns an error if the value exceeds u32::MAX
pub fn usize_to_u32(value: usize) -> Result<u32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} too large to fit in u32")))
}

/// Safely convert f64 to i32 with bounds checking, truncating toward zero
///
/// # Errors
///
/// Returns an error if the value is not finite or outside i32 range
#[allow(clippy::cast_possible_truncation)] // Truncation after bounds check is safe
pub fn f64_to_i32(value: f64) -> Result<i32> {
    if value.is_finite() && value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX) {
        Ok(value as i32)
    } else {
        Err(Error::InvalidInput(format!(
            "Value {value} cannot be safely converted to i32"
        )))
    }
}

/// Clamp an i32 into the i16 range used by X11 coordinates
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
pub fn i32_to_i16_clamp(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_usize_to_u32() {
        assert_eq!(usize_to_u32(42).unwrap(), 42);
        assert_eq!(usize_to_u32(0).unwrap(), 0);

        if std::mem::size_of::<usize>() > 4 {
            assert!(usize_to_u32(u32::MAX as usize + 1).is_err());
        }
    }

    #[test]
    fn test_f64_to_i32() {
        assert_eq!(f64_to_i32(42.7).unwrap(), 42);
        assert_eq!(f64_to_i32(-42.7).unwrap(), -42);
        assert_eq!(f64_to_i32(0.049).unwrap(), 0);

        assert!(f64_to_i32(f64::INFINITY).is_err());
        assert!(f64_to_i32(f64::NAN).is_err());
        assert!(f64_to_i32(2147483648.0).is_err());
    }

    #[test]
    fn test_i32_to_i16_clamp() {
        assert_eq!(i32_to_i16_clamp(12), 12);
        assert_eq!(i32_to_i16_clamp(100_000), i16::MAX);
        assert_eq!(i32_to_i16_clamp(-100_000), i16::MIN);
    }

    proptest! {
        #[test]
        fn prop_f64_to_i32_round_trips_integers(value in i32::MIN..=i32::MAX) {
            prop_assert_eq!(f64_to_i32(f64::from(value)).unwrap(), value);
        }

        #[test]
        fn prop_i32_to_i16_clamp_within_bounds(value in any::<i32>()) {
            let clamped = i32_to_i16_clamp(value);
            prop_assert_eq!(i32::from(clamped), value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)));
        }
    }
}
