//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where 
    T: Float 
{
    target_range.0 
        + ((value - source_range.0) 
        * (target_range.1 - target_range.0) 
        / (source_range.1 - source_range.0))
}

pub fn clamp<T>(value: &T, min: &T, max: &T) -> T 
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Fold a difference between two values on a circular domain `[min, max)` onto the shortest
/// equivalent path.
///
/// Differences whose magnitude is at most half the domain width are returned unchanged. For
/// example on `[0, 360)` a difference of `350` becomes `-10`, and `-190` becomes `170`.
pub fn fold_continuous<T>(diff: T, min: T, max: T) -> T
where
    T: Float
{
    let range = max - min;
    let half_range = range / T::from(2.0).unwrap();

    if diff.abs() <= half_range {
        diff
    }
    else {
        rem_euclid(diff + half_range, range) - half_range
    }
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
/// This result is not an element of the function's codomain, but it is the
/// closest floating point number in the real numbers and thus fulfills the
/// property `self == self.div_euclid(rhs) * rhs + self.rem_euclid(rhs)`
/// approximatively.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fold_continuous() {
        assert_eq!(fold_continuous(350f64, 0.0, 360.0), -10.0);
        assert_eq!(fold_continuous(-350f64, 0.0, 360.0), 10.0);
        assert_eq!(fold_continuous(-190f64, 0.0, 360.0), 170.0);
        assert_eq!(fold_continuous(180f64, 0.0, 360.0), 180.0);
        assert_eq!(fold_continuous(45f64, 0.0, 360.0), 45.0);
        assert_eq!(fold_continuous(720f64 + 10.0, 0.0, 360.0), 10.0);

        // Symmetric pixel domain
        assert_eq!(fold_continuous(639.5f64, -320.0, 320.0), -0.5);
        assert_eq!(fold_continuous(-0.5f64, -320.0, 320.0), -0.5);
    }

    #[test]
    fn test_lin_map_and_clamp() {
        assert_eq!(lin_map((0f64, 10.0), (1.0, 0.0), 2.5), 0.75);
        assert_eq!(clamp(&1.5f64, &0.0, &1.0), 1.0);
        assert_eq!(clamp(&-0.5f64, &0.0, &1.0), 0.0);
        assert_eq!(clamp(&0.25f64, &0.0, &1.0), 0.25);
    }

    #[test]
    fn test_rem_euclid() {
        assert_eq!(rem_euclid(-10f64, 360.0), 350.0);
        assert_eq!(rem_euclid(370f64, 360.0), 10.0);
    }
}
