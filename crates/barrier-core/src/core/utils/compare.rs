use std::cmp::Ordering;

/// Tolerance under which two fitness values are considered equal.
pub const EPSILON: f64 = 1e-10;

/// Compares two values with an absolute tolerance.
///
/// Two values are equal iff `|a - b| <= eps`. Otherwise the ordering is the
/// ordinary numeric ordering. NaN compares equal to everything, which keeps
/// selection loops from picking a NaN-valued node over a finite one.
///
/// # Arguments
///
/// * `a` - The left-hand value.
/// * `b` - The right-hand value.
/// * `eps` - The absolute tolerance.
///
/// # Return
///
/// The tolerance-aware [`Ordering`] of `a` relative to `b`.
pub fn compare(a: f64, b: f64, eps: f64) -> Ordering {
    let diff = a - b;
    if diff > eps {
        Ordering::Greater
    } else if diff < -eps {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

/// Shorthand for [`compare`] with the default [`EPSILON`].
#[inline]
pub fn compare_values(a: f64, b: f64) -> Ordering {
    compare(a, b, EPSILON)
}

#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    compare_values(a, b) == Ordering::Equal
}

#[inline]
pub fn definitely_greater(a: f64, b: f64) -> bool {
    compare_values(a, b) == Ordering::Greater
}

#[inline]
pub fn definitely_less(a: f64, b: f64) -> bool {
    compare_values(a, b) == Ordering::Less
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_within_tolerance_compare_equal() {
        assert_eq!(compare(1.0, 1.0 + 1e-11, EPSILON), Ordering::Equal);
        assert_eq!(compare(1.0 + 1e-11, 1.0, EPSILON), Ordering::Equal);
        assert!(approx_eq(-3.0, -3.0));
    }

    #[test]
    fn values_outside_tolerance_use_numeric_order() {
        assert_eq!(compare(2.0, 1.0, EPSILON), Ordering::Greater);
        assert_eq!(compare(1.0, 2.0, EPSILON), Ordering::Less);
        assert!(definitely_greater(1.0 + 1e-9, 1.0));
        assert!(definitely_less(1.0, 1.0 + 1e-9));
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        assert_eq!(compare(0.5, 0.0, 0.5), Ordering::Equal);
        assert_eq!(compare(0.0, 0.5, 0.5), Ordering::Equal);
    }

    #[test]
    fn nan_compares_equal() {
        assert_eq!(compare_values(f64::NAN, 1.0), Ordering::Equal);
        assert_eq!(compare_values(1.0, f64::NAN), Ordering::Equal);
    }

    #[test]
    fn infinite_threshold_is_never_exceeded() {
        assert!(!definitely_greater(1e300, f64::INFINITY));
    }
}
