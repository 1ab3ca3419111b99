//! Longitude normalization helpers.
//!
//! Longitudes are periodic with a period of 360 degrees. These helpers map a
//! value onto one of the two common conventions, or onto the equivalent value
//! closest to a reference longitude.

/// Return the longitude equivalent to `value` in the range [0, 360).
pub fn constrain_360(value: f64) -> f64 {
    let val = value.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if val >= 360.0 {
        0.0
    } else {
        val + 0.0
    }
}

/// Return the longitude equivalent to `value` in the range (-180, 180].
///
/// The antimeridian is represented as +180, never -180.
pub fn constrain_180(value: f64) -> f64 {
    let val = constrain_360(value);
    if val > 180.0 {
        val - 360.0
    } else {
        val
    }
}

/// Return the smallest longitude equivalent to `target` that is greater than or
/// equal to `reference`.
///
/// With `reference = 10.0` and `target = 5.0` this returns `365.0`.
pub fn next_equivalent(reference: f64, target: f64) -> f64 {
    reference + constrain_360(target - reference)
}

/// Return the longitude equivalent to `value` that lies within 180 degrees of
/// `reference`, in the range [reference - 180, reference + 180).
pub fn unwrap_near(value: f64, reference: f64) -> f64 {
    if value.is_nan() || reference.is_nan() {
        return value;
    }
    next_equivalent(reference - 180.0, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constrain_360() {
        assert_eq!(constrain_360(0.0), 0.0);
        assert_eq!(constrain_360(360.0), 0.0);
        assert_eq!(constrain_360(-90.0), 270.0);
        assert_eq!(constrain_360(725.0), 5.0);
        assert_eq!(constrain_360(-0.0).to_bits(), 0.0f64.to_bits());
        assert!(constrain_360(-1e-17) < 360.0);
    }

    #[test]
    fn test_constrain_180() {
        assert_eq!(constrain_180(180.0), 180.0);
        assert_eq!(constrain_180(-180.0), 180.0);
        assert_eq!(constrain_180(190.0), -170.0);
        assert_eq!(constrain_180(-190.0), 170.0);
        assert_eq!(constrain_180(350.0), -10.0);
    }

    #[test]
    fn test_next_equivalent() {
        assert_eq!(next_equivalent(10.0, 5.0), 365.0);
        assert_eq!(next_equivalent(10.0, 15.0), 15.0);
        assert_eq!(next_equivalent(-180.0, 190.0), -170.0);
    }

    #[test]
    fn test_unwrap_near() {
        assert_eq!(unwrap_near(-179.0, 179.0), 181.0);
        assert_eq!(unwrap_near(179.0, -179.0), -181.0);
        assert_eq!(unwrap_near(10.0, 0.0), 10.0);
        assert!(unwrap_near(f64::NAN, 0.0).is_nan());
    }
}
