//! Input validation: water-parameter bounds and name lengths
//!
//! All checks run before any store call. Ranges mirror the values a hobbyist
//! test kit can actually report; anything outside is a client error, not a
//! chemistry emergency.

use crate::error::{CoreError, Result};
use aquatrack_types::WaterParams;

pub const MIN_NAME_LEN: usize = 1;
pub const MAX_NAME_LEN: usize = 255;

/// Inclusive bounds for each water parameter.
const AMMONIA_RANGE: (f64, f64) = (0.0, 6.0);
const NITRATE_RANGE: (f64, f64) = (0.0, 300.0);
const NITRITE_RANGE: (f64, f64) = (0.0, 100.0);
const HARDNESS_RANGE: (f64, f64) = (0.0, 400.0);
const CHLORINE_RANGE: (f64, f64) = (0.0, 20.0);
const ALKALINITY_RANGE: (f64, f64) = (0.0, 400.0);
const PH_RANGE: (f64, f64) = (6.0, 14.0);

/// Check a display name: required, 1..=255 characters.
pub fn validate_name(field: &str, name: &str) -> Result<()> {
    if name.len() < MIN_NAME_LEN {
        return Err(CoreError::validation(field, "must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(CoreError::validation(
            field,
            format!("must be at most {} characters", MAX_NAME_LEN),
        ));
    }
    Ok(())
}

/// Check an optional name, accepting absence.
pub fn validate_optional_name(field: &str, name: Option<&str>) -> Result<()> {
    match name {
        Some(n) => validate_name(field, n),
        None => Ok(()),
    }
}

/// Check every present reading against its allowed range.
pub fn validate_water_params(water: &WaterParams) -> Result<()> {
    check_range("ammonia", water.ammonia, AMMONIA_RANGE)?;
    check_range("nitrate", water.nitrate, NITRATE_RANGE)?;
    check_range("nitrite", water.nitrite, NITRITE_RANGE)?;
    check_range("hardness", water.hardness, HARDNESS_RANGE)?;
    check_range("chlorine", water.chlorine, CHLORINE_RANGE)?;
    check_range("alkalinity", water.alkalinity, ALKALINITY_RANGE)?;
    check_range("pH", water.ph, PH_RANGE)?;
    Ok(())
}

fn check_range(field: &str, value: Option<f64>, (min, max): (f64, f64)) -> Result<()> {
    if let Some(v) = value {
        if !v.is_finite() || v < min || v > max {
            return Err(CoreError::validation(
                field,
                format!("must be between {} and {}", min, max),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water_with_ph(ph: f64) -> WaterParams {
        WaterParams {
            ph: Some(ph),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_typical_freshwater_readings() {
        let water = WaterParams {
            ammonia: Some(0.0),
            nitrate: Some(20.0),
            nitrite: Some(0.25),
            hardness: Some(150.0),
            chlorine: Some(0.0),
            alkalinity: Some(120.0),
            ph: Some(7.0),
        };
        assert!(validate_water_params(&water).is_ok());
    }

    #[test]
    fn accepts_missing_readings() {
        assert!(validate_water_params(&WaterParams::default()).is_ok());
    }

    #[test]
    fn rejects_out_of_range_ph() {
        let err = validate_water_params(&water_with_ph(15.0)).unwrap_err();
        match err {
            CoreError::Validation { field, .. } => assert_eq!(field, "pH"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_boundary_violations_but_accepts_boundaries() {
        assert!(validate_water_params(&water_with_ph(6.0)).is_ok());
        assert!(validate_water_params(&water_with_ph(14.0)).is_ok());
        assert!(validate_water_params(&water_with_ph(5.9)).is_err());

        let negative_ammonia = WaterParams {
            ammonia: Some(-0.1),
            ..Default::default()
        };
        assert!(validate_water_params(&negative_ammonia).is_err());
    }

    #[test]
    fn rejects_non_finite_readings() {
        assert!(validate_water_params(&water_with_ph(f64::NAN)).is_err());
        assert!(validate_water_params(&water_with_ph(f64::INFINITY)).is_err());
    }

    #[test]
    fn name_length_bounds() {
        assert!(validate_name("name", "Betta tank").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"x".repeat(255)).is_ok());
        assert!(validate_name("name", &"x".repeat(256)).is_err());
    }

    #[test]
    fn optional_name_accepts_absence() {
        assert!(validate_optional_name("name", None).is_ok());
        assert!(validate_optional_name("name", Some("")).is_err());
    }
}
