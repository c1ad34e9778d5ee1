use std::fmt;

use log::{info, warn};
use opencv::core::Mat;

use crate::config::PreprocessConfig;
use crate::error::{Error, Result};
use crate::extents::{find_extents, ExtentPair};
use crate::preprocess::preprocess_with;

/// Pixels per physical unit, derived from the reference photograph.
///
/// Only meaningful for images taken at the same camera distance and focal
/// length as the reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationRatio(f64);

impl CalibrationRatio {
    pub fn from_reference(reference: &ExtentPair, reference_height_units: f64) -> Result<Self> {
        check_reference_height(reference_height_units)?;

        let pixel_height = reference.pixel_height();
        if pixel_height == 0 {
            return Err(Error::DegenerateReference);
        }
        Ok(Self(pixel_height as f64 / reference_height_units))
    }

    pub fn pixels_per_unit(&self) -> f64 {
        self.0
    }

    pub fn to_units(&self, pixels: i32) -> f64 {
        pixels as f64 / self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightEstimate {
    /// Estimated height of the subject, in the units of the reference height.
    pub height: f64,
    pub pixels_per_unit: CalibrationRatio,
    pub reference: ExtentPair,
    pub subject: ExtentPair,
}

impl fmt::Display for HeightEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.height)
    }
}

/// Scales the subject's pixel extent by the ratio measured on the reference.
///
/// No perspective or distance correction is applied: both photographs are
/// assumed to share camera distance and focal characteristics.
pub fn estimate(
    ref_extents: &ExtentPair,
    ref_height_units: f64,
    subject_extents: &ExtentPair,
) -> Result<HeightEstimate> {
    let ratio = CalibrationRatio::from_reference(ref_extents, ref_height_units)?;

    let subject_pixels = subject_extents.pixel_height();
    if subject_pixels == 0 {
        warn!("subject has no vertical extent, estimate will be zero");
    }

    Ok(HeightEstimate {
        height: ratio.to_units(subject_pixels),
        pixels_per_unit: ratio,
        reference: *ref_extents,
        subject: *subject_extents,
    })
}

/// Runs the whole pipeline on a reference / subject image pair.
pub fn measure(
    reference: &Mat,
    reference_height: f64,
    subject: &Mat,
    config: &PreprocessConfig,
) -> Result<HeightEstimate> {
    check_reference_height(reference_height)?;

    let (_, ref_edges) = preprocess_with(reference, config)?;
    let (_, subject_edges) = preprocess_with(subject, config)?;

    let ref_extents = find_extents(&ref_edges)?.ok_or(Error::NoReferenceDetected)?;
    let subject_extents = find_extents(&subject_edges)?.ok_or(Error::NoSubjectDetected)?;

    let result = estimate(&ref_extents, reference_height, &subject_extents)?;
    info!(
        "reference {} px, subject {} px, {:.4} px/unit, estimated height {}",
        ref_extents.pixel_height(),
        subject_extents.pixel_height(),
        result.pixels_per_unit.pixels_per_unit(),
        result
    );
    Ok(result)
}

fn check_reference_height(units: f64) -> Result<()> {
    if units.is_finite() && units > 0.0 {
        Ok(())
    } else {
        Err(Error::MissingReferenceHeight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::Point;

    fn extents(top: (i32, i32), bottom: (i32, i32)) -> ExtentPair {
        ExtentPair::new(Point::new(top.0, top.1), Point::new(bottom.0, bottom.1))
    }

    #[test]
    fn reference_scenario() {
        let reference = extents((10, 5), (12, 205));
        let subject = extents((8, 20), (9, 420));

        let result = estimate(&reference, 50.0, &subject).unwrap();
        assert_eq!(result.pixels_per_unit.pixels_per_unit(), 4.0);
        assert_eq!(result.height, 100.0);
        assert_eq!(result.reference, reference);
        assert_eq!(result.subject, subject);
        assert_eq!(result.to_string(), "100.00");
    }

    #[test]
    fn flat_reference_is_degenerate() {
        let reference = extents((3, 40), (90, 40));
        let subject = extents((0, 0), (0, 100));
        let err = estimate(&reference, 50.0, &subject).unwrap_err();
        assert!(matches!(err, Error::DegenerateReference));
    }

    #[test]
    fn non_positive_reference_height_is_missing() {
        let reference = extents((0, 0), (0, 10));
        let subject = extents((0, 0), (0, 20));
        for units in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = estimate(&reference, units, &subject).unwrap_err();
            assert!(matches!(err, Error::MissingReferenceHeight), "{units}");
        }
    }

    #[test]
    fn scaling_both_extents_keeps_the_estimate() {
        let single = estimate(&extents((0, 0), (0, 137)), 42.0, &extents((0, 0), (0, 311))).unwrap();
        let doubled = estimate(&extents((0, 0), (0, 274)), 42.0, &extents((0, 0), (0, 622))).unwrap();
        assert!((single.height - doubled.height).abs() < 1e-9);
    }

    #[test]
    fn estimate_is_linear_in_reference_height() {
        let reference = extents((0, 10), (0, 173));
        let subject = extents((0, 4), (0, 250));
        let base = estimate(&reference, 30.0, &subject).unwrap();
        let doubled = estimate(&reference, 60.0, &subject).unwrap();
        assert!((doubled.height - 2.0 * base.height).abs() < 1e-9);
    }

    #[test]
    fn flat_subject_gives_zero_height() {
        let result = estimate(&extents((0, 0), (0, 10)), 5.0, &extents((1, 7), (4, 7))).unwrap();
        assert_eq!(result.height, 0.0);
    }

    #[test]
    fn display_rounds_to_two_decimals() {
        let result = estimate(&extents((0, 0), (0, 3)), 1.0, &extents((0, 0), (0, 5))).unwrap();
        assert_eq!(result.to_string(), "1.67");
    }
}
