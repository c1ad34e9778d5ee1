use std::path::Path;

use log::{debug, info};
use opencv::{core::Mat, imgcodecs, prelude::*};

use crate::config::PreprocessConfig;
use crate::error::{Error, ImageRole, Result};
use crate::estimate::{measure, HeightEstimate};
use crate::preprocess::validate_image;

/// State of one interactive measurement: the two most recently loaded images
/// and the reference height. Shells own one of these instead of keeping the
/// values in globals.
#[derive(Debug, Default)]
pub struct MeasurementSession {
    reference: Option<Mat>,
    subject: Option<Mat>,
    reference_height: Option<f64>,
    config: PreprocessConfig,
}

impl MeasurementSession {
    pub fn new(config: PreprocessConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    pub fn load_reference(&mut self, path: impl AsRef<Path>) -> Result<&Mat> {
        let image = load_image(path.as_ref())?;
        Ok(&*self.reference.insert(image))
    }

    pub fn load_subject(&mut self, path: impl AsRef<Path>) -> Result<&Mat> {
        let image = load_image(path.as_ref())?;
        Ok(&*self.subject.insert(image))
    }

    pub fn set_reference_image(&mut self, image: Mat) -> Result<()> {
        validate_image(&image)?;
        self.reference = Some(image);
        Ok(())
    }

    pub fn set_subject_image(&mut self, image: Mat) -> Result<()> {
        validate_image(&image)?;
        self.subject = Some(image);
        Ok(())
    }

    pub fn set_reference_height(&mut self, units: f64) {
        self.reference_height = Some(units);
    }

    pub fn reference_image(&self) -> Option<&Mat> {
        self.reference.as_ref()
    }

    pub fn subject_image(&self) -> Option<&Mat> {
        self.subject.as_ref()
    }

    pub fn reference_height(&self) -> Option<f64> {
        self.reference_height
    }

    /// Estimates the subject's height from the current session state.
    pub fn measure(&self) -> Result<HeightEstimate> {
        let reference = self
            .reference
            .as_ref()
            .ok_or(Error::ImageNotLoaded(ImageRole::Reference))?;
        let subject = self
            .subject
            .as_ref()
            .ok_or(Error::ImageNotLoaded(ImageRole::Subject))?;
        let reference_height = self
            .reference_height
            .ok_or(Error::MissingReferenceHeight)?;

        measure(reference, reference_height, subject, &self.config)
    }
}

/// Decodes the file at `path` as an 8-bit BGR image.
pub fn load_image(path: &Path) -> Result<Mat> {
    let path_str = path
        .to_str()
        .ok_or_else(|| Error::InvalidImage(format!("non UTF-8 path {}", path.display())))?;

    let image = imgcodecs::imread(path_str, imgcodecs::IMREAD_COLOR)?;
    if image.empty() {
        return Err(Error::InvalidImage(format!(
            "could not read {}",
            path.display()
        )));
    }
    debug!("decoded {}x{} image", image.cols(), image.rows());
    info!("loaded {}", path.display());
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};

    fn blank() -> Mat {
        Mat::new_rows_cols_with_default(20, 20, CV_8UC3, Scalar::all(0.0)).unwrap()
    }

    #[test]
    fn measure_requires_reference_image() {
        let session = MeasurementSession::default();
        let err = session.measure().unwrap_err();
        assert!(matches!(err, Error::ImageNotLoaded(ImageRole::Reference)));
    }

    #[test]
    fn measure_requires_subject_image() {
        let mut session = MeasurementSession::default();
        session.set_reference_image(blank()).unwrap();
        let err = session.measure().unwrap_err();
        assert!(matches!(err, Error::ImageNotLoaded(ImageRole::Subject)));
    }

    #[test]
    fn measure_requires_reference_height() {
        let mut session = MeasurementSession::default();
        session.set_reference_image(blank()).unwrap();
        session.set_subject_image(blank()).unwrap();
        let err = session.measure().unwrap_err();
        assert!(matches!(err, Error::MissingReferenceHeight));
    }

    #[test]
    fn zero_reference_height_is_missing() {
        let mut session = MeasurementSession::default();
        session.set_reference_image(blank()).unwrap();
        session.set_subject_image(blank()).unwrap();
        session.set_reference_height(0.0);
        let err = session.measure().unwrap_err();
        assert!(matches!(err, Error::MissingReferenceHeight));
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let mut session = MeasurementSession::default();
        let err = session.set_subject_image(Mat::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
        assert!(session.subject_image().is_none());
    }

    #[test]
    fn missing_file_is_invalid_image() {
        let mut session = MeasurementSession::default();
        let err = session
            .load_reference("/nonexistent/stature/reference.png")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidImage(_)));
    }
}
