use log::debug;
use opencv::{
    core::{self, Mat, Size, BORDER_DEFAULT, CV_8U, CV_8UC1},
    imgproc::{self, COLOR_BGR2GRAY, COLOR_BGRA2GRAY},
    prelude::*,
};

use crate::config::PreprocessConfig;
use crate::error::{Error, Result};

/// Binary edge map. Any non-zero cell is an edge.
#[derive(Debug)]
pub struct EdgeMap {
    mat: Mat,
}

impl EdgeMap {
    /// Wraps a single-channel 8-bit matrix.
    pub fn from_mat(mat: Mat) -> Result<Self> {
        if mat.typ() != CV_8UC1 {
            return Err(Error::InvalidImage(format!(
                "edge map must be single-channel 8-bit, got type {}",
                mat.typ()
            )));
        }
        Ok(Self { mat })
    }

    pub fn width(&self) -> i32 {
        self.mat.cols()
    }

    pub fn height(&self) -> i32 {
        self.mat.rows()
    }

    pub fn is_edge(&self, x: i32, y: i32) -> Result<bool> {
        Ok(*self.mat.at_2d::<u8>(y, x)? != 0)
    }

    pub fn edge_count(&self) -> Result<usize> {
        if self.mat.empty() {
            return Ok(0);
        }
        Ok(core::count_non_zero(&self.mat)? as usize)
    }

    /// One row of raw cells, left to right.
    pub fn row(&self, y: i32) -> Result<&[u8]> {
        Ok(self.mat.at_row::<u8>(y)?)
    }

    pub fn as_mat(&self) -> &Mat {
        &self.mat
    }

    pub fn into_mat(self) -> Mat {
        self.mat
    }
}

/// Checks that `image` is something the pipeline can work on: non-empty,
/// 8-bit, with 1, 3 or 4 channels.
pub fn validate_image(image: &Mat) -> Result<()> {
    if image.empty() || image.rows() <= 0 || image.cols() <= 0 {
        return Err(Error::InvalidImage("image has no pixels".to_string()));
    }
    if image.depth() != CV_8U {
        return Err(Error::InvalidImage(format!(
            "expected 8-bit pixels, got depth {}",
            image.depth()
        )));
    }
    match image.channels() {
        1 | 3 | 4 => Ok(()),
        n => Err(Error::InvalidImage(format!("unsupported channel count {n}"))),
    }
}

pub fn to_grayscale(image: &Mat) -> Result<Mat> {
    validate_image(image)?;

    let code = match image.channels() {
        1 => return Ok(image.try_clone()?),
        3 => COLOR_BGR2GRAY,
        _ => COLOR_BGRA2GRAY,
    };
    let mut gray = Mat::default();
    imgproc::cvt_color(image, &mut gray, code, 0)?;
    Ok(gray)
}

/// Grayscale conversion, Gaussian blur and Canny edge extraction with the
/// default constants.
pub fn preprocess(image: &Mat) -> Result<(Mat, EdgeMap)> {
    preprocess_with(image, &PreprocessConfig::default())
}

pub fn preprocess_with(image: &Mat, config: &PreprocessConfig) -> Result<(Mat, EdgeMap)> {
    config.validate()?;
    let gray = to_grayscale(image)?;

    let mut blurred = Mat::default();
    imgproc::gaussian_blur(
        &gray,
        &mut blurred,
        Size::new(config.blur_kernel, config.blur_kernel),
        0.0,
        0.0,
        BORDER_DEFAULT,
    )?;

    let mut edges = Mat::default();
    imgproc::canny(
        &blurred,
        &mut edges,
        config.canny_low,
        config.canny_high,
        config.aperture,
        config.l2_gradient,
    )?;

    let edges = EdgeMap::from_mat(edges)?;
    debug!(
        "preprocessed {}x{} image, {} edge pixels",
        edges.width(),
        edges.height(),
        edges.edge_count()?
    );
    Ok((gray, edges))
}
