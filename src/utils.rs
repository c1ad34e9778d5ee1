use image::{DynamicImage, RgbaImage};
use opencv::{
    core::{Mat, Point, Scalar, Vec3b, VecN, CV_8UC3},
    imgproc::{
        self, COLOR_BGR2RGBA, COLOR_BGRA2BGR, COLOR_BGRA2RGBA, COLOR_GRAY2BGR, COLOR_GRAY2RGBA,
        FILLED, LINE_8,
    },
    prelude::*,
};

use crate::error::{Error, Result};
use crate::extents::ExtentPair;
use crate::preprocess::validate_image;

const MARKER_RADIUS: i32 = 5;
const LINE_THICKNESS: i32 = 2;

fn marker_color() -> Scalar {
    // BGR
    Scalar::new(0.0, 0.0, 255.0, 0.0)
}

/// Copy of `image` with the two extents marked by red dots joined by a line.
pub fn annotate(image: &Mat, extents: &ExtentPair) -> Result<Mat> {
    let mut marked = to_bgr(image)?;

    imgproc::circle(&mut marked, extents.top, MARKER_RADIUS, marker_color(), FILLED, LINE_8, 0)?;
    imgproc::circle(&mut marked, extents.bottom, MARKER_RADIUS, marker_color(), FILLED, LINE_8, 0)?;
    imgproc::line(
        &mut marked,
        extents.top,
        extents.bottom,
        marker_color(),
        LINE_THICKNESS,
        LINE_8,
        0,
    )?;

    Ok(marked)
}

fn to_bgr(image: &Mat) -> Result<Mat> {
    validate_image(image)?;
    let code = match image.channels() {
        3 => return Ok(image.try_clone()?),
        1 => COLOR_GRAY2BGR,
        _ => COLOR_BGRA2BGR,
    };
    let mut bgr = Mat::default();
    imgproc::cvt_color(image, &mut bgr, code, 0)?;
    Ok(bgr)
}

/// Converts an image decoded by the `image` crate into an 8-bit BGR matrix.
pub fn mat_from_dynamic_image(image: &DynamicImage) -> Result<Mat> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::InvalidImage("image has no pixels".to_string()));
    }

    let mut mat =
        Mat::new_rows_cols_with_default(height as i32, width as i32, CV_8UC3, Scalar::all(0.0))?;
    for (y, src_row) in rgb.rows().enumerate() {
        let dst_row = mat.at_row_mut::<Vec3b>(y as i32)?;
        for (dst, src) in dst_row.iter_mut().zip(src_row) {
            let [r, g, b] = src.0;
            *dst = VecN([b, g, r]);
        }
    }
    Ok(mat)
}

/// RGBA copy of any 1, 3 or 4 channel matrix, ready for display.
pub fn rgba_from_mat(image: &Mat) -> Result<RgbaImage> {
    validate_image(image)?;
    let code = match image.channels() {
        1 => COLOR_GRAY2RGBA,
        3 => COLOR_BGR2RGBA,
        _ => COLOR_BGRA2RGBA,
    };
    let mut rgba = Mat::default();
    imgproc::cvt_color(image, &mut rgba, code, 0)?;

    let width = rgba.cols() as u32;
    let height = rgba.rows() as u32;
    RgbaImage::from_raw(width, height, rgba.data_bytes()?.to_vec())
        .ok_or_else(|| Error::InvalidImage("pixel buffer size mismatch".to_string()))
}

/// Point with both coordinates scaled, used to map extents onto a resized
/// preview.
pub fn scale_point(point: Point, sx: f64, sy: f64) -> Point {
    Point::new(
        (point.x as f64 * sx).round() as i32,
        (point.y as f64 * sy).round() as i32,
    )
}
