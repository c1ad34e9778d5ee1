use image::{DynamicImage, Rgb, RgbImage};
use opencv::{core::Mat, core::Vector, imgcodecs, prelude::*};
use stature::{
    find_extents, measure, preprocess, utils::annotate, utils::mat_from_dynamic_image, Error,
    MeasurementSession, PreprocessConfig,
};

const WIDTH: u32 = 200;
const HEIGHT: u32 = 300;

/// Black canvas with a white box spanning rows `top..bottom` and columns 80..120.
fn boxed_image(top: u32, bottom: u32) -> Mat {
    let rgb = RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
        if (80..120).contains(&x) && (top..bottom).contains(&y) {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    });
    mat_from_dynamic_image(&DynamicImage::ImageRgb8(rgb)).unwrap()
}

fn blank_image() -> Mat {
    let rgb = RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([90, 120, 60]));
    mat_from_dynamic_image(&DynamicImage::ImageRgb8(rgb)).unwrap()
}

#[test]
fn extents_follow_the_box_boundary() {
    let (gray, edges) = preprocess(&boxed_image(50, 150)).unwrap();
    assert_eq!(gray.rows(), HEIGHT as i32);
    assert_eq!(edges.width(), WIDTH as i32);

    let extents = find_extents(&edges).unwrap().expect("box should produce edges");
    assert!(extents.top.y <= extents.bottom.y);
    assert!((extents.top.y - 50).abs() <= 2, "top {:?}", extents.top);
    assert!((extents.bottom.y - 149).abs() <= 2, "bottom {:?}", extents.bottom);
    assert!((78..=122).contains(&extents.top.x));
}

#[test]
fn subject_twice_as_tall_is_twice_the_reference_height() {
    let reference = boxed_image(50, 150);
    let subject = boxed_image(40, 240);

    let result = measure(&reference, 50.0, &subject, &PreprocessConfig::default()).unwrap();
    assert!(
        (result.height - 100.0).abs() < 5.0,
        "estimated {}",
        result.height
    );
    assert!(result.pixels_per_unit.pixels_per_unit() > 1.9);
    assert!(result.pixels_per_unit.pixels_per_unit() < 2.1);
}

#[test]
fn blank_subject_is_not_detected() {
    let err = measure(&boxed_image(50, 150), 50.0, &blank_image(), &PreprocessConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::NoSubjectDetected));
}

#[test]
fn blank_reference_is_not_detected() {
    let err = measure(&blank_image(), 50.0, &boxed_image(50, 150), &PreprocessConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::NoReferenceDetected));
}

#[test]
fn reference_height_is_checked_before_images() {
    let err = measure(&Mat::default(), -3.0, &Mat::default(), &PreprocessConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::MissingReferenceHeight));
}

#[test]
fn invalid_image_is_reported() {
    let err = measure(&Mat::default(), 50.0, &boxed_image(50, 150), &PreprocessConfig::default())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidImage(_)));
}

#[test]
fn session_reuses_reference_across_subjects() {
    let dir = std::env::temp_dir().join(format!("stature-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let reference_path = dir.join("reference.png");
    let tall_path = dir.join("tall.png");
    let short_path = dir.join("short.png");

    for (path, image) in [
        (&reference_path, boxed_image(50, 150)),
        (&tall_path, boxed_image(40, 240)),
        (&short_path, boxed_image(100, 150)),
    ] {
        assert!(imgcodecs::imwrite(path.to_str().unwrap(), &image, &Vector::default()).unwrap());
    }

    let mut session = MeasurementSession::default();
    session.load_reference(&reference_path).unwrap();
    session.set_reference_height(50.0);

    session.load_subject(&tall_path).unwrap();
    let tall = session.measure().unwrap();

    session.load_subject(&short_path).unwrap();
    let short = session.measure().unwrap();

    assert!(tall.height > short.height);
    assert!((short.height - 25.0).abs() < 3.0, "estimated {}", short.height);
    assert_eq!(tall.reference, short.reference);

    let marked = annotate(session.subject_image().unwrap(), &short.subject).unwrap();
    assert_eq!(marked.rows(), HEIGHT as i32);
    assert_eq!(marked.cols(), WIDTH as i32);

    std::fs::remove_dir_all(&dir).ok();
}
