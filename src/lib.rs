//! # stature
//!
//! Estimates the real-world height of a person from a photograph, using a
//! second photograph of a reference object whose height is known.
//!
//! Each image goes through the same steps:
//!
//! 1. grayscale conversion, Gaussian blur and Canny edge detection
//!    ([`preprocess`]),
//! 2. topmost / bottommost edge extraction ([`find_extents`]),
//!
//! and the two pixel extents are then combined by [`estimate`]: the reference
//! gives a pixels-per-unit ratio, which converts the subject's pixel height
//! into physical units. Both photographs are assumed to be taken from the same
//! distance with the same camera; nothing corrects for perspective or lens
//! distortion.
//!
//! ```no_run
//! use stature::MeasurementSession;
//!
//! let mut session = MeasurementSession::default();
//! session.load_reference("door.jpg")?;
//! session.load_subject("person.jpg")?;
//! session.set_reference_height(200.0);
//!
//! let result = session.measure()?;
//! println!("Estimated height: {result} cm");
//! # Ok::<(), stature::Error>(())
//! ```

mod config;
mod error;
mod estimate;
mod extents;
mod preprocess;
mod session;
pub mod utils;

pub use config::PreprocessConfig;
pub use error::{Error, ImageRole, Result};
pub use estimate::{estimate, measure, CalibrationRatio, HeightEstimate};
pub use extents::{find_extents, find_extents_with, ExtentPair, TieBreak};
pub use preprocess::{preprocess, preprocess_with, to_grayscale, validate_image, EdgeMap};
pub use session::{load_image, MeasurementSession};
