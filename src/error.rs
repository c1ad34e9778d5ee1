use std::fmt;

use thiserror::Error;

/// Which of the two photographs an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Reference,
    Subject,
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRole::Reference => f.write_str("reference"),
            ImageRole::Subject => f.write_str("subject"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Could not detect the reference object")]
    NoReferenceDetected,

    #[error("Could not detect the subject")]
    NoSubjectDetected,

    #[error("Reference height must be a positive value")]
    MissingReferenceHeight,

    #[error("Reference object has no measurable vertical extent")]
    DegenerateReference,

    #[error("The {0} image has not been loaded")]
    ImageNotLoaded(ImageRole),

    #[error("Invalid configuration value for {key}: {value:?}")]
    Config { key: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
