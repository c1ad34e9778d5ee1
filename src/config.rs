//! Tunable constants of the preprocessing stage.
//!
//! The defaults reproduce the fixed pipeline (5x5 Gaussian blur, Canny with
//! thresholds 50/150). The binaries may override them through environment
//! variables, usually set in a `.env` file picked up by `dotenv`.

use std::env;

use crate::error::{Error, Result};

pub const BLUR_KERNEL_VAR: &str = "STATURE_BLUR_KERNEL";
pub const CANNY_LOW_VAR: &str = "STATURE_CANNY_LOW";
pub const CANNY_HIGH_VAR: &str = "STATURE_CANNY_HIGH";
pub const CANNY_APERTURE_VAR: &str = "STATURE_CANNY_APERTURE";
pub const L2_GRADIENT_VAR: &str = "STATURE_L2_GRADIENT";

#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessConfig {
    /// Side of the square Gaussian kernel. Must be odd.
    pub blur_kernel: i32,
    /// Hysteresis lower bound on gradient magnitude.
    pub canny_low: f64,
    /// Hysteresis upper bound on gradient magnitude.
    pub canny_high: f64,
    /// Sobel aperture used by Canny (3, 5 or 7).
    pub aperture: i32,
    pub l2_gradient: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            canny_low: 50.0,
            canny_high: 150.0,
            aperture: 3,
            l2_gradient: false,
        }
    }
}

impl PreprocessConfig {
    /// Defaults overridden by any `STATURE_*` variables present in the process
    /// environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(BLUR_KERNEL_VAR) {
            config.blur_kernel = parse(BLUR_KERNEL_VAR, &raw)?;
        }
        if let Some(raw) = lookup(CANNY_LOW_VAR) {
            config.canny_low = parse(CANNY_LOW_VAR, &raw)?;
        }
        if let Some(raw) = lookup(CANNY_HIGH_VAR) {
            config.canny_high = parse(CANNY_HIGH_VAR, &raw)?;
        }
        if let Some(raw) = lookup(CANNY_APERTURE_VAR) {
            config.aperture = parse(CANNY_APERTURE_VAR, &raw)?;
        }
        if let Some(raw) = lookup(L2_GRADIENT_VAR) {
            config.l2_gradient = parse(L2_GRADIENT_VAR, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.blur_kernel <= 0 || self.blur_kernel % 2 == 0 {
            return Err(invalid(BLUR_KERNEL_VAR, self.blur_kernel));
        }
        if !matches!(self.aperture, 3 | 5 | 7) {
            return Err(invalid(CANNY_APERTURE_VAR, self.aperture));
        }
        if !self.canny_low.is_finite() || self.canny_low < 0.0 {
            return Err(invalid(CANNY_LOW_VAR, self.canny_low));
        }
        if !self.canny_high.is_finite() || self.canny_high < self.canny_low {
            return Err(invalid(CANNY_HIGH_VAR, self.canny_high));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| Error::Config {
        key,
        value: raw.to_string(),
    })
}

fn invalid(key: &'static str, value: impl ToString) -> Error {
    Error::Config {
        key,
        value: value.to_string(),
    }
}
