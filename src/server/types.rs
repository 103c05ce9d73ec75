use crate::toolkit::{ImageFormat, PlotSpec};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Largest accepted image side in pixels.
pub const MAX_IMAGE_SIDE: i64 = 4096;

/// Largest accepted number of decimals on plot labels.
pub const MAX_DIGITS: i64 = 10;

pub const DEFAULT_IMAGE_SIDE: u32 = 200;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Raw image bytes.
#[derive(ToSchema)]
#[schema(value_type = String, format = Binary)]
pub struct BinaryImage(pub Vec<u8>);

/// Range checks run by [`super::extract::ValidQuery`] before a handler body.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IsotopeDistributionQuery {
    /// Coverage probability of the isotopic distribution (default 0.9999)
    pub probability: Option<f64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IsotopePlotQuery {
    /// Coverage probability of the isotopic distribution (default 0.95)
    pub probability: Option<f64>,
    /// Width of the figure in inches (default 3.2)
    pub width: Option<f64>,
    /// Height of the figure in inches (default 2.4)
    pub height: Option<f64>,
    /// Resolution of the figure in dots per inch (default 100)
    pub dpi: Option<f64>,
    /// Number of digits displayed at the mass peaks (default 2)
    pub digits: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImageQuery {
    /// Image width in pixels (default 200)
    pub width: Option<i64>,
    /// Image height in pixels (default 200)
    pub height: Option<i64>,
    /// Image format (default png)
    #[param(inline)]
    pub format: Option<ImageFormat>,
}

fn check_probability(probability: Option<f64>) -> Result<(), String> {
    match probability {
        Some(p) if !(0.0..=1.0).contains(&p) => {
            Err(format!("probability must be between 0 and 1, got {}", p))
        }
        _ => Ok(()),
    }
}

fn check_positive(name: &str, value: Option<f64>) -> Result<(), String> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => {
            Err(format!("{} must be greater than 0, got {}", name, v))
        }
        _ => Ok(()),
    }
}

/// Parses and range-checks a pixel dimension.
pub fn check_side(name: &str, value: i64) -> Result<u32, String> {
    if !(1..=MAX_IMAGE_SIDE).contains(&value) {
        return Err(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_IMAGE_SIDE, value
        ));
    }
    u32::try_from(value).map_err(|_| format!("{} is out of range", name))
}

impl Validate for IsotopeDistributionQuery {
    fn validate(&self) -> Result<(), String> {
        check_probability(self.probability)
    }
}

impl Validate for IsotopePlotQuery {
    fn validate(&self) -> Result<(), String> {
        check_probability(self.probability)?;
        check_positive("width", self.width)?;
        check_positive("height", self.height)?;
        check_positive("dpi", self.dpi)?;
        if let Some(digits) = self.digits {
            if !(0..=MAX_DIGITS).contains(&digits) {
                return Err(format!(
                    "digits must be between 0 and {}, got {}",
                    MAX_DIGITS, digits
                ));
            }
        }

        let spec = self.plot_spec();
        for (name, inches) in [("width", spec.width), ("height", spec.height)] {
            if inches * spec.dpi > MAX_IMAGE_SIDE as f64 {
                return Err(format!(
                    "{} * dpi must not exceed {} pixels",
                    name, MAX_IMAGE_SIDE
                ));
            }
        }
        Ok(())
    }
}

impl IsotopePlotQuery {
    pub fn plot_spec(&self) -> PlotSpec {
        let defaults = PlotSpec::default();
        PlotSpec {
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
            dpi: self.dpi.unwrap_or(defaults.dpi),
            digits: self
                .digits
                .and_then(|d| u32::try_from(d).ok())
                .unwrap_or(defaults.digits),
        }
    }
}

impl Validate for ImageQuery {
    fn validate(&self) -> Result<(), String> {
        if let Some(width) = self.width {
            check_side("width", width)?;
        }
        if let Some(height) = self.height {
            check_side("height", height)?;
        }
        Ok(())
    }
}

impl ImageQuery {
    /// Width and height after validation, with defaults applied.
    pub fn dimensions(&self) -> (u32, u32) {
        let side = |value: Option<i64>| {
            value
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(DEFAULT_IMAGE_SIDE)
        };
        (side(self.width), side(self.height))
    }
}
