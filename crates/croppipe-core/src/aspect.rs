use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AspectRatioError {
    #[error("expected W:H, got {0:?}")]
    Format(String),

    #[error("ratio parts must be positive integers, got {0:?}")]
    NonPositive(String),
}

/// Crop aspect ratio as typed by the operator, e.g. `4:3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Width over height.
    pub fn value(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = AspectRatioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');
        let (Some(w), Some(h), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(AspectRatioError::Format(s.to_string()));
        };

        let parse = |part: &str| -> Result<u32, AspectRatioError> {
            let part = part.trim();
            match part.parse::<i64>() {
                Ok(v) if v > 0 => u32::try_from(v).map_err(|_| AspectRatioError::Format(s.to_string())),
                Ok(_) => Err(AspectRatioError::NonPositive(s.to_string())),
                Err(_) => Err(AspectRatioError::Format(s.to_string())),
            }
        };

        Ok(Self {
            width: parse(w)?,
            height: parse(h)?,
        })
    }
}
