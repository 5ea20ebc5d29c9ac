use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_RECT_SIZE, DEFAULT_VIEWPORT, IMAGE_EXTENSIONS, MIN_RECT_WIDTH, ZOOM_IN_FACTOR,
    ZOOM_OUT_FACTOR,
};
use crate::error::{CropPipeError, Result};
use crate::geometry::Size;
use crate::pipeline::Interpolation;

/// Everything a crop session can be tuned with, loadable from TOML.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub selector: SelectorConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub resize: ResizeConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

impl SessionConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| CropPipeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CropPipeError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        self.selector.validate()?;
        self.viewport.validate()
    }
}

/// Interactive rectangle tuning, all lengths in viewport pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Initial long-edge length of the crop rectangle.
    pub rect_size: f64,
    /// Smallest width reachable by scrolling.
    pub min_width: f64,
    /// Growth per scroll step up.
    pub zoom_in_factor: f64,
    /// Shrink per scroll step down.
    pub zoom_out_factor: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            rect_size: DEFAULT_RECT_SIZE,
            min_width: MIN_RECT_WIDTH,
            zoom_in_factor: ZOOM_IN_FACTOR,
            zoom_out_factor: ZOOM_OUT_FACTOR,
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> Result<()> {
        let lengths_valid = self.rect_size > 0.0 && self.min_width > 0.0;
        if !lengths_valid {
            return Err(CropPipeError::Config(format!(
                "rect_size ({}) and min_width ({}) must be positive",
                self.rect_size, self.min_width
            )));
        }
        let zoom_in_valid = self.zoom_in_factor > 1.0;
        if !zoom_in_valid {
            return Err(CropPipeError::Config(format!(
                "zoom_in_factor must be > 1.0, got {}",
                self.zoom_in_factor
            )));
        }
        let zoom_out_valid = self.zoom_out_factor > 0.0 && self.zoom_out_factor < 1.0;
        if !zoom_out_valid {
            return Err(CropPipeError::Config(format!(
                "zoom_out_factor must be in (0, 1), got {}",
                self.zoom_out_factor
            )));
        }
        Ok(())
    }
}

/// Size of the virtual display surface used by headless sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT.0,
            height: DEFAULT_VIEWPORT.1,
        }
    }
}

impl ViewportConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn validate(&self) -> Result<()> {
        if self.size().is_empty() {
            return Err(CropPipeError::Config(format!(
                "viewport must have a positive size, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeConfig {
    pub interpolation: Interpolation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Extensions picked up by folder import, without the dot.
    pub extensions: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            extensions: IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}
