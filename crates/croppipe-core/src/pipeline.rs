use std::fmt;
use std::str::FromStr;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CropPipeError, Result};
use crate::geometry::PixelRect;

/// Processing stage, in the only order they may be applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Crop,
    Resize,
    Infer,
    Fix,
}

impl Stage {
    pub const ORDER: [Stage; 4] = [Stage::Crop, Stage::Resize, Stage::Infer, Stage::Fix];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Bit of this stage in the 5-bit status mask (bit 0 is reserved).
    pub fn bit(self) -> u8 {
        0b10000 >> self.ordinal()
    }

    /// The stage that must be reached before this one can be applied.
    pub fn previous(self) -> Option<Stage> {
        self.ordinal().checked_sub(1).map(|i| Self::ORDER[i])
    }

    /// Stages invalidated when this one is redone.
    pub fn downstream(self) -> &'static [Stage] {
        &Self::ORDER[self.ordinal() + 1..]
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crop => write!(f, "crop"),
            Self::Resize => write!(f, "resize"),
            Self::Infer => write!(f, "infer"),
            Self::Fix => write!(f, "fix"),
        }
    }
}

/// Furthest stage an image has reached.
///
/// Ordered, so "stage `s` is applied" is `state >= StageState::reached(s)`.
/// Formats as the fixed-width status mask, e.g. `"11000"` for `Resized`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageState {
    #[default]
    None,
    Cropped,
    Resized,
    Inferred,
    Fixed,
}

impl StageState {
    pub fn reached(stage: Stage) -> Self {
        match stage {
            Stage::Crop => Self::Cropped,
            Stage::Resize => Self::Resized,
            Stage::Infer => Self::Inferred,
            Stage::Fix => Self::Fixed,
        }
    }

    pub fn latest_stage(self) -> Option<Stage> {
        match self {
            Self::None => None,
            Self::Cropped => Some(Stage::Crop),
            Self::Resized => Some(Stage::Resize),
            Self::Inferred => Some(Stage::Infer),
            Self::Fixed => Some(Stage::Fix),
        }
    }

    pub fn has(self, stage: Stage) -> bool {
        self >= Self::reached(stage)
    }

    pub fn bits(self) -> u8 {
        Stage::ORDER
            .iter()
            .filter(|s| self.has(**s))
            .fold(0, |mask, s| mask | s.bit())
    }

    /// Inverse of [`bits`](Self::bits). Masks that are not a stage prefix are rejected.
    pub fn from_bits(bits: u8) -> Option<Self> {
        [
            Self::None,
            Self::Cropped,
            Self::Resized,
            Self::Inferred,
            Self::Fixed,
        ]
        .into_iter()
        .find(|s| s.bits() == bits)
    }

    /// List status colour: gray, orange, blue, green, red by latest stage.
    pub fn status_color(self) -> [u8; 3] {
        match self {
            Self::None => [200, 200, 200],
            Self::Cropped => [255, 165, 0],
            Self::Resized => [0, 0, 255],
            Self::Inferred => [0, 128, 0],
            Self::Fixed => [255, 0, 0],
        }
    }
}

impl fmt::Display for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05b}", self.bits())
    }
}

/// Target dimensions of the resize stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResizeSpec {
    pub width: u32,
    pub height: u32,
}

impl ResizeSpec {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CropPipeError::InvalidResize(format!(
                "target size must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for ResizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ResizeSpec {
    type Err = CropPipeError;

    /// Parses `"WIDTHxHEIGHT"`, e.g. `"1024x768"`.
    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .trim()
            .split_once(|c| c == 'x' || c == 'X')
            .ok_or_else(|| CropPipeError::InvalidResize(format!("expected WxH, got {s:?}")))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| CropPipeError::InvalidResize(format!("{part:?}: {e}")))
        };
        Self::new(parse(w)?, parse(h)?)
    }
}

/// Resampling used to produce the resized view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    #[default]
    Bilinear,
    Nearest,
}

impl Interpolation {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Bilinear => FilterType::Triangle,
            Self::Nearest => FilterType::Nearest,
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bilinear => write!(f, "Bilinear"),
            Self::Nearest => write!(f, "Nearest"),
        }
    }
}

/// Per-image stage machine and the payload each stage produced.
///
/// Applying a stage keeps every earlier stage, marks the stage as reached and
/// drops every later stage together with its payload.
#[derive(Clone, Debug)]
pub struct PipelineTracker {
    width: u32,
    height: u32,
    state: StageState,
    roi: Option<PixelRect>,
    resize: Option<ResizeSpec>,
    infer_prompt: Option<String>,
    fix_prompt: Option<String>,
}

impl PipelineTracker {
    /// Tracker for an image of `width`x`height` pixels, with no stage applied.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            state: StageState::None,
            roi: None,
            resize: None,
            infer_prompt: None,
            fix_prompt: None,
        }
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn roi(&self) -> Option<PixelRect> {
        self.roi
    }

    pub fn resize_spec(&self) -> Option<ResizeSpec> {
        self.resize
    }

    pub fn infer_prompt(&self) -> Option<&str> {
        self.infer_prompt.as_deref()
    }

    pub fn fix_prompt(&self) -> Option<&str> {
        self.fix_prompt.as_deref()
    }

    pub fn is_cropped(&self) -> bool {
        self.state.has(Stage::Crop)
    }

    pub fn is_resized(&self) -> bool {
        self.state.has(Stage::Resize)
    }

    pub fn is_inferred(&self) -> bool {
        self.state.has(Stage::Infer)
    }

    pub fn is_fixed(&self) -> bool {
        self.state.has(Stage::Fix)
    }

    pub fn set_crop(&mut self, roi: PixelRect) -> Result<StageState> {
        if !roi.fits_within(self.width, self.height) {
            return Err(CropPipeError::InvalidCrop(format!(
                "region {roi} is empty or exceeds image dimensions ({}x{})",
                self.width, self.height
            )));
        }
        self.roi = Some(roi);
        Ok(self.advance(Stage::Crop))
    }

    pub fn set_resize(&mut self, spec: ResizeSpec) -> Result<StageState> {
        self.require_previous(Stage::Resize)?;
        self.resize = Some(spec);
        Ok(self.advance(Stage::Resize))
    }

    pub fn set_infer(&mut self, prompt: impl Into<String>) -> Result<StageState> {
        self.require_previous(Stage::Infer)?;
        self.infer_prompt = Some(prompt.into());
        Ok(self.advance(Stage::Infer))
    }

    pub fn set_fix(&mut self, prompt: impl Into<String>) -> Result<StageState> {
        self.require_previous(Stage::Fix)?;
        self.fix_prompt = Some(prompt.into());
        Ok(self.advance(Stage::Fix))
    }

    /// Undo the crop and everything downstream of it.
    pub fn clear_crop(&mut self) -> StageState {
        self.reset();
        debug!("Crop cleared");
        self.state
    }

    /// Drop every stage and payload.
    pub fn reset(&mut self) {
        *self = Self::new(self.width, self.height);
    }

    fn require_previous(&self, stage: Stage) -> Result<()> {
        match stage.previous() {
            Some(requires) if !self.state.has(requires) => {
                Err(CropPipeError::StageOutOfOrder { stage, requires })
            }
            _ => Ok(()),
        }
    }

    fn advance(&mut self, stage: Stage) -> StageState {
        for later in stage.downstream() {
            self.clear_stage(*later);
        }
        self.state = StageState::reached(stage);
        info!(%stage, state = %self.state, "Stage applied");
        self.state
    }

    fn clear_stage(&mut self, stage: Stage) {
        match stage {
            Stage::Crop => self.roi = None,
            Stage::Resize => self.resize = None,
            Stage::Infer => self.infer_prompt = None,
            Stage::Fix => self.fix_prompt = None,
        }
    }
}
