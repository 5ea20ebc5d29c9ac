use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use image::{imageops, RgbImage};

use crate::error::ImageLoadError;
use crate::geometry::Size;
use crate::pipeline::{Interpolation, PipelineTracker};

/// Opaque identifier assigned to an image when it enters the working set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageId(u64);

impl ImageId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a display behavior keeps about a bound image: its id and size, never its pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageBinding {
    pub id: ImageId,
    pub size: Size,
}

/// A loaded image, its pixel buffer and its pipeline progress.
///
/// The pixel buffer is owned here and nowhere else; dropping the record
/// releases it.
#[derive(Debug)]
pub struct ImageRecord {
    id: ImageId,
    path: PathBuf,
    pixels: RgbImage,
    pipeline: PipelineTracker,
}

impl ImageRecord {
    /// Decode the image at `path`.
    pub fn open(id: ImageId, path: impl Into<PathBuf>) -> Result<Self, ImageLoadError> {
        let path = path.into();
        let reader = image::ImageReader::open(&path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|source| ImageLoadError::Open {
                path: path.clone(),
                source,
            })?;
        let decoded = reader.decode().map_err(|source| ImageLoadError::Decode {
            path: path.clone(),
            source,
        })?;
        Self::from_pixels(id, path, decoded.to_rgb8())
    }

    /// Wrap an already decoded buffer.
    pub fn from_pixels(
        id: ImageId,
        path: impl Into<PathBuf>,
        pixels: RgbImage,
    ) -> Result<Self, ImageLoadError> {
        let path = path.into();
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageLoadError::Empty { path });
        }
        Ok(Self {
            id,
            path,
            pixels,
            pipeline: PipelineTracker::new(width, height),
        })
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> Cow<'_, str> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| self.path.to_string_lossy())
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Size {
        Size::from(self.pixels.dimensions())
    }

    pub fn binding(&self) -> ImageBinding {
        ImageBinding {
            id: self.id,
            size: self.size(),
        }
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn pipeline(&self) -> &PipelineTracker {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut PipelineTracker {
        &mut self.pipeline
    }

    /// Pixels addressed by the ROI, or the whole image when no crop is set.
    pub fn cropped_view(&self) -> RgbImage {
        match self.pipeline.roi() {
            Some(roi) => imageops::crop_imm(&self.pixels, roi.x, roi.y, roi.width, roi.height)
                .to_image(),
            None => self.pixels.clone(),
        }
    }

    /// [`cropped_view`](Self::cropped_view) resampled to the resize spec, if one is set.
    pub fn resized_view(&self, interpolation: Interpolation) -> RgbImage {
        let cropped = self.cropped_view();
        match self.pipeline.resize_spec() {
            Some(spec) => imageops::resize(
                &cropped,
                spec.width,
                spec.height,
                interpolation.filter_type(),
            ),
            None => cropped,
        }
    }
}
