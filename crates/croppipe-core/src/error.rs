use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::Stage;
use crate::record::ImageId;

/// Failure to bring a single image into the working set.
///
/// Reported per file; a batch import keeps going after one of these.
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("Cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image {} has no pixels", .path.display())]
    Empty { path: PathBuf },
}

impl ImageLoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Open { path, .. } | Self::Decode { path, .. } | Self::Empty { path } => path,
        }
    }
}

#[derive(Error, Debug)]
pub enum CropPipeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    ImageLoad(#[from] ImageLoadError),

    #[error("Invalid crop: {0}")]
    InvalidCrop(String),

    #[error("Invalid resize: {0}")]
    InvalidResize(String),

    #[error("Cannot apply {stage} before {requires}")]
    StageOutOfOrder { stage: Stage, requires: Stage },

    #[error("No image {0} in the workspace")]
    UnknownImage(ImageId),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CropPipeError>;
