#![allow(dead_code)]

use std::path::{Path, PathBuf};

use croppipe_core::config::SelectorConfig;
use croppipe_core::geometry::Size;
use croppipe_core::record::{ImageId, ImageRecord};
use croppipe_core::selector::RoiSelector;
use image::{Rgb, RgbImage};

pub const VIEWPORT: Size = Size::new(1280.0, 720.0);

/// Image where each pixel encodes its own coordinates, so crops can be checked by value.
pub fn coordinate_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

pub fn make_record(id: u64, width: u32, height: u32) -> ImageRecord {
    ImageRecord::from_pixels(
        ImageId::new(id),
        format!("image_{id}.png"),
        coordinate_image(width, height),
    )
    .unwrap()
}

/// Write a small PNG into `dir` and return its path.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    coordinate_image(width, height).save(&path).unwrap();
    path
}

/// Selector on the default viewport with `record` bound and `ratio` active.
pub fn selector_for(record: &ImageRecord, ratio: &str) -> RoiSelector {
    let mut selector = RoiSelector::new(SelectorConfig::default(), VIEWPORT);
    selector.set_image(Some(record));
    selector.set_aspect_ratio(ratio, None);
    selector
}
