use serde::{Deserialize, Serialize};

use crate::consts::EPSILON;

/// A width/height pair in either viewport or image units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f64, height as f64)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle with floating point coordinates.
///
/// Used for viewport-space geometry and for unrounded image-space geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_center(center: Point, width: f64, height: f64) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Long edge length.
    pub fn long_edge(&self) -> f64 {
        self.width.max(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// True when `other` lies fully inside `self`, tolerating float noise.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x - EPSILON
            && other.y >= self.y - EPSILON
            && other.right() <= self.right() + EPSILON
            && other.bottom() <= self.bottom() + EPSILON
    }

    /// Move the rectangle (size unchanged) so it lies inside `bounds`.
    ///
    /// On an axis where the rectangle is larger than `bounds` it is pinned to
    /// the leading edge of `bounds`.
    pub fn clamped_within(&self, bounds: &Rect) -> Rect {
        Rect::new(
            clamp_axis(self.x, self.width, bounds.x, bounds.width),
            clamp_axis(self.y, self.height, bounds.y, bounds.height),
            self.width,
            self.height,
        )
    }

    pub fn scaled(&self, factor: f64) -> Rect {
        Rect::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }
}

fn clamp_axis(pos: f64, len: f64, lo: f64, extent: f64) -> f64 {
    pos.min(lo + extent - len).max(lo)
}

/// Integer rectangle in original-image pixel coordinates (a crop ROI).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the rectangle is non-empty and fits inside a `width`x`height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        !self.is_empty()
            && self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.x as f64,
            self.y as f64,
            self.width as f64,
            self.height as f64,
        )
    }
}

impl std::fmt::Display for PixelRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}) {}x{}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Uniform aspect-preserving fit of `image` into `viewport`, centered.
///
/// Returns `(scale, offset)` where `offset` is the top-left corner of the
/// scaled image inside the viewport. A degenerate image yields scale `0.0`.
pub fn fit_scale_and_offset(viewport: Size, image: Size) -> (f64, Point) {
    if image.is_empty() || viewport.is_empty() {
        return (0.0, Point::new(viewport.width / 2.0, viewport.height / 2.0));
    }
    let scale = (viewport.width / image.width).min(viewport.height / image.height);
    let offset = Point::new(
        (viewport.width - image.width * scale) / 2.0,
        (viewport.height - image.height * scale) / 2.0,
    );
    (scale, offset)
}

/// Where content of `content` size lands when fitted and centered in `viewport`.
pub fn fit_rect(viewport: Size, content: Size) -> Rect {
    let (scale, offset) = fit_scale_and_offset(viewport, content);
    Rect::new(
        offset.x,
        offset.y,
        content.width * scale,
        content.height * scale,
    )
}

/// The transform between original-image pixels and a centered, scaled viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportMapping {
    pub scale: f64,
    pub offset: Point,
    pub viewport: Size,
    pub image: Size,
}

impl ViewportMapping {
    /// Fit `image` into `viewport`. `None` when either has no area.
    pub fn fit(viewport: Size, image: Size) -> Option<Self> {
        let (scale, offset) = fit_scale_and_offset(viewport, image);
        if scale <= 0.0 || !scale.is_finite() {
            return None;
        }
        Some(Self {
            scale,
            offset,
            viewport,
            image,
        })
    }

    /// Viewport-space area covered by the displayed image.
    pub fn displayed_image_rect(&self) -> Rect {
        Rect::new(
            self.offset.x,
            self.offset.y,
            self.image.width * self.scale,
            self.image.height * self.scale,
        )
    }

    pub fn to_viewport(&self, roi: PixelRect) -> Rect {
        self.image_to_viewport(roi.to_rect())
    }

    pub fn image_to_viewport(&self, r: Rect) -> Rect {
        Rect::new(
            r.x * self.scale + self.offset.x,
            r.y * self.scale + self.offset.y,
            r.width * self.scale,
            r.height * self.scale,
        )
    }

    /// Unrounded inverse of [`image_to_viewport`](Self::image_to_viewport).
    pub fn viewport_to_image(&self, r: Rect) -> Rect {
        Rect::new(
            (r.x - self.offset.x) / self.scale,
            (r.y - self.offset.y) / self.scale,
            r.width / self.scale,
            r.height / self.scale,
        )
    }

    pub fn image_to_viewport_point(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.offset.x,
            p.y * self.scale + self.offset.y,
        )
    }

    pub fn viewport_to_image_point(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset.x) / self.scale,
            (p.y - self.offset.y) / self.scale,
        )
    }

    /// Map a viewport rectangle to whole image pixels.
    ///
    /// The size is rounded once from `r`'s size, so it does not depend on where
    /// `r` sits. The origin is rounded on its own and then pulled back until
    /// the rectangle fits the image. A rectangle larger than the image is
    /// clamped to the image size.
    pub fn to_image(&self, r: Rect) -> PixelRect {
        let img = self.viewport_to_image(r);
        let max_w = self.image.width.round();
        let max_h = self.image.height.round();

        let w = img.width.round().clamp(0.0, max_w);
        let h = img.height.round().clamp(0.0, max_h);
        let x = img.x.round().clamp(0.0, max_w - w);
        let y = img.y.round().clamp(0.0, max_h - h);

        PixelRect::new(x as u32, y as u32, w as u32, h as u32)
    }
}
