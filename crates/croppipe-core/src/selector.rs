//! Interactive, aspect-locked crop rectangle.
//!
//! The rectangle lives in viewport space while the operator positions it and
//! is converted to image pixels only when confirmed. A confirmed selection is
//! remembered per image, so coming back to an image shows it confirmed again.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::aspect::AspectRatio;
use crate::config::SelectorConfig;
use crate::consts::{CONFIRMED_HINT, EPSILON, NO_IMAGE_PLACEHOLDER, SELECTING_HINT};
use crate::geometry::{PixelRect, Point, Rect, Size, ViewportMapping};
use crate::pipeline::StageState;
use crate::record::{ImageBinding, ImageId, ImageRecord};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Rectangle follows the pointer and has not been applied.
    #[default]
    Selecting,
    /// Rectangle is fixed and applied as the image's crop.
    Confirmed,
}

/// Geometry saved when a selection is confirmed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RememberedSelection {
    pub rect_size: f64,
    pub rect: Rect,
    /// Aspect ratio the rectangle was drawn with.
    pub ratio: f64,
    /// Viewport transform `rect` and `rect_size` are expressed in.
    pub mapping: ViewportMapping,
}

impl RememberedSelection {
    /// Express the saved geometry under `mapping`.
    ///
    /// Unchanged mappings return the saved values verbatim; otherwise the
    /// rectangle is carried through image space so it covers the same pixels.
    fn under(&self, mapping: &ViewportMapping) -> (f64, Rect) {
        if self.mapping == *mapping {
            return (self.rect_size, self.rect);
        }
        let image_rect = self.mapping.viewport_to_image(self.rect);
        let rect = mapping
            .image_to_viewport(image_rect)
            .clamped_within(&mapping.displayed_image_rect());
        let rect_size = self.rect_size * mapping.scale / self.mapping.scale;
        (rect_size, rect)
    }
}

/// What a renderer needs to draw the selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionOverlay {
    pub rect: Rect,
    pub phase: Phase,
    /// Everything outside `rect` is dimmed once confirmed.
    pub dim_outside: bool,
    /// Original-resolution pixels to draw inside `rect`.
    pub source: PixelRect,
    pub hint: &'static str,
}

#[derive(Clone, Debug)]
pub struct RoiSelector {
    config: SelectorConfig,
    aspect_ratio: Option<AspectRatio>,
    rect_size: f64,
    candidate: Option<Rect>,
    phase: Phase,
    memory: HashMap<ImageId, RememberedSelection>,
    viewport: Size,
    image: Option<ImageBinding>,
    mapping: Option<ViewportMapping>,
    visible: bool,
}

impl RoiSelector {
    pub fn new(config: SelectorConfig, viewport: Size) -> Self {
        Self {
            rect_size: config.rect_size,
            config,
            aspect_ratio: None,
            candidate: None,
            phase: Phase::Selecting,
            memory: HashMap::new(),
            viewport,
            image: None,
            mapping: None,
            visible: false,
        }
    }

    pub fn aspect_ratio(&self) -> Option<f64> {
        self.aspect_ratio.map(|r| r.value())
    }

    pub fn ratio(&self) -> Option<AspectRatio> {
        self.aspect_ratio
    }

    pub fn rect_size(&self) -> f64 {
        self.rect_size
    }

    pub fn candidate_rect(&self) -> Option<Rect> {
        self.candidate
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn mapping(&self) -> Option<&ViewportMapping> {
        self.mapping.as_ref()
    }

    pub fn bound_image(&self) -> Option<ImageId> {
        self.image.map(|b| b.id)
    }

    pub fn remembered(&self, id: ImageId) -> Option<&RememberedSelection> {
        self.memory.get(&id)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Text to show instead of the image, if nothing is bound.
    pub fn placeholder(&self) -> Option<&'static str> {
        self.image.is_none().then_some(NO_IMAGE_PLACEHOLDER)
    }

    /// Bind `record` (or nothing) and derive the initial selection for it.
    pub fn set_image(&mut self, record: Option<&ImageRecord>) {
        let Some(record) = record else {
            self.image = None;
            self.mapping = None;
            self.candidate = None;
            self.phase = Phase::Selecting;
            return;
        };

        let binding = record.binding();
        self.image = Some(binding);
        self.mapping = ViewportMapping::fit(self.viewport, binding.size);

        if !record.pipeline().is_cropped() && self.memory.remove(&binding.id).is_some() {
            debug!(image = %binding.id, "Dropped remembered selection for uncropped image");
        }

        if self.restore_from_memory() {
            return;
        }
        self.candidate = self.default_rectangle();
        self.phase = Phase::Selecting;
    }

    /// Parse `"W:H"` and make it the active ratio.
    ///
    /// A blank string clears the ratio and the bound image's crop. Anything
    /// else that does not parse is ignored.
    pub fn set_aspect_ratio(&mut self, ratio: &str, record: Option<&mut ImageRecord>) {
        if ratio.trim().is_empty() {
            self.aspect_ratio = None;
            self.candidate = None;
            self.phase = Phase::Selecting;
            if let Some(record) = self.matching(record) {
                let id = record.id();
                record.pipeline_mut().clear_crop();
                self.memory.remove(&id);
                info!(image = %id, "Aspect ratio cleared, crop removed");
            }
            return;
        }

        let parsed = match ratio.parse::<AspectRatio>() {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Ignoring malformed aspect ratio");
                return;
            }
        };
        self.aspect_ratio = Some(parsed);

        if self.image.is_none() || self.restore_from_memory() {
            return;
        }
        self.candidate = self.default_rectangle();
        self.phase = Phase::Selecting;
    }

    /// Change the long-edge target and re-place the default rectangle.
    pub fn set_rect_size(&mut self, size: u32) {
        self.rect_size = size as f64;
        if self.image.is_some() {
            self.candidate = self.default_rectangle();
        }
    }

    /// Centered rectangle of the active ratio whose long edge is `rect_size`,
    /// shrunk to fit the displayed image.
    pub fn default_rectangle(&self) -> Option<Rect> {
        let ar = self.aspect_ratio()?;
        let area = self.mapping?.displayed_image_rect();
        let (iw, ih) = (area.width, area.height);

        let (mut w, mut h) = if ar > 1.0 {
            let w = self.rect_size.min(iw);
            (w, w / ar)
        } else {
            let h = self.rect_size.min(ih);
            (h * ar, h)
        };
        if w > iw {
            w = iw;
            h = w / ar;
        }
        if h > ih {
            h = ih;
            w = h * ar;
        }

        Some(Rect::from_center(area.center(), w, h))
    }

    /// Center the rectangle on the pointer, kept inside the displayed image.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if self.phase != Phase::Selecting || self.aspect_ratio.is_none() {
            return;
        }
        let (Some(mapping), Some(rect)) = (self.mapping, self.candidate) else {
            return;
        };
        let moved = Rect::from_center(Point::new(x, y), rect.width, rect.height)
            .clamped_within(&mapping.displayed_image_rect());
        self.candidate = Some(moved);
    }

    /// Grow (`delta > 0`) or shrink (`delta < 0`) the rectangle one step
    /// around its center.
    pub fn scroll(&mut self, delta: f64) {
        if self.phase != Phase::Selecting || delta == 0.0 {
            return;
        }
        let (Some(ar), Some(mapping), Some(rect)) =
            (self.aspect_ratio(), self.mapping, self.candidate)
        else {
            return;
        };

        let area = mapping.displayed_image_rect();
        let factor = if delta > 0.0 {
            self.config.zoom_in_factor
        } else {
            self.config.zoom_out_factor
        };
        let max_width = area.width.min(area.height * ar);
        let min_width = self.config.min_width.min(max_width);

        let width = (rect.width * factor).clamp(min_width, max_width);
        let height = width / ar;
        let resized = Rect::from_center(rect.center(), width, height).clamped_within(&area);

        self.candidate = Some(resized);
        self.rect_size = width.max(height);
    }

    /// Apply the candidate rectangle as `record`'s crop.
    ///
    /// Returns the record's new stage state, or `None` when there was nothing
    /// to confirm.
    pub fn confirm(&mut self, record: &mut ImageRecord) -> Option<StageState> {
        if self.phase != Phase::Selecting {
            return None;
        }
        let ratio = self.aspect_ratio()?;
        let mapping = self.mapping?;
        let rect = self.candidate?;
        let record = self.matching(Some(record))?;

        let roi = mapping.to_image(rect);
        match record.pipeline_mut().set_crop(roi) {
            Ok(state) => {
                self.phase = Phase::Confirmed;
                self.memory.insert(
                    record.id(),
                    RememberedSelection {
                        rect_size: self.rect_size,
                        rect,
                        ratio,
                        mapping,
                    },
                );
                info!(image = %record.id(), %roi, "Crop confirmed");
                Some(state)
            }
            Err(e) => {
                debug!(error = %e, "Selection not applied");
                None
            }
        }
    }

    /// Drop the crop of `record` and go back to positioning a fresh rectangle.
    pub fn cancel(&mut self, record: &mut ImageRecord) -> Option<StageState> {
        self.aspect_ratio?;
        let record = self.matching(Some(record))?;
        let id = record.id();

        let state = record.pipeline_mut().clear_crop();
        self.memory.remove(&id);
        self.phase = Phase::Selecting;
        self.candidate = self.default_rectangle();
        Some(state)
    }

    /// React to the display surface changing size.
    ///
    /// The candidate keeps covering the same image pixels; `rect_size` is
    /// rescaled with it.
    pub fn resize_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        let Some(binding) = self.image else {
            return;
        };

        let old = self.mapping;
        self.mapping = ViewportMapping::fit(viewport, binding.size);

        match (old, self.mapping, self.candidate) {
            (Some(old), Some(new), Some(rect)) => {
                let image_rect = old.viewport_to_image(rect);
                self.candidate = Some(
                    new.image_to_viewport(image_rect)
                        .clamped_within(&new.displayed_image_rect()),
                );
                self.rect_size *= new.scale / old.scale;
            }
            (_, _, None) if self.phase == Phase::Selecting => {
                self.candidate = self.default_rectangle();
            }
            _ => {}
        }
    }

    /// Current selection for rendering, if any is shown.
    pub fn overlay(&self) -> Option<SelectionOverlay> {
        self.aspect_ratio?;
        let mapping = self.mapping?;
        let rect = self.candidate?;
        let confirmed = self.phase == Phase::Confirmed;
        Some(SelectionOverlay {
            rect,
            phase: self.phase,
            dim_outside: confirmed,
            source: mapping.to_image(rect),
            hint: if confirmed {
                CONFIRMED_HINT
            } else {
                SELECTING_HINT
            },
        })
    }

    /// Forget the remembered selection of an image leaving the working set.
    pub fn forget(&mut self, id: ImageId) {
        self.memory.remove(&id);
        if self.bound_image() == Some(id) {
            self.set_image(None);
        }
    }

    /// Unbind the image; ratio and remembered selections are kept.
    pub fn reset(&mut self) {
        self.set_image(None);
    }

    fn restore_from_memory(&mut self) -> bool {
        let (Some(ar), Some(binding), Some(mapping)) =
            (self.aspect_ratio(), self.image, self.mapping)
        else {
            return false;
        };
        let Some(entry) = self.memory.get(&binding.id) else {
            return false;
        };
        if (entry.ratio - ar).abs() > EPSILON {
            return false;
        }

        let (rect_size, rect) = entry.under(&mapping);
        self.rect_size = rect_size;
        self.candidate = Some(rect);
        self.phase = Phase::Confirmed;
        debug!(image = %binding.id, "Restored remembered selection");
        true
    }

    fn matching<'a>(&self, record: Option<&'a mut ImageRecord>) -> Option<&'a mut ImageRecord> {
        let bound = self.image?;
        let record = record?;
        if record.id() != bound.id {
            debug!(bound = %bound.id, got = %record.id(), "Record does not match bound image");
            return None;
        }
        Some(record)
    }
}
