//! Operating modes and the display behavior each one shows.
//!
//! Every behavior is kept alive for the whole session; switching modes only
//! changes which one is active, so per-image state such as the crop
//! selector's remembered selections survives the switch.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::config::SelectorConfig;
use crate::consts::NO_IMAGE_PLACEHOLDER;
use crate::geometry::{fit_rect, PixelRect, Point, Rect, Size};
use crate::record::{ImageBinding, ImageId, ImageRecord};
use crate::selector::RoiSelector;

/// Operating mode chosen by the operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    Default,
    Crop,
    Resize,
    Mark,
    Correct,
}

impl Mode {
    pub const ALL: &'static [Self] = &[
        Self::Default,
        Self::Crop,
        Self::Resize,
        Self::Mark,
        Self::Correct,
    ];

    pub fn behavior(self) -> BehaviorKind {
        match self {
            Self::Default => BehaviorKind::Plain,
            Self::Crop => BehaviorKind::RoiSelect,
            Self::Resize => BehaviorKind::CroppedPreview,
            Self::Mark | Self::Correct => BehaviorKind::ProcessedPreview,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Crop => write!(f, "crop"),
            Self::Resize => write!(f, "resize"),
            Self::Mark => write!(f, "mark"),
            Self::Correct => write!(f, "correct"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown mode {s:?}"))
    }
}

/// The closed set of display behaviors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BehaviorKind {
    Plain,
    RoiSelect,
    CroppedPreview,
    ProcessedPreview,
}

/// Lifecycle hooks every display behavior provides to the router.
pub trait DisplayBehavior {
    /// Became the active behavior.
    fn on_enter(&mut self);

    /// Stopped being the active behavior.
    fn on_exit(&mut self);

    fn bind_image(&mut self, record: Option<&ImageRecord>);

    fn resize_viewport(&mut self, viewport: Size);

    /// Drop transient state (bound image, overlays); long-lived memory stays.
    fn reset(&mut self);
}

/// Where a region of the source image is drawn inside the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewLayout {
    /// Original-resolution pixels shown.
    pub source: PixelRect,
    /// Viewport-space target rectangle.
    pub target: Rect,
    /// Whether the target gets a border (a crop is in effect).
    pub framed: bool,
}

/// Binding, viewport and visibility shared by the preview behaviors.
#[derive(Clone, Debug)]
struct Surface {
    image: Option<ImageBinding>,
    viewport: Size,
    visible: bool,
}

impl Surface {
    fn new(viewport: Size) -> Self {
        Self {
            image: None,
            viewport,
            visible: false,
        }
    }

    fn bound_to(&self, record: &ImageRecord) -> bool {
        self.image.is_some_and(|b| b.id == record.id())
    }

    fn placeholder(&self) -> Option<&'static str> {
        self.image.is_none().then_some(NO_IMAGE_PLACEHOLDER)
    }

    /// `source` fitted and centered in the viewport.
    fn layout(&self, source: PixelRect, framed: bool) -> PreviewLayout {
        let size = Size::new(source.width as f64, source.height as f64);
        PreviewLayout {
            source,
            target: fit_rect(self.viewport, size),
            framed,
        }
    }
}

fn full_image(record: &ImageRecord) -> PixelRect {
    PixelRect::new(0, 0, record.width(), record.height())
}

/// Shows the whole image, fitted to the viewport.
#[derive(Clone, Debug)]
pub struct PlainDisplay {
    surface: Surface,
}

impl PlainDisplay {
    pub fn new(viewport: Size) -> Self {
        Self {
            surface: Surface::new(viewport),
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        self.surface.placeholder()
    }

    pub fn is_visible(&self) -> bool {
        self.surface.visible
    }

    pub fn layout(&self, record: &ImageRecord) -> Option<PreviewLayout> {
        self.surface
            .bound_to(record)
            .then(|| self.surface.layout(full_image(record), false))
    }
}

/// Shows the cropped region enlarged to fill the viewport.
#[derive(Clone, Debug)]
pub struct CroppedPreview {
    surface: Surface,
}

impl CroppedPreview {
    pub fn new(viewport: Size) -> Self {
        Self {
            surface: Surface::new(viewport),
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        self.surface.placeholder()
    }

    pub fn is_visible(&self) -> bool {
        self.surface.visible
    }

    /// The crop region fitted to the viewport, or the whole image when uncropped.
    pub fn layout(&self, record: &ImageRecord) -> Option<PreviewLayout> {
        if !self.surface.bound_to(record) {
            return None;
        }
        let layout = match record.pipeline().roi() {
            Some(roi) => self.surface.layout(roi, true),
            None => self.surface.layout(full_image(record), false),
        };
        Some(layout)
    }
}

/// A labelled point placed on the processed preview, in viewport coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    pub position: Point,
    pub label: String,
}

/// Shows the image as far as it has been processed, plus placed marks.
///
/// Mark and correct modes share this preview; marks are only shown while
/// mark mode is active.
#[derive(Clone, Debug)]
pub struct ProcessedPreview {
    surface: Surface,
    marks: Vec<Mark>,
    marking: bool,
}

impl ProcessedPreview {
    pub fn new(viewport: Size) -> Self {
        Self {
            surface: Surface::new(viewport),
            marks: Vec::new(),
            marking: false,
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        self.surface.placeholder()
    }

    pub fn is_visible(&self) -> bool {
        self.surface.visible
    }

    /// Layout of the processed image.
    ///
    /// A resized image is laid out at its output aspect; a cropped one at its
    /// crop region; anything else as the plain image.
    pub fn layout(&self, record: &ImageRecord) -> Option<PreviewLayout> {
        if !self.surface.bound_to(record) {
            return None;
        }
        let pipeline = record.pipeline();
        let source = pipeline.roi().unwrap_or_else(|| full_image(record));
        let layout = match pipeline.resize_spec() {
            Some(spec) if pipeline.is_resized() => PreviewLayout {
                source,
                target: fit_rect(
                    self.surface.viewport,
                    Size::new(spec.width as f64, spec.height as f64),
                ),
                framed: true,
            },
            _ => self.surface.layout(source, pipeline.is_cropped()),
        };
        Some(layout)
    }

    pub fn add_mark(&mut self, position: Point, label: impl Into<String>) {
        self.marks.push(Mark {
            position,
            label: label.into(),
        });
    }

    pub fn clear_marks(&mut self) {
        self.marks.clear();
    }

    /// Placed marks, empty unless mark mode is active.
    pub fn marks(&self) -> &[Mark] {
        if self.marking {
            &self.marks[..]
        } else {
            &[]
        }
    }

    pub fn is_marking(&self) -> bool {
        self.marking
    }
}

impl DisplayBehavior for PlainDisplay {
    fn on_enter(&mut self) {
        self.surface.visible = true;
    }

    fn on_exit(&mut self) {
        self.surface.visible = false;
    }

    fn bind_image(&mut self, record: Option<&ImageRecord>) {
        self.surface.image = record.map(ImageRecord::binding);
    }

    fn resize_viewport(&mut self, viewport: Size) {
        self.surface.viewport = viewport;
    }

    fn reset(&mut self) {
        self.surface.image = None;
    }
}

impl DisplayBehavior for CroppedPreview {
    fn on_enter(&mut self) {
        self.surface.visible = true;
    }

    fn on_exit(&mut self) {
        self.surface.visible = false;
    }

    fn bind_image(&mut self, record: Option<&ImageRecord>) {
        self.surface.image = record.map(ImageRecord::binding);
    }

    fn resize_viewport(&mut self, viewport: Size) {
        self.surface.viewport = viewport;
    }

    fn reset(&mut self) {
        self.surface.image = None;
    }
}

impl DisplayBehavior for ProcessedPreview {
    fn on_enter(&mut self) {
        self.surface.visible = true;
    }

    fn on_exit(&mut self) {
        self.surface.visible = false;
    }

    fn bind_image(&mut self, record: Option<&ImageRecord>) {
        self.surface.image = record.map(ImageRecord::binding);
    }

    fn resize_viewport(&mut self, viewport: Size) {
        self.surface.viewport = viewport;
    }

    fn reset(&mut self) {
        self.surface.image = None;
        self.clear_marks();
    }
}

impl DisplayBehavior for RoiSelector {
    fn on_enter(&mut self) {
        self.set_visible(true);
    }

    fn on_exit(&mut self) {
        self.set_visible(false);
    }

    fn bind_image(&mut self, record: Option<&ImageRecord>) {
        self.set_image(record);
    }

    fn resize_viewport(&mut self, viewport: Size) {
        RoiSelector::resize_viewport(self, viewport);
    }

    fn reset(&mut self) {
        RoiSelector::reset(self);
    }
}

/// Routes the operating mode to exactly one active display behavior.
#[derive(Clone, Debug)]
pub struct DisplayRouter {
    plain: PlainDisplay,
    selector: RoiSelector,
    cropped: CroppedPreview,
    processed: ProcessedPreview,
    mode: Option<Mode>,
    image: Option<ImageId>,
}

impl DisplayRouter {
    pub fn new(config: SelectorConfig, viewport: Size) -> Self {
        Self {
            plain: PlainDisplay::new(viewport),
            selector: RoiSelector::new(config, viewport),
            cropped: CroppedPreview::new(viewport),
            processed: ProcessedPreview::new(viewport),
            mode: None,
            image: None,
        }
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn active(&self) -> Option<BehaviorKind> {
        self.mode.map(Mode::behavior)
    }

    pub fn current_image(&self) -> Option<ImageId> {
        self.image
    }

    /// Switch to `mode` (or to no mode), binding `current` to the new behavior.
    ///
    /// The previous behavior gets `on_exit` before the new one is bound and
    /// gets `on_enter`. Switching to no mode resets every behavior.
    pub fn set_mode(&mut self, mode: Option<Mode>, current: Option<&ImageRecord>) {
        if let Some(previous) = self.active() {
            self.behavior_mut(previous).on_exit();
        }
        self.mode = mode;
        self.image = current.map(ImageRecord::id);
        self.processed.marking = mode == Some(Mode::Mark);

        match mode {
            Some(mode) => {
                let behavior = self.behavior_mut(mode.behavior());
                behavior.bind_image(current);
                behavior.on_enter();
                debug!(%mode, "Mode switched");
            }
            None => {
                self.reset();
                debug!("Mode cleared");
            }
        }
    }

    /// Show `record` in the active behavior.
    pub fn set_image(&mut self, record: Option<&ImageRecord>) {
        self.image = record.map(ImageRecord::id);
        if let Some(kind) = self.active() {
            self.behavior_mut(kind).bind_image(record);
        }
    }

    /// Propagate a viewport size change to every behavior, active or not.
    pub fn resize_viewport(&mut self, viewport: Size) {
        for kind in [
            BehaviorKind::Plain,
            BehaviorKind::RoiSelect,
            BehaviorKind::CroppedPreview,
            BehaviorKind::ProcessedPreview,
        ] {
            self.behavior_mut(kind).resize_viewport(viewport);
        }
    }

    /// Clean up after an image left the working set.
    pub fn forget_image(&mut self, id: ImageId) {
        self.selector.forget(id);
        if self.image == Some(id) {
            self.set_image(None);
        }
    }

    pub fn reset(&mut self) {
        self.image = None;
        self.plain.reset();
        DisplayBehavior::reset(&mut self.selector);
        self.cropped.reset();
        self.processed.reset();
    }

    /// Place a mark on the processed preview; only honored in mark mode.
    pub fn add_mark(&mut self, position: Point, label: impl Into<String>) -> bool {
        if self.mode != Some(Mode::Mark) || self.image.is_none() {
            return false;
        }
        self.processed.add_mark(position, label);
        true
    }

    /// The crop selector, only while crop mode is active.
    pub fn roi_selector_mut(&mut self) -> Option<&mut RoiSelector> {
        (self.active() == Some(BehaviorKind::RoiSelect)).then_some(&mut self.selector)
    }

    pub fn selector(&self) -> &RoiSelector {
        &self.selector
    }

    pub fn plain(&self) -> &PlainDisplay {
        &self.plain
    }

    pub fn cropped_preview(&self) -> &CroppedPreview {
        &self.cropped
    }

    pub fn processed_preview(&self) -> &ProcessedPreview {
        &self.processed
    }

    fn behavior_mut(&mut self, kind: BehaviorKind) -> &mut dyn DisplayBehavior {
        match kind {
            BehaviorKind::Plain => &mut self.plain,
            BehaviorKind::RoiSelect => &mut self.selector,
            BehaviorKind::CroppedPreview => &mut self.cropped,
            BehaviorKind::ProcessedPreview => &mut self.processed,
        }
    }
}
