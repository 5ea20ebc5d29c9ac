/// Default long-edge length of the crop rectangle, in viewport pixels.
pub const DEFAULT_RECT_SIZE: f64 = 512.0;

/// Smallest width the crop rectangle may be scrolled down to, in viewport pixels.
pub const MIN_RECT_WIDTH: f64 = 100.0;

/// Rectangle growth factor per scroll step towards the user.
pub const ZOOM_IN_FACTOR: f64 = 1.1;

/// Rectangle shrink factor per scroll step away from the user.
pub const ZOOM_OUT_FACTOR: f64 = 0.9;

/// Viewport size used when no display surface has reported its size yet.
pub const DEFAULT_VIEWPORT: (f64, f64) = (1280.0, 720.0);

/// File extensions picked up by folder import (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Text shown by every display behavior when no image is bound.
pub const NO_IMAGE_PLACEHOLDER: &str = "Select an image";

/// Hint shown while the crop rectangle follows the pointer.
pub const SELECTING_HINT: &str = "Move to position, scroll to resize, left click to confirm";

/// Hint shown once the crop rectangle is confirmed.
pub const CONFIRMED_HINT: &str = "Right click to cancel the crop";

/// Small epsilon used when comparing viewport-space floating point values.
pub const EPSILON: f64 = 1e-9;
