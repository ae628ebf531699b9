use serde::{Deserialize, Serialize};

use crate::models::{Position, Size};
use crate::transform;

/// Interactive zoom limits (wheel, pinch, buttons).
pub const ZOOM_MIN: f64 = 0.1;
pub const ZOOM_MAX: f64 = 5.0;

/// Limits applied by fit-to-content.
pub const FIT_ZOOM_MIN: f64 = 0.05;
pub const FIT_ZOOM_MAX: f64 = 3.0;

/// Hard bounds any stored zoom must respect.
pub const STATE_ZOOM_MIN: f64 = 0.05;
pub const STATE_ZOOM_MAX: f64 = 5.0;

/// Screen pixels kept free around fitted content.
pub const FIT_PADDING: f64 = 60.0;

/// Screen pixels moved per pan-button press.
pub const PAN_STEP: f64 = 100.0;

/// Zoom factor per wheel notch scrolled away from the user.
pub const WHEEL_ZOOM_OUT: f64 = 0.9;
/// Zoom factor per wheel notch scrolled toward the user.
pub const WHEEL_ZOOM_IN: f64 = 1.11;

/// Zoom factor of the toolbar zoom buttons.
pub const BUTTON_ZOOM_STEP: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Axis-aligned content-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Position,
    pub max: Position,
}

impl Bounds {
    pub fn from_origin_size(origin: Position, size: Size) -> Self {
        Bounds {
            min: origin,
            max: Position::new(origin.x + size.width, origin.y + size.height),
        }
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min: Position::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Position::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Box that fit-to-content frames.
///
/// Placements always win over the background image, even when the image is
/// larger than the placement bounds.
pub fn fit_bounds(
    footprints: impl IntoIterator<Item = (Position, Size)>,
    image: Option<Size>,
) -> Option<Bounds> {
    let placed = footprints
        .into_iter()
        .map(|(pos, size)| Bounds::from_origin_size(pos, size))
        .reduce(Bounds::union);
    placed.or_else(|| image.map(|size| Bounds::from_origin_size(Position::ORIGIN, size)))
}

/// Pan and zoom of one city's map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
    /// Natural size of the background raster, once decoded.
    #[serde(skip)]
    pub content_size: Option<Size>,
}

impl Default for ViewportState {
    fn default() -> Self {
        ViewportState {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
            content_size: None,
        }
    }
}

impl ViewportState {
    pub fn pan(&self) -> Position {
        Position::new(self.pan_x, self.pan_y)
    }

    pub fn set_pan(&mut self, pan: Position) {
        self.pan_x = pan.x;
        self.pan_y = pan.y;
    }

    pub fn to_content(&self, screen: Position) -> Position {
        transform::screen_to_content(self, screen)
    }

    pub fn to_screen(&self, content: Position) -> Position {
        transform::content_to_screen(self, content)
    }

    /// Zoom to `target` keeping the content point under `anchor` fixed.
    pub fn zoom_at(&mut self, target: f64, anchor: Position) {
        let new_zoom = target.clamp(ZOOM_MIN, ZOOM_MAX);
        let content = self.to_content(anchor);
        self.zoom = new_zoom;
        self.pan_x = anchor.x - content.x * new_zoom;
        self.pan_y = anchor.y - content.y * new_zoom;
    }

    /// Multiply zoom by `factor` around the viewport center.
    pub fn zoom_by(&mut self, factor: f64, viewport: Size) {
        self.zoom_at(self.zoom * factor, viewport.center());
    }

    /// Apply one wheel notch. Positive `delta_y` scrolls away (zoom out).
    pub fn wheel(&mut self, delta_y: f64, anchor: Position) {
        if delta_y == 0.0 {
            return;
        }
        let factor = if delta_y > 0.0 {
            WHEEL_ZOOM_OUT
        } else {
            WHEEL_ZOOM_IN
        };
        self.zoom_at(self.zoom * factor, anchor);
    }

    /// Apply a frame-to-frame pinch distance ratio around the finger midpoint.
    pub fn pinch(&mut self, ratio: f64, midpoint: Position) {
        if !ratio.is_finite() || ratio <= 0.0 {
            return;
        }
        self.zoom_at(self.zoom * ratio, midpoint);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Pan buttons move the content, so "up" reveals what is above.
    pub fn pan_step(&mut self, direction: PanDirection) {
        match direction {
            PanDirection::Up => self.pan_by(0.0, PAN_STEP),
            PanDirection::Down => self.pan_by(0.0, -PAN_STEP),
            PanDirection::Left => self.pan_by(PAN_STEP, 0.0),
            PanDirection::Right => self.pan_by(-PAN_STEP, 0.0),
        }
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }

    /// Center `content` in the viewport without changing zoom.
    pub fn center_on(&mut self, content: Position, viewport: Size) {
        self.pan_x = viewport.width / 2.0 - content.x * self.zoom;
        self.pan_y = viewport.height / 2.0 - content.y * self.zoom;
    }

    /// Frame `bounds` inside the viewport with padding.
    ///
    /// Returns `false` without touching the view when the viewport has no
    /// area yet (not laid out). Missing or degenerate bounds reset the view.
    pub fn fit_to_content(&mut self, viewport: Size, bounds: Option<Bounds>) -> bool {
        if viewport.is_empty() {
            return false;
        }
        let Some(bounds) = bounds.filter(|b| b.width() > 0.0 && b.height() > 0.0) else {
            self.reset();
            return true;
        };

        let w = bounds.width();
        let h = bounds.height();
        let scale_x = (viewport.width - FIT_PADDING * 2.0) / w;
        let scale_y = (viewport.height - FIT_PADDING * 2.0) / h;
        let zoom = scale_x.min(scale_y).min(FIT_ZOOM_MAX).max(FIT_ZOOM_MIN);

        self.zoom = zoom;
        self.pan_x = (viewport.width - w * zoom) / 2.0 - bounds.min.x * zoom;
        self.pan_y = (viewport.height - h * zoom) / 2.0 - bounds.min.y * zoom;
        true
    }

    /// Repair values coming from storage: non-finite or zero zoom becomes 1,
    /// others are clamped into the stored-zoom range.
    pub fn sanitized(mut self) -> Self {
        if !self.zoom.is_finite() || self.zoom == 0.0 {
            self.zoom = 1.0;
        }
        self.zoom = self.zoom.clamp(STATE_ZOOM_MIN, STATE_ZOOM_MAX);
        if !self.pan_x.is_finite() {
            self.pan_x = 0.0;
        }
        if !self.pan_y.is_finite() {
            self.pan_y = 0.0;
        }
        self
    }
}
