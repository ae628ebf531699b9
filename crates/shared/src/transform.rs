use crate::models::Position;
use crate::viewport::ViewportState;

/// Convert a screen (viewport-relative) point to content coordinates,
/// undoing `translate(pan) scale(zoom)`.
pub fn screen_to_content(view: &ViewportState, screen: Position) -> Position {
    Position {
        x: (screen.x - view.pan_x) / view.zoom,
        y: (screen.y - view.pan_y) / view.zoom,
    }
}

/// Inverse of [`screen_to_content`].
pub fn content_to_screen(view: &ViewportState, content: Position) -> Position {
    Position {
        x: content.x * view.zoom + view.pan_x,
        y: content.y * view.zoom + view.pan_y,
    }
}

/// Round a position to whole pixels. Display only; stored positions stay real.
pub fn display_px(p: Position) -> (i64, i64) {
    (p.x.round() as i64, p.y.round() as i64)
}

/// Counter-scale applied to markers so they keep a constant on-screen size
/// once the map is zoomed past 1.
pub fn marker_scale(zoom: f64) -> f64 {
    if zoom > 1.0 {
        1.0 / zoom
    } else {
        1.0
    }
}

/// CSS transform for the content layer.
pub fn css_transform(view: &ViewportState) -> String {
    format!(
        "translate({}px,{}px) scale({})",
        view.pan_x, view.pan_y, view.zoom
    )
}

/// Zoom readout, e.g. `"150%"`.
pub fn zoom_percent(zoom: f64) -> String {
    format!("{}%", (zoom * 100.0).round() as i64)
}
