use crate::catalog::icon_glyph;
use crate::models::{Entity, EntityId, Position};
use crate::transform::marker_scale;
use crate::viewport::ViewportState;

/// Pin diameter in pixels at scale 1. The pin is centered on the placement
/// position; the stylesheet's `.marker` margin and transform origin use the
/// same size.
pub const MARKER_SIZE: f64 = 28.0;

const MEMO_GLYPH: &str = "📝";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn contains(&self, p: Position) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Site,
    Memo,
}

/// Everything the render layer needs to draw one pin.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerView {
    pub id: EntityId,
    pub kind: MarkerKind,
    pub label: String,
    /// Size caption shown next to the label while a type filter is active.
    pub caption: Option<String>,
    pub glyph: &'static str,
    pub content: Position,
    pub screen: ScreenRect,
    /// Counter-scale for the pin element inside the zoomed layer.
    pub scale: f64,
    pub selected: bool,
    /// Filtered out by the current list filter; drawn faded.
    pub dimmed: bool,
    pub show_label: bool,
}

/// Rendered markers of the current city, in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerLayer {
    markers: Vec<MarkerView>,
}

impl MarkerLayer {
    pub fn iter(&self) -> impl Iterator<Item = &MarkerView> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Topmost marker under `screen`, i.e. the last painted one.
    pub fn hit_test(&self, screen: Position) -> Option<&MarkerView> {
        self.markers.iter().rev().find(|m| m.screen.contains(screen))
    }
}

/// Input for one marker: the resolved entity, its placement, and list state.
pub(crate) struct MarkerInput<'a> {
    pub entity: Entity<'a>,
    pub position: Position,
    pub selected: bool,
    pub filtered_in: bool,
}

pub(crate) fn layout<'a>(
    view: &ViewportState,
    filter_active: bool,
    inputs: impl IntoIterator<Item = MarkerInput<'a>>,
) -> MarkerLayer {
    let scale = marker_scale(view.zoom);
    let on_screen = view.zoom * scale;
    let markers = inputs
        .into_iter()
        .map(|input| {
            let center = view.to_screen(input.position);
            let half = MARKER_SIZE / 2.0 * on_screen;
            let (kind, glyph, caption) = match input.entity {
                Entity::Site(site) => (
                    MarkerKind::Site,
                    icon_glyph(site),
                    Some(format!("{}×{}", site.size_x, site.size_y)),
                ),
                Entity::Memo(_) => (MarkerKind::Memo, MEMO_GLYPH, None),
            };
            let show_label = filter_active && input.filtered_in;
            MarkerView {
                id: input.entity.id().to_string(),
                kind,
                label: input.entity.label().to_string(),
                caption: caption.filter(|_| show_label),
                glyph,
                content: input.position,
                screen: ScreenRect {
                    x: center.x - half,
                    y: center.y - half,
                    width: MARKER_SIZE * on_screen,
                    height: MARKER_SIZE * on_screen,
                },
                scale,
                selected: input.selected,
                dimmed: !input.filtered_in,
                show_label,
            }
        })
        .collect();
    MarkerLayer { markers }
}
