use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::html::HasFileData;
use dioxus::prelude::*;
use mapmemo_shared::interaction::{InteractionEvent, Mode, Notice, PointerButton};
use mapmemo_shared::markers::{MarkerKind, MarkerView};
use mapmemo_shared::models::{Position, Size};
use mapmemo_shared::transform::css_transform;
use tracing::warn;

use crate::browser;
use crate::components::context_menu::ContextMenu;
use crate::state::AppState;

const MAP_CONTAINER_ID: &str = "map-container";
const MAP_IMAGE_ID: &str = "map-image";

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

fn container_rect() -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(MAP_CONTAINER_ID)?;
    Some(element.get_bounding_client_rect())
}

/// Client coordinates relative to the map container, refreshing the
/// session's viewport size on the way.
fn to_viewport(app: AppState, client_x: f64, client_y: f64) -> Option<Position> {
    let rect = container_rect()?;
    let size = Size::new(rect.width(), rect.height());
    let mut session = app.session;
    if session.peek().viewport_size() != size {
        session.write().set_viewport_size(size);
    }
    Some(Position::new(client_x - rect.left(), client_y - rect.top()))
}

/// Normalize wheel deltas to pixels.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(v) => v.y,
        WheelDelta::Lines(v) => v.y * 40.0,
        WheelDelta::Pages(v) => v.y * 400.0,
    }
}

fn pointer_button(button: Option<MouseButton>) -> Option<PointerButton> {
    match button? {
        MouseButton::Primary => Some(PointerButton::Primary),
        MouseButton::Auxiliary => Some(PointerButton::Middle),
        MouseButton::Secondary => Some(PointerButton::Secondary),
        _ => None,
    }
}

fn touch_points(app: AppState, evt: &Event<TouchData>) -> Vec<Position> {
    evt.data()
        .touches()
        .iter()
        .filter_map(|t| {
            let c = t.client_coordinates();
            to_viewport(app, c.x, c.y)
        })
        .collect()
}

fn container_class(placing: bool, dragging: bool, panning: bool) -> &'static str {
    if dragging || panning {
        "map-container grabbing"
    } else if placing {
        "map-container placing"
    } else {
        "map-container"
    }
}

/// Inline style for one pin inside the zoomed layer.
fn marker_style(m: &MarkerView) -> String {
    format!(
        "left:{}px;top:{}px;transform:scale({});",
        m.content.x, m.content.y, m.scale
    )
}

/// Inline style for the background image at `percent` opacity.
fn opacity_style(percent: u32) -> String {
    format!("opacity:{};", f64::from(percent.min(100)) / 100.0)
}

fn marker_class(m: &MarkerView) -> String {
    let mut class = String::from(match m.kind {
        MarkerKind::Site => "marker",
        MarkerKind::Memo => "marker memo",
    });
    if m.selected {
        class.push_str(" selected");
    }
    if m.dimmed {
        class.push_str(" dimmed");
    }
    class
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

#[component]
pub fn MapView(app: AppState) -> Element {
    let session = app.session.read();
    let city = session.current();
    let transform_style = format!(
        "transform: {}; transform-origin: 0 0;",
        css_transform(&city.viewport)
    );
    let image = city.image.clone();
    let image_style = opacity_style(*app.map_opacity.read());
    let markers = session.marker_layer();
    let mode = session.mode();
    let class = container_class(
        mode.pending_placement().is_some(),
        mode.dragging_id().is_some(),
        mode.is_panning(),
    );
    drop(session);

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{class}",

            onmounted: move |_| {
                if let Some(rect) = container_rect() {
                    let mut session = app.session;
                    session.write().set_viewport_size(Size::new(rect.width(), rect.height()));
                }
            },

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                let client = evt.data().client_coordinates();
                let Some(at) = to_viewport(app, client.x, client.y) else { return };
                let delta_y = wheel_delta_y(evt.data().delta());
                app.handle(InteractionEvent::Wheel { at, delta_y });
            },

            onmousedown: move |evt: Event<MouseData>| {
                let Some(button) = pointer_button(evt.trigger_button()) else { return };
                if button == PointerButton::Middle {
                    evt.prevent_default();
                }
                let client = evt.client_coordinates();
                let Some(at) = to_viewport(app, client.x, client.y) else { return };
                let mut menu = app.menu;
                menu.set(None);
                app.handle(InteractionEvent::PointerDown { at, button });
            },

            onmousemove: move |evt: Event<MouseData>| {
                if *app.session.peek().mode() == Mode::Idle {
                    return;
                }
                let client = evt.client_coordinates();
                let Some(at) = to_viewport(app, client.x, client.y) else { return };
                app.handle(InteractionEvent::PointerMove { at });
            },

            onmouseup: move |evt: Event<MouseData>| {
                let client = evt.client_coordinates();
                let Some(at) = to_viewport(app, client.x, client.y) else { return };
                app.handle(InteractionEvent::PointerUp { at });
            },

            onmouseleave: move |_| {
                app.handle(InteractionEvent::PointerLeave);
            },

            oncontextmenu: move |evt: Event<MouseData>| {
                evt.prevent_default();
                let client = evt.client_coordinates();
                let Some(at) = to_viewport(app, client.x, client.y) else { return };
                app.handle(InteractionEvent::ContextMenu { at });
            },

            ondragover: move |evt: Event<DragData>| evt.prevent_default(),

            ondrop: move |evt: Event<DragData>| async move {
                evt.prevent_default();
                let Some(file) = evt.files().into_iter().next() else { return };
                match browser::read_image(file).await {
                    Ok((_, data)) => app.run(|s| s.set_background_image(data)),
                    Err(e) => {
                        warn!(error = %e, "dropped map rejected");
                        app.notify(Notice::LoadFailed(e));
                    }
                }
            },

            // --- Touch event handlers ---

            ontouchstart: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = touch_points(app, &evt);
                app.handle(InteractionEvent::TouchStart { touches });
            },

            ontouchmove: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let touches = touch_points(app, &evt);
                app.handle(InteractionEvent::TouchMove { touches });
            },

            ontouchend: move |evt: Event<TouchData>| {
                evt.prevent_default();
                let remaining = touch_points(app, &evt);
                app.handle(InteractionEvent::TouchEnd { remaining });
            },

            ontouchcancel: move |_evt: Event<TouchData>| {
                app.handle(InteractionEvent::TouchCancel);
            },

            // Inner layer: the CSS transform applies zoom/pan to image and pins together
            div {
                class: "map-inner",
                style: "{transform_style}",

                if let Some(src) = image {
                    img {
                        id: MAP_IMAGE_ID,
                        src: "{src}",
                        style: "{image_style}",
                        draggable: "false",
                        onload: move |_| {
                            if let Some((w, h)) = browser::image_natural_size(MAP_IMAGE_ID) {
                                app.run(|s| s.background_loaded(Size::new(w, h)));
                            }
                        },
                    }
                } else {
                    div { class: "map-placeholder", "Upload a map image to start" }
                }

                for m in markers.iter() {
                    div {
                        key: "{m.id}",
                        class: "{marker_class(m)}",
                        style: "{marker_style(m)}",
                        title: "{m.label}",
                        span { class: "marker-pin", "{m.glyph}" }
                        if m.show_label {
                            span { class: "marker-label",
                                "{m.label}"
                                if let Some(caption) = &m.caption {
                                    small { " {caption}" }
                                }
                            }
                        }
                    }
                }
            }

            ContextMenu { app }
        }
    }
}
