use dioxus::prelude::*;

use crate::state::AppState;

/// Move/remove menu for the right-clicked marker, anchored where the
/// click landed.
#[component]
pub fn ContextMenu(app: AppState) -> Element {
    let mut menu = app.menu;
    let Some(state) = menu.read().clone() else {
        return rsx! {};
    };
    let style = format!("left:{}px;top:{}px;", state.at.x, state.at.y);
    let move_id = state.id.clone();
    let remove_id = state.id.clone();

    rsx! {
        div {
            class: "context-menu",
            style: "{style}",
            onmousedown: move |evt: Event<MouseData>| evt.stop_propagation(),
            oncontextmenu: move |evt: Event<MouseData>| {
                evt.prevent_default();
                evt.stop_propagation();
            },

            button {
                onclick: move |_| {
                    menu.set(None);
                    app.run(|s| s.start_placing(&move_id));
                },
                "Move"
            }
            button {
                class: "danger",
                onclick: move |_| {
                    menu.set(None);
                    app.run(|s| s.remove_placement(&remove_id));
                },
                "Remove"
            }
        }
    }
}
