use dioxus::prelude::*;

use crate::state::AppState;

#[component]
pub fn Toast(app: AppState) -> Element {
    let Some(toast) = app.toast.read().clone() else {
        return rsx! {};
    };
    let class = if toast.error { "toast error" } else { "toast" };

    rsx! {
        div { class: "{class}", role: "status", "{toast.text}" }
    }
}
