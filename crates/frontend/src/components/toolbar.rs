use dioxus::prelude::*;
use mapmemo_shared::exchange::export_file_name;
use mapmemo_shared::interaction::Notice;
use mapmemo_shared::models::City;
use mapmemo_shared::transform::zoom_percent;
use mapmemo_shared::viewport::{PanDirection, BUTTON_ZOOM_STEP};
use tracing::warn;

use crate::browser;
use crate::state::{AppState, MemoDraft};

fn export(app: AppState) {
    let with_images = browser::confirm(
        "Include map images in the export?\n(Files get much larger with images.)\n\nOK = with images / Cancel = positions only",
    );
    let doc = app.session.peek().export_doc(with_images);
    let result = doc
        .to_pretty_json()
        .map_err(|e| e.to_string())
        .and_then(|json| {
            browser::download_json(&export_file_name(browser::today()), &json)
                .map_err(|e| format!("{e:?}"))
        });
    match result {
        Ok(()) => app.notify(Notice::Exported),
        Err(e) => {
            warn!(error = %e, "export failed");
            app.notify(Notice::SaveFailed(e));
        }
    }
}

#[component]
fn CityTabs(app: AppState) -> Element {
    let session = app.session.read();
    let current = session.current_city().clone();
    let cities: Vec<City> = session.cities().cloned().collect();
    drop(session);

    rsx! {
        div { class: "city-tabs",
            for city in cities {
                button {
                    key: "{city}",
                    class: if city == current { "city-tab active" } else { "city-tab" },
                    onclick: {
                        let city = city.clone();
                        move |_| {
                            let mut menu = app.menu;
                            menu.set(None);
                            app.run(|s| s.switch_city(&city));
                        }
                    },
                    "{city}"
                }
            }
        }
    }
}

#[component]
fn ViewControls(mut app: AppState) -> Element {
    let zoom = zoom_percent(app.session.read().viewport().zoom);
    let opacity = *app.map_opacity.read();

    rsx! {
        div { class: "view-controls",
            button { title: "Zoom out", onclick: move |_| app.run(|s| s.zoom_by(1.0 / BUTTON_ZOOM_STEP)), "−" }
            span { class: "zoom-readout", "{zoom}" }
            button { title: "Zoom in", onclick: move |_| app.run(|s| s.zoom_by(BUTTON_ZOOM_STEP)), "+" }
            button { title: "Fit to content", onclick: move |_| app.run(|s| s.fit_to_content()), "Fit" }
            button { title: "Reset view", onclick: move |_| app.run(|s| s.reset_view()), "1:1" }
            div { class: "pan-pad",
                button { title: "Pan up", onclick: move |_| app.run(|s| s.pan_step(PanDirection::Up)), "▲" }
                button { title: "Pan left", onclick: move |_| app.run(|s| s.pan_step(PanDirection::Left)), "◀" }
                button { title: "Pan right", onclick: move |_| app.run(|s| s.pan_step(PanDirection::Right)), "▶" }
                button { title: "Pan down", onclick: move |_| app.run(|s| s.pan_step(PanDirection::Down)), "▼" }
            }
            label { class: "opacity-control", title: "Map opacity",
                input {
                    r#type: "range",
                    min: "0",
                    max: "100",
                    value: "{opacity}",
                    oninput: move |evt: Event<FormData>| {
                        if let Ok(percent) = evt.value().parse::<u32>() {
                            app.map_opacity.set(percent.min(100));
                        }
                    },
                }
                span { "{opacity}%" }
            }
        }
    }
}

#[component]
pub fn Toolbar(app: AppState) -> Element {
    let has_image = app.session.read().current().image.is_some();

    rsx! {
        header { class: "toolbar",
            h1 { "Map Memo Board" }
            CityTabs { app }
            ViewControls { app }

            div { class: "file-controls",
                label { class: "button",
                    "Upload map"
                    input {
                        r#type: "file",
                        accept: "image/*",
                        hidden: true,
                        onchange: move |evt: Event<FormData>| async move {
                            let Some(file) = evt.files().into_iter().next() else { return };
                            match browser::read_image(file).await {
                                Ok((_, data)) => app.run(|s| s.set_background_image(data)),
                                Err(e) => {
                                    warn!(error = %e, "map upload rejected");
                                    app.notify(Notice::LoadFailed(e));
                                }
                            }
                        },
                    }
                }
                if has_image {
                    button {
                        class: "secondary",
                        onclick: move |_| {
                            if browser::confirm("Remove this city's map image?") {
                                app.run(|s| s.clear_background_image());
                            }
                        },
                        "Clear map"
                    }
                }
                button { onclick: move |_| export(app), "Export" }
                label { class: "button",
                    "Import"
                    input {
                        r#type: "file",
                        accept: ".json,application/json",
                        hidden: true,
                        onchange: move |evt: Event<FormData>| async move {
                            let Some(file) = evt.files().into_iter().next() else { return };
                            match browser::read_text(file).await {
                                Ok(json) => app.run(|s| s.import_json(&json)),
                                Err(e) => app.notify(Notice::LoadFailed(e)),
                            }
                        },
                    }
                }
                button {
                    class: "danger",
                    onclick: move |_| {
                        let city = app.session.peek().current_city().clone();
                        if browser::confirm(&format!("Clear every placement in {city}?")) {
                            app.run(|s| s.reset_positions());
                        }
                    },
                    "Reset positions"
                }
                button {
                    onclick: move |_| {
                        let mut draft = app.memo_draft;
                        draft.set(Some(MemoDraft::default()));
                    },
                    "New memo"
                }
            }
        }
    }
}
