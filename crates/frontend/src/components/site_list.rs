use dioxus::prelude::*;
use mapmemo_shared::catalog::{icon_glyph, SiteFilter};

use crate::state::{list_row_id, AppState};

/// Clicking a row selects it, and also centers the map on it when placed.
fn select_row(app: AppState, id: &str, placed: bool) {
    app.run(|s| {
        let mut fx = s.select(id);
        if placed {
            fx.extend(s.pan_to(id));
        }
        fx
    });
}

fn toggle_placing(app: AppState, id: &str, placing: bool) {
    if placing {
        app.run(|s| s.cancel_placing());
    } else {
        app.run(|s| s.start_placing(id));
    }
}

fn row_class(selected: bool, placed: bool, placing: bool) -> String {
    let mut class = String::from("site-item");
    for (on, name) in [(selected, " selected"), (placed, " placed"), (placing, " placing")] {
        if on {
            class.push_str(name);
        }
    }
    class
}

#[component]
fn FilterBar(app: AppState) -> Element {
    let session = app.session.read();
    let filter = session.filter().clone();
    let types = session.catalog().site_types(session.current_city());
    drop(session);

    let active = filter.site_type.clone();
    let search_filter = filter.clone();

    rsx! {
        div { class: "filter-bar",
            input {
                r#type: "search",
                placeholder: "Search sites...",
                value: "{filter.search}",
                oninput: move |evt: Event<FormData>| {
                    let filter = SiteFilter {
                        search: evt.value(),
                        ..search_filter.clone()
                    };
                    app.run(|s| s.set_filter(filter));
                },
            }
            div { class: "filter-chips",
                button {
                    class: if active.is_none() { "filter-chip active" } else { "filter-chip" },
                    onclick: {
                        let filter = filter.clone();
                        move |_| {
                            let filter = SiteFilter { site_type: None, ..filter.clone() };
                            app.run(|s| s.set_filter(filter));
                        }
                    },
                    "All"
                }
                for t in types {
                    button {
                        key: "{t}",
                        class: if active.as_deref() == Some(t.as_str()) { "filter-chip active" } else { "filter-chip" },
                        onclick: {
                            let filter = filter.clone();
                            let t = t.clone();
                            move |_| {
                                let filter = SiteFilter { site_type: Some(t.clone()), ..filter.clone() };
                                app.run(|s| s.set_filter(filter));
                            }
                        },
                        "{t}"
                    }
                }
            }
        }
    }
}

/// Owned copy of one list row, so the session borrow ends before rendering.
struct RowView {
    id: String,
    name: String,
    glyph: &'static str,
    meta: String,
    placed: bool,
    selected: bool,
    placing: bool,
}

#[component]
pub fn SiteList(app: AppState) -> Element {
    let session = app.session.read();
    let counts = session.counts();
    let city = session.current_city().clone();
    let rows: Vec<RowView> = session
        .site_rows()
        .into_iter()
        .map(|r| RowView {
            id: r.site.id.clone(),
            name: r.site.name.clone(),
            glyph: icon_glyph(r.site),
            meta: format!("{} · {}×{}", r.site.type_label(), r.site.size_x, r.site.size_y),
            placed: r.placed,
            selected: r.selected,
            placing: r.placing,
        })
        .collect();
    let placing_id = session.mode().pending_placement().map(str::to_string);
    let selected_id = session.selected().map(str::to_string);
    let current = session.current();
    let memos: Vec<(String, String, bool)> = session
        .memos_for(&city)
        .iter()
        .map(|m| (m.id.clone(), m.title.clone(), current.placements.contains(&m.id)))
        .collect();
    drop(session);

    rsx! {
        aside { class: "side-panel site-list",
            FilterBar { app }
            div { class: "counts", "{counts.placed} / {counts.total} placed" }

            ul { class: "site-items",
                for RowView { id, name, glyph, meta, placed, selected, placing } in rows {
                    li {
                        key: "{id}",
                        id: list_row_id(&id),
                        class: row_class(selected, placed, placing),
                        onclick: {
                            let id = id.clone();
                            move |_| select_row(app, &id, placed)
                        },
                        ondoubleclick: {
                            let id = id.clone();
                            move |_| toggle_placing(app, &id, placing)
                        },
                        span { class: "site-glyph", "{glyph}" }
                        div { class: "site-text",
                            div { class: "site-name", "{name}" }
                            div { class: "site-meta", "{meta}" }
                        }
                        button {
                            class: if placing { "place-btn active" } else { "place-btn" },
                            onclick: {
                                let id = id.clone();
                                move |evt: Event<MouseData>| {
                                    evt.stop_propagation();
                                    toggle_placing(app, &id, placing);
                                }
                            },
                            if placing { "Cancel" } else if placed { "Move" } else { "Place" }
                        }
                    }
                }
            }

            h3 { "Memos" }
            if memos.is_empty() {
                p { class: "empty", "No memos for {city} yet." }
            }
            ul { class: "memo-items",
                for (id, title, placed) in memos {
                    li {
                        key: "{id}",
                        id: list_row_id(&id),
                        class: row_class(
                            selected_id.as_deref() == Some(id.as_str()),
                            placed,
                            placing_id.as_deref() == Some(id.as_str()),
                        ),
                        onclick: {
                            let id = id.clone();
                            move |_| select_row(app, &id, placed)
                        },
                        span { class: "site-glyph", "📝" }
                        div { class: "site-text",
                            div { class: "site-name", "{title}" }
                        }
                        button {
                            class: "place-btn",
                            onclick: {
                                let id = id.clone();
                                let placing = placing_id.as_deref() == Some(id.as_str());
                                move |evt: Event<MouseData>| {
                                    evt.stop_propagation();
                                    toggle_placing(app, &id, placing);
                                }
                            },
                            if placed { "Move" } else { "Place" }
                        }
                    }
                }
            }
        }
    }
}
