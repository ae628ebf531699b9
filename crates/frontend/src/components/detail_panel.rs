use dioxus::prelude::*;
use mapmemo_shared::catalog::clean_description;
use mapmemo_shared::models::{Entity, Memo};
use mapmemo_shared::transform::display_px;

use crate::api::SiteRecord;
use crate::browser;
use crate::state::{AppState, MemoDraft};

const THUMB_BASE: &str = "/static/";

fn residents(rec: &SiteRecord) -> Option<String> {
    match (rec.site.resident_min, rec.site.resident_max) {
        (Some(min), Some(max)) if min != max => Some(format!("{min}–{max}")),
        (Some(n), _) | (None, Some(n)) => Some(n.to_string()),
        (None, None) => None,
    }
}

/// Date part of an RFC 3339 timestamp, for display.
fn created_label(memo: &Memo) -> &str {
    memo.created_at.split('T').next().unwrap_or(&memo.created_at)
}

#[component]
fn PlacementActions(app: AppState, id: String, position: Option<(i64, i64)>, placing: bool) -> Element {
    let place_id = id.clone();
    let pan_id = id.clone();
    let remove_id = id;

    rsx! {
        div { class: "detail-actions",
            if let Some((x, y)) = position {
                span { class: "detail-position", "({x}, {y})" }
            }
            button {
                class: if placing { "active" } else { "" },
                onclick: move |_| {
                    if placing {
                        app.run(|s| s.cancel_placing());
                    } else {
                        app.run(|s| s.start_placing(&place_id));
                    }
                },
                if placing { "Click the map..." } else if position.is_some() { "Move" } else { "Place on map" }
            }
            if position.is_some() {
                button {
                    class: "secondary",
                    onclick: move |_| app.run(|s| s.pan_to(&pan_id)),
                    "Show"
                }
                button {
                    class: "danger",
                    onclick: move |_| app.run(|s| s.remove_placement(&remove_id)),
                    "Remove"
                }
            }
        }
    }
}

#[component]
fn SiteDetail(rec: SiteRecord) -> Element {
    let site = &rec.site;
    let description = site.description.as_deref().map(clean_description);
    let residents = residents(&rec);
    // Candidates are tried in order until one loads.
    let mut attempt = use_signal(|| 0usize);
    let thumb = rec
        .image_candidates
        .get(*attempt.read())
        .map(|c| format!("{THUMB_BASE}{c}"));

    rsx! {
        div { class: "detail-site",
            div { class: "detail-title",
                span { class: "site-glyph", "{rec.glyph}" }
                h2 { "{site.name}" }
            }
            div { class: "detail-id", "{site.id}" }
            if let Some(src) = thumb {
                img {
                    class: "detail-thumb",
                    src: "{src}",
                    onerror: move |_| *attempt.write() += 1,
                }
            }
            dl { class: "detail-grid",
                dt { "Type" } dd { "{site.type_label()}" }
                dt { "Size" } dd { "{site.size_x} × {site.size_y}" }
                if let Some(std) = &site.standardized_size {
                    dt { "Standard size" } dd { "{std}" }
                }
                dt { "Price" } dd { "{rec.price_label}" }
                dt { "Business" } dd { if site.biz_allowed { "Allowed" } else { "No" } }
                if let Some(r) = residents {
                    dt { "Residents" } dd { "{r}" }
                }
                if let Some(hours) = &site.operating_hours {
                    dt { "Hours" } dd { "{hours}" }
                }
            }
            if !rec.presets.is_empty() {
                h4 { "Presets" }
                ul { class: "tag-list",
                    for p in rec.presets.iter() {
                        li { key: "{p}", "{p}" }
                    }
                }
            }
            if !rec.required_objects.is_empty() {
                h4 { "Required objects" }
                ul { class: "tag-list",
                    for r in rec.required_objects.iter() {
                        li {
                            key: "{r.id}",
                            "{r.id}"
                            if let Some(n) = r.count {
                                " ×{n}"
                            }
                        }
                    }
                }
            }
            if let Some(text) = description {
                p { class: "detail-description", "{text}" }
            }
        }
    }
}

#[component]
fn MemoDetail(app: AppState, memo: Memo) -> Element {
    let created = created_label(&memo).to_string();
    let edit = memo.clone();
    let delete_id = memo.id.clone();

    rsx! {
        div { class: "detail-memo",
            div { class: "detail-title",
                span { class: "site-glyph", "📝" }
                h2 { "{memo.title}" }
            }
            div { class: "detail-id", "Created {created}" }
            if !memo.description.is_empty() {
                p { class: "detail-description", "{memo.description}" }
            }
            div { class: "memo-images",
                for image in memo.images.iter() {
                    img { key: "{image.name}", src: "{image.data}", title: "{image.name}" }
                }
            }
            div { class: "detail-actions",
                button {
                    class: "secondary",
                    onclick: move |_| {
                        let mut draft = app.memo_draft;
                        draft.set(Some(MemoDraft { editing: Some(edit.clone()) }));
                    },
                    "Edit"
                }
                button {
                    class: "danger",
                    onclick: move |_| {
                        if browser::confirm("Delete this memo and its placement?") {
                            app.run(|s| s.delete_memo(&delete_id));
                        }
                    },
                    "Delete"
                }
            }
        }
    }
}

#[component]
pub fn DetailPanel(app: AppState) -> Element {
    let session = app.session.read();
    let Some(entity) = session.selected_entity() else {
        return rsx! {
            aside { class: "side-panel detail-panel",
                p { class: "empty", "Select a site or memo to see its details." }
            }
        };
    };
    let id = entity.id().to_string();
    let position = session.current().placements.get(&id).map(display_px);
    let placing = session.mode().pending_placement() == Some(id.as_str());
    let body = match entity {
        Entity::Site(_) => session
            .catalog()
            .record(&id)
            .cloned()
            .map(|rec| rsx! { SiteDetail { key: "{id}", rec } }),
        Entity::Memo(memo) => {
            let memo = memo.clone();
            Some(rsx! { MemoDetail { app, memo } })
        }
    };
    drop(session);

    rsx! {
        aside { class: "side-panel detail-panel",
            button {
                class: "close",
                onclick: move |_| app.run(|s| s.clear_selection()),
                "×"
            }
            {body}
            PlacementActions { app, id, position, placing }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(min: Option<u32>, max: Option<u32>) -> SiteRecord {
        let json = serde_json::json!({
            "id": "H1", "name": "House", "city": "Gangnam", "siteType": "Residence",
            "residentMin": min, "residentMax": max, "glyph": "🏠", "priceLabel": "-"
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_residents_label() {
        assert_eq!(residents(&record(Some(2), Some(4))).as_deref(), Some("2–4"));
        assert_eq!(residents(&record(Some(3), Some(3))).as_deref(), Some("3"));
        assert_eq!(residents(&record(None, Some(5))).as_deref(), Some("5"));
        assert_eq!(residents(&record(None, None)), None);
    }

    #[test]
    fn test_created_label_keeps_date() {
        let memo = Memo {
            id: "memo_1".to_string(),
            title: "t".to_string(),
            description: String::new(),
            images: vec![],
            created_at: "2024-05-01T10:00:00+00:00".to_string(),
        };
        assert_eq!(created_label(&memo), "2024-05-01");
    }
}
