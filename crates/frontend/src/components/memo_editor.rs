use dioxus::prelude::*;
use mapmemo_shared::interaction::Notice;
use mapmemo_shared::models::{Memo, MemoImage};
use tracing::warn;

use crate::browser;
use crate::state::AppState;

/// `memo_<millis>_<random>`, unique enough for one user's memo lists.
fn memo_id(now_ms: f64, random: f64) -> String {
    format!("memo_{}_{:06}", now_ms as u64, (random * 1_000_000.0) as u32)
}

fn new_memo(title: String) -> Memo {
    let id = memo_id(js_sys::Date::now(), js_sys::Math::random());
    Memo::with_id(id, title, chrono::Utc::now())
}

/// Dialog for creating a memo, or editing the one in the draft.
#[component]
pub fn MemoEditor(app: AppState) -> Element {
    let draft = app.memo_draft;
    let Some(editing) = draft.read().as_ref().map(|d| d.editing.clone()) else {
        return rsx! {};
    };
    let key = editing
        .as_ref()
        .map(|m| m.id.clone())
        .unwrap_or_else(|| "new".to_string());

    rsx! {
        MemoForm { key: "{key}", app, editing }
    }
}

#[component]
fn MemoForm(app: AppState, editing: Option<Memo>) -> Element {
    let mut draft = app.memo_draft;
    let initial = editing.clone();
    let mut title = use_signal(|| initial.as_ref().map(|m| m.title.clone()).unwrap_or_default());
    let mut description =
        use_signal(|| initial.as_ref().map(|m| m.description.clone()).unwrap_or_default());
    let mut images = use_signal(|| initial.map(|m| m.images).unwrap_or_default());
    let heading = if editing.is_some() { "Edit memo" } else { "New memo" };

    let save = move |_: Event<MouseData>| {
        let t = title.read().trim().to_string();
        if t.is_empty() {
            return;
        }
        let memo = match &editing {
            Some(existing) => Memo {
                title: t,
                description: description.read().clone(),
                images: images.read().clone(),
                ..existing.clone()
            },
            None => Memo {
                description: description.read().clone(),
                images: images.read().clone(),
                ..new_memo(t)
            },
        };
        draft.set(None);
        if editing.is_some() {
            app.run(|s| s.update_memo(memo));
        } else {
            app.run(|s| s.add_memo(memo));
        }
    };

    rsx! {
        div {
            class: "modal-backdrop",
            onclick: move |_| draft.set(None),

            div {
                class: "modal",
                onclick: move |evt: Event<MouseData>| evt.stop_propagation(),

                h2 { "{heading}" }
                input {
                    r#type: "text",
                    placeholder: "Title",
                    value: "{title}",
                    oninput: move |evt: Event<FormData>| title.set(evt.value()),
                }
                textarea {
                    placeholder: "Description",
                    rows: "5",
                    value: "{description}",
                    oninput: move |evt: Event<FormData>| description.set(evt.value()),
                }

                div { class: "memo-images",
                    for (i, image) in images.read().iter().enumerate() {
                        div { key: "{i}-{image.name}", class: "memo-image",
                            img { src: "{image.data}", title: "{image.name}" }
                            button {
                                class: "danger",
                                onclick: move |_| {
                                    images.write().remove(i);
                                },
                                "×"
                            }
                        }
                    }
                }
                label { class: "button secondary",
                    "Add images"
                    input {
                        r#type: "file",
                        accept: "image/*",
                        multiple: true,
                        hidden: true,
                        onchange: move |evt: Event<FormData>| async move {
                            for file in evt.files() {
                                match browser::read_image(file).await {
                                    Ok((name, data)) => images.write().push(MemoImage { name, data }),
                                    Err(e) => {
                                        warn!(error = %e, "memo image rejected");
                                        app.notify(Notice::LoadFailed(e));
                                    }
                                }
                            }
                        },
                    }
                }

                div { class: "modal-actions",
                    button { class: "secondary", onclick: move |_| draft.set(None), "Cancel" }
                    button {
                        disabled: title.read().trim().is_empty(),
                        onclick: save,
                        "Save"
                    }
                }
            }
        }
    }
}
