use dioxus::prelude::*;
use mapmemo_shared::interaction::{Effects, InteractionEvent, Notice};
use mapmemo_shared::models::City;
use mapmemo_shared::session::Session;
use mapmemo_shared::snapshot::restore_session;
use tracing::{info, warn};

use crate::api::{self, RemoteCatalog};
use crate::components::detail_panel::DetailPanel;
use crate::components::map_view::MapView;
use crate::components::memo_editor::MemoEditor;
use crate::components::site_list::SiteList;
use crate::components::toast::Toast;
use crate::components::toolbar::Toolbar;
use crate::image_db::ImageDb;
use crate::state::{AppState, MemoDraft, MenuState, Toast as ToastState};
use crate::storage::LocalStorage;

#[component]
pub fn Editor() -> Element {
    let session = use_signal(|| Session::new(RemoteCatalog::default(), City::defaults()));
    let toast = use_signal(|| None::<ToastState>);
    let menu = use_signal(|| None::<MenuState>);
    let memo_draft = use_signal(|| None::<MemoDraft>);
    let map_opacity = use_signal(|| 100u32);
    let toast_serial = use_signal(|| 0u64);
    let app = AppState::new(session, toast, menu, memo_draft, map_opacity, toast_serial);

    // Local snapshot first, so the map shows before the network answers.
    use_hook(move || match LocalStorage::open() {
        Ok(store) => app.run(|s| restore_session(&store, s)),
        Err(e) => {
            warn!(error = %e, "local storage unavailable, starting empty");
            app.notify(Notice::LoadFailed(e.to_string()));
        }
    });

    // Images come from IndexedDB afterwards. A city that got a fresh upload
    // in the meantime keeps it.
    use_future(move || async move {
        let db = match ImageDb::open().await {
            Ok(db) => db,
            Err(e) => {
                warn!(error = %e, "image store unavailable");
                app.notify(Notice::LoadFailed(e.to_string()));
                return;
            }
        };
        let cities: Vec<City> = app.session.peek().cities().cloned().collect();
        for city in cities {
            match db.load(&city).await {
                Ok(Some(data)) => app.run(|s| {
                    if s.city_state(&city).is_some_and(|c| c.image.is_none()) {
                        s.restore_image(&city, data);
                    }
                    Effects::new()
                }),
                Ok(None) => {}
                Err(e) => warn!(city = %city, error = %e, "failed to load map image"),
            }
        }
    });

    use_future(move || async move {
        match api::fetch_catalog().await {
            Ok(catalog) => app.run(|s| s.set_catalog(catalog)),
            Err(e) => {
                warn!(error = %e, "catalog fetch failed");
                app.notify(Notice::LoadFailed(e));
            }
        }
    });

    use_future(move || async move {
        match api::fetch_memos().await {
            Ok(memos) => {
                info!("memos loaded");
                app.run(|s| s.replace_memos(memos));
            }
            Err(e) => {
                warn!(error = %e, "memo fetch failed");
                app.notify(Notice::LoadFailed(e));
            }
        }
    });

    rsx! {
        div {
            class: "app",
            tabindex: "0",
            onkeydown: move |evt: Event<KeyboardData>| {
                if evt.key() == Key::Escape {
                    let mut menu = app.menu;
                    menu.set(None);
                    app.handle(InteractionEvent::Escape);
                }
            },

            Toolbar { app }
            main { class: "workspace",
                SiteList { app }
                MapView { app }
                DetailPanel { app }
            }
            MemoEditor { app }
            Toast { app }
        }
    }
}
