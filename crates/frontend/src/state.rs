use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use mapmemo_shared::interaction::{Effect, Effects, InteractionEvent, Notice};
use mapmemo_shared::models::{City, EntityId, Memo, Position};
use mapmemo_shared::session::Session;
use mapmemo_shared::snapshot::{image_writes, write_through, SnapshotError};
use tracing::warn;

use crate::api::{self, RemoteCatalog};
use crate::image_db::ImageDb;
use crate::storage::LocalStorage;

pub type AppSession = Session<RemoteCatalog>;

const TOAST_MS: u32 = 2500;

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub text: String,
    pub error: bool,
    serial: u64,
}

/// Open right-click menu for a placed marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuState {
    pub id: EntityId,
    pub at: Position,
}

/// Open memo dialog; `editing` is `None` for a new memo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoDraft {
    pub editing: Option<Memo>,
}

pub fn is_error(notice: &Notice) -> bool {
    matches!(
        notice,
        Notice::SaveFailed(_) | Notice::LoadFailed(_) | Notice::ImportMalformed
    )
}

/// Row element id, used to scroll a row into view.
pub fn list_row_id(id: &str) -> String {
    format!("row-{id}")
}

/// Signals shared by every component. All engine calls go through
/// [`AppState::run`], which applies the returned effects.
#[derive(Clone, Copy, PartialEq)]
pub struct AppState {
    pub session: Signal<AppSession>,
    pub toast: Signal<Option<Toast>>,
    pub menu: Signal<Option<MenuState>>,
    pub memo_draft: Signal<Option<MemoDraft>>,
    /// Background image opacity in percent; view-only, never persisted.
    pub map_opacity: Signal<u32>,
    toast_serial: Signal<u64>,
}

impl AppState {
    pub fn new(
        session: Signal<AppSession>,
        toast: Signal<Option<Toast>>,
        menu: Signal<Option<MenuState>>,
        memo_draft: Signal<Option<MemoDraft>>,
        map_opacity: Signal<u32>,
        toast_serial: Signal<u64>,
    ) -> Self {
        AppState {
            session,
            toast,
            menu,
            memo_draft,
            map_opacity,
            toast_serial,
        }
    }

    pub fn run(mut self, op: impl FnOnce(&mut AppSession) -> Effects) {
        let fx = {
            let mut session = self.session.write();
            op(&mut session)
        };
        self.apply(fx);
    }

    pub fn handle(self, event: InteractionEvent) {
        self.run(|s| s.handle(event));
    }

    /// Carry out effects. Render effects need nothing here: writing the
    /// session signal already schedules a re-render.
    pub fn apply(mut self, fx: Effects) {
        if fx.is_empty() {
            return;
        }
        let mut notices = Vec::new();
        if fx.contains(&Effect::Persist) {
            match LocalStorage::open() {
                Ok(mut store) => {
                    notices.extend(write_through(&mut store, &self.session.peek(), &fx))
                }
                Err(e) => {
                    warn!(error = %e, "local storage unavailable");
                    notices.push(Notice::SaveFailed(e.to_string()));
                }
            }
        }

        let images = image_writes(&self.session.peek(), &fx);
        if !images.is_empty() {
            self.persist_images(images);
        }

        for effect in fx.into_vec() {
            match effect {
                Effect::SyncMemos => self.sync_memos(),
                Effect::Notify(notice) => notices.push(notice),
                Effect::ShowContextMenu { id, at } => self.menu.set(Some(MenuState { id, at })),
                Effect::RevealInList(id) => reveal_in_list(&id),
                Effect::ApplyTransform
                | Effect::RenderMarkers
                | Effect::RenderList
                | Effect::RenderDetail
                | Effect::LoadImage
                | Effect::Persist
                | Effect::PersistImage(_) => {}
            }
        }

        for notice in notices {
            self.notify(notice);
        }
    }

    /// Write image changes to IndexedDB in the background.
    fn persist_images(self, writes: Vec<(City, Option<String>)>) {
        spawn(async move {
            let result = async {
                let db = ImageDb::open().await?;
                for (city, data) in &writes {
                    db.save(city, data.as_deref()).await?;
                }
                Ok::<_, SnapshotError>(())
            }
            .await;
            if let Err(e) = result {
                warn!(error = %e, "failed to store map image");
                self.notify(Notice::SaveFailed(e.to_string()));
            }
        });
    }

    /// Fire-and-forget push of every memo list to the server.
    fn sync_memos(self) {
        let memos = self.session.peek().memos().clone();
        spawn(async move {
            if let Err(e) = api::save_memos(memos).await {
                warn!(error = %e, "memo sync failed");
                self.notify(Notice::SaveFailed(e));
            }
        });
    }

    pub fn notify(mut self, notice: Notice) {
        let serial = *self.toast_serial.peek() + 1;
        self.toast_serial.set(serial);
        self.toast.set(Some(Toast {
            text: notice.to_string(),
            error: is_error(&notice),
            serial,
        }));
        let mut toast = self.toast;
        spawn(async move {
            TimeoutFuture::new(TOAST_MS).await;
            let current = toast.peek().as_ref().map(|t| t.serial);
            if current == Some(serial) {
                toast.set(None);
            }
        });
    }
}

fn reveal_in_list(id: &str) {
    let element = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(&list_row_id(id)));
    if let Some(element) = element {
        element.scroll_into_view();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_notices() {
        assert!(is_error(&Notice::SaveFailed("quota".to_string())));
        assert!(is_error(&Notice::ImportMalformed));
        assert!(!is_error(&Notice::Placed));
        assert!(!is_error(&Notice::Imported));
    }

    #[test]
    fn test_list_row_id() {
        assert_eq!(list_row_id("Cafe01"), "row-Cafe01");
    }
}
