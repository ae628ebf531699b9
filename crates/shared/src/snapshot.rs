//! Local persistence of views, placements and background images.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::interaction::{Effect, Effects, Notice};
use crate::models::City;
use crate::placement::PlacementStore;
use crate::session::Session;
use crate::viewport::ViewportState;

/// Storage key of the snapshot document.
pub const SNAPSHOT_KEY: &str = "mapmemo_map_data_v2";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("stored snapshot is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("storage unavailable: {0}")]
    Store(String),
}

/// Key-value persistence backend (browser local storage, or memory in tests).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, SnapshotError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SnapshotError>;
    fn remove(&mut self, key: &str) -> Result<(), SnapshotError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SnapshotError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SnapshotError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SnapshotError> {
        self.entries.remove(key);
        Ok(())
    }
}

pub fn image_key(city: &City) -> String {
    format!("map_{city}")
}

fn default_zoom() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitySnapshot {
    #[serde(default)]
    pub positions: PlacementStore,
    #[serde(default)]
    pub pan_x: f64,
    #[serde(default)]
    pub pan_y: f64,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDoc {
    #[serde(default)]
    pub maps: BTreeMap<City, CitySnapshot>,
}

impl<C: Catalog> Session<C> {
    pub fn snapshot(&self) -> SnapshotDoc {
        let maps = self
            .cities
            .iter()
            .map(|c| {
                (
                    c.city.clone(),
                    CitySnapshot {
                        positions: c.placements.clone(),
                        pan_x: c.viewport.pan_x,
                        pan_y: c.viewport.pan_y,
                        zoom: c.viewport.zoom,
                    },
                )
            })
            .collect();
        SnapshotDoc { maps }
    }

    /// Apply a stored snapshot. Unknown cities are ignored and stored views
    /// are repaired before use.
    pub fn restore(&mut self, doc: SnapshotDoc) -> Effects {
        let mut fx = Effects::new();
        for (city, snap) in doc.maps {
            let Some(state) = self.city_state_mut(&city) else {
                debug!(city = %city, "ignoring snapshot for unknown city");
                continue;
            };
            state.placements = snap.positions;
            state.viewport = ViewportState {
                pan_x: snap.pan_x,
                pan_y: snap.pan_y,
                zoom: snap.zoom,
                content_size: state.viewport.content_size,
            }
            .sanitized();
        }
        fx.push(Effect::ApplyTransform);
        fx.render_all();
        fx
    }
}

pub fn save_snapshot(store: &mut impl KeyValueStore, doc: &SnapshotDoc) -> Result<(), SnapshotError> {
    let json = serde_json::to_string(doc)?;
    store.set(SNAPSHOT_KEY, &json)
}

pub fn load_snapshot(store: &impl KeyValueStore) -> Result<Option<SnapshotDoc>, SnapshotError> {
    match store.get(SNAPSHOT_KEY)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Load the stored snapshot into `session`.
///
/// Background images are not part of it; they live in a separate,
/// larger store keyed by [`image_key`] and are restored by the caller.
/// A malformed snapshot leaves the session untouched and yields a
/// [`Notice::LoadFailed`].
pub fn restore_session<C: Catalog>(
    store: &impl KeyValueStore,
    session: &mut Session<C>,
) -> Effects {
    let mut fx = Effects::new();
    match load_snapshot(store) {
        Ok(Some(doc)) => fx.extend(session.restore(doc)),
        Ok(None) => {}
        Err(e) => {
            warn!(error = %e, "failed to load snapshot");
            fx.push(Effect::Notify(Notice::LoadFailed(e.to_string())));
        }
    }
    fx
}

/// Write the snapshot if `effects` ask for it. Failures are logged and
/// returned as notices; nothing is retried.
pub fn write_through<C: Catalog>(
    store: &mut impl KeyValueStore,
    session: &Session<C>,
    effects: &Effects,
) -> Vec<Notice> {
    let mut notices = Vec::new();
    if effects.contains(&Effect::Persist) {
        if let Err(e) = save_snapshot(store, &session.snapshot()) {
            warn!(error = %e, "failed to persist snapshot");
            notices.push(Notice::SaveFailed(e.to_string()));
        }
    }
    notices
}

/// Image writes requested by `effects`: each city's current image, or
/// `None` when it was cleared and must be deleted.
pub fn image_writes<C: Catalog>(
    session: &Session<C>,
    effects: &Effects,
) -> Vec<(City, Option<String>)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::PersistImage(city) => Some(city),
            _ => None,
        })
        .map(|city| {
            let image = session.city_state(city).and_then(|c| c.image.clone());
            (city.clone(), image)
        })
        .collect()
}
