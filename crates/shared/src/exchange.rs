//! Export and import of placements and background images as one JSON file.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::interaction::{Effect, Effects, Mode, Notice};
use crate::models::City;
use crate::placement::PlacementStore;
use crate::session::Session;

pub const EXPORT_VERSION: u32 = 2;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("malformed import: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportCity {
    #[serde(default)]
    pub positions: PlacementStore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDoc {
    #[serde(default)]
    pub version: u32,
    pub maps: BTreeMap<City, ExportCity>,
}

impl ExportDoc {
    pub fn to_pretty_json(&self) -> Result<String, ExchangeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Parse an import file completely before anything is applied.
pub fn parse_import(json: &str) -> Result<ExportDoc, ExchangeError> {
    Ok(serde_json::from_str(json)?)
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("mapmemo_{}.json", date.format("%Y-%m-%d"))
}

impl<C: Catalog> Session<C> {
    /// Positions of every city; background images only when `with_images`.
    pub fn export_doc(&self, with_images: bool) -> ExportDoc {
        let maps = self
            .cities
            .iter()
            .map(|c| {
                (
                    c.city.clone(),
                    ExportCity {
                        positions: c.placements.clone(),
                        image_data: c.image.clone().filter(|_| with_images),
                    },
                )
            })
            .collect();
        ExportDoc {
            version: EXPORT_VERSION,
            maps,
        }
    }

    /// Replace positions of every known city in `doc` and adopt its images.
    pub fn apply_import(&mut self, doc: ExportDoc) -> Effects {
        let mut fx = Effects::new();
        let current = self.current_city().clone();
        for (city, entry) in doc.maps {
            let Some(state) = self.city_state_mut(&city) else {
                debug!(city = %city, "ignoring import for unknown city");
                continue;
            };
            state.placements = entry.positions;
            if let Some(data) = entry.image_data {
                state.image = Some(data);
                state.viewport.content_size = None;
                fx.push(Effect::PersistImage(city.clone()));
                if city == current {
                    fx.push(Effect::LoadImage);
                }
            }
        }
        if matches!(self.mode, Mode::Dragging { .. }) {
            self.mode = Mode::Idle;
        }
        info!("import applied");
        fx.push(Effect::Persist);
        fx.render_all();
        fx.push(Effect::Notify(Notice::Imported));
        fx
    }

    /// Parse then apply; a malformed file changes nothing.
    pub fn import_json(&mut self, json: &str) -> Effects {
        match parse_import(json) {
            Ok(doc) => self.apply_import(doc),
            Err(e) => {
                warn!(error = %e, "import rejected");
                let mut fx = Effects::new();
                fx.push(Effect::Notify(Notice::ImportMalformed));
                fx
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::models::{test_site, Position};

    fn session() -> Session<StaticCatalog> {
        let catalog = StaticCatalog::new(vec![test_site("S1", "Gangnam", 40.0, 20.0)]);
        Session::new(catalog, City::defaults())
    }

    #[test]
    fn test_export_shape() {
        let mut s = session();
        s.current_mut().placements.upsert("S1", Position::new(4.0, 5.0));
        s.restore_image(&City::new("Cahaya"), "data:img".to_string());
        let json: serde_json::Value =
            serde_json::from_str(&s.export_doc(true).to_pretty_json().unwrap()).unwrap();
        assert_eq!(json["version"], 2);
        assert_eq!(json["maps"]["Gangnam"]["positions"]["S1"]["y"], 5.0);
        assert!(json["maps"]["Gangnam"].get("imageData").is_none());
        assert_eq!(json["maps"]["Cahaya"]["imageData"], "data:img");

        let slim = s.export_doc(false);
        assert!(slim.maps.values().all(|c| c.image_data.is_none()));
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name(date), "mapmemo_2024-03-09.json");
    }

    #[test]
    fn test_import_replaces_known_cities_only() {
        let mut s = session();
        s.current_mut().placements.upsert("old", Position::ORIGIN);
        let red = City::new("RedCity");
        s.city_state_mut(&red)
            .unwrap()
            .placements
            .upsert("keep", Position::ORIGIN);
        let json = r#"{"version":2,"maps":{
            "Gangnam":{"positions":{"S1":{"x":1,"y":2}},"imageData":"data:new"},
            "Nowhere":{"positions":{"z":{"x":0,"y":0}}}
        }}"#;
        let fx = s.import_json(json);
        assert!(fx.contains(&Effect::Notify(Notice::Imported)));
        assert!(fx.contains(&Effect::PersistImage(City::new("Gangnam"))));
        assert!(fx.contains(&Effect::LoadImage));
        assert!(!s.current().placements.contains("old"));
        assert_eq!(s.current().placements.get("S1"), Some(Position::new(1.0, 2.0)));
        assert_eq!(s.current().image.as_deref(), Some("data:new"));
        assert!(s.city_state(&red).unwrap().placements.contains("keep"));
    }

    #[test]
    fn test_malformed_import_changes_nothing() {
        let mut s = session();
        s.current_mut().placements.upsert("S1", Position::new(9.0, 9.0));
        for bad in [
            "not json",
            r#"{"version":2}"#,
            r#"{"maps":{"Gangnam":{"positions":{"S1":{"x":"a","y":1}}}}}"#,
        ] {
            let fx = s.import_json(bad);
            assert_eq!(fx.into_vec(), vec![Effect::Notify(Notice::ImportMalformed)]);
        }
        assert_eq!(s.current().placements.get("S1"), Some(Position::new(9.0, 9.0)));
    }
}
