use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{City, Site};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse {file}: {source}")]
    Parse {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only reference data the engine resolves entity ids against.
pub trait Catalog {
    fn site(&self, id: &str) -> Option<&Site>;
    fn sites_for_city(&self, city: &City) -> Vec<&Site>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredObject {
    pub id: String,
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailExtra {
    #[serde(default)]
    pub required_objects: Vec<RequiredObject>,
}

fn parse<T: DeserializeOwned>(file: &'static str, json: &str) -> Result<T, CatalogError> {
    serde_json::from_str(json).map_err(|source| CatalogError::Parse { file, source })
}

/// Catalog assembled from the four static JSON files.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    pub sites: Vec<Site>,
    pub presets: BTreeMap<String, Vec<String>>,
    pub detail_extra: BTreeMap<String, DetailExtra>,
    pub site_images: BTreeMap<String, String>,
}

impl StaticCatalog {
    pub fn new(sites: Vec<Site>) -> Self {
        StaticCatalog {
            sites,
            ..Self::default()
        }
    }

    pub fn from_json(
        sites: &str,
        presets: &str,
        detail_extra: &str,
        site_images: &str,
    ) -> Result<Self, CatalogError> {
        Ok(StaticCatalog {
            sites: parse("sites.json", sites)?,
            presets: parse("presets.json", presets)?,
            detail_extra: parse("detail-extra.json", detail_extra)?,
            site_images: parse("site-images.json", site_images)?,
        })
    }

    pub fn presets(&self, site_id: &str) -> &[String] {
        self.presets.get(site_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn required_objects(&self, site: &Site) -> &[RequiredObject] {
        site.detail_id
            .as_deref()
            .and_then(|d| self.detail_extra.get(d))
            .map(|e| e.required_objects.as_slice())
            .unwrap_or(&[])
    }

    /// Thumbnail paths to try in order: the mapped image, the site's own
    /// map image, then the parent site's image for lobby sites.
    pub fn image_candidates(&self, site: &Site) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(name) = self.site_images.get(&site.id) {
            out.push(format!("img/{}.PNG", name.replace('\'', "")));
        }
        out.push(format!("img/MapImage_{}.PNG", site.id));
        let parent = site
            .id
            .strip_suffix("_Lobby")
            .or_else(|| site.id.strip_suffix("_lobby"));
        if let Some(parent) = parent {
            out.push(format!("img/MapImage_{parent}.PNG"));
        }
        out
    }

    pub fn cities(&self) -> Vec<City> {
        let mut cities: Vec<City> = self.sites.iter().map(|s| s.city.clone()).collect();
        cities.sort();
        cities.dedup();
        cities
    }
}

impl Catalog for StaticCatalog {
    fn site(&self, id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == id)
    }

    fn sites_for_city(&self, city: &City) -> Vec<&Site> {
        self.sites.iter().filter(|s| &s.city == city).collect()
    }
}

/// List filter: a site type (`None` = all) and a free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteFilter {
    pub site_type: Option<String>,
    pub search: String,
}

impl SiteFilter {
    pub fn is_active(&self) -> bool {
        self.site_type.is_some()
    }

    /// Case-insensitive match on name, id and display type.
    pub fn matches(&self, site: &Site) -> bool {
        if let Some(t) = &self.site_type {
            if &site.site_type != t {
                return false;
            }
        }
        if self.search.is_empty() {
            return true;
        }
        let q = self.search.to_lowercase();
        site.name.to_lowercase().contains(&q)
            || site.id.to_lowercase().contains(&q)
            || site
                .display_type
                .as_deref()
                .unwrap_or("")
                .to_lowercase()
                .contains(&q)
    }

    pub fn apply<'a>(&self, sites: Vec<&'a Site>) -> Vec<&'a Site> {
        sites.into_iter().filter(|s| self.matches(s)).collect()
    }
}

/// Glyph for a site's icon, falling back on its type.
pub fn icon_glyph(site: &Site) -> &'static str {
    let by_icon = site.icon.as_deref().and_then(|icon| {
        Some(match icon {
            "Building" => "🏢",
            "Shop" => "🛒",
            "Food" => "🍽️",
            "Play" => "🎮",
            "Bus" => "🚌",
            "Public" | "Park" => "🌳",
            "House" => "🏠",
            "Lobby" => "🚪",
            "Beach" => "🏖️",
            "Cemetery" => "⚰️",
            "Temple" => "⛩️",
            "Fishing" => "🎣",
            "HouseholdBiz" => "💼",
            "Sports" => "🏋️",
            "Stage" => "🎤",
            "School" => "🏫",
            _ => return None,
        })
    });
    by_icon.unwrap_or(match site.site_type.as_str() {
        "Residence" => "🏠",
        "Business" => "🏢",
        "Public" => "🌳",
        "Override" => "⭐",
        _ => "📍",
    })
}

/// `-` for missing or placeholder prices, otherwise `₦ 12,345`.
pub fn format_price(price: Option<f64>) -> String {
    let Some(p) = price.filter(|p| *p > 1.0) else {
        return "-".to_string();
    };
    let digits = (p.round() as i64).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("₦ {grouped}")
}

/// Normalize the spreadsheet escapes in catalog descriptions.
pub fn clean_description(raw: &str) -> String {
    raw.replace("_x000D_\\n", "\n").replace("* ", "• ")
}
