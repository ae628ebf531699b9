use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Cities shipped with the reference data. The engine accepts any set.
pub const DEFAULT_CITIES: [&str; 3] = ["Gangnam", "RedCity", "Cahaya"];

pub type EntityId = String;

/// A city identifier. Each city owns one viewport and one placement map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct City(String);

impl City {
    pub fn new(name: impl Into<String>) -> Self {
        City(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn defaults() -> Vec<City> {
        DEFAULT_CITIES.iter().map(|c| City::new(*c)).collect()
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for City {
    fn from(s: &str) -> Self {
        City::new(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    pub fn offset_from(self, other: Position) -> Position {
        Position {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn midpoint(self, other: Position) -> Position {
        Position {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    pub fn distance(self, other: Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Catalog entry for a placeable site. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: EntityId,
    pub name: String,
    pub city: City,
    pub site_type: String,
    #[serde(default)]
    pub site_sub_type: String,
    #[serde(default)]
    pub display_type: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub size_x: f64,
    #[serde(default)]
    pub size_y: f64,
    #[serde(default)]
    pub standardized_size: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub biz_allowed: bool,
    #[serde(default)]
    pub resident_min: Option<u32>,
    #[serde(default)]
    pub resident_max: Option<u32>,
    #[serde(default)]
    pub operating_hours: Option<String>,
    #[serde(default)]
    pub detail_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Site {
    /// Display type when present, otherwise the raw site type.
    pub fn type_label(&self) -> &str {
        self.display_type.as_deref().unwrap_or(&self.site_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoImage {
    pub name: String,
    /// `data:` URL of the embedded image.
    pub data: String,
}

/// A user-created note owned by exactly one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<MemoImage>,
    pub created_at: String,
}

impl Memo {
    pub fn with_id(
        id: impl Into<EntityId>,
        title: impl Into<String>,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Memo {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            images: Vec::new(),
            created_at: created_at.to_rfc3339(),
        }
    }

    #[cfg(feature = "uuid-support")]
    pub fn new(title: impl Into<String>, created_at: chrono::DateTime<chrono::Utc>) -> Self {
        Memo::with_id(
            format!("memo_{}", uuid::Uuid::new_v4().simple()),
            title,
            created_at,
        )
    }
}

/// Wire shape of the remote store: every city's memo list.
pub type CityMemos = BTreeMap<City, Vec<Memo>>;

/// Empty memo lists for the given cities.
pub fn empty_city_memos<'a>(cities: impl IntoIterator<Item = &'a City>) -> CityMemos {
    cities.into_iter().map(|c| (c.clone(), Vec::new())).collect()
}

/// A placeable thing, resolved from the catalog or the memo lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entity<'a> {
    Site(&'a Site),
    Memo(&'a Memo),
}

/// Fixed footprint of anything that is not a site.
pub const MEMO_FOOTPRINT: Size = Size {
    width: 20.0,
    height: 16.0,
};

impl Entity<'_> {
    pub fn id(&self) -> &str {
        match self {
            Entity::Site(s) => &s.id,
            Entity::Memo(m) => &m.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Entity::Site(s) => &s.name,
            Entity::Memo(m) => &m.title,
        }
    }

    /// Content-space extent used when framing placements.
    pub fn footprint(&self) -> Size {
        match self {
            Entity::Site(s) => Size {
                width: (s.size_x * 0.6).max(16.0),
                height: (s.size_y * 0.6).max(12.0),
            },
            Entity::Memo(_) => MEMO_FOOTPRINT,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_site(id: &str, city: &str, size_x: f64, size_y: f64) -> Site {
    Site {
        id: id.to_string(),
        name: format!("Site {id}"),
        city: City::new(city),
        site_type: "Business".to_string(),
        site_sub_type: String::new(),
        display_type: None,
        icon: None,
        size_x,
        size_y,
        standardized_size: None,
        price: None,
        biz_allowed: false,
        resident_min: None,
        resident_max: None,
        operating_hours: None,
        detail_id: None,
        description: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_footprint_scales_dimensions() {
        let site = test_site("a", "Gangnam", 40.0, 20.0);
        let fp = Entity::Site(&site).footprint();
        assert!((fp.width - 24.0).abs() < 1e-9);
        assert!((fp.height - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_site_footprint_minimum() {
        let site = test_site("a", "Gangnam", 5.0, 5.0);
        let fp = Entity::Site(&site).footprint();
        assert_eq!(fp, Size::new(16.0, 12.0));
    }

    #[test]
    fn test_memo_footprint_fixed() {
        let memo = Memo::with_id("m1", "Note", chrono::Utc::now());
        assert_eq!(Entity::Memo(&memo).footprint(), MEMO_FOOTPRINT);
    }

    #[test]
    fn test_site_deserializes_with_missing_optionals() {
        let json = r#"{"id":"S1","name":"Cafe","city":"Gangnam","siteType":"Business","sizeX":30,"sizeY":20}"#;
        let site: Site = serde_json::from_str(json).unwrap();
        assert_eq!(site.city, City::new("Gangnam"));
        assert_eq!(site.type_label(), "Business");
        assert!(site.price.is_none());
    }

    #[test]
    fn test_city_memos_serialize_as_object() {
        let memos = empty_city_memos(&City::defaults());
        let json = serde_json::to_string(&memos).unwrap();
        assert_eq!(json, r#"{"Cahaya":[],"Gangnam":[],"RedCity":[]}"#);
    }

    #[test]
    fn test_position_midpoint_and_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(6.0, 8.0);
        assert_eq!(a.midpoint(b), Position::new(3.0, 4.0));
        assert!((a.distance(b) - 10.0).abs() < 1e-9);
    }
}
