use mapmemo_shared::catalog::StaticCatalog;
use std::path::Path;

pub const CATALOG_FILES: [&str; 4] = [
    "sites.json",
    "presets.json",
    "detail-extra.json",
    "site-images.json",
];

pub struct Assets {
    pub catalog: StaticCatalog,
}

impl Assets {
    /// Load the reference catalog from `<assets_dir>/data`.
    pub fn load(assets_dir: &Path) -> Result<Self, String> {
        let data_dir = assets_dir.join("data");
        let read = |name: &str| {
            let path = data_dir.join(name);
            std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))
        };

        let [sites, presets, detail_extra, site_images] = CATALOG_FILES;
        let catalog = StaticCatalog::from_json(
            &read(sites)?,
            &read(presets)?,
            &read(detail_extra)?,
            &read(site_images)?,
        )
        .map_err(|e| e.to_string())?;

        tracing::info!(sites = catalog.sites.len(), "Loaded site catalog");

        Ok(Assets { catalog })
    }

    pub fn empty() -> Self {
        Assets {
            catalog: StaticCatalog::default(),
        }
    }
}

#[cfg(test)]
pub(crate) fn write_test_catalog(dir: &Path) {
    let data = dir.join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(
        data.join("sites.json"),
        r#"[
            {"id":"Cafe01","name":"Corner Cafe","city":"Gangnam","siteType":"Business",
             "displayType":"Restaurant","icon":"Food","sizeX":30,"sizeY":20,"price":125000,
             "detailId":"D1"},
            {"id":"Home01","name":"Hill House","city":"Gangnam","siteType":"Residence",
             "sizeX":40,"sizeY":40},
            {"id":"Beach01","name":"Sunny Beach","city":"Cahaya","siteType":"Public",
             "icon":"Beach","sizeX":80,"sizeY":40}
        ]"#,
    )
    .unwrap();
    std::fs::write(data.join("presets.json"), r#"{"Cafe01":["Cozy","Modern"]}"#).unwrap();
    std::fs::write(
        data.join("detail-extra.json"),
        r#"{"D1":{"requiredObjects":[{"id":"Counter","count":1}]}}"#,
    )
    .unwrap();
    std::fs::write(data.join("site-images.json"), r#"{"Cafe01":"Thumb_Cafe"}"#).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_catalog() {
        let dir = tempfile::tempdir().unwrap();
        write_test_catalog(dir.path());
        let assets = Assets::load(dir.path()).unwrap();
        assert_eq!(assets.catalog.sites.len(), 3);
        assert_eq!(assets.catalog.presets("Cafe01"), ["Cozy", "Modern"]);
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Assets::load(dir.path()).err().unwrap();
        assert!(err.contains("sites.json"));
    }

    #[test]
    fn test_malformed_file_names_file() {
        let dir = tempfile::tempdir().unwrap();
        write_test_catalog(dir.path());
        std::fs::write(dir.path().join("data/site-images.json"), "[").unwrap();
        let err = Assets::load(dir.path()).err().unwrap();
        assert!(err.contains("site-images.json"));
    }
}
