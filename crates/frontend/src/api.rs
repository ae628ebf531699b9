use mapmemo_shared::catalog::{Catalog, RequiredObject};
use mapmemo_shared::models::{City, CityMemos, Site};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

fn origin() -> Result<String, String> {
    web_sys::window()
        .ok_or_else(|| "no window".to_string())?
        .location()
        .origin()
        .map_err(|_| "no origin".to_string())
}

async fn query<T: for<'de> Deserialize<'de>>(
    query_str: &str,
    variables: Option<serde_json::Value>,
) -> Result<T, String> {
    let req = GraphQLRequest {
        query: query_str.to_string(),
        variables,
    };

    let resp = reqwest::Client::new()
        .post(format!("{}/graphql", origin()?))
        .json(&req)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let gql_resp: GraphQLResponse<T> = resp.json().await.map_err(|e| e.to_string())?;

    if let Some(errors) = gql_resp.errors {
        if !errors.is_empty() {
            return Err(errors[0].message.clone());
        }
    }

    gql_resp.data.ok_or_else(|| "No data returned".to_string())
}

// Catalog

/// A site plus the lookups the server resolves for the detail panel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecord {
    #[serde(flatten)]
    pub site: Site,
    pub glyph: String,
    pub price_label: String,
    #[serde(default)]
    pub presets: Vec<String>,
    #[serde(default)]
    pub required_objects: Vec<RequiredObject>,
    #[serde(default)]
    pub image_candidates: Vec<String>,
}

/// Catalog fetched once from the server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteCatalog {
    records: Vec<SiteRecord>,
}

impl RemoteCatalog {
    pub fn new(records: Vec<SiteRecord>) -> Self {
        RemoteCatalog { records }
    }

    pub fn record(&self, id: &str) -> Option<&SiteRecord> {
        self.records.iter().find(|r| r.site.id == id)
    }

    /// Distinct site types of one city, sorted.
    pub fn site_types(&self, city: &City) -> Vec<String> {
        let mut types: Vec<String> = self
            .records
            .iter()
            .filter(|r| &r.site.city == city)
            .map(|r| r.site.site_type.clone())
            .collect();
        types.sort();
        types.dedup();
        types
    }
}

impl Catalog for RemoteCatalog {
    fn site(&self, id: &str) -> Option<&Site> {
        self.record(id).map(|r| &r.site)
    }

    fn sites_for_city(&self, city: &City) -> Vec<&Site> {
        self.records
            .iter()
            .filter(|r| &r.site.city == city)
            .map(|r| &r.site)
            .collect()
    }
}

const SITES_QUERY: &str = r#"query {
    sites {
        id name city siteType siteSubType displayType icon sizeX sizeY
        standardizedSize price bizAllowed residentMin residentMax
        operatingHours detailId description
        glyph priceLabel presets requiredObjects { id count } imageCandidates
    }
}"#;

#[derive(Deserialize)]
pub struct SitesResponse {
    pub sites: Vec<SiteRecord>,
}

pub async fn fetch_catalog() -> Result<RemoteCatalog, String> {
    let resp: SitesResponse = query(SITES_QUERY, None).await?;
    tracing::info!(sites = resp.sites.len(), "catalog loaded");
    Ok(RemoteCatalog::new(resp.sites))
}

// Memo store

fn memos_url() -> Result<String, String> {
    Ok(format!("{}/api/memos", origin()?))
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Turn a non-2xx response into its `{error}` message.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response, String> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    Err(error_message(status.as_u16(), &text))
}

fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| format!("HTTP {status}"))
}

pub async fn fetch_memos() -> Result<CityMemos, String> {
    let resp = reqwest::Client::new()
        .get(memos_url()?)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    check(resp).await?.json().await.map_err(|e| e.to_string())
}

#[derive(Debug, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
}

pub async fn save_memos(memos: CityMemos) -> Result<SaveResponse, String> {
    let resp = reqwest::Client::new()
        .post(memos_url()?)
        .json(&memos)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    check(resp).await?.json().await.map_err(|e| e.to_string())
}
