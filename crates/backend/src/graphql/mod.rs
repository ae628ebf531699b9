use std::sync::Arc;

use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, SimpleObject};
use mapmemo_shared::{
    catalog::{clean_description, format_price, icon_glyph, Catalog, SiteFilter, StaticCatalog},
    models::{City, Site},
};

use crate::assets::Assets;

// GraphQL output types. Field names serialize in camelCase, matching the
// catalog JSON, so clients can deserialize straight into `Site`.

#[derive(SimpleObject)]
pub struct GqlRequiredObject {
    pub id: String,
    pub count: Option<u32>,
}

#[derive(SimpleObject)]
pub struct GqlSite {
    pub id: String,
    pub name: String,
    pub city: String,
    pub site_type: String,
    pub site_sub_type: String,
    pub display_type: Option<String>,
    pub icon: Option<String>,
    pub size_x: f64,
    pub size_y: f64,
    pub standardized_size: Option<String>,
    pub price: Option<f64>,
    pub biz_allowed: bool,
    pub resident_min: Option<u32>,
    pub resident_max: Option<u32>,
    pub operating_hours: Option<String>,
    pub detail_id: Option<String>,
    pub description: Option<String>,
    pub glyph: String,
    pub price_label: String,
    pub presets: Vec<String>,
    pub required_objects: Vec<GqlRequiredObject>,
    pub image_candidates: Vec<String>,
}

impl GqlSite {
    fn from_site(site: &Site, catalog: &StaticCatalog) -> Self {
        GqlSite {
            id: site.id.clone(),
            name: site.name.clone(),
            city: site.city.to_string(),
            site_type: site.site_type.clone(),
            site_sub_type: site.site_sub_type.clone(),
            display_type: site.display_type.clone(),
            icon: site.icon.clone(),
            size_x: site.size_x,
            size_y: site.size_y,
            standardized_size: site.standardized_size.clone(),
            price: site.price,
            biz_allowed: site.biz_allowed,
            resident_min: site.resident_min,
            resident_max: site.resident_max,
            operating_hours: site.operating_hours.clone(),
            detail_id: site.detail_id.clone(),
            description: site.description.as_deref().map(clean_description),
            glyph: icon_glyph(site).to_string(),
            price_label: format_price(site.price),
            presets: catalog.presets(&site.id).to_vec(),
            required_objects: catalog
                .required_objects(site)
                .iter()
                .map(|r| GqlRequiredObject {
                    id: r.id.clone(),
                    count: r.count,
                })
                .collect(),
            image_candidates: catalog.image_candidates(site),
        }
    }
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn cities(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<String>> {
        let assets = ctx.data::<Arc<Assets>>()?;
        Ok(assets
            .catalog
            .cities()
            .into_iter()
            .map(|c| c.to_string())
            .collect())
    }

    /// Sites of one city (or all), narrowed by type and a free-text search.
    async fn sites(
        &self,
        ctx: &Context<'_>,
        city: Option<String>,
        site_type: Option<String>,
        search: Option<String>,
    ) -> async_graphql::Result<Vec<GqlSite>> {
        let catalog = &ctx.data::<Arc<Assets>>()?.catalog;
        let filter = SiteFilter {
            site_type: site_type.filter(|t| t != "all"),
            search: search.unwrap_or_default(),
        };
        let sites: Vec<&Site> = match city {
            Some(city) => catalog.sites_for_city(&City::new(city)),
            None => catalog.sites.iter().collect(),
        };
        Ok(filter
            .apply(sites)
            .into_iter()
            .map(|s| GqlSite::from_site(s, catalog))
            .collect())
    }

    async fn site(&self, ctx: &Context<'_>, id: String) -> async_graphql::Result<Option<GqlSite>> {
        let catalog = &ctx.data::<Arc<Assets>>()?.catalog;
        Ok(catalog.site(&id).map(|s| GqlSite::from_site(s, catalog)))
    }
}

pub type Schema = async_graphql::Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema(assets: Arc<Assets>) -> Schema {
    async_graphql::Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(assets)
        .finish()
}
