use tracing::{debug, info, warn};

use crate::catalog::{Catalog, SiteFilter};
use crate::interaction::{Effect, Effects, Mode, Notice};
use crate::markers::{layout, MarkerInput, MarkerLayer};
use crate::models::{
    empty_city_memos, City, CityMemos, Entity, EntityId, Memo, Position, Site, Size, MEMO_FOOTPRINT,
};
use crate::placement::PlacementStore;
use crate::viewport::{fit_bounds, PanDirection, ViewportState};

/// Everything one city owns.
#[derive(Debug, Clone, PartialEq)]
pub struct CityState {
    pub city: City,
    pub viewport: ViewportState,
    pub placements: PlacementStore,
    /// Background image as a `data:` URL.
    pub image: Option<String>,
}

impl CityState {
    fn new(city: City) -> Self {
        CityState {
            city,
            viewport: ViewportState::default(),
            placements: PlacementStore::new(),
            image: None,
        }
    }
}

/// One row of the site list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteRow<'a> {
    pub site: &'a Site,
    pub placed: bool,
    pub selected: bool,
    pub placing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlacementCounts {
    pub placed: usize,
    pub total: usize,
}

/// Application state: per-city viewports and placements, selection, the
/// interaction mode and the memo lists.
pub struct Session<C> {
    pub(crate) catalog: C,
    pub(crate) cities: Vec<CityState>,
    pub(crate) current: usize,
    pub(crate) selected: Option<EntityId>,
    pub(crate) mode: Mode,
    pub(crate) memos: CityMemos,
    pub(crate) filter: SiteFilter,
    pub(crate) viewport_size: Size,
}

impl<C: Catalog> Session<C> {
    /// Start with default views for `cities`; the first one is current.
    pub fn new(catalog: C, cities: Vec<City>) -> Self {
        let cities = if cities.is_empty() {
            City::defaults()
        } else {
            cities
        };
        let memos = empty_city_memos(&cities);
        Session {
            catalog,
            cities: cities.into_iter().map(CityState::new).collect(),
            current: 0,
            selected: None,
            mode: Mode::Idle,
            memos,
            filter: SiteFilter::default(),
            viewport_size: Size::default(),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Swap in a freshly loaded catalog. Placements of ids it does not know
    /// are kept and simply not drawn.
    pub fn set_catalog(&mut self, catalog: C) -> Effects {
        let mut fx = Effects::new();
        self.catalog = catalog;
        if let Some(id) = self.selected.clone() {
            if self.entity(&id).is_none() {
                self.selected = None;
            }
        }
        fx.render_all();
        fx
    }

    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.cities.iter().map(|c| &c.city)
    }

    pub fn current_city(&self) -> &City {
        &self.current().city
    }

    pub fn current(&self) -> &CityState {
        &self.cities[self.current]
    }

    pub fn current_mut(&mut self) -> &mut CityState {
        &mut self.cities[self.current]
    }

    pub fn city_state(&self, city: &City) -> Option<&CityState> {
        self.cities.iter().find(|c| &c.city == city)
    }

    pub(crate) fn city_state_mut(&mut self, city: &City) -> Option<&mut CityState> {
        self.cities.iter_mut().find(|c| &c.city == city)
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn filter(&self) -> &SiteFilter {
        &self.filter
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.current().viewport
    }

    pub fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    /// Record the canvas size after layout or resize.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
    }

    pub fn memos(&self) -> &CityMemos {
        &self.memos
    }

    pub fn memos_for(&self, city: &City) -> &[Memo] {
        self.memos.get(city).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve an id against the catalog, then the current city's memos.
    pub fn entity(&self, id: &str) -> Option<Entity<'_>> {
        if let Some(site) = self.catalog.site(id) {
            return Some(Entity::Site(site));
        }
        self.memos_for(self.current_city())
            .iter()
            .find(|m| m.id == id)
            .map(Entity::Memo)
    }

    pub fn selected_entity(&self) -> Option<Entity<'_>> {
        self.selected.as_deref().and_then(|id| self.entity(id))
    }

    /// Markers of the current city. Placements whose entity no longer
    /// resolves are skipped.
    pub fn marker_layer(&self) -> MarkerLayer {
        let city = self.current();
        let inputs = city.placements.list().filter_map(|(id, position)| {
            let Some(entity) = self.entity(id) else {
                debug!(id = %id, "skipping placement without entity");
                return None;
            };
            let filtered_in = match entity {
                Entity::Site(site) => self.filter.matches(site),
                Entity::Memo(_) => true,
            };
            Some(MarkerInput {
                entity,
                position,
                selected: self.selected.as_deref() == Some(id.as_str()),
                filtered_in,
            })
        });
        layout(&city.viewport, self.filter.is_active(), inputs)
    }

    /// Filtered site list of the current city.
    pub fn site_rows(&self) -> Vec<SiteRow<'_>> {
        let city = self.current();
        let placing = self.mode.pending_placement();
        let sites = self.catalog.sites_for_city(&city.city);
        self.filter
            .apply(sites)
            .into_iter()
            .map(|site| SiteRow {
                site,
                placed: city.placements.contains(&site.id),
                selected: self.selected.as_deref() == Some(site.id.as_str()),
                placing: placing == Some(site.id.as_str()),
            })
            .collect()
    }

    /// Placed versus total sites of the current city, ignoring the filter.
    pub fn counts(&self) -> PlacementCounts {
        let city = self.current();
        let sites = self.catalog.sites_for_city(&city.city);
        PlacementCounts {
            placed: sites
                .iter()
                .filter(|s| city.placements.contains(&s.id))
                .count(),
            total: sites.len(),
        }
    }

    pub fn set_filter(&mut self, filter: SiteFilter) -> Effects {
        let mut fx = Effects::new();
        if self.filter != filter {
            self.filter = filter;
            fx.extend([Effect::RenderList, Effect::RenderMarkers]);
        }
        fx
    }

    pub fn switch_city(&mut self, city: &City) -> Effects {
        let mut fx = Effects::new();
        let Some(index) = self.cities.iter().position(|c| &c.city == city) else {
            warn!(city = %city, "unknown city");
            return fx;
        };
        // Drags and pans end; a pending placement carries over to the new map.
        self.finish_gesture(false, &mut fx);
        self.selected = None;
        self.current = index;
        info!(city = %city, "switched city");

        let state = self.current();
        if state.image.is_some() && state.viewport.content_size.is_some() {
            self.fit_to_content_into(&mut fx);
        } else {
            self.current_mut().viewport.reset();
        }
        if self.current().image.is_some() {
            fx.push(Effect::LoadImage);
        }
        fx.extend([Effect::ApplyTransform, Effect::Persist]);
        fx.render_all();
        fx
    }

    /// Select an entity, from a marker click or a list row.
    pub fn select(&mut self, id: &str) -> Effects {
        let mut fx = Effects::new();
        if self.entity(id).is_none() {
            return fx;
        }
        if self.selected.as_deref() != Some(id) {
            self.selected = Some(id.to_string());
        }
        fx.render_all();
        fx.push(Effect::RevealInList(id.to_string()));
        fx
    }

    pub fn clear_selection(&mut self) -> Effects {
        let mut fx = Effects::new();
        if self.selected.take().is_some() {
            fx.render_all();
        }
        fx
    }

    /// Arm placement for `id`. Any active drag or pan ends first and any
    /// other pending placement is dropped.
    pub fn start_placing(&mut self, id: &str) -> Effects {
        let mut fx = Effects::new();
        if self.entity(id).is_none() {
            warn!(id = %id, "cannot place unknown entity");
            return fx;
        }
        if matches!(self.mode, Mode::Dragging { .. } | Mode::Panning { .. }) {
            self.finish_gesture(false, &mut fx);
        }
        debug!(id = %id, "placing");
        self.mode = Mode::Placing(id.to_string());
        fx.extend([Effect::RenderMarkers, Effect::RenderList]);
        fx
    }

    pub fn cancel_placing(&mut self) -> Effects {
        self.handle(crate::interaction::InteractionEvent::Escape)
    }

    pub(crate) fn commit_placement(&mut self, id: EntityId, content: Position) -> Effects {
        let mut fx = Effects::new();
        let current = self.current;
        // An entity lives on one city's map at a time.
        for (i, city) in self.cities.iter_mut().enumerate() {
            if i != current && city.placements.remove(&id).is_some() {
                debug!(id = %id, city = %city.city, "moved placement between cities");
            }
        }
        self.current_mut().placements.upsert(id.clone(), content);
        self.mode = Mode::Idle;
        info!(id = %id, x = content.x, y = content.y, "placed");
        fx.extend(self.select(&id));
        fx.extend([Effect::Persist, Effect::Notify(Notice::Placed)]);
        fx
    }

    pub fn remove_placement(&mut self, id: &str) -> Effects {
        let mut fx = Effects::new();
        if self.current_mut().placements.remove(id).is_none() {
            return fx;
        }
        if self.mode.dragging_id() == Some(id) {
            self.mode = Mode::Idle;
        }
        fx.push(Effect::Persist);
        fx.render_all();
        fx.push(Effect::Notify(Notice::PlacementRemoved));
        fx
    }

    /// Clear every placement of the current city.
    pub fn reset_positions(&mut self) -> Effects {
        let mut fx = Effects::new();
        if matches!(self.mode, Mode::Dragging { .. }) {
            self.mode = Mode::Idle;
        }
        self.current_mut().placements.clear();
        fx.push(Effect::Persist);
        fx.render_all();
        fx.push(Effect::Notify(Notice::PositionsReset));
        fx
    }

    /// Center the view on a placed entity at the current zoom.
    pub fn pan_to(&mut self, id: &str) -> Effects {
        let mut fx = Effects::new();
        let Some(pos) = self.current().placements.get(id) else {
            return fx;
        };
        let size = self.viewport_size;
        self.current_mut().viewport.center_on(pos, size);
        fx.extend([Effect::ApplyTransform, Effect::RenderMarkers, Effect::Persist]);
        fx
    }

    /// Zoom about the viewport center.
    pub fn zoom_by(&mut self, factor: f64) -> Effects {
        let size = self.viewport_size;
        self.current_mut().viewport.zoom_by(factor, size);
        self.view_changed()
    }

    pub fn pan_step(&mut self, direction: PanDirection) -> Effects {
        self.current_mut().viewport.pan_step(direction);
        self.view_changed()
    }

    pub fn reset_view(&mut self) -> Effects {
        self.current_mut().viewport.reset();
        self.view_changed()
    }

    fn view_changed(&self) -> Effects {
        let mut fx = Effects::new();
        fx.extend([Effect::ApplyTransform, Effect::RenderMarkers, Effect::Persist]);
        fx
    }

    /// Frame the current city's placements, or its image when none.
    pub fn fit_to_content(&mut self) -> Effects {
        let mut fx = Effects::new();
        self.fit_to_content_into(&mut fx);
        fx
    }

    fn fit_to_content_into(&mut self, fx: &mut Effects) {
        let city = self.current();
        let footprints: Vec<(Position, Size)> = city
            .placements
            .list()
            .map(|(id, pos)| {
                let footprint = self.entity(id).map_or(MEMO_FOOTPRINT, |e| e.footprint());
                (pos, footprint)
            })
            .collect();
        let bounds = fit_bounds(footprints, city.viewport.content_size);
        let size = self.viewport_size;
        if self.current_mut().viewport.fit_to_content(size, bounds) {
            fx.extend([Effect::ApplyTransform, Effect::RenderMarkers, Effect::Persist]);
        } else {
            debug!("viewport not laid out; fit skipped");
        }
    }

    /// Store an uploaded background for the current city. Fitting waits for
    /// [`Session::background_loaded`].
    pub fn set_background_image(&mut self, data: String) -> Effects {
        let mut fx = Effects::new();
        let city = self.current_mut();
        city.image = Some(data);
        city.viewport.content_size = None;
        fx.extend([
            Effect::PersistImage(city.city.clone()),
            Effect::LoadImage,
            Effect::Notify(Notice::ImageUploaded),
        ]);
        fx
    }

    /// The background raster decoded with its natural size.
    pub fn background_loaded(&mut self, natural: Size) -> Effects {
        let mut fx = Effects::new();
        self.current_mut().viewport.content_size = Some(natural);
        self.fit_to_content_into(&mut fx);
        fx
    }

    pub fn clear_background_image(&mut self) -> Effects {
        let mut fx = Effects::new();
        let city = self.current_mut();
        if city.image.take().is_none() {
            return fx;
        }
        city.viewport.content_size = None;
        fx.extend([Effect::PersistImage(city.city.clone()), Effect::LoadImage]);
        fx.render_all();
        fx
    }

    /// Restore a stored image without re-persisting it.
    pub fn restore_image(&mut self, city: &City, data: String) {
        if let Some(state) = self.city_state_mut(city) {
            state.image = Some(data);
            state.viewport.content_size = None;
        }
    }

    pub fn add_memo(&mut self, memo: Memo) -> Effects {
        let mut fx = Effects::new();
        let city = self.current_city().clone();
        info!(id = %memo.id, city = %city, "memo added");
        self.memos.entry(city).or_default().push(memo);
        fx.extend([
            Effect::SyncMemos,
            Effect::RenderList,
            Effect::Notify(Notice::MemoSaved),
        ]);
        fx
    }

    /// Replace the memo with the same id, wherever it lives.
    pub fn update_memo(&mut self, memo: Memo) -> Effects {
        let mut fx = Effects::new();
        let Some(slot) = self
            .memos
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .find(|m| m.id == memo.id)
        else {
            warn!(id = %memo.id, "update for unknown memo");
            return fx;
        };
        *slot = memo;
        fx.extend([Effect::SyncMemos, Effect::Notify(Notice::MemoSaved)]);
        fx.render_all();
        fx
    }

    /// Delete a memo together with its placements and any selection or
    /// gesture that refers to it.
    pub fn delete_memo(&mut self, id: &str) -> Effects {
        let mut fx = Effects::new();
        let mut found = false;
        for list in self.memos.values_mut() {
            let before = list.len();
            list.retain(|m| m.id != id);
            found |= list.len() != before;
        }
        if !found {
            return fx;
        }
        for city in &mut self.cities {
            city.placements.remove(id);
        }
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        let stale = match &self.mode {
            Mode::Placing(p) => p == id,
            Mode::Dragging { id: d, .. } => d == id,
            Mode::Panning { resume, .. } => resume.as_deref() == Some(id),
            Mode::Idle => false,
        };
        if stale {
            self.mode = Mode::Idle;
        }
        info!(id = %id, "memo deleted");
        fx.extend([Effect::SyncMemos, Effect::Persist]);
        fx.render_all();
        fx.push(Effect::Notify(Notice::MemoDeleted));
        fx
    }

    /// Adopt the lists fetched from the remote store. Every known city keeps
    /// an entry.
    pub fn replace_memos(&mut self, memos: CityMemos) -> Effects {
        let mut fx = Effects::new();
        let mut merged = empty_city_memos(self.cities.iter().map(|c| &c.city));
        merged.extend(memos);
        self.memos = merged;
        if let Some(id) = self.selected.clone() {
            if self.entity(&id).is_none() {
                self.selected = None;
            }
        }
        fx.render_all();
        fx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::interaction::{InteractionEvent, PointerButton};
    use crate::models::test_site;

    fn session() -> Session<StaticCatalog> {
        let catalog = StaticCatalog::new(vec![
            test_site("S1", "Gangnam", 40.0, 20.0),
            test_site("S2", "Gangnam", 10.0, 10.0),
            test_site("R1", "RedCity", 10.0, 10.0),
        ]);
        let mut s = Session::new(catalog, City::defaults());
        s.set_viewport_size(Size::new(800.0, 600.0));
        s
    }

    fn memo(id: &str) -> Memo {
        Memo::with_id(id, format!("Memo {id}"), chrono::Utc::now())
    }

    #[test]
    fn test_empty_city_list_uses_defaults() {
        let s = Session::new(StaticCatalog::default(), vec![]);
        assert_eq!(s.cities().count(), 3);
        assert_eq!(s.current_city().as_str(), "Gangnam");
    }

    #[test]
    fn test_set_catalog_keeps_unresolved_placements() {
        let mut s = Session::new(StaticCatalog::default(), City::defaults());
        s.current_mut()
            .placements
            .upsert("S1", Position::new(10.0, 10.0));
        assert!(s.marker_layer().is_empty());

        let fx = s.set_catalog(session().catalog);
        assert!(fx.contains(&Effect::RenderMarkers));
        assert_eq!(s.marker_layer().len(), 1);
    }

    #[test]
    fn test_fit_scenario_single_site() {
        let mut s = session();
        s.current_mut()
            .placements
            .upsert("S1", Position::new(100.0, 100.0));
        let fx = s.fit_to_content();
        assert!(fx.contains(&Effect::Persist));
        assert_eq!(s.viewport().zoom, 3.0);
        let center = s.viewport().to_screen(Position::new(112.0, 106.0));
        assert!((center.x - 400.0).abs() < 1e-9);
        assert!((center.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_nothing_placed_resets() {
        let mut s = session();
        s.current_mut().viewport.zoom = 2.5;
        s.fit_to_content();
        assert_eq!(s.viewport().zoom, 1.0);
        assert_eq!(s.viewport().pan(), Position::ORIGIN);
    }

    #[test]
    fn test_fit_frames_unresolved_placements_with_fixed_footprint() {
        let mut s = session();
        s.current_mut()
            .placements
            .upsert("ghost", Position::new(5000.0, 5000.0));
        s.restore_image(&City::new("Gangnam"), "data:x".to_string());
        s.background_loaded(Size::new(1000.0, 1000.0));
        s.fit_to_content();
        // Box (5000,5000)-(5020,5016): zoom min(680/20, 480/16) clamps to 3.
        let v = s.viewport();
        assert_eq!(v.zoom, 3.0);
        assert!((v.pan_x - ((800.0 - 60.0) / 2.0 - 15_000.0)).abs() < 1e-9);
        assert!((v.pan_y - ((600.0 - 48.0) / 2.0 - 15_000.0)).abs() < 1e-9);
        // The renderer still skips it.
        assert!(s.marker_layer().is_empty());
    }

    #[test]
    fn test_fit_before_layout_is_noop() {
        let mut s = session();
        s.set_viewport_size(Size::default());
        s.current_mut().viewport.zoom = 2.0;
        assert!(s.fit_to_content().is_empty());
        assert_eq!(s.viewport().zoom, 2.0);
    }

    #[test]
    fn test_switch_city_clears_selection_and_resets() {
        let mut s = session();
        s.select("S1");
        s.current_mut().viewport.zoom = 2.0;
        let fx = s.switch_city(&City::new("RedCity"));
        assert!(fx.contains(&Effect::ApplyTransform));
        assert!(!fx.contains(&Effect::LoadImage));
        assert_eq!(s.selected(), None);
        assert_eq!(s.viewport().zoom, 1.0);
        // The previous city's view is kept.
        assert_eq!(
            s.city_state(&City::new("Gangnam")).unwrap().viewport.zoom,
            2.0
        );
    }

    #[test]
    fn test_switch_city_fits_loaded_image() {
        let mut s = session();
        let red = City::new("RedCity");
        s.restore_image(&red, "data:image/png;base64,AAAA".to_string());
        s.cities[1].viewport.content_size = Some(Size::new(2000.0, 1000.0));
        let fx = s.switch_city(&red);
        assert!(fx.contains(&Effect::LoadImage));
        let expected = (680.0 / 2000.0_f64).min(480.0 / 1000.0);
        assert!((s.viewport().zoom - expected).abs() < 1e-12);
    }

    #[test]
    fn test_switch_to_unknown_city_is_ignored() {
        let mut s = session();
        assert!(s.switch_city(&City::new("Atlantis")).is_empty());
        assert_eq!(s.current_city().as_str(), "Gangnam");
    }

    #[test]
    fn test_pending_placement_survives_city_switch() {
        let mut s = session();
        s.current_mut().placements.upsert("S1", Position::new(1.0, 1.0));
        s.start_placing("S1");
        s.switch_city(&City::new("RedCity"));
        assert_eq!(s.mode().pending_placement(), Some("S1"));

        s.handle(InteractionEvent::PointerDown {
            at: Position::new(40.0, 30.0),
            button: PointerButton::Primary,
        });
        s.handle(InteractionEvent::PointerUp {
            at: Position::new(40.0, 30.0),
        });
        assert_eq!(s.current().placements.get("S1"), Some(Position::new(40.0, 30.0)));
        assert!(!s.city_state(&City::new("Gangnam")).unwrap().placements.contains("S1"));
    }

    #[test]
    fn test_switch_city_ends_drag() {
        let mut s = session();
        s.current_mut().placements.upsert("S1", Position::new(10.0, 10.0));
        s.handle(InteractionEvent::PointerDown {
            at: Position::new(12.0, 12.0),
            button: PointerButton::Primary,
        });
        assert_eq!(s.mode().dragging_id(), Some("S1"));
        s.switch_city(&City::new("RedCity"));
        assert_eq!(s.mode(), &Mode::Idle);
    }

    #[test]
    fn test_commit_moves_entity_between_cities() {
        let mut s = session();
        s.cities[1]
            .placements
            .upsert("S1", Position::new(1.0, 1.0));
        let fx = s.commit_placement("S1".to_string(), Position::new(5.0, 5.0));
        assert!(fx.contains(&Effect::Notify(Notice::Placed)));
        assert!(!s.cities[1].placements.contains("S1"));
        assert_eq!(s.current().placements.get("S1"), Some(Position::new(5.0, 5.0)));
    }

    #[test]
    fn test_unknown_entity_cannot_be_placed_or_selected() {
        let mut s = session();
        assert!(s.start_placing("nope").is_empty());
        assert!(s.select("nope").is_empty());
        assert_eq!(s.mode(), &Mode::Idle);
    }

    #[test]
    fn test_site_rows_and_counts() {
        let mut s = session();
        s.current_mut().placements.upsert("S2", Position::ORIGIN);
        s.start_placing("S1");
        let rows = s.site_rows();
        assert_eq!(rows.len(), 2);
        let s1 = rows.iter().find(|r| r.site.id == "S1").unwrap();
        assert!(s1.placing && !s1.placed);
        assert_eq!(s.counts(), PlacementCounts { placed: 1, total: 2 });

        s.set_filter(SiteFilter {
            site_type: None,
            search: "s2".to_string(),
        });
        assert_eq!(s.site_rows().len(), 1);
        assert_eq!(s.counts().total, 2);
    }

    #[test]
    fn test_marker_layer_dims_filtered_out_sites() {
        let mut s = session();
        s.current_mut().placements.upsert("S1", Position::ORIGIN);
        s.set_filter(SiteFilter {
            site_type: Some("Residence".to_string()),
            search: String::new(),
        });
        let layer = s.marker_layer();
        assert!(layer.iter().all(|m| m.dimmed));
    }

    #[test]
    fn test_pan_to_centers_placement() {
        let mut s = session();
        s.current_mut().viewport.zoom = 2.0;
        s.current_mut()
            .placements
            .upsert("S1", Position::new(50.0, 25.0));
        s.pan_to("S1");
        let screen = s.viewport().to_screen(Position::new(50.0, 25.0));
        assert!((screen.x - 400.0).abs() < 1e-9);
        assert!((screen.y - 300.0).abs() < 1e-9);
        assert!(s.pan_to("S2").is_empty());
    }

    #[test]
    fn test_zoom_buttons_clamp() {
        let mut s = session();
        for _ in 0..30 {
            s.zoom_by(1.2);
        }
        assert_eq!(s.viewport().zoom, 5.0);
        for _ in 0..60 {
            s.zoom_by(1.0 / 1.2);
        }
        assert_eq!(s.viewport().zoom, 0.1);
    }

    #[test]
    fn test_remove_and_reset_positions() {
        let mut s = session();
        s.current_mut().placements.upsert("S1", Position::ORIGIN);
        s.current_mut().placements.upsert("S2", Position::ORIGIN);
        let fx = s.remove_placement("S1");
        assert!(fx.contains(&Effect::Notify(Notice::PlacementRemoved)));
        assert!(s.remove_placement("S1").is_empty());
        let fx = s.reset_positions();
        assert!(fx.contains(&Effect::Persist));
        assert!(s.current().placements.is_empty());
    }

    #[test]
    fn test_background_image_lifecycle() {
        let mut s = session();
        let fx = s.set_background_image("data:image/png;base64,AAAA".to_string());
        assert!(fx.contains(&Effect::PersistImage(City::new("Gangnam"))));
        assert!(fx.contains(&Effect::Notify(Notice::ImageUploaded)));
        s.background_loaded(Size::new(1360.0, 960.0));
        assert!((s.viewport().zoom - 0.5).abs() < 1e-12);
        let fx = s.clear_background_image();
        assert!(fx.contains(&Effect::PersistImage(City::new("Gangnam"))));
        assert!(s.current().image.is_none());
        assert!(s.clear_background_image().is_empty());
    }

    #[test]
    fn test_delete_memo_cascades_atomically() {
        let mut s = session();
        s.add_memo(memo("memo_a"));
        s.current_mut()
            .placements
            .upsert("memo_a", Position::new(3.0, 3.0));
        s.select("memo_a");
        assert!(matches!(s.selected_entity(), Some(Entity::Memo(_))));
        let fx = s.delete_memo("memo_a");
        assert!(fx.contains(&Effect::SyncMemos));
        assert!(fx.contains(&Effect::Persist));
        assert!(s.current().placements.get("memo_a").is_none());
        assert!(s.memos_for(&City::new("Gangnam")).is_empty());
        assert_eq!(s.selected(), None);
        assert!(s.delete_memo("memo_a").is_empty());
    }

    #[test]
    fn test_delete_memo_while_placing_it() {
        let mut s = session();
        s.add_memo(memo("memo_b"));
        s.start_placing("memo_b");
        s.delete_memo("memo_b");
        assert_eq!(s.mode(), &Mode::Idle);
    }

    #[test]
    fn test_update_memo() {
        let mut s = session();
        s.add_memo(memo("memo_c"));
        let mut edited = memo("memo_c");
        edited.title = "Renamed".to_string();
        assert!(s.update_memo(edited).contains(&Effect::SyncMemos));
        assert_eq!(s.memos_for(&City::new("Gangnam"))[0].title, "Renamed");
        assert!(s.update_memo(memo("missing")).is_empty());
    }

    #[test]
    fn test_replace_memos_keeps_every_city() {
        let mut s = session();
        s.add_memo(memo("memo_old"));
        s.select("memo_old");
        let mut fetched = CityMemos::new();
        fetched.insert(City::new("Cahaya"), vec![memo("memo_new")]);
        s.replace_memos(fetched);
        assert_eq!(s.memos().len(), 3);
        assert!(s.memos_for(&City::new("Gangnam")).is_empty());
        assert_eq!(s.selected(), None);
    }
}
