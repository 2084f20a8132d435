//! View state for the region → points → detail flow.
//!
//! [`Explorer`] never awaits anything. Each operation that needs the network hands back a
//! [`Ticket`]; the caller runs the request and feeds the result to the matching
//! `complete_*` method, which applies it only when the ticket is still current.

use tracing::{debug, error, info, warn};

use crate::error::ColetaError;
use crate::gate::{RequestGate, Ticket};
use crate::model::{City, CollectionPoint, ItemId, PointId, PointQuery, Region, RegionCode};
use crate::projector::{MapProjector, Marker, Viewport};
use crate::selection::SelectionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of feeding a completion to the explorer.
pub enum Completion {
    /// The result was current and is now visible.
    Applied,
    /// The result belonged to an outdated request and was dropped.
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Error message to show next to the current content.
pub struct Notice {
    /// Human-readable description.
    pub message: String,
    /// Whether repeating the action may help.
    pub retryable: bool,
}

impl From<&ColetaError> for Notice {
    fn from(err: &ColetaError) -> Self {
        Self {
            message: err.to_string(),
            retryable: err.is_retryable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Points retrieved for one query, with their map projection.
pub struct PointSet {
    /// Query the points were retrieved for.
    pub query: PointQuery,
    /// Retrieved points, in server order.
    pub points: Vec<CollectionPoint>,
    /// One marker per point.
    pub markers: Vec<Marker>,
    /// Viewport framing the points.
    pub viewport: Viewport,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// State of the detail view.
pub enum DetailState {
    /// No detail open.
    #[default]
    Closed,
    /// Waiting for the point.
    Loading(PointId),
    /// Point loaded.
    Loaded(CollectionPoint),
    /// The point does not exist (anymore).
    Unavailable(PointId),
    /// Loading failed; may be retried.
    Failed {
        /// Point that was requested.
        id: PointId,
        /// What went wrong.
        notice: Notice,
    },
}

/// Selection, lists, point set, and detail of one browsing session.
pub struct Explorer {
    projector: MapProjector,
    selection: SelectionState,
    regions: Vec<Region>,
    cities: Vec<City>,
    point_set: Option<PointSet>,
    detail: DetailState,
    notice: Option<Notice>,
    region_gate: RequestGate<()>,
    city_gate: RequestGate<RegionCode>,
    point_gate: RequestGate<PointQuery>,
    detail_gate: RequestGate<PointId>,
}

impl Explorer {
    /// Fresh session projecting points with `projector`.
    #[must_use]
    pub fn new(projector: MapProjector) -> Self {
        Self {
            projector,
            selection: SelectionState::new(),
            regions: Vec::new(),
            cities: Vec::new(),
            point_set: None,
            detail: DetailState::Closed,
            notice: None,
            region_gate: RequestGate::new(),
            city_gate: RequestGate::new(),
            point_gate: RequestGate::new(),
            detail_gate: RequestGate::new(),
        }
    }

    /// Current selection.
    #[must_use]
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Regions available for selection.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Cities of the selected region; empty until they arrive.
    #[must_use]
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// Last successfully retrieved point set.
    #[must_use]
    pub fn point_set(&self) -> Option<&PointSet> {
        self.point_set.as_ref()
    }

    /// Retrieved points, empty before the first successful query.
    #[must_use]
    pub fn points(&self) -> &[CollectionPoint] {
        self.point_set.as_ref().map_or(&[], |set| set.points.as_slice())
    }

    /// Markers of the retrieved points.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        self.point_set.as_ref().map_or(&[], |set| set.markers.as_slice())
    }

    /// Viewport of the retrieved points, or the fallback.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.point_set
            .as_ref()
            .map_or_else(|| self.projector.fallback(), |set| set.viewport)
    }

    /// Detail view state.
    #[must_use]
    pub fn detail(&self) -> &DetailState {
        &self.detail
    }

    /// Current error notice.
    #[must_use]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Drop the current notice.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Whether any request is awaiting its completion.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.region_gate.is_pending()
            || self.city_gate.is_pending()
            || self.point_gate.is_pending()
            || self.detail_gate.is_pending()
    }

    /// Start loading the region list.
    pub fn request_regions(&mut self) -> Ticket<()> {
        self.region_gate.issue(())
    }

    /// Apply a region list result.
    pub fn complete_regions(
        &mut self,
        ticket: &Ticket<()>,
        result: Result<Vec<Region>, ColetaError>,
    ) -> Completion {
        if !self.region_gate.admit(ticket, &()) {
            debug!(generation = ticket.generation(), "discarding stale region list");
            return Completion::Discarded;
        }
        match result {
            Ok(regions) => {
                self.regions = regions;
                self.notice = None;
            }
            Err(err) => self.fail(&err),
        }
        Completion::Applied
    }

    /// Select a region and start loading its cities.
    ///
    /// The city and any retrieved points are cleared, and every pending city or point
    /// request becomes stale.
    pub fn choose_region(&mut self, code: RegionCode) -> Ticket<RegionCode> {
        self.selection.choose_region(code.clone());
        self.cities.clear();
        self.point_set = None;
        self.point_gate.invalidate();
        self.city_gate.issue(code)
    }

    /// Apply a city list result, unless the region changed in the meantime.
    pub fn complete_cities(
        &mut self,
        ticket: &Ticket<RegionCode>,
        result: Result<Vec<City>, ColetaError>,
    ) -> Completion {
        let admitted = match self.selection.region() {
            Some(current) => self.city_gate.admit(ticket, current),
            None => false,
        };
        if !admitted {
            warn!(
                region = %ticket.context(),
                generation = ticket.generation(),
                "discarding stale city list"
            );
            return Completion::Discarded;
        }
        match result {
            Ok(cities) => {
                info!(region = %ticket.context(), count = cities.len(), "city list shown");
                self.cities = cities;
                self.notice = None;
            }
            Err(err) => self.fail(&err),
        }
        Completion::Applied
    }

    /// Select a city of the current region.
    ///
    /// # Errors
    ///
    /// Returns [`ColetaError::InvalidTransition`] when no region is selected or the city
    /// belongs to another region. The selection is left unchanged.
    ///
    /// Points shown for a previous city are cleared.
    pub fn choose_city(&mut self, city: City) -> Result<(), ColetaError> {
        let unchanged = self.selection.city() == Some(city.name.as_str());
        if let Err(err) = self.selection.choose_city(city) {
            error!(%err, "rejected city selection");
            return Err(err.into());
        }
        if !unchanged {
            self.point_set = None;
        }
        self.point_gate.invalidate();
        Ok(())
    }

    /// Toggle an item in the filter.
    ///
    /// When a point set is already shown, the query is re-issued for the new filter.
    pub fn toggle_item(&mut self, id: ItemId) -> Option<Ticket<PointQuery>> {
        self.selection.toggle_item(id);
        if self.point_set.is_some() || self.point_gate.is_pending() {
            self.submit()
        } else {
            self.point_gate.invalidate();
            None
        }
    }

    /// Start a point query for the current selection; `None` unless it is submittable.
    ///
    /// Re-submitting an identical selection is allowed, e.g. after a failure.
    pub fn submit(&mut self) -> Option<Ticket<PointQuery>> {
        let query = self.selection.query()?;
        Some(self.point_gate.issue(query))
    }

    /// Apply a point query result, unless the filter changed in the meantime.
    ///
    /// A failure keeps the previously shown points and raises a notice.
    pub fn complete_points(
        &mut self,
        ticket: &Ticket<PointQuery>,
        result: Result<Vec<CollectionPoint>, ColetaError>,
    ) -> Completion {
        let admitted = match self.selection.query() {
            Some(current) => self.point_gate.admit(ticket, &current),
            None => false,
        };
        if !admitted {
            warn!(generation = ticket.generation(), "discarding stale point set");
            return Completion::Discarded;
        }
        match result {
            Ok(points) => {
                info!(count = points.len(), "point set shown");
                self.point_set = Some(PointSet {
                    query: ticket.context().clone(),
                    markers: self.projector.to_markers(&points),
                    viewport: self.projector.initial_viewport(&points),
                    points,
                });
                self.notice = None;
            }
            Err(err) => self.fail(&err),
        }
        Completion::Applied
    }

    /// Id of the point behind the marker at `index`.
    #[must_use]
    pub fn select_marker(&self, index: usize) -> Option<PointId> {
        self.markers().get(index).map(Marker::select)
    }

    /// Open the detail view for a point and start loading it.
    pub fn open_detail(&mut self, id: PointId) -> Ticket<PointId> {
        self.detail = DetailState::Loading(id);
        self.detail_gate.issue(id)
    }

    /// Apply a detail result, unless another detail was opened or the view was closed.
    pub fn complete_detail(
        &mut self,
        ticket: &Ticket<PointId>,
        result: Result<CollectionPoint, ColetaError>,
    ) -> Completion {
        let admitted = match &self.detail {
            DetailState::Loading(current) => self.detail_gate.admit(ticket, current),
            DetailState::Closed
            | DetailState::Loaded(_)
            | DetailState::Unavailable(_)
            | DetailState::Failed { .. } => false,
        };
        if !admitted {
            warn!(id = %ticket.context(), "discarding stale point detail");
            return Completion::Discarded;
        }
        let id = *ticket.context();
        self.detail = match result {
            Ok(point) => DetailState::Loaded(point),
            Err(ColetaError::NotFound(missing)) => {
                warn!(id = %missing, "point detail unavailable");
                DetailState::Unavailable(missing)
            }
            Err(err) => {
                warn!(%id, %err, "point detail failed");
                DetailState::Failed {
                    id,
                    notice: Notice::from(&err),
                }
            }
        };
        Completion::Applied
    }

    /// Leave the detail view.
    pub fn close_detail(&mut self) {
        self.detail = DetailState::Closed;
        self.detail_gate.invalidate();
    }

    /// Go back to the region step: selection, cities, and points are reset.
    pub fn back_to_regions(&mut self) {
        self.selection.reset();
        self.cities.clear();
        self.point_set = None;
        self.notice = None;
        self.close_detail();
        self.city_gate.invalidate();
        self.point_gate.invalidate();
    }

    fn fail(&mut self, err: &ColetaError) {
        warn!(%err, "request failed");
        self.notice = Some(Notice::from(err));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::Coordinate;
    use crate::ports::PortError;

    fn explorer() -> Explorer {
        Explorer::new(MapProjector::new(Viewport::new(-27.2, -49.6, 0.014)))
    }

    fn city(name: &str, region: &str) -> City {
        City {
            name: name.to_owned(),
            region_code: RegionCode::new(region),
        }
    }

    fn point(id: u64) -> CollectionPoint {
        CollectionPoint {
            id: PointId(id),
            name: format!("Ponto {id}"),
            email: String::new(),
            whatsapp_number: String::new(),
            image_ref: String::new(),
            city: "Tubarão".to_owned(),
            region_code: RegionCode::new("SC"),
            coordinate: Coordinate {
                latitude: -28.48,
                longitude: -49.0,
            },
            items: BTreeSet::from([ItemId(1)]),
        }
    }

    fn offline() -> ColetaError {
        ColetaError::Retrieval(PortError::Internal("offline".to_owned()))
    }

    fn ready(explorer: &mut Explorer) {
        let ticket = explorer.choose_region(RegionCode::new("SC"));
        explorer.complete_cities(&ticket, Ok(vec![city("Tubarão", "SC")]));
        explorer
            .choose_city(city("Tubarão", "SC"))
            .expect("city of selected region");
    }

    #[test]
    fn stale_city_list_is_discarded() {
        let mut explorer = explorer();
        let santa_catarina = explorer.choose_region(RegionCode::new("SC"));
        let sao_paulo = explorer.choose_region(RegionCode::new("SP"));

        let stale = explorer.complete_cities(&santa_catarina, Ok(vec![city("Tubarão", "SC")]));
        assert_eq!(stale, Completion::Discarded);
        assert!(explorer.cities().is_empty());

        let fresh = explorer.complete_cities(&sao_paulo, Ok(vec![city("Campinas", "SP")]));
        assert_eq!(fresh, Completion::Applied);
        assert_eq!(explorer.cities(), [city("Campinas", "SP")]);
    }

    #[test]
    fn returning_to_earlier_region_does_not_revive_old_ticket() {
        let mut explorer = explorer();
        let first = explorer.choose_region(RegionCode::new("SC"));
        explorer.choose_region(RegionCode::new("SP"));
        let second = explorer.choose_region(RegionCode::new("SC"));

        assert_eq!(
            explorer.complete_cities(&first, Ok(vec![city("Laguna", "SC")])),
            Completion::Discarded
        );
        assert_eq!(
            explorer.complete_cities(&second, Ok(vec![city("Tubarão", "SC")])),
            Completion::Applied
        );
    }

    #[test]
    fn submit_requires_ready_selection() {
        let mut explorer = explorer();
        assert!(explorer.submit().is_none());

        explorer.choose_region(RegionCode::new("SC"));
        assert!(explorer.submit().is_none());

        explorer
            .choose_city(city("Tubarão", "SC"))
            .expect("city of selected region");
        assert!(explorer.submit().is_some());
    }

    #[test]
    fn choose_city_without_region_is_invalid_transition() {
        let mut explorer = explorer();

        let err = explorer
            .choose_city(city("Tubarão", "SC"))
            .expect_err("no region selected");

        assert!(matches!(err, ColetaError::InvalidTransition(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn failed_query_keeps_previous_points() {
        let mut explorer = explorer();
        ready(&mut explorer);
        let first = explorer.submit().expect("ready");
        explorer.complete_points(&first, Ok(vec![point(1), point(2)]));

        let retry = explorer.submit().expect("ready");
        assert_eq!(explorer.complete_points(&retry, Err(offline())), Completion::Applied);

        assert_eq!(explorer.points().len(), 2);
        assert!(explorer.notice().is_some_and(|notice| notice.retryable));
        assert!(explorer.selection().is_submittable());
    }

    #[test]
    fn point_set_for_outdated_filter_is_discarded() {
        let mut explorer = explorer();
        ready(&mut explorer);
        let unfiltered = explorer.submit().expect("ready");

        let filtered = explorer.toggle_item(ItemId(2)).expect("query pending, re-issued");

        assert_eq!(
            explorer.complete_points(&unfiltered, Ok(vec![point(1)])),
            Completion::Discarded
        );
        assert!(explorer.points().is_empty());
        assert_eq!(
            explorer.complete_points(&filtered, Ok(vec![point(2)])),
            Completion::Applied
        );
        assert_eq!(
            explorer.point_set().map(|set| set.query.item_ids.clone()),
            Some(BTreeSet::from([ItemId(2)]))
        );
    }

    #[test]
    fn toggling_before_first_submit_issues_nothing() {
        let mut explorer = explorer();
        ready(&mut explorer);

        assert!(explorer.toggle_item(ItemId(1)).is_none());
        assert!(!explorer.is_loading());
    }

    #[test]
    fn empty_result_uses_fallback_viewport() {
        let mut explorer = explorer();
        ready(&mut explorer);
        let ticket = explorer.submit().expect("ready");
        explorer.complete_points(&ticket, Ok(Vec::new()));

        assert!(explorer.markers().is_empty());
        assert_eq!(explorer.viewport(), Viewport::new(-27.2, -49.6, 0.014));
        assert!(explorer.notice().is_none());
    }

    #[test]
    fn detail_not_found_is_unavailable() {
        let mut explorer = explorer();
        let ticket = explorer.open_detail(PointId(42));

        explorer.complete_detail(&ticket, Err(ColetaError::NotFound(PointId(42))));

        assert_eq!(explorer.detail(), &DetailState::Unavailable(PointId(42)));
    }

    #[test]
    fn detail_for_closed_view_is_discarded() {
        let mut explorer = explorer();
        let first = explorer.open_detail(PointId(1));
        explorer.close_detail();
        let second = explorer.open_detail(PointId(2));

        assert_eq!(
            explorer.complete_detail(&first, Ok(point(1))),
            Completion::Discarded
        );
        assert_eq!(explorer.detail(), &DetailState::Loading(PointId(2)));
        assert_eq!(
            explorer.complete_detail(&second, Err(offline())),
            Completion::Applied
        );
        assert!(matches!(explorer.detail(), DetailState::Failed { id, .. } if *id == PointId(2)));
    }

    #[test]
    fn back_to_regions_resets_and_invalidates() {
        let mut explorer = explorer();
        ready(&mut explorer);
        explorer.toggle_item(ItemId(3));
        let pending = explorer.submit().expect("ready");

        explorer.back_to_regions();

        assert!(explorer.selection().region().is_none());
        assert!(explorer.selection().item_ids().is_empty());
        assert!(explorer.cities().is_empty());
        assert_eq!(
            explorer.complete_points(&pending, Ok(vec![point(1)])),
            Completion::Discarded
        );
        assert!(!explorer.is_loading());
    }

    #[test]
    fn switching_city_clears_points_of_previous_city() {
        let mut explorer = explorer();
        ready(&mut explorer);
        let tubarao = explorer.submit().expect("ready");
        explorer.complete_points(&tubarao, Ok(vec![point(1), point(2)]));

        explorer
            .choose_city(city("Laguna", "SC"))
            .expect("city of selected region");

        assert_eq!(explorer.selection().city(), Some("Laguna"));
        assert!(explorer.points().is_empty());
        assert!(explorer.markers().is_empty());
        assert_eq!(explorer.viewport(), Viewport::new(-27.2, -49.6, 0.014));
        assert_eq!(
            explorer.complete_points(&tubarao, Ok(vec![point(1)])),
            Completion::Discarded
        );
    }

    #[test]
    fn choosing_same_city_keeps_points() {
        let mut explorer = explorer();
        ready(&mut explorer);
        let ticket = explorer.submit().expect("ready");
        explorer.complete_points(&ticket, Ok(vec![point(1)]));

        explorer
            .choose_city(city("Tubarão", "SC"))
            .expect("city of selected region");

        assert_eq!(explorer.points().len(), 1);
    }

    #[test]
    fn marker_selection_yields_point_id() {
        let mut explorer = explorer();
        ready(&mut explorer);
        let ticket = explorer.submit().expect("ready");
        explorer.complete_points(&ticket, Ok(vec![point(5), point(9)]));

        assert_eq!(explorer.select_marker(1), Some(PointId(9)));
        assert_eq!(explorer.select_marker(2), None);
    }
}
