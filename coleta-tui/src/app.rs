use std::sync::Arc;

use coleta_core::{
    City, CollectionPoint, ColetaError, ColetaService, Completion, ContactAction, ContactError,
    DetailState, Explorer, ItemCategory, PointId, PointQuery, PointsRoute, Region, RegionCode,
    Route, Ticket,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Home,
    Points,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HomeFocus {
    Regions,
    Cities,
}

/// Network call to run in the background.
pub(crate) enum Request {
    Regions(Ticket<()>),
    Cities(Ticket<RegionCode>),
    Points(Ticket<PointQuery>),
    Detail(Ticket<PointId>),
}

/// Result of a background call, tagged with the ticket it was issued with.
pub(crate) enum Response {
    Regions(Ticket<()>, Result<Vec<Region>, ColetaError>),
    Cities(Ticket<RegionCode>, Result<Vec<City>, ColetaError>),
    Points(Ticket<PointQuery>, Result<Vec<CollectionPoint>, ColetaError>),
    Detail(Ticket<PointId>, Result<CollectionPoint, ColetaError>),
}

pub(crate) struct App {
    pub service: Arc<ColetaService>,
    pub explorer: Explorer,

    pub screen: Screen,
    pub focus: HomeFocus,
    pub region_index: usize,
    pub city_index: usize,
    pub item_index: usize,
    pub marker_index: usize,

    pub contact: Option<ContactAction>,
    pub hint: Option<String>,
}

impl App {
    pub(crate) fn new(service: Arc<ColetaService>, explorer: Explorer) -> Self {
        Self {
            service,
            explorer,
            screen: Screen::Home,
            focus: HomeFocus::Regions,
            region_index: 0,
            city_index: 0,
            item_index: 0,
            marker_index: 0,
            contact: None,
            hint: None,
        }
    }

    pub(crate) fn items(&self) -> &[ItemCategory] {
        self.service.items().list_categories()
    }

    /// Requests needed to show `route`; the region list is always loaded.
    pub(crate) fn start(&mut self, route: Route) -> Vec<Request> {
        let mut requests = vec![Request::Regions(self.explorer.request_regions())];
        requests.extend(self.navigate(route));
        requests
    }

    /// Switch screens. Every transition goes through a validated [`Route`].
    pub(crate) fn navigate(&mut self, route: Route) -> Vec<Request> {
        debug!(?route, "navigating");
        self.hint = None;
        self.contact = None;
        match route {
            Route::Home => {
                self.explorer.back_to_regions();
                self.screen = Screen::Home;
                self.focus = HomeFocus::Regions;
                self.city_index = 0;
                self.marker_index = 0;
                Vec::new()
            }
            Route::Points(target) => self.show_points(target),
            Route::Detail(id) => {
                self.screen = Screen::Detail;
                vec![Request::Detail(self.explorer.open_detail(id))]
            }
        }
    }

    fn show_points(&mut self, target: PointsRoute) -> Vec<Request> {
        let mut requests = Vec::new();
        if self.explorer.selection().region() != Some(&target.region_code) {
            requests.push(Request::Cities(
                self.explorer.choose_region(target.region_code.clone()),
            ));
        }
        if self.explorer.selection().city() != Some(target.city.as_str()) {
            let city = City {
                name: target.city,
                region_code: target.region_code,
            };
            if let Err(err) = self.explorer.choose_city(city) {
                self.hint = Some(err.to_string());
                return requests;
            }
        }
        self.screen = Screen::Points;
        self.marker_index = 0;
        requests.extend(self.explorer.submit().map(Request::Points));
        requests
    }

    pub(crate) fn choose_highlighted_region(&mut self) -> Option<Request> {
        let code = self.explorer.regions().get(self.region_index)?.code.clone();
        self.focus = HomeFocus::Cities;
        self.city_index = 0;
        Some(Request::Cities(self.explorer.choose_region(code)))
    }

    pub(crate) fn choose_highlighted_city(&mut self) -> Vec<Request> {
        let Some(city) = self.explorer.cities().get(self.city_index).cloned() else {
            self.hint = Some("No city loaded yet".into());
            return Vec::new();
        };
        if let Err(err) = self.explorer.choose_city(city) {
            self.hint = Some(err.to_string());
            return Vec::new();
        }
        match PointsRoute::from_selection(self.explorer.selection()) {
            Some(route) => self.navigate(Route::Points(route)),
            None => Vec::new(),
        }
    }

    pub(crate) fn toggle_highlighted_item(&mut self) -> Option<Request> {
        let id = self.items().get(self.item_index)?.id;
        self.explorer.toggle_item(id).map(Request::Points)
    }

    pub(crate) fn resubmit(&mut self) -> Option<Request> {
        self.explorer.dismiss_notice();
        self.explorer.submit().map(Request::Points)
    }

    pub(crate) fn open_highlighted_marker(&mut self) -> Vec<Request> {
        match self.explorer.select_marker(self.marker_index) {
            Some(id) => self.navigate(Route::Detail(id)),
            None => Vec::new(),
        }
    }

    pub(crate) fn retry_detail(&mut self) -> Option<Request> {
        match self.explorer.detail() {
            DetailState::Failed { id, .. } => {
                let id = *id;
                Some(Request::Detail(self.explorer.open_detail(id)))
            }
            DetailState::Closed
            | DetailState::Loading(_)
            | DetailState::Loaded(_)
            | DetailState::Unavailable(_) => None,
        }
    }

    /// Back to the point list, or to Home when the detail was opened without a selection.
    pub(crate) fn close_detail(&mut self) -> Vec<Request> {
        if !self.explorer.selection().is_submittable() {
            return self.navigate(Route::Home);
        }
        self.explorer.close_detail();
        self.contact = None;
        self.screen = Screen::Points;
        Vec::new()
    }

    /// Prepare a contact link for the open point; opening it is left to the platform.
    pub(crate) fn prepare_contact(
        &mut self,
        build: fn(&CollectionPoint) -> Result<ContactAction, ContactError>,
    ) {
        let DetailState::Loaded(point) = self.explorer.detail() else {
            return;
        };
        match build(point) {
            Ok(action) => {
                self.hint = None;
                self.contact = Some(action);
            }
            Err(err) => {
                self.contact = None;
                self.hint = Some(err.to_string());
            }
        }
    }

    /// Feed a background result to the explorer.
    pub(crate) fn apply(&mut self, response: Response) {
        let completion = match response {
            Response::Regions(ticket, result) => self.explorer.complete_regions(&ticket, result),
            Response::Cities(ticket, result) => self.explorer.complete_cities(&ticket, result),
            Response::Points(ticket, result) => self.explorer.complete_points(&ticket, result),
            Response::Detail(ticket, result) => self.explorer.complete_detail(&ticket, result),
        };
        if completion == Completion::Applied {
            self.clamp_cursors();
        }
    }

    fn clamp_cursors(&mut self) {
        self.region_index = clamp(self.region_index, self.explorer.regions().len());
        self.city_index = clamp(self.city_index, self.explorer.cities().len());
        self.marker_index = clamp(self.marker_index, self.explorer.markers().len());
    }
}

fn clamp(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}
