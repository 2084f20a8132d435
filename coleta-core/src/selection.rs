//! Region/city/item selection state machine.
//!
//! Region and city live in one [`SelectionStep`] so that a city without a region can never
//! be represented, and choosing a region always drops the previous city. The item filter is
//! orthogonal and survives every region or city change.

use std::collections::BTreeSet;

use crate::model::{City, ItemId, PointQuery, RegionCode, SelectionFilter};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Progress of the region/city selection.
pub enum SelectionStep {
    /// Nothing chosen yet.
    #[default]
    Unselected,
    /// Region chosen, city still open.
    RegionChosen {
        /// Selected region.
        region: RegionCode,
    },
    /// Region and city chosen; the selection can be submitted.
    Ready {
        /// Selected region.
        region: RegionCode,
        /// Selected city.
        city: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// User action that changes the selection.
pub enum SelectionEvent {
    /// Pick a region; always clears the city.
    ChooseRegion(RegionCode),
    /// Pick a city of the currently selected region.
    ChooseCity(City),
    /// Add the item to the filter, or remove it if present.
    ToggleItem(ItemId),
    /// Go back to the region step with an empty filter.
    Reset,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Selection operation issued in a state that does not allow it.
pub enum TransitionError {
    /// A city was chosen before any region.
    #[error("Invalid transition: city {city:?} chosen before a region")]
    NoRegion {
        /// City that was offered.
        city: String,
    },
    /// A city of another region was chosen.
    #[error("Invalid transition: city {city:?} belongs to {city_region}, but {selected} is selected")]
    RegionMismatch {
        /// City that was offered.
        city: String,
        /// Region the city belongs to.
        city_region: RegionCode,
        /// Region currently selected.
        selected: RegionCode,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Current selection of the user.
pub struct SelectionState {
    step: SelectionStep,
    item_ids: BTreeSet<ItemId>,
}

/// Compute the state that follows `state` after `event`.
///
/// # Errors
///
/// Returns a [`TransitionError`] when a city is chosen without a matching region.
pub fn transition(
    state: &SelectionState,
    event: SelectionEvent,
) -> Result<SelectionState, TransitionError> {
    let next = match event {
        SelectionEvent::ChooseRegion(region) => SelectionState {
            step: SelectionStep::RegionChosen { region },
            item_ids: state.item_ids.clone(),
        },
        SelectionEvent::ChooseCity(city) => {
            let Some(selected) = state.region() else {
                return Err(TransitionError::NoRegion { city: city.name });
            };
            if *selected != city.region_code {
                return Err(TransitionError::RegionMismatch {
                    city: city.name,
                    city_region: city.region_code,
                    selected: selected.clone(),
                });
            }
            SelectionState {
                step: SelectionStep::Ready {
                    region: city.region_code,
                    city: city.name,
                },
                item_ids: state.item_ids.clone(),
            }
        }
        SelectionEvent::ToggleItem(id) => {
            let mut item_ids = state.item_ids.clone();
            if !item_ids.remove(&id) {
                item_ids.insert(id);
            }
            SelectionState {
                step: state.step.clone(),
                item_ids,
            }
        }
        SelectionEvent::Reset => SelectionState::default(),
    };
    Ok(next)
}

impl SelectionState {
    /// Empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an event in place. On error the state is left untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] when the event is not allowed in the current state.
    pub fn apply(&mut self, event: SelectionEvent) -> Result<(), TransitionError> {
        *self = transition(self, event)?;
        Ok(())
    }

    /// Select a region and clear the city.
    pub fn choose_region(&mut self, code: RegionCode) {
        self.step = SelectionStep::RegionChosen { region: code };
    }

    /// Select a city of the current region.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] when no region is selected or the city belongs to
    /// another region.
    pub fn choose_city(&mut self, city: City) -> Result<(), TransitionError> {
        self.apply(SelectionEvent::ChooseCity(city))
    }

    /// Toggle one item in the filter.
    pub fn toggle_item(&mut self, id: ItemId) {
        if !self.item_ids.remove(&id) {
            self.item_ids.insert(id);
        }
    }

    /// Back to [`SelectionStep::Unselected`] with an empty item filter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether region and city are both chosen.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        matches!(self.step, SelectionStep::Ready { .. })
    }

    /// Current step.
    #[must_use]
    pub fn step(&self) -> &SelectionStep {
        &self.step
    }

    /// Selected region, if any.
    #[must_use]
    pub fn region(&self) -> Option<&RegionCode> {
        match &self.step {
            SelectionStep::Unselected => None,
            SelectionStep::RegionChosen { region } | SelectionStep::Ready { region, .. } => {
                Some(region)
            }
        }
    }

    /// Selected city, if any.
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        match &self.step {
            SelectionStep::Ready { city, .. } => Some(city.as_str()),
            SelectionStep::Unselected | SelectionStep::RegionChosen { .. } => None,
        }
    }

    /// Item filter.
    #[must_use]
    pub fn item_ids(&self) -> &BTreeSet<ItemId> {
        &self.item_ids
    }

    /// Whether an item is part of the filter.
    #[must_use]
    pub fn is_item_selected(&self, id: ItemId) -> bool {
        self.item_ids.contains(&id)
    }

    /// Snapshot as a plain filter.
    #[must_use]
    pub fn filter(&self) -> SelectionFilter {
        SelectionFilter {
            region_code: self.region().cloned(),
            city: self.city().map(str::to_owned),
            item_ids: self.item_ids.clone(),
        }
    }

    /// Query for the current selection, `None` unless [`Self::is_submittable`].
    #[must_use]
    pub fn query(&self) -> Option<PointQuery> {
        match &self.step {
            SelectionStep::Ready { region, city } => Some(PointQuery {
                region_code: region.clone(),
                city: city.clone(),
                item_ids: self.item_ids.clone(),
            }),
            SelectionStep::Unselected | SelectionStep::RegionChosen { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str, region: &str) -> City {
        City {
            name: name.to_owned(),
            region_code: RegionCode::new(region),
        }
    }

    fn ready(region: &str, name: &str) -> SelectionState {
        let mut state = SelectionState::new();
        state.choose_region(RegionCode::new(region));
        state.choose_city(city(name, region)).expect("city of selected region");
        state
    }

    #[test]
    fn choose_region_always_clears_city() {
        let mut state = ready("SC", "Tubarão");

        for code in ["SC", "SP", "SP", "RS"] {
            state.choose_region(RegionCode::new(code));
            assert_eq!(state.city(), None);
            assert_eq!(state.region().map(RegionCode::as_str), Some(code));
            assert!(!state.is_submittable());
        }
    }

    #[test]
    fn choose_city_before_region_is_invalid() {
        let mut state = SelectionState::new();

        let err = state
            .choose_city(city("Tubarão", "SC"))
            .expect_err("no region selected");

        assert!(matches!(err, TransitionError::NoRegion { .. }));
        assert_eq!(state, SelectionState::new());
    }

    #[test]
    fn choose_city_of_other_region_is_invalid() {
        let mut state = SelectionState::new();
        state.choose_region(RegionCode::new("SP"));

        let err = state
            .choose_city(city("Tubarão", "SC"))
            .expect_err("city belongs to SC");

        assert!(matches!(err, TransitionError::RegionMismatch { .. }));
        assert_eq!(
            state.step(),
            &SelectionStep::RegionChosen {
                region: RegionCode::new("SP")
            }
        );
    }

    #[test]
    fn choosing_another_city_keeps_ready() {
        let mut state = ready("SC", "Tubarão");
        state
            .choose_city(city("Laguna", "SC"))
            .expect("same region");

        assert_eq!(state.city(), Some("Laguna"));
        assert!(state.is_submittable());
    }

    #[test]
    fn toggle_item_twice_is_identity() {
        let mut state = ready("SC", "Tubarão");
        state.toggle_item(ItemId(3));
        let before = state.item_ids().clone();

        state.toggle_item(ItemId(1));
        state.toggle_item(ItemId(1));
        assert_eq!(state.item_ids(), &before);

        state.toggle_item(ItemId(3));
        state.toggle_item(ItemId(3));
        assert_eq!(state.item_ids(), &before);
    }

    #[test]
    fn toggle_item_never_changes_step() {
        let mut state = SelectionState::new();
        state.toggle_item(ItemId(1));
        assert_eq!(state.step(), &SelectionStep::Unselected);

        let mut state = ready("SC", "Tubarão");
        state.toggle_item(ItemId(1));
        assert_eq!(state.city(), Some("Tubarão"));
    }

    #[test]
    fn item_filter_survives_region_change() {
        let mut state = ready("SC", "Tubarão");
        state.toggle_item(ItemId(4));
        state.choose_region(RegionCode::new("SP"));

        assert!(state.is_item_selected(ItemId(4)));
    }

    #[test]
    fn query_requires_ready() {
        let mut state = SelectionState::new();
        assert_eq!(state.query(), None);

        state.choose_region(RegionCode::new("SC"));
        assert_eq!(state.query(), None);

        state
            .choose_city(city("Tubarão", "SC"))
            .expect("city of selected region");
        let query = state.query().expect("ready");
        assert_eq!(query.city, "Tubarão");
        assert!(query.item_ids.is_empty());
        assert!(state.filter().is_submittable());
    }

    #[test]
    fn transition_is_pure() {
        let state = ready("SC", "Tubarão");

        let next = transition(&state, SelectionEvent::ChooseRegion(RegionCode::new("SP")))
            .expect("region can always be chosen");

        assert_eq!(state.city(), Some("Tubarão"));
        assert_eq!(next.city(), None);
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = ready("SC", "Tubarão");
        state.toggle_item(ItemId(2));
        state.apply(SelectionEvent::Reset).expect("reset is total");

        assert_eq!(state, SelectionState::new());
        assert_eq!(state.filter(), SelectionFilter::default());
    }
}
