//! Domain data structures for regions, cities, item categories, and collection points.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Code of a top-level region, e.g. the two-letter state code `"SC"`.
pub struct RegionCode(pub String);

impl RegionCode {
    /// Build a code from anything string-like.
    #[must_use]
    pub fn new<S: Into<String>>(code: S) -> Self {
        Self(code.into())
    }

    /// Borrow the raw code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Region available for selection.
pub struct Region {
    /// Unique region code.
    pub code: RegionCode,
    /// Display name.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// City inside a region. Only meaningful together with the region it was fetched for.
pub struct City {
    /// Display name, also used as the query value.
    pub name: String,
    /// Region the city list was fetched for.
    pub region_code: RegionCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Identifier of a waste item category.
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Waste item category accepted by collection points.
pub struct ItemCategory {
    /// Unique identifier.
    pub id: ItemId,
    /// Display title.
    pub title: String,
    /// Opaque locator of the category icon.
    pub icon_ref: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Identifier of a collection point.
pub struct PointId(pub u64);

impl fmt::Display for PointId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Geographic position in decimal degrees.
pub struct Coordinate {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Validated collection point.
///
/// `items` is never empty and `(city, region_code)` matches the query that produced it.
pub struct CollectionPoint {
    /// Unique identifier.
    pub id: PointId,
    /// Display name.
    pub name: String,
    /// Contact mail address.
    pub email: String,
    /// Contact WhatsApp number.
    pub whatsapp_number: String,
    /// Locator of the point's picture.
    pub image_ref: String,
    /// City the point is located in.
    pub city: String,
    /// Region the point is located in.
    pub region_code: RegionCode,
    /// Position on the map.
    pub coordinate: Coordinate,
    /// Accepted item categories.
    pub items: BTreeSet<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Collection point as delivered by a provider, before validation.
pub struct PointRecord {
    /// Provider identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Contact mail address.
    pub email: String,
    /// Contact WhatsApp number.
    pub whatsapp: String,
    /// Picture locator.
    pub image_url: String,
    /// City name.
    pub city: String,
    /// Region code.
    pub uf: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Titles of the accepted item categories.
    pub item_titles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Snapshot of the user's current selection.
///
/// Produced by [`crate::selection::SelectionState`], so a city is never set without a region.
pub struct SelectionFilter {
    /// Selected region, if any.
    pub region_code: Option<RegionCode>,
    /// Selected city, if any.
    pub city: Option<String>,
    /// Item filter; empty means every item.
    pub item_ids: BTreeSet<ItemId>,
}

impl SelectionFilter {
    /// Whether region and city are both present.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        self.region_code.is_some() && self.city.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Complete point query: region and city are guaranteed to be set.
pub struct PointQuery {
    /// Region to search in.
    pub region_code: RegionCode,
    /// City to search in.
    pub city: String,
    /// Item filter; empty means unfiltered.
    pub item_ids: BTreeSet<ItemId>,
}

impl PointQuery {
    /// Build a query from a filter, or `None` if region or city is missing.
    #[must_use]
    pub fn from_filter(filter: &SelectionFilter) -> Option<Self> {
        let region_code = filter.region_code.clone()?;
        let city = filter.city.clone()?;
        Some(Self {
            region_code,
            city,
            item_ids: filter.item_ids.clone(),
        })
    }

    /// Whether a point lies in the queried city.
    #[must_use]
    pub fn covers(&self, point: &CollectionPoint) -> bool {
        point.region_code == self.region_code && point.city == self.city
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_without_city_is_not_submittable() {
        let filter = SelectionFilter {
            region_code: Some(RegionCode::new("SC")),
            city: None,
            item_ids: BTreeSet::new(),
        };

        assert!(!filter.is_submittable());
        assert_eq!(PointQuery::from_filter(&filter), None);
    }

    #[test]
    fn query_keeps_item_filter() {
        let filter = SelectionFilter {
            region_code: Some(RegionCode::new("SC")),
            city: Some("Tubarão".to_owned()),
            item_ids: BTreeSet::from([ItemId(2), ItemId(5)]),
        };

        let query = PointQuery::from_filter(&filter).expect("filter is complete");
        assert_eq!(query.region_code.as_str(), "SC");
        assert_eq!(query.city, "Tubarão");
        assert_eq!(query.item_ids.len(), 2);
    }
}
