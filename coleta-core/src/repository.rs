//! Collection point retrieval with record validation and deduplication.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::ItemCatalog;
use crate::error::ColetaError;
use crate::model::{CollectionPoint, Coordinate, PointId, PointQuery, PointRecord, RegionCode};
use crate::ports::{PointPort, PortError};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Reasons a provider record is not a valid collection point.
pub enum InvalidRecord {
    /// None of the record's item titles is in the catalog.
    #[error("point {0} accepts no known item")]
    NoKnownItems(PointId),
    /// Coordinates are not finite numbers.
    #[error("point {0} has no usable coordinates")]
    BadCoordinate(PointId),
}

/// Turn a provider record into a [`CollectionPoint`], resolving item titles via the catalog.
///
/// # Errors
///
/// Returns an [`InvalidRecord`] when no item resolves or the coordinates are not finite.
pub fn validate_record(
    record: PointRecord,
    catalog: &ItemCatalog,
) -> Result<CollectionPoint, InvalidRecord> {
    let id = PointId(record.id);
    if !record.latitude.is_finite() || !record.longitude.is_finite() {
        return Err(InvalidRecord::BadCoordinate(id));
    }

    let items: BTreeSet<_> = record
        .item_titles
        .iter()
        .filter_map(|title| catalog.resolve_title(title))
        .collect();
    if items.is_empty() {
        return Err(InvalidRecord::NoKnownItems(id));
    }

    Ok(CollectionPoint {
        id,
        name: record.name,
        email: record.email,
        whatsapp_number: record.whatsapp,
        image_ref: record.image_url,
        city: record.city,
        region_code: RegionCode(record.uf),
        coordinate: Coordinate {
            latitude: record.latitude,
            longitude: record.longitude,
        },
        items,
    })
}

/// Fetches collection points for a selection, or a single point by id.
pub struct PointRepository {
    port: Arc<dyn PointPort>,
    catalog: Arc<ItemCatalog>,
}

impl PointRepository {
    /// Create a repository over a port, resolving item titles against `catalog`.
    #[must_use]
    pub fn new(port: Arc<dyn PointPort>, catalog: Arc<ItemCatalog>) -> Self {
        Self { port, catalog }
    }

    /// Catalog used to resolve item titles.
    #[must_use]
    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// Points matching the query, in server order.
    ///
    /// Records that repeat an id, lie outside the queried city, accept no known item, or
    /// (with an item filter) share no requested item are dropped. No match is an empty
    /// vector, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ColetaError::Retrieval`] when the provider request fails.
    pub async fn query(&self, query: &PointQuery) -> Result<Vec<CollectionPoint>, ColetaError> {
        let records = self
            .port
            .points(query)
            .await
            .map_err(ColetaError::Retrieval)?;
        let received = records.len();

        let mut seen = HashSet::new();
        let mut points = Vec::with_capacity(received);
        for record in records {
            let point = match validate_record(record, &self.catalog) {
                Ok(point) => point,
                Err(err) => {
                    warn!(%err, "dropping invalid point record");
                    continue;
                }
            };
            if !query.covers(&point) {
                warn!(
                    id = %point.id,
                    city = %point.city,
                    region = %point.region_code,
                    "dropping point outside the queried city"
                );
                continue;
            }
            if !query.item_ids.is_empty() && point.items.is_disjoint(&query.item_ids) {
                warn!(id = %point.id, "dropping point without any requested item");
                continue;
            }
            if !seen.insert(point.id) {
                debug!(id = %point.id, "collapsing duplicate point");
                continue;
            }
            points.push(point);
        }

        debug!(
            region = %query.region_code,
            city = %query.city,
            received,
            kept = points.len(),
            "point query finished"
        );
        Ok(points)
    }

    /// One point by id.
    ///
    /// # Errors
    ///
    /// Returns [`ColetaError::NotFound`] when the provider does not know the id and
    /// [`ColetaError::Retrieval`] when the request fails or the record is unusable.
    pub async fn get_by_id(&self, id: PointId) -> Result<CollectionPoint, ColetaError> {
        let record = self
            .port
            .point(id.0)
            .await
            .map_err(ColetaError::Retrieval)?
            .ok_or(ColetaError::NotFound(id))?;

        validate_record(record, &self.catalog)
            .map_err(|err| ColetaError::Retrieval(PortError::Decode(err.to_string())))
    }
}
