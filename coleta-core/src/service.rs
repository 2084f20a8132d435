//! High-level service facade combining catalogs and the point repository.

use std::sync::Arc;

use tracing::warn;

use crate::catalog::{ItemCatalog, RegionCatalog};
use crate::error::ColetaError;
use crate::model::{City, CollectionPoint, PointId, PointQuery, Region, RegionCode};
use crate::providers::ProviderSet;
use crate::repository::PointRepository;

/// Public entry point for loading regions, cities, and collection points.
pub struct ColetaService {
    regions: RegionCatalog,
    items: Arc<ItemCatalog>,
    points: PointRepository,
}

impl ColetaService {
    /// Create a service with an already loaded item catalog.
    #[must_use]
    pub fn new(providers: &ProviderSet, items: ItemCatalog) -> Self {
        let items = Arc::new(items);
        Self {
            regions: RegionCatalog::new(Arc::clone(&providers.regions)),
            points: PointRepository::new(Arc::clone(&providers.points), Arc::clone(&items)),
            items,
        }
    }

    /// Create a service, loading the item catalog from the providers.
    ///
    /// When the items cannot be fetched, `fallback` is used instead.
    pub async fn connect(providers: &ProviderSet, fallback: ItemCatalog) -> Self {
        let items = match ItemCatalog::load(providers.items.as_ref()).await {
            Ok(items) => items,
            Err(err) => {
                warn!(%err, "using built-in item catalog");
                fallback
            }
        };
        Self::new(providers, items)
    }

    /// Item vocabulary.
    #[must_use]
    pub fn items(&self) -> &ItemCatalog {
        &self.items
    }

    /// Display titles of the items a point accepts.
    #[must_use]
    pub fn item_labels(&self, point: &CollectionPoint) -> Vec<String> {
        self.items
            .labels(&point.items)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// All regions, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`ColetaError::CatalogUnavailable`] when the provider call fails.
    pub async fn list_regions(&self) -> Result<Vec<Region>, ColetaError> {
        self.regions.list_regions().await
    }

    /// Cities of a region, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`ColetaError::CatalogUnavailable`] when the provider call fails.
    pub async fn list_cities(&self, region: &RegionCode) -> Result<Vec<City>, ColetaError> {
        self.regions.list_cities(region).await
    }

    /// Collection points for a complete selection.
    ///
    /// # Errors
    ///
    /// Returns [`ColetaError::Retrieval`] when the provider call fails.
    pub async fn query(&self, query: &PointQuery) -> Result<Vec<CollectionPoint>, ColetaError> {
        self.points.query(query).await
    }

    /// One collection point.
    ///
    /// # Errors
    ///
    /// Returns [`ColetaError::NotFound`] for unknown ids and [`ColetaError::Retrieval`]
    /// when the provider call fails.
    pub async fn get_by_id(&self, id: PointId) -> Result<CollectionPoint, ColetaError> {
        self.points.get_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use async_trait::async_trait;

    use super::*;
    use crate::model::{Coordinate, ItemCategory, ItemId, PointRecord};
    use crate::ports::{ItemPort, PointPort, PortError, RegionPort};

    struct Backend {
        items_online: bool,
    }

    #[async_trait]
    impl RegionPort for Backend {
        async fn regions(&self) -> Result<Vec<Region>, PortError> {
            Ok(Vec::new())
        }

        async fn cities(&self, _region: &RegionCode) -> Result<Vec<City>, PortError> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl ItemPort for Backend {
        async fn items(&self) -> Result<Vec<ItemCategory>, PortError> {
            if !self.items_online {
                return Err(PortError::Internal("items endpoint down".to_owned()));
            }
            Ok(vec![ItemCategory {
                id: ItemId(10),
                title: "Vidro".to_owned(),
                icon_ref: "http://localhost:3333/uploads/vidro.svg".to_owned(),
            }])
        }
    }

    #[async_trait]
    impl PointPort for Backend {
        async fn points(&self, _query: &PointQuery) -> Result<Vec<PointRecord>, PortError> {
            Ok(Vec::new())
        }

        async fn point(&self, _id: u64) -> Result<Option<PointRecord>, PortError> {
            Ok(None)
        }
    }

    async fn connect(items_online: bool) -> ColetaService {
        let backend = Arc::new(Backend { items_online });
        let providers = ProviderSet::with_backend(Arc::new(Backend { items_online }), backend);
        ColetaService::connect(&providers, ItemCatalog::builtin("http://localhost:3333")).await
    }

    fn point(items: &[u32]) -> CollectionPoint {
        CollectionPoint {
            id: PointId(1),
            name: "Ecoponto Centro".to_owned(),
            email: String::new(),
            whatsapp_number: String::new(),
            image_ref: String::new(),
            city: "Tubarão".to_owned(),
            region_code: RegionCode::new("SC"),
            coordinate: Coordinate {
                latitude: -28.48,
                longitude: -49.0,
            },
            items: items.iter().copied().map(ItemId).collect::<BTreeSet<_>>(),
        }
    }

    #[tokio::test]
    async fn failed_item_load_falls_back_to_builtin_catalog() {
        let service = connect(false).await;

        let categories = service.items().list_categories();
        assert_eq!(categories.len(), 6);
        assert!(
            categories
                .iter()
                .all(|item| item.icon_ref.starts_with("http://localhost:3333/uploads/"))
        );
        assert_eq!(
            service.item_labels(&point(&[6, 1])),
            ["Lâmpadas", "Óleo de Cozinha"]
        );
    }

    #[tokio::test]
    async fn remote_items_replace_builtin_catalog() {
        let service = connect(true).await;

        assert_eq!(service.items().list_categories().len(), 1);
        assert_eq!(service.item_labels(&point(&[10, 1])), ["Vidro"]);
    }

    #[tokio::test]
    async fn unknown_point_is_not_found() {
        let service = connect(true).await;

        let err = service
            .get_by_id(PointId(42))
            .await
            .expect_err("backend knows no points");

        assert!(matches!(err, ColetaError::NotFound(PointId(42))));
    }
}
