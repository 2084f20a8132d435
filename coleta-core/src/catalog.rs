//! Region and item catalogs.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::error::ColetaError;
use crate::model::{City, ItemCategory, ItemId, Region, RegionCode};
use crate::ports::{ItemPort, RegionPort};

/// Case- and accent-insensitive key used for ordering and matching display names.
#[must_use]
pub fn collation_key(name: &str) -> String {
    name.trim()
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase()
}

fn sort_by_name<T>(entries: &mut [T], name_of: impl Fn(&T) -> &str) {
    entries.sort_by_cached_key(|entry| {
        let name = name_of(entry);
        (collation_key(name), name.to_owned())
    });
}

/// Regions and per-region city lists, loaded lazily and cached for the process lifetime.
pub struct RegionCatalog {
    port: Arc<dyn RegionPort>,
    regions: Mutex<Option<Vec<Region>>>,
    cities: Mutex<HashMap<RegionCode, Vec<City>>>,
}

impl RegionCatalog {
    /// Create an empty catalog backed by the given port.
    #[must_use]
    pub fn new(port: Arc<dyn RegionPort>) -> Self {
        Self {
            port,
            regions: Mutex::new(None),
            cities: Mutex::new(HashMap::new()),
        }
    }

    /// All regions, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`ColetaError::CatalogUnavailable`] when the regions cannot be fetched.
    /// Nothing is cached in that case.
    pub async fn list_regions(&self) -> Result<Vec<Region>, ColetaError> {
        let cached = self
            .regions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(regions) = cached {
            debug!(count = regions.len(), "region list served from cache");
            return Ok(regions);
        }

        let mut regions = self
            .port
            .regions()
            .await
            .map_err(ColetaError::CatalogUnavailable)?;
        sort_by_name(&mut regions, |region| region.name.as_str());
        info!(count = regions.len(), "region list loaded");

        let mut slot = self.regions.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slot.get_or_insert(regions).clone())
    }

    /// Cities of a region, sorted by name.
    ///
    /// Every returned city carries `region` as its region code.
    ///
    /// # Errors
    ///
    /// Returns [`ColetaError::CatalogUnavailable`] when the cities cannot be fetched.
    pub async fn list_cities(&self, region: &RegionCode) -> Result<Vec<City>, ColetaError> {
        if let Some(cities) = self.cached_cities(region) {
            debug!(%region, count = cities.len(), "city list served from cache");
            return Ok(cities);
        }

        let mut cities = self
            .port
            .cities(region)
            .await
            .map_err(ColetaError::CatalogUnavailable)?;
        for city in &mut cities {
            city.region_code = region.clone();
        }
        sort_by_name(&mut cities, |city| city.name.as_str());
        info!(%region, count = cities.len(), "city list loaded");

        let mut cache = self.cities.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.entry(region.clone()).or_insert(cities).clone())
    }

    /// Cities of a region if they were loaded before.
    #[must_use]
    pub fn cached_cities(&self, region: &RegionCode) -> Option<Vec<City>> {
        self.cities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(region)
            .cloned()
    }
}

/// Built-in categories as `(id, title, icon file)`.
const BUILTIN_ITEMS: [(u32, &str, &str); 6] = [
    (1, "Lâmpadas", "lampadas.svg"),
    (2, "Pilhas e Baterias", "baterias.svg"),
    (3, "Papéis e Papelão", "papeis-papelao.svg"),
    (4, "Resíduos Eletrônicos", "eletronicos.svg"),
    (5, "Resíduos Orgânicos", "organicos.svg"),
    (6, "Óleo de Cozinha", "oleo.svg"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Immutable vocabulary of waste item categories.
pub struct ItemCatalog {
    items: Vec<ItemCategory>,
}

impl ItemCatalog {
    /// Build a catalog from the given categories, keeping their order.
    ///
    /// Later duplicates of an id are ignored.
    #[must_use]
    pub fn new(items: Vec<ItemCategory>) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.id))
            .collect();
        Self { items }
    }

    /// The default categories, with icons resolved below `{base_url}/uploads/`.
    #[must_use]
    pub fn builtin(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self::new(
            BUILTIN_ITEMS
                .iter()
                .map(|(id, title, icon)| ItemCategory {
                    id: ItemId(*id),
                    title: (*title).to_owned(),
                    icon_ref: format!("{base}/uploads/{icon}"),
                })
                .collect(),
        )
    }

    /// Load the catalog from a remote source.
    ///
    /// # Errors
    ///
    /// Returns [`ColetaError::CatalogUnavailable`] when the items cannot be fetched.
    pub async fn load(port: &dyn ItemPort) -> Result<Self, ColetaError> {
        let items = port
            .items()
            .await
            .map_err(ColetaError::CatalogUnavailable)?;
        info!(count = items.len(), "item catalog loaded");
        Ok(Self::new(items))
    }

    /// Every category, in catalog order.
    #[must_use]
    pub fn list_categories(&self) -> &[ItemCategory] {
        &self.items
    }

    /// Category by id.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&ItemCategory> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Id of the category with this title, ignoring case and accents.
    #[must_use]
    pub fn resolve_title(&self, title: &str) -> Option<ItemId> {
        let key = collation_key(title);
        self.items
            .iter()
            .find(|item| collation_key(&item.title) == key)
            .map(|item| item.id)
    }

    /// Titles of the given ids, in catalog order. Unknown ids are skipped.
    #[must_use]
    pub fn labels(&self, ids: &BTreeSet<ItemId>) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| ids.contains(&item.id))
            .map(|item| item.title.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::ports::PortError;

    struct CountingRegions {
        region_calls: AtomicUsize,
        city_calls: AtomicUsize,
        fail: bool,
    }

    impl CountingRegions {
        fn new(fail: bool) -> Self {
            Self {
                region_calls: AtomicUsize::new(0),
                city_calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl RegionPort for CountingRegions {
        async fn regions(&self) -> Result<Vec<Region>, PortError> {
            self.region_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PortError::Internal("offline".to_owned()));
            }
            Ok(vec![
                Region {
                    code: RegionCode::new("SP"),
                    name: "São Paulo".to_owned(),
                },
                Region {
                    code: RegionCode::new("AC"),
                    name: "Acre".to_owned(),
                },
                Region {
                    code: RegionCode::new("AP"),
                    name: "Amapá".to_owned(),
                },
                Region {
                    code: RegionCode::new("AM"),
                    name: "Amazonas".to_owned(),
                },
            ])
        }

        async fn cities(&self, region: &RegionCode) -> Result<Vec<City>, PortError> {
            self.city_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PortError::Internal("offline".to_owned()));
            }
            Ok(["Tubarão", "Araranguá", "Laguna"]
                .into_iter()
                .map(|name| City {
                    name: name.to_owned(),
                    region_code: RegionCode::new(format!("{region}?")),
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn regions_are_sorted_and_cached() {
        let port = Arc::new(CountingRegions::new(false));
        let catalog = RegionCatalog::new(port.clone());

        let first = catalog.list_regions().await.expect("regions load");
        let second = catalog.list_regions().await.expect("regions cached");

        let names: Vec<&str> = first.iter().map(|region| region.name.as_str()).collect();
        assert_eq!(names, ["Acre", "Amapá", "Amazonas", "São Paulo"]);
        assert_eq!(first, second);
        assert_eq!(port.region_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cities_are_cached_per_region_and_stamped() {
        let port = Arc::new(CountingRegions::new(false));
        let catalog = RegionCatalog::new(port.clone());
        let santa_catarina = RegionCode::new("SC");

        assert!(catalog.cached_cities(&santa_catarina).is_none());
        let cities = catalog
            .list_cities(&santa_catarina)
            .await
            .expect("cities load");
        catalog
            .list_cities(&santa_catarina)
            .await
            .expect("cities cached");
        catalog
            .list_cities(&RegionCode::new("SP"))
            .await
            .expect("other region loads");

        let names: Vec<&str> = cities.iter().map(|city| city.name.as_str()).collect();
        assert_eq!(names, ["Araranguá", "Laguna", "Tubarão"]);
        assert!(cities.iter().all(|city| city.region_code == santa_catarina));
        assert_eq!(port.city_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failures_surface_as_catalog_unavailable_and_are_not_cached() {
        let port = Arc::new(CountingRegions::new(true));
        let catalog = RegionCatalog::new(port.clone());

        let err = catalog.list_regions().await.expect_err("port is offline");
        assert!(matches!(err, ColetaError::CatalogUnavailable(_)));
        let err = catalog
            .list_cities(&RegionCode::new("SC"))
            .await
            .expect_err("port is offline");
        assert!(matches!(err, ColetaError::CatalogUnavailable(_)));

        assert!(catalog.list_regions().await.is_err());
        assert_eq!(port.region_calls.load(Ordering::SeqCst), 2);
        assert!(catalog.cached_cities(&RegionCode::new("SC")).is_none());
    }

    #[test]
    fn collation_ignores_case_and_accents() {
        assert_eq!(collation_key("  Óleo de Cozinha"), "oleo de cozinha");
        assert_eq!(collation_key("São Paulo"), collation_key("sao paulo"));
    }

    #[test]
    fn builtin_items_resolve_titles_and_labels() {
        let catalog = ItemCatalog::builtin("http://localhost:3333/");

        assert_eq!(catalog.list_categories().len(), 6);
        assert_eq!(catalog.resolve_title("oleo de cozinha"), Some(ItemId(6)));
        assert_eq!(catalog.resolve_title("Vidro"), None);
        assert_eq!(
            catalog.get(ItemId(6)).map(|item| item.icon_ref.as_str()),
            Some("http://localhost:3333/uploads/oleo.svg")
        );

        let labels = catalog.labels(&BTreeSet::from([ItemId(5), ItemId(1), ItemId(99)]));
        assert_eq!(labels, ["Lâmpadas", "Resíduos Orgânicos"]);
    }

    #[test]
    fn duplicate_item_ids_keep_first() {
        let catalog = ItemCatalog::new(vec![
            ItemCategory {
                id: ItemId(1),
                title: "Lâmpadas".to_owned(),
                icon_ref: String::new(),
            },
            ItemCategory {
                id: ItemId(1),
                title: "Pilhas".to_owned(),
                icon_ref: String::new(),
            },
        ]);

        assert_eq!(catalog.list_categories().len(), 1);
        assert_eq!(
            catalog.get(ItemId(1)).map(|item| item.title.as_str()),
            Some("Lâmpadas")
        );
    }
}
