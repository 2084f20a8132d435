//! Bundle of provider ports backing the service.

use std::sync::Arc;

use crate::ports::{ItemPort, PointPort, RegionPort};

/// Ports implementing the remote sources used by [`crate::service::ColetaService`].
#[derive(Clone)]
pub struct ProviderSet {
    /// Source of regions and cities.
    pub regions: Arc<dyn RegionPort>,
    /// Source of item categories.
    pub items: Arc<dyn ItemPort>,
    /// Source of collection points.
    pub points: Arc<dyn PointPort>,
}

impl ProviderSet {
    /// Bundle the given ports.
    #[must_use]
    pub fn new(
        regions: Arc<dyn RegionPort>,
        items: Arc<dyn ItemPort>,
        points: Arc<dyn PointPort>,
    ) -> Self {
        Self {
            regions,
            items,
            points,
        }
    }

    /// Use one backend for both items and points.
    #[must_use]
    pub fn with_backend<B>(regions: Arc<dyn RegionPort>, backend: Arc<B>) -> Self
    where
        B: ItemPort + PointPort + 'static,
    {
        let items = Arc::clone(&backend);
        Self {
            regions,
            items,
            points: backend,
        }
    }
}
