//! Traits describing provider capabilities and the transport-level error type.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{City, ItemCategory, PointQuery, PointRecord, Region, RegionCode};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to provider backends.
pub enum PortError {
    /// Network layer failed or the server answered with an error status.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Provider response could not be interpreted.
    #[error("Decode error: {0}")]
    Decode(String),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
/// Source of regions and their cities.
pub trait RegionPort: Send + Sync {
    /// Fetch every region.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn regions(&self) -> Result<Vec<Region>, PortError>;

    /// Fetch the cities of one region.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn cities(&self, region: &RegionCode) -> Result<Vec<City>, PortError>;
}

#[async_trait]
/// Source of the waste item vocabulary.
pub trait ItemPort: Send + Sync {
    /// Fetch every item category.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn items(&self) -> Result<Vec<ItemCategory>, PortError>;
}

#[async_trait]
/// Source of collection points.
pub trait PointPort: Send + Sync {
    /// Fetch the raw records matching a query.
    ///
    /// An empty item filter must be sent as "no filter".
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn points(&self, query: &PointQuery) -> Result<Vec<PointRecord>, PortError>;

    /// Fetch one record, `None` when the provider does not know the id.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the provider request fails.
    async fn point(&self, id: u64) -> Result<Option<PointRecord>, PortError>;
}
