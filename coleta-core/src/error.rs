//! Error taxonomy surfaced by the catalogs, the repository, and the selection state.

use crate::model::PointId;
use crate::ports::PortError;
use crate::selection::TransitionError;

#[derive(thiserror::Error, Debug)]
/// Failures surfaced to callers of the core.
pub enum ColetaError {
    /// Regions, cities, or items could not be loaded.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(#[source] PortError),
    /// Point query or lookup failed in transit or on the server.
    #[error("Could not retrieve collection points: {0}")]
    Retrieval(#[source] PortError),
    /// No collection point has this id.
    #[error("Collection point {0} not found")]
    NotFound(PointId),
    /// Selection operation called in a state that does not allow it.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
}

impl ColetaError {
    /// Whether re-issuing the same operation may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CatalogUnavailable(_) | Self::Retrieval(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_failures_are_retryable() {
        let unavailable = ColetaError::CatalogUnavailable(PortError::Internal("down".to_owned()));
        let missing = ColetaError::NotFound(PointId(42));

        assert!(unavailable.is_retryable());
        assert!(!missing.is_retryable());
        assert_eq!(missing.to_string(), "Collection point 42 not found");
    }
}
