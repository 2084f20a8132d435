//! Map viewport and marker derivation from a point set.

use serde::{Deserialize, Serialize};

use crate::model::{CollectionPoint, Coordinate, PointId};

/// Extra room around the bounding box of the points.
const PADDING_FACTOR: f64 = 1.4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Visible extent of the map in degrees.
pub struct Span {
    /// Latitude extent.
    pub lat_delta: f64,
    /// Longitude extent.
    pub lng_delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Initial map region.
pub struct Viewport {
    /// Center of the map.
    pub center: Coordinate,
    /// Visible extent.
    pub span: Span,
}

impl Viewport {
    /// Square viewport around a center.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, delta: f64) -> Self {
        Self {
            center: Coordinate {
                latitude,
                longitude,
            },
            span: Span {
                lat_delta: delta,
                lng_delta: delta,
            },
        }
    }

    /// Whether a coordinate lies within the viewport.
    #[must_use]
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (coordinate.latitude - self.center.latitude).abs() <= self.span.lat_delta / 2.0
            && (coordinate.longitude - self.center.longitude).abs() <= self.span.lng_delta / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Marker for one collection point.
pub struct Marker {
    /// Point the marker stands for.
    pub id: PointId,
    /// Marker position.
    pub coordinate: Coordinate,
    /// Label shown with the marker.
    pub title: String,
}

impl Marker {
    /// Selecting a marker yields the id to look up in the repository.
    #[must_use]
    pub fn select(&self) -> PointId {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Derives viewport and markers for a point set.
pub struct MapProjector {
    fallback: Viewport,
}

impl MapProjector {
    /// Projector that shows `fallback` when there is nothing to frame.
    ///
    /// The fallback span is also the smallest span ever produced.
    #[must_use]
    pub fn new(fallback: Viewport) -> Self {
        Self { fallback }
    }

    /// Viewport used for empty point sets.
    #[must_use]
    pub fn fallback(&self) -> Viewport {
        self.fallback
    }

    /// Viewport framing every point; the fallback when `points` is empty.
    #[must_use]
    pub fn initial_viewport(&self, points: &[CollectionPoint]) -> Viewport {
        let mut coordinates = points.iter().map(|point| point.coordinate);
        let Some(first) = coordinates.next() else {
            return self.fallback;
        };

        let (south, north, west, east) = coordinates.fold(
            (first.latitude, first.latitude, first.longitude, first.longitude),
            |(south, north, west, east), coordinate| {
                (
                    south.min(coordinate.latitude),
                    north.max(coordinate.latitude),
                    west.min(coordinate.longitude),
                    east.max(coordinate.longitude),
                )
            },
        );

        Viewport {
            center: Coordinate {
                latitude: (south + north) / 2.0,
                longitude: (west + east) / 2.0,
            },
            span: Span {
                lat_delta: ((north - south) * PADDING_FACTOR).max(self.fallback.span.lat_delta),
                lng_delta: ((east - west) * PADDING_FACTOR).max(self.fallback.span.lng_delta),
            },
        }
    }

    /// One marker per point, in input order.
    #[must_use]
    pub fn to_markers(&self, points: &[CollectionPoint]) -> Vec<Marker> {
        points
            .iter()
            .map(|point| Marker {
                id: point.id,
                coordinate: point.coordinate,
                title: point.name.clone(),
            })
            .collect()
    }
}
