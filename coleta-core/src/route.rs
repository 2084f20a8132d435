//! Validated navigation targets.
//!
//! Screens never receive untyped payloads: raw key/value parameters are checked once in
//! [`Route::from_params`] and every screen works with the typed route afterwards.

use std::collections::HashMap;

use crate::model::{PointId, RegionCode};
use crate::selection::SelectionState;

/// Screen name of [`Route::Home`].
pub const HOME: &str = "home";
/// Screen name of [`Route::Points`].
pub const POINTS: &str = "points";
/// Screen name of [`Route::Detail`].
pub const DETAIL: &str = "detail";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Navigation payload that cannot be turned into a [`Route`].
pub enum RouteError {
    /// The screen name is not known.
    #[error("Unknown screen: {0}")]
    UnknownScreen(String),
    /// A required parameter is absent or blank.
    #[error("Screen {screen} requires parameter {param}")]
    MissingParam {
        /// Target screen.
        screen: &'static str,
        /// Missing parameter.
        param: &'static str,
    },
    /// A parameter has an unusable value.
    #[error("Invalid value {value:?} for parameter {param}")]
    InvalidParam {
        /// Offending parameter.
        param: &'static str,
        /// Value that was given.
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Points screen target: the city to search in.
pub struct PointsRoute {
    /// Region of the city.
    pub region_code: RegionCode,
    /// City to search in.
    pub city: String,
}

impl PointsRoute {
    /// Route for a submittable selection, `None` otherwise.
    #[must_use]
    pub fn from_selection(selection: &SelectionState) -> Option<Self> {
        Some(Self {
            region_code: selection.region()?.clone(),
            city: selection.city()?.to_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Screen to navigate to.
pub enum Route {
    /// Region and city choice.
    Home,
    /// Map and list of points in a city.
    Points(PointsRoute),
    /// One collection point.
    Detail(PointId),
}

impl Route {
    /// Validate a raw navigation payload.
    ///
    /// `points` requires `uf` and `city`; `detail` requires a numeric `point_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when the screen is unknown or a parameter is missing or
    /// malformed.
    pub fn from_params(screen: &str, params: &HashMap<String, String>) -> Result<Self, RouteError> {
        match screen.trim() {
            HOME => Ok(Self::Home),
            POINTS => {
                let uf = required(params, POINTS, "uf")?;
                if !uf.chars().all(|ch| ch.is_ascii_alphanumeric()) {
                    return Err(RouteError::InvalidParam {
                        param: "uf",
                        value: uf.to_owned(),
                    });
                }
                let city = required(params, POINTS, "city")?;
                Ok(Self::Points(PointsRoute {
                    region_code: RegionCode::new(uf.to_ascii_uppercase()),
                    city: city.to_owned(),
                }))
            }
            DETAIL => {
                let raw = required(params, DETAIL, "point_id")?;
                let id = raw.parse().map_err(|_parse_err| RouteError::InvalidParam {
                    param: "point_id",
                    value: raw.to_owned(),
                })?;
                Ok(Self::Detail(PointId(id)))
            }
            other => Err(RouteError::UnknownScreen(other.to_owned())),
        }
    }

    /// Screen name and parameters, the inverse of [`Route::from_params`].
    #[must_use]
    pub fn to_params(&self) -> (&'static str, HashMap<String, String>) {
        match self {
            Self::Home => (HOME, HashMap::new()),
            Self::Points(route) => (
                POINTS,
                HashMap::from([
                    ("uf".to_owned(), route.region_code.to_string()),
                    ("city".to_owned(), route.city.clone()),
                ]),
            ),
            Self::Detail(id) => (
                DETAIL,
                HashMap::from([("point_id".to_owned(), id.to_string())]),
            ),
        }
    }
}

fn required<'params>(
    params: &'params HashMap<String, String>,
    screen: &'static str,
    param: &'static str,
) -> Result<&'params str, RouteError> {
    params
        .get(param)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or(RouteError::MissingParam { screen, param })
}
