//! Runtime configuration read from environment variables.

use std::env;
use std::ops::RangeInclusive;

use crate::projector::Viewport;

/// Default base URL of the collection point backend.
pub const DEFAULT_API_URL: &str = "http://localhost:3333";
/// Default base URL of the IBGE localities API.
pub const DEFAULT_REGIONS_URL: &str = "https://servicodados.ibge.gov.br/api/v1/localidades";
/// Default fallback latitude.
pub const DEFAULT_FALLBACK_LAT: f64 = -27.209_205_2;
/// Default fallback longitude.
pub const DEFAULT_FALLBACK_LNG: f64 = -49.640_109_2;
/// Default fallback span in degrees.
pub const DEFAULT_FALLBACK_DELTA: f64 = 0.014;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Configuration value that cannot be used.
pub enum ConfigError {
    /// The value is not a number.
    #[error("{var} must be a number, got {value:?}")]
    NotANumber {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
    /// The number is outside the allowed range.
    #[error("{var} is out of range: {value}")]
    OutOfRange {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
/// Settings shared by the providers and the front end.
pub struct ColetaConfig {
    /// Base URL of the collection point backend, without trailing slash.
    pub api_url: String,
    /// Base URL of the region provider, without trailing slash.
    pub regions_url: String,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Viewport shown when no point is known.
    pub fallback_viewport: Viewport,
}

impl Default for ColetaConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            regions_url: DEFAULT_REGIONS_URL.to_owned(),
            user_agent: default_user_agent(),
            fallback_viewport: Viewport::new(
                DEFAULT_FALLBACK_LAT,
                DEFAULT_FALLBACK_LNG,
                DEFAULT_FALLBACK_DELTA,
            ),
        }
    }
}

impl ColetaConfig {
    /// Read `COLETA_*` variables from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a fallback coordinate is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a fallback coordinate is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let latitude = number(&lookup, "COLETA_FALLBACK_LAT", DEFAULT_FALLBACK_LAT, -90.0..=90.0)?;
        let longitude = number(
            &lookup,
            "COLETA_FALLBACK_LNG",
            DEFAULT_FALLBACK_LNG,
            -180.0..=180.0,
        )?;
        let delta = number(
            &lookup,
            "COLETA_FALLBACK_DELTA",
            DEFAULT_FALLBACK_DELTA,
            f64::MIN_POSITIVE..=180.0,
        )?;

        Ok(Self {
            api_url: sanitize_base_url(
                &lookup("COLETA_API_URL").unwrap_or_default(),
                DEFAULT_API_URL,
            ),
            regions_url: sanitize_base_url(
                &lookup("COLETA_REGIONS_URL").unwrap_or_default(),
                DEFAULT_REGIONS_URL,
            ),
            user_agent: lookup("COLETA_USER_AGENT")
                .map(|agent| agent.trim().to_owned())
                .filter(|agent| !agent.is_empty())
                .unwrap_or_else(default_user_agent),
            fallback_viewport: Viewport::new(latitude, longitude, delta),
        })
    }
}

/// Trim whitespace and trailing slashes; blank input yields `default`.
#[must_use]
pub fn sanitize_base_url(raw: &str, default: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        default.to_owned()
    } else {
        trimmed.to_owned()
    }
}

fn default_user_agent() -> String {
    format!("coleta/{}", env!("CARGO_PKG_VERSION"))
}

fn number(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: f64,
    range: RangeInclusive<f64>,
) -> Result<f64, ConfigError> {
    let Some(raw) = lookup(var).filter(|value| !value.trim().is_empty()) else {
        return Ok(default);
    };
    let value: f64 = raw.trim().parse().map_err(|_parse_err| ConfigError::NotANumber {
        var,
        value: raw.clone(),
    })?;
    if !range.contains(&value) {
        return Err(ConfigError::OutOfRange { var, value: raw });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |var: &str| vars.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ColetaConfig::from_lookup(lookup(&[])).expect("defaults are valid");

        assert_eq!(config, ColetaConfig::default());
        assert!(config.user_agent.starts_with("coleta/"));
    }

    #[test]
    fn urls_are_trimmed() {
        let config = ColetaConfig::from_lookup(lookup(&[
            ("COLETA_API_URL", " http://192.168.0.14:3333/// "),
            ("COLETA_REGIONS_URL", "   "),
        ]))
        .expect("valid config");

        assert_eq!(config.api_url, "http://192.168.0.14:3333");
        assert_eq!(config.regions_url, DEFAULT_REGIONS_URL);
    }

    #[test]
    fn fallback_viewport_is_configurable() {
        let config = ColetaConfig::from_lookup(lookup(&[
            ("COLETA_FALLBACK_LAT", "-23.55"),
            ("COLETA_FALLBACK_LNG", "-46.63"),
            ("COLETA_FALLBACK_DELTA", "0.5"),
        ]))
        .expect("valid config");

        assert_eq!(config.fallback_viewport, Viewport::new(-23.55, -46.63, 0.5));
    }

    #[test]
    fn malformed_numbers_are_errors() {
        let err = ColetaConfig::from_lookup(lookup(&[("COLETA_FALLBACK_LAT", "south")]))
            .expect_err("not a number");
        assert!(matches!(err, ConfigError::NotANumber { var: "COLETA_FALLBACK_LAT", .. }));

        let err = ColetaConfig::from_lookup(lookup(&[("COLETA_FALLBACK_DELTA", "0")]))
            .expect_err("zero span");
        assert!(matches!(err, ConfigError::OutOfRange { var: "COLETA_FALLBACK_DELTA", .. }));
    }
}
