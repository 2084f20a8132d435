//! Region provider backed by the IBGE localities API (states and municipalities).

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use coleta_core::{
    model::{City, Region, RegionCode},
    ports::{PortError, RegionPort},
};

/// State as returned by /estados
#[derive(Debug, Deserialize)]
struct IbgeState {
    sigla: String,
    nome: String,
    // "id" and "regiao" exist as well, we only need the code and name
}

/// Municipality as returned by /estados/{UF}/municipios
#[derive(Debug, Deserialize)]
struct IbgeMunicipality {
    nome: String,
}

/// Region and city lookup against the IBGE API.
pub struct IbgeRegionPort {
    client: Client,
    base_url: String,
}

impl IbgeRegionPort {
    /// Create a port bound to the given HTTP client and API base URL.
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl RegionPort for IbgeRegionPort {
    async fn regions(&self) -> Result<Vec<Region>, PortError> {
        let req = self
            .client
            .get(format!("{}/estados", self.base_url))
            .query(&[("orderBy", "nome")]);

        let states = fetch_json::<Vec<IbgeState>>(req).await?;
        debug!(count = states.len(), "IBGE states fetched");

        Ok(map_states(states))
    }

    async fn cities(&self, region: &RegionCode) -> Result<Vec<City>, PortError> {
        let uf = region.as_str().trim();
        if uf.is_empty() || !uf.chars().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(PortError::Internal(format!("invalid region code {uf:?}")));
        }

        let req = self
            .client
            .get(format!("{}/estados/{uf}/municipios", self.base_url))
            .query(&[("orderBy", "nome")]);

        let municipalities = fetch_json::<Vec<IbgeMunicipality>>(req).await?;
        debug!(%region, count = municipalities.len(), "IBGE municipalities fetched");

        Ok(map_municipalities(municipalities, region))
    }
}

/// Build the region port for the IBGE API.
#[must_use]
pub fn provider(client: Client, base_url: &str) -> Arc<dyn RegionPort> {
    Arc::new(IbgeRegionPort::new(client, base_url))
}

fn map_states(states: Vec<IbgeState>) -> Vec<Region> {
    states
        .into_iter()
        .filter(|state| !state.sigla.trim().is_empty())
        .map(|state| Region {
            code: RegionCode::new(state.sigla.trim().to_ascii_uppercase()),
            name: state.nome.trim().to_owned(),
        })
        .collect()
}

fn map_municipalities(municipalities: Vec<IbgeMunicipality>, region: &RegionCode) -> Vec<City> {
    municipalities
        .into_iter()
        .map(|municipality| municipality.nome.trim().to_owned())
        .filter(|name| !name.is_empty())
        .map(|name| City {
            name,
            region_code: region.clone(),
        })
        .collect()
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}
