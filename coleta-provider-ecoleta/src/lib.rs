//! Item and collection point provider for the Ecoleta backend API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use coleta_core::{
    model::{ItemCategory, ItemId, PointQuery, PointRecord},
    ports::{ItemPort, PointPort, PortError},
};

/// Item as returned by /items
#[derive(Debug, Deserialize)]
struct ItemEntry {
    id: u32,
    title: String,
    image_url: String,
}

/// Title-only item reference attached to points
#[derive(Debug, Deserialize)]
struct ItemTitle {
    title: String,
}

/// Point as returned by /points and inside /points/{id}
#[derive(Debug, Deserialize)]
struct PointEntry {
    id: u64,
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    whatsapp: String,
    // stored file name; the backend also serializes a full image_url
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    city: String,
    uf: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    items: Vec<ItemTitle>,
}

/// Response from /points/{id}
#[derive(Debug, Deserialize)]
struct PointDetailResponse {
    point: PointEntry,
    #[serde(default)]
    items: Vec<ItemTitle>,
}

/// Client for the Ecoleta backend, serving both items and points.
pub struct EcoletaBackend {
    client: Client,
    base_url: String,
}

impl EcoletaBackend {
    /// Create a backend client bound to the given HTTP client and API base URL.
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn upload_url(&self, file: &str) -> String {
        format!("{}/uploads/{file}", self.base_url)
    }

    fn to_record(&self, entry: PointEntry, extra_items: Vec<ItemTitle>) -> PointRecord {
        let image_url = entry
            .image_url
            .filter(|url| !url.trim().is_empty())
            .or_else(|| entry.image.as_deref().map(|file| self.upload_url(file)))
            .unwrap_or_default();

        PointRecord {
            id: entry.id,
            name: entry.name,
            email: entry.email,
            whatsapp: entry.whatsapp,
            image_url,
            city: entry.city,
            uf: entry.uf.trim().to_ascii_uppercase(),
            latitude: entry.latitude,
            longitude: entry.longitude,
            item_titles: entry
                .items
                .into_iter()
                .chain(extra_items)
                .map(|item| item.title)
                .collect(),
        }
    }
}

#[async_trait]
impl ItemPort for EcoletaBackend {
    async fn items(&self) -> Result<Vec<ItemCategory>, PortError> {
        let entries =
            fetch_json::<Vec<ItemEntry>>(self.client.get(format!("{}/items", self.base_url)))
                .await?;

        Ok(entries
            .into_iter()
            .map(|entry| ItemCategory {
                id: ItemId(entry.id),
                title: entry.title,
                icon_ref: entry.image_url,
            })
            .collect())
    }
}

#[async_trait]
impl PointPort for EcoletaBackend {
    async fn points(&self, query: &PointQuery) -> Result<Vec<PointRecord>, PortError> {
        let mut params = vec![
            ("city", query.city.clone()),
            ("uf", query.region_code.to_string()),
        ];
        // no "items" parameter at all means unfiltered
        if let Some(items) = items_param(query) {
            params.push(("items", items));
        }

        let req = self
            .client
            .get(format!("{}/points", self.base_url))
            .query(&params);
        let entries = fetch_json::<Vec<PointEntry>>(req).await?;
        debug!(count = entries.len(), "points fetched");

        Ok(entries
            .into_iter()
            .map(|entry| self.to_record(entry, Vec::new()))
            .collect())
    }

    async fn point(&self, id: u64) -> Result<Option<PointRecord>, PortError> {
        let resp = self
            .client
            .get(format!("{}/points/{id}", self.base_url))
            .send()
            .await
            .map_err(PortError::from)?;

        // the backend answers unknown ids with 400 "Point not found."
        if matches!(resp.status(), StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST) {
            debug!(id, status = %resp.status(), "point not found");
            return Ok(None);
        }

        let detail = resp
            .error_for_status()
            .map_err(PortError::from)?
            .json::<PointDetailResponse>()
            .await
            .map_err(PortError::from)?;

        Ok(Some(self.to_record(detail.point, detail.items)))
    }
}

/// Build the backend client shared by the item and point ports.
#[must_use]
pub fn provider(client: Client, base_url: &str) -> Arc<EcoletaBackend> {
    Arc::new(EcoletaBackend::new(client, base_url))
}

/// Comma-separated item ids, `None` for an empty filter.
fn items_param(query: &PointQuery) -> Option<String> {
    if query.item_ids.is_empty() {
        return None;
    }
    Some(
        query
            .item_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(","),
    )
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
