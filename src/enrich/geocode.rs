use crate::error::{MigrationError, Result};
use async_trait::async_trait;
use happy_hours_common::Coordinates;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// 住所 → 緯度経度
///
/// 該当なし・タイムアウトは `Ok(None)`。それ以外の失敗は `Err`（呼び出し側で未解決扱い）。
#[async_trait]
pub trait Geocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>>;
}

/// Nominatim（OpenStreetMap）ジオコーダ
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(address = %address, "ジオコーディングがタイムアウト");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(MigrationError::ApiCall(format!("geocode: HTTP {}", status)));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        parse_search_response(&body)
    }
}

/// `/search?format=json` のレスポンス（先頭の候補を採用）
pub fn parse_search_response(body: &str) -> Result<Option<Coordinates>> {
    let places: Vec<NominatimPlace> = serde_json::from_str(body)
        .map_err(|e| MigrationError::ApiParse(format!("geocode: {}", e)))?;

    match places.first() {
        Some(place) => Ok(Some(Coordinates::parse(&place.lat, &place.lon)?)),
        None => Ok(None),
    }
}
