use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::providers::Geocoder;

const API_URL: &str = "https://nominatim.openstreetmap.org/search";

/// OSM Nominatim geocoder. Nominatim requires an identifying User-Agent
/// and tolerates at most one request per second; the geocode cache keeps
/// traffic low enough that no extra pacing is needed here.
pub struct NominatimGeocoder {
    client: reqwest::Client,
}

impl NominatimGeocoder {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("jobscout/0.1 (job search pipeline)")
            .build()
            .context("failed to build Nominatim HTTP client")?;
        Ok(NominatimGeocoder { client })
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, location: &str) -> Result<Option<(f64, f64)>> {
        let resp = self
            .client
            .get(API_URL)
            .query(&[("q", location), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .context("Nominatim request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Nominatim returned {status} for '{location}'");
        }

        let places: Vec<Place> = resp
            .json()
            .await
            .context("failed to parse Nominatim response")?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };
        let lat: f64 = place.lat.parse().context("Nominatim lat was not a number")?;
        let lon: f64 = place.lon.parse().context("Nominatim lon was not a number")?;
        Ok(Some((lat, lon)))
    }
}
