use std::collections::HashMap;
use std::sync::Mutex;

use crate::providers::Geocoder;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Process-wide geocode cache, keyed by lowercased location name.
///
/// The one legitimate shared mutable structure in the pipeline: safe for
/// concurrent read/insert, purely an optimization (correctness never depends
/// on a hit). Unknown locations are cached as `None` so repeated misses do
/// not re-query the provider; transient provider errors are not cached.
#[derive(Default)]
pub struct GeocodeCache {
    entries: Mutex<HashMap<String, Option<(f64, f64)>>>,
}

impl GeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a location name to coordinates through the cache.
    pub async fn resolve(&self, geocoder: &dyn Geocoder, location: &str) -> Option<(f64, f64)> {
        let name = location.trim();
        if name.is_empty() {
            return None;
        }
        let key = name.to_lowercase();

        if let Some(cached) = self.entries.lock().expect("geocode cache poisoned").get(&key) {
            return *cached;
        }

        match geocoder.geocode(name).await {
            Ok(coords) => {
                self.entries
                    .lock()
                    .expect("geocode cache poisoned")
                    .insert(key, coords);
                coords
            }
            Err(e) => {
                tracing::warn!(location = name, "geocoding failed: {e:#}");
                None
            }
        }
    }
}

/// Great-circle distance between two (lat, lon) pairs in kilometers.
pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
