// Shared mock providers for integration tests.

use anyhow::Result;
use async_trait::async_trait;

use jobscout::providers::EmbeddingProvider;

/// Deterministic word-bag embedder: hashes each whitespace token into one
/// of 256 buckets. Cosine similarity between two bags then approximates
/// vocabulary overlap, which is enough to test ranking directionality.
pub struct BagEmbedder;

pub fn bag_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; 256];
    for word in text.split_whitespace() {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        for b in word.to_lowercase().bytes() {
            h ^= u64::from(b);
            h = h.wrapping_mul(0x0000_0100_0000_01b3);
        }
        v[(h % 256) as usize] += 1.0;
    }
    v
}

#[async_trait]
impl EmbeddingProvider for BagEmbedder {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        Ok(bag_vector(text))
    }
}

/// Geocoder with a tiny fixed gazetteer.
pub struct FixedGeocoder;

#[async_trait]
impl jobscout::providers::Geocoder for FixedGeocoder {
    async fn geocode(&self, location: &str) -> Result<Option<(f64, f64)>> {
        let name = location.to_lowercase();
        if name.contains("berlin") {
            Ok(Some((52.52, 13.405)))
        } else if name.contains("munich") {
            Ok(Some((48.1374, 11.5755)))
        } else {
            Ok(None)
        }
    }
}
