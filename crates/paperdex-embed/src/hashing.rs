use std::hash::{Hash, Hasher};

use twox_hash::XxHash64;

use paperdex_core::ranking::normalize;
use paperdex_core::traits::Embedder;
use paperdex_core::{Error, Result};

/// Deterministic bag-of-tokens embedder: every lower-cased token is hashed
/// into one of `dimension` buckets and the vector is L2-normalized. Texts that
/// share tokens get positive cosine similarity, which is enough for tests and
/// offline runs without a provider.
pub struct HashingEmbedder {
    dimension: usize,
    model_id: String,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::config("embedding.dimension must be greater than 0"));
        }
        Ok(Self { dimension, model_id: format!("hashing-{dimension}") })
    }

    pub fn dimension(&self) -> usize { self.dimension }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dimension];
        for token in text.split_whitespace() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dimension;
            let val = ((h >> 32) as u32) as f32 / u32::MAX as f32;
            v[idx] += 0.5 + val;
        }
        normalize(&mut v);
        v
    }
}

impl Embedder for HashingEmbedder {
    fn model_id(&self) -> &str { &self.model_id }

    fn embed_documents(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
