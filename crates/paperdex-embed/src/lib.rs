//! paperdex-embed
//!
//! Embedding providers behind the `Embedder` trait from paperdex-core.
pub mod hashing;
pub mod openai;

use std::sync::Arc;

use paperdex_core::config::EmbeddingConfig;
use paperdex_core::traits::Embedder;
use paperdex_core::{Error, Result};

pub use hashing::HashingEmbedder;
pub use openai::OpenAiEmbedder;

fn fake_embeddings_forced() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Select the provider named by `embedding.provider`. Setting
/// `APP_USE_FAKE_EMBEDDINGS=1` forces the hashing embedder.
pub fn embedder_from_config(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    if fake_embeddings_forced() {
        tracing::info!(dimension = config.dimension, "using hashing embedder (forced)");
        return Ok(Arc::new(HashingEmbedder::new(config.dimension)?));
    }
    match config.provider.as_str() {
        "hashing" => Ok(Arc::new(HashingEmbedder::new(config.dimension)?)),
        "openai" => {
            tracing::info!(model = %config.model, base_url = %config.base_url, "using openai-compatible embedder");
            Ok(Arc::new(OpenAiEmbedder::from_config(config)?))
        }
        other => Err(Error::config(format!("Unknown embedding provider: {other}"))),
    }
}
