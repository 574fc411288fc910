//! Layered configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults, `config.toml`, `config.<env>.toml`
//! and `APP_*` env vars (`__` separates nesting levels, so
//! `APP_INDEXER__TYPE=tfidf` sets `indexer.type`). Settings are read once when
//! an indexer or ranker is constructed.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::ChunkerConfig;
use crate::error::{Error, Result};
use crate::traits::StrategyKind;

pub const ENV_PREFIX: &str = "APP_";

pub struct Config {
    figment: Figment,
}

impl Config {
    /// Load `config.toml`, `config.<env>.toml` and `APP_*` variables from the
    /// working directory, where `<env>` comes from `RUST_ENV` (default `dev`).
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    pub fn load_from(dir: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Toml::file(dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(dir.join("config.test.toml"))),
            other => tracing::debug!(env = other, "no environment-specific config file for this environment"),
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Ok(Self { figment })
    }

    pub fn from_figment(figment: Figment) -> Self { Self { figment } }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed engine settings, validated.
    pub fn engine(&self) -> Result<EngineConfig> {
        let config: EngineConfig = self
            .figment
            .extract()
            .map_err(|e| Error::config(format!("failed to read engine config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub indexer: IndexerConfig,
    pub embedding: EmbeddingConfig,
    pub ranker: RankerConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.indexer.validate()?;
        if self.ranker.top_k == 0 {
            return Err(Error::config("ranker.top_k must be greater than 0"));
        }
        if self.embedding.timeout_secs == 0 {
            return Err(Error::config("embedding.timeout_secs must be greater than 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Strategy name; parsed when the indexer is constructed.
    #[serde(rename = "type")]
    pub kind: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub tfidf: TfidfConfig,
    pub bm25: Bm25Config,
    pub vector: VectorConfig,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        let chunker = ChunkerConfig::default();
        Self {
            kind: StrategyKind::Bm25.as_str().to_string(),
            chunk_size: chunker.chunk_size,
            chunk_overlap: chunker.chunk_overlap,
            top_k: 10,
            tfidf: TfidfConfig::default(),
            bm25: Bm25Config::default(),
            vector: VectorConfig::default(),
        }
    }
}

impl IndexerConfig {
    pub fn strategy(&self) -> Result<StrategyKind> { self.kind.parse() }

    pub fn chunker(&self) -> ChunkerConfig {
        ChunkerConfig { chunk_size: self.chunk_size, chunk_overlap: self.chunk_overlap }
    }

    /// Checks numeric settings. The strategy name is checked by [`Self::strategy`].
    pub fn validate(&self) -> Result<()> {
        self.chunker().validate()?;
        if self.top_k == 0 {
            return Err(Error::config("indexer.top_k must be greater than 0"));
        }
        if self.tfidf.max_features == 0 {
            return Err(Error::config("indexer.tfidf.max_features must be greater than 0"));
        }
        if !(self.bm25.k1 >= 0.0) || !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(Error::config(format!(
                "indexer.bm25 needs k1 >= 0 and 0 <= b <= 1 (got k1={}, b={})",
                self.bm25.k1, self.bm25.b
            )));
        }
        if self.vector.embed_batch_size == 0 {
            return Err(Error::config("indexer.vector.embed_batch_size must be greater than 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfidfConfig {
    pub max_features: usize,
    pub normalize: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self { Self { max_features: 5000, normalize: true } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Config {
    pub k1: f32,
    pub b: f32,
}

impl Default for Bm25Config {
    fn default() -> Self { Self { k1: 1.5, b: 0.75 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    /// `memory` or `lancedb`.
    pub store: String,
    /// Location of the persistent store; `~` and `$VAR` are expanded.
    pub uri: String,
    pub collection_prefix: String,
    pub embed_batch_size: usize,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            store: "memory".to_string(),
            uri: "paperdex_vectors".to_string(),
            collection_prefix: "chunks".to_string(),
            embed_batch_size: 64,
        }
    }
}

impl VectorConfig {
    pub fn resolved_uri(&self, base: &Path) -> PathBuf { resolve_with_base(base, &self.uri) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// `hashing` or `openai`.
    pub provider: String,
    pub model: String,
    /// Output size of the hashing provider.
    pub dimension: usize,
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "hashing".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimension: 256,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    pub top_k: usize,
}

impl Default for RankerConfig {
    fn default() -> Self { Self { top_k: 5 } }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
