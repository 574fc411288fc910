//! paperdex-vector
//!
//! Vector stores (in-memory and LanceDB) and the dense retrieval strategy.
pub mod dense;
pub mod lance;
pub mod memory;
pub mod schema;
pub mod table;

use std::path::Path;
use std::sync::Arc;

use paperdex_core::config::VectorConfig;
use paperdex_core::traits::VectorStore;
use paperdex_core::{Error, Result};

pub use dense::DenseRetriever;
pub use lance::LanceVectorStore;
pub use memory::MemoryVectorStore;

/// Open the store named by `indexer.vector.store`. A relative `uri` is
/// resolved against `base`.
pub fn vector_store_from_config(config: &VectorConfig, base: &Path) -> Result<Arc<dyn VectorStore>> {
	match config.store.as_str() {
		"memory" => Ok(Arc::new(MemoryVectorStore::new())),
		"lancedb" => {
			let uri = config.resolved_uri(base);
			let store = LanceVectorStore::open(&uri).map_err(|e| Error::vector_store(format!("open {}", uri.display()), e))?;
			Ok(Arc::new(store))
		}
		other => Err(Error::config(format!("Unknown vector store: {other}"))),
	}
}
