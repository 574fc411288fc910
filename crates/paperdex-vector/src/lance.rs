use std::path::Path;

use anyhow::Result;
use lancedb::Connection;
use tokio::runtime::Runtime;

use paperdex_core::traits::VectorStore;
use paperdex_core::types::{VectorHit, VectorRecord};

use crate::schema::records_to_batch;
use crate::table;

/// LanceDB-backed store, one table per collection.
///
/// Owns a tokio runtime and blocks on it, so it must not be used from inside
/// another runtime.
pub struct LanceVectorStore {
	rt: Runtime,
	db: Connection,
}

impl LanceVectorStore {
	pub fn open(path: &Path) -> Result<Self> {
		let rt = Runtime::new()?;
		let db = rt.block_on(table::open_db(path.to_string_lossy().as_ref()))?;
		tracing::info!(uri = %path.display(), "opened lancedb vector store");
		Ok(Self { rt, db })
	}
}

impl VectorStore for LanceVectorStore {
	fn upsert(&self, collection: &str, records: &[VectorRecord]) -> Result<()> {
		if records.is_empty() {
			return Ok(());
		}
		let batch = records_to_batch(records)?;
		self.rt.block_on(table::upsert_batch(&self.db, collection, batch))
	}

	fn query(&self, collection: &str, vector: &[f32], k: usize) -> Result<Vec<VectorHit>> {
		self.rt.block_on(table::search(&self.db, collection, vector, k))
	}
}
