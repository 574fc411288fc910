use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};

use paperdex_core::ranking::{cosine_similarity, top_k};
use paperdex_core::traits::VectorStore;
use paperdex_core::types::{VectorHit, VectorRecord};

/// Brute-force cosine store kept in process memory.
#[derive(Default)]
pub struct MemoryVectorStore {
	collections: RwLock<HashMap<String, Collection>>,
}

#[derive(Default)]
struct Collection {
	records: Vec<VectorRecord>,
	by_id: HashMap<String, usize>,
}

impl MemoryVectorStore {
	pub fn new() -> Self { Self::default() }

	pub fn len(&self, collection: &str) -> usize {
		self.collections.read().map_or(0, |c| c.get(collection).map_or(0, |c| c.records.len()))
	}
}

impl VectorStore for MemoryVectorStore {
	fn upsert(&self, collection: &str, records: &[VectorRecord]) -> Result<()> {
		let mut guard = self.collections.write().map_err(|_| anyhow!("memory store lock poisoned"))?;
		let coll = guard.entry(collection.to_string()).or_default();
		for record in records {
			match coll.by_id.get(&record.id) {
				Some(&slot) => coll.records[slot] = record.clone(),
				None => {
					coll.by_id.insert(record.id.clone(), coll.records.len());
					coll.records.push(record.clone());
				}
			}
		}
		Ok(())
	}

	fn query(&self, collection: &str, vector: &[f32], k: usize) -> Result<Vec<VectorHit>> {
		let guard = self.collections.read().map_err(|_| anyhow!("memory store lock poisoned"))?;
		let Some(coll) = guard.get(collection) else { return Ok(Vec::new()) };
		if let Some(bad) = coll.records.iter().find(|r| r.vector.len() != vector.len()) {
			return Err(anyhow!("query has dimension {}, record {} has {}", vector.len(), bad.id, bad.vector.len()));
		}
		let scored = coll.records.iter().enumerate().map(|(i, r)| (i, cosine_similarity(&r.vector, vector)));
		Ok(top_k(scored, k)
			.into_iter()
			.map(|(i, score)| {
				let r = &coll.records[i];
				VectorHit { id: r.id.clone(), score, text: r.text.clone(), source: r.source.clone() }
			})
			.collect())
	}
}
