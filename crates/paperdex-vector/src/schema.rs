use anyhow::{anyhow, Result};
use arrow_array::{FixedSizeListArray, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

use paperdex_core::types::VectorRecord;

pub fn build_chunk_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("id", DataType::Utf8, false),
		Field::new("chunk_text", DataType::Utf8, false),
		Field::new("title", DataType::Utf8, false),
		Field::new("arxiv_id", DataType::Utf8, false),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}

/// Common dimension of `records`; fails on an empty slice or mixed sizes.
pub fn record_dimension(records: &[VectorRecord]) -> Result<i32> {
	let first = records.first().ok_or_else(|| anyhow!("no records"))?.vector.len();
	if let Some(bad) = records.iter().find(|r| r.vector.len() != first) {
		return Err(anyhow!("record {} has dimension {}, expected {}", bad.id, bad.vector.len(), first));
	}
	Ok(i32::try_from(first)?)
}

pub fn records_to_batch(records: &[VectorRecord]) -> Result<RecordBatch> {
	let dim = record_dimension(records)?;
	let mut ids = Vec::with_capacity(records.len()); let mut texts = Vec::with_capacity(records.len());
	let mut titles = Vec::with_capacity(records.len()); let mut arxiv_ids = Vec::with_capacity(records.len());
	let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(records.len());
	for r in records { ids.push(r.id.clone()); texts.push(r.text.clone()); titles.push(r.source.title.clone()); arxiv_ids.push(r.source.arxiv_id.clone()); vectors.push(Some(r.vector.iter().map(|&x| Some(x)).collect())); }
	let batch = RecordBatch::try_new(build_chunk_schema(dim), vec![
		Arc::new(StringArray::from(ids)),
		Arc::new(StringArray::from(texts)),
		Arc::new(StringArray::from(titles)),
		Arc::new(StringArray::from(arxiv_ids)),
		Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), dim)),
	])?;
	Ok(batch)
}
