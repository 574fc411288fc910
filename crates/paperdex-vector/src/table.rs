//! LanceDB connection and table helpers.
use anyhow::{anyhow, Result};
use arrow_array::{Array, Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection, DistanceType};

use paperdex_core::types::{ChunkSource, VectorHit};

pub async fn open_db(uri: &str) -> Result<Connection> {
	Ok(connect(uri).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
	Ok(conn.table_names().execute().await?.iter().any(|n| n == name))
}

/// Insert rows, replacing those whose `id` already exists. Creates the table
/// from the batch schema on first write.
pub async fn upsert_batch(conn: &Connection, name: &str, batch: RecordBatch) -> Result<()> {
	let schema = batch.schema();
	let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
	if !table_exists(conn, name).await? {
		conn.create_table(name, reader).execute().await?;
		return Ok(());
	}
	let table = conn.open_table(name).execute().await?;
	let mut mi = table.merge_insert(&["id"]);
	mi.when_matched_update_all(None).when_not_matched_insert_all();
	mi.execute(reader).await?;
	Ok(())
}

/// Cosine nearest neighbours; missing tables have no hits.
pub async fn search(conn: &Connection, name: &str, vector: &[f32], k: usize) -> Result<Vec<VectorHit>> {
	if !table_exists(conn, name).await? {
		return Ok(Vec::new());
	}
	let table = conn.open_table(name).execute().await?;
	let stream = table.vector_search(vector.to_vec())?.distance_type(DistanceType::Cosine).limit(k).execute().await?;
	let batches: Vec<RecordBatch> = stream.try_collect().await?;
	let mut hits = Vec::new();
	for batch in &batches {
		let ids = string_column(batch, "id")?; let texts = string_column(batch, "chunk_text")?;
		let titles = string_column(batch, "title")?; let arxiv_ids = string_column(batch, "arxiv_id")?;
		let distances = batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<Float32Array>()).ok_or_else(|| anyhow!("_distance column missing"))?;
		for i in 0..batch.num_rows() {
			hits.push(VectorHit {
				id: ids.value(i).to_string(),
				score: 1.0 - distances.value(i),
				text: texts.value(i).to_string(),
				source: ChunkSource { title: titles.value(i).to_string(), arxiv_id: arxiv_ids.value(i).to_string() },
			});
		}
	}
	Ok(hits)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
	batch.column_by_name(name).and_then(|c| c.as_any().downcast_ref::<StringArray>()).ok_or_else(|| anyhow!("{name} column missing"))
}
