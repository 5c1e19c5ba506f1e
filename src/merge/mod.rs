// src/merge/mod.rs

//! The collection merger: validates sources, provisions the target, and
//! streams points across with identifier dedup.
//!
//! One seen-ID set is shared across every source in a run, so an identifier
//! appearing in two sources is written only once. First occurrence wins, and
//! the provenance recorded is the source processed first.

use std::collections::HashSet;

use anyhow::{anyhow, bail, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::store::traits::VectorStore;
use crate::store::types::PointId;

/// Page size for the identifier preload. Larger than the merge page size
/// since no vector or payload data travels with these requests.
const ID_SCAN_PAGE_SIZE: u32 = 1000;

/// Page size for the merge scan, where every point carries its vector and
/// payload.
const MERGE_PAGE_SIZE: u32 = 100;

/// Payload key recording which collection a point came from. Reserved: the
/// merger always sets it, a value arriving in source data is overwritten.
pub const SOURCE_COLLECTION_KEY: &str = "source_collection";

/// Per-source counters for one merge run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SourceStats {
    /// Points read from the source, written or not.
    pub processed: usize,
    /// Points skipped because their identifier was already in the target or
    /// in an earlier source.
    pub skipped: usize,
    /// Points dropped because they carried no vector data.
    pub missing_vector: usize,
}

/// Outcome of one merge run, per source in the order they were given.
#[derive(Debug, Default, Serialize)]
pub struct MergeReport {
    pub target_created: bool,
    pub sources: Vec<(String, SourceStats)>,
}

pub struct CollectionMerger<S> {
    store: S,
}

impl<S: VectorStore> CollectionMerger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Collect every point identifier currently stored in a collection.
    /// Scrolls without vectors or payloads to keep the transfer small.
    pub async fn existing_ids(&self, collection: &str) -> Result<HashSet<PointId>> {
        let mut ids = HashSet::new();
        let mut offset: Option<PointId> = None;

        loop {
            let page = self
                .store
                .scroll(collection, ID_SCAN_PAGE_SIZE, offset, false, false)
                .await?;

            if page.points.is_empty() {
                break;
            }

            ids.extend(page.points.into_iter().map(|p| p.id));

            offset = page.next_offset;
            if offset.is_none() {
                break;
            }
        }

        info!("Found {} existing points in {}", ids.len(), collection);
        Ok(ids)
    }

    /// Merge all points from `sources` into `target`, skipping identifiers
    /// already written. `vector_size` is only consulted when the target has
    /// to be created; `None` infers it from the first source collection.
    /// With `resume`, identifiers already present in the target are preloaded
    /// and skipped instead of rewritten.
    pub async fn merge(
        &self,
        sources: &[String],
        target: &str,
        vector_size: Option<u64>,
        resume: bool,
    ) -> Result<MergeReport> {
        let existing = self.store.list_collections().await?;

        for source in sources {
            if !existing.iter().any(|name| name == source) {
                bail!("Source collection {source} does not exist");
            }
        }

        let mut report = MergeReport::default();

        if !existing.iter().any(|name| name == target) {
            let size = match vector_size {
                Some(size) => size,
                None => {
                    let first = sources
                        .first()
                        .ok_or_else(|| anyhow!("No source collections given"))?;
                    self.store.vector_size(first).await?
                }
            };
            info!("Creating target collection {} ({} dimensions)", target, size);
            self.store.create_collection(target, size).await?;
            report.target_created = true;
        }

        let mut seen = if resume {
            self.existing_ids(target).await?
        } else {
            HashSet::new()
        };

        for source in sources {
            let stats = self.merge_source(source, target, &mut seen).await?;
            report.sources.push((source.clone(), stats));
        }

        info!("Merge operation completed successfully");
        Ok(report)
    }

    /// Stream one source collection into the target, one page at a time,
    /// upserting each page's unseen points as a single batch.
    async fn merge_source(
        &self,
        source: &str,
        target: &str,
        seen: &mut HashSet<PointId>,
    ) -> Result<SourceStats> {
        info!("Processing collection: {}", source);

        let mut stats = SourceStats::default();
        let mut offset: Option<PointId> = None;

        loop {
            let page = self
                .store
                .scroll(source, MERGE_PAGE_SIZE, offset, true, true)
                .await?;

            if page.points.is_empty() {
                break;
            }

            stats.processed += page.points.len();

            let mut batch = Vec::new();
            for mut point in page.points {
                if seen.contains(&point.id) {
                    stats.skipped += 1;
                    continue;
                }

                point.payload.insert(
                    SOURCE_COLLECTION_KEY.to_string(),
                    Value::String(source.to_string()),
                );

                if point.vector.is_some() {
                    seen.insert(point.id.clone());
                    batch.push(point);
                } else {
                    warn!("Skipping point {} - no vector data", point.id);
                    stats.missing_vector += 1;
                }
            }

            if !batch.is_empty() {
                self.store.upsert(target, batch).await?;
            }

            info!(
                "Processed {} points from {} (skipped {} existing points)",
                stats.processed, source, stats.skipped
            );

            offset = page.next_offset;
            if offset.is_none() {
                break;
            }
        }

        info!(
            "Completed merging collection: {} - Total processed: {}, Total skipped: {}",
            source, stats.processed, stats.skipped
        );

        Ok(stats)
    }
}
