// src/store/traits.rs

//! Core trait for vector-store backends (Qdrant in production, in-memory in
//! tests). All collection access goes through this; no direct client calls
//! in the merge logic.

use async_trait::async_trait;

use crate::store::types::{PointId, PointRecord, ScrollPage};

/// The store operations the merger needs from any backend.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Names of every collection currently in the store.
    async fn list_collections(&self) -> anyhow::Result<Vec<String>>;

    /// Configured vector dimensionality of an existing collection.
    async fn vector_size(&self, collection: &str) -> anyhow::Result<u64>;

    /// Create a collection with the given dimensionality. The distance
    /// metric is always cosine; callers cannot pick another one.
    async fn create_collection(&self, collection: &str, vector_size: u64) -> anyhow::Result<()>;

    /// Read one page of points, starting at `offset` (None = from the
    /// beginning). `with_vectors`/`with_payload` control how much data
    /// travels with each point.
    async fn scroll(
        &self,
        collection: &str,
        limit: u32,
        offset: Option<PointId>,
        with_vectors: bool,
        with_payload: bool,
    ) -> anyhow::Result<ScrollPage>;

    /// Write a batch of points, replacing any existing points with the same
    /// identifiers.
    async fn upsert(&self, collection: &str, points: Vec<PointRecord>) -> anyhow::Result<()>;
}
