// src/store/qdrant.rs

//! VectorStore backend for a live Qdrant server, including the mapping
//! between the gRPC wire types and the domain types.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    self, vectors_config, CreateCollectionBuilder, Distance, PointStruct, ScrollPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use serde_json::Value;
use tracing::info;

use crate::store::traits::VectorStore;
use crate::store::types::{PointId, PointRecord, ScrollPage};

pub struct QdrantStore {
    client: Qdrant,
}

impl QdrantStore {
    /// Connect to a Qdrant server. The compatibility check is skipped so
    /// minor client/server version drift does not block a run.
    pub fn connect(url: &str) -> Result<Self> {
        let client = Qdrant::from_url(url)
            .skip_compatibility_check()
            .build()
            .context("Failed to connect to Qdrant")?;
        Ok(Self { client })
    }

    /// Wrap an already-built client.
    pub fn new(client: Qdrant) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn list_collections(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .list_collections()
            .await
            .context("Failed to list collections")?;
        Ok(response.collections.into_iter().map(|c| c.name).collect())
    }

    async fn vector_size(&self, collection: &str) -> Result<u64> {
        let info = self
            .client
            .collection_info(collection)
            .await
            .with_context(|| format!("Failed to fetch collection info for {collection}"))?;

        let config = info
            .result
            .and_then(|r| r.config)
            .and_then(|c| c.params)
            .and_then(|p| p.vectors_config)
            .and_then(|v| v.config)
            .ok_or_else(|| anyhow!("Collection {collection} has no vector config"))?;

        match config {
            vectors_config::Config::Params(params) => Ok(params.size),
            vectors_config::Config::ParamsMap(_) => Err(anyhow!(
                "Collection {collection} uses named vectors, which are not supported"
            )),
        }
    }

    async fn create_collection(&self, collection: &str, vector_size: u64) -> Result<()> {
        info!("Creating Qdrant collection: {}", collection);
        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(VectorParamsBuilder::new(vector_size, Distance::Cosine)),
            )
            .await
            .with_context(|| format!("Failed to create collection: {collection}"))?;
        Ok(())
    }

    async fn scroll(
        &self,
        collection: &str,
        limit: u32,
        offset: Option<PointId>,
        with_vectors: bool,
        with_payload: bool,
    ) -> Result<ScrollPage> {
        let mut builder = ScrollPointsBuilder::new(collection)
            .limit(limit)
            .with_payload(with_payload)
            .with_vectors(with_vectors);

        if let Some(offset) = offset {
            builder = builder.offset(point_id_to_wire(offset));
        }

        let response = self
            .client
            .scroll(builder)
            .await
            .with_context(|| format!("Failed to scroll collection {collection}"))?;

        let points = response
            .result
            .into_iter()
            .filter_map(retrieved_to_record)
            .collect();

        Ok(ScrollPage {
            points,
            next_offset: response.next_page_offset.and_then(point_id_from_wire),
        })
    }

    async fn upsert(&self, collection: &str, points: Vec<PointRecord>) -> Result<()> {
        let points: Vec<PointStruct> = points.into_iter().map(record_to_point).collect();
        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .with_context(|| format!("Failed to upsert points into {collection}"))?;
        Ok(())
    }
}

fn point_id_to_wire(id: PointId) -> qdrant::PointId {
    match id {
        PointId::Num(n) => n.into(),
        PointId::Uuid(u) => u.into(),
    }
}

fn point_id_from_wire(id: qdrant::PointId) -> Option<PointId> {
    match id.point_id_options {
        Some(qdrant::point_id::PointIdOptions::Num(n)) => Some(PointId::Num(n)),
        Some(qdrant::point_id::PointIdOptions::Uuid(u)) => Some(PointId::Uuid(u)),
        None => None,
    }
}

/// Convert a scrolled point to a record. Points without an identifier are
/// dropped. Only dense vectors are carried over; a named/sparse vector
/// output yields a vectorless record.
fn retrieved_to_record(point: qdrant::RetrievedPoint) -> Option<PointRecord> {
    let id = point.id.and_then(point_id_from_wire)?;

    let vector = point.vectors.and_then(|v| match v.vectors_options {
        Some(qdrant::vectors_output::VectorsOptions::Vector(vec)) => match vec.into_vector() {
            qdrant::vector_output::Vector::Dense(dense) => Some(dense.data),
            _ => None,
        },
        _ => None,
    });

    let payload = point
        .payload
        .into_iter()
        .map(|(k, v)| (k, qdrant_value_to_json(v)))
        .collect();

    Some(PointRecord {
        id,
        vector,
        payload,
    })
}

fn record_to_point(record: PointRecord) -> PointStruct {
    let payload: HashMap<String, qdrant::Value> = record
        .payload
        .into_iter()
        .map(|(k, v)| (k, json_to_qdrant_value(v)))
        .collect();

    PointStruct::new(
        point_id_to_wire(record.id),
        record.vector.unwrap_or_default(),
        payload,
    )
}

fn qdrant_value_to_json(value: qdrant::Value) -> Value {
    use qdrant::value::Kind;

    match value.kind {
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::from(i),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.into_iter().map(qdrant_value_to_json).collect())
        }
        Some(Kind::StructValue(fields)) => Value::Object(
            fields
                .fields
                .into_iter()
                .map(|(k, v)| (k, qdrant_value_to_json(v)))
                .collect(),
        ),
        Some(Kind::NullValue(_)) | None => Value::Null,
    }
}

fn json_to_qdrant_value(value: Value) -> qdrant::Value {
    use qdrant::value::Kind;

    let kind = match value {
        Value::Null => Kind::NullValue(0),
        Value::Bool(b) => Kind::BoolValue(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Kind::IntegerValue(i)
            } else {
                Kind::DoubleValue(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => Kind::StringValue(s),
        Value::Array(items) => Kind::ListValue(qdrant::ListValue {
            values: items.into_iter().map(json_to_qdrant_value).collect(),
        }),
        Value::Object(fields) => Kind::StructValue(qdrant::Struct {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k, json_to_qdrant_value(v)))
                .collect(),
        }),
    };

    qdrant::Value { kind: Some(kind) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_payload_survives_wire_mapping() {
        let original = json!({
            "source_collection": "docs",
            "chunk": 7,
            "score": 0.25,
            "tags": ["a", "b"],
            "meta": { "lang": "en", "draft": false, "note": null }
        });

        let wire = json_to_qdrant_value(original.clone());
        assert_eq!(qdrant_value_to_json(wire), original);
    }

    #[test]
    fn integers_and_doubles_keep_their_kind() {
        use qdrant::value::Kind;

        let int = json_to_qdrant_value(json!(42));
        assert!(matches!(int.kind, Some(Kind::IntegerValue(42))));

        let double = json_to_qdrant_value(json!(1.5));
        assert!(matches!(double.kind, Some(Kind::DoubleValue(d)) if d == 1.5));
    }

    #[test]
    fn wire_point_ids_map_to_both_forms() {
        let num = point_id_from_wire(qdrant::PointId::from(9_u64));
        assert_eq!(num, Some(PointId::Num(9)));

        let uuid = point_id_from_wire(qdrant::PointId::from(
            "61e472cb-3e5f-4d67-9b42-0d9ad479b662".to_string(),
        ));
        assert_eq!(
            uuid,
            Some(PointId::Uuid("61e472cb-3e5f-4d67-9b42-0d9ad479b662".to_string()))
        );
    }
}
