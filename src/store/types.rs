// src/store/types.rs

//! Domain types shared by all vector-store backends.

use std::fmt;

use serde_json::{Map, Value};

/// A point identifier: Qdrant allows unsigned integers and UUID strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PointId {
    Num(u64),
    Uuid(String),
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointId::Num(n) => write!(f, "{n}"),
            PointId::Uuid(u) => f.write_str(u),
        }
    }
}

impl From<u64> for PointId {
    fn from(n: u64) -> Self {
        PointId::Num(n)
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        PointId::Uuid(s.to_string())
    }
}

/// One point as read from or written to a collection. The vector is optional
/// because scrolls can omit vector data and because stored points may lack
/// one; the payload is an open JSON mapping.
#[derive(Debug, Clone)]
pub struct PointRecord {
    pub id: PointId,
    pub vector: Option<Vec<f32>>,
    pub payload: Map<String, Value>,
}

impl PointRecord {
    pub fn new(id: impl Into<PointId>) -> Self {
        Self {
            id: id.into(),
            vector: None,
            payload: Map::new(),
        }
    }
}

/// One page of a scroll plus the continuation token for the next request.
/// An absent token means the store has nothing further to return.
#[derive(Debug)]
pub struct ScrollPage {
    pub points: Vec<PointRecord>,
    pub next_offset: Option<PointId>,
}
