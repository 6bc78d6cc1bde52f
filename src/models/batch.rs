use std::num::NonZeroUsize;

use serde_json::{Map, Value, json};

pub type Row = Map<String, Value>;

pub const DEFAULT_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub number: usize,
    pub rows: Vec<Row>,
}

// Batches are numbered from 1; only the last one may be short.
pub fn batch_rows(rows: Vec<Row>, size: NonZeroUsize) -> Vec<Batch> {
    let size = size.get();
    let mut batches = Vec::with_capacity(rows.len().div_ceil(size));
    let mut rows = rows.into_iter().peekable();
    let mut number = 1;
    while rows.peek().is_some() {
        let chunk: Vec<Row> = rows.by_ref().take(size).collect();
        batches.push(Batch {
            number,
            rows: chunk,
        });
        number += 1;
    }
    batches
}

pub fn placeholder_entry(batch: usize, raw_response: &str) -> Value {
    json!({
        "batch": batch,
        "raw_response": raw_response,
    })
}
