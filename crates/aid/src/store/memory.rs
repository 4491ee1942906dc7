//! In-memory record store.
//!
//! Used by tests and the CLI. Tables keep insertion order; ordering and paging
//! follow the query.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::models::types::{EmergencyError, Result};
use crate::store::traits::{Record, RecordQuery, RecordStore, ID_FIELD};

#[derive(Default)]
struct Table {
    records: Vec<Record>,
    sequence: u64,
}

impl Table {
    fn position(&self, id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| record_id(r) == Some(id))
    }
}

#[derive(Default)]
pub struct MemoryRecordStore {
    tables: RwLock<HashMap<String, Table>>,
}

fn record_id(record: &Record) -> Option<&str> {
    record.get(ID_FIELD).and_then(Value::as_str)
}

/// Trailing number of a generated id, e.g. 7 for `EMG-2024-007`
fn id_sequence(id: &str) -> Option<u64> {
    id.rsplit('-').next()?.parse().ok()
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table. Sequences continue after both the number of seeded records
    /// and the highest numeric suffix among their ids (`HOSPITAL-004` -> 4).
    pub fn with_records(mut self, table: &str, records: Vec<Record>) -> Self {
        let entry = self.tables.get_mut().entry(table.to_string()).or_default();
        let highest = records
            .iter()
            .filter_map(|r| record_id(r).and_then(id_sequence))
            .max()
            .unwrap_or(0);

        entry.sequence = (entry.sequence + records.len() as u64).max(highest);
        entry.records.extend(records);
        self
    }

    /// Seed a table from typed values that serialize to JSON objects
    pub fn with_values<T: Serialize>(self, table: &str, values: &[T]) -> Result<Self> {
        let records = values
            .iter()
            .map(|v| -> Result<Record> {
                match serde_json::to_value(v)? {
                    Value::Object(map) => Ok(map),
                    other => Err(EmergencyError::InvalidData(format!(
                        "expected a JSON object for table {table}, got {other}"
                    ))),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.with_records(table, records))
    }

    async fn apply_patch(
        &self,
        table: &str,
        id: &str,
        expected: Option<&RecordQuery>,
        patch: Record,
    ) -> Option<Record> {
        let mut tables = self.tables.write().await;
        let entry = tables.get_mut(table)?;
        let index = entry.position(id)?;
        let stored = &mut entry.records[index];
        if expected.is_some_and(|query| !query.matches(stored)) {
            return None;
        }

        for (key, value) in patch {
            if key != ID_FIELD {
                stored.insert(key, value);
            }
        }
        Some(stored.clone())
    }
}

impl RecordStore for MemoryRecordStore {
    fn fetch_records<'a>(
        &'a self,
        table: &'a str,
        query: &'a RecordQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Record>>> + Send + 'a>> {
        Box::pin(async move {
            let tables = self.tables.read().await;
            let Some(table) = tables.get(table) else {
                return Ok(Vec::new());
            };

            let mut matching: Vec<Record> = table
                .records
                .iter()
                .filter(|r| query.matches(r))
                .cloned()
                .collect();
            matching.sort_by(|a, b| query.compare(a, b));

            Ok(matching
                .into_iter()
                .skip(query.offset)
                .take(query.limit.unwrap_or(usize::MAX))
                .collect())
        })
    }

    fn get_record<'a>(
        &'a self,
        table: &'a str,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Record>>> + Send + 'a>> {
        Box::pin(async move {
            let tables = self.tables.read().await;
            Ok(tables
                .get(table)
                .and_then(|t| t.position(id).map(|i| t.records[i].clone())))
        })
    }

    fn create_record<'a>(
        &'a self,
        table: &'a str,
        record: Record,
    ) -> Pin<Box<dyn Future<Output = Result<Record>> + Send + 'a>> {
        Box::pin(async move {
            let Some(id) = record_id(&record).map(str::to_owned) else {
                return Err(EmergencyError::InvalidData(format!(
                    "record for table {table} has no string id"
                )));
            };

            let mut tables = self.tables.write().await;
            let entry = tables.entry(table.to_string()).or_default();
            if entry.position(&id).is_some() {
                return Err(EmergencyError::Backend(format!(
                    "record {id} already exists in {table}"
                )));
            }

            entry.records.push(record.clone());
            Ok(record)
        })
    }

    fn update_record<'a>(
        &'a self,
        table: &'a str,
        id: &'a str,
        patch: Record,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Record>>> + Send + 'a>> {
        Box::pin(async move { Ok(self.apply_patch(table, id, None, patch).await) })
    }

    fn update_record_if<'a>(
        &'a self,
        table: &'a str,
        id: &'a str,
        expected: &'a RecordQuery,
        patch: Record,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Record>>> + Send + 'a>> {
        Box::pin(async move { Ok(self.apply_patch(table, id, Some(expected), patch).await) })
    }

    fn delete_record<'a>(
        &'a self,
        table: &'a str,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>> {
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            let Some(entry) = tables.get_mut(table) else {
                return Ok(false);
            };

            match entry.position(id) {
                Some(index) => {
                    entry.records.remove(index);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn next_sequence<'a>(
        &'a self,
        table: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<u64>> + Send + 'a>> {
        Box::pin(async move {
            let mut tables = self.tables.write().await;
            let entry = tables.entry(table.to_string()).or_default();
            entry.sequence += 1;
            Ok(entry.sequence)
        })
    }
}
