//! Record store capability.
//!
//! The backend that owns emergency records is reached only through this trait.
//! Callers construct an implementation and hand it to the services explicitly.

use std::cmp::Ordering;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::models::types::Result;

/// A stored record: a JSON object with a string `"id"` field
pub type Record = serde_json::Map<String, Value>;

pub const ID_FIELD: &str = "id";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// Equality filters, ordering and paging for [`RecordStore::fetch_records`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordQuery {
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| record.get(field) == Some(value))
    }

    /// Order two records by the query's order-by field (`Equal` without one)
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let Some(order) = &self.order_by else {
            return Ordering::Equal;
        };

        let ordering = compare_values(a.get(&order.field), b.get(&order.field));
        match order.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Missing and null sort first, then numbers, strings and everything else by kind
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Record CRUD against the backend
pub trait RecordStore: Send + Sync {
    fn fetch_records<'a>(
        &'a self,
        table: &'a str,
        query: &'a RecordQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Record>>> + Send + 'a>>;

    fn get_record<'a>(
        &'a self,
        table: &'a str,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Record>>> + Send + 'a>>;

    /// Store a new record. Fails if its id is missing or already taken.
    fn create_record<'a>(
        &'a self,
        table: &'a str,
        record: Record,
    ) -> Pin<Box<dyn Future<Output = Result<Record>> + Send + 'a>>;

    /// Shallow-merge `patch` into an existing record. `None` if there is no such record.
    fn update_record<'a>(
        &'a self,
        table: &'a str,
        id: &'a str,
        patch: Record,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Record>>> + Send + 'a>>;

    /// Conditional [`update_record`](Self::update_record): the patch is applied only
    /// if the stored record matches every filter of `expected`, checked under the same
    /// write. `None` if the record is absent or doesn't match.
    fn update_record_if<'a>(
        &'a self,
        table: &'a str,
        id: &'a str,
        expected: &'a RecordQuery,
        patch: Record,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Record>>> + Send + 'a>>;

    /// Whether a record was removed
    fn delete_record<'a>(
        &'a self,
        table: &'a str,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<bool>> + Send + 'a>>;

    /// Next per-table sequence number, used to build human-readable ids
    fn next_sequence<'a>(
        &'a self,
        table: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<u64>> + Send + 'a>>;
}
