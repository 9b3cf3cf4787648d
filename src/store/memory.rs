//! In-memory record store
//!
//! A process-local store speaking the same protocol as the hosted backend.
//! Used for local development and tests; supports reference resolution,
//! filtering and ordering, plus injectable record rejections,
//! table-wide failures and response latency.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use crate::utils::errors::{ClassroomHubError, StoreError, Result};
use super::protocol::{
    DeleteParams, FetchParams, FetchResponse, GetResponse, OrderBy, RawRecord, RecordResult,
    RecordsPayload, SortType, WhereClause, WriteResponse, ID_FIELD,
};
use super::RecordStore;

#[derive(Debug, Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, RawRecord>,
}

#[derive(Debug, Clone)]
struct RejectionRule {
    table: String,
    field: String,
    value: Value,
    message: String,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Table>,
    /// (table, field) -> referenced table
    references: HashMap<(String, String), String>,
    rejections: Vec<RejectionRule>,
    /// table -> store-wide failure message
    failures: HashMap<String, String>,
    /// Delay before every request is served
    latency: Option<Duration>,
}

/// Record store kept in process memory
#[derive(Clone, Debug, Default)]
pub struct InMemoryRecordStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `field` on `table` references records of `target`
    pub fn with_reference(self, table: &str, field: &str, target: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.references.insert((table.to_string(), field.to_string()), target.to_string());
        }
        self
    }

    /// Delay every request by `latency` before it touches the tables
    ///
    /// Concurrent callers then interleave between a read and the following
    /// write, as they do against a remote store.
    pub fn with_latency(self, latency: Duration) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.latency = Some(latency);
        }
        self
    }

    /// Reject every written record of `table` whose `field` equals `value`
    pub fn reject_when(&self, table: &str, field: &str, value: Value, message: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.rejections.push(RejectionRule {
                table: table.to_string(),
                field: field.to_string(),
                value,
                message: message.to_string(),
            });
        }
    }

    /// Make every request against `table` report `success: false`
    pub fn fail_table(&self, table: &str, message: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.failures.insert(table.to_string(), message.to_string());
        }
    }

    /// Clear injected rejections and failures
    pub fn clear_faults(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.rejections.clear();
            state.failures.clear();
        }
    }

    /// Number of stored records in `table`
    pub fn record_count(&self, table: &str) -> usize {
        self.state
            .lock()
            .map(|state| state.tables.get(table).map_or(0, |t| t.rows.len()))
            .unwrap_or(0)
    }

    async fn pause(&self) {
        let latency = self.state.lock().ok().and_then(|state| state.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|_| {
            ClassroomHubError::Transport(StoreError::RequestFailed("in-memory store lock poisoned".to_string()))
        })
    }
}

impl State {
    fn failure(&self, table: &str) -> Option<String> {
        self.failures.get(table).cloned()
    }

    fn rejection(&self, table: &str, record: &RawRecord) -> Option<String> {
        self.rejections
            .iter()
            .find(|rule| rule.table == table && record.get(&rule.field).is_some_and(|v| values_equal(v, &rule.value)))
            .map(|rule| rule.message.clone())
    }

    fn project(&self, table: &str, row: &RawRecord, params: &FetchParams) -> RawRecord {
        let mut out = RawRecord::new();
        if let Some(id) = row.get(ID_FIELD) {
            out.insert(ID_FIELD.to_string(), id.clone());
        }

        for spec in &params.fields {
            let name = &spec.field.name;
            let value = row.get(name).cloned().unwrap_or(Value::Null);

            let value = match &spec.reference_field {
                Some(reference) => self.resolve_reference(table, name, value, &reference.field.name),
                None => value,
            };
            out.insert(name.clone(), value);
        }

        out
    }

    fn resolve_reference(&self, table: &str, field: &str, value: Value, display_field: &str) -> Value {
        let Some(id) = value.as_i64() else {
            return value;
        };
        let Some(target) = self.references.get(&(table.to_string(), field.to_string())) else {
            return value;
        };

        let display = self.tables
            .get(target)
            .and_then(|t| t.rows.get(&id))
            .and_then(|row| row.get(display_field))
            .cloned()
            .unwrap_or(Value::Null);

        let mut resolved = RawRecord::new();
        resolved.insert(ID_FIELD.to_string(), Value::from(id));
        resolved.insert(display_field.to_string(), display);
        Value::Object(resolved)
    }
}

fn matches(row: &RawRecord, clauses: &[WhereClause]) -> bool {
    clauses.iter().all(|clause| {
        let value = row.get(&clause.field_name).unwrap_or(&Value::Null);
        clause.values.iter().any(|candidate| values_equal(value, candidate))
    })
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn sort_rows(rows: &mut [RawRecord], order_by: &[OrderBy]) {
    rows.sort_by(|a, b| {
        for order in order_by {
            let left = a.get(&order.field_name).unwrap_or(&Value::Null);
            let right = b.get(&order.field_name).unwrap_or(&Value::Null);
            let ordering = match order.sort_type {
                SortType::Asc => compare_values(left, right),
                SortType::Desc => compare_values(right, left),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn store_failure(message: String) -> WriteResponse {
    WriteResponse {
        success: false,
        message: Some(message),
        ..Default::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<FetchResponse> {
        self.pause().await;
        let state = self.lock()?;
        if let Some(message) = state.failure(table) {
            return Ok(FetchResponse { success: false, data: None, message: Some(message) });
        }

        let Some(stored) = state.tables.get(table) else {
            return Ok(FetchResponse { success: true, data: None, message: None });
        };

        let mut rows: Vec<RawRecord> = stored.rows
            .values()
            .filter(|row| matches(row, &params.where_clauses))
            .cloned()
            .collect();
        sort_rows(&mut rows, &params.order_by);

        let data = rows.iter().map(|row| state.project(table, row, params)).collect();
        Ok(FetchResponse { success: true, data: Some(data), message: None })
    }

    async fn get_record_by_id(&self, table: &str, id: i64, params: &FetchParams) -> Result<GetResponse> {
        self.pause().await;
        let state = self.lock()?;
        if let Some(message) = state.failure(table) {
            return Ok(GetResponse { success: false, data: None, message: Some(message) });
        }

        // Unknown ids come back as an empty success, like the hosted store
        let data = state.tables
            .get(table)
            .and_then(|t| t.rows.get(&id))
            .map(|row| state.project(table, row, params));

        Ok(GetResponse { success: true, data, message: None })
    }

    async fn create_records(&self, table: &str, payload: &RecordsPayload) -> Result<WriteResponse> {
        self.pause().await;
        let mut state = self.lock()?;
        if let Some(message) = state.failure(table) {
            return Ok(store_failure(message));
        }

        let mut results = Vec::with_capacity(payload.records.len());
        for record in &payload.records {
            if let Some(message) = state.rejection(table, record) {
                results.push(RecordResult::failed(message, Some(400)));
                continue;
            }

            let stored = state.tables.entry(table.to_string()).or_default();
            stored.next_id += 1;
            let id = stored.next_id;

            let mut row = record.clone();
            row.insert(ID_FIELD.to_string(), Value::from(id));
            stored.rows.insert(id, row.clone());
            results.push(RecordResult::ok(Some(row)));
        }

        debug!(table = table, count = results.len(), "In-memory create applied");
        Ok(WriteResponse { success: true, message: None, data: None, results: Some(results) })
    }

    async fn update_records(&self, table: &str, payload: &RecordsPayload) -> Result<WriteResponse> {
        self.pause().await;
        let mut state = self.lock()?;
        if let Some(message) = state.failure(table) {
            return Ok(store_failure(message));
        }

        let mut results = Vec::with_capacity(payload.records.len());
        for record in &payload.records {
            let Some(id) = record.get(ID_FIELD).and_then(Value::as_i64) else {
                results.push(RecordResult::failed("Id is required", Some(400)));
                continue;
            };
            if let Some(message) = state.rejection(table, record) {
                results.push(RecordResult::failed(message, Some(400)));
                continue;
            }

            match state.tables.get_mut(table).and_then(|t| t.rows.get_mut(&id)) {
                Some(row) => {
                    for (key, value) in record {
                        row.insert(key.clone(), value.clone());
                    }
                    results.push(RecordResult::ok(Some(row.clone())));
                }
                None => results.push(RecordResult::failed(format!("Record {} not found", id), Some(404))),
            }
        }

        Ok(WriteResponse { success: true, message: None, data: None, results: Some(results) })
    }

    async fn delete_records(&self, table: &str, params: &DeleteParams) -> Result<WriteResponse> {
        self.pause().await;
        let mut state = self.lock()?;
        if let Some(message) = state.failure(table) {
            return Ok(store_failure(message));
        }

        let results = params.record_ids
            .iter()
            .map(|id| match state.tables.get_mut(table).and_then(|t| t.rows.remove(id)) {
                Some(_) => RecordResult::ok(None),
                None => RecordResult::failed(format!("Record {} not found", id), Some(404)),
            })
            .collect();

        Ok(WriteResponse { success: true, message: None, data: None, results: Some(results) })
    }
}
