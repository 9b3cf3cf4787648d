//! Generic record client
//!
//! `RecordClient<E>` is the typed gateway to one remote table. It builds
//! request parameters from the entity's schema, performs exactly one store
//! round trip per operation (two for `upsert_by_key`) and normalizes the
//! store's `success` flags into `ClassroomHubError` variants.

use std::marker::PhantomData;
use std::sync::Arc;
use serde_json::Value;
use tracing::{debug, info, warn};
use crate::store::protocol::{
    DeleteParams, FetchParams, FieldSpec, RawRecord, RecordResult, RecordsPayload, WhereClause,
    WriteResponse, ID_FIELD, NAME_FIELD,
};
use crate::store::RecordStore;
use crate::utils::errors::{ClassroomHubError, StoreError, Result};
use crate::utils::logging::log_rejected_records;
use super::entity::Entity;
use super::locks::KeyLocks;
use super::schema::TableSchema;

#[derive(Debug, Clone, Copy)]
enum WriteKind {
    Create,
    Update,
    Delete,
}

impl WriteKind {
    fn verb(self) -> &'static str {
        match self {
            WriteKind::Create => "create",
            WriteKind::Update => "update",
            WriteKind::Delete => "delete",
        }
    }
}

/// Typed CRUD client for one remote table
pub struct RecordClient<E: Entity> {
    store: Arc<dyn RecordStore>,
    schema: Arc<TableSchema>,
    key_locks: Option<Arc<KeyLocks>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for RecordClient<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            schema: self.schema.clone(),
            key_locks: self.key_locks.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> std::fmt::Debug for RecordClient<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordClient")
            .field("table", &self.schema.table())
            .field("serialize_upserts", &self.key_locks.is_some())
            .finish()
    }
}

impl<E: Entity> RecordClient<E> {
    /// Create a client for `E` on the given store
    pub fn new(store: Arc<dyn RecordStore>) -> Result<Self> {
        Ok(Self {
            store,
            schema: Arc::new(E::schema()?),
            key_locks: None,
            _entity: PhantomData,
        })
    }

    /// Serialize `upsert_by_key` calls sharing a natural key through `locks`
    pub fn with_key_locks(mut self, locks: Arc<KeyLocks>) -> Self {
        self.key_locks = Some(locks);
        self
    }

    pub fn table(&self) -> &str {
        self.schema.table()
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// All records of the table in the schema's default order
    ///
    /// A store reporting no rows yields an empty vector.
    pub async fn list_all(&self) -> Result<Vec<E::Record>> {
        debug!(table = self.table(), "Listing records");
        let raw = self.fetch(&self.schema.list_params()).await?;
        decode_all::<E>(raw)
    }

    /// Records whose fields equal the given values, in default order
    pub async fn find_where(&self, filters: &[(&str, Value)]) -> Result<Vec<E::Record>> {
        let params = self.schema.filter_params(where_clauses(filters))?;
        debug!(table = self.table(), filters = filters.len(), "Listing filtered records");
        let raw = self.fetch(&params).await?;
        decode_all::<E>(raw)
    }

    /// One record by id
    ///
    /// A successful response without a record becomes `NotFound`.
    pub async fn get_by_id(&self, id: i64) -> Result<E::Record> {
        debug!(table = self.table(), record_id = id, "Getting record");
        let response = self.store
            .get_record_by_id(self.table(), id, &self.schema.get_params())
            .await?;

        if !response.success {
            let message = response.message.unwrap_or_else(|| format!("Failed to fetch {} record", self.table()));
            warn!(table = self.table(), record_id = id, message = %message, "Record store rejected lookup");
            return Err(ClassroomHubError::remote(self.table(), message));
        }

        match response.data {
            Some(record) if !record.is_empty() => decode::<E>(record),
            _ => Err(ClassroomHubError::not_found(self.table(), id)),
        }
    }

    /// Create one record; the store-assigned id is on the returned record
    pub async fn create(&self, input: &E::Input) -> Result<E::Record> {
        let mut created = self.create_many(std::slice::from_ref(input)).await?;
        created.pop().ok_or_else(|| missing_data(self.table(), WriteKind::Create))
    }

    /// Create several records in one request
    ///
    /// If the store rejects any record the whole call fails with the first
    /// rejection's message and no created record is returned.
    pub async fn create_many(&self, inputs: &[E::Input]) -> Result<Vec<E::Record>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let records = inputs
            .iter()
            .map(|input| self.payload_record(input, None))
            .collect::<Result<Vec<_>>>()?;

        let payload = RecordsPayload { records };
        let response = self.store.create_records(self.table(), &payload).await?;
        let created = self.written_records(WriteKind::Create, &payload, response)?;

        info!(table = self.table(), count = created.len(), "Records created");
        decode_all::<E>(created)
    }

    /// Replace the writable fields of record `id`
    pub async fn update(&self, id: i64, input: &E::Input) -> Result<E::Record> {
        let mut updated = self.update_many(&[(id, input)]).await?;
        updated.pop().ok_or_else(|| missing_data(self.table(), WriteKind::Update))
    }

    /// Update several records in one request, with the same all-or-error rule as `create_many`
    pub async fn update_many(&self, updates: &[(i64, &E::Input)]) -> Result<Vec<E::Record>> {
        if updates.is_empty() {
            return Ok(Vec::new());
        }

        let records = updates
            .iter()
            .map(|(id, input)| self.payload_record(input, Some(*id)))
            .collect::<Result<Vec<_>>>()?;

        let payload = RecordsPayload { records };
        let response = self.store.update_records(self.table(), &payload).await?;
        let updated = self.written_records(WriteKind::Update, &payload, response)?;

        info!(table = self.table(), count = updated.len(), "Records updated");
        decode_all::<E>(updated)
    }

    /// Delete record `id`
    ///
    /// Whatever the store reports for an unknown id is passed through.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let params = DeleteParams { record_ids: vec![id] };
        let response = self.store.delete_records(self.table(), &params).await?;

        self.check_store_success(WriteKind::Delete, &response)?;
        let failed = response.failed_results();
        if let Some(first) = failed.first() {
            let message = rejection_message(first, self.table(), WriteKind::Delete);
            log_rejected_records(WriteKind::Delete.verb(), self.table(), failed.len(), &message);
            return Err(ClassroomHubError::validation(self.table(), message));
        }

        info!(table = self.table(), record_id = id, "Record deleted");
        Ok(true)
    }

    /// Update the record matching `natural_key`, or create one if none does
    ///
    /// This is a lookup followed by a write. With key locks installed, calls
    /// through clients sharing the lock table are serialized per key;
    /// writers in other processes can still race and create duplicates
    /// unless the store enforces uniqueness on the key.
    pub async fn upsert_by_key(&self, natural_key: &[(&str, Value)], input: &E::Input) -> Result<E::Record> {
        if natural_key.is_empty() {
            return Err(ClassroomHubError::InvalidInput("Natural key must name at least one field".to_string()));
        }

        let _guard = match &self.key_locks {
            Some(locks) => Some(locks.acquire(&self.lock_key(natural_key)).await?),
            None => None,
        };

        let params = FetchParams {
            fields: vec![FieldSpec::plain(NAME_FIELD)],
            ..self.schema.filter_params(where_clauses(natural_key))?
        };
        let existing = self.fetch(&params).await?;

        let existing_id = existing
            .first()
            .and_then(|record| record.get(ID_FIELD))
            .and_then(Value::as_i64);

        if existing.len() > 1 {
            warn!(table = self.table(), matches = existing.len(), "Natural key matches several records, updating the first");
        }

        match existing_id {
            Some(id) => {
                debug!(table = self.table(), record_id = id, "Upsert found existing record");
                self.update(id, input).await
            }
            None => {
                debug!(table = self.table(), "Upsert found no record, creating");
                self.create(input).await
            }
        }
    }

    /// Cheap reachability check: asks for no rows and only the name field
    pub async fn ping(&self) -> Result<()> {
        let params = FetchParams {
            fields: vec![FieldSpec::plain(NAME_FIELD)],
            order_by: Vec::new(),
            where_clauses: vec![WhereClause::equal_to(ID_FIELD, Value::from(0))],
        };
        self.fetch(&params).await.map(|_| ())
    }

    fn lock_key(&self, natural_key: &[(&str, Value)]) -> String {
        let mut parts: Vec<String> = natural_key
            .iter()
            .map(|(field, value)| format!("{}={}", field, value))
            .collect();
        parts.sort();
        format!("{}:{}", self.table(), parts.join("&"))
    }

    fn payload_record(&self, input: &E::Input, id: Option<i64>) -> Result<RawRecord> {
        E::validate_input(input)?;
        match serde_json::to_value(input)? {
            Value::Object(map) => Ok(self.schema.write_record(&map, id)),
            _ => Err(ClassroomHubError::InvalidInput(
                format!("{} input must serialize to an object", self.table())
            )),
        }
    }

    async fn fetch(&self, params: &FetchParams) -> Result<Vec<RawRecord>> {
        let response = self.store.fetch_records(self.table(), params).await?;

        if !response.success {
            let message = response.message.unwrap_or_else(|| format!("Failed to fetch {} records", self.table()));
            warn!(table = self.table(), message = %message, "Record store rejected fetch");
            return Err(ClassroomHubError::remote(self.table(), message));
        }

        Ok(response.data.unwrap_or_default())
    }

    fn check_store_success(&self, kind: WriteKind, response: &WriteResponse) -> Result<()> {
        if response.success {
            return Ok(());
        }

        let message = response
            .message
            .clone()
            .unwrap_or_else(|| format!("Failed to {} {} record", kind.verb(), self.table()));
        warn!(table = self.table(), operation = kind.verb(), message = %message, "Record store rejected request");
        Err(ClassroomHubError::remote(self.table(), message))
    }

    /// Records reported as written, or the first per-record failure
    fn written_records(&self, kind: WriteKind, payload: &RecordsPayload, response: WriteResponse) -> Result<Vec<RawRecord>> {
        self.check_store_success(kind, &response)?;

        let failed = response.failed_results();
        if let Some(first) = failed.first() {
            let message = rejection_message(first, self.table(), kind);
            log_rejected_records(kind.verb(), self.table(), failed.len(), &message);

            if matches!(kind, WriteKind::Update) && first.is_not_found() {
                let id = self.failed_record_id(payload, &response).unwrap_or_default();
                return Err(ClassroomHubError::not_found(self.table(), id));
            }
            return Err(ClassroomHubError::validation(self.table(), message));
        }

        match response.results {
            Some(results) if results.len() != payload.records.len() => {
                warn!(table = self.table(), sent = payload.records.len(), returned = results.len(), "Record store result count mismatch");
                Err(ClassroomHubError::Transport(StoreError::InvalidResponse(format!(
                    "{} response for '{}' reported {} results for {} records",
                    kind.verb(), self.table(), results.len(), payload.records.len()
                ))))
            }
            Some(results) => results
                .into_iter()
                .map(|result| result.data.ok_or_else(|| missing_data(self.table(), kind)))
                .collect(),
            None => match response.data {
                Some(data) if payload.records.len() == 1 => Ok(vec![data]),
                _ => Err(missing_data(self.table(), kind)),
            },
        }
    }

    fn failed_record_id(&self, payload: &RecordsPayload, response: &WriteResponse) -> Option<i64> {
        let position = response.results.as_ref()?.iter().position(|r| !r.success)?;
        payload.records.get(position)?.get(ID_FIELD)?.as_i64()
    }
}

fn where_clauses(filters: &[(&str, Value)]) -> Vec<WhereClause> {
    filters
        .iter()
        .map(|(field, value)| WhereClause::equal_to(field, value.clone()))
        .collect()
}

fn rejection_message(result: &RecordResult, table: &str, kind: WriteKind) -> String {
    result
        .message
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Failed to {} {} record", kind.verb(), table))
}

fn missing_data(table: &str, kind: WriteKind) -> ClassroomHubError {
    ClassroomHubError::Transport(StoreError::InvalidResponse(format!(
        "{} response for '{}' carried no record data", kind.verb(), table
    )))
}

fn decode<E: Entity>(record: RawRecord) -> Result<E::Record> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

fn decode_all<E: Entity>(records: Vec<RawRecord>) -> Result<Vec<E::Record>> {
    records.into_iter().map(decode::<E>).collect()
}
