//! Record store module
//!
//! This module contains the boundary to the hosted record store: the wire
//! protocol, the `RecordStore` trait every client talks through, and its
//! HTTP and in-memory implementations.

pub mod http;
pub mod memory;
pub mod protocol;

pub use http::HttpRecordStore;
pub use memory::InMemoryRecordStore;
pub use protocol::{
    DeleteParams, FetchParams, FetchResponse, FieldSpec, GetResponse, OrderBy, RawRecord,
    RecordResult, RecordsPayload, SortType, WhereClause, WriteResponse, ID_FIELD, NAME_FIELD,
};

use async_trait::async_trait;
use crate::utils::errors::Result;

/// Operations offered by a remote record store, one collection ("table") per call
///
/// Implementations return the store's envelopes as-is; interpreting
/// `success` flags is left to the record client. An `Err` means the request
/// itself could not be completed.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<FetchResponse>;

    async fn get_record_by_id(&self, table: &str, id: i64, params: &FetchParams) -> Result<GetResponse>;

    async fn create_records(&self, table: &str, payload: &RecordsPayload) -> Result<WriteResponse>;

    async fn update_records(&self, table: &str, payload: &RecordsPayload) -> Result<WriteResponse>;

    async fn delete_records(&self, table: &str, params: &DeleteParams) -> Result<WriteResponse>;
}
