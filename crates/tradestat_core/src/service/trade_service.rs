//! Trade record use-case service.
//!
//! # Responsibility
//! - Provide the create/delete entry points used by the API layer.
//! - Accept loosely typed field maps and turn them into typed payloads.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or transactions.
//! - Errors from the repository are returned unchanged.

use crate::model::trade_record::{FieldMap, NewTradeRecord, TradeRecord, TradeRecordId};
use crate::repo::trade_repo::{RepoResult, TradeRecordQuery, TradeRecordRepository};
use crate::session::Session;

/// Use-case service wrapper for trade record operations.
pub struct TradeRecordService<R: TradeRecordRepository> {
    repo: R,
}

impl<R: TradeRecordRepository> TradeRecordService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a record from a column name -> value map.
    ///
    /// # Contract
    /// - Unknown columns and mistyped values are rejected before any write.
    /// - Returns the stored record with its assigned id and `created_at`.
    pub fn create_record(&mut self, fields: &FieldMap) -> RepoResult<TradeRecord> {
        let record = NewTradeRecord::from_fields(fields)?;
        self.repo.create_record(&record)
    }

    /// Deletes one record. Returns `false` when the id does not exist.
    pub fn delete_record(&mut self, id: TradeRecordId) -> RepoResult<bool> {
        self.repo.delete_record(id)
    }

    pub fn get_record(&self, id: TradeRecordId) -> RepoResult<Option<TradeRecord>> {
        self.repo.get_record(id)
    }

    pub fn list_records(&self, query: &TradeRecordQuery) -> RepoResult<Vec<TradeRecord>> {
        self.repo.list_records(query)
    }

    pub fn count_records(&self) -> RepoResult<u64> {
        self.repo.count_records()
    }
}

/// Creates one trade record inside `session`.
pub fn create_record(session: &mut Session, fields: &FieldMap) -> RepoResult<TradeRecord> {
    TradeRecordService::new(session.trade_records()).create_record(fields)
}

/// Deletes one trade record inside `session`; `false` when it was not found.
pub fn delete_record(session: &mut Session, id: TradeRecordId) -> RepoResult<bool> {
    TradeRecordService::new(session.trade_records()).delete_record(id)
}
