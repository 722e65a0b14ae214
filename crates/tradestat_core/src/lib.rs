//! Persistence layer for international trade statistics.
//! Owns the `trade_records` schema, session lifecycle and record operations.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use config::StoreConfig;
pub use db::{bootstrap_schema, init_store, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::trade_record::{
    FieldMap, NewTradeRecord, TradeRecord, TradeRecordId, TradeRecordValidationError,
};
pub use repo::trade_repo::{
    RepoError, RepoResult, SqliteTradeRecordRepository, TradeRecordQuery, TradeRecordRepository,
};
pub use service::trade_service::{create_record, delete_record, TradeRecordService};
pub use session::{Session, SessionFactory};

