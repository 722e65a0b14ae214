//! Trade record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/delete/read APIs over the `trade_records` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths run inside one explicit transaction each.
//! - A failed write is rolled back and its original error returned unchanged.
//! - Deleting a missing id is a normal `false` outcome, not an error.

use crate::db::DbError;
use crate::model::trade_record::{
    NewTradeRecord, TradeRecord, TradeRecordId, TradeRecordValidationError,
};
use chrono::Utc;
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction,
    TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TRADE_RECORD_SELECT_SQL: &str = "SELECT
    id,
    hs_2_code,
    hs_4_code,
    hs_6_code,
    hs_10_code,
    product_name,
    measure,
    export_volume,
    export_price,
    import_volume,
    import_price,
    trading_partner,
    year,
    hs_group,
    created_at
FROM trade_records";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for trade record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TradeRecordValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted trade record data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TradeRecordValidationError> for RepoError {
    fn from(value: TradeRecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filters for listing trade records. Unset filters match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeRecordQuery {
    pub hs_2_code: Option<String>,
    pub hs_4_code: Option<String>,
    pub hs_6_code: Option<String>,
    pub hs_10_code: Option<String>,
    pub trading_partner: Option<String>,
    pub year: Option<i32>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for trade record operations.
pub trait TradeRecordRepository {
    /// Inserts one record and returns it as stored, including `id` and
    /// `created_at`.
    fn create_record(&mut self, record: &NewTradeRecord) -> RepoResult<TradeRecord>;
    /// Deletes by id. Returns `false` when no such record exists.
    fn delete_record(&mut self, id: TradeRecordId) -> RepoResult<bool>;
    fn get_record(&self, id: TradeRecordId) -> RepoResult<Option<TradeRecord>>;
    /// Lists records matching `query`, ordered by id ascending.
    fn list_records(&self, query: &TradeRecordQuery) -> RepoResult<Vec<TradeRecord>>;
    fn count_records(&self) -> RepoResult<u64>;
}

/// SQLite-backed trade record repository.
pub struct SqliteTradeRecordRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteTradeRecordRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl TradeRecordRepository for SqliteTradeRecordRepository<'_> {
    fn create_record(&mut self, record: &NewTradeRecord) -> RepoResult<TradeRecord> {
        record.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let result = insert_record(&tx, record);
        let created = finish_write(tx, "trade_record_create", result)?;

        info!(
            "event=trade_record_create module=repo status=ok id={}",
            created.id
        );
        Ok(created)
    }

    fn delete_record(&mut self, id: TradeRecordId) -> RepoResult<bool> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let result = tx
            .execute("DELETE FROM trade_records WHERE id = ?1;", [id])
            .map(|changed| changed > 0)
            .map_err(RepoError::from);
        let deleted = finish_write(tx, "trade_record_delete", result)?;

        info!(
            "event=trade_record_delete module=repo status=ok id={} found={}",
            id, deleted
        );
        Ok(deleted)
    }

    fn get_record(&self, id: TradeRecordId) -> RepoResult<Option<TradeRecord>> {
        load_record(self.conn, id)
    }

    fn list_records(&self, query: &TradeRecordQuery) -> RepoResult<Vec<TradeRecord>> {
        let mut sql = format!("{TRADE_RECORD_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        let text_filters = [
            ("hs_2_code", &query.hs_2_code),
            ("hs_4_code", &query.hs_4_code),
            ("hs_6_code", &query.hs_6_code),
            ("hs_10_code", &query.hs_10_code),
            ("trading_partner", &query.trading_partner),
        ];
        for (column, filter) in text_filters {
            if let Some(value) = filter {
                sql.push_str(&format!(" AND {column} = ?"));
                bind_values.push(Value::Text(value.clone()));
            }
        }

        if let Some(year) = query.year {
            sql.push_str(" AND year = ?");
            bind_values.push(Value::Integer(i64::from(year)));
        }

        sql.push_str(" ORDER BY id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(bind_values), parse_record_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn count_records(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM trade_records;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }
}

fn insert_record(tx: &Transaction<'_>, record: &NewTradeRecord) -> RepoResult<TradeRecord> {
    tx.execute(
        "INSERT INTO trade_records (
            hs_2_code,
            hs_4_code,
            hs_6_code,
            hs_10_code,
            product_name,
            measure,
            export_volume,
            export_price,
            import_volume,
            import_price,
            trading_partner,
            year,
            hs_group,
            created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
        params![
            record.hs_2_code.as_deref(),
            record.hs_4_code.as_deref(),
            record.hs_6_code.as_deref(),
            record.hs_10_code.as_deref(),
            record.product_name.as_deref(),
            record.measure.as_deref(),
            record.export_volume,
            record.export_price,
            record.import_volume,
            record.import_price,
            record.trading_partner.as_deref(),
            record.year,
            record.hs_group.as_deref(),
            record.created_at.unwrap_or_else(Utc::now),
        ],
    )?;

    let id = tx.last_insert_rowid();
    load_record(tx, id)?.ok_or_else(|| {
        RepoError::InvalidData(format!("inserted trade record {id} could not be read back"))
    })
}

/// Commits on success; otherwise rolls back and returns the original error.
fn finish_write<T>(tx: Transaction<'_>, event: &str, result: RepoResult<T>) -> RepoResult<T> {
    match result {
        Ok(value) => {
            // A failed COMMIT leaves the transaction open; dropping it rolls back.
            tx.commit().map_err(|err| {
                warn!("event={event} module=repo status=error stage=commit error={err}");
                RepoError::from(err)
            })?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback() {
                warn!("event={event} module=repo status=error stage=rollback error={rollback_err}");
            }
            warn!("event={event} module=repo status=rolled_back error={err}");
            Err(err)
        }
    }
}

fn load_record(conn: &Connection, id: TradeRecordId) -> RepoResult<Option<TradeRecord>> {
    let record = conn
        .query_row(
            &format!("{TRADE_RECORD_SELECT_SQL} WHERE id = ?1;"),
            [id],
            parse_record_row,
        )
        .optional()?;
    Ok(record)
}

fn parse_record_row(row: &Row<'_>) -> rusqlite::Result<TradeRecord> {
    Ok(TradeRecord {
        id: row.get("id")?,
        hs_2_code: row.get("hs_2_code")?,
        hs_4_code: row.get("hs_4_code")?,
        hs_6_code: row.get("hs_6_code")?,
        hs_10_code: row.get("hs_10_code")?,
        product_name: row.get("product_name")?,
        measure: row.get("measure")?,
        export_volume: row.get("export_volume")?,
        export_price: row.get("export_price")?,
        import_volume: row.get("import_volume")?,
        import_price: row.get("import_price")?,
        trading_partner: row.get("trading_partner")?,
        year: row.get("year")?,
        hs_group: row.get("hs_group")?,
        created_at: row.get("created_at")?,
    })
}
