//! Static schema descriptor for the `trade_records` table.
//!
//! The migration SQL is the source of truth for the on-disk layout; this
//! table mirrors it so validation and inspection code can reason about
//! columns without parsing DDL.

use crate::db::DbResult;
use rusqlite::Connection;

pub const TRADE_RECORDS_TABLE: &str = "trade_records";

/// Declared storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Text,
    Real,
    Timestamp,
}

/// One column of a mapped table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnType,
    /// Maximum length in characters for text columns.
    pub max_chars: Option<usize>,
    pub indexed: bool,
    pub nullable: bool,
}

const fn column(name: &'static str, kind: ColumnType) -> ColumnDef {
    ColumnDef {
        name,
        kind,
        max_chars: None,
        indexed: false,
        nullable: true,
    }
}

const fn text(name: &'static str, max_chars: usize, indexed: bool) -> ColumnDef {
    ColumnDef {
        name,
        kind: ColumnType::Text,
        max_chars: Some(max_chars),
        indexed,
        nullable: true,
    }
}

pub const TRADE_RECORD_COLUMNS: &[ColumnDef] = &[
    ColumnDef {
        name: "id",
        kind: ColumnType::Integer,
        max_chars: None,
        indexed: false,
        nullable: false,
    },
    text("hs_2_code", 2, true),
    text("hs_4_code", 4, true),
    text("hs_6_code", 6, true),
    text("hs_10_code", 10, true),
    text("product_name", 500, false),
    text("measure", 50, false),
    column("export_volume", ColumnType::Real),
    column("export_price", ColumnType::Real),
    column("import_volume", ColumnType::Real),
    column("import_price", ColumnType::Real),
    text("trading_partner", 100, false),
    ColumnDef {
        indexed: true,
        ..column("year", ColumnType::Integer)
    },
    text("hs_group", 200, false),
    ColumnDef {
        nullable: false,
        ..column("created_at", ColumnType::Timestamp)
    },
];

/// Looks up a column definition by name.
pub fn trade_record_column(name: &str) -> Option<&'static ColumnDef> {
    TRADE_RECORD_COLUMNS.iter().find(|column| column.name == name)
}

/// Name of the secondary index backing an indexed column.
pub fn index_name(column: &ColumnDef) -> String {
    format!("ix_{TRADE_RECORDS_TABLE}_{}", column.name)
}

/// Returns whether a table with the given name exists in the store.
pub fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Returns the explicitly created index names on `table`, sorted.
pub fn index_names(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name
         FROM sqlite_master
         WHERE type = 'index' AND tbl_name = ?1 AND sql IS NOT NULL
         ORDER BY name ASC;",
    )?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Returns the column names of `table` in declaration order.
pub fn column_names(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid ASC;")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::{
        column_names, index_name, index_names, table_exists, trade_record_column,
        TRADE_RECORDS_TABLE, TRADE_RECORD_COLUMNS,
    };
    use crate::db::open_db_in_memory;

    #[test]
    fn descriptor_matches_materialized_columns() {
        let conn = open_db_in_memory().unwrap();
        let expected: Vec<_> = TRADE_RECORD_COLUMNS
            .iter()
            .map(|column| column.name.to_string())
            .collect();
        assert_eq!(column_names(&conn, TRADE_RECORDS_TABLE).unwrap(), expected);
    }

    #[test]
    fn every_indexed_column_has_an_index() {
        let conn = open_db_in_memory().unwrap();
        let mut expected: Vec<_> = TRADE_RECORD_COLUMNS
            .iter()
            .filter(|column| column.indexed)
            .map(index_name)
            .collect();
        expected.sort();
        assert_eq!(expected.len(), 5);
        assert_eq!(index_names(&conn, TRADE_RECORDS_TABLE).unwrap(), expected);
    }

    #[test]
    fn lookup_reports_text_limits() {
        assert_eq!(trade_record_column("hs_10_code").unwrap().max_chars, Some(10));
        assert_eq!(trade_record_column("year").unwrap().max_chars, None);
        assert!(trade_record_column("missing").is_none());
    }

    #[test]
    fn table_exists_is_false_for_unknown_table() {
        let conn = open_db_in_memory().unwrap();
        assert!(table_exists(&conn, TRADE_RECORDS_TABLE).unwrap());
        assert!(!table_exists(&conn, "trade_partners").unwrap());
    }
}
