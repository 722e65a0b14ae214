//! Trade statistics record model.
//!
//! # Responsibility
//! - Define the persisted `TradeRecord` row and its insert payload.
//! - Convert loosely typed field maps into typed payloads.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes afterwards.
//! - `created_at` defaults to the insert time in UTC when the caller leaves
//!   it unset, and is never changed afterwards.
//! - Text fields never exceed the column limits declared in
//!   [`crate::db::schema::TRADE_RECORD_COLUMNS`].
//! - HS codes at different granularities are not checked for consistency,
//!   and duplicate observations are allowed.

use crate::db::schema::trade_record_column;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned row identifier.
pub type TradeRecordId = i64;

/// Column name -> value mapping accepted by the create path.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// One observed trade statistic as stored in `trade_records`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: TradeRecordId,
    pub hs_2_code: Option<String>,
    pub hs_4_code: Option<String>,
    pub hs_6_code: Option<String>,
    pub hs_10_code: Option<String>,
    pub product_name: Option<String>,
    /// Unit of quantity, e.g. `kg` or `pcs`.
    pub measure: Option<String>,
    pub export_volume: Option<f64>,
    pub export_price: Option<f64>,
    pub import_volume: Option<f64>,
    pub import_price: Option<f64>,
    pub trading_partner: Option<String>,
    pub year: Option<i32>,
    pub hs_group: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a trade record. Every column is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NewTradeRecord {
    pub hs_2_code: Option<String>,
    pub hs_4_code: Option<String>,
    pub hs_6_code: Option<String>,
    pub hs_10_code: Option<String>,
    pub product_name: Option<String>,
    pub measure: Option<String>,
    pub export_volume: Option<f64>,
    pub export_price: Option<f64>,
    pub import_volume: Option<f64>,
    pub import_price: Option<f64>,
    pub trading_partner: Option<String>,
    pub year: Option<i32>,
    pub hs_group: Option<String>,
    /// Observation timestamp; the insert time is used when unset.
    pub created_at: Option<DateTime<Utc>>,
}

/// Validation failures for trade record payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeRecordValidationError {
    FieldTooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
    /// The field map had an unknown column or a value of the wrong type.
    InvalidFields(String),
}

impl Display for TradeRecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FieldTooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "{field} is {actual_chars} characters long; at most {max_chars} allowed"
            ),
            Self::InvalidFields(message) => write!(f, "invalid trade record fields: {message}"),
        }
    }
}

impl Error for TradeRecordValidationError {}

impl NewTradeRecord {
    /// Builds a payload from a column name -> value map.
    ///
    /// Missing keys and JSON `null` leave the column unset.
    pub fn from_fields(fields: &FieldMap) -> Result<Self, TradeRecordValidationError> {
        serde_json::from_value(serde_json::Value::Object(fields.clone()))
            .map_err(|err| TradeRecordValidationError::InvalidFields(err.to_string()))
    }

    /// Checks declared column limits.
    pub fn validate(&self) -> Result<(), TradeRecordValidationError> {
        for (field, value) in self.text_fields() {
            let Some(value) = value else {
                continue;
            };
            let Some(max_chars) = trade_record_column(field).and_then(|column| column.max_chars)
            else {
                continue;
            };
            let actual_chars = value.chars().count();
            if actual_chars > max_chars {
                return Err(TradeRecordValidationError::FieldTooLong {
                    field,
                    max_chars,
                    actual_chars,
                });
            }
        }
        Ok(())
    }

    fn text_fields(&self) -> [(&'static str, Option<&str>); 8] {
        [
            ("hs_2_code", self.hs_2_code.as_deref()),
            ("hs_4_code", self.hs_4_code.as_deref()),
            ("hs_6_code", self.hs_6_code.as_deref()),
            ("hs_10_code", self.hs_10_code.as_deref()),
            ("product_name", self.product_name.as_deref()),
            ("measure", self.measure.as_deref()),
            ("trading_partner", self.trading_partner.as_deref()),
            ("hs_group", self.hs_group.as_deref()),
        ]
    }
}
