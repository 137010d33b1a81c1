//! u501: импорт заказов продаж из Excel.
//!
//! Pipeline: [`row_parser`] turns workbook bytes into header-keyed rows,
//! [`normalizer`] coerces and validates them, [`reconciler`] inserts the
//! orders whose OrderID is not stored yet. [`executor::import_excel`] runs
//! the whole chain for one upload.

pub mod executor;
pub mod normalizer;
pub mod reconciler;
pub mod row_parser;

#[cfg(test)]
pub(crate) mod test_support;

use contracts::usecases::u501_import_sales_excel::RejectedRow;
use thiserror::Error;

use crate::domain::a001_sales_order::repository::RepositoryError;

pub use executor::{import_excel, ImportSettings};
pub use reconciler::StorageErrorPolicy;
pub use row_parser::ParserOptions;

#[derive(Debug, Error)]
pub enum ImportError {
    /// Payload is not a readable workbook or the sheet holds no data rows
    #[error("{0}")]
    Parse(String),

    #[error("Missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("No valid data rows found in Excel file")]
    NoValidData { rejected: Vec<RejectedRow> },

    /// Import stopped at `order_id`; rows counted before it are already stored
    #[error("Error processing Excel file: {source}")]
    Storage {
        #[source]
        source: RepositoryError,
        order_id: String,
        inserted: usize,
        skipped: usize,
    },
}

impl ImportError {
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            ImportError::Parse(_) => None,
            ImportError::Schema { missing } => {
                Some(serde_json::json!({ "missingColumns": missing }))
            }
            ImportError::NoValidData { rejected } => {
                Some(serde_json::json!({ "rejectedRows": rejected }))
            }
            ImportError::Storage {
                order_id,
                inserted,
                skipped,
                ..
            } => Some(serde_json::json!({
                "orderId": order_id,
                "insertedCount": inserted,
                "skippedCount": skipped,
            })),
        }
    }
}
