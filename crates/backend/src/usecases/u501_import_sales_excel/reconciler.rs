use contracts::usecases::u501_import_sales_excel::FailedRow;
use serde::Deserialize;

use super::normalizer::ValidRow;
use super::ImportError;
use crate::domain::a001_sales_order::repository::{RepositoryError, SalesOrderRepository};

/// What to do when storage fails on a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageErrorPolicy {
    /// Stop the import; rows stored so far stay stored
    #[default]
    Abort,
    /// Record the row in `failedRows` and go on
    Continue,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    pub inserted: usize,
    pub skipped: usize,
    pub failed_rows: Vec<FailedRow>,
}

/// Сверка строк файла с уже сохранёнными заказами.
///
/// Rows go one at a time in sheet order, so a repeated OrderID inside the
/// same file is inserted once and skipped afterwards.
pub struct Reconciler<'a> {
    repo: &'a dyn SalesOrderRepository,
    policy: StorageErrorPolicy,
}

impl<'a> Reconciler<'a> {
    pub fn new(repo: &'a dyn SalesOrderRepository, policy: StorageErrorPolicy) -> Self {
        Self { repo, policy }
    }

    pub async fn reconcile(&self, rows: Vec<ValidRow>) -> Result<ReconcileOutcome, ImportError> {
        let mut outcome = ReconcileOutcome::default();

        for row in rows {
            let order_id = row.order.order_id.clone();
            match self.store(&row).await {
                Ok(true) => outcome.inserted += 1,
                Ok(false) => outcome.skipped += 1,
                Err(e) => match self.policy {
                    StorageErrorPolicy::Abort => {
                        tracing::error!(
                            "Import aborted at row {} (OrderID {}): {}",
                            row.row_number,
                            order_id,
                            e
                        );
                        return Err(ImportError::Storage {
                            source: e,
                            order_id,
                            inserted: outcome.inserted,
                            skipped: outcome.skipped,
                        });
                    }
                    StorageErrorPolicy::Continue => {
                        tracing::warn!(
                            "Row {} (OrderID {}) not stored: {}",
                            row.row_number,
                            order_id,
                            e
                        );
                        outcome.failed_rows.push(FailedRow {
                            row_number: row.row_number,
                            order_id,
                            error: e.to_string(),
                        });
                    }
                },
            }
        }

        Ok(outcome)
    }

    /// `Ok(false)` when the OrderID is already stored.
    ///
    /// The unique index on `order_id` makes the insert itself the existence
    /// check, so concurrent uploads of the same order cannot both insert it.
    async fn store(&self, row: &ValidRow) -> Result<bool, RepositoryError> {
        match self.repo.insert(&row.order).await {
            Ok(_) => Ok(true),
            Err(RepositoryError::DuplicateKey(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
