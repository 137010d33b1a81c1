use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u501_import_sales_excel::{ImportSalesExcel, ImportSummary};
use std::time::Instant;

use super::normalizer::{check_required_columns, partition};
use super::reconciler::{Reconciler, StorageErrorPolicy};
use super::row_parser::{parse_workbook, ParserOptions};
use super::ImportError;
use crate::domain::a001_sales_order::repository::SalesOrderRepository;

/// Настройки импорта из секции `[import]` конфига
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImportSettings {
    pub parser: ParserOptions,
    pub on_storage_error: StorageErrorPolicy,
}

/// Imports one uploaded workbook.
///
/// Orders whose OrderID is already stored are skipped, so re-uploading the
/// same file inserts nothing. Nothing is written when parsing, the header
/// check or row validation fails.
pub async fn import_excel(
    repo: &dyn SalesOrderRepository,
    bytes: &[u8],
    settings: &ImportSettings,
) -> Result<ImportSummary, ImportError> {
    let started = Instant::now();
    let usecase = ImportSalesExcel::full_name();
    tracing::info!("{}: started, {} bytes", usecase, bytes.len());

    let sheet = parse_workbook(bytes, &settings.parser)?;
    check_required_columns(&sheet.headers)?;

    let (valid, rejected) = partition(&sheet.rows);
    if !rejected.is_empty() {
        tracing::warn!(
            "{} of {} row(s) rejected by validation",
            rejected.len(),
            sheet.rows.len()
        );
    }
    if valid.is_empty() {
        return Err(ImportError::NoValidData { rejected });
    }

    let outcome = Reconciler::new(repo, settings.on_storage_error)
        .reconcile(valid)
        .await?;

    tracing::info!(
        "{}: finished in {} ms, inserted={}, skipped={}, rejected={}, failed={}",
        usecase,
        started.elapsed().as_millis(),
        outcome.inserted,
        outcome.skipped,
        rejected.len(),
        outcome.failed_rows.len()
    );

    Ok(ImportSummary {
        message: ImportSummary::completed_message(outcome.inserted, outcome.skipped),
        inserted_count: outcome.inserted,
        skipped_count: outcome.skipped,
        rejected_rows: rejected,
        failed_rows: outcome.failed_rows,
    })
}
