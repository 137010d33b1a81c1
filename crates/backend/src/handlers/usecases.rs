use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use contracts::usecases::u501_import_sales_excel::{ImportSummary, UploadExcelRequest};

use crate::shared::app_state::AppState;
use crate::shared::error::AppError;
use crate::usecases::u501_import_sales_excel;

const NO_EXCEL_DATA: &str = "No Excel data provided";

/// POST /api/sales-orders/upload-excel
pub async fn u501_upload_excel(
    State(state): State<AppState>,
    payload: Result<Json<UploadExcelRequest>, JsonRejection>,
) -> Result<Json<ImportSummary>, AppError> {
    let Json(request) = payload?;
    let encoded = request
        .excel
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::InvalidRequest(NO_EXCEL_DATA.to_string()))?;

    let bytes = decode_excel_payload(encoded)?;
    run_import(&state, &bytes).await
}

/// POST /api/sales-orders/upload-excel/file
pub async fn u501_upload_excel_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportSummary>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.file_name().is_none() {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(format!("Failed to read upload: {}", e)))?;
        if bytes.is_empty() {
            break;
        }
        return run_import(&state, &bytes).await;
    }

    Err(AppError::InvalidRequest(NO_EXCEL_DATA.to_string()))
}

async fn run_import(state: &AppState, bytes: &[u8]) -> Result<Json<ImportSummary>, AppError> {
    let summary =
        u501_import_sales_excel::import_excel(state.orders.as_ref(), bytes, &state.import).await?;
    Ok(Json(summary))
}

/// Base64 body of the upload; a `data:<mime>;base64,` prefix is stripped
fn decode_excel_payload(payload: &str) -> Result<Vec<u8>, AppError> {
    let encoded = match payload.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    };
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| AppError::InvalidRequest(format!("Excel payload is not valid base64: {}", e)))?;
    if bytes.is_empty() {
        return Err(AppError::InvalidRequest(NO_EXCEL_DATA.to_string()));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_and_data_url() {
        let encoded = STANDARD.encode(b"PK\x03\x04");
        assert_eq!(decode_excel_payload(&encoded).unwrap(), b"PK\x03\x04");

        let data_url = format!(
            "data:application/vnd.openxmlformats-officedocument.spreadsheetml.sheet;base64,{}",
            encoded
        );
        assert_eq!(decode_excel_payload(&data_url).unwrap(), b"PK\x03\x04");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_excel_payload("***").unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }
}
