use serde::{Deserialize, Serialize};

/// Итог импорта
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Human-readable outcome, kept under `value` for action-style clients
    #[serde(rename = "value")]
    pub message: String,
    pub inserted_count: usize,
    pub skipped_count: usize,
    /// Rows dropped by validation, with the reasons
    #[serde(default)]
    pub rejected_rows: Vec<RejectedRow>,
    /// Rows whose storage call failed while continuing past errors
    #[serde(default)]
    pub failed_rows: Vec<FailedRow>,
}

impl ImportSummary {
    pub fn completed_message(inserted: usize, skipped: usize) -> String {
        format!(
            "Upload completed: {} new records added, {} duplicates skipped",
            inserted, skipped
        )
    }
}

/// Строка, не прошедшая валидацию
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedRow {
    /// 1-based worksheet row number
    pub row_number: usize,
    pub reasons: Vec<String>,
}

/// Строка, которую не удалось сохранить
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRow {
    pub row_number: usize,
    pub order_id: String,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_wire_shape() {
        let summary = ImportSummary {
            message: ImportSummary::completed_message(3, 1),
            inserted_count: 3,
            skipped_count: 1,
            rejected_rows: vec![RejectedRow {
                row_number: 5,
                reasons: vec!["Revenue must be greater than 0".into()],
            }],
            failed_rows: vec![],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json["value"],
            "Upload completed: 3 new records added, 1 duplicates skipped"
        );
        assert_eq!(json["insertedCount"], 3);
        assert_eq!(json["rejectedRows"][0]["rowNumber"], 5);
    }
}
