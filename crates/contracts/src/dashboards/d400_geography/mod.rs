use serde::{Deserialize, Serialize};

/// Выручка и количество заказов по паре (регион, страна)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographyAggregate {
    pub region: String,
    pub country: String,
    /// Sum of revenue with exactly two decimals, e.g. "150.00"
    pub total_revenue: String,
    pub record_count: i64,
}
