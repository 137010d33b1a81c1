pub mod request;
pub mod response;

pub use request::UploadExcelRequest;
pub use response::{FailedRow, ImportSummary, RejectedRow};

use crate::usecases::common::UseCaseMetadata;

/// Колонки, которые обязаны присутствовать в заголовке листа
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "OrderID",
    "Region",
    "Country",
    "Product",
    "Revenue",
    "OrderDate",
];

pub struct ImportSalesExcel;

impl UseCaseMetadata for ImportSalesExcel {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "import_sales_excel"
    }

    fn display_name() -> &'static str {
        "Sales order Excel import"
    }

    fn description() -> &'static str {
        "Loads sales orders from the first worksheet of an .xlsx file, skipping known OrderIDs"
    }
}
