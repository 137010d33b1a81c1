use serde::{Deserialize, Serialize};

/// Запрос на загрузку Excel файла (содержимое в base64)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadExcelRequest {
    /// Base64 payload; a `data:...;base64,` prefix is accepted
    #[serde(default)]
    pub excel: Option<String>,
}
