use crate::domain::common::{AggregateId, EntityMetadata};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для заказа продаж
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SalesOrderId(pub Uuid);

impl SalesOrderId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl AggregateId for SalesOrderId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(SalesOrderId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

impl std::fmt::Display for SalesOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Заказ продаж (агрегат a001)
///
/// `order_id` is the business key used to detect duplicates across imports,
/// `id` is the storage identifier used for update/delete addressing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalesOrder {
    #[serde(rename = "ID")]
    pub id: SalesOrderId,
    #[serde(rename = "OrderID")]
    pub order_id: String,
    pub region: String,
    pub country: String,
    pub product: String,
    /// Stored at full precision, formatted only for presentation
    pub revenue: f64,
    pub order_date: NaiveDate,
    pub metadata: EntityMetadata,
}

impl SalesOrder {
    pub fn to_string_id(&self) -> String {
        self.id.as_string()
    }
}

/// Проверенные данные заказа для вставки (ID назначает хранилище)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSalesOrder {
    pub order_id: String,
    pub region: String,
    pub country: String,
    pub product: String,
    pub revenue: f64,
    pub order_date: NaiveDate,
}

/// Payload for creating an order through the CRUD endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalesOrderDto {
    #[serde(rename = "OrderID", default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub order_date: Option<NaiveDate>,
}

impl SalesOrderDto {
    /// Проверяет инварианты создания и возвращает данные для вставки
    pub fn validate(&self) -> Result<NewSalesOrder, String> {
        let revenue = self.revenue.unwrap_or(0.0);
        if !revenue.is_finite() {
            return Err("Revenue is not a number".into());
        }
        if revenue <= 0.0 {
            return Err("Revenue must be greater than 0".into());
        }

        let order_id = non_blank(&self.order_id);
        let region = non_blank(&self.region);
        let country = non_blank(&self.country);
        let product = non_blank(&self.product);
        let (Some(order_id), Some(region), Some(country), Some(product)) =
            (order_id, region, country, product)
        else {
            return Err(
                "Missing required fields: OrderID, Region, Country, and Product are mandatory"
                    .into(),
            );
        };

        let order_date = self
            .order_date
            .ok_or_else(|| "Missing required field: OrderDate".to_string())?;

        Ok(NewSalesOrder {
            order_id,
            region,
            country,
            product,
            revenue,
            order_date,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Частичное обновление заказа: заполненные поля перезаписываются
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalesOrderPatch {
    #[serde(rename = "OrderID", default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub order_date: Option<NaiveDate>,
}

impl SalesOrderPatch {
    pub fn is_empty(&self) -> bool {
        self.order_id.is_none()
            && self.region.is_none()
            && self.country.is_none()
            && self.product.is_none()
            && self.revenue.is_none()
            && self.order_date.is_none()
    }

    /// Применяет заполненные поля к заказу
    pub fn apply_to(&self, order: &mut SalesOrder) {
        if let Some(v) = &self.order_id {
            order.order_id = v.clone();
        }
        if let Some(v) = &self.region {
            order.region = v.clone();
        }
        if let Some(v) = &self.country {
            order.country = v.clone();
        }
        if let Some(v) = &self.product {
            order.product = v.clone();
        }
        if let Some(v) = self.revenue {
            order.revenue = v;
        }
        if let Some(v) = self.order_date {
            order.order_date = v;
        }
    }
}

/// Read presentation: Revenue is rendered with two decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalesOrderView {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "OrderID")]
    pub order_id: String,
    pub region: String,
    pub country: String,
    pub product: String,
    pub revenue: String,
    pub order_date: String,
    pub created_at: String,
    pub updated_at: String,
}
