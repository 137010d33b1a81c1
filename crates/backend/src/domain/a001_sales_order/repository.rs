use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::a001_sales_order::{
    NewSalesOrder, SalesOrder, SalesOrderId, SalesOrderPatch,
};
use contracts::domain::common::EntityMetadata;
use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, Set, SqlErr, Statement,
};
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "a001_sales_order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub order_id: String,
    pub region: String,
    pub country: String,
    pub product: String,
    pub revenue: f64,
    pub order_date: chrono::NaiveDate,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for SalesOrder {
    type Error = RepositoryError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let uuid = Uuid::parse_str(&m.id).map_err(|e| RepositoryError::CorruptRecord {
            id: m.id.clone(),
            reason: e.to_string(),
        })?;
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            version: m.version,
        };

        Ok(SalesOrder {
            id: SalesOrderId::new(uuid),
            order_id: m.order_id,
            region: m.region,
            country: m.country,
            product: m.product,
            revenue: m.revenue,
            order_date: m.order_date,
            metadata,
        })
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The unique index on `order_id` rejected the write
    #[error("duplicate OrderID '{0}'")]
    DuplicateKey(String),

    /// Stored row whose `id` is not a UUID; it cannot be addressed by ID
    #[error("corrupt sales order row '{id}': {reason}")]
    CorruptRecord { id: String, reason: String },

    #[error(transparent)]
    Database(#[from] DbErr),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

fn map_write_err(err: DbErr, order_id: &str) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            RepositoryError::DuplicateKey(order_id.to_string())
        }
        _ => RepositoryError::Database(err),
    }
}

/// Сумма выручки и количество заказов по паре (регион, страна)
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct RegionCountryTotals {
    pub region: String,
    pub country: String,
    pub total_revenue: f64,
    pub record_count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct SalesOrderFilter {
    pub region: Option<String>,
    pub country: Option<String>,
}

/// Хранилище заказов продаж.
///
/// Each call is an independent operation; callers never see transactions.
#[async_trait]
pub trait SalesOrderRepository: Send + Sync {
    async fn find_by_order_id(&self, order_id: &str) -> RepositoryResult<Option<SalesOrder>>;

    async fn get_by_id(&self, id: SalesOrderId) -> RepositoryResult<Option<SalesOrder>>;

    async fn list(&self, filter: &SalesOrderFilter) -> RepositoryResult<Vec<SalesOrder>>;

    /// Inserts the order under a freshly assigned `ID`
    async fn insert(&self, order: &NewSalesOrder) -> RepositoryResult<SalesOrder>;

    /// Returns `None` when no order has this `ID`
    async fn update(
        &self,
        id: SalesOrderId,
        patch: &SalesOrderPatch,
    ) -> RepositoryResult<Option<SalesOrder>>;

    async fn delete(&self, id: SalesOrderId) -> RepositoryResult<bool>;

    /// Groups by (Region, Country), largest revenue first
    async fn aggregate_by_region_country(&self) -> RepositoryResult<Vec<RegionCountryTotals>>;
}

#[derive(Clone)]
pub struct SeaOrmSalesOrderRepository {
    db: DatabaseConnection,
}

impl SeaOrmSalesOrderRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SalesOrderRepository for SeaOrmSalesOrderRepository {
    async fn find_by_order_id(&self, order_id: &str) -> RepositoryResult<Option<SalesOrder>> {
        let result = Entity::find()
            .filter(Column::OrderId.eq(order_id))
            .one(&self.db)
            .await?;
        result.map(SalesOrder::try_from).transpose()
    }

    async fn get_by_id(&self, id: SalesOrderId) -> RepositoryResult<Option<SalesOrder>> {
        let result = Entity::find_by_id(id.to_string()).one(&self.db).await?;
        result.map(SalesOrder::try_from).transpose()
    }

    async fn list(&self, filter: &SalesOrderFilter) -> RepositoryResult<Vec<SalesOrder>> {
        let mut query = Entity::find();
        if let Some(region) = &filter.region {
            query = query.filter(Column::Region.eq(region.as_str()));
        }
        if let Some(country) = &filter.country {
            query = query.filter(Column::Country.eq(country.as_str()));
        }
        let items = query
            .order_by_desc(Column::OrderDate)
            .order_by_asc(Column::OrderId)
            .all(&self.db)
            .await?
            .into_iter()
            .map(SalesOrder::try_from)
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(items)
    }

    async fn insert(&self, order: &NewSalesOrder) -> RepositoryResult<SalesOrder> {
        let now = Utc::now();
        let active = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            order_id: Set(order.order_id.clone()),
            region: Set(order.region.clone()),
            country: Set(order.country.clone()),
            product: Set(order.product.clone()),
            revenue: Set(order.revenue),
            order_date: Set(order.order_date),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            version: Set(0),
        };
        let model = active
            .insert(&self.db)
            .await
            .map_err(|e| map_write_err(e, &order.order_id))?;
        SalesOrder::try_from(model)
    }

    async fn update(
        &self,
        id: SalesOrderId,
        patch: &SalesOrderPatch,
    ) -> RepositoryResult<Option<SalesOrder>> {
        let Some(existing) = Entity::find_by_id(id.to_string()).one(&self.db).await? else {
            return Ok(None);
        };

        let mut order = SalesOrder::try_from(existing)?;
        patch.apply_to(&mut order);
        order.metadata.touch();

        let active = ActiveModel {
            id: Set(id.to_string()),
            order_id: Set(order.order_id.clone()),
            region: Set(order.region.clone()),
            country: Set(order.country.clone()),
            product: Set(order.product.clone()),
            revenue: Set(order.revenue),
            order_date: Set(order.order_date),
            updated_at: Set(Some(order.metadata.updated_at)),
            version: Set(order.metadata.version),
            created_at: sea_orm::ActiveValue::NotSet,
        };
        active
            .update(&self.db)
            .await
            .map_err(|e| map_write_err(e, &order.order_id))?;
        Ok(Some(order))
    }

    async fn delete(&self, id: SalesOrderId) -> RepositoryResult<bool> {
        let result = Entity::delete_by_id(id.to_string()).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn aggregate_by_region_country(&self) -> RepositoryResult<Vec<RegionCountryTotals>> {
        // Ties on revenue fall back to region/country so the order is stable
        let sql = r#"
            SELECT
                region,
                country,
                CAST(SUM(revenue) AS REAL) AS total_revenue,
                COUNT(*) AS record_count
            FROM a001_sales_order
            GROUP BY region, country
            ORDER BY total_revenue DESC, region ASC, country ASC
        "#;

        let stmt = Statement::from_sql_and_values(sea_orm::DatabaseBackend::Sqlite, sql, []);
        let results = RegionCountryTotals::find_by_statement(stmt)
            .all(&self.db)
            .await?;
        Ok(results)
    }
}
