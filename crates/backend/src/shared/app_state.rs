use std::sync::Arc;

use crate::domain::a001_sales_order::repository::{SalesOrderRepository, SeaOrmSalesOrderRepository};
use crate::usecases::u501_import_sales_excel::ImportSettings;

/// Shared handler state: the order store plus import settings from config
#[derive(Clone)]
pub struct AppState {
    pub orders: Arc<dyn SalesOrderRepository>,
    pub import: ImportSettings,
}

impl AppState {
    pub fn new(orders: Arc<dyn SalesOrderRepository>, import: ImportSettings) -> Self {
        Self { orders, import }
    }

    pub fn with_connection(db: sea_orm::DatabaseConnection, import: ImportSettings) -> Self {
        Self::new(Arc::new(SeaOrmSalesOrderRepository::new(db)), import)
    }
}
