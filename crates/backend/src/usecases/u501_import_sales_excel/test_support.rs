//! Workbook builders and a scripted repository for pipeline tests.

use async_trait::async_trait;
use chrono::Utc;
use contracts::domain::a001_sales_order::{
    NewSalesOrder, SalesOrder, SalesOrderId, SalesOrderPatch,
};
use contracts::domain::common::EntityMetadata;
use rust_xlsxwriter::{Format, Workbook};
use sea_orm::DbErr;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::domain::a001_sales_order::repository::{
    RegionCountryTotals, RepositoryError, RepositoryResult, SalesOrderFilter,
    SalesOrderRepository,
};

#[derive(Debug, Clone, Copy)]
pub enum Cell {
    S(&'static str),
    N(f64),
    /// Serial number written with a date format
    Date(f64),
    B(bool),
    Blank,
}

pub fn workbook(rows: &[Vec<Cell>]) -> Vec<u8> {
    workbook_with_sheets(&[rows.to_vec()])
}

pub fn workbook_with_sheets(sheets: &[Vec<Vec<Cell>>]) -> Vec<u8> {
    let mut book = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    for rows in sheets {
        let sheet = book.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match *cell {
                    Cell::S(s) => {
                        sheet.write_string(r, c, s).unwrap();
                    }
                    Cell::N(n) => {
                        sheet.write_number(r, c, n).unwrap();
                    }
                    Cell::Date(serial) => {
                        sheet
                            .write_number_with_format(r, c, serial, &date_format)
                            .unwrap();
                    }
                    Cell::B(b) => {
                        sheet.write_boolean(r, c, b).unwrap();
                    }
                    Cell::Blank => {}
                }
            }
        }
    }
    book.save_to_buffer().unwrap()
}

pub fn header_row() -> Vec<Cell> {
    ["OrderID", "Region", "Country", "Product", "Revenue", "OrderDate"]
        .into_iter()
        .map(Cell::S)
        .collect()
}

pub fn order_row(
    order_id: &'static str,
    region: &'static str,
    country: &'static str,
    revenue: f64,
) -> Vec<Cell> {
    vec![
        Cell::S(order_id),
        Cell::S(region),
        Cell::S(country),
        Cell::S("Widget"),
        Cell::N(revenue),
        Cell::S("2024-01-15"),
    ]
}

/// Vec-backed repository with scripted failures; OrderID is unique like in SQLite
#[derive(Default)]
pub struct ScriptedRepository {
    pub orders: Mutex<Vec<SalesOrder>>,
    /// Inserts of these OrderIDs fail with a database error
    pub failing_inserts: Mutex<HashSet<String>>,
    pub insert_attempts: Mutex<Vec<String>>,
}

impl ScriptedRepository {
    pub fn fail_insert_of(self, order_id: &str) -> Self {
        self.failing_inserts
            .lock()
            .unwrap()
            .insert(order_id.to_string());
        self
    }

    pub fn stored_order_ids(&self) -> Vec<String> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .map(|o| o.order_id.clone())
            .collect()
    }
}

#[async_trait]
impl SalesOrderRepository for ScriptedRepository {
    async fn find_by_order_id(&self, order_id: &str) -> RepositoryResult<Option<SalesOrder>> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.order_id == order_id)
            .cloned())
    }

    async fn get_by_id(&self, id: SalesOrderId) -> RepositoryResult<Option<SalesOrder>> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn list(&self, _filter: &SalesOrderFilter) -> RepositoryResult<Vec<SalesOrder>> {
        Ok(self.orders.lock().unwrap().clone())
    }

    async fn insert(&self, order: &NewSalesOrder) -> RepositoryResult<SalesOrder> {
        self.insert_attempts
            .lock()
            .unwrap()
            .push(order.order_id.clone());

        if self.failing_inserts.lock().unwrap().contains(&order.order_id) {
            return Err(RepositoryError::Database(DbErr::Custom(format!(
                "insert of {} failed",
                order.order_id
            ))));
        }

        let stored = SalesOrder {
            id: SalesOrderId::new_v4(),
            order_id: order.order_id.clone(),
            region: order.region.clone(),
            country: order.country.clone(),
            product: order.product.clone(),
            revenue: order.revenue,
            order_date: order.order_date,
            metadata: EntityMetadata::new(),
        };
        // Same contract as the unique index on order_id
        let mut orders = self.orders.lock().unwrap();
        if orders.iter().any(|o| o.order_id == order.order_id) {
            return Err(RepositoryError::DuplicateKey(order.order_id.clone()));
        }
        orders.push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: SalesOrderId,
        patch: &SalesOrderPatch,
    ) -> RepositoryResult<Option<SalesOrder>> {
        let mut orders = self.orders.lock().unwrap();
        let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        patch.apply_to(order);
        order.metadata.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn delete(&self, id: SalesOrderId) -> RepositoryResult<bool> {
        let mut orders = self.orders.lock().unwrap();
        let before = orders.len();
        orders.retain(|o| o.id != id);
        Ok(orders.len() < before)
    }

    async fn aggregate_by_region_country(&self) -> RepositoryResult<Vec<RegionCountryTotals>> {
        let mut totals: Vec<RegionCountryTotals> = Vec::new();
        for order in self.orders.lock().unwrap().iter() {
            match totals
                .iter_mut()
                .find(|t| t.region == order.region && t.country == order.country)
            {
                Some(t) => {
                    t.total_revenue += order.revenue;
                    t.record_count += 1;
                }
                None => totals.push(RegionCountryTotals {
                    region: order.region.clone(),
                    country: order.country.clone(),
                    total_revenue: order.revenue,
                    record_count: 1,
                }),
            }
        }
        totals.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
        Ok(totals)
    }
}
