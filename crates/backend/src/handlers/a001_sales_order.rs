use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use contracts::domain::common::AggregateId;
use contracts::domain::a001_sales_order::{
    SalesOrderDto, SalesOrderId, SalesOrderPatch, SalesOrderView,
};
use serde::Deserialize;

use crate::domain::a001_sales_order::repository::SalesOrderFilter;
use crate::domain::a001_sales_order::service;
use crate::shared::app_state::AppState;
use crate::shared::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub region: Option<String>,
    pub country: Option<String>,
}

fn parse_id(id: &str) -> Result<SalesOrderId, AppError> {
    SalesOrderId::from_string(id)
        .map_err(|e| AppError::InvalidRequest(format!("Invalid sales order ID '{}': {}", id, e)))
}

/// GET /api/sales-orders
pub async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<SalesOrderView>>, AppError> {
    let filter = SalesOrderFilter {
        region: query.region.filter(|s| !s.is_empty()),
        country: query.country.filter(|s| !s.is_empty()),
    };
    let orders = service::list(state.orders.as_ref(), &filter).await?;
    Ok(Json(orders.iter().map(service::to_view).collect()))
}

/// GET /api/sales-orders/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SalesOrderView>, AppError> {
    let order = service::get_by_id(state.orders.as_ref(), parse_id(&id)?).await?;
    Ok(Json(service::to_view(&order)))
}

/// POST /api/sales-orders
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<SalesOrderDto>, JsonRejection>,
) -> Result<(StatusCode, Json<SalesOrderView>), AppError> {
    let Json(dto) = payload?;
    let order = service::create(state.orders.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(service::to_view(&order))))
}

/// PUT /api/sales-orders/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SalesOrderPatch>, JsonRejection>,
) -> Result<Json<SalesOrderView>, AppError> {
    let Json(patch) = payload?;
    let order = service::update(state.orders.as_ref(), parse_id(&id)?, patch).await?;
    Ok(Json(service::to_view(&order)))
}

/// DELETE /api/sales-orders/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    service::delete(state.orders.as_ref(), parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
