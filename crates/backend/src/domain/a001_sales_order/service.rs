use super::repository::{SalesOrderFilter, SalesOrderRepository};
use crate::shared::error::AppError;
use crate::shared::format::format_amount;
use contracts::domain::a001_sales_order::{
    SalesOrder, SalesOrderDto, SalesOrderId, SalesOrderPatch, SalesOrderView,
};

pub async fn create(
    repo: &dyn SalesOrderRepository,
    dto: SalesOrderDto,
) -> Result<SalesOrder, AppError> {
    let new_order = dto.validate().map_err(AppError::Validation)?;
    let order = repo.insert(&new_order).await?;
    tracing::info!(
        "Created sales order {} (OrderID {})",
        order.id,
        order.order_id
    );
    Ok(order)
}

pub async fn get_by_id(
    repo: &dyn SalesOrderRepository,
    id: SalesOrderId,
) -> Result<SalesOrder, AppError> {
    repo.get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Sales order {} not found", id)))
}

pub async fn list(
    repo: &dyn SalesOrderRepository,
    filter: &SalesOrderFilter,
) -> Result<Vec<SalesOrder>, AppError> {
    Ok(repo.list(filter).await?)
}

/// Обновление без дополнительной валидации: проверяется только существование
pub async fn update(
    repo: &dyn SalesOrderRepository,
    id: SalesOrderId,
    patch: SalesOrderPatch,
) -> Result<SalesOrder, AppError> {
    if patch.is_empty() {
        return get_by_id(repo, id).await;
    }
    repo.update(id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Sales order {} not found", id)))
}

pub async fn delete(repo: &dyn SalesOrderRepository, id: SalesOrderId) -> Result<(), AppError> {
    if repo.delete(id).await? {
        tracing::info!("Deleted sales order {}", id);
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Sales order {} not found", id)))
    }
}

/// Presentation copy of an order: Revenue with two decimals
pub fn to_view(order: &SalesOrder) -> SalesOrderView {
    SalesOrderView {
        id: order.to_string_id(),
        order_id: order.order_id.clone(),
        region: order.region.clone(),
        country: order.country.clone(),
        product: order.product.clone(),
        revenue: format_amount(order.revenue),
        order_date: order.order_date.format("%Y-%m-%d").to_string(),
        created_at: order.metadata.created_at.to_rfc3339(),
        updated_at: order.metadata.updated_at.to_rfc3339(),
    }
}
