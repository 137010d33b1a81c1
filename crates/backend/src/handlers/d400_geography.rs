use axum::extract::State;
use axum::Json;
use contracts::dashboards::d400_geography::GeographyAggregate;

use crate::dashboards::d400_geography::service;
use crate::shared::app_state::AppState;
use crate::shared::error::AppError;

/// GET /api/d400/geography
pub async fn get_geography(
    State(state): State<AppState>,
) -> Result<Json<Vec<GeographyAggregate>>, AppError> {
    let aggregates = service::get_geography_aggregates(state.orders.as_ref()).await?;
    Ok(Json(aggregates))
}
