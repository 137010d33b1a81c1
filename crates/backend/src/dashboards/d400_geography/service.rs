use contracts::dashboards::d400_geography::GeographyAggregate;

use crate::domain::a001_sales_order::repository::SalesOrderRepository;
use crate::shared::error::AppError;
use crate::shared::format::format_amount;

/// Revenue grouped by (Region, Country), largest total first
pub async fn get_geography_aggregates(
    repo: &dyn SalesOrderRepository,
) -> Result<Vec<GeographyAggregate>, AppError> {
    let totals = repo.aggregate_by_region_country().await?;

    Ok(totals
        .into_iter()
        .map(|t| GeographyAggregate {
            region: t.region,
            country: t.country,
            total_revenue: format_amount(t.total_revenue),
            record_count: t.record_count,
        })
        .collect())
}
