use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::handlers;
use crate::shared::app_state::AppState;
use crate::system::middleware::request_logger::request_logger;

/// Конфигурация всех роутов приложения
pub fn router(state: AppState, static_dir: &str, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        // A001 Sales orders
        .route(
            "/api/sales-orders",
            get(handlers::a001_sales_order::list_all).post(handlers::a001_sales_order::create),
        )
        .route(
            "/api/sales-orders/:id",
            get(handlers::a001_sales_order::get_by_id)
                .put(handlers::a001_sales_order::update)
                .delete(handlers::a001_sales_order::delete),
        )
        // U501 Excel import
        .route(
            "/api/sales-orders/upload-excel",
            post(handlers::usecases::u501_upload_excel),
        )
        .route(
            "/api/sales-orders/upload-excel/file",
            post(handlers::usecases::u501_upload_excel_file),
        )
        // D400 Geography dashboard
        .route(
            "/api/d400/geography",
            get(handlers::d400_geography::get_geography),
        )
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(middleware::from_fn(request_logger))
        .layer(cors)
}
