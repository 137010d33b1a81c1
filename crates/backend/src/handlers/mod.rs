pub mod a001_sales_order;
pub mod d400_geography;
pub mod usecases;
