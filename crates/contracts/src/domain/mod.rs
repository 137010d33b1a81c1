pub mod a001_sales_order;
pub mod common;
