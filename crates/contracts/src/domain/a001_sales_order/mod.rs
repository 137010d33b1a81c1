pub mod aggregate;

pub use aggregate::{
    NewSalesOrder, SalesOrder, SalesOrderDto, SalesOrderId, SalesOrderPatch, SalesOrderView,
};
