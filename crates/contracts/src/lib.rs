//! Shared wire types for the SalesPulse service and its UI clients.

pub mod dashboards;
pub mod domain;
pub mod usecases;
