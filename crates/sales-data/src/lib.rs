//! Data layer for the sales dashboard.
//!
//! Reads the transactions CSV into a [`SalesTable`](sales_core::models::SalesTable),
//! computes every dashboard view over it and serialises the filtered table
//! to Excel.

pub mod aggregator;
pub mod analysis;
pub mod distribution;
pub mod export;
pub mod reader;
pub mod views;

pub use sales_core as core;
