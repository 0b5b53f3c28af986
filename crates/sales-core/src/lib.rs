//! Shared building blocks for the sales dashboard: the transaction data
//! model, the error taxonomy, date heuristics, percentile maths, number
//! formatting and CLI settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod percentile;
pub mod settings;
pub mod time_utils;
