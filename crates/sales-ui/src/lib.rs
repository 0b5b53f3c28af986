//! Terminal UI layer for the sales dashboard.
//!
//! Provides themes, the header, bar-list and metric components, chart and
//! table views, and the application event loop built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod table_view;
pub mod themes;

pub use sales_data::analysis::Section;
