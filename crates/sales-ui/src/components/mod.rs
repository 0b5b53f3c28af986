pub mod bar_list;
pub mod header;
pub mod metric_card;
