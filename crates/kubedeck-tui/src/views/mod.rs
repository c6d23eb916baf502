//! View models: navigable resource tables and the log tail

mod log_view;
mod resource_list;
mod rows;

pub use log_view::LogView;
pub use resource_list::{Column, ResourceList, Row, Snapshot};
