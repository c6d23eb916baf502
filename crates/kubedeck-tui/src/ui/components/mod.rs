mod error_banner;
mod resource_table;
mod status_bar;

pub use error_banner::ErrorBanner;
pub use resource_table::ResourceTable;
pub use status_bar::{StatusBar, view_hints};
