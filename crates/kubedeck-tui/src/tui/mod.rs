//! Terminal UI handling

mod event;
mod terminal;

pub use event::{Event, EventHandler, Scroll};
pub use terminal::Tui;
