//! View state machine and the messages that drive it

mod action;
mod controller;
mod message;
mod view;
mod watches;

pub use action::Action;
pub use controller::{Controller, ControllerConfig};
pub use message::{LogMessage, Message};
pub use view::ViewState;
pub use watches::WatchSet;
