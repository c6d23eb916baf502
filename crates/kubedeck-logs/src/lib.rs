//! Log tailing for kubedeck
//!
//! This crate provides the cancellable log reader, the bounded line buffer
//! and the viewport that decides whether the view follows new output.

mod buffer;
mod session;
mod viewport;

pub use buffer::{LOG_BUFFER_CAPACITY, LogBuffer};
pub use session::LogSession;
pub use viewport::LogViewport;

// Re-export types used in our public API
pub use kubedeck_types::PodRef;
