use crossterm::event::KeyEvent;

use kubedeck_k8s::WatchMessage;

use crate::tui::{Event, Scroll};

/// One unit of work for the controller's update cycle
#[derive(Clone, Debug)]
pub enum Message {
    Key(KeyEvent),
    Resize(u16, u16),
    Scroll(Scroll),
    Tick,
    Watch(WatchMessage),
    Log(LogMessage),
    TerminalError(String),
}

/// A line from a log session; `None` when the session's reader has exited
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogMessage {
    pub session: u64,
    pub line: Option<String>,
}

impl From<Event> for Message {
    fn from(event: Event) -> Self {
        match event {
            Event::Tick => Message::Tick,
            Event::Key(key) => Message::Key(key),
            Event::Resize(width, height) => Message::Resize(width, height),
            Event::Scroll(scroll) => Message::Scroll(scroll),
            Event::Error(err) => Message::TerminalError(err),
        }
    }
}
