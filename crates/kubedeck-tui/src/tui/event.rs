use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind, MouseEventKind};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Terminal events
#[derive(Clone, Debug)]
pub enum Event {
    /// Terminal tick (for periodic updates)
    Tick,
    /// Key press event
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// Mouse wheel
    Scroll(Scroll),
    /// Error occurred
    Error(String),
}

/// Mouse wheel direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scroll {
    Up,
    Down,
}

impl Scroll {
    /// Wheel direction of a mouse event, if it is a wheel event
    pub fn from_mouse(kind: MouseEventKind) -> Option<Self> {
        match kind {
            MouseEventKind::ScrollUp => Some(Scroll::Up),
            MouseEventKind::ScrollDown => Some(Scroll::Down),
            _ => None,
        }
    }
}

/// Event handler managing terminal input
pub struct EventHandler {
    /// Event receiver
    receiver: mpsc::UnboundedReceiver<Event>,
    /// Cancellation token for graceful shutdown
    cancel: CancellationToken,
    /// Task handle
    task: Option<tokio::task::JoinHandle<()>>,
}

impl EventHandler {
    /// Create a new event handler with the given tick rate
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let task = {
            let cancel = cancel.clone();

            tokio::spawn(async move {
                let mut reader = event::EventStream::new();
                let mut tick_interval = tokio::time::interval(tick_rate);

                loop {
                    let tick = tick_interval.tick();
                    let crossterm_event = reader.next().fuse();

                    tokio::select! {
                        _ = cancel.cancelled() => break,

                        _ = tick => {
                            let _ = sender.send(Event::Tick);
                        }

                        maybe_event = crossterm_event => {
                            match maybe_event {
                                Some(Ok(CrosstermEvent::Key(key))) => {
                                    // Filter out release events (important for Windows)
                                    if key.kind == KeyEventKind::Press {
                                        let _ = sender.send(Event::Key(key));
                                    }
                                }
                                Some(Ok(CrosstermEvent::Resize(w, h))) => {
                                    let _ = sender.send(Event::Resize(w, h));
                                }
                                Some(Ok(CrosstermEvent::Mouse(mouse))) => {
                                    if let Some(scroll) = Scroll::from_mouse(mouse.kind) {
                                        let _ = sender.send(Event::Scroll(scroll));
                                    }
                                }
                                Some(Ok(_)) => {}
                                Some(Err(e)) => {
                                    let _ = sender.send(Event::Error(e.to_string()));
                                }
                                None => break,
                            }
                        }
                    }
                }

                debug!("terminal event reader stopped");
            })
        };

        Self {
            receiver,
            cancel,
            task: Some(task),
        }
    }

    /// Receive the next event
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// Shutdown the event handler and wait for the reader to stop
    pub async fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_wheel_events_scroll() {
        assert_eq!(Scroll::from_mouse(MouseEventKind::ScrollUp), Some(Scroll::Up));
        assert_eq!(Scroll::from_mouse(MouseEventKind::ScrollDown), Some(Scroll::Down));
        assert_eq!(Scroll::from_mouse(MouseEventKind::Moved), None);
        assert_eq!(Scroll::from_mouse(MouseEventKind::ScrollLeft), None);
    }
}
