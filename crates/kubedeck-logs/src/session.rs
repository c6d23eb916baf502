use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use kubedeck_k8s::ControlPlane;
use kubedeck_types::PodRef;

/// A live tail of one container's output.
///
/// Lines are handed over one at a time: the reader blocks until the previous
/// line has been taken, so a slow consumer throttles the upstream stream.
pub struct LogSession {
    id: u64,
    target: PodRef,
    lines: mpsc::Receiver<String>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl LogSession {
    /// Start following `target`, beginning `tail_lines` back
    pub fn open<C: ControlPlane>(client: C, target: PodRef, tail_lines: i64, id: u64) -> Self {
        let (tx, lines) = mpsc::channel(1);
        let cancel = CancellationToken::new();

        debug!(%target, session = id, "opening log session");
        let task = tokio::spawn(read_lines(
            client,
            target.clone(),
            tail_lines,
            tx,
            cancel.clone(),
        ));

        Self {
            id,
            target,
            lines,
            cancel,
            task: Some(task),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Next line in read order; `None` once the reader has exited
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    /// Ask the reader to exit. Idempotent and non-blocking.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stop the reader and wait for it to exit
    pub async fn shutdown(&mut self) {
        self.stop();
        self.lines.close();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!(target = %self.target, "log reader did not exit cleanly: {err}");
            }
        }
        debug!(target = %self.target, session = self.id, "log session closed");
    }

    /// Whether the reader task has exited
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for LogSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn read_lines<C: ControlPlane>(
    client: C,
    target: PodRef,
    tail_lines: i64,
    tx: mpsc::Sender<String>,
    cancel: CancellationToken,
) {
    let opened = tokio::select! {
        _ = cancel.cancelled() => return,
        opened = client.stream_pod_logs(&target, tail_lines) => opened,
    };

    let mut stream = match opened {
        Ok(stream) => stream,
        Err(err) => {
            warn!(%target, "failed to open log stream: {err}");
            return;
        }
    };

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = stream.next() => line,
        };

        match line {
            Some(Ok(line)) => {
                let sent = tokio::select! {
                    _ = cancel.cancelled() => false,
                    sent = tx.send(line) => sent.is_ok(),
                };
                if !sent {
                    break;
                }
            }
            Some(Err(err)) => {
                debug!(%target, "log stream ended: {err}");
                break;
            }
            None => break,
        }
    }

    debug!(%target, "log reader exited");
}
