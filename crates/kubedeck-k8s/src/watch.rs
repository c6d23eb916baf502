//! Restartable watch subscriptions
//!
//! A [`Subscription`] owns one background task that keeps a watch open on a
//! single resource kind in a single namespace. Upstream windows are
//! time-bounded; when one closes normally the task reopens it from the last
//! seen resource version, so consumers only ever see a continuous stream of
//! changes. [`bridge`] turns the next change into a kind-tagged
//! [`WatchMessage`] for the UI loop.

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use kubedeck_types::{ResourceChange, ResourceKind};

use crate::control_plane::{ControlPlane, WatchUpdate};

/// Pending changes buffered per subscription
const EVENT_BUFFER: usize = 64;

/// Resource version that asks the server for a fresh listing
const INITIAL_VERSION: &str = "0";

/// What a subscription reports to its consumer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchSignal {
    Changed(ResourceChange),
    /// The watch stream failed; the subscription delivers nothing further
    Failed(String),
}

/// One upstream event, tagged with the subscription that produced it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchMessage {
    pub kind: ResourceKind,
    pub generation: u64,
    pub signal: WatchSignal,
}

/// A live watch on one resource kind in one namespace
pub struct Subscription {
    kind: ResourceKind,
    namespace: String,
    generation: u64,
    events: mpsc::Receiver<WatchSignal>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Start watching `kind` in `namespace`.
    ///
    /// `generation` must be unique for the lifetime of the consumer; it is
    /// stamped on every message so stale deliveries can be recognised.
    pub fn start<C: ControlPlane>(
        client: C,
        kind: ResourceKind,
        namespace: impl Into<String>,
        generation: u64,
    ) -> Self {
        let namespace = namespace.into();
        let (tx, events) = mpsc::channel(EVENT_BUFFER);
        let cancel = CancellationToken::new();

        debug!(%kind, %namespace, generation, "starting watch subscription");
        let task = tokio::spawn(feed(
            client,
            kind,
            namespace.clone(),
            tx,
            cancel.clone(),
        ));

        Self {
            kind,
            namespace,
            generation,
            events,
            cancel,
            task: Some(task),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.task.is_none()
    }

    /// Wait for the next change.
    ///
    /// Returns `None` once the subscription is closed or its task has
    /// finished and every buffered signal has been consumed.
    pub async fn next(&mut self) -> Option<WatchSignal> {
        if self.is_closed() {
            return None;
        }
        self.events.recv().await
    }

    /// Stop the subscription. Idempotent and non-blocking.
    pub fn close(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        self.cancel.cancel();
        self.events.close();
        task.abort();
        debug!(kind = %self.kind, namespace = %self.namespace, generation = self.generation, "closed watch subscription");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

/// Wait for exactly one event from `subscription`.
///
/// Without a subscription, or once it is closed or exhausted, this never
/// completes; callers select on it alongside their other event sources.
pub async fn bridge(subscription: Option<&mut Subscription>) -> WatchMessage {
    let Some(subscription) = subscription else {
        return std::future::pending().await;
    };

    match subscription.next().await {
        Some(signal) => WatchMessage {
            kind: subscription.kind,
            generation: subscription.generation,
            signal,
        },
        None => std::future::pending().await,
    }
}

/// Keep a watch open until cancelled, renewing each window as it closes
async fn feed<C: ControlPlane>(
    client: C,
    kind: ResourceKind,
    namespace: String,
    tx: mpsc::Sender<WatchSignal>,
    cancel: CancellationToken,
) {
    let mut resource_version = INITIAL_VERSION.to_string();

    loop {
        let opened = tokio::select! {
            _ = cancel.cancelled() => return,
            opened = client.watch(kind, &namespace, &resource_version) => opened,
        };

        let mut stream = match opened {
            Ok(stream) => stream,
            Err(err) => {
                warn!(%kind, %namespace, "failed to open watch: {err}");
                deliver(&tx, &cancel, WatchSignal::Failed(err.to_string())).await;
                return;
            }
        };

        loop {
            let update = tokio::select! {
                _ = cancel.cancelled() => return,
                update = stream.next() => update,
            };

            match update {
                Some(Ok(WatchUpdate::Changed(change))) => {
                    if let Some(version) = &change.resource_version {
                        resource_version.clone_from(version);
                    }
                    if !deliver(&tx, &cancel, WatchSignal::Changed(change)).await {
                        return;
                    }
                }
                Some(Ok(WatchUpdate::Bookmark(version))) => resource_version = version,
                Some(Ok(WatchUpdate::Expired)) => {
                    debug!(%kind, %namespace, "watch version expired, relisting");
                    resource_version = INITIAL_VERSION.to_string();
                    break;
                }
                Some(Err(err)) => {
                    warn!(%kind, %namespace, "watch stream failed: {err}");
                    deliver(&tx, &cancel, WatchSignal::Failed(err.to_string())).await;
                    return;
                }
                None => break,
            }
        }

        debug!(%kind, %namespace, %resource_version, "renewing watch window");
    }
}

/// Send unless cancelled first; false when the consumer is gone
async fn deliver(
    tx: &mpsc::Sender<WatchSignal>,
    cancel: &CancellationToken,
    signal: WatchSignal,
) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        sent = tx.send(signal) => sent.is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use kubedeck_types::ChangeKind;

    use super::*;
    use crate::fake::{FakeControlPlane, wait_until};

    fn changed(name: &str, version: &str) -> ResourceChange {
        ResourceChange {
            kind: ChangeKind::Modified,
            name: name.to_string(),
            resource_version: Some(version.to_string()),
        }
    }

    async fn next_message(subscription: &mut Subscription) -> WatchMessage {
        tokio::time::timeout(Duration::from_secs(1), bridge(Some(subscription)))
            .await
            .expect("bridge should deliver")
    }

    #[tokio::test]
    async fn test_bridge_delivers_in_order_with_generation() {
        let fake = FakeControlPlane::new();
        let mut sub = Subscription::start(fake.clone(), ResourceKind::Pods, "default", 7);
        assert!(wait_until(|| fake.live_watches(ResourceKind::Pods) == 1).await);

        fake.emit(ResourceKind::Pods, changed("web-0", "10"));
        fake.emit(ResourceKind::Pods, changed("web-1", "11"));

        let first = next_message(&mut sub).await;
        assert_eq!(first.kind, ResourceKind::Pods);
        assert_eq!(first.generation, 7);
        assert_eq!(first.signal, WatchSignal::Changed(changed("web-0", "10")));

        let second = next_message(&mut sub).await;
        assert_eq!(second.signal, WatchSignal::Changed(changed("web-1", "11")));
    }

    #[tokio::test]
    async fn test_closed_window_is_renewed_from_last_version() {
        let fake = FakeControlPlane::new();
        let mut sub = Subscription::start(fake.clone(), ResourceKind::Deployments, "apps", 1);
        assert!(wait_until(|| fake.live_watches(ResourceKind::Deployments) == 1).await);

        fake.emit(ResourceKind::Deployments, changed("api", "42"));
        next_message(&mut sub).await;

        fake.end_watch_window(ResourceKind::Deployments);
        assert!(wait_until(|| fake.watch_calls().len() == 2).await);
        assert_eq!(
            fake.watch_calls(),
            vec![
                "watch deployments apps 0".to_string(),
                "watch deployments apps 42".to_string()
            ]
        );

        assert!(wait_until(|| fake.live_watches(ResourceKind::Deployments) == 1).await);
        fake.emit(ResourceKind::Deployments, changed("api", "43"));
        let renewed = next_message(&mut sub).await;
        assert_eq!(renewed.signal, WatchSignal::Changed(changed("api", "43")));
    }

    #[tokio::test]
    async fn test_bookmark_and_expiry_update_resume_version() {
        let fake = FakeControlPlane::new();
        let _sub = Subscription::start(fake.clone(), ResourceKind::Pods, "default", 1);
        assert!(wait_until(|| fake.live_watches(ResourceKind::Pods) == 1).await);

        fake.send_update(ResourceKind::Pods, WatchUpdate::Bookmark("99".to_string()));
        fake.end_watch_window(ResourceKind::Pods);
        assert!(wait_until(|| fake.watch_calls().len() == 2).await);
        assert_eq!(fake.watch_calls()[1], "watch pods default 99");

        assert!(wait_until(|| fake.live_watches(ResourceKind::Pods) == 1).await);
        fake.send_update(ResourceKind::Pods, WatchUpdate::Expired);
        assert!(wait_until(|| fake.watch_calls().len() == 3).await);
        assert_eq!(fake.watch_calls()[2], "watch pods default 0");
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_bridge_blocks() {
        let fake = FakeControlPlane::new();
        let mut sub = Subscription::start(fake.clone(), ResourceKind::Pods, "default", 3);
        assert!(wait_until(|| fake.live_watches(ResourceKind::Pods) == 1).await);

        sub.close();
        sub.close();
        assert!(sub.is_closed());

        // Upstream stream is released once the task is torn down
        assert!(wait_until(|| fake.live_watches(ResourceKind::Pods) == 0).await);

        let blocked =
            tokio::time::timeout(Duration::from_millis(50), bridge(Some(&mut sub))).await;
        assert!(blocked.is_err());
    }

    #[tokio::test]
    async fn test_bridge_without_subscription_blocks() {
        let blocked = tokio::time::timeout(Duration::from_millis(20), bridge(None)).await;
        assert!(blocked.is_err());
    }

    #[tokio::test]
    async fn test_stream_error_fails_once_then_blocks() {
        let fake = FakeControlPlane::new();
        let mut sub = Subscription::start(fake.clone(), ResourceKind::Pods, "default", 5);
        assert!(wait_until(|| fake.live_watches(ResourceKind::Pods) == 1).await);

        fake.fail_watch_stream(ResourceKind::Pods, "connection reset");
        let failed = next_message(&mut sub).await;
        assert!(matches!(failed.signal, WatchSignal::Failed(ref msg) if msg.contains("connection reset")));

        let blocked =
            tokio::time::timeout(Duration::from_millis(50), bridge(Some(&mut sub))).await;
        assert!(blocked.is_err());
        assert_eq!(fake.watch_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_open_failure_is_reported() {
        let fake = FakeControlPlane::new();
        fake.set_fail_watches(true);
        let mut sub = Subscription::start(fake.clone(), ResourceKind::Deployments, "default", 2);

        let failed = next_message(&mut sub).await;
        assert_eq!(failed.kind, ResourceKind::Deployments);
        assert!(matches!(failed.signal, WatchSignal::Failed(_)));
    }
}
