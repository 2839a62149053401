use tokio::sync::watch;

use crate::connectivity::{watch_stream, ConnectivityMonitor, ConnectivityStream};

/// Connectivity driven by the caller, used for `--offline` and in tests.
pub struct ManualMonitor {
    tx: watch::Sender<bool>,
}

impl ManualMonitor {
    pub fn new(online: bool) -> Self {
        let (tx, _) = watch::channel(online);
        Self { tx }
    }

    /// Publish a new state. Repeating the current state notifies nobody.
    pub fn set_online(&self, online: bool) {
        self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
    }
}

impl ConnectivityMonitor for ManualMonitor {
    fn is_connected(&self) -> bool {
        *self.tx.borrow()
    }

    fn observe(&self) -> ConnectivityStream {
        watch_stream(self.tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio_test::{assert_pending, assert_ready_eq, task};

    #[test]
    fn test_is_connected_tracks_state() {
        let monitor = ManualMonitor::new(true);
        assert!(monitor.is_connected());
        monitor.set_online(false);
        assert!(!monitor.is_connected());
    }

    #[tokio::test]
    async fn test_observe_starts_with_current_state() {
        let monitor = ManualMonitor::new(false);
        let mut stream = monitor.observe();
        assert_eq!(stream.next().await, Some(false));
    }

    #[tokio::test]
    async fn test_observe_emits_transitions() {
        let monitor = ManualMonitor::new(true);
        let mut stream = monitor.observe();
        assert_eq!(stream.next().await, Some(true));

        monitor.set_online(false);
        assert_eq!(stream.next().await, Some(false));

        monitor.set_online(true);
        assert_eq!(stream.next().await, Some(true));
    }

    #[test]
    fn test_duplicate_states_are_coalesced() {
        let monitor = ManualMonitor::new(true);
        let mut stream = monitor.observe();

        let mut first = task::spawn(stream.next());
        assert_ready_eq!(first.poll(), Some(true));
        drop(first);

        monitor.set_online(true);
        let mut next = task::spawn(stream.next());
        assert_pending!(next.poll());
        drop(next);

        // A flap that lands back on the last emitted value is not a transition
        monitor.set_online(false);
        monitor.set_online(true);
        let mut next = task::spawn(stream.next());
        assert_pending!(next.poll());
    }

    #[tokio::test]
    async fn test_stream_ends_with_monitor() {
        let monitor = ManualMonitor::new(true);
        let mut stream = monitor.observe();
        assert_eq!(stream.next().await, Some(true));

        drop(monitor);
        assert_eq!(stream.next().await, None);
    }
}
