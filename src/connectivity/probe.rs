use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::ConnectivityConfig;
use crate::connectivity::{watch_stream, ConnectivityMonitor, ConnectivityStream};

/// Connectivity inferred from periodic TCP connects to a well-known host.
pub struct ProbeMonitor {
    rx: watch::Receiver<bool>,
}

impl ProbeMonitor {
    /// Probe once, then keep probing in the background.
    ///
    /// The background task stops once the monitor and every subscription
    /// have been dropped.
    pub async fn start(config: &ConnectivityConfig) -> Self {
        let target = format!("{}:{}", config.probe_host, config.probe_port);
        let probe_timeout = Duration::from_millis(config.probe_timeout_ms);
        let every = Duration::from_secs(config.interval_secs.max(1));

        let initial = probe(&target, probe_timeout).await;
        info!("Initial connectivity to {}: {}", target, initial);
        let (tx, rx) = watch::channel(initial);

        tokio::spawn(async move {
            let mut timer = interval(every);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            timer.tick().await; // Skip the first immediate tick

            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    _ = timer.tick() => {}
                }

                let online = probe(&target, probe_timeout).await;
                let changed = tx.send_if_modified(|current| {
                    if *current == online {
                        false
                    } else {
                        *current = online;
                        true
                    }
                });
                if changed {
                    info!("Connectivity changed: online = {}", online);
                }
            }

            debug!("Connectivity probe stopped");
        });

        Self { rx }
    }
}

impl ConnectivityMonitor for ProbeMonitor {
    fn is_connected(&self) -> bool {
        *self.rx.borrow()
    }

    fn observe(&self) -> ConnectivityStream {
        watch_stream(self.rx.clone())
    }
}

/// Whether a TCP connection to `target` can be opened within `limit`.
/// Resolution failures and timeouts count as offline.
pub async fn probe(target: &str, limit: Duration) -> bool {
    matches!(timeout(limit, TcpStream::connect(target)).await, Ok(Ok(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_probe_reachable_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        assert!(probe(&addr, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_probe_closed_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        assert!(!probe(&addr, Duration::from_secs(1)).await);
    }

    #[tokio::test]
    async fn test_start_reports_initial_state() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ConnectivityConfig {
            probe_host: "127.0.0.1".into(),
            probe_port: listener.local_addr().unwrap().port(),
            interval_secs: 60,
            probe_timeout_ms: 1000,
        };

        let monitor = ProbeMonitor::start(&config).await;
        assert!(monitor.is_connected());

        let mut stream = monitor.observe();
        assert_eq!(futures::StreamExt::next(&mut stream).await, Some(true));
    }
}
