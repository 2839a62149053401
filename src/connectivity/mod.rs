//! Network reachability.
//!
//! A [`ConnectivityMonitor`] answers "is the network usable right now?" and
//! hands out [`ConnectivityStream`] subscriptions that yield every
//! transition, starting with the current state.
//!
//! Both implementations publish through a [`tokio::sync::watch`] channel and
//! only send when the value actually changes. Each subscription owns its
//! receiver, so dropping the stream is the unsubscribe.

mod manual;
mod probe;

pub use manual::ManualMonitor;
pub use probe::{probe, ProbeMonitor};

use futures::stream::{self, BoxStream};
use tokio::sync::watch;

/// Live connectivity transitions. Ends when the publishing side is gone.
pub type ConnectivityStream = BoxStream<'static, bool>;

pub trait ConnectivityMonitor: Send + Sync {
    fn is_connected(&self) -> bool;

    fn observe(&self) -> ConnectivityStream;
}

/// Turn a watch receiver into a stream that starts with the current value
/// and never repeats a value back to back.
pub(crate) fn watch_stream(rx: watch::Receiver<bool>) -> ConnectivityStream {
    Box::pin(stream::unfold(
        (rx, None::<bool>),
        |(mut rx, last)| async move {
            loop {
                if last.is_some() && rx.changed().await.is_err() {
                    return None;
                }
                let current = *rx.borrow_and_update();
                if last != Some(current) {
                    return Some((current, (rx, Some(current))));
                }
            }
        },
    ))
}
