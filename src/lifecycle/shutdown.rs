//! Shutdown fan-out.
//!
//! One `trigger` stops the listener: the plain server finishes in-flight
//! requests, the TLS server drains for `shutdown_grace_secs` and then
//! closes whatever is left.

use tokio::sync::broadcast;

/// Broadcasts a single stop request to every serving task.
#[derive(Clone)]
pub struct Shutdown {
    notify: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(1);
        Self { notify }
    }

    /// Receiver for a server's `run`; take it before triggering.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.notify.subscribe()
    }

    /// Ask every subscribed server to stop accepting and drain.
    pub fn trigger(&self) {
        if self.notify.send(()).is_err() {
            tracing::debug!("Shutdown triggered with no server listening");
        }
    }

    /// Servers still holding a receiver.
    pub fn receiver_count(&self) -> usize {
        self.notify.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_reaches_every_subscriber() {
        let shutdown = Shutdown::new();
        let mut plain = shutdown.subscribe();
        let mut tls = shutdown.clone().subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        shutdown.trigger();
        assert!(plain.recv().await.is_ok());
        assert!(tls.recv().await.is_ok());
    }

    #[test]
    fn trigger_without_subscribers_is_harmless() {
        let shutdown = Shutdown::default();
        shutdown.trigger();
        assert_eq!(shutdown.receiver_count(), 0);
    }

    #[tokio::test]
    async fn dropped_receiver_stops_counting() {
        let shutdown = Shutdown::new();
        let receiver = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 1);
        drop(receiver);
        assert_eq!(shutdown.receiver_count(), 0);
    }
}
