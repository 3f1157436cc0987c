use tokio::sync::watch;

/// Observable value with typed change notifications.
///
/// Replaces ad-hoc global publish/subscribe state: each field the UI or the
/// persistence layer cares about is its own `Observable`, and consumers
/// subscribe independently without sharing a dispatch mechanism.
pub struct Observable<T> {
    tx: std::sync::Arc<watch::Sender<T>>,
}

impl<T: Clone> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx: std::sync::Arc::new(tx),
        }
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Publish a new value. Subscribers are notified even when no receiver
    /// is currently attached (late subscribers see the latest value).
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            tx: std::sync::Arc::clone(&self.tx),
        }
    }
}
