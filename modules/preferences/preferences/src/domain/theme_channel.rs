use preferences_sdk::Appearance;
use tokio::sync::broadcast;

/// In-process publish/subscribe channel for theme changes.
///
/// Observers (a theme toggle, a chart palette, ...) subscribe instead of
/// polling storage. Dropping the receiver unsubscribes. A slow receiver that
/// falls more than `capacity` events behind gets `RecvError::Lagged` and
/// should simply read the latest value.
#[derive(Debug, Clone)]
pub struct ThemeChannel {
    tx: broadcast::Sender<Appearance>,
}

impl ThemeChannel {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Appearance> {
        self.tx.subscribe()
    }

    /// Publish `appearance`; returns how many subscribers received it.
    #[must_use]
    pub fn publish(&self, appearance: Appearance) -> usize {
        self.tx.send(appearance).unwrap_or(0)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ThemeChannel {
    fn default() -> Self {
        Self::new(16)
    }
}
