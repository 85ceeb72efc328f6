//! Published forecast state.
//!
//! The pipeline is the only writer; everything else holds a
//! [`watch::Receiver`] and reads snapshots.

use tokio::sync::watch;

use crate::types::{Coordinates, Forecast};

/// What the presentation layer gets to see
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastState {
    /// "City, State", once a points lookup has succeeded
    pub friendly_location: Option<String>,
    /// Coordinates of the most recent run
    pub coordinates: Coordinates,
    /// Absent while loading or after a failed run; never partial
    pub forecast: Option<Forecast>,
    /// A run is in flight
    pub loading: bool,
}

#[derive(Debug)]
pub struct ForecastStore {
    tx: watch::Sender<ForecastState>,
}

impl ForecastStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ForecastState::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ForecastState> {
        self.tx.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ForecastState {
        self.tx.borrow().clone()
    }

    /// Apply `update` under the channel lock; subscribers are notified only
    /// when it returns `true`.
    pub(crate) fn publish_if<F>(&self, update: F) -> bool
    where
        F: FnOnce(&mut ForecastState) -> bool,
    {
        self.tx.send_if_modified(update)
    }
}

impl Default for ForecastStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[tokio::test]
    async fn test_subscribers_see_published_changes() {
        let store = ForecastStore::new();
        let mut rx = store.subscribe();

        let changed = store.publish_if(|state| {
            state.friendly_location = Some("Atlanta, GA".into());
            true
        });

        assert!(changed);
        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().friendly_location.as_deref(),
            Some("Atlanta, GA")
        );
    }

    #[test]
    fn test_rejected_update_does_not_notify() {
        let store = ForecastStore::new();
        let rx = store.subscribe();

        store.publish_if(|_| false);

        assert!(!rx.has_changed().unwrap());
        assert_eq!(store.snapshot(), ForecastState::default());
    }
}
