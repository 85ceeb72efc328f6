//! Position sources and the one-shot acquisition that feeds the pipeline.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use localcast_core::LocationConfig;
use tokio::sync::watch;

use crate::diagnostics::DiagnosticSink;
use crate::types::{Coordinates, LocationError, WeatherError};

/// A one-shot "where am I" capability.
pub trait GeolocationProvider: Send + Sync {
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, LocationError>> + Send;
}

/// Always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

impl GeolocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Provider chosen from configuration.
#[derive(Debug, Clone, Copy)]
pub enum ConfiguredProvider {
    /// `[location]` has both latitude and longitude.
    Fixed(FixedLocation),
    /// No position source available.
    Unsupported,
}

impl ConfiguredProvider {
    pub fn from_config(config: &LocationConfig) -> Self {
        match config.position() {
            Some((latitude, longitude)) => {
                Self::Fixed(FixedLocation(Coordinates::new(latitude, longitude)))
            }
            None => Self::Unsupported,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}

impl GeolocationProvider for ConfiguredProvider {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        match self {
            Self::Fixed(fixed) => fixed.current_position().await,
            Self::Unsupported => Err(LocationError::Unsupported),
        }
    }
}

/// Coordinate channel, starting at the `(0, 0)` sentinel.
pub fn coordinates_channel() -> (watch::Sender<Coordinates>, watch::Receiver<Coordinates>) {
    watch::channel(Coordinates::default())
}

/// Reads a position once and publishes it on the coordinate channel.
pub struct CoordinateAcquisition {
    tx: watch::Sender<Coordinates>,
    diagnostics: Arc<dyn DiagnosticSink>,
    activated: AtomicBool,
}

impl CoordinateAcquisition {
    pub fn new(tx: watch::Sender<Coordinates>, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            tx,
            diagnostics,
            activated: AtomicBool::new(false),
        }
    }

    /// Ask `provider` for a position. Only the first call does anything.
    ///
    /// On failure the coordinates stay at the sentinel; the error goes to the
    /// diagnostic sink and is not retried.
    pub async fn acquire<P: GeolocationProvider>(&self, provider: &P) -> Option<Coordinates> {
        if self.activated.swap(true, Ordering::SeqCst) {
            tracing::debug!("Coordinates already requested, ignoring");
            return None;
        }

        match provider.current_position().await {
            Ok(coords) => {
                tracing::info!("Got location: {}", coords);
                self.tx.send_if_modified(|current| {
                    if *current == coords {
                        return false;
                    }
                    *current = coords;
                    true
                });
                Some(coords)
            }
            Err(e) => {
                self.diagnostics.record_failure(&WeatherError::Location(e));
                None
            }
        }
    }
}
