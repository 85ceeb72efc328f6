//! Coordinates in, location name and forecast out.
//!
//! Each call to [`ForecastPipeline::fetch_forecast`] takes a fresh sequence
//! number and cancellation token. Starting a run cancels the previous one,
//! and every write to the store re-checks the sequence number under the
//! store lock, so a superseded run can never publish.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::diagnostics::DiagnosticSink;
use crate::nws::NwsClient;
use crate::state::ForecastStore;
use crate::types::{Coordinates, WeatherError};

/// How a single run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Coordinates unknown or out of range; nothing was requested
    Skipped,
    /// Location and forecast were published
    Published,
    /// A step failed and was reported to the diagnostic sink
    Failed,
    /// A newer run started before this one finished
    Superseded,
}

pub struct ForecastPipeline {
    client: NwsClient,
    store: Arc<ForecastStore>,
    diagnostics: Arc<dyn DiagnosticSink>,
    sequence: AtomicU64,
    cancel_token: Mutex<Option<CancellationToken>>,
}

impl ForecastPipeline {
    pub fn new(
        client: NwsClient,
        store: Arc<ForecastStore>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            client,
            store,
            diagnostics,
            sequence: AtomicU64::new(0),
            cancel_token: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<ForecastStore> {
        &self.store
    }

    /// Look up the forecast for `coords` and publish it.
    ///
    /// A no-op unless both halves of `coords` are non-zero.
    pub async fn fetch_forecast(&self, coords: Coordinates) -> RunOutcome {
        if !coords.is_known() {
            tracing::debug!("Coordinates not known yet, skipping forecast");
            return RunOutcome::Skipped;
        }
        if !coords.in_range() {
            self.diagnostics
                .record_failure(&WeatherError::InvalidCoordinates(coords));
            return RunOutcome::Skipped;
        }

        let (seq, token) = self.begin_run();

        // Stale data must never sit next to a new request.
        self.publish(seq, |state| {
            state.coordinates = coords;
            state.forecast = None;
            state.loading = true;
        });

        let result = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("Forecast run {} cancelled", seq);
                return RunOutcome::Superseded;
            }
            result = self.run_stages(seq, coords) => result,
        };

        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                let still_current = self.publish(seq, |state| state.loading = false);
                if !still_current {
                    return RunOutcome::Superseded;
                }
                self.diagnostics.record_failure(&e);
                RunOutcome::Failed
            }
        }
    }

    async fn run_stages(&self, seq: u64, coords: Coordinates) -> Result<RunOutcome, WeatherError> {
        let point = self.client.lookup_point(coords).await?;

        let name = point.location.display_name();
        if !self.publish(seq, |state| state.friendly_location = Some(name)) {
            return Ok(RunOutcome::Superseded);
        }

        let forecast = self.client.fetch_forecast(&point.forecast_url).await?;
        let count = forecast.periods().len();

        if !self.publish(seq, |state| {
            state.forecast = Some(forecast);
            state.loading = false;
        }) {
            return Ok(RunOutcome::Superseded);
        }

        tracing::info!(
            "Published forecast for {} ({} periods)",
            point.location.display_name(),
            count
        );
        Ok(RunOutcome::Published)
    }

    /// Claim the next sequence number and cancel whatever run held the last one.
    fn begin_run(&self) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let (seq, previous) = {
            let mut current = self.cancel_token.lock();
            let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            (seq, current.replace(token.clone()))
        };
        if let Some(previous) = previous {
            previous.cancel();
        }
        (seq, token)
    }

    fn is_current(&self, seq: u64) -> bool {
        self.sequence.load(Ordering::SeqCst) == seq
    }

    /// Apply `update` if run `seq` is still the newest. Returns whether it was applied.
    fn publish<F>(&self, seq: u64, update: F) -> bool
    where
        F: FnOnce(&mut crate::state::ForecastState),
    {
        self.store.publish_if(|state| {
            if !self.is_current(seq) {
                return false;
            }
            update(state);
            true
        })
    }
}
