//! Re-runs the pipeline whenever the coordinates change.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::pipeline::{ForecastPipeline, RunOutcome};
use crate::types::Coordinates;

pub struct CoordinateObserver {
    pipeline: Arc<ForecastPipeline>,
    rx: watch::Receiver<Coordinates>,
}

impl CoordinateObserver {
    pub fn new(pipeline: Arc<ForecastPipeline>, rx: watch::Receiver<Coordinates>) -> Self {
        Self { pipeline, rx }
    }

    /// Watch until the coordinate sender is dropped, then wait for in-flight runs.
    ///
    /// Runs are spawned, not awaited in turn, so a newer reading can overtake
    /// an older one; the pipeline discards whichever is superseded.
    pub async fn run(mut self) {
        let mut runs = JoinSet::new();

        let initial = *self.rx.borrow_and_update();
        if initial.is_known() {
            self.spawn_run(&mut runs, initial);
        }

        loop {
            tokio::select! {
                changed = self.rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let coords = *self.rx.borrow_and_update();
                    self.spawn_run(&mut runs, coords);
                }
                Some(joined) = runs.join_next(), if !runs.is_empty() => {
                    log_joined(joined);
                }
            }
        }

        tracing::debug!("Coordinate source closed, waiting for {} runs", runs.len());
        while let Some(joined) = runs.join_next().await {
            log_joined(joined);
        }
    }

    fn spawn_run(&self, runs: &mut JoinSet<RunOutcome>, coords: Coordinates) {
        tracing::debug!("Coordinates changed to {}", coords);
        let pipeline = Arc::clone(&self.pipeline);
        runs.spawn(async move { pipeline.fetch_forecast(coords).await });
    }
}

fn log_joined(joined: Result<RunOutcome, tokio::task::JoinError>) {
    match joined {
        Ok(outcome) => tracing::debug!("Forecast run finished: {:?}", outcome),
        Err(e) => tracing::error!("Forecast run task failed: {}", e),
    }
}
