use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use localcast_core::{App, AppError, Config};
use localcast_weather::{
    coordinates_channel, ConfiguredProvider, CoordinateAcquisition, CoordinateObserver,
    DiagnosticSink, ForecastPipeline, ForecastState, ForecastStore, NwsClient, TracingSink,
};

mod render;

#[tokio::main]
async fn main() -> ExitCode {
    // Optional positional argument: path to an alternate config file
    let app = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => App::with_config_path(&path),
        None => App::new(),
    };

    let mut app = match app {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{}", e.user_message());
            eprintln!("  {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = localcast_core::init(&app.config().logging.level) {
        eprintln!("{}", e);
    }
    app.report_config_warnings();

    let result = run(app.config()).await;
    app.shutdown();

    match result {
        Ok(state) => {
            print!("{}", render::render(&state));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

/// Acquire a position, let the observer drive the pipeline, and return what got published.
async fn run(config: &Config) -> Result<ForecastState, AppError> {
    let client = NwsClient::from_config(&config.weather)?;
    let diagnostics: Arc<dyn DiagnosticSink> = Arc::new(TracingSink);
    let store = Arc::new(ForecastStore::new());
    let pipeline = Arc::new(ForecastPipeline::new(
        client,
        Arc::clone(&store),
        Arc::clone(&diagnostics),
    ));

    let (coords_tx, coords_rx) = coordinates_channel();
    let observer = tokio::spawn(CoordinateObserver::new(pipeline, coords_rx).run());

    let provider = ConfiguredProvider::from_config(&config.location);
    let acquisition = CoordinateAcquisition::new(coords_tx, diagnostics);
    acquisition.acquire(&provider).await;
    // Closing the coordinate source lets the observer finish once its runs do.
    drop(acquisition);

    if let Err(e) = observer.await {
        tracing::error!("Coordinate observer stopped unexpectedly: {}", e);
    }

    Ok(store.snapshot())
}
