//! Plain-text view of the published forecast state.

use localcast_weather::{Forecast, ForecastState};

pub const LOADING: &str = "Loading forecast...";

/// Render `state` for the terminal. Pure; reads nothing else.
pub fn render(state: &ForecastState) -> String {
    let mut lines = Vec::new();

    if let Some(location) = &state.friendly_location {
        lines.push(format!("{} Weather", location));
        lines.push("=".repeat(location.chars().count() + 8));
        lines.push(String::new());
    }

    match &state.forecast {
        Some(forecast) => forecast_lines(forecast, &mut lines),
        None => lines.push(LOADING.to_string()),
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn forecast_lines(forecast: &Forecast, lines: &mut Vec<String>) {
    let current = forecast.current();
    lines.push("Current Conditions".to_string());
    lines.push(format!(
        "  {} and {}",
        current.format_temperature(),
        current.short_forecast
    ));
    lines.push(format!("  {}", current.detailed_forecast));

    let upcoming = forecast.upcoming();
    if upcoming.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Forecast".to_string());
    for period in upcoming {
        lines.push(match &period.icon {
            Some(icon) => format!("* {} [{}: {}]", period.name, period.short_forecast, icon),
            None => format!("* {}", period.name),
        });
        lines.push(format!(
            "  {} - {}",
            period.format_temperature(),
            period.detailed_forecast
        ));
    }
}
