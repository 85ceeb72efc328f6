use chrono::{DateTime, FixedOffset, Utc};
use localcast_core::{AppError, NetworkError};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair.
///
/// `(0, 0)` is the "not yet known" sentinel; a reading with either half at
/// zero never reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both halves are set (non-zero).
    pub fn is_known(&self) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0
    }

    /// Within geographic bounds.
    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// `{lat},{lon}` as used by the points endpoint.
    ///
    /// The service redirects anything more precise than four decimal places,
    /// so values are rounded there and trailing zeros dropped.
    pub fn path_segment(&self) -> String {
        format!(
            "{},{}",
            trim_decimal(self.latitude),
            trim_decimal(self.longitude)
        )
    }
}

fn trim_decimal(value: f64) -> String {
    let fixed = format!("{:.4}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// City and state of the point nearest the coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationMetadata {
    pub city: String,
    pub state: String,
}

impl LocationMetadata {
    /// "City, State"
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

/// One named forecast period ("Tonight", "Wednesday", ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub start_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub end_time: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub is_daytime: Option<bool>,
    pub temperature: f64,
    pub temperature_unit: String,
    #[serde(default)]
    pub wind_speed: Option<String>,
    #[serde(default)]
    pub wind_direction: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    pub short_forecast: String,
    pub detailed_forecast: String,
}

impl Period {
    /// Temperature with its unit, e.g. `72°F`
    pub fn format_temperature(&self) -> String {
        format!("{}°{}", self.temperature, self.temperature_unit)
    }
}

/// Chronological forecast periods; the first one describes current conditions.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    periods: Vec<Period>,
    pub fetched_at: DateTime<Utc>,
}

impl Forecast {
    /// Returns `None` for an empty period list.
    pub fn new(periods: Vec<Period>) -> Option<Self> {
        if periods.is_empty() {
            return None;
        }
        Some(Self {
            periods,
            fetched_at: Utc::now(),
        })
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Period 0.
    pub fn current(&self) -> &Period {
        &self.periods[0]
    }

    /// Periods after the current one, in order.
    pub fn upcoming(&self) -> &[Period] {
        &self.periods[1..]
    }
}

/// Which upstream call an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PointsLookup,
    Forecast,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::PointsLookup => write!(f, "points lookup"),
            Stage::Forecast => write!(f, "forecast"),
        }
    }
}

/// Location service errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Geolocation is not supported on this system")]
    Unsupported,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Weather pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("{stage} request failed: {source}")]
    Network {
        stage: Stage,
        #[source]
        source: NetworkError,
    },
    #[error("Malformed {stage} response: {message}")]
    Parse { stage: Stage, message: String },
    #[error("Location error: {0}")]
    Location(#[from] LocationError),
    #[error("Coordinates out of range: {0}")]
    InvalidCoordinates(Coordinates),
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl WeatherError {
    pub(crate) fn parse(stage: Stage, message: impl Into<String>) -> Self {
        Self::Parse {
            stage,
            message: message.into(),
        }
    }
}

impl From<WeatherError> for AppError {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::Network { source, .. } => AppError::Network(source),
            other => AppError::Other(anyhow::Error::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn period(number: u32, name: &str) -> Period {
        Period {
            number,
            name: name.to_string(),
            start_time: None,
            end_time: None,
            is_daytime: None,
            temperature: 70.0,
            temperature_unit: "F".to_string(),
            wind_speed: None,
            wind_direction: None,
            icon: None,
            short_forecast: "Sunny".to_string(),
            detailed_forecast: "Sunny all day.".to_string(),
        }
    }

    #[test]
    fn test_sentinel_is_unknown() {
        assert!(!Coordinates::default().is_known());
        assert!(!Coordinates::new(0.0, -84.388).is_known());
        assert!(!Coordinates::new(33.749, 0.0).is_known());
        assert!(Coordinates::new(33.749, -84.388).is_known());
    }

    #[test]
    fn test_range_check() {
        assert!(Coordinates::new(90.0, -180.0).in_range());
        assert!(!Coordinates::new(90.5, 10.0).in_range());
        assert!(!Coordinates::new(10.0, 181.0).in_range());
    }

    #[test]
    fn test_path_segment_rounds_and_trims() {
        assert_eq!(
            Coordinates::new(33.749, -84.388).path_segment(),
            "33.749,-84.388"
        );
        assert_eq!(
            Coordinates::new(39.7456123, -97.0892987).path_segment(),
            "39.7456,-97.0893"
        );
        assert_eq!(Coordinates::new(40.0, -75.5).path_segment(), "40,-75.5");
    }

    #[test]
    fn test_display_name() {
        let meta = LocationMetadata {
            city: "Atlanta".to_string(),
            state: "GA".to_string(),
        };
        assert_eq!(meta.display_name(), "Atlanta, GA");
    }

    #[test]
    fn test_empty_forecast_rejected() {
        assert!(Forecast::new(Vec::new()).is_none());
    }

    #[test]
    fn test_forecast_split() {
        let forecast = Forecast::new(vec![
            period(1, "Tonight"),
            period(2, "Wednesday"),
            period(3, "Wednesday Night"),
        ])
        .unwrap();
        assert_eq!(forecast.current().name, "Tonight");
        let names: Vec<_> = forecast.upcoming().iter().map(|p| p.number).collect();
        assert_eq!(names, vec![2, 3]);
    }

    #[test]
    fn test_period_deserializes_upstream_shape() {
        let json = serde_json::json!({
            "number": 1,
            "name": "This Afternoon",
            "startTime": "2026-10-16T14:00:00-04:00",
            "endTime": "2026-10-16T18:00:00-04:00",
            "isDaytime": true,
            "temperature": 72,
            "temperatureUnit": "F",
            "temperatureTrend": null,
            "windSpeed": "5 mph",
            "windDirection": "NW",
            "icon": "https://api.weather.gov/icons/land/day/few?size=medium",
            "shortForecast": "Sunny",
            "detailedForecast": "Sunny, with a high near 72."
        });
        let period: Period = serde_json::from_value(json).unwrap();
        assert_eq!(period.format_temperature(), "72°F");
        assert_eq!(period.is_daytime, Some(true));
        assert!(period.icon.is_some());
        assert!(period.start_time.is_some());
    }

    #[test]
    fn test_network_error_maps_to_app_network() {
        let err = WeatherError::Network {
            stage: Stage::Forecast,
            source: NetworkError::Timeout,
        };
        assert!(err.to_string().starts_with("forecast request failed"));
        let app: AppError = err.into();
        assert!(matches!(app, AppError::Network(NetworkError::Timeout)));
    }
}
