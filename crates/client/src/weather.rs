//! Weather lookups against OpenWeather, in Vietnamese and metric units.
//!
//! Cities are searched within Vietnam only. A city's current conditions
//! take two calls: geocode the name, then ask for its coordinates.

use std::sync::Arc;

use nongsan_core::dto::{Coord, CurrentWeather, Forecast, GeoLocation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;

const COUNTRY: &str = "VN";
const UNITS: &str = "metric";
const LANG: &str = "vi";

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("OpenWeather API key is not configured")]
    MissingApiKey,

    #[error("City is required")]
    CityRequired,

    /// Missing, non-finite or out of range.
    #[error("Latitude and Longitude are required")]
    CoordinatesRequired,

    #[error("City not found")]
    CityNotFound,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// OpenWeather answered with an error, e.g. `city not found`.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// OpenWeather client. Cheap to clone.
#[derive(Clone)]
pub struct WeatherClient {
    inner: Arc<WeatherClientInner>,
}

struct WeatherClientInner {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: Url,
}

impl WeatherClient {
    /// Create a new weather client. A missing key is only reported when a
    /// lookup is made.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("nongsan-client/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(WeatherClientInner {
                client: builder.build()?,
                api_key: config.openweather_api_key.clone(),
                base_url: config.openweather_url.clone(),
            }),
        })
    }

    /// The best match for a Vietnamese city name.
    ///
    /// # Errors
    ///
    /// Returns `CityRequired` for a blank name and `CityNotFound` when
    /// nothing matches.
    #[instrument(skip(self))]
    pub async fn find_city(&self, city: &str) -> Result<GeoLocation, WeatherError> {
        let city = required_city(city)?;
        let query = format!("{city},{COUNTRY}");
        let matches: Vec<GeoLocation> = self
            .get("/geo/1.0/direct", &[("q", query.as_str()), ("limit", "1")])
            .await?;
        matches.into_iter().next().ok_or(WeatherError::CityNotFound)
    }

    /// Conditions now at a coordinate.
    ///
    /// # Errors
    ///
    /// Returns `CoordinatesRequired` for coordinates off the globe, or the
    /// OpenWeather error.
    #[instrument(skip(self))]
    pub async fn current(&self, coord: Coord) -> Result<CurrentWeather, WeatherError> {
        if !valid_coord(coord) {
            return Err(WeatherError::CoordinatesRequired);
        }
        let (lat, lon) = (coord.lat.to_string(), coord.lon.to_string());
        let weather: CurrentWeather = self
            .get(
                "/data/2.5/weather",
                &[("lat", lat.as_str()), ("lon", lon.as_str()), ("units", UNITS), ("lang", LANG)],
            )
            .await?;
        if weather.cod != 200 {
            return Err(WeatherError::Api {
                status: weather.cod,
                message: format!("Unexpected weather code {}", weather.cod),
            });
        }
        Ok(weather)
    }

    /// Conditions now in a city, found by name.
    ///
    /// # Errors
    ///
    /// Same as [`WeatherClient::find_city`] and [`WeatherClient::current`].
    pub async fn current_in_city(
        &self,
        city: &str,
    ) -> Result<(GeoLocation, CurrentWeather), WeatherError> {
        let location = self.find_city(city).await?;
        let weather = self.current(location.coord()).await?;
        Ok((location, weather))
    }

    /// Five days ahead in 3-hour slots.
    ///
    /// # Errors
    ///
    /// Returns `CityRequired` for a blank name, or the OpenWeather error.
    #[instrument(skip(self))]
    pub async fn forecast(&self, city: &str) -> Result<Forecast, WeatherError> {
        let city = required_city(city)?;
        self.get(
            "/data/2.5/forecast",
            &[("q", city), ("units", UNITS), ("lang", LANG)],
        )
        .await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, WeatherError> {
        let Some(api_key) = &self.inner.api_key else {
            return Err(WeatherError::MissingApiKey);
        };

        let mut url = self.inner.base_url.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{base}{path}"));
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("appid", api_key.expose_secret());

        // The URL carries the key; log the path only.
        debug!(path, "Sending weather request");
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| status.to_string());
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| WeatherError::Parse(format!("Failed to parse response: {e}")))
    }
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("has_api_key", &self.inner.api_key.is_some())
            .finish_non_exhaustive()
    }
}

fn required_city(city: &str) -> Result<&str, WeatherError> {
    let city = city.trim();
    if city.is_empty() {
        Err(WeatherError::CityRequired)
    } else {
        Ok(city)
    }
}

fn valid_coord(coord: Coord) -> bool {
    (-90.0..=90.0).contains(&coord.lat) && (-180.0..=180.0).contains(&coord.lon)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(api_key: Option<&str>) -> WeatherClient {
        let mut config = ClientConfig::for_server("http://127.0.0.1:9").unwrap();
        config.openweather_api_key = api_key.map(SecretString::from);
        config.openweather_url = Url::parse("http://127.0.0.1:9").unwrap();
        WeatherClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_blank_city_is_rejected_before_sending() {
        let weather = client(Some("key"));
        assert!(matches!(
            weather.find_city("   ").await,
            Err(WeatherError::CityRequired)
        ));
        let err = weather.forecast("").await.unwrap_err();
        assert_eq!(err.to_string(), "City is required");
    }

    #[tokio::test]
    async fn test_coordinates_off_the_globe_are_rejected() {
        let weather = client(Some("key"));
        for coord in [
            Coord { lat: 91.0, lon: 105.8 },
            Coord { lat: 21.0, lon: -181.0 },
            Coord { lat: f64::NAN, lon: 105.8 },
        ] {
            let err = weather.current(coord).await.unwrap_err();
            assert_eq!(err.to_string(), "Latitude and Longitude are required");
        }
    }

    #[tokio::test]
    async fn test_missing_key_is_reported() {
        let weather = client(None);
        assert!(matches!(
            weather.find_city("Huế").await,
            Err(WeatherError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_http_error() {
        let weather = client(Some("key"));
        assert!(matches!(
            weather.forecast("Huế").await,
            Err(WeatherError::Http(_))
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", client(Some("top-secret")));
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("has_api_key: true"));
    }
}
