//! OpenWeather records: current conditions, geocoding and the 5-day
//! forecast. Field names follow OpenWeather's JSON (snake_case).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

/// One condition, e.g. `{ "main": "Rain", "description": "mưa nhẹ" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub id: u32,
    pub main: String,
    pub description: String,
    /// Icon code such as `10d`; see [`WeatherIcon`].
    pub icon: String,
}

/// Temperatures in °C, pressure in hPa, humidity in %.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
    #[serde(default)]
    pub sea_level: Option<f64>,
    #[serde(default)]
    pub grnd_level: Option<f64>,
    /// Forecast entries only.
    #[serde(default)]
    pub temp_kf: Option<f64>,
}

/// Speed in m/s, direction in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub deg: f64,
    #[serde(default)]
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clouds {
    /// Cloud cover in %.
    pub all: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentSys {
    #[serde(default)]
    pub country: Option<String>,
    pub sunrise: i64,
    pub sunset: i64,
}

/// Conditions now at a coordinate (`data/2.5/weather`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub coord: Coord,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    #[serde(default)]
    pub base: Option<String>,
    pub main: MainReadings,
    /// Metres.
    #[serde(default)]
    pub visibility: Option<u32>,
    pub wind: Wind,
    pub clouds: Clouds,
    pub dt: i64,
    pub sys: CurrentSys,
    /// Offset from UTC in seconds.
    pub timezone: i32,
    pub id: u64,
    pub name: String,
    pub cod: u16,
}

impl CurrentWeather {
    /// The first reported condition, which OpenWeather ranks primary.
    #[must_use]
    pub fn condition(&self) -> Option<&WeatherCondition> {
        self.weather.first()
    }
}

/// A place found by name (`geo/1.0/direct`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub name: String,
    /// Name by language code, e.g. `vi`.
    #[serde(default)]
    pub local_names: HashMap<String, String>,
    pub lat: f64,
    pub lon: f64,
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
}

impl GeoLocation {
    /// The Vietnamese name when OpenWeather has one.
    #[must_use]
    pub fn vietnamese_name(&self) -> &str {
        self.local_names.get("vi").map_or(&self.name, String::as_str)
    }

    #[must_use]
    pub const fn coord(&self) -> Coord {
        Coord {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rain {
    /// Millimetres over the 3-hour slot.
    #[serde(rename = "3h", default)]
    pub three_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastSys {
    /// Part of day: `d` or `n`.
    pub pod: String,
}

/// One 3-hour forecast slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub dt: i64,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    pub clouds: Clouds,
    pub wind: Wind,
    #[serde(default)]
    pub visibility: Option<u32>,
    /// Probability of precipitation, `0.0..=1.0`.
    #[serde(default)]
    pub pop: Option<f64>,
    #[serde(default)]
    pub rain: Option<Rain>,
    #[serde(default)]
    pub sys: Option<ForecastSys>,
    /// `YYYY-MM-DD HH:mm:ss`, UTC.
    pub dt_txt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastCity {
    pub id: u64,
    pub name: String,
    pub coord: Coord,
    pub country: String,
    #[serde(default)]
    pub population: Option<u64>,
    #[serde(default)]
    pub timezone: Option<i32>,
    #[serde(default)]
    pub sunrise: Option<i64>,
    #[serde(default)]
    pub sunset: Option<i64>,
}

/// Five days in 3-hour slots (`data/2.5/forecast`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub cnt: u32,
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
    pub city: ForecastCity,
}

// ─────────────────────────────────────────────────────────────────────────────
// Icons
// ─────────────────────────────────────────────────────────────────────────────

/// What an OpenWeather icon code depicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherIcon {
    Sun,
    Moon,
    CloudSun,
    CloudMoon,
    Cloud,
    CloudDrizzle,
    CloudRain,
    CloudLightning,
    CloudSnow,
    CloudFog,
}

impl WeatherIcon {
    /// Map a code such as `01d` or `10n`. Unknown codes show a cloud.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "01d" => Self::Sun,
            "01n" => Self::Moon,
            "02d" => Self::CloudSun,
            "02n" => Self::CloudMoon,
            "09d" | "09n" => Self::CloudDrizzle,
            "10d" | "10n" => Self::CloudRain,
            "11d" | "11n" => Self::CloudLightning,
            "13d" | "13n" => Self::CloudSnow,
            "50d" | "50n" => Self::CloudFog,
            _ => Self::Cloud,
        }
    }

    /// Vietnamese label for the icon.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sun | Self::Moon => "Trời quang",
            Self::CloudSun | Self::CloudMoon => "Ít mây",
            Self::Cloud => "Nhiều mây",
            Self::CloudDrizzle | Self::CloudRain => "Mưa",
            Self::CloudLightning => "Dông",
            Self::CloudSnow => "Tuyết",
            Self::CloudFog => "Sương mù",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_icon_codes() {
        assert_eq!(WeatherIcon::from_code("01d"), WeatherIcon::Sun);
        assert_eq!(WeatherIcon::from_code("01n"), WeatherIcon::Moon);
        assert_eq!(WeatherIcon::from_code("04n"), WeatherIcon::Cloud);
        assert_eq!(WeatherIcon::from_code("10d"), WeatherIcon::CloudRain);
        assert_eq!(WeatherIcon::from_code("99x"), WeatherIcon::Cloud);
        assert_eq!(WeatherIcon::from_code("11n").label(), "Dông");
    }

    #[test]
    fn test_geo_location_prefers_vietnamese_name() {
        let location: GeoLocation = serde_json::from_value(json!({
            "name": "Hue",
            "local_names": { "vi": "Huế", "en": "Hue" },
            "lat": 16.4637,
            "lon": 107.5909,
            "country": "VN"
        }))
        .unwrap();
        assert_eq!(location.vietnamese_name(), "Huế");
        assert!(location.state.is_none());

        let bare: GeoLocation = serde_json::from_value(json!({
            "name": "Can Tho", "lat": 10.03, "lon": 105.78, "country": "VN"
        }))
        .unwrap();
        assert_eq!(bare.vietnamese_name(), "Can Tho");
    }

    #[test]
    fn test_forecast_entry_reads_rain_slot() {
        let entry: ForecastEntry = serde_json::from_value(json!({
            "dt": 1_717_236_000,
            "main": {
                "temp": 29.5, "feels_like": 34.1, "temp_min": 28.9, "temp_max": 29.5,
                "pressure": 1008, "humidity": 78, "temp_kf": 0.6
            },
            "weather": [{ "id": 500, "main": "Rain", "description": "mưa nhẹ", "icon": "10d" }],
            "clouds": { "all": 75 },
            "wind": { "speed": 3.2, "deg": 210 },
            "pop": 0.64,
            "rain": { "3h": 1.27 },
            "sys": { "pod": "d" },
            "dt_txt": "2024-06-01 12:00:00"
        }))
        .unwrap();
        assert_eq!(entry.rain.unwrap().three_hours, Some(1.27));
        assert_eq!(entry.main.temp_kf, Some(0.6));
        assert!(entry.visibility.is_none());
    }
}
