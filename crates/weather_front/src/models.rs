use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

/// Unit used for the headline temperature. Serialized with the upstream field names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TemperatureScale {
    #[default]
    #[serde(rename = "temp_c")]
    Celsius,
    #[serde(rename = "temp_f")]
    Fahrenheit,
}

impl TemperatureScale {
    /// Anything other than the two upstream field names falls back to celsius.
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "temp_f" => TemperatureScale::Fahrenheit,
            _ => TemperatureScale::Celsius,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureScale::Celsius => "temp_c",
            TemperatureScale::Fahrenheit => "temp_f",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureScale::Celsius => "°C",
            TemperatureScale::Fahrenheit => "°F",
        }
    }

    pub fn pick(&self, celsius: f64, fahrenheit: f64) -> f64 {
        match self {
            TemperatureScale::Celsius => celsius,
            TemperatureScale::Fahrenheit => fahrenheit,
        }
    }
}

impl std::fmt::Display for TemperatureScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query string accepted by `/` and `/api/v1/forecast`.
#[derive(Clone, Debug, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ForecastParams {
    /// City to look up, resolved from the caller's address when empty
    #[serde(default)]
    pub city_name: String,
    /// `temp_c` or `temp_f`, anything else is treated as `temp_c`
    #[serde(default = "default_temp_scale")]
    pub temp_scale: String,
}

fn default_temp_scale() -> String {
    String::from(TemperatureScale::Celsius.as_str())
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            city_name: String::new(),
            temp_scale: default_temp_scale(),
        }
    }
}

/// Built from raw query pairs so repeated or unknown keys never reject a request.
/// The last value given for a key wins.
impl FromIterator<(String, String)> for ForecastParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut params = ForecastParams::default();
        for (key, value) in pairs {
            match key.as_str() {
                "city_name" => params.city_name = value,
                "temp_scale" => params.temp_scale = value,
                _ => {}
            }
        }
        params
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForecastQuery {
    pub city: String,
    pub temperature_scale: TemperatureScale,
}

impl From<&ForecastParams> for ForecastQuery {
    fn from(value: &ForecastParams) -> Self {
        ForecastQuery {
            city: value.city_name.trim().to_owned(),
            temperature_scale: TemperatureScale::coerce(&value.temp_scale),
        }
    }
}

/// Payload of weatherapi.com `forecast.json`. Fields the page does not read are kept in `extra`
/// so hours and days pass through untouched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawForecastResponse {
    pub location: RawLocation,
    pub current: RawCurrent,
    pub forecast: RawForecast,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawLocation {
    pub name: String,
    pub country: String,
    /// Local time at the location, `YYYY-MM-DD HH:MM`
    pub localtime: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawCurrent {
    pub condition: Condition,
    pub humidity: f64,
    pub wind_kph: f64,
    pub precip_in: f64,
    pub temp_c: f64,
    pub temp_f: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawForecast {
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Condition {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

/// One day of upstream forecast data, passed through to the page as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ForecastDay {
    /// `YYYY-MM-DD`
    pub date: String,
    pub day: DaySummary,
    pub hour: Vec<HourlyRecord>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DaySummary {
    pub maxtemp_c: f64,
    pub maxtemp_f: f64,
    pub mintemp_c: f64,
    pub mintemp_f: f64,
    pub condition: Condition,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HourlyRecord {
    /// `YYYY-MM-DD HH:MM`
    pub time: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: Condition,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: Map<String, Value>,
}
