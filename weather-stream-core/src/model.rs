use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::access::Field;

/// The three provider calls a run makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Current,
    Forecast,
    Alerts,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current",
            Endpoint::Forecast => "forecast",
            Endpoint::Alerts => "alerts",
        }
    }

    /// Path segment under the provider's base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Current => "current.json",
            Endpoint::Forecast => "forecast.json",
            Endpoint::Alerts => "alerts.json",
        }
    }

    pub const fn all() -> &'static [Endpoint] {
        &[Endpoint::Current, Endpoint::Forecast, Endpoint::Alerts]
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one provider call.
///
/// A non-200 answer doesn't fail the run: it becomes `Degraded`, which reads
/// as a document with no fields so flattening can carry on.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiDocument {
    Ok(Value),
    Degraded(String),
}

impl ApiDocument {
    pub fn root(&self) -> Field<'_> {
        match self {
            ApiDocument::Ok(value) => Field::new(value),
            ApiDocument::Degraded(_) => Field::absent(),
        }
    }

    pub fn degraded_reason(&self) -> Option<&str> {
        match self {
            ApiDocument::Ok(_) => None,
            ApiDocument::Degraded(reason) => Some(reason),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded_reason().is_some()
    }
}

impl From<Value> for ApiDocument {
    fn from(value: Value) -> Self {
        ApiDocument::Ok(value)
    }
}

/// One forecast day joined with the current snapshot, ready to publish.
///
/// Field names are the wire keys. Absent values serialize as `null` so a
/// consumer can tell "no data" from zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    pub name: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub lat: Option<Value>,
    pub lon: Option<Value>,
    pub localtime: Option<String>,
    pub forecast_date: Option<String>,
    /// `"<raw localtime> | <raw forecast date>"`. Not unique across re-sends.
    ///
    /// A missing part renders as an empty string, `" | 2024-06-01"`, never as
    /// `"None | 2024-06-01"`. Consumers joining on keys written by older
    /// producers that emitted the `None` form must normalize that prefix first.
    pub forecast_key: String,
    pub maxtemp_c: Option<f64>,
    pub mintemp_c: Option<f64>,
    pub avgtemp_c: Option<f64>,
    pub condition: Option<String>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub sunrise_today: Option<String>,
    pub sunset_today: Option<String>,
    pub temp_c: Option<f64>,
    pub is_day: Option<i64>,
    pub condition_text: Option<String>,
    pub condition_icon: Option<String>,
    pub wind_kph: Option<f64>,
    pub wind_degree: Option<i64>,
    pub wind_dir: Option<String>,
    pub pressure_in: Option<f64>,
    pub precip_in: Option<f64>,
    pub humidity: Option<i64>,
    pub cloud: Option<i64>,
    pub feelslike_c: Option<f64>,
    pub uv: Option<f64>,
    pub air_quality_co: Option<f64>,
    pub air_quality_no2: Option<f64>,
    pub air_quality_o3: Option<f64>,
    pub air_quality_so2: Option<f64>,
    pub air_quality_pm2_5: Option<f64>,
    pub air_quality_pm10: Option<f64>,
    pub air_quality_us_epa_index: Option<i64>,
    pub air_quality_gb_defra_index: Option<i64>,
    pub alert_headline: Option<String>,
    pub alert_severity: Option<String>,
    pub alert_description: Option<String>,
    pub alert_instruction: Option<String>,
}
