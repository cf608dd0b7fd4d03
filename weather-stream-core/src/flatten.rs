//! Reshape the current/forecast/alerts documents into one flat record per
//! forecast day.
//!
//! Location, current observation, air quality and the first alert are a single
//! snapshot, so they repeat identically on every day's record. Only the
//! `forecast.forecastday[]` entries drive how many records come out.

use tracing::debug;

use crate::{
    access::Field,
    coerce::{safe_datetime, safe_float, safe_int},
    combine::combine_date_and_time,
    model::{ApiDocument, FlatRecord},
};

fn owned(field: Field<'_>) -> Option<String> {
    field.text().map(str::to_owned)
}

/// Date portion of the provider's local time: its first ten characters.
///
/// Shorter or missing values are passed through truncated/empty and simply
/// fail to combine later on.
fn today_date(localtime: Option<&str>) -> String {
    localtime.unwrap_or_default().chars().take(10).collect()
}

pub fn flatten(current: &ApiDocument, forecast: &ApiDocument, alerts: &ApiDocument) -> Vec<FlatRecord> {
    let location = current.root().get("location");
    let now = current.root().get("current");
    let condition = now.get("condition");
    let air_quality = now.get("air_quality");
    let days = forecast.root().get("forecast").get("forecastday");
    let alert = alerts.root().get("alerts").get("alert").first();

    let raw_localtime = location.get("localtime").text();
    let today = today_date(raw_localtime);
    let first_astro = days.first().get("astro");
    let sunrise_today =
        combine_date_and_time(Some(today.as_str()), first_astro.get("sunrise").text());
    let sunset_today = combine_date_and_time(Some(today.as_str()), first_astro.get("sunset").text());

    days.items()
        .map(|day| {
            let date = day.get("date").text();
            let astro = day.get("astro");
            let sunrise = astro.get("sunrise").text();
            let sunset = astro.get("sunset").text();
            let summary = day.get("day");

            debug!(?date, ?sunrise, "combining forecast sunrise");
            debug!(?date, ?sunset, "combining forecast sunset");

            FlatRecord {
                name: owned(location.get("name")),
                region: owned(location.get("region")),
                country: owned(location.get("country")),
                lat: location.get("lat").value().cloned(),
                lon: location.get("lon").value().cloned(),
                localtime: safe_datetime(location.get("localtime")),
                forecast_date: date.map(str::to_owned),
                forecast_key: format!(
                    "{} | {}",
                    raw_localtime.unwrap_or_default(),
                    date.unwrap_or_default()
                ),
                maxtemp_c: safe_float(summary.get("maxtemp_c")),
                mintemp_c: safe_float(summary.get("mintemp_c")),
                avgtemp_c: safe_float(summary.get("avgtemp_c")),
                condition: owned(summary.get("condition").get("text")),
                sunrise: combine_date_and_time(date, sunrise),
                sunset: combine_date_and_time(date, sunset),
                sunrise_today: sunrise_today.clone(),
                sunset_today: sunset_today.clone(),
                temp_c: safe_float(now.get("temp_c")),
                is_day: safe_int(now.get("is_day")),
                condition_text: owned(condition.get("text")),
                condition_icon: owned(condition.get("icon")),
                wind_kph: safe_float(now.get("wind_kph")),
                wind_degree: safe_int(now.get("wind_degree")),
                wind_dir: owned(now.get("wind_dir")),
                pressure_in: safe_float(now.get("pressure_in")),
                precip_in: safe_float(now.get("precip_in")),
                humidity: safe_int(now.get("humidity")),
                cloud: safe_int(now.get("cloud")),
                feelslike_c: safe_float(now.get("feelslike_c")),
                uv: safe_float(now.get("uv")),
                air_quality_co: safe_float(air_quality.get("co")),
                air_quality_no2: safe_float(air_quality.get("no2")),
                air_quality_o3: safe_float(air_quality.get("o3")),
                air_quality_so2: safe_float(air_quality.get("so2")),
                air_quality_pm2_5: safe_float(air_quality.get("pm2_5")),
                air_quality_pm10: safe_float(air_quality.get("pm10")),
                air_quality_us_epa_index: safe_int(air_quality.get("us-epa-index")),
                air_quality_gb_defra_index: safe_int(air_quality.get("gb-defra-index")),
                alert_headline: owned(alert.get("headline")),
                alert_severity: owned(alert.get("severity")),
                alert_description: owned(alert.get("desc")),
                alert_instruction: owned(alert.get("instruction")),
            }
        })
        .collect()
}
