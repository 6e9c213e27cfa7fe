// Wire types for the portal's JSON endpoints.
//
// Request bodies are serialized as-is; response types keep the portal's
// field names via `#[serde(rename)]` and are discarded once mapped into
// readings by the core crate.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Timestamp layout the chart endpoint expects.
const DATE_FORMAT: &str = "%Y/%m/%d";

// ── Login ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

// ── Daily log ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct DailyLogRequest<'a> {
    pub plant_id: &'a str,
    pub machine_id: &'a str,
}

/// Instantaneous power and day-to-date energy for one plant.
///
/// Every field is required: a missing or non-numeric value fails the
/// whole payload rather than producing a partial reading set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DailyLog {
    #[serde(rename = "powerpv")]
    pub power_pv: f64,
    #[serde(rename = "powerbatt")]
    pub power_battery: f64,
    #[serde(rename = "powergrid")]
    pub power_grid: f64,
    #[serde(rename = "powerhouse")]
    pub power_house: f64,
    #[serde(rename = "percentbattery")]
    pub battery_percent: f64,
    pub energy_pv: f64,
    #[serde(rename = "energy_battery_discha")]
    pub energy_battery_discharge: f64,
    #[serde(rename = "energy_battery_char")]
    pub energy_battery_charge: f64,
    pub energy_grid_consumed: f64,
    pub energy_grid_feed_in: f64,
    #[serde(rename = "energy_powerhouse")]
    pub energy_house: f64,
    pub self_sufficiency: f64,
}

// ── Annual log ───────────────────────────────────────────────────────

/// Body for the yearly chart endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnualLogRequest {
    pub start_date: String,
    pub end_date: String,
    pub chart_type: String,
    pub custom_type: String,
    pub plant_id: i64,
    pub machine_id: String,
    pub dropdown_start_date: String,
    pub dropdown_end_date: String,
    pub custom_dates: String,
}

impl AnnualLogRequest {
    /// Build the yearly-chart request as of `today`.
    ///
    /// The range runs from `start` through December 31 of the current
    /// year; the dropdown sub-range covers the current calendar month.
    pub fn new(plant_id: i64, start: NaiveDate, today: NaiveDate) -> Self {
        let year_end = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today);
        let month_start = today.with_day(1).unwrap_or(today);
        let month_end = last_day_of_month(today);

        Self {
            start_date: day_start(start),
            end_date: day_end(year_end),
            chart_type: "years".into(),
            custom_type: String::new(),
            plant_id,
            machine_id: String::new(),
            dropdown_start_date: day_start(month_start),
            dropdown_end_date: day_end(month_end),
            custom_dates: "years".into(),
        }
    }
}

fn day_start(date: NaiveDate) -> String {
    format!("{} 00:00:00", date.format(DATE_FORMAT))
}

fn day_end(date: NaiveDate) -> String {
    format!("{} 23:59:59", date.format(DATE_FORMAT))
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.checked_sub_days(Days::new(1)))
        .unwrap_or(date)
}

/// Chronological list of yearly aggregates.
///
/// Records are kept as raw JSON so that only the record actually consumed
/// (the most recent) has to be well-formed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnualLog {
    #[serde(default)]
    pub data: Option<Vec<serde_json::Value>>,
}

impl AnnualLog {
    /// Decode the most recent yearly record, or `None` if `data` is
    /// missing or empty.
    pub fn latest(&self) -> Result<Option<AnnualRecord>, serde_json::Error> {
        match self.data.as_deref().and_then(<[_]>::last) {
            Some(raw) => AnnualRecord::deserialize(raw).map(Some),
            None => Ok(None),
        }
    }
}

/// One year of aggregate energy figures.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnnualRecord {
    #[serde(rename = "chart_powerpv")]
    pub energy_pv: f64,
    #[serde(rename = "chart_powergrid")]
    pub energy_grid_given: f64,
    #[serde(rename = "energy_powerhouse")]
    pub energy_house: f64,
    #[serde(rename = "energy_grid_consumed")]
    pub energy_grid_taken: f64,
    pub self_sufficiency: f64,
}
