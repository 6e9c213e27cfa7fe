// ── Payload → reading conversion ──
//
// Maps raw portal payloads onto the reading catalog. Each function yields
// the complete set of entries for one cycle or fails as a whole, so the
// store never receives a partially mapped cycle.

use delios_api::{AnnualLog, DailyLog};

use crate::error::FetchError;
use crate::reading::{Cycle, Metric, ReadingValue};

pub const DAILY_METRIC_COUNT: usize = 12;
pub const ANNUAL_METRIC_COUNT: usize = 5;

pub type DailyReadings = [(Metric, ReadingValue); DAILY_METRIC_COUNT];
pub type AnnualReadings = [(Metric, ReadingValue); ANNUAL_METRIC_COUNT];

/// Round to the nearest tenth.
///
/// Rounds the exact binary value, with exact ties going to the even digit:
/// `0.25` becomes `0.2` and `1.45` (stored as 1.4499...) becomes `1.4`.
pub fn round1(value: f64) -> ReadingValue {
    ReadingValue::Float(nearest_tenth(value))
}

/// Round to one decimal and flip the sign. Battery charging and grid
/// export are reported as negative flow.
pub fn round1_negated(value: f64) -> ReadingValue {
    ReadingValue::Float(-nearest_tenth(value))
}

fn nearest_tenth(value: f64) -> f64 {
    // Float formatting is correctly rounded, so the text is exact.
    format!("{value:.1}").parse().unwrap_or(value)
}

/// Truncate toward zero.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub fn truncate(value: f64) -> ReadingValue {
    ReadingValue::Integer(value.trunc() as i64)
}

/// All twelve daily readings.
pub fn daily_readings(log: &DailyLog) -> DailyReadings {
    [
        (Metric::PowerPv, round1(log.power_pv)),
        (Metric::PowerBatt, round1(log.power_battery)),
        (Metric::PowerGrid, round1(log.power_grid)),
        (Metric::PowerHouse, round1(log.power_house)),
        (Metric::PercentBatt, truncate(log.battery_percent)),
        (Metric::DailyEnergyPv, round1(log.energy_pv)),
        (
            Metric::DailyEnergyBattDischar,
            round1(log.energy_battery_discharge),
        ),
        (
            Metric::DailyEnergyBattChar,
            round1_negated(log.energy_battery_charge),
        ),
        (
            Metric::DailyEnergyGridTaken,
            round1(log.energy_grid_consumed),
        ),
        (
            Metric::DailyEnergyGridGiven,
            round1_negated(log.energy_grid_feed_in),
        ),
        (Metric::DailyEnergyHouse, round1(log.energy_house)),
        (Metric::DailySelfSufficiency, truncate(log.self_sufficiency)),
    ]
}

/// The five annual readings from the most recent yearly record.
///
/// `Ok(None)` when the series is missing or empty; an error when the
/// latest record lacks a field or carries a non-numeric one.
pub fn annual_readings(log: &AnnualLog) -> Result<Option<AnnualReadings>, FetchError> {
    let Some(record) = log
        .latest()
        .map_err(|e| FetchError::payload(Cycle::Annual, e))?
    else {
        return Ok(None);
    };

    Ok(Some([
        (Metric::AnnualEnergyPv, truncate(record.energy_pv)),
        (
            Metric::AnnualEnergyGridGiven,
            truncate(record.energy_grid_given),
        ),
        (Metric::AnnualEnergyHouse, truncate(record.energy_house)),
        (
            Metric::AnnualEnergyGridTaken,
            truncate(record.energy_grid_taken),
        ),
        (
            Metric::AnnualSelfSufficiency,
            truncate(record.self_sufficiency),
        ),
    ]))
}
