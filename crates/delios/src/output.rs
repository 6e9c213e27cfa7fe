//! Reading output: table or JSON.
//!
//! Every catalog metric gets a row in display order. Metrics that have not
//! been fetched yet render as `-` in the table and `null` in JSON.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::{Table, Tabled, settings::Style};

use delios_core::{Category, Metric, ReadingValue, Unit};

use crate::cli::OutputFormat;
use crate::error::CliError;

#[derive(Tabled)]
struct ReadingRow {
    #[tabled(rename = "Reading")]
    label: &'static str,
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Unit")]
    unit: String,
}

#[derive(Serialize)]
struct ReadingEntry {
    label: &'static str,
    value: Option<ReadingValue>,
    unit: Unit,
    category: Category,
}

/// Render a store snapshot in the chosen format.
pub fn render_readings(
    format: OutputFormat,
    snapshot: &BTreeMap<Metric, ReadingValue>,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => Ok(render_table(snapshot)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&entries(snapshot))?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(&entries(snapshot))?),
    }
}

/// Print rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) -> Result<(), CliError> {
    if quiet || output.is_empty() {
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}

fn render_table(snapshot: &BTreeMap<Metric, ReadingValue>) -> String {
    let rows: Vec<ReadingRow> = Metric::iter()
        .map(|metric| ReadingRow {
            label: metric.label(),
            key: metric.as_str(),
            value: snapshot
                .get(&metric)
                .map_or_else(|| "-".into(), ToString::to_string),
            unit: metric.unit().to_string(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Keyed by `Metric`, whose ordering is catalog order; it serializes as the
/// snake_case reading key.
fn entries(snapshot: &BTreeMap<Metric, ReadingValue>) -> BTreeMap<Metric, ReadingEntry> {
    Metric::iter()
        .map(|metric| {
            (
                metric,
                ReadingEntry {
                    label: metric.label(),
                    value: snapshot.get(&metric).copied(),
                    unit: metric.unit(),
                    category: metric.category(),
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use serde_json::Value;

    use super::*;

    fn sample() -> BTreeMap<Metric, ReadingValue> {
        BTreeMap::from([
            (Metric::PercentBatt, ReadingValue::Integer(87)),
            (Metric::DailyEnergyGridGiven, ReadingValue::Float(-2.0)),
        ])
    }

    #[test]
    fn table_lists_every_metric() {
        let table = render_readings(OutputFormat::Table, &sample()).unwrap();
        assert!(table.contains("01 Battery SOC"));
        assert!(table.contains("percent_batt"));
        assert!(table.contains("-2.0"));
        for metric in Metric::iter() {
            assert!(table.contains(metric.as_str()), "{metric} missing");
        }
    }

    #[test]
    fn json_uses_null_for_missing_readings() {
        let json = render_readings(OutputFormat::JsonCompact, &sample()).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["percent_batt"]["value"], Value::from(87));
        assert_eq!(parsed["percent_batt"]["unit"], Value::from("%"));
        assert_eq!(parsed["power_pv"]["value"], Value::Null);
        assert_eq!(parsed.as_object().unwrap().len(), 17);
    }

    #[test]
    fn json_keys_follow_catalog_order() {
        let json = render_readings(OutputFormat::JsonCompact, &sample()).unwrap();
        let positions: Vec<usize> = Metric::iter()
            .map(|metric| json.find(&format!("\"{}\":", metric.as_str())).unwrap())
            .collect();

        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        // Alphabetical order would put daily_* first.
        assert!(json.find("\"percent_batt\":") < json.find("\"daily_energy_house\":"));
    }
}
