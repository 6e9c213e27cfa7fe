// ── Reading catalog ──
//
// The closed set of metrics exposed to the host, with display metadata.
// Declaration order is display order; `Ord` follows it so snapshots
// come out sorted the way an operator expects to read them.

use std::fmt;

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Which refresh cycle produces a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Cycle {
    /// Minute cadence: instantaneous power and day-to-date energy.
    Daily,
    /// Day cadence: year-to-date aggregates.
    Annual,
}

/// Display unit of a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum Unit {
    #[strum(serialize = "%")]
    #[serde(rename = "%")]
    Percent,
    #[strum(serialize = "kW")]
    #[serde(rename = "kW")]
    Kilowatt,
    #[strum(serialize = "kWh")]
    #[serde(rename = "kWh")]
    KilowattHour,
}

/// Semantic category the host uses for statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Plain point-in-time measurement.
    Measurement,
    /// Monotonically accumulating energy total.
    TotalIncreasing,
}

/// Every reading key the poller can produce.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    PercentBatt,
    PowerHouse,
    PowerPv,
    PowerGrid,
    PowerBatt,
    DailyEnergyHouse,
    DailyEnergyGridTaken,
    DailyEnergyGridGiven,
    DailyEnergyPv,
    DailyEnergyBattDischar,
    DailyEnergyBattChar,
    DailySelfSufficiency,
    AnnualEnergyHouse,
    AnnualEnergyGridTaken,
    AnnualEnergyGridGiven,
    AnnualEnergyPv,
    AnnualSelfSufficiency,
}

impl Metric {
    /// The reading key, e.g. `daily_energy_batt_char`.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Operator-facing name. The numeric prefix keeps host UIs sorted.
    pub fn label(self) -> &'static str {
        match self {
            Self::PercentBatt => "01 Battery SOC",
            Self::PowerHouse => "02 Power House",
            Self::PowerPv => "03 Power PV",
            Self::PowerGrid => "04 Power Grid",
            Self::PowerBatt => "05 Power Battery",
            Self::DailyEnergyHouse => "06 Daily energy house",
            Self::DailyEnergyGridTaken => "07 Daily energy taken",
            Self::DailyEnergyGridGiven => "08 Daily energy given",
            Self::DailyEnergyPv => "09 Daily energy PV",
            Self::DailyEnergyBattDischar => "10 Daily energy battery discharge",
            Self::DailyEnergyBattChar => "11 Daily energy battery charge",
            Self::DailySelfSufficiency => "12 Self Sufficiency",
            Self::AnnualEnergyHouse => "13 Annual energy house",
            Self::AnnualEnergyGridTaken => "14 Annual energy taken",
            Self::AnnualEnergyGridGiven => "15 Annual energy given",
            Self::AnnualEnergyPv => "16 Annual energy PV",
            Self::AnnualSelfSufficiency => "17 Annual self sufficiency",
        }
    }

    pub fn unit(self) -> Unit {
        match self {
            Self::PercentBatt | Self::DailySelfSufficiency | Self::AnnualSelfSufficiency => {
                Unit::Percent
            }
            Self::PowerHouse | Self::PowerPv | Self::PowerGrid | Self::PowerBatt => Unit::Kilowatt,
            _ => Unit::KilowattHour,
        }
    }

    /// Every kWh reading accumulates; everything else is a measurement.
    pub fn category(self) -> Category {
        match self.unit() {
            Unit::KilowattHour => Category::TotalIncreasing,
            Unit::Percent | Unit::Kilowatt => Category::Measurement,
        }
    }

    pub fn cycle(self) -> Cycle {
        match self {
            Self::AnnualEnergyHouse
            | Self::AnnualEnergyGridTaken
            | Self::AnnualEnergyGridGiven
            | Self::AnnualEnergyPv
            | Self::AnnualSelfSufficiency => Cycle::Annual,
            _ => Cycle::Daily,
        }
    }
}

/// A single numeric reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReadingValue {
    /// Rounded to one decimal place.
    Float(f64),
    /// Truncated toward zero.
    Integer(i64),
}

impl fmt::Display for ReadingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v:.1}"),
            Self::Integer(v) => write!(f, "{v}"),
        }
    }
}
