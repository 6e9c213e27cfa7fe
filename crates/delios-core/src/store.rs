// ── Reading store ──
//
// Process-lifetime map of the latest value per metric. Both refresh
// cycles write here, possibly from different worker threads, so every
// merge happens under one write lock: a cycle's readings land together
// or not at all. Entries are only ever overwritten, never removed.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::reading::{Cycle, Metric, ReadingValue};

pub struct ReadingStore {
    readings: RwLock<HashMap<Metric, ReadingValue>>,
    last_daily: watch::Sender<Option<DateTime<Utc>>>,
    last_annual: watch::Sender<Option<DateTime<Utc>>>,
}

impl ReadingStore {
    pub fn new() -> Self {
        let (last_daily, _) = watch::channel(None);
        let (last_annual, _) = watch::channel(None);

        Self {
            readings: RwLock::new(HashMap::new()),
            last_daily,
            last_annual,
        }
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Merge one cycle's readings, overwriting any previous values.
    pub fn apply(&self, cycle: Cycle, readings: impl IntoIterator<Item = (Metric, ReadingValue)>) {
        let incoming: Vec<_> = readings.into_iter().collect();
        {
            let mut map = self.readings.write().unwrap_or_else(PoisonError::into_inner);
            map.extend(incoming);
        }
        self.sender(cycle).send_replace(Some(Utc::now()));
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn get(&self, metric: Metric) -> Option<ReadingValue> {
        self.readings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&metric)
            .copied()
    }

    /// Look up by reading key, e.g. `"power_pv"`. Unknown keys yield `None`.
    pub fn get_by_key(&self, key: &str) -> Option<ReadingValue> {
        Metric::from_str(key).ok().and_then(|m| self.get(m))
    }

    /// Copy of every reading held, in catalog order.
    pub fn snapshot(&self) -> BTreeMap<Metric, ReadingValue> {
        self.readings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(m, v)| (*m, *v))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.readings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Metadata ─────────────────────────────────────────────────────

    /// When `cycle` last merged successfully, or `None` if never.
    pub fn last_refresh(&self, cycle: Cycle) -> Option<DateTime<Utc>> {
        *self.sender(cycle).borrow()
    }

    /// Notified after every successful merge of `cycle`.
    pub fn subscribe(&self, cycle: Cycle) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.sender(cycle).subscribe()
    }

    fn sender(&self, cycle: Cycle) -> &watch::Sender<Option<DateTime<Utc>>> {
        match cycle {
            Cycle::Daily => &self.last_daily,
            Cycle::Annual => &self.last_annual,
        }
    }
}

impl Default for ReadingStore {
    fn default() -> Self {
        Self::new()
    }
}
