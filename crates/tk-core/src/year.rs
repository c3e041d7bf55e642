//! Year-level aggregation over month records.

use std::collections::BTreeMap;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::month::MonthRecord;

/// One calendar year. Like [`MonthRecord`], only the identifier and cached
/// aggregates are serialized; month records live in their own files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearRecord {
    #[serde(default)]
    pub id: i32,
    #[serde(skip)]
    months: BTreeMap<u32, MonthRecord>,
    #[serde(with = "crate::duration_serde", default = "TimeDelta::zero")]
    pub deficit: TimeDelta,
    #[serde(with = "crate::duration_serde", default = "TimeDelta::zero")]
    pub worked: TimeDelta,
}

impl YearRecord {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self {
            id,
            months: BTreeMap::new(),
            deficit: TimeDelta::zero(),
            worked: TimeDelta::zero(),
        }
    }

    #[must_use]
    pub fn contains_month(&self, id: u32) -> bool {
        self.months.contains_key(&id)
    }

    #[must_use]
    pub fn month(&self, id: u32) -> Option<&MonthRecord> {
        self.months.get(&id)
    }

    pub fn month_mut(&mut self, id: u32) -> Option<&mut MonthRecord> {
        self.months.get_mut(&id)
    }

    /// Loaded months in calendar order.
    pub fn months(&self) -> impl Iterator<Item = &MonthRecord> {
        self.months.values()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Upserts a month by id and refreshes the cached aggregates.
    pub fn add_month(&mut self, month: MonthRecord) {
        self.months.insert(month.id, month);
        self.update_status();
    }

    /// Evicts all loaded months from memory; storage is untouched.
    pub fn clear_months(&mut self) {
        self.months.clear();
    }

    /// Recomputes each month bottom-up, then sums their deficit and worked
    /// time unconditionally; the completeness filter already happened at
    /// the month level. With no months loaded the cached values stand, as
    /// at the month level.
    pub fn update_status(&mut self) {
        if self.months.is_empty() {
            return;
        }
        let mut deficit = TimeDelta::zero();
        let mut worked = TimeDelta::zero();
        for month in self.months.values_mut() {
            month.update_status();
            deficit = deficit + month.deficit;
            worked = worked + month.worked;
        }
        self.deficit = deficit;
        self.worked = worked;
    }
}
