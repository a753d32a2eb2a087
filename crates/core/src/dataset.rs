//! The canonical joined dataset and the caller-side filters applied to it
//! before analysis.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PulseError, PulseResult};
use crate::types::{Channel, FinalRecord};

/// Immutable snapshot of one pipeline run, sorted by (date, channel).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    records: Vec<FinalRecord>,
}

/// Inclusive date range plus an optional channel subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub channels: Vec<Channel>,
}

impl DatasetFilter {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.channels.is_empty()
    }

    /// Reject a range whose start falls after its end. Equal dates select a
    /// single day.
    pub fn validate(&self) -> PulseResult<()> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Err(PulseError::InvalidFilter(format!(
                "Start date must be before end date ({start} > {end})"
            ))),
            _ => Ok(()),
        }
    }

    fn matches(&self, record: &FinalRecord) -> bool {
        if self.start.is_some_and(|start| record.date < start) {
            return false;
        }
        if self.end.is_some_and(|end| record.date > end) {
            return false;
        }
        if self.channels.is_empty() {
            return true;
        }
        // Total rows stay so portfolio-level analyses keep working.
        match record.channel {
            Some(Channel::Total) => true,
            Some(channel) => self.channels.contains(&channel),
            None => false,
        }
    }
}

impl Dataset {
    pub fn new(records: Vec<FinalRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[FinalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest date present.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    /// Number of distinct dates.
    pub fn distinct_days(&self) -> usize {
        let mut dates: Vec<NaiveDate> = self.records.iter().map(|r| r.date).collect();
        dates.sort_unstable();
        dates.dedup();
        dates.len()
    }

    /// A new dataset holding only the rows the filter accepts.
    pub fn filter(&self, filter: &DatasetFilter) -> Dataset {
        if filter.is_empty() {
            return self.clone();
        }
        Dataset::new(
            self.records
                .iter()
                .filter(|r| filter.matches(r))
                .cloned()
                .collect(),
        )
    }
}
