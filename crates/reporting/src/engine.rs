use marketpulse_core::{Dataset, FinalRecord};

/// Stateless analytics over a borrowed slice of the final dataset. Each
/// analysis lives in its own module as an `impl` block on this type.
#[derive(Debug, Clone, Copy)]
pub struct MarketingAnalytics<'a> {
    data: &'a [FinalRecord],
}

impl<'a> MarketingAnalytics<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self::from_records(dataset.records())
    }

    pub fn from_records(data: &'a [FinalRecord]) -> Self {
        Self { data }
    }

    pub fn records(&self) -> &'a [FinalRecord] {
        self.data
    }

    /// Rows of the synthetic `Total` channel, in input order.
    pub(crate) fn total_rows(&self) -> impl Iterator<Item = &'a FinalRecord> {
        self.data.iter().filter(|r| r.is_total())
    }
}
