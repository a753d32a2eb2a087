//! Metric derivation: fills CTR / CPC / ROAS / CPM on every row.

use marketpulse_core::{DerivedMetrics, MarketingRecord};

/// Set the ratio fields of one record from its own counts.
pub fn apply_metrics(record: &mut MarketingRecord) {
    let m = DerivedMetrics::from_counts(
        record.impressions,
        record.clicks,
        record.spend,
        record.revenue,
    );
    record.ctr = m.ctr;
    record.cpc = m.cpc;
    record.roas = m.roas;
    record.cpm = m.cpm;
}

/// Order-preserving copy of `records` with derived metrics filled in.
pub fn create_derived_metrics(records: &[MarketingRecord]) -> Vec<MarketingRecord> {
    records
        .iter()
        .cloned()
        .map(|mut r| {
            apply_metrics(&mut r);
            r
        })
        .collect()
}
