//! Row builders shared by the unit tests.

use chrono::NaiveDate;
use marketpulse_core::{BusinessRecord, Channel, DerivedMetrics, FinalRecord, MarketingRecord};

pub fn day(offset: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset as i64)
}

/// A channel row with ratios derived from its own counts.
pub fn channel_row(
    offset: u32,
    channel: Channel,
    impressions: f64,
    clicks: f64,
    spend: f64,
    revenue: f64,
) -> FinalRecord {
    let mut m = MarketingRecord::new(day(offset), channel, impressions, clicks, spend, revenue);
    let d = DerivedMetrics::from_counts(impressions, clicks, spend, revenue);
    m.ctr = d.ctr;
    m.cpc = d.cpc;
    m.roas = d.roas;
    m.cpm = d.cpm;
    FinalRecord::join(Some(&m), None).unwrap()
}

/// A `Total` row carrying the day's business revenue.
pub fn total_row(offset: u32, spend: f64, revenue: f64, business_revenue: f64) -> FinalRecord {
    let mut row = channel_row(offset, Channel::Total, 10_000.0, 200.0, spend, revenue);
    row.total_revenue = business_revenue;
    row
}

pub fn business_only_row(offset: u32, business_revenue: f64) -> FinalRecord {
    let b = BusinessRecord {
        date: day(offset),
        total_revenue: business_revenue,
        ..Default::default()
    };
    FinalRecord::join(None, Some(&b)).unwrap()
}
