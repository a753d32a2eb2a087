//! Daily aggregation by (date, channel) plus the per-date `Total` rollup.
//!
//! Channel rows keep the mean of the per-row ratios; `Total` rows recompute
//! ratios from the summed counts so portfolio ROAS always equals summed
//! revenue over summed spend. Both behaviours are relied on downstream.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use marketpulse_core::{Channel, DailyAggregate, MarketingRecord};

use crate::derive::apply_metrics;

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    impressions: f64,
    clicks: f64,
    spend: f64,
    revenue: f64,
    ctr: f64,
    cpc: f64,
    roas: f64,
    cpm: f64,
    rows: usize,
}

impl Accumulator {
    fn add(&mut self, r: &MarketingRecord) {
        self.impressions += r.impressions;
        self.clicks += r.clicks;
        self.spend += r.spend;
        self.revenue += r.revenue;
        self.ctr += r.ctr;
        self.cpc += r.cpc;
        self.roas += r.roas;
        self.cpm += r.cpm;
        self.rows += 1;
    }

    fn mean_of_ratios(&self, date: NaiveDate, channel: Channel) -> DailyAggregate {
        let n = self.rows as f64;
        let mut out = MarketingRecord::new(
            date,
            channel,
            self.impressions,
            self.clicks,
            self.spend,
            self.revenue,
        );
        out.ctr = self.ctr / n;
        out.cpc = self.cpc / n;
        out.roas = self.roas / n;
        out.cpm = self.cpm / n;
        out
    }

    fn ratio_of_sums(&self, date: NaiveDate) -> DailyAggregate {
        let mut out = MarketingRecord::new(
            date,
            Channel::Total,
            self.impressions,
            self.clicks,
            self.spend,
            self.revenue,
        );
        apply_metrics(&mut out);
        out
    }
}

/// Aggregate metric-enriched rows into per-channel daily rows followed by the
/// per-date `Total` rows.
pub fn aggregate_daily_marketing(records: &[MarketingRecord]) -> Vec<DailyAggregate> {
    let mut by_channel: BTreeMap<(NaiveDate, Channel), Accumulator> = BTreeMap::new();
    let mut by_date: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();

    for r in records {
        by_channel.entry((r.date, r.channel)).or_default().add(r);
        by_date.entry(r.date).or_default().add(r);
    }

    let mut daily: Vec<DailyAggregate> = by_channel
        .iter()
        .map(|((date, channel), acc)| acc.mean_of_ratios(*date, *channel))
        .collect();
    daily.extend(by_date.iter().map(|(date, acc)| acc.ratio_of_sums(*date)));
    daily
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::create_derived_metrics;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn rec(d: u32, channel: Channel, spend: f64, revenue: f64) -> MarketingRecord {
        MarketingRecord::new(day(d), channel, 1_000.0, 10.0, spend, revenue)
    }

    fn find(rows: &[DailyAggregate], d: u32, channel: Channel) -> &DailyAggregate {
        rows.iter()
            .find(|r| r.date == day(d) && r.channel == channel)
            .unwrap()
    }

    // 1. Per-channel rows -----------------------------------------------------

    #[test]
    fn test_channel_rows_sum_counts_and_average_ratios() {
        let input = create_derived_metrics(&[
            rec(1, Channel::Facebook, 100.0, 100.0), // roas 1.0
            rec(1, Channel::Facebook, 300.0, 1_500.0), // roas 5.0
        ]);
        let out = aggregate_daily_marketing(&input);
        let fb = find(&out, 1, Channel::Facebook);

        assert_eq!(fb.spend, 400.0);
        assert_eq!(fb.revenue, 1_600.0);
        assert_eq!(fb.impressions, 2_000.0);
        // mean of 1.0 and 5.0, not 1600 / 400
        assert!((fb.roas - 3.0).abs() < f64::EPSILON);
    }

    // 2. Total rows -----------------------------------------------------------

    #[test]
    fn test_total_row_uses_ratio_of_sums() {
        let input = create_derived_metrics(&[
            rec(1, Channel::Facebook, 100.0, 100.0),
            rec(1, Channel::Facebook, 300.0, 1_500.0),
            rec(1, Channel::Google, 100.0, 400.0),
        ]);
        let out = aggregate_daily_marketing(&input);
        let total = find(&out, 1, Channel::Total);

        assert_eq!(total.spend, 500.0);
        assert_eq!(total.revenue, 2_000.0);
        assert!((total.roas - 4.0).abs() < f64::EPSILON);
        assert!((total.ctr - 30.0 / 3_000.0).abs() < f64::EPSILON);
        assert!((total.cpm - 500.0 / 3_000.0 * 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_output_layout_channels_then_totals() {
        let input = create_derived_metrics(&[
            rec(2, Channel::TikTok, 10.0, 20.0),
            rec(1, Channel::Google, 10.0, 20.0),
            rec(1, Channel::Facebook, 10.0, 20.0),
        ]);
        let out = aggregate_daily_marketing(&input);
        let keys: Vec<(NaiveDate, Channel)> = out.iter().map(|r| (r.date, r.channel)).collect();
        assert_eq!(
            keys,
            vec![
                (day(1), Channel::Facebook),
                (day(1), Channel::Google),
                (day(2), Channel::TikTok),
                (day(1), Channel::Total),
                (day(2), Channel::Total),
            ]
        );
    }

    #[test]
    fn test_zero_spend_day_has_zero_total_roas() {
        let input = create_derived_metrics(&[rec(3, Channel::Google, 0.0, 50.0)]);
        let out = aggregate_daily_marketing(&input);
        assert_eq!(find(&out, 3, Channel::Total).roas, 0.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_daily_marketing(&[]).is_empty());
    }
}
