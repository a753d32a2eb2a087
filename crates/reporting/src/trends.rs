//! Daily portfolio trend with trailing 7-row rolling means.

use marketpulse_core::FinalRecord;
use serde::{Deserialize, Serialize};

use crate::engine::MarketingAnalytics;

/// Rolling window length, in rows of the `Total` series.
pub const ROLLING_WINDOW: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrend {
    #[serde(flatten)]
    pub record: FinalRecord,
    pub spend_7d_avg: f64,
    pub roas_7d_avg: f64,
    pub revenue_7d_avg: f64,
}

/// Trailing mean over at most `window` values ending at each position.
/// Early positions average whatever is available.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

impl MarketingAnalytics<'_> {
    /// `Total` rows sorted by date with rolling spend / ROAS / revenue means.
    pub fn daily_trends(&self) -> Vec<DailyTrend> {
        let mut rows: Vec<&FinalRecord> = self.total_rows().collect();
        rows.sort_by_key(|r| r.date);

        let spend: Vec<f64> = rows.iter().map(|r| r.spend).collect();
        let roas: Vec<f64> = rows.iter().map(|r| r.roas).collect();
        let revenue: Vec<f64> = rows.iter().map(|r| r.revenue).collect();
        let spend_avg = rolling_mean(&spend, ROLLING_WINDOW);
        let roas_avg = rolling_mean(&roas, ROLLING_WINDOW);
        let revenue_avg = rolling_mean(&revenue, ROLLING_WINDOW);

        rows.into_iter()
            .enumerate()
            .map(|(i, r)| DailyTrend {
                record: r.clone(),
                spend_7d_avg: spend_avg[i],
                roas_7d_avg: roas_avg[i],
                revenue_7d_avg: revenue_avg[i],
            })
            .collect()
    }
}
