//! Outer join of the daily marketing series with business results on date.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use marketpulse_core::{BusinessRecord, DailyAggregate, FinalRecord};

/// Join on `date` only. Business values are repeated on every channel row of
/// their date; unmatched sides are zero-filled. Output is ordered by date and
/// then channel name, with business-only rows (no channel) first in a date.
pub fn merge_marketing_business(
    daily: &[DailyAggregate],
    business: &[BusinessRecord],
) -> Vec<FinalRecord> {
    let mut business_by_date: BTreeMap<NaiveDate, Vec<&BusinessRecord>> = BTreeMap::new();
    for b in business {
        business_by_date.entry(b.date).or_default().push(b);
    }
    let marketing_dates: BTreeSet<NaiveDate> = daily.iter().map(|m| m.date).collect();

    let mut merged = Vec::with_capacity(daily.len() + business.len());
    for m in daily {
        match business_by_date.get(&m.date) {
            Some(matches) => {
                merged.extend(matches.iter().filter_map(|b| FinalRecord::join(Some(m), Some(*b))));
            }
            None => merged.extend(FinalRecord::join(Some(m), None)),
        }
    }
    for (date, rows) in &business_by_date {
        if !marketing_dates.contains(date) {
            merged.extend(rows.iter().filter_map(|b| FinalRecord::join(None, Some(*b))));
        }
    }

    merged.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.channel.map(|c| c.as_str()).cmp(&b.channel.map(|c| c.as_str())))
    });
    merged
}
