//! Pipeline orchestration: load → validate → clean → derive → aggregate →
//! merge, each stage fully materialized before the next.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use marketpulse_core::{
    AppConfig, DailyAggregate, Dataset, MarketingRecord, PulseError, PulseResult,
    SourceKind,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregator::aggregate_daily_marketing;
use crate::cache::PipelineCache;
use crate::derive::create_derived_metrics;
use crate::loader::{DataLoader, LoadedSources};
use crate::merger::merge_marketing_business;
use crate::normalizer::{clean_business_data, clean_marketing_data};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Everything one pipeline run produces. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    /// Cleaned ad-platform rows of all three sources, before derivation.
    pub marketing_raw: Vec<MarketingRecord>,
    pub marketing_daily: Vec<DailyAggregate>,
    pub final_dataset: Dataset,
    pub date_range: DateRange,
    pub total_days: usize,
    /// Rows discarded per source because their date was missing or invalid.
    pub dropped_rows: BTreeMap<SourceKind, usize>,
}

/// Runs the pipeline against one data directory, optionally memoized.
pub struct Pipeline {
    loader: DataLoader,
    cache: Option<PipelineCache>,
}

impl Pipeline {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            loader: DataLoader::new(data_dir),
            cache: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let pipeline = Self::new(config.data_dir.clone());
        if config.cache.enabled {
            pipeline.with_cache(PipelineCache::new(config.cache.max_entries))
        } else {
            pipeline
        }
    }

    pub fn with_cache(mut self, cache: PipelineCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn loader(&self) -> &DataLoader {
        &self.loader
    }

    pub fn cache(&self) -> Option<&PipelineCache> {
        self.cache.as_ref()
    }

    /// Load and validate the sources, then process them (or reuse a cached
    /// run for identical input).
    pub fn run(&self) -> PulseResult<Arc<PipelineRun>> {
        let sources = self.loader.load_csv_files()?;
        DataLoader::validate_data_files(&sources)?;

        let Some(cache) = &self.cache else {
            return process_all_data(&sources).map(Arc::new);
        };

        let key = PipelineCache::fingerprint(&sources);
        if let Some(run) = cache.get(&key) {
            debug!(fingerprint = %key, "Reusing cached pipeline run");
            return Ok(run);
        }

        let run = Arc::new(process_all_data(&sources)?);
        cache.put(key, run.clone());
        Ok(run)
    }
}

/// Turn validated source tables into the canonical dataset.
pub fn process_all_data(sources: &LoadedSources) -> PulseResult<PipelineRun> {
    let mut dropped_rows = BTreeMap::new();

    let mut marketing_raw = Vec::new();
    for source in SourceKind::ALL.into_iter().filter(|s| s.channel().is_some()) {
        let cleaned = clean_marketing_data(sources.require(source)?, source)?;
        dropped_rows.insert(source, cleaned.dropped_rows);
        marketing_raw.extend(cleaned.records);
    }

    let business = clean_business_data(sources.require(SourceKind::Business)?)?;
    dropped_rows.insert(SourceKind::Business, business.dropped_rows);

    let with_metrics = create_derived_metrics(&marketing_raw);
    let marketing_daily = aggregate_daily_marketing(&with_metrics);
    let final_dataset = Dataset::new(merge_marketing_business(
        &marketing_daily,
        &business.records,
    ));

    let (start, end) = final_dataset.date_bounds().ok_or_else(|| {
        PulseError::Processing("no rows with a valid date in any source".to_string())
    })?;
    let total_days = final_dataset.distinct_days();

    info!(
        marketing_rows = marketing_raw.len(),
        business_rows = business.records.len(),
        daily_rows = marketing_daily.len(),
        final_rows = final_dataset.len(),
        start = %start,
        end = %end,
        total_days,
        "Pipeline run complete"
    );

    Ok(PipelineRun {
        marketing_raw,
        marketing_daily,
        final_dataset,
        date_range: DateRange { start, end },
        total_days,
        dropped_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketpulse_core::RawTable;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    fn sources() -> LoadedSources {
        let mut s = LoadedSources::new();
        s.insert(
            SourceKind::Facebook,
            table(
                &["date", "impressions", "clicks", "spend", "attributed_revenue"],
                &[&["2024-01-01", "1000", "10", "100", "300"], &["bad", "1", "1", "1", "1"]],
            ),
        );
        s.insert(
            SourceKind::Google,
            table(
                &["Date", "Impression", "Clicks", "Spend", "Attributed Revenue"],
                &[&["2024-01-01", "2000", "40", "100", "500"]],
            ),
        );
        s.insert(
            SourceKind::TikTok,
            table(
                &["date", "impressions", "clicks", "spend", "attributed_revenue"],
                &[&["2024-01-02", "500", "5", "50", "50"]],
            ),
        );
        s.insert(
            SourceKind::Business,
            table(
                &["date", "orders", "total_revenue"],
                &[&["2024-01-01", "20", "4000"], &["2024-01-03", "7", "900"]],
            ),
        );
        s
    }

    #[test]
    fn test_process_all_data_shapes_output() {
        let run = process_all_data(&sources()).unwrap();

        assert_eq!(run.marketing_raw.len(), 3);
        assert_eq!(run.dropped_rows[&SourceKind::Facebook], 1);
        assert_eq!(run.dropped_rows[&SourceKind::Business], 0);
        // 3 channel rows + 2 totals
        assert_eq!(run.marketing_daily.len(), 5);
        // 5 marketing rows + business-only 2024-01-03
        assert_eq!(run.final_dataset.len(), 6);
        assert_eq!(run.total_days, 3);
        assert_eq!(run.date_range.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(run.date_range.end, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());

        let total_day1 = run
            .final_dataset
            .records()
            .iter()
            .find(|r| r.is_total() && r.date == run.date_range.start)
            .unwrap();
        assert_eq!(total_day1.spend, 200.0);
        assert!((total_day1.roas - 4.0).abs() < f64::EPSILON);
        assert_eq!(total_day1.total_revenue, 4000.0);
    }

    #[test]
    fn test_missing_source_is_rejected() {
        let mut partial = LoadedSources::new();
        partial.insert(SourceKind::Facebook, table(&["date"], &[&["2024-01-01"]]));
        let err = process_all_data(&partial).unwrap_err();
        assert!(matches!(err, PulseError::MissingSource { .. }));
    }

    #[test]
    fn test_no_dated_rows_is_a_processing_error() {
        let mut s = LoadedSources::new();
        for source in SourceKind::ALL {
            s.insert(source, table(&["date", "spend"], &[&["never", "1"]]));
        }
        let err = process_all_data(&s).unwrap_err();
        assert!(matches!(err, PulseError::Processing(_)));
    }
}
