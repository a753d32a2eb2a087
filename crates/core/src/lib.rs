pub mod config;
pub mod dataset;
pub mod error;
pub mod format;
pub mod metrics;
pub mod types;

pub use config::AppConfig;
pub use dataset::{Dataset, DatasetFilter};
pub use error::{PulseError, PulseResult};
pub use metrics::{safe_div, DerivedMetrics};
pub use types::{
    BusinessRecord, Channel, DailyAggregate, FinalRecord, MarketingRecord, RawTable, SourceKind,
};
