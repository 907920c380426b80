//! Core types: records, metrics, CSV tables, timestamps, errors

pub mod error;
pub mod metrics;
pub mod record;
pub mod table;
pub mod time;
pub mod tracing;

pub use error::{ErrorCode, EtlError, EtlResult};
pub use metrics::aggregate;
pub use record::{EventRecord, MetricRecord};
pub use table::encode_csv;
pub use time::{OutputLayout, RunTimestamp, parse_timestamp};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
