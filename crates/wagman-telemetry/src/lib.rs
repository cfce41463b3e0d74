//! wagman-telemetry: poll the wagman for a fixed telemetry record
//!
//! One poll issues `id`, `ver`, `up`, `date`, `cu`, `th`, `hb`, `fc`, `bs 0` and `bs 1` in
//! that order. If any of them fails the whole attempt is thrown away and retried, up to a
//! fixed budget. The first complete record is logged once and polling stops.

mod record;
pub use record::{fetch_record, TelemetryRecord, FIELD_ORDER};

mod poller;
pub use poller::{PollState, Poller, DEFAULT_MAX_ATTEMPTS};

mod sink;
pub use sink::{TelemetrySink, TracingSink};

mod config;
pub use config::{load_config, PollerConfig};

mod metrics;
pub use metrics::{MetricsHub, PollMetrics};

#[cfg(test)]
pub(crate) mod fixtures;
