use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

#[derive(Clone)]
pub struct PollMetrics {
    pub attempts: IntCounter,
    pub failures: IntCounter,
    pub records: IntCounter,
}

#[derive(Clone)]
pub struct MetricsHub {
    pub registry: Registry,
    pub poll: PollMetrics,
}

impl MetricsHub {
    pub fn new() -> Result<Self, String> {
        let registry = Registry::new();
        let attempts = IntCounter::new("wagman_poll_attempts", "Telemetry poll attempts started")
            .map_err(|e| format!("metrics init error: {e}"))?;
        let failures = IntCounter::new("wagman_poll_failures", "Telemetry poll attempts failed")
            .map_err(|e| format!("metrics init error: {e}"))?;
        let records = IntCounter::new("wagman_records_emitted", "Telemetry records emitted")
            .map_err(|e| format!("metrics init error: {e}"))?;
        let poll = PollMetrics {
            attempts,
            failures,
            records,
        };
        let _ = registry.register(Box::new(poll.attempts.clone()));
        let _ = registry.register(Box::new(poll.failures.clone()));
        let _ = registry.register(Box::new(poll.records.clone()));
        Ok(Self { registry, poll })
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}
