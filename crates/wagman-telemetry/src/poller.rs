use crate::{fetch_record, MetricsHub, TelemetryRecord, TelemetrySink};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};
use wagman_client::transport::Connector;
use wagman_client::CommandClient;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Where a poll stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// Next attempt to run, counted from zero.
    Attempting(u32),
    /// A complete record was emitted. Terminal.
    Done(TelemetryRecord),
    /// Every attempt failed. Terminal; nothing was emitted.
    GaveUp,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollState::Attempting(_))
    }

    pub fn record(&self) -> Option<&TelemetryRecord> {
        match self {
            PollState::Done(r) => Some(r),
            _ => None,
        }
    }
}

/// Bounded retry loop around [`fetch_record`].
///
/// Every error is treated as transient: the attempt's partial data is dropped, the error is
/// reported on the log (and kept in [`Poller::errors`]), and the next attempt starts from
/// scratch. The sink sees the first complete record and nothing else.
pub struct Poller<C: Connector, S: TelemetrySink> {
    client: CommandClient<C>,
    sink: S,
    max_attempts: u32,
    retry_delay: Duration,
    metrics: Option<MetricsHub>,
    state: PollState,
    errors: Vec<String>,
}

impl<C: Connector, S: TelemetrySink> Poller<C, S> {
    pub fn new(client: CommandClient<C>, sink: S) -> Self {
        Self {
            client,
            sink,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::ZERO,
            metrics: None,
            state: PollState::Attempting(0),
            errors: Vec::new(),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsHub) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Error reports of the failed attempts, oldest first.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run one attempt. A terminal state is returned unchanged.
    pub fn step(&mut self) -> &PollState {
        let attempt = match self.state {
            PollState::Attempting(n) if n < self.max_attempts => n,
            PollState::Attempting(_) => {
                self.state = PollState::GaveUp;
                return &self.state;
            }
            _ => return &self.state,
        };
        if attempt > 0 && !self.retry_delay.is_zero() {
            thread::sleep(self.retry_delay);
        }
        if let Some(m) = &self.metrics {
            m.poll.attempts.inc();
        }
        debug!(attempt = attempt + 1, max = self.max_attempts, "polling wagman");

        match fetch_record(&self.client) {
            Ok(record) => {
                self.sink.emit(&record);
                if let Some(m) = &self.metrics {
                    m.poll.records.inc();
                }
                self.state = PollState::Done(record);
            }
            Err(e) => {
                warn!(attempt = attempt + 1, error = %e, "telemetry attempt failed");
                self.errors.push(e.to_string());
                if let Some(m) = &self.metrics {
                    m.poll.failures.inc();
                }
                let next = attempt + 1;
                self.state = if next < self.max_attempts {
                    PollState::Attempting(next)
                } else {
                    info!(attempts = next, "giving up on wagman telemetry");
                    PollState::GaveUp
                };
            }
        }
        &self.state
    }

    /// Step until `Done` or `GaveUp`.
    pub fn run(&mut self) -> &PollState {
        while !self.state.is_terminal() {
            self.step();
        }
        &self.state
    }
}
