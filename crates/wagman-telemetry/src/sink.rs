use crate::TelemetryRecord;

/// Where a completed record goes. Called at most once per poll.
pub trait TelemetrySink {
    fn emit(&mut self, record: &TelemetryRecord);
}

/// Logs the rendered record as one multi-line info event on the `wagman` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn emit(&mut self, record: &TelemetryRecord) {
        tracing::info!(target: "wagman", "{}", record.render());
    }
}

/// Collects rendered records in memory.
impl TelemetrySink for Vec<String> {
    fn emit(&mut self, record: &TelemetryRecord) {
        self.push(record.render());
    }
}

impl<S: TelemetrySink + ?Sized> TelemetrySink for &mut S {
    fn emit(&mut self, record: &TelemetryRecord) {
        (**self).emit(record);
    }
}
