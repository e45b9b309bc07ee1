// Metrics hooks for the `matcher` crate.
//
// A `MatchMetrics` observer is handed to a `Matcher` explicitly via
// [`Matcher::with_metrics`](crate::Matcher::with_metrics); the matcher then
// reports latency, raw comparison counts and hit counts for every pool or
// all-pairs run. This keeps instrumentation decoupled from any specific
// metrics backend.
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Which matcher entry point produced a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOperation {
    /// One subject against a candidate pool.
    Pool,
    /// Full lost × found cross product.
    AllPairs,
}

impl MatchOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOperation::Pool => "pool",
            MatchOperation::AllPairs => "all_pairs",
        }
    }
}

/// Metrics observer for match operations.
pub trait MatchMetrics: Send + Sync {
    /// Record the outcome of one matcher run.
    ///
    /// `comparisons` is the number of pairs scored before filtering and `hits`
    /// the number of results returned after the threshold was applied.
    fn record_match(
        &self,
        operation: MatchOperation,
        latency: Duration,
        comparisons: usize,
        hits: usize,
    );
}

pub(crate) struct MetricsSpan {
    recorder: Arc<dyn MatchMetrics>,
    operation: MatchOperation,
    start: Instant,
}

impl MetricsSpan {
    pub(crate) fn start(
        recorder: Option<&Arc<dyn MatchMetrics>>,
        operation: MatchOperation,
    ) -> Option<Self> {
        recorder.map(|recorder| Self {
            recorder: Arc::clone(recorder),
            operation,
            start: Instant::now(),
        })
    }

    pub(crate) fn finish(self, comparisons: usize, hits: usize) {
        self.recorder
            .record_match(self.operation, self.start.elapsed(), comparisons, hits);
    }
}
