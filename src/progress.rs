//! Progress-callback trait for per-record conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the driver finishes each record.
//!
//! Events are fired from the single task that drives the worker pool, never
//! from the workers themselves, so implementations can print directly without
//! their lines interleaving.
//!
//! # Example
//!
//! ```rust
//! use csv2img::{ConversionProgressCallback, ConversionConfig, RecordResult};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_record_complete(&self, result: &RecordResult, total: usize) {
//!         let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("{done}/{total}: {}", result.id);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { completed: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::RecordResult;
use std::path::Path;
use std::sync::Arc;

/// Called by the driver as a run progresses.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, after the input was fully read and before any record is
    /// dispatched.
    fn on_conversion_start(&self, input: &Path, total_records: usize) {
        let _ = (input, total_records);
    }

    /// Called as each record reaches its terminal state, in completion order.
    fn on_record_complete(&self, result: &RecordResult, total_records: usize) {
        let _ = (result, total_records);
    }

    /// Called once after every record has finished.
    fn on_conversion_complete(&self, total_records: usize, converted: usize) {
        let _ = (total_records, converted);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::RecordOutcome;
    use crate::pipeline::encode::OutputFormat;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        started_total: AtomicUsize,
        completes: AtomicUsize,
        converted: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_conversion_start(&self, _input: &Path, total_records: usize) {
            self.started_total.store(total_records, Ordering::SeqCst);
        }

        fn on_record_complete(&self, _result: &RecordResult, _total: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, _total: usize, converted: usize) {
            self.converted.store(converted, Ordering::SeqCst);
        }
    }

    fn sample() -> RecordResult {
        RecordResult {
            index: 0,
            line: 1,
            id: "img1".into(),
            detected_format: Some("png".into()),
            outcome: RecordOutcome::Converted {
                format: OutputFormat::Png,
                path: "output/img1.png".into(),
            },
            duration_ms: 3,
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(Path::new("test.csv"), 2);
        cb.on_record_complete(&sample(), 2);
        cb.on_conversion_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_conversion_start(Path::new("test.csv"), 3);
        for _ in 0..3 {
            tracker.on_record_complete(&sample(), 3);
        }
        tracker.on_conversion_complete(3, 2);

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.converted.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn ConversionProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_record_complete(&sample(), 1);
    }
}
