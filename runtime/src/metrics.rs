//! Store metrics.
//!
//! Recorded through the `metrics` facade. Nothing is exported unless the
//! application installs a recorder; [`register_metrics`] attaches
//! descriptions for recorders that support them.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        "store_dispatch_total",
        "Total number of actions dispatched to the store"
    );
    describe_counter!(
        "store_dispatch_failed_total",
        "Total number of dispatches that returned an error"
    );
    describe_counter!(
        "store_dispatch_skipped_total",
        "Total number of actions skipped by middleware"
    );
    describe_histogram!(
        "store_reducer_duration_seconds",
        "Time taken to run a slice reducer"
    );
    describe_counter!(
        "store_subscriber_notifications_total",
        "Total number of subscriber callbacks invoked"
    );
}

/// Dispatch metrics recorder.
pub struct StoreMetrics;

impl StoreMetrics {
    /// Record an action entering the store.
    pub fn record_dispatch() {
        counter!("store_dispatch_total").increment(1);
    }

    /// Record a reducer run.
    pub fn record_reducer(duration: Duration) {
        histogram!("store_reducer_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a failed dispatch.
    pub fn record_failure() {
        counter!("store_dispatch_failed_total").increment(1);
    }

    /// Record an action skipped by middleware.
    pub fn record_skip() {
        counter!("store_dispatch_skipped_total").increment(1);
    }

    /// Record subscriber callbacks run after a dispatch.
    pub fn record_notifications(count: usize) {
        counter!("store_subscriber_notifications_total").increment(u64::try_from(count).unwrap_or(u64::MAX));
    }
}
