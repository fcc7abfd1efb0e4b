// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Traits the populator depends on but does not implement itself.
//!
//! Kept deliberately synchronous and framework-agnostic: registering this
//! crate's handlers against an informer/watch framework, and deciding how
//! objects actually reach them, is the caller's job. This crate only ever
//! gets invoked with an already-deserialized view of the object.

use std::time::Duration;

/// Something the populator can ask "has your initial sync completed yet?".
///
/// Modeled after the typical informer `HasSynced` contract: callers
/// typically wait on this before trusting that the graph reflects a
/// complete cluster snapshot rather than a partial one still catching up.
pub trait ObjectSource<T> {
    /// Whether this source has delivered its full initial listing.
    fn has_synced(&self) -> bool;
}

/// Blocks (by polling, with a caller-chosen sleep) until every given source
/// reports `has_synced`, or `timeout` elapses.
///
/// Kept synchronous and dependency-free rather than `async`, matching this
/// crate's decision not to pull in an async runtime for graph-population
/// logic that is itself entirely CPU-bound.
pub struct WaitForCacheSync {
    poll_interval: Duration,
}

impl WaitForCacheSync {
    /// Creates a waiter that polls sources at `poll_interval`.
    #[must_use]
    pub const fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Polls `sources` until they all report synced or `timeout` elapses.
    /// Returns `true` if every source synced in time.
    pub fn wait<T>(&self, sources: &[&dyn ObjectSource<T>], timeout: Duration, sleep: impl Fn(Duration)) -> bool {
        let deadline = StepClock::new(timeout, self.poll_interval);
        for _ in deadline {
            if sources.iter().all(|s| s.has_synced()) {
                return true;
            }
            sleep(self.poll_interval);
        }
        sources.iter().all(|s| s.has_synced())
    }
}

/// Counts down `total / step` iterations without touching the wall clock —
/// callers who want real pacing drive their own `sleep` through
/// [`WaitForCacheSync::wait`]'s `sleep` parameter.
struct StepClock {
    remaining: u32,
}

impl StepClock {
    fn new(total: Duration, step: Duration) -> Self {
        let steps = if step.is_zero() {
            1
        } else {
            u32::try_from(total.as_nanos() / step.as_nanos().max(1)).unwrap_or(u32::MAX).max(1)
        };
        Self { remaining: steps }
    }
}

impl Iterator for StepClock {
    type Item = ();

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(())
    }
}

/// Resolves the pod-spec references that aren't already plain names in the
/// object payload: ephemeral-volume-generated PVC names and
/// `PodResourceClaim` → `ResourceClaim` name mappings.
///
/// Both of these require consulting state outside the pod object itself
/// (the pod's owner references, or its `status.resourceClaimStatuses`), so
/// they're pushed to the caller rather than assumed resolvable from the pod
/// view alone.
pub trait PodNameResolver {
    /// Resolves the generated PVC name for an ephemeral volume on `pod`.
    ///
    /// # Errors
    /// Returns an error if `volume_name` isn't a known ephemeral volume on
    /// `pod`, or the generated name can't be determined.
    fn ephemeral_claim_name(
        &self,
        namespace: &str,
        pod_name: &str,
        volume_name: &str,
    ) -> Result<String, crate::error::PopulateError>;

    /// Resolves the `ResourceClaim` name for `claim_ref`, a name from the
    /// pod spec's `resourceClaims` list.
    ///
    /// # Errors
    /// Returns an error if `claim_ref` doesn't resolve (for example, the
    /// pod's claim status hasn't caught up yet).
    fn resource_claim_name(
        &self,
        namespace: &str,
        pod_name: &str,
        claim_ref: &str,
    ) -> Result<String, crate::error::PopulateError>;
}

/// Where the populator reports how long each handler took.
///
/// Deliberately minimal — one number per named operation — so that any
/// metrics backend (Prometheus, StatsD, or none at all) can implement it
/// without pulling its client library into this crate's dependency graph.
pub trait MetricsSink: Send + Sync {
    /// Records that `operation` took `seconds` to run.
    fn observe(&self, operation: &str, seconds: f64);
}

/// A [`MetricsSink`] that discards every observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn observe(&self, _operation: &str, _seconds: f64) {}
}

/// Times its own lifetime and reports the elapsed seconds to a
/// [`MetricsSink`] when dropped.
pub struct OperationTimer<'a> {
    sink: &'a dyn MetricsSink,
    operation: &'static str,
    start: std::time::Instant,
}

impl<'a> OperationTimer<'a> {
    /// Starts timing `operation`, to be reported to `sink` on drop.
    #[must_use]
    pub fn start(sink: &'a dyn MetricsSink, operation: &'static str) -> Self {
        Self {
            sink,
            operation,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for OperationTimer<'_> {
    fn drop(&mut self) {
        self.sink.observe(self.operation, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        observations: Mutex<Vec<(String, f64)>>,
    }

    impl MetricsSink for RecordingSink {
        fn observe(&self, operation: &str, seconds: f64) {
            self.observations.lock().unwrap().push((operation.to_string(), seconds));
        }
    }

    #[test]
    fn operation_timer_reports_on_drop() {
        let sink = RecordingSink::default();
        {
            let _timer = OperationTimer::start(&sink, "AddPod");
        }
        let observations = sink.observations.lock().unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].0, "AddPod");
    }

    #[test]
    fn noop_sink_discards_everything() {
        let sink = NoopMetricsSink;
        sink.observe("AddPod", 1.0);
    }

    struct CountingSource {
        synced_after: AtomicUsize,
        polls: AtomicUsize,
    }

    impl ObjectSource<()> for CountingSource {
        fn has_synced(&self) -> bool {
            let count = self.polls.fetch_add(1, Ordering::SeqCst);
            count >= self.synced_after.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn wait_for_cache_sync_succeeds_once_source_reports_synced() {
        let source = CountingSource {
            synced_after: AtomicUsize::new(2),
            polls: AtomicUsize::new(0),
        };
        let waiter = WaitForCacheSync::new(Duration::from_millis(1));
        let sources: Vec<&dyn ObjectSource<()>> = vec![&source];
        let synced = waiter.wait(&sources, Duration::from_millis(50), |_| {});
        assert!(synced);
    }
}
