//! Batched loop primitive
//!
//! Full-table scans can touch millions of rows. [`loop_batched`] drives a
//! step closure until it raises its stop flag, grouping steps into release
//! scopes of `batch_size` steps. Everything a step creates is owned by that
//! step; a [`ReleaseScope`] marks each group boundary, and nothing created in
//! one group survives into the next. A `batch_size` of 0 runs a single
//! unbounded pass with no release points.
//!
//! The stop flag is shared with the step closure: once a step sets it, no
//! further step runs in the current group and no new group starts.

use tracing::trace;

/// What a batched loop did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchingStats {
    /// Number of times the step closure ran
    pub steps: usize,
    /// Number of release scopes that were closed
    pub releases: usize,
}

/// A group of steps whose transient state is released together
#[derive(Debug)]
pub struct ReleaseScope {
    index: usize,
    steps: usize,
}

impl ReleaseScope {
    fn enter(index: usize) -> Self {
        Self { index, steps: 0 }
    }

    /// Zero-based position of this scope in the loop
    pub fn index(&self) -> usize {
        self.index
    }

    /// Steps run inside this scope so far
    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl Drop for ReleaseScope {
    fn drop(&mut self) {
        trace!(target: "sds::enumerate", scope = self.index, steps = self.steps, "Release point");
    }
}

/// Run `step` until it sets the stop flag, in groups of `batch_size`
pub fn loop_batched(batch_size: usize, mut step: impl FnMut(&mut bool)) -> BatchingStats {
    let mut stop = false;
    let mut stats = BatchingStats::default();

    if batch_size == 0 {
        while !stop {
            step(&mut stop);
            stats.steps += 1;
        }
        return stats;
    }

    while !stop {
        let mut scope = ReleaseScope::enter(stats.releases);
        while scope.steps < batch_size && !stop {
            step(&mut stop);
            scope.steps += 1;
            stats.steps += 1;
        }
        drop(scope);
        stats.releases += 1;
    }
    stats
}
