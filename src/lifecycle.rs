//! Driver lifecycle states and best-effort teardown reporting

use heapless::Vec;

use crate::power::PowerError;

/// Maximum number of teardown failures kept in a [`TeardownReport`]
pub const MAX_TEARDOWN_FAILURES: usize = 8;

/// Where a device instance is in its life
///
/// ```text
/// Uninitialized -> Attached -> Prepared -> Active
///                     ^           |  ^        |
///                     |           v  |        v
///                     +------ Unprepared  Suspended
/// ```
///
/// `Detached` is terminal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LifecycleState {
    /// Not yet attached to its resources
    #[default]
    Uninitialized,
    /// Resources acquired, hardware unpowered
    Attached,
    /// Powered and programmed
    Prepared,
    /// Producing output (panel on, sensor reporting)
    Active,
    /// Powered but quiesced
    Suspended,
    /// Powered down after having been prepared
    Unprepared,
    /// Resources released
    Detached,
}

impl LifecycleState {
    /// Whether the hardware is powered in this state
    pub const fn is_powered(self) -> bool {
        matches!(self, Self::Prepared | Self::Active | Self::Suspended)
    }
}

/// A single problem hit while powering down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TeardownFailure {
    /// A supply or the reset line did not switch
    Power(PowerError),
    /// A device command failed (names the command)
    Command(&'static str),
}

/// Failures collected during a teardown that carried on regardless
///
/// Teardown never aborts part way; each failure is logged when it happens
/// and kept here for the caller to inspect afterwards.
#[derive(Debug, Default, Clone)]
pub struct TeardownReport {
    failures: Vec<TeardownFailure, MAX_TEARDOWN_FAILURES>,
    dropped: usize,
}

impl TeardownReport {
    /// Create an empty report
    pub const fn new() -> Self {
        Self {
            failures: Vec::new(),
            dropped: 0,
        }
    }

    /// Record a failure
    ///
    /// Once the report is full further failures are only counted.
    pub fn record(&mut self, failure: TeardownFailure) {
        if self.failures.push(failure).is_err() {
            self.dropped += 1;
        }
    }

    /// Whether teardown completed without any failure
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.dropped == 0
    }

    /// Recorded failures, oldest first
    pub fn failures(&self) -> &[TeardownFailure] {
        &self.failures
    }

    /// Failures that did not fit in the report
    pub const fn dropped(&self) -> usize {
        self.dropped
    }

    /// Forget all recorded failures
    pub fn clear(&mut self) {
        self.failures.clear();
        self.dropped = 0;
    }
}
