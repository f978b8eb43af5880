//! Timing knobs for step execution.

use std::time::Duration;

/// Timeouts and settle delays applied to every step.
///
/// Settle delays are bounded pauses after an interaction; they are not
/// cancelable mid-delay and are the only suspension points besides
/// resolver waits.
#[derive(Clone, Debug)]
pub struct StepPolicy {
    /// Overall budget for walking one locator chain.
    pub resolve_timeout: Duration,
    /// Pause after text insertion.
    pub input_settle: Duration,
    /// Pause after activation.
    pub click_settle: Duration,
    /// Pause after clearing a field, before typing.
    pub clear_settle: Duration,
    /// Budget for the security-check probe. Kept short: a missing
    /// challenge indicator is the expected outcome.
    pub probe_timeout: Duration,
}

impl Default for StepPolicy {
    fn default() -> Self {
        Self {
            resolve_timeout: Duration::from_secs(15),
            input_settle: Duration::from_secs(2),
            click_settle: Duration::from_secs(3),
            clear_settle: Duration::from_secs(1),
            probe_timeout: Duration::from_secs(3),
        }
    }
}

impl StepPolicy {
    /// Compressed timings for tests and demo environments.
    pub fn fast() -> Self {
        Self {
            resolve_timeout: Duration::from_millis(200),
            input_settle: Duration::from_millis(5),
            click_settle: Duration::from_millis(5),
            clear_settle: Duration::from_millis(5),
            probe_timeout: Duration::from_millis(100),
        }
    }
}
