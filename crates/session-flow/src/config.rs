//! Orchestrator configuration.
//!
//! One explicit object passed in at construction; no ambient singletons.

use std::time::Duration;

use step_runner::StepPolicy;

#[derive(Clone, Debug)]
pub struct FlowConfig {
    /// Webmail entry URL.
    pub mail_url: String,
    /// Timing applied to every step.
    pub step_policy: StepPolicy,
    /// Pause before the final verification checkpoint.
    pub verify_settle: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            mail_url: "https://mail.google.com".to_string(),
            step_policy: StepPolicy::default(),
            verify_settle: Duration::from_secs(3),
        }
    }
}

impl FlowConfig {
    /// Compressed timings for tests.
    pub fn fast() -> Self {
        Self {
            mail_url: "https://mail.example.test".to_string(),
            step_policy: StepPolicy::fast(),
            verify_settle: Duration::from_millis(5),
        }
    }
}
