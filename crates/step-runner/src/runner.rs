//! Step execution flow.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use field_locator::{ChainResolver, LocatorChain, Resolution, ResolvedTarget};

use crate::errors::StepError;
use crate::model::{StepFailure, StepKind, StepOutcome};
use crate::policy::StepPolicy;
use crate::ports::{DriverError, DriverPort};

pub struct StepRunner {
    resolver: ChainResolver,
    driver: Arc<dyn DriverPort>,
    policy: StepPolicy,
}

impl StepRunner {
    pub fn new(resolver: ChainResolver, driver: Arc<dyn DriverPort>, policy: StepPolicy) -> Self {
        Self {
            resolver,
            driver,
            policy,
        }
    }

    pub fn policy(&self) -> &StepPolicy {
        &self.policy
    }

    /// Perform one step against the field the chain describes.
    ///
    /// No internal retries: a failed resolution or action is reported once
    /// and the caller decides the session's fate.
    #[instrument(skip_all, fields(field = chain.field.name(), kind = kind.name()))]
    pub async fn execute(
        &self,
        chain: &LocatorChain,
        kind: &StepKind,
    ) -> Result<StepOutcome, StepError> {
        let timeout = match kind {
            StepKind::Probe => self.policy.probe_timeout,
            _ => self.policy.resolve_timeout,
        };

        let target = match self.resolver.resolve(chain, timeout).await? {
            Resolution::Found(target) => target,
            Resolution::NotFound { attempted } => {
                if matches!(kind, StepKind::Probe) {
                    debug!(attempted, "probe target absent");
                    return Ok(StepOutcome::Ack { matched: false });
                }
                warn!(attempted, "chain exhausted");
                return Ok(StepOutcome::Failed(StepFailure::TargetNotFound {
                    field: chain.field,
                }));
            }
        };

        if matches!(kind, StepKind::Probe) {
            info!(node = %target.handle.node_ref, "probe target present");
            return Ok(StepOutcome::Ack { matched: true });
        }

        // Resolution already filtered on visibility/enablement; staleness
        // between resolution and action surfaces as `DriverError::Gone`.
        match kind {
            StepKind::TypeText { text, clear } => self.run_type(&target, chain, text, *clear).await,
            StepKind::Click => self.run_click(&target, chain).await,
            StepKind::Probe => unreachable!("probe handled above"),
        }
    }

    async fn run_type(
        &self,
        target: &ResolvedTarget,
        chain: &LocatorChain,
        text: &str,
        clear: bool,
    ) -> Result<StepOutcome, StepError> {
        if clear {
            if let Some(outcome) = self
                .check_action(chain, self.driver.clear(&target.handle).await)?
            {
                return Ok(outcome);
            }
            tokio::time::sleep(self.policy.clear_settle).await;
        }

        if let Some(outcome) = self.check_action(
            chain,
            self.driver.type_text(&target.handle, text).await,
        )? {
            return Ok(outcome);
        }

        tokio::time::sleep(self.policy.input_settle).await;
        info!(chars = text.chars().count(), "text entered");
        Ok(StepOutcome::ack())
    }

    async fn run_click(
        &self,
        target: &ResolvedTarget,
        chain: &LocatorChain,
    ) -> Result<StepOutcome, StepError> {
        if let Some(outcome) =
            self.check_action(chain, self.driver.click(&target.handle).await)?
        {
            return Ok(outcome);
        }
        tokio::time::sleep(self.policy.click_settle).await;
        info!("target activated");
        Ok(StepOutcome::ack())
    }

    /// Map a driver result onto the step failure taxonomy.
    ///
    /// Timeouts and vanished elements are expected interaction failures;
    /// transport faults propagate as `StepError`.
    fn check_action(
        &self,
        chain: &LocatorChain,
        result: Result<(), DriverError>,
    ) -> Result<Option<StepOutcome>, StepError> {
        match result {
            Ok(()) => Ok(None),
            Err(DriverError::Timeout(reason)) => {
                warn!(%reason, "action timed out");
                Ok(Some(StepOutcome::Failed(StepFailure::ActionTimeout {
                    field: chain.field,
                })))
            }
            Err(DriverError::Gone(reason)) => {
                warn!(%reason, "element not interactable at action time");
                Ok(Some(StepOutcome::Failed(StepFailure::NotInteractable {
                    field: chain.field,
                })))
            }
            Err(err @ DriverError::Substrate(_)) => Err(err.into()),
        }
    }
}
