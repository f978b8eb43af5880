//! Chain resolver: walks a locator chain with per-descriptor sub-timeouts.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::LocatorError;
use crate::types::{ElementHandle, HeuristicRule, LocatorChain, TargetDescriptor};

/// Port to the page under automation.
///
/// One call evaluates one descriptor against the live page and returns every
/// matching element with its visibility, enablement, and geometry. The
/// substrate adapter implements this; tests use scripted fakes.
#[async_trait]
pub trait PageProbe: Send + Sync {
    async fn query(
        &self,
        descriptor: &TargetDescriptor,
    ) -> Result<Vec<ElementHandle>, LocatorError>;
}

/// Successful resolution: the element plus which candidate produced it.
#[derive(Clone, Debug)]
pub struct ResolvedTarget {
    pub handle: ElementHandle,
    pub descriptor: TargetDescriptor,
    /// Position of the winning descriptor in the chain.
    pub candidate_index: usize,
}

/// Outcome of walking a chain. Exhaustion is a value, not an error.
#[derive(Clone, Debug)]
pub enum Resolution {
    Found(ResolvedTarget),
    NotFound {
        /// How many descriptors were attempted before giving up.
        attempted: usize,
    },
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

/// Walks locator chains in priority order.
pub struct ChainResolver {
    probe: Arc<dyn PageProbe>,
    poll_interval: Duration,
}

impl ChainResolver {
    pub fn new(probe: Arc<dyn PageProbe>) -> Self {
        Self {
            probe,
            poll_interval: Duration::from_millis(250),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(10));
        self
    }

    /// Resolve the first visible, enabled match in chain order.
    ///
    /// The overall timeout is split evenly into per-descriptor sub-timeouts;
    /// each descriptor is polled until its sub-deadline before the resolver
    /// moves on. Descriptors after the first success are never attempted.
    pub async fn resolve(
        &self,
        chain: &LocatorChain,
        timeout: Duration,
    ) -> Result<Resolution, LocatorError> {
        if chain.is_empty() {
            return Ok(Resolution::NotFound { attempted: 0 });
        }

        let sub_timeout = timeout / chain.len() as u32;
        let mut clean_misses = 0usize;
        let mut last_error: Option<LocatorError> = None;

        for (index, descriptor) in chain.candidates.iter().enumerate() {
            debug!(
                field = chain.field.name(),
                strategy = descriptor.strategy_name(),
                index,
                "trying descriptor"
            );

            match self.try_descriptor(descriptor, sub_timeout).await {
                Ok(Some(handle)) => {
                    info!(
                        field = chain.field.name(),
                        strategy = descriptor.strategy_name(),
                        index,
                        node = %handle.node_ref,
                        "resolved element"
                    );
                    return Ok(Resolution::Found(ResolvedTarget {
                        handle,
                        descriptor: descriptor.clone(),
                        candidate_index: index,
                    }));
                }
                Ok(None) => {
                    clean_misses += 1;
                    debug!(
                        field = chain.field.name(),
                        strategy = descriptor.strategy_name(),
                        index,
                        "descriptor produced no interactable match"
                    );
                }
                Err(err) => {
                    warn!(
                        field = chain.field.name(),
                        strategy = descriptor.strategy_name(),
                        index,
                        error = %err,
                        "descriptor evaluation failed"
                    );
                    last_error = Some(err);
                }
            }
        }

        // If no descriptor could even be evaluated cleanly, the page probe
        // itself is broken and that fault must surface distinctly.
        if clean_misses == 0 {
            if let Some(err) = last_error {
                return Err(err);
            }
        }

        Ok(Resolution::NotFound {
            attempted: chain.len(),
        })
    }

    /// Poll one descriptor until its sub-deadline.
    ///
    /// Each probe call is itself capped at the remaining sub-budget, so a
    /// hung probe cannot stall the walk past the chain's overall timeout.
    async fn try_descriptor(
        &self,
        descriptor: &TargetDescriptor,
        sub_timeout: Duration,
    ) -> Result<Option<ElementHandle>, LocatorError> {
        let deadline = Instant::now() + sub_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let candidates =
                match tokio::time::timeout(remaining, self.probe.query(descriptor)).await {
                    Ok(queried) => queried?,
                    // The probe overran the sub-deadline; count it as a miss
                    // and move on to the next descriptor.
                    Err(_) => return Ok(None),
                };
            if let Some(handle) = pick_candidate(descriptor, candidates) {
                return Ok(Some(handle));
            }
            if Instant::now() + self.poll_interval > deadline {
                return Ok(None);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Select among one descriptor's own matches.
///
/// Non-heuristic descriptors take the first interactable match (DOM order).
/// The heuristic strategies score within their candidate set: maximal
/// bounding-box area.
fn pick_candidate(
    descriptor: &TargetDescriptor,
    candidates: Vec<ElementHandle>,
) -> Option<ElementHandle> {
    let mut interactable = candidates.into_iter().filter(ElementHandle::interactable);
    match descriptor {
        TargetDescriptor::Heuristic(rule) => {
            let best = interactable.fold(None::<ElementHandle>, |best, next| match best {
                Some(b) if b.area >= next.area => Some(b),
                _ => Some(next),
            });
            match rule {
                HeuristicRule::LargestEditable | HeuristicRule::LabelledEditable { .. } => best,
            }
        }
        _ => interactable.next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains;
    use crate::types::FieldKind;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn handle(node: &str, visible: bool, enabled: bool, area: f64) -> ElementHandle {
        ElementHandle {
            node_ref: node.to_string(),
            visible,
            enabled,
            area,
        }
    }

    /// Probe scripted per serialized descriptor, counting queries.
    struct ScriptedProbe {
        matches: HashMap<String, Vec<ElementHandle>>,
        queries: AtomicUsize,
    }

    impl ScriptedProbe {
        fn new(entries: Vec<(TargetDescriptor, Vec<ElementHandle>)>) -> Self {
            let matches = entries
                .into_iter()
                .map(|(d, h)| (serde_json::to_string(&d).unwrap(), h))
                .collect();
            Self {
                matches,
                queries: AtomicUsize::new(0),
            }
        }

        fn empty() -> Self {
            Self::new(Vec::new())
        }
    }

    #[async_trait]
    impl PageProbe for ScriptedProbe {
        async fn query(
            &self,
            descriptor: &TargetDescriptor,
        ) -> Result<Vec<ElementHandle>, LocatorError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            let key = serde_json::to_string(descriptor).unwrap();
            Ok(self.matches.get(&key).cloned().unwrap_or_default())
        }
    }

    struct HangingProbe;

    #[async_trait]
    impl PageProbe for HangingProbe {
        async fn query(
            &self,
            _descriptor: &TargetDescriptor,
        ) -> Result<Vec<ElementHandle>, LocatorError> {
            std::future::pending().await
        }
    }

    struct FailingProbe;

    #[async_trait]
    impl PageProbe for FailingProbe {
        async fn query(
            &self,
            _descriptor: &TargetDescriptor,
        ) -> Result<Vec<ElementHandle>, LocatorError> {
            Err(LocatorError::Probe("page detached".to_string()))
        }
    }

    fn quick(probe: Arc<dyn PageProbe>) -> ChainResolver {
        ChainResolver::new(probe).with_poll_interval(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn first_match_wins_and_later_candidates_are_never_queried() {
        let chain = LocatorChain::new(
            FieldKind::SubjectField,
            vec![
                TargetDescriptor::attribute("input[name='subjectbox']"),
                TargetDescriptor::attribute("input[name='subject']"),
            ],
        );
        // Both descriptors would match; only the first may be consulted.
        let probe = Arc::new(ScriptedProbe::new(vec![
            (
                chain.candidates[0].clone(),
                vec![handle("a", true, true, 100.0)],
            ),
            (
                chain.candidates[1].clone(),
                vec![handle("b", true, true, 100.0)],
            ),
        ]));
        let resolver = quick(probe.clone());

        let resolution = resolver
            .resolve(&chain, Duration::from_millis(200))
            .await
            .unwrap();
        match resolution {
            Resolution::Found(target) => {
                assert_eq!(target.handle.node_ref, "a");
                assert_eq!(target.candidate_index, 0);
            }
            other => panic!("expected Found, got {:?}", other),
        }
        assert_eq!(probe.queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invisible_matches_are_skipped_for_later_candidates() {
        let chain = LocatorChain::new(
            FieldKind::SendControl,
            vec![
                TargetDescriptor::attribute("div[aria-label*='Send']"),
                TargetDescriptor::text("Send"),
            ],
        );
        let probe = Arc::new(ScriptedProbe::new(vec![
            (
                chain.candidates[0].clone(),
                vec![handle("hidden", false, true, 50.0)],
            ),
            (
                chain.candidates[1].clone(),
                vec![handle("visible", true, true, 50.0)],
            ),
        ]));
        let resolver = quick(probe);

        let resolution = resolver
            .resolve(&chain, Duration::from_millis(100))
            .await
            .unwrap();
        match resolution {
            Resolution::Found(target) => {
                assert_eq!(target.handle.node_ref, "visible");
                assert_eq!(target.candidate_index, 1);
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn exhausted_chain_reports_not_found_within_the_timeout() {
        let chain = chains::standard_chains(FieldKind::RecipientField);
        let resolver = quick(Arc::new(ScriptedProbe::empty()));

        let started = std::time::Instant::now();
        let resolution = resolver
            .resolve(&chain, Duration::from_millis(300))
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
        match resolution {
            Resolution::NotFound { attempted } => assert_eq!(attempted, chain.len()),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn resolution_stays_bounded_when_the_probe_hangs() {
        let chain = chains::standard_chains(FieldKind::SubjectField);
        let resolver = quick(Arc::new(HangingProbe));

        let started = std::time::Instant::now();
        let resolution = resolver
            .resolve(&chain, Duration::from_millis(100))
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_millis(500));
        match resolution {
            Resolution::NotFound { attempted } => assert_eq!(attempted, chain.len()),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn heuristic_picks_largest_area() {
        let heuristic = TargetDescriptor::Heuristic(HeuristicRule::LargestEditable);
        let chain = LocatorChain::new(FieldKind::BodyField, vec![heuristic.clone()]);
        let probe = Arc::new(ScriptedProbe::new(vec![(
            heuristic,
            vec![
                handle("small", true, true, 120.0),
                handle("large", true, true, 48_000.0),
                handle("huge_but_hidden", false, true, 90_000.0),
                handle("medium", true, true, 9_000.0),
            ],
        )]));
        let resolver = quick(probe);

        let resolution = resolver
            .resolve(&chain, Duration::from_millis(100))
            .await
            .unwrap();
        match resolution {
            Resolution::Found(target) => assert_eq!(target.handle.node_ref, "large"),
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn broken_probe_surfaces_as_an_error_not_as_not_found() {
        let chain = chains::standard_chains(FieldKind::ComposeControl);
        let resolver = quick(Arc::new(FailingProbe));

        let result = resolver.resolve(&chain, Duration::from_millis(100)).await;
        assert!(matches!(result, Err(LocatorError::Probe(_))));
    }

    #[tokio::test]
    async fn empty_chain_is_not_found_immediately() {
        let chain = LocatorChain::new(FieldKind::BodyField, vec![]);
        let resolver = quick(Arc::new(ScriptedProbe::empty()));
        let resolution = resolver
            .resolve(&chain, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(matches!(resolution, Resolution::NotFound { attempted: 0 }));
    }
}
