//! Field locator: ordered fallback resolution of UI targets.
//!
//! The markup of the target page is not under our control and changes over
//! time, by account state, and by locale. Each logical field therefore
//! carries a *chain* of target descriptors in decreasing specificity, and
//! the resolver walks the chain until one descriptor yields a visible,
//! enabled element. Chains are data, not code: adding or reordering
//! candidates never touches the resolver.

pub mod chains;
pub mod errors;
pub mod resolver;
pub mod types;

pub use chains::standard_chains;
pub use errors::LocatorError;
pub use resolver::{ChainResolver, PageProbe, Resolution, ResolvedTarget};
pub use types::{ElementHandle, FieldKind, HeuristicRule, LocatorChain, TargetDescriptor};
