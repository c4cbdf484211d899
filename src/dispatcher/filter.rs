use super::{DispatchRequest, MatchResult};
use crate::response::Flow;

/// Hooks around resource matching.
///
/// `pre_match` runs before any manifest is looked at; `post_match` runs once
/// with the selected candidate. Returning [`Flow::ShortCircuit`] from either
/// ends dispatch with [`DispatchOutcome::Aborted`](super::DispatchOutcome::Aborted).
pub trait RequestFilter: Send + Sync {
    fn pre_match(&self, _request: &DispatchRequest) -> Flow<()> {
        Flow::Continue(())
    }

    fn post_match(&self, _request: &DispatchRequest, _selected: &MatchResult) -> Flow<()> {
        Flow::Continue(())
    }
}
