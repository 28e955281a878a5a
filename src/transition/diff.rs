//! Exit/enter planning between two route states.

use std::sync::Arc;

use crate::routing::{Params, Route};

/// The routes a transition leaves and enters.
#[derive(Debug, Clone, Default)]
pub struct TransitionPlan {
    /// Shared ancestors whose params did not change. Not touched.
    pub retained: Vec<Arc<Route>>,
    /// Deepest first.
    pub exit: Vec<Arc<Route>>,
    /// Shallowest first.
    pub enter: Vec<Arc<Route>>,
}

impl TransitionPlan {
    pub fn exit_names(&self) -> Vec<&str> {
        self.exit.iter().map(|r| r.name()).collect()
    }

    pub fn enter_names(&self) -> Vec<&str> {
        self.enter.iter().map(|r| r.name()).collect()
    }
}

/// Diff the chain of the current state (if any) against the target chain.
///
/// The retained prefix stops at the first ancestor that differs by identity
/// or whose declared params changed. The target itself is never retained.
pub fn plan(
    from: Option<(&[Arc<Route>], &Params)>,
    to_chain: &[Arc<Route>],
    to_params: &Params,
) -> TransitionPlan {
    let Some((from_chain, from_params)) = from else {
        return TransitionPlan {
            retained: Vec::new(),
            exit: Vec::new(),
            enter: to_chain.to_vec(),
        };
    };

    let limit = to_chain.len().saturating_sub(1).min(from_chain.len());
    let kept = from_chain
        .iter()
        .zip(to_chain)
        .take(limit)
        .take_while(|(old, new)| {
            Arc::ptr_eq(old, new) && new.params_unchanged(from_params, to_params)
        })
        .count();

    TransitionPlan {
        retained: to_chain[..kept].to_vec(),
        exit: from_chain[kept..].iter().rev().cloned().collect(),
        enter: to_chain[kept..].to_vec(),
    }
}
