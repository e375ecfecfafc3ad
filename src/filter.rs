//! Filter/Projection Layer
//!
//! Maps the operator's filter state to a scoped request descriptor for the
//! signal feed. Scope is always pushed to the Remote Authority; the client
//! never re-filters a broader cached set.

use crate::models::SignalStatus;
use serde::Serialize;
use std::collections::BTreeSet;

/// Status facet of the signal filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(SignalStatus),
}

/// Operator-selected filter criteria for the signal feed
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    pub status: StatusFilter,
    /// Empty set means "no symbol restriction", not "match nothing".
    pub coins: BTreeSet<String>,
    /// Result cap; [`FilterState::ALL`] means "return all".
    pub limit: u32,
}

impl FilterState {
    /// Sentinel cap meaning "return everything".
    pub const ALL: u32 = u32::MAX;

    pub fn new() -> Self {
        Self::default()
    }

    /// Project the filter state into a request descriptor.
    pub fn descriptor(&self) -> SignalQuery {
        SignalQuery {
            status: match self.status {
                StatusFilter::All => None,
                StatusFilter::Only(s) => Some(s),
            },
            coins: self.coins.iter().cloned().collect(),
            limit: (self.limit != Self::ALL).then_some(self.limit),
        }
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            status: StatusFilter::All,
            coins: BTreeSet::new(),
            limit: 100,
        }
    }
}

/// Scoped fetch descriptor handed to the Remote Authority
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalQuery {
    pub status: Option<SignalStatus>,
    /// Empty means unconstrained.
    pub coins: Vec<String>,
    /// `None` means unconstrained.
    pub limit: Option<u32>,
}

impl SignalQuery {
    /// Query parameters for the `/signals` endpoint.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if !self.coins.is_empty() {
            params.push(("coins", self.coins.join(",")));
        }
        params
    }
}
