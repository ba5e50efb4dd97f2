use serde::{Deserialize, Serialize};

/// Knobs for a single traversal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Maximum number of links resolved per call. `None` is unbounded.
    pub link_budget: Option<usize>,
}

impl TraversalConfig {
    /// Bound the number of link resolutions.
    pub fn with_link_budget(mut self, limit: usize) -> Self {
        self.link_budget = Some(limit);
        self
    }
}
