// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tunables for [`crate::authz::AuthorizationGraph`].

/// Configuration for an [`crate::authz::AuthorizationGraph`].
///
/// Both fields are structural thresholds rather than correctness knobs —
/// changing them affects memory/CPU tradeoffs, never the set of
/// authorization decisions the graph produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphConfig {
    /// Minimum out-degree a node must reach before its entry in the
    /// destination index is maintained incrementally (spec §4.5). Below
    /// this, querying authorized destinations falls back to a direct
    /// traversal, since the bookkeeping cost of the index isn't worth
    /// paying for a handful of edges.
    pub destination_edge_threshold: usize,

    /// Degree at which a vertex's [`crate::holder::EdgeHolder`] promotes
    /// from a flat slice to a hash map (spec §4.4).
    pub holder_promotion_threshold: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            destination_edge_threshold: 200,
            holder_promotion_threshold: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = GraphConfig::default();
        assert_eq!(config.destination_edge_threshold, 200);
        assert_eq!(config.holder_promotion_threshold, 4);
    }
}
