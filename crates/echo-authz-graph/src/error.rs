// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Invariant-violation messages.
//!
//! These describe programmer errors, not recoverable conditions: a caller
//! that trips one has broken a contract the substrate assumes holds (no
//! self-edges, no id collisions, authoritative vertices keep destination
//! edges only). None of these are ever returned as a `Result` — they exist
//! purely to give `panic!`/`assert!` call sites a single, consistent message
//! format via [`GraphInvariant::to_string`].

use crate::vertex::{VertexId, VertexType};

/// A violated structural invariant of the graph.
///
/// Constructed immediately before a `panic!`; never propagated as an error
/// value.
#[derive(Debug, thiserror::Error)]
pub enum GraphInvariant {
    /// An edge was requested between a vertex and itself.
    #[error("refusing to create a self-edge on vertex {0}")]
    SelfEdge(VertexId),

    /// The id allocator was asked to hand out an id already marked used.
    #[error("id {0} is already in use")]
    IdCollision(VertexId),

    /// A vertex of an authoritative-index type was given a non-destination
    /// outgoing edge (spec §3).
    #[error(
        "vertex {vertex} has authoritative-index type {vertex_type}, which may only carry \
         destination-typed outgoing edges"
    )]
    NonDestinationEdgeFromAuthoritativeVertex {
        /// The offending vertex's display name.
        vertex: String,
        /// The offending vertex's type.
        vertex_type: VertexType,
    },

    /// A lookup expected a vertex id to resolve and it did not.
    #[error("vertex id {0} does not exist in the substrate")]
    UnknownVertexId(VertexId),
}
