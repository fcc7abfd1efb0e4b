// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The undirected graph substrate: vertex storage, edge storage, and id
//! allocation. The authorization semantics (directed traversal,
//! authoritative-index enforcement, destination index) live one layer up in
//! [`crate::authz`]; this module only knows about vertices, edges, and ids.

use std::collections::HashMap;

use crate::edge::Edge;
use crate::error::GraphInvariant;
use crate::holder::EdgeHolder;
use crate::sparse_set::SparseIntSet;
use crate::vertex::{NamedVertex, VertexId};

/// Hands out and reclaims vertex ids.
///
/// Freed ids are reused before any fresh id is minted, keeping the id space
/// compact under churn (pods are created and deleted constantly). Both the
/// free set and the used set are [`SparseIntSet`]s so that a long-running
/// graph with millions of allocate/release cycles never grows its id-tracking
/// memory past what the current live vertex count needs.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    free_ids: SparseIntSet,
    used_ids: SparseIntSet,
    next_fresh: VertexId,
}

impl IdAllocator {
    /// Creates an allocator with no ids handed out yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next available id: the smallest freed id, or a fresh
    /// one if none have been freed.
    pub fn allocate(&mut self) -> VertexId {
        let id = match self.free_ids.take_min() {
            Some(reused) => reused
                .try_into()
                .expect("freed ids were inserted as valid VertexId values"),
            None => {
                let fresh = self.next_fresh;
                self.next_fresh += 1;
                fresh
            }
        };
        let inserted = self.used_ids.insert(id.try_into().expect("VertexId fits in i64"));
        assert!(inserted, "{}", GraphInvariant::IdCollision(id));
        id
    }

    /// Returns `id` to the free pool. Panics if `id` was not currently in
    /// use — releasing an id twice is a programmer error.
    pub fn release(&mut self, id: VertexId) {
        let signed = id.try_into().expect("VertexId fits in i64");
        let was_used = self.used_ids.remove(signed);
        assert!(was_used, "releasing id {id} that was not allocated");
        self.free_ids.insert(signed);
    }

    /// Whether `id` is currently allocated.
    #[must_use]
    pub fn is_used(&self, id: VertexId) -> bool {
        id.try_into()
            .map(|signed| self.used_ids.has(signed))
            .unwrap_or(false)
    }

    /// Number of currently-allocated ids.
    #[must_use]
    pub fn used_count(&self) -> usize {
        self.used_ids.len()
    }
}

/// The undirected substrate: every vertex currently in the graph and the
/// edges between them, addressed by opaque [`VertexId`].
///
/// Edges are stored once per endpoint (each vertex's [`EdgeHolder`] knows
/// about edges incident to it), so every mutation touches both endpoints'
/// holders to keep the two views consistent.
#[derive(Debug, Clone)]
pub struct Substrate {
    nodes: HashMap<VertexId, NamedVertex>,
    edges: HashMap<VertexId, EdgeHolder>,
    allocator: IdAllocator,
    holder_promotion_threshold: usize,
}

impl Substrate {
    /// Creates an empty substrate. `holder_promotion_threshold` is the
    /// degree at which a vertex's [`EdgeHolder`] switches from a flat slice
    /// to a hash map (see [`crate::config::GraphConfig`]).
    #[must_use]
    pub fn new(holder_promotion_threshold: usize) -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            allocator: IdAllocator::new(),
            holder_promotion_threshold,
        }
    }

    /// Allocates a fresh id and inserts `vertex` (whose `id` field must
    /// already carry that allocated id).
    pub fn insert_vertex(&mut self, vertex: NamedVertex) {
        let id = vertex.id;
        assert!(
            self.allocator.is_used(id),
            "vertex id {id} must be allocated via `allocate_id` before insertion"
        );
        self.nodes.insert(id, vertex);
        self.edges.insert(id, EdgeHolder::new(id));
    }

    /// Allocates a vertex id from the pool.
    pub fn allocate_id(&mut self) -> VertexId {
        self.allocator.allocate()
    }

    /// Removes the vertex with `id` and releases its id back to the pool.
    ///
    /// The caller is responsible for having already removed every edge
    /// incident to `id` (see [`crate::authz::AuthorizationGraph::delete_vertex`]);
    /// this only panics if edges remain, since leaving them would corrupt
    /// the neighboring vertices' holders.
    pub fn remove_vertex(&mut self, id: VertexId) -> Option<NamedVertex> {
        let holder = self.edges.remove(&id)?;
        assert!(
            holder.is_empty(),
            "vertex {id} still has {} incident edge(s); remove them before deleting the vertex",
            holder.len()
        );
        let vertex = self.nodes.remove(&id);
        self.allocator.release(id);
        vertex
    }

    /// The vertex stored at `id`, if any.
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> Option<&NamedVertex> {
        self.nodes.get(&id)
    }

    /// Whether a vertex currently occupies `id`.
    #[must_use]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Total number of vertices currently in the substrate.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.nodes.len()
    }

    /// Inserts `edge` into both endpoints' holders, promoting either holder
    /// that reaches the promotion threshold. Returns the edge previously
    /// stored between the same two endpoints, if any.
    ///
    /// # Panics
    /// Panics if `edge`'s endpoints are equal (self-edges are never valid,
    /// per spec §4.4) or if either endpoint is not a vertex currently in the
    /// substrate.
    pub fn set_edge(&mut self, edge: Edge) -> Option<Edge> {
        let from = edge.from().id;
        let to = edge.to().id;
        assert!(from != to, "{}", GraphInvariant::SelfEdge(from));
        assert!(
            self.nodes.contains_key(&from),
            "{}",
            GraphInvariant::UnknownVertexId(from)
        );
        assert!(
            self.nodes.contains_key(&to),
            "{}",
            GraphInvariant::UnknownVertexId(to)
        );

        let threshold = self.holder_promotion_threshold;
        let previous = self
            .edges
            .get_mut(&from)
            .expect("endpoint holder must exist for a known vertex")
            .insert(to, edge.clone(), threshold);
        self.edges
            .get_mut(&to)
            .expect("endpoint holder must exist for a known vertex")
            .insert(from, edge, threshold);
        previous
    }

    /// Removes the edge between `a` and `b`, if one exists, from both
    /// endpoints' holders.
    pub fn remove_edge(&mut self, a: VertexId, b: VertexId) -> Option<Edge> {
        let removed = self.edges.get_mut(&a).and_then(|h| h.remove(b));
        self.edges.get_mut(&b).and_then(|h| h.remove(a));
        removed
    }

    /// The edge between `a` and `b`, if one exists.
    #[must_use]
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<&Edge> {
        self.edges.get(&a).and_then(|h| h.get(b))
    }

    /// Number of edges incident to `id` (0 if `id` is not a known vertex).
    #[must_use]
    pub fn degree(&self, id: VertexId) -> usize {
        self.edges.get(&id).map_or(0, EdgeHolder::len)
    }

    /// Neighbor ids of `id`, in no particular order.
    pub fn neighbors(&self, id: VertexId) -> Box<dyn Iterator<Item = VertexId> + '_> {
        self.edges
            .get(&id)
            .map_or_else(|| Box::new(std::iter::empty()) as Box<dyn Iterator<Item = VertexId>>, EdgeHolder::neighbors)
    }

    /// `(neighbor, edge)` pairs incident to `id`, in no particular order.
    pub fn edges_of(&self, id: VertexId) -> Box<dyn Iterator<Item = (VertexId, &Edge)> + '_> {
        self.edges.get(&id).map_or_else(
            || Box::new(std::iter::empty()) as Box<dyn Iterator<Item = (VertexId, &Edge)>>,
            EdgeHolder::iter,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::SimpleEdge;
    use crate::vertex::VertexType;

    fn vertex(vertex_type: VertexType, id: VertexId) -> NamedVertex {
        NamedVertex {
            vertex_type,
            namespace: "default".into(),
            name: format!("v{id}"),
            id,
        }
    }

    #[test]
    fn allocator_reuses_freed_ids_in_ascending_order() {
        let mut allocator = IdAllocator::new();
        let a = allocator.allocate();
        let b = allocator.allocate();
        allocator.release(a);
        let c = allocator.allocate();
        assert_eq!(c, a);
        assert_ne!(b, c);
    }

    #[test]
    fn insert_and_remove_vertex_round_trips() {
        let mut substrate = Substrate::new(4);
        let id = substrate.allocate_id();
        substrate.insert_vertex(vertex(VertexType::Pod, id));
        assert!(substrate.contains_vertex(id));
        assert_eq!(substrate.vertex_count(), 1);

        let removed = substrate.remove_vertex(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(!substrate.contains_vertex(id));
        assert_eq!(substrate.vertex_count(), 0);
    }

    #[test]
    #[should_panic(expected = "still has")]
    fn remove_vertex_with_edges_panics() {
        let mut substrate = Substrate::new(4);
        let pod_id = substrate.allocate_id();
        let node_id = substrate.allocate_id();
        substrate.insert_vertex(vertex(VertexType::Pod, pod_id));
        substrate.insert_vertex(vertex(VertexType::Node, node_id));
        substrate.set_edge(Edge::Simple(SimpleEdge {
            from: vertex(VertexType::Pod, pod_id),
            to: vertex(VertexType::Node, node_id),
        }));
        substrate.remove_vertex(pod_id);
    }

    #[test]
    fn set_edge_is_visible_from_both_endpoints() {
        let mut substrate = Substrate::new(4);
        let pod_id = substrate.allocate_id();
        let node_id = substrate.allocate_id();
        substrate.insert_vertex(vertex(VertexType::Pod, pod_id));
        substrate.insert_vertex(vertex(VertexType::Node, node_id));
        substrate.set_edge(Edge::Simple(SimpleEdge {
            from: vertex(VertexType::Pod, pod_id),
            to: vertex(VertexType::Node, node_id),
        }));

        assert_eq!(substrate.degree(pod_id), 1);
        assert_eq!(substrate.degree(node_id), 1);
        assert!(substrate.edge_between(pod_id, node_id).is_some());
        assert!(substrate.edge_between(node_id, pod_id).is_some());
    }

    #[test]
    fn remove_edge_clears_both_endpoints() {
        let mut substrate = Substrate::new(4);
        let pod_id = substrate.allocate_id();
        let node_id = substrate.allocate_id();
        substrate.insert_vertex(vertex(VertexType::Pod, pod_id));
        substrate.insert_vertex(vertex(VertexType::Node, node_id));
        substrate.set_edge(Edge::Simple(SimpleEdge {
            from: vertex(VertexType::Pod, pod_id),
            to: vertex(VertexType::Node, node_id),
        }));
        substrate.remove_edge(pod_id, node_id);
        assert_eq!(substrate.degree(pod_id), 0);
        assert_eq!(substrate.degree(node_id), 0);
    }

    #[test]
    #[should_panic(expected = "self-edge")]
    fn self_edge_panics() {
        let mut substrate = Substrate::new(4);
        let id = substrate.allocate_id();
        substrate.insert_vertex(vertex(VertexType::Pod, id));
        substrate.set_edge(Edge::Simple(SimpleEdge {
            from: vertex(VertexType::Pod, id),
            to: vertex(VertexType::Pod, id),
        }));
    }
}
