// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The authorization graph: a locked [`Substrate`] plus the two indices that
//! make it queryable — a three-level vertex index for name-based lookup, and
//! a per-vertex destination index that short-circuits authorization checks
//! for high-degree vertices.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::instrument;

use crate::config::GraphConfig;
use crate::dag::Dag;
use crate::edge::{DestinationEdge, Edge, SimpleEdge};
use crate::error::GraphInvariant;
use crate::refcount::IntRefCounter;
use crate::substrate::Substrate;
use crate::vertex::{NamedVertex, VertexId, VertexType};

type VertexIndex = HashMap<VertexType, HashMap<String, HashMap<String, VertexId>>>;

struct Inner {
    substrate: Substrate,
    vertex_index: VertexIndex,
    /// Keyed by a vertex id whose degree has crossed
    /// `config.destination_edge_threshold`; value is the set of destination
    /// node ids directly reachable through that vertex's own destination
    /// edges. Chains through intermediate simple edges are always resolved
    /// by direct traversal (see [`AuthorizationGraph::has_destination`]) —
    /// the index only accelerates the common one-hop case.
    destination_index: HashMap<VertexId, IntRefCounter>,
}

impl Inner {
    fn new(config: &GraphConfig) -> Self {
        Self {
            substrate: Substrate::new(config.holder_promotion_threshold),
            vertex_index: HashMap::new(),
            destination_index: HashMap::new(),
        }
    }

    fn lookup_id(&self, vertex_type: VertexType, namespace: &str, name: &str) -> Option<VertexId> {
        self.vertex_index.get(&vertex_type)?.get(namespace)?.get(name).copied()
    }

    fn insert_into_vertex_index(&mut self, vertex: &NamedVertex) {
        self.vertex_index
            .entry(vertex.vertex_type)
            .or_default()
            .entry(vertex.namespace.clone())
            .or_default()
            .insert(vertex.name.clone(), vertex.id);
    }

    /// Removes `vertex` from the index, pruning any namespace/type map left
    /// empty by the removal so the index never accumulates dead branches.
    fn remove_from_vertex_index(&mut self, vertex: &NamedVertex) {
        if let Some(by_namespace) = self.vertex_index.get_mut(&vertex.vertex_type) {
            if let Some(by_name) = by_namespace.get_mut(&vertex.namespace) {
                by_name.remove(&vertex.name);
                if by_name.is_empty() {
                    by_namespace.remove(&vertex.namespace);
                }
            }
            if by_namespace.is_empty() {
                self.vertex_index.remove(&vertex.vertex_type);
            }
        }
    }

    fn get_or_create_vertex(&mut self, vertex_type: VertexType, namespace: &str, name: &str) -> VertexId {
        if let Some(id) = self.lookup_id(vertex_type, namespace, name) {
            return id;
        }
        let id = self.substrate.allocate_id();
        let vertex = NamedVertex {
            vertex_type,
            namespace: namespace.to_string(),
            name: name.to_string(),
            id,
        };
        self.substrate.insert_vertex(vertex.clone());
        self.insert_into_vertex_index(&vertex);
        id
    }

    fn vertex_or_panic(&self, id: VertexId) -> NamedVertex {
        self.substrate
            .vertex(id)
            .unwrap_or_else(|| panic!("{}", GraphInvariant::UnknownVertexId(id)))
            .clone()
    }

    fn assert_edge_allowed(&self, from: &NamedVertex, is_destination: bool) {
        if from.vertex_type.is_authoritative_index_type() && !is_destination {
            panic!(
                "{}",
                GraphInvariant::NonDestinationEdgeFromAuthoritativeVertex {
                    vertex: from.display_name(),
                    vertex_type: from.vertex_type,
                }
            );
        }
    }

    fn add_simple_edge(&mut self, from: VertexId, to: VertexId, config: &GraphConfig) {
        let from_vertex = self.vertex_or_panic(from);
        let to_vertex = self.vertex_or_panic(to);
        self.assert_edge_allowed(&from_vertex, false);
        self.substrate.set_edge(Edge::Simple(SimpleEdge {
            from: from_vertex,
            to: to_vertex,
        }));
        self.after_edge_added(from, config);
    }

    fn add_destination_edge(&mut self, from: VertexId, to: VertexId, destination: VertexId, config: &GraphConfig) {
        let from_vertex = self.vertex_or_panic(from);
        let to_vertex = self.vertex_or_panic(to);
        let destination_vertex = self.vertex_or_panic(destination);
        self.assert_edge_allowed(&from_vertex, true);
        self.substrate.set_edge(Edge::Destination(DestinationEdge {
            from: from_vertex,
            to: to_vertex,
            destination: destination_vertex,
        }));
        self.add_edge_to_index(from, destination, config);
        self.after_edge_added(from, config);
    }

    /// After any edge touching `vertex_id` is added, its degree may have
    /// just crossed the indexing threshold; if so, build its index from
    /// scratch to pick up every direct destination edge it already has, not
    /// just the one that was just added.
    fn after_edge_added(&mut self, vertex_id: VertexId, config: &GraphConfig) {
        let degree = self.substrate.degree(vertex_id);
        let already_indexed = self.destination_index.contains_key(&vertex_id);
        if degree >= config.destination_edge_threshold && !already_indexed {
            self.recompute_destination_index(vertex_id);
        }
    }

    /// Rebuilds `vertex_id`'s destination-index entry from its current
    /// direct destination edges. If an entry already existed, it is reset
    /// first; a freshly created entry starts empty, so no reset is needed.
    fn recompute_destination_index(&mut self, vertex_id: VertexId) {
        // Either wipe the pre-existing entry or start a fresh empty one —
        // either way `counter` below begins empty.
        let mut counter = IntRefCounter::new();
        Dag::new(&self.substrate).visit_from(vertex_id, |_, edge| {
            if let Edge::Destination(d) = edge {
                counter.increment(i64_from(d.destination.id));
            }
        });
        self.destination_index.insert(vertex_id, counter);
    }

    fn add_edge_to_index(&mut self, from: VertexId, destination: VertexId, config: &GraphConfig) {
        if let Some(counter) = self.destination_index.get_mut(&from) {
            counter.increment(i64_from(destination));
        } else if self.substrate.degree(from) >= config.destination_edge_threshold {
            self.recompute_destination_index(from);
        }
    }

    fn remove_edge_from_index(&mut self, from: VertexId, destination: VertexId, config: &GraphConfig) {
        let Some(counter) = self.destination_index.get_mut(&from) else {
            return;
        };
        counter.decrement(i64_from(destination));
        if self.substrate.degree(from) < config.destination_edge_threshold {
            self.destination_index.remove(&from);
        }
    }

    fn has_destination_direct_or_chained(
        &self,
        id: VertexId,
        destination: VertexId,
        visited: &mut std::collections::HashSet<VertexId>,
    ) -> bool {
        if !visited.insert(id) {
            return false;
        }
        let mut outgoing = Vec::new();
        Dag::new(&self.substrate).visit_from(id, |neighbor, edge| outgoing.push((neighbor, edge.clone())));
        for (neighbor, edge) in outgoing {
            match edge {
                Edge::Destination(d) => {
                    if d.destination.id == destination {
                        return true;
                    }
                }
                Edge::Simple(_) => {
                    if self.has_destination_direct_or_chained(neighbor, destination, visited) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn has_destination(&self, id: VertexId, destination: VertexId) -> bool {
        if let Some(counter) = self.destination_index.get(&id) {
            if counter.has(i64_from(destination)) {
                return true;
            }
        }
        self.has_destination_direct_or_chained(id, destination, &mut std::collections::HashSet::new())
    }

    fn delete_vertex_by_id(&mut self, id: VertexId, config: &GraphConfig) {
        let Some(vertex) = self.substrate.vertex(id).cloned() else {
            return;
        };

        let neighbor_edges: Vec<(VertexId, Edge)> = self.substrate.edges_of(id).map(|(n, e)| (n, e.clone())).collect();

        // Snapshot which neighbors will become orphaned *before* any edge is
        // removed — a neighbor at degree 1 has no other reason to exist once
        // this, its only edge, is gone.
        let leaves: Vec<VertexId> = neighbor_edges
            .iter()
            .map(|(n, _)| *n)
            .filter(|&n| self.substrate.degree(n) == 1)
            .collect();

        for (neighbor, edge) in &neighbor_edges {
            self.substrate.remove_edge(id, *neighbor);
            if let Some(destination) = edge.destination() {
                let from = Dag::from(edge);
                self.remove_edge_from_index(from, destination.id, config);
            }
        }

        for leaf in leaves {
            self.delete_vertex_by_id(leaf, config);
        }

        self.destination_index.remove(&id);
        self.remove_from_vertex_index(&vertex);
        self.substrate.remove_vertex(id);
    }

    fn delete_edge(&mut self, from: VertexId, to: VertexId, config: &GraphConfig) {
        let Some(edge) = self.substrate.edge_between(from, to).cloned() else {
            return;
        };
        self.substrate.remove_edge(from, to);
        if let Some(destination) = edge.destination() {
            let edge_from = Dag::from(&edge);
            self.remove_edge_from_index(edge_from, destination.id, config);
        }
    }
}

fn i64_from(id: VertexId) -> i64 {
    id.try_into().expect("VertexId fits in i64")
}

/// The mutable, concurrently-readable authorization graph.
///
/// A single [`std::sync::RwLock`] guards the whole graph: every mutation
/// touches at least two data structures (the substrate and one or both
/// indices) that must stay consistent with each other, so there is no
/// finer-grained locking that wouldn't reintroduce the inconsistency a
/// single lock avoids. No I/O ever happens while the lock is held.
pub struct AuthorizationGraph {
    inner: RwLock<Inner>,
    config: GraphConfig,
}

impl AuthorizationGraph {
    /// Creates an empty graph with the given configuration.
    #[must_use]
    pub fn new(config: GraphConfig) -> Self {
        Self {
            inner: RwLock::new(Inner::new(&config)),
            config,
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// The configuration this graph was created with.
    #[must_use]
    pub const fn config(&self) -> GraphConfig {
        self.config
    }

    /// Looks up `(vertex_type, namespace, name)`, creating it if absent.
    #[instrument(level = "debug", skip(self))]
    pub fn get_or_create_vertex(&self, vertex_type: VertexType, namespace: &str, name: &str) -> VertexId {
        self.write().get_or_create_vertex(vertex_type, namespace, name)
    }

    /// Looks up `(vertex_type, namespace, name)` without creating it.
    pub fn find_vertex(&self, vertex_type: VertexType, namespace: &str, name: &str) -> Option<VertexId> {
        self.read().lookup_id(vertex_type, namespace, name)
    }

    /// A copy of the vertex stored at `id`, if any.
    pub fn vertex(&self, id: VertexId) -> Option<NamedVertex> {
        self.read().substrate.vertex(id).cloned()
    }

    /// Adds a plain dependency edge from `from` to `to`.
    ///
    /// # Panics
    /// Panics if `from` is an authoritative-index vertex (spec §3) — those
    /// may only carry destination-typed outgoing edges.
    #[instrument(level = "debug", skip(self))]
    pub fn add_simple_edge(&self, from: VertexId, to: VertexId) {
        self.write().add_simple_edge(from, to, &self.config);
    }

    /// Adds a destination-annotated edge from `from` to `to`, resolving
    /// authorization for `destination`.
    #[instrument(level = "debug", skip(self))]
    pub fn add_destination_edge(&self, from: VertexId, to: VertexId, destination: VertexId) {
        self.write().add_destination_edge(from, to, destination, &self.config);
    }

    /// Removes the edge between `from` and `to`, if one exists.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_edge(&self, from: VertexId, to: VertexId) {
        self.write().delete_edge(from, to, &self.config);
    }

    /// Deletes the vertex `(vertex_type, namespace, name)` and cascades the
    /// removal to any neighbor left with no other edges (spec §4.6).
    #[instrument(level = "debug", skip(self))]
    pub fn delete_vertex(&self, vertex_type: VertexType, namespace: &str, name: &str) {
        let mut inner = self.write();
        if let Some(id) = inner.lookup_id(vertex_type, namespace, name) {
            inner.delete_vertex_by_id(id, &self.config);
        }
    }

    /// Whether `id` is transitively authorized to reach `destination`
    /// (always a `Node` vertex) through destination edges.
    #[instrument(level = "debug", skip(self))]
    pub fn has_destination(&self, id: VertexId, destination: VertexId) -> bool {
        self.read().has_destination(id, destination)
    }

    /// Current degree (edge count) of `id`.
    pub fn degree(&self, id: VertexId) -> usize {
        self.read().substrate.degree(id)
    }

    /// Whether `id`'s destination index is currently materialized.
    pub fn is_destination_indexed(&self, id: VertexId) -> bool {
        self.read().destination_index.contains_key(&id)
    }

    /// Total number of vertices currently in the graph.
    pub fn vertex_count(&self) -> usize {
        self.read().substrate.vertex_count()
    }
}
