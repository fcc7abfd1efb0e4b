// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-vertex edge storage, promoted from a flat slice to a hash map once a
//! vertex accumulates enough neighbors that linear scans stop paying off.

use std::collections::HashMap;

use crate::edge::Edge;
use crate::vertex::VertexId;

#[derive(Debug, Clone)]
enum Repr {
    Slice(Vec<(VertexId, Edge)>),
    Map(HashMap<VertexId, Edge>),
}

/// The edges incident to one vertex, keyed by the neighboring vertex id.
///
/// Most vertices have only a handful of edges, so a `Vec` of pairs avoids
/// hashing overhead and keeps iteration cache-friendly. Once a vertex's
/// degree exceeds `promotion_threshold` (see [`crate::config::GraphConfig`]) —
/// i.e. on gaining its `promotion_threshold + 1`th distinct neighbor — the
/// holder promotes itself to a `HashMap` and never demotes back — a vertex
/// that grew a large fan-out once is likely to again.
#[derive(Debug, Clone)]
pub struct EdgeHolder {
    owner: VertexId,
    repr: Repr,
}

impl EdgeHolder {
    /// Creates an empty holder for `owner`.
    #[must_use]
    pub const fn new(owner: VertexId) -> Self {
        Self {
            owner,
            repr: Repr::Slice(Vec::new()),
        }
    }

    /// The vertex this holder's edges are incident to.
    #[must_use]
    pub const fn owner(&self) -> VertexId {
        self.owner
    }

    /// Number of edges currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Slice(v) => v.len(),
            Repr::Map(m) => m.len(),
        }
    }

    /// Whether this holder has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this holder has been promoted to the map representation.
    #[must_use]
    pub const fn is_promoted(&self) -> bool {
        matches!(self.repr, Repr::Map(_))
    }

    /// The edge to `neighbor`, if one exists.
    #[must_use]
    pub fn get(&self, neighbor: VertexId) -> Option<&Edge> {
        match &self.repr {
            Repr::Slice(v) => v.iter().find(|(id, _)| *id == neighbor).map(|(_, e)| e),
            Repr::Map(m) => m.get(&neighbor),
        }
    }

    /// Inserts or replaces the edge to `neighbor`, promoting to the map
    /// representation if this insertion exceeds `promotion_threshold`
    /// distinct neighbors. Returns the previous edge to `neighbor`, if any.
    pub fn insert(&mut self, neighbor: VertexId, edge: Edge, promotion_threshold: usize) -> Option<Edge> {
        match &mut self.repr {
            Repr::Slice(v) => {
                if let Some(slot) = v.iter_mut().find(|(id, _)| *id == neighbor) {
                    return Some(std::mem::replace(&mut slot.1, edge));
                }
                v.push((neighbor, edge));
                if v.len() > promotion_threshold {
                    self.promote();
                }
                None
            }
            Repr::Map(m) => m.insert(neighbor, edge),
        }
    }

    fn promote(&mut self) {
        let Repr::Slice(v) = &mut self.repr else {
            return;
        };
        let map = std::mem::take(v).into_iter().collect();
        self.repr = Repr::Map(map);
    }

    /// Removes the edge to `neighbor`, returning it if it existed.
    pub fn remove(&mut self, neighbor: VertexId) -> Option<Edge> {
        match &mut self.repr {
            Repr::Slice(v) => {
                let pos = v.iter().position(|(id, _)| *id == neighbor)?;
                Some(v.swap_remove(pos).1)
            }
            Repr::Map(m) => m.remove(&neighbor),
        }
    }

    /// Iterates `(neighbor, edge)` pairs in no particular order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (VertexId, &Edge)> + '_> {
        match &self.repr {
            Repr::Slice(v) => Box::new(v.iter().map(|(id, e)| (*id, e))),
            Repr::Map(m) => Box::new(m.iter().map(|(id, e)| (*id, e))),
        }
    }

    /// Neighbor ids, in no particular order.
    pub fn neighbors(&self) -> Box<dyn Iterator<Item = VertexId> + '_> {
        match &self.repr {
            Repr::Slice(v) => Box::new(v.iter().map(|(id, _)| *id)),
            Repr::Map(m) => Box::new(m.keys().copied()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::SimpleEdge;
    use crate::vertex::{NamedVertex, VertexType};

    fn edge(from: VertexId, to: VertexId) -> Edge {
        Edge::Simple(SimpleEdge {
            from: NamedVertex {
                vertex_type: VertexType::Pod,
                namespace: String::new(),
                name: "f".into(),
                id: from,
            },
            to: NamedVertex {
                vertex_type: VertexType::Node,
                namespace: String::new(),
                name: "t".into(),
                id: to,
            },
        })
    }

    #[test]
    fn stays_slice_below_threshold() {
        let mut holder = EdgeHolder::new(1);
        for n in 2..5 {
            holder.insert(n, edge(1, n), 4);
        }
        assert!(!holder.is_promoted());
        assert_eq!(holder.len(), 3);
    }

    #[test]
    fn promotes_at_threshold() {
        let mut holder = EdgeHolder::new(1);
        for n in 2..=6 {
            holder.insert(n, edge(1, n), 4);
        }
        assert!(holder.is_promoted());
        assert_eq!(holder.len(), 5);
        assert!(holder.get(6).is_some());
    }

    #[test]
    fn insert_existing_neighbor_replaces_without_growing() {
        let mut holder = EdgeHolder::new(1);
        holder.insert(2, edge(1, 2), 4);
        let replaced = holder.insert(2, edge(1, 2), 4);
        assert!(replaced.is_some());
        assert_eq!(holder.len(), 1);
    }

    #[test]
    fn remove_works_in_both_representations() {
        let mut holder = EdgeHolder::new(1);
        holder.insert(2, edge(1, 2), 4);
        assert!(holder.remove(2).is_some());
        assert!(holder.is_empty());

        for n in 2..=6 {
            holder.insert(n, edge(1, n), 4);
        }
        assert!(holder.is_promoted());
        assert!(holder.remove(3).is_some());
        assert_eq!(holder.len(), 4);
        assert!(holder.get(3).is_none());
    }

    #[test]
    fn stays_promoted_after_shrinking_below_threshold() {
        let mut holder = EdgeHolder::new(1);
        for n in 2..=6 {
            holder.insert(n, edge(1, n), 4);
        }
        holder.remove(2);
        holder.remove(3);
        assert!(holder.is_promoted(), "holder should never demote");
    }
}
