// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! A directed view over the undirected [`Substrate`].
//!
//! The substrate stores each edge once per endpoint so that both vertices
//! can find it, but every [`Edge`] already carries its own `from`/`to`
//! identity. `Dag` doesn't duplicate any storage — it just filters a
//! vertex's incident edges by which direction they point, which is all
//! authorization traversal (spec §4.2) ever needs.

use crate::edge::Edge;
use crate::substrate::Substrate;
use crate::vertex::VertexId;

/// A read-only directed projection of a [`Substrate`].
pub struct Dag<'a> {
    substrate: &'a Substrate,
}

impl<'a> Dag<'a> {
    /// Wraps `substrate` with a directed view.
    #[must_use]
    pub const fn new(substrate: &'a Substrate) -> Self {
        Self { substrate }
    }

    /// The source endpoint id of `edge`.
    #[must_use]
    pub fn from(edge: &Edge) -> VertexId {
        edge.from().id
    }

    /// The target endpoint id of `edge`.
    #[must_use]
    pub fn to(edge: &Edge) -> VertexId {
        edge.to().id
    }

    /// Visits every edge outgoing from `id` (edges where `id` is the
    /// `from` endpoint), calling `visitor` with the edge's target and the
    /// edge itself.
    pub fn visit_from(&self, id: VertexId, mut visitor: impl FnMut(VertexId, &Edge)) {
        for (neighbor, edge) in self.substrate.edges_of(id) {
            if Self::from(edge) == id {
                visitor(neighbor, edge);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::SimpleEdge;
    use crate::vertex::{NamedVertex, VertexType};

    fn vertex(vertex_type: VertexType, id: VertexId) -> NamedVertex {
        NamedVertex {
            vertex_type,
            namespace: "default".into(),
            name: format!("v{id}"),
            id,
        }
    }

    #[test]
    fn visit_from_only_reaches_outgoing_edges() {
        let mut substrate = Substrate::new(4);
        let pod_id = substrate.allocate_id();
        let node_id = substrate.allocate_id();
        substrate.insert_vertex(vertex(VertexType::Pod, pod_id));
        substrate.insert_vertex(vertex(VertexType::Node, node_id));
        substrate.set_edge(Edge::Simple(SimpleEdge {
            from: vertex(VertexType::Pod, pod_id),
            to: vertex(VertexType::Node, node_id),
        }));

        let dag = Dag::new(&substrate);
        let mut outgoing_from_pod = Vec::new();
        dag.visit_from(pod_id, |neighbor, _| outgoing_from_pod.push(neighbor));
        assert_eq!(outgoing_from_pod, vec![node_id]);

        let mut outgoing_from_node = Vec::new();
        dag.visit_from(node_id, |neighbor, _| outgoing_from_node.push(neighbor));
        assert!(outgoing_from_node.is_empty());
    }
}
