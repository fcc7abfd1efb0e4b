// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Vertex types and identity for the authorization graph.

use std::fmt;

/// Opaque vertex identifier, assigned by the substrate's id allocator.
///
/// Ids are reused after deletion; callers must treat them as opaque and
/// never assume stability across a delete/recreate boundary.
pub type VertexId = u64;

/// The kind of cluster object a vertex represents.
///
/// Each variant has a stable, lower-case short name (see [`VertexType::as_str`])
/// used in logs and human-readable vertex identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexType {
    /// A `ConfigMap`.
    ConfigMap,
    /// A `ResourceSlice`.
    ResourceSlice,
    /// A cluster `Node`.
    Node,
    /// A `Pod`.
    Pod,
    /// A `PersistentVolumeClaim`.
    Pvc,
    /// A `PersistentVolume`.
    Pv,
    /// A `ResourceClaim`.
    ResourceClaim,
    /// A `Secret`.
    Secret,
    /// A `VolumeAttachment`.
    VolumeAttachment,
    /// A `ServiceAccount`.
    ServiceAccount,
    /// A `PodCertificateRequest`.
    PodCertificateRequest,
}

impl VertexType {
    /// The canonical short name used in logs and vertex identifiers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigMap => "configmap",
            Self::ResourceSlice => "resourceslice",
            Self::Node => "node",
            Self::Pod => "pod",
            Self::Pvc => "pvc",
            Self::Pv => "pv",
            Self::ResourceClaim => "resourceclaim",
            Self::Secret => "secret",
            Self::VolumeAttachment => "volumeattachment",
            Self::ServiceAccount => "serviceAccount",
            Self::PodCertificateRequest => "podcertificaterequest",
        }
    }

    /// Whether vertices of this type are restricted to destination-typed
    /// outgoing edges only (spec §3, "authoritative-index set").
    ///
    /// Vertices of these types back the destination index directly —
    /// authorization for them is always decided by a single hop to a
    /// node, never by a chain of plain dependency edges.
    #[must_use]
    pub const fn is_authoritative_index_type(self) -> bool {
        matches!(
            self,
            Self::Secret
                | Self::ConfigMap
                | Self::Pvc
                | Self::ServiceAccount
                | Self::ResourceClaim
                | Self::PodCertificateRequest
                | Self::ResourceSlice
                | Self::VolumeAttachment
        )
    }
}

impl fmt::Display for VertexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A vertex in the authorization graph.
///
/// Identity is `(vertex_type, namespace, name)`; `id` is opaque and may be
/// reused by the substrate's allocator after the vertex is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedVertex {
    /// The vertex's object kind.
    pub vertex_type: VertexType,
    /// Namespace the object lives in (empty string for cluster-scoped
    /// objects such as `Node`).
    pub namespace: String,
    /// Object name.
    pub name: String,
    /// Opaque id assigned by the substrate at creation time.
    pub id: VertexId,
}

impl NamedVertex {
    /// Builds a human-readable identifier, e.g. `pod/default/web-0`.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.namespace.is_empty() {
            format!("{}/{}", self.vertex_type, self.name)
        } else {
            format!("{}/{}/{}", self.vertex_type, self.namespace, self.name)
        }
    }
}

impl fmt::Display for NamedVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
