// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The populator's input contract: plain, already-deserialized views of the
//! cluster objects it projects onto the graph.
//!
//! These intentionally mirror only the fields the graph cares about, not
//! full Kubernetes API types — callers own the mapping from whatever object
//! representation they use to these views.

/// A `Secret` or `ConfigMap` reference by name, as it appears inside a pod
/// spec's `secrets`/`configMaps`-equivalent volume and env-from lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedReference {
    /// The referenced object's name.
    pub name: String,
}

/// A pod's `persistentVolumeClaim` volume source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentVolumeClaimVolumeSource {
    /// The PVC's name.
    pub claim_name: String,
}

/// A pod's ephemeral volume source — its generated claim name is resolved
/// by a [`crate::ports::PodNameResolver`], not carried in the view itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EphemeralVolumeSource;

/// One entry of a pod spec's `volumes` list, narrowed to the two volume
/// kinds that reference a `PersistentVolumeClaim`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeView {
    /// The volume's name within the pod spec.
    pub name: String,
    /// Set if this volume is a direct PVC reference.
    pub persistent_volume_claim: Option<PersistentVolumeClaimVolumeSource>,
    /// Set if this volume is an ephemeral, pod-generated PVC.
    pub ephemeral: Option<EphemeralVolumeSource>,
}

/// One entry of a pod spec's `resourceClaims` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodResourceClaimView {
    /// The name the pod spec uses to refer to this claim.
    pub name: String,
}

/// A pod's `status.extendedResourceClaimStatus`, if present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedResourceClaimStatusView {
    /// The already-resolved `ResourceClaim` name.
    pub resource_claim_name: String,
}

/// The subset of a pod spec the populator consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodSpecView {
    /// The node this pod is (or will be) scheduled on.
    pub node_name: String,
    /// The service account this pod runs as.
    pub service_account_name: String,
    /// Secrets referenced by name (already flattened from volumes and
    /// `envFrom`/`env` by the caller).
    pub secrets: Vec<NamedReference>,
    /// ConfigMaps referenced by name, flattened the same way.
    pub config_maps: Vec<NamedReference>,
    /// Declared volumes.
    pub volumes: Vec<VolumeView>,
    /// Declared resource claims.
    pub resource_claims: Vec<PodResourceClaimView>,
}

/// A pod, as the populator needs to see it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodView {
    /// Pod namespace.
    pub namespace: String,
    /// Pod name.
    pub name: String,
    /// Pod annotations — checked for the mirror-pod marker.
    pub annotations: std::collections::BTreeMap<String, String>,
    /// The pod's spec.
    pub spec: PodSpecView,
    /// The pod's extended resource claim status, if reported.
    pub extended_resource_claim_status: Option<ExtendedResourceClaimStatusView>,
}

impl PodView {
    /// Annotation key marking a pod as a kubelet-created mirror pod.
    ///
    /// Mirror pods don't carry their own `ServiceAccount`/`Secret`/
    /// `ConfigMap` references worth indexing — the static pod manifest they
    /// mirror isn't API-server-managed, so no other vertex ever points at
    /// them for those purposes.
    pub const MIRROR_POD_ANNOTATION_KEY: &'static str = "kubernetes.io/config.mirror";

    /// Whether this pod is a mirror pod.
    #[must_use]
    pub fn is_mirror_pod(&self) -> bool {
        self.annotations.contains_key(Self::MIRROR_POD_ANNOTATION_KEY)
    }
}

/// A `PersistentVolume`, narrowed to its claim binding and the secrets its
/// source (CSI, FlexVolume, etc.) references directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistentVolumeView {
    /// The PV's name.
    pub name: String,
    /// The namespace and name of the `PersistentVolumeClaim` this volume is
    /// bound to, if any.
    pub claim_ref: Option<PersistentVolumeClaimRef>,
    /// Secrets referenced by the PV's CSI/FlexVolume source (e.g.
    /// `nodePublishSecretRef`, `nodeStageSecretRef`).
    pub secret_refs: Vec<PersistentVolumeSecretReference>,
}

/// A cross-namespace reference from a `PersistentVolume` to the
/// `PersistentVolumeClaim` it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentVolumeClaimRef {
    /// The PVC's namespace.
    pub namespace: String,
    /// The PVC's name.
    pub name: String,
}

/// A reference from a `PersistentVolume`'s CSI/FlexVolume source to a
/// `Secret`. Unlike `claim_ref`, these carry their own namespace since a
/// PV's secret source isn't implicitly scoped to the claim's namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentVolumeSecretReference {
    /// The secret's namespace.
    pub namespace: String,
    /// The secret's name.
    pub name: String,
}

/// A `VolumeAttachment`, narrowed to the fields that place it on the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeAttachmentView {
    /// The attachment's name.
    pub name: String,
    /// The node this volume is attached to.
    pub node_name: String,
}

/// A `ResourceSlice`, narrowed to the fields that place it on the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSliceView {
    /// The slice's name.
    pub name: String,
    /// The node this slice advertises resources for.
    pub node_name: String,
}

/// A `PodCertificateRequest`, narrowed to the fields that place it on the
/// graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodCertificateRequestView {
    /// The request's namespace.
    pub namespace: String,
    /// The request's name.
    pub name: String,
    /// The pod this certificate is being issued for.
    pub pod_name: String,
    /// The service account the requesting pod runs as.
    pub service_account_name: String,
    /// The node the requesting kubelet runs on.
    pub node_name: String,
}
