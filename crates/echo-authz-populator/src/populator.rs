// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Event handlers that project cluster objects onto an
//! [`AuthorizationGraph`].
//!
//! Every `add_*`/`update_*` handler follows the same shape: delete any
//! stale vertex for the object first (an update is modeled as delete then
//! recreate, never an in-place edit — this is what makes `update_pod`
//! trivially just `add_pod` again), then rebuild the object's edges from
//! its current spec. Every `delete_*` handler is a single
//! [`AuthorizationGraph::delete_vertex`] call; cascading removal of objects
//! left with no other referrer is the graph's job, not this crate's.
//!
//! Object-shape problems (an unresolvable resource claim, an ephemeral
//! volume the resolver doesn't recognize) are logged and skipped rather
//! than propagated — a pod with one bad reference should still end up on
//! the graph with every *other* reference intact.

use echo_authz_graph::{AuthorizationGraph, VertexType};

use crate::ports::{MetricsSink, OperationTimer, PodNameResolver};
use crate::views::{PersistentVolumeView, PodCertificateRequestView, PodView, ResourceSliceView, VolumeAttachmentView};

/// Projects pod, volume, and DRA/attachment object events onto a graph.
pub struct GraphPopulator<'a> {
    graph: &'a AuthorizationGraph,
    resolver: &'a dyn PodNameResolver,
    metrics: &'a dyn MetricsSink,
}

impl<'a> GraphPopulator<'a> {
    /// Creates a populator writing to `graph`, using `resolver` for
    /// references a pod spec doesn't carry pre-resolved, and reporting
    /// handler durations to `metrics`.
    #[must_use]
    pub const fn new(graph: &'a AuthorizationGraph, resolver: &'a dyn PodNameResolver, metrics: &'a dyn MetricsSink) -> Self {
        Self { graph, resolver, metrics }
    }

    /// Adds or replaces `pod`'s vertex and edges.
    ///
    /// Mirror pods (carrying [`PodView::MIRROR_POD_ANNOTATION_KEY`]) only
    /// get their pod→node edge — a static pod manifest's secrets and
    /// config maps aren't API-server objects another vertex could ever
    /// need to reach through this pod.
    #[tracing::instrument(level = "debug", skip(self, pod), fields(namespace = %pod.namespace, pod = %pod.name))]
    pub fn add_pod(&self, pod: &PodView) {
        let _timer = OperationTimer::start(self.metrics, "AddPod");

        self.graph.delete_vertex(VertexType::Pod, &pod.namespace, &pod.name);
        let pod_id = self.graph.get_or_create_vertex(VertexType::Pod, &pod.namespace, &pod.name);
        let node_id = self.graph.get_or_create_vertex(VertexType::Node, "", &pod.spec.node_name);
        self.graph.add_destination_edge(pod_id, node_id, node_id);

        if pod.is_mirror_pod() {
            return;
        }

        if !pod.spec.service_account_name.is_empty() {
            let service_account_id = self.graph.get_or_create_vertex(
                VertexType::ServiceAccount,
                &pod.namespace,
                &pod.spec.service_account_name,
            );
            self.graph.add_destination_edge(service_account_id, pod_id, node_id);
        }

        for secret in &pod.spec.secrets {
            let secret_id = self.graph.get_or_create_vertex(VertexType::Secret, &pod.namespace, &secret.name);
            self.graph.add_destination_edge(secret_id, pod_id, node_id);
        }

        for config_map in &pod.spec.config_maps {
            let config_map_id = self.graph.get_or_create_vertex(VertexType::ConfigMap, &pod.namespace, &config_map.name);
            self.graph.add_destination_edge(config_map_id, pod_id, node_id);
        }

        self.add_volume_claims(pod, pod_id, node_id);
        self.add_resource_claims(pod, pod_id, node_id);
    }

    fn add_volume_claims(&self, pod: &PodView, pod_id: echo_authz_graph::VertexId, node_id: echo_authz_graph::VertexId) {
        for volume in &pod.spec.volumes {
            let claim_name = if let Some(pvc) = &volume.persistent_volume_claim {
                Some(pvc.claim_name.clone())
            } else if volume.ephemeral.is_some() {
                match self.resolver.ephemeral_claim_name(&pod.namespace, &pod.name, &volume.name) {
                    Ok(name) => Some(name),
                    Err(error) => {
                        tracing::info!(%error, volume = %volume.name, "skipping unresolvable ephemeral volume");
                        None
                    }
                }
            } else {
                None
            };

            if let Some(claim_name) = claim_name.filter(|n| !n.is_empty()) {
                let pvc_id = self.graph.get_or_create_vertex(VertexType::Pvc, &pod.namespace, &claim_name);
                self.graph.add_destination_edge(pvc_id, pod_id, node_id);
            }
        }
    }

    fn add_resource_claims(&self, pod: &PodView, pod_id: echo_authz_graph::VertexId, node_id: echo_authz_graph::VertexId) {
        for claim in &pod.spec.resource_claims {
            match self.resolver.resource_claim_name(&pod.namespace, &pod.name, &claim.name) {
                Ok(name) => {
                    let claim_id = self.graph.get_or_create_vertex(VertexType::ResourceClaim, &pod.namespace, &name);
                    self.graph.add_destination_edge(claim_id, pod_id, node_id);
                }
                Err(error) => {
                    tracing::info!(%error, claim_ref = %claim.name, "skipping unresolvable resource claim");
                }
            }
        }

        if let Some(extended) = pod.extended_resource_claim_status.as_ref().filter(|s| !s.resource_claim_name.is_empty()) {
            let claim_id = self.graph.get_or_create_vertex(VertexType::ResourceClaim, &pod.namespace, &extended.resource_claim_name);
            self.graph.add_destination_edge(claim_id, pod_id, node_id);
        }
    }

    /// An update is indistinguishable from a fresh add: the pod's vertex is
    /// always rebuilt from the latest spec, never patched in place.
    pub fn update_pod(&self, pod: &PodView) {
        self.add_pod(pod);
    }

    /// Removes a pod's vertex, cascading to any object left with no other
    /// referrer.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn delete_pod(&self, namespace: &str, name: &str) {
        let _timer = OperationTimer::start(self.metrics, "DeletePod");
        self.graph.delete_vertex(VertexType::Pod, namespace, name);
    }

    /// Adds or replaces a `PersistentVolume` vertex, rebuilding its edges to
    /// the claim it's bound to and any secrets its CSI/Flex source
    /// references. Both are plain edges — `Pv` isn't an authoritative-index
    /// type, so neither carries a destination on its own; the claim's own
    /// destination edge (added when a pod references it) is what resolves
    /// authorization for everything reachable through the PV.
    #[tracing::instrument(level = "debug", skip(self, pv), fields(pv = %pv.name))]
    pub fn add_pv(&self, pv: &PersistentVolumeView) {
        let _timer = OperationTimer::start(self.metrics, "AddPV");
        self.graph.delete_vertex(VertexType::Pv, "", &pv.name);
        let pv_id = self.graph.get_or_create_vertex(VertexType::Pv, "", &pv.name);
        if let Some(claim_ref) = &pv.claim_ref {
            let pvc_id = self.graph.get_or_create_vertex(VertexType::Pvc, &claim_ref.namespace, &claim_ref.name);
            self.graph.add_simple_edge(pv_id, pvc_id);
        }
        for secret_ref in &pv.secret_refs {
            let secret_id = self
                .graph
                .get_or_create_vertex(VertexType::Secret, &secret_ref.namespace, &secret_ref.name);
            self.graph.add_simple_edge(pv_id, secret_id);
        }
    }

    /// Removes a `PersistentVolume` vertex.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn delete_pv(&self, name: &str) {
        let _timer = OperationTimer::start(self.metrics, "DeletePV");
        self.graph.delete_vertex(VertexType::Pv, "", name);
    }

    /// Adds or replaces a `VolumeAttachment` vertex, linked directly to the
    /// node it's attached to.
    #[tracing::instrument(level = "debug", skip(self, attachment), fields(attachment = %attachment.name))]
    pub fn add_volume_attachment(&self, attachment: &VolumeAttachmentView) {
        let _timer = OperationTimer::start(self.metrics, "AddVolumeAttachment");
        self.graph.delete_vertex(VertexType::VolumeAttachment, "", &attachment.name);
        let attachment_id = self.graph.get_or_create_vertex(VertexType::VolumeAttachment, "", &attachment.name);
        let node_id = self.graph.get_or_create_vertex(VertexType::Node, "", &attachment.node_name);
        self.graph.add_destination_edge(attachment_id, node_id, node_id);
    }

    /// Removes a `VolumeAttachment` vertex.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn delete_volume_attachment(&self, name: &str) {
        let _timer = OperationTimer::start(self.metrics, "DeleteVolumeAttachment");
        self.graph.delete_vertex(VertexType::VolumeAttachment, "", name);
    }

    /// Adds or replaces a `ResourceSlice` vertex, linked directly to the
    /// node whose resources it advertises.
    #[tracing::instrument(level = "debug", skip(self, slice), fields(slice = %slice.name))]
    pub fn add_resource_slice(&self, slice: &ResourceSliceView) {
        let _timer = OperationTimer::start(self.metrics, "AddResourceSlice");
        self.graph.delete_vertex(VertexType::ResourceSlice, "", &slice.name);
        let slice_id = self.graph.get_or_create_vertex(VertexType::ResourceSlice, "", &slice.name);
        let node_id = self.graph.get_or_create_vertex(VertexType::Node, "", &slice.node_name);
        self.graph.add_destination_edge(slice_id, node_id, node_id);
    }

    /// Removes a `ResourceSlice` vertex.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn delete_resource_slice(&self, name: &str) {
        let _timer = OperationTimer::start(self.metrics, "DeleteResourceSlice");
        self.graph.delete_vertex(VertexType::ResourceSlice, "", name);
    }

    /// Adds or replaces a `PodCertificateRequest` vertex, linked to both the
    /// pod it was issued for and the service account it runs as, each with a
    /// destination edge resolving to the requesting node.
    #[tracing::instrument(level = "debug", skip(self, request), fields(namespace = %request.namespace, request = %request.name))]
    pub fn add_pod_certificate_request(&self, request: &PodCertificateRequestView) {
        let _timer = OperationTimer::start(self.metrics, "AddPodCertificateRequest");
        self.graph.delete_vertex(VertexType::PodCertificateRequest, &request.namespace, &request.name);
        let request_id = self
            .graph
            .get_or_create_vertex(VertexType::PodCertificateRequest, &request.namespace, &request.name);
        let pod_id = self.graph.get_or_create_vertex(VertexType::Pod, &request.namespace, &request.pod_name);
        let node_id = self.graph.get_or_create_vertex(VertexType::Node, "", &request.node_name);
        self.graph.add_destination_edge(request_id, pod_id, node_id);

        if !request.service_account_name.is_empty() {
            let service_account_id =
                self.graph
                    .get_or_create_vertex(VertexType::ServiceAccount, &request.namespace, &request.service_account_name);
            self.graph.add_destination_edge(request_id, service_account_id, node_id);
        }
    }

    /// Removes a `PodCertificateRequest` vertex.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn delete_pod_certificate_request(&self, namespace: &str, name: &str) {
        let _timer = OperationTimer::start(self.metrics, "DeletePodCertificateRequest");
        self.graph.delete_vertex(VertexType::PodCertificateRequest, namespace, name);
    }
}
