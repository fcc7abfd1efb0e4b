// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Event-driven projection of cluster objects onto an
//! `echo-authz-graph::AuthorizationGraph`.
//!
//! See [`populator::GraphPopulator`] for the handler surface and
//! [`ports`] for the traits callers implement to supply name resolution
//! and metrics.

pub mod error;
pub mod populator;
pub mod ports;
pub mod views;

pub use error::PopulateError;
pub use populator::GraphPopulator;
pub use ports::{MetricsSink, NoopMetricsSink, ObjectSource, OperationTimer, PodNameResolver, WaitForCacheSync};
pub use views::{
    EphemeralVolumeSource, ExtendedResourceClaimStatusView, NamedReference, PersistentVolumeClaimRef,
    PersistentVolumeClaimVolumeSource, PersistentVolumeSecretReference, PersistentVolumeView, PodCertificateRequestView,
    PodResourceClaimView, PodSpecView, PodView, ResourceSliceView, VolumeAttachmentView, VolumeView,
};
