// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Input-shape errors: a cluster object referenced something that couldn't
//! be resolved. These are never fatal — the handler that encounters one
//! logs it at `info` and otherwise processes the object as if the
//! unresolvable reference weren't there (see the module docs on
//! [`crate::populator::GraphPopulator`]).

/// A reference inside an object's spec could not be resolved to a name.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PopulateError {
    /// A pod's `resourceClaims` entry didn't resolve to a `ResourceClaim`
    /// name (an outdated or malformed claim status, for example).
    #[error("pod {namespace}/{pod} references resource claim {claim_ref} which could not be resolved: {reason}")]
    UnresolvableResourceClaim {
        /// Pod namespace.
        namespace: String,
        /// Pod name.
        pod: String,
        /// The `PodResourceClaim` name the pod's spec used to refer to it.
        claim_ref: String,
        /// Why resolution failed.
        reason: String,
    },

    /// A pod's ephemeral volume didn't resolve to a generated
    /// `PersistentVolumeClaim` name.
    #[error("pod {namespace}/{pod} references ephemeral volume {volume} which could not be resolved: {reason}")]
    UnresolvableEphemeralVolume {
        /// Pod namespace.
        namespace: String,
        /// Pod name.
        pod: String,
        /// The volume name inside the pod spec.
        volume: String,
        /// Why resolution failed.
        reason: String,
    },
}
