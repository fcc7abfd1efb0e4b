// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! An in-memory authorization graph for deciding which cluster nodes may
//! reach which objects.
//!
//! The graph is a destination-annotated DAG over an undirected substrate
//! (see [`substrate::Substrate`]): objects point toward the pods that
//! reference them, pods point toward the nodes they are scheduled on, and
//! every edge in that chain carries (or inherits) the node the chain
//! ultimately authorizes. [`authz::AuthorizationGraph`] is the locked,
//! queryable front door; [`sparse_set::SparseIntSet`] and
//! [`refcount::IntRefCounter`] are the low-level building blocks its id
//! allocator and destination index are built from.
//!
//! This crate has no knowledge of how objects arrive — see the
//! `echo-authz-populator` crate for the event-driven layer that projects
//! Kubernetes-shaped inputs onto this graph.

pub mod authz;
pub mod config;
pub mod dag;
pub mod edge;
pub mod error;
pub mod holder;
pub mod refcount;
pub mod sparse_set;
pub mod substrate;
pub mod vertex;

pub use authz::AuthorizationGraph;
pub use config::GraphConfig;
pub use edge::{DestinationEdge, Edge, SimpleEdge};
pub use error::GraphInvariant;
pub use vertex::{NamedVertex, VertexId, VertexType};
