// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scenario-level tests exercising the graph through its public API only.

use echo_authz_graph::{AuthorizationGraph, GraphConfig, VertexType};

#[test]
fn pod_with_service_account_and_secrets_is_authorized_to_its_node() {
    let graph = AuthorizationGraph::new(GraphConfig::default());

    let node = graph.get_or_create_vertex(VertexType::Node, "", "node-1");
    let pod = graph.get_or_create_vertex(VertexType::Pod, "default", "web-0");
    let service_account = graph.get_or_create_vertex(VertexType::ServiceAccount, "default", "web-sa");
    let secret_a = graph.get_or_create_vertex(VertexType::Secret, "default", "s-a");
    let secret_b = graph.get_or_create_vertex(VertexType::Secret, "default", "s-b");
    let configmap = graph.get_or_create_vertex(VertexType::ConfigMap, "default", "cm");

    graph.add_destination_edge(pod, node, node);
    graph.add_destination_edge(service_account, pod, node);
    graph.add_destination_edge(secret_a, pod, node);
    graph.add_destination_edge(secret_b, pod, node);
    graph.add_destination_edge(configmap, pod, node);

    assert!(graph.has_destination(pod, node));
    assert!(graph.has_destination(service_account, node));
    assert!(graph.has_destination(secret_a, node));
    assert!(graph.has_destination(secret_b, node));
    assert!(graph.has_destination(configmap, node));
}

#[test]
fn deleting_pod_cascades_to_objects_with_no_other_referrer() {
    let graph = AuthorizationGraph::new(GraphConfig::default());

    let node = graph.get_or_create_vertex(VertexType::Node, "", "node-1");
    let pod = graph.get_or_create_vertex(VertexType::Pod, "default", "web-0");
    let other_pod = graph.get_or_create_vertex(VertexType::Pod, "default", "keep-alive");
    let secret = graph.get_or_create_vertex(VertexType::Secret, "default", "only-used-by-pod");

    graph.add_destination_edge(pod, node, node);
    graph.add_destination_edge(other_pod, node, node); // keeps the node's degree above 1
    graph.add_destination_edge(secret, pod, node);

    graph.delete_vertex(VertexType::Pod, "default", "web-0");

    assert!(graph.find_vertex(VertexType::Pod, "default", "web-0").is_none());
    assert!(graph.find_vertex(VertexType::Secret, "default", "only-used-by-pod").is_none());
    assert!(graph.find_vertex(VertexType::Node, "", "node-1").is_some());
    assert!(graph.find_vertex(VertexType::Pod, "default", "keep-alive").is_some());
}

#[test]
fn destination_index_promotes_once_201_pods_schedule_onto_one_node() {
    let graph = AuthorizationGraph::new(GraphConfig::default()); // threshold 200
    let node = graph.get_or_create_vertex(VertexType::Node, "", "big-node");

    for i in 0..201 {
        let pod = graph.get_or_create_vertex(VertexType::Pod, "default", &format!("pod-{i}"));
        graph.add_destination_edge(pod, node, node);
    }

    assert!(graph.is_destination_indexed(node));
    assert_eq!(graph.degree(node), 201);
}

#[test]
fn edge_holder_promotes_once_a_vertex_gains_its_fifth_edge() {
    let graph = AuthorizationGraph::new(GraphConfig::default()); // holder threshold 4
    let node = graph.get_or_create_vertex(VertexType::Node, "", "node-1");

    for i in 0..5 {
        let pod = graph.get_or_create_vertex(VertexType::Pod, "default", &format!("pod-{i}"));
        graph.add_destination_edge(pod, node, node);
    }

    assert_eq!(graph.degree(node), 5);
    for i in 0..5 {
        let pod = graph.find_vertex(VertexType::Pod, "default", &format!("pod-{i}")).unwrap();
        assert!(graph.has_destination(pod, node));
    }
}

#[test]
fn mirror_pod_style_shared_object_keeps_edges_from_both_referrers() {
    let graph = AuthorizationGraph::new(GraphConfig::default());
    let node = graph.get_or_create_vertex(VertexType::Node, "", "node-1");
    let pod_a = graph.get_or_create_vertex(VertexType::Pod, "default", "a");
    let pod_b = graph.get_or_create_vertex(VertexType::Pod, "default", "b");
    let configmap = graph.get_or_create_vertex(VertexType::ConfigMap, "default", "shared");

    graph.add_destination_edge(pod_a, node, node);
    graph.add_destination_edge(pod_b, node, node);
    graph.add_destination_edge(configmap, pod_a, node);
    graph.add_destination_edge(configmap, pod_b, node);

    graph.delete_vertex(VertexType::Pod, "default", "a");

    assert!(graph.find_vertex(VertexType::ConfigMap, "default", "shared").is_some());
    assert_eq!(graph.degree(configmap), 1);
    assert!(graph.has_destination(configmap, node));
}
