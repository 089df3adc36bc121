// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Small catalog shared by the command line and output tests

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIResource, APIResourceList};
use k8scatalog::catalog::{OpenApiSchemas, Parser, Resources};
use serde_json::json;

fn descriptor(name: &str, kind: &str) -> APIResource {
    APIResource {
        name: name.to_string(),
        kind: kind.to_string(),
        namespaced: true,
        verbs: vec!["get".to_string(), "list".to_string(), "watch".to_string()],
        ..Default::default()
    }
}

fn schemas() -> OpenApiSchemas {
    let document = json!({
        "definitions": {
            "io.k8s.api.core.v1.Pod": {
                "x-kubernetes-group-version-kind": [{"group": "", "version": "v1", "kind": "Pod"}],
                "properties": {
                    "spec": {"properties": {"nodeName": {"type": "string"}}},
                    "status": {"properties": {"phase": {"type": "string"}}}
                }
            },
            "io.k8s.api.core.v1.Node": {
                "x-kubernetes-group-version-kind": [{"group": "", "version": "v1", "kind": "Node"}],
                "properties": {
                    "spec": {"properties": {"unschedulable": {"type": "boolean"}}}
                }
            },
            "io.k8s.api.apps.v1.Deployment": {
                "x-kubernetes-group-version-kind": [
                    {"group": "apps", "version": "v1", "kind": "Deployment"}
                ],
                "properties": {
                    "spec": {"properties": {"replicas": {"type": "integer", "format": "int32"}}},
                    "status": {"properties": {"readyReplicas": {"type": "integer"}}}
                }
            },
            "io.k8s.api.autoscaling.v1.Scale": {
                "x-kubernetes-group-version-kind": [
                    {"group": "autoscaling", "version": "v1", "kind": "Scale"}
                ],
                "properties": {
                    "spec": {"properties": {"replicas": {"type": "integer"}}}
                }
            }
        }
    });
    OpenApiSchemas::from_document(&document).expect("test document parses")
}

fn announcements() -> Vec<APIResourceList> {
    vec![
        APIResourceList {
            group_version: "v1".to_string(),
            resources: vec![
                APIResource {
                    short_names: Some(vec!["po".to_string()]),
                    categories: Some(vec!["all".to_string()]),
                    ..descriptor("pods", "Pod")
                },
                descriptor("pods/status", "Pod"),
                APIResource {
                    namespaced: false,
                    short_names: Some(vec!["no".to_string()]),
                    ..descriptor("nodes", "Node")
                },
            ],
        },
        APIResourceList {
            group_version: "apps/v1".to_string(),
            resources: vec![
                APIResource {
                    short_names: Some(vec!["deploy".to_string()]),
                    ..descriptor("deployments", "Deployment")
                },
                descriptor("deployments/status", "Deployment"),
                APIResource {
                    group: Some("autoscaling".to_string()),
                    version: Some("v1".to_string()),
                    ..descriptor("deployments/scale", "Scale")
                },
            ],
        },
    ]
}

/// pods and nodes in the core group, deployments in apps/v1
pub fn catalog() -> Resources {
    Parser::new(announcements(), schemas())
        .discover()
        .expect("test discovery succeeds")
}
