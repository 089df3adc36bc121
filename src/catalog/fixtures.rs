// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Shared test data: a trimmed-down OpenAPI document and discovery announcements
//! shaped like the ones a real API server returns.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIResource, APIResourceList};
use serde_json::{Value, json};

use super::parser::Parser;
use super::resources::Resources;
use super::schema::OpenApiSchemas;

pub fn openapi_document() -> Value {
    json!({
        "swagger": "2.0",
        "definitions": {
            "io.k8s.api.apps.v1.Deployment": {
                "type": "object",
                "properties": {
                    "apiVersion": {"type": "string"},
                    "kind": {"type": "string"},
                    "metadata": {
                        "$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta"
                    },
                    "spec": {"$ref": "#/definitions/io.k8s.api.apps.v1.DeploymentSpec"},
                    "status": {
                        "type": "object",
                        "properties": {
                            "replicas": {"type": "integer", "format": "int32"},
                            "readyReplicas": {"type": "integer", "format": "int32"}
                        }
                    }
                },
                "x-kubernetes-group-version-kind": [
                    {"group": "apps", "kind": "Deployment", "version": "v1"}
                ]
            },
            "io.k8s.api.extensions.v1beta1.Deployment": {
                "type": "object",
                "properties": {
                    "metadata": {
                        "$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta"
                    },
                    "spec": {"$ref": "#/definitions/io.k8s.api.apps.v1.DeploymentSpec"}
                },
                "x-kubernetes-group-version-kind": [
                    {"group": "extensions", "kind": "Deployment", "version": "v1beta1"}
                ]
            },
            "io.k8s.api.apps.v1.DeploymentSpec": {
                "type": "object",
                "properties": {
                    "replicas": {"type": "integer", "format": "int32"},
                    "paused": {"type": "boolean"},
                    "template": {"$ref": "#/definitions/io.k8s.api.core.v1.PodTemplateSpec"}
                }
            },
            "io.k8s.api.autoscaling.v1.Scale": {
                "type": "object",
                "properties": {
                    "metadata": {
                        "$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta"
                    },
                    "spec": {
                        "type": "object",
                        "properties": {"replicas": {"type": "integer", "format": "int32"}}
                    }
                },
                "x-kubernetes-group-version-kind": [
                    {"group": "autoscaling", "kind": "Scale", "version": "v1"}
                ]
            },
            "io.k8s.api.core.v1.Pod": {
                "type": "object",
                "properties": {
                    "metadata": {
                        "$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta"
                    },
                    "spec": {"$ref": "#/definitions/io.k8s.api.core.v1.PodSpec"},
                    "status": {
                        "type": "object",
                        "properties": {"phase": {"type": "string"}}
                    }
                },
                "x-kubernetes-group-version-kind": [
                    {"group": "", "kind": "Pod", "version": "v1"}
                ]
            },
            "io.k8s.api.core.v1.PodTemplateSpec": {
                "type": "object",
                "properties": {
                    "metadata": {
                        "$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta"
                    },
                    "spec": {"$ref": "#/definitions/io.k8s.api.core.v1.PodSpec"}
                }
            },
            "io.k8s.api.core.v1.PodSpec": {
                "type": "object",
                "properties": {
                    "nodeName": {"type": "string"},
                    "nodeSelector": {
                        "type": "object",
                        "additionalProperties": {"type": "string"}
                    },
                    "containers": {
                        "type": "array",
                        "items": {"$ref": "#/definitions/io.k8s.api.core.v1.Container"}
                    }
                }
            },
            "io.k8s.api.core.v1.Container": {
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "image": {"type": "string"}
                }
            },
            "io.k8s.api.core.v1.Node": {
                "type": "object",
                "properties": {
                    "metadata": {
                        "$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta"
                    },
                    "spec": {
                        "type": "object",
                        "properties": {"unschedulable": {"type": "boolean"}}
                    }
                },
                "x-kubernetes-group-version-kind": [
                    {"group": "", "kind": "Node", "version": "v1"}
                ]
            },
            "io.k8s.api.core.v1.Service": {
                "type": "object",
                "properties": {
                    "metadata": {
                        "$ref": "#/definitions/io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta"
                    },
                    "spec": {
                        "type": "object",
                        "properties": {"clusterIP": {"type": "string"}}
                    },
                    "status": {"type": "object", "properties": {}}
                },
                "x-kubernetes-group-version-kind": [
                    {"group": "", "kind": "Service", "version": "v1"}
                ]
            },
            "io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta": {
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "namespace": {"type": "string"},
                    "labels": {
                        "type": "object",
                        "additionalProperties": {"type": "string"}
                    },
                    "extra": {"$ref": "#/definitions/io.k8s.apimachinery.pkg.runtime.RawExtension"}
                }
            },
            "io.k8s.apimachinery.pkg.runtime.RawExtension": {
                "type": "object"
            }
        }
    })
}

pub fn schemas() -> OpenApiSchemas {
    OpenApiSchemas::from_document(&openapi_document()).expect("fixture document parses")
}

pub fn descriptor(name: &str, kind: &str) -> APIResource {
    APIResource {
        name: name.to_string(),
        kind: kind.to_string(),
        namespaced: true,
        verbs: vec!["get".to_string(), "list".to_string()],
        ..Default::default()
    }
}

pub fn descriptor_in(name: &str, kind: &str, group: &str, version: &str) -> APIResource {
    APIResource {
        group: Some(group.to_string()),
        version: Some(version.to_string()),
        ..descriptor(name, kind)
    }
}

pub fn announcement(group_version: &str, resources: Vec<APIResource>) -> APIResourceList {
    APIResourceList {
        group_version: group_version.to_string(),
        resources,
    }
}

/// Announcements resembling a small cluster, in server preference order
pub fn announcements() -> Vec<APIResourceList> {
    vec![
        announcement(
            "v1",
            vec![
                descriptor("pods", "Pod"),
                descriptor("pods/status", "Pod"),
                descriptor("pods/log", "Pod"),
                APIResource {
                    namespaced: false,
                    ..descriptor("nodes", "Node")
                },
                descriptor("services", "Service"),
                descriptor("services/status", "Service"),
                descriptor("services/proxy", "ServiceProxyOptions"),
                descriptor("configmaps", "ConfigMap"),
            ],
        ),
        announcement(
            "extensions/v1beta1",
            vec![descriptor("deployments", "Deployment")],
        ),
        announcement(
            "apps/v1",
            vec![
                descriptor("deployments", "Deployment"),
                descriptor("deployments/status", "Deployment"),
                descriptor_in("deployments/scale", "Scale", "autoscaling", "v1"),
            ],
        ),
    ]
}

pub fn catalog() -> Resources {
    Parser::new(announcements(), schemas())
        .discover()
        .expect("fixture discovery succeeds")
}
