// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Resource discovery for Kubernetes clusters.
//!
//! Fetches every group/version's resource announcement plus the OpenAPI v2
//! document, and keeps them as a [`ServerSnapshot`] the catalog parser can
//! index without further I/O.

use anyhow::{Context, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use kube::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::catalog::{DiscoverySource, OpenApiSchemas};

/// Path of the aggregated swagger 2.0 document
const OPENAPI_V2_PATH: &str = "/openapi/v2";

/// Everything discovery needs from a cluster, fetched in one go
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSnapshot {
    /// Resource announcements in server preference order
    pub announcements: Vec<APIResourceList>,
    /// Raw OpenAPI v2 document
    pub openapi: Value,
}

impl ServerSnapshot {
    /// Fetch announcements and the OpenAPI document from the cluster
    pub async fn fetch(client: &Client) -> Result<Self> {
        let announcements = fetch_announcements(client).await?;
        let openapi = fetch_openapi(client).await?;
        Ok(Self {
            announcements,
            openapi,
        })
    }

    /// Schemas indexed from the snapshot's OpenAPI document
    pub fn schemas(&self) -> Result<OpenApiSchemas> {
        OpenApiSchemas::from_document(&self.openapi).context("Failed to load OpenAPI schemas")
    }
}

impl DiscoverySource for ServerSnapshot {
    fn server_resources(&self) -> Result<Vec<APIResourceList>> {
        Ok(self.announcements.clone())
    }
}

/// Fetch the resource lists of the core API and every API group version
///
/// Order follows the server: core versions first, then each group's
/// versions as listed by `/apis` (preferred version first).
pub async fn fetch_announcements(client: &Client) -> Result<Vec<APIResourceList>> {
    let mut announcements = Vec::new();

    let core = client
        .list_core_api_versions()
        .await
        .context("Failed to list core API versions")?;
    for version in &core.versions {
        let list = client
            .list_core_api_resources(version)
            .await
            .with_context(|| format!("Failed to list core API resources for {}", version))?;
        announcements.push(list);
    }

    let groups = client
        .list_api_groups()
        .await
        .context("Failed to list API groups")?;
    for group in &groups.groups {
        for version in &group.versions {
            let list = client
                .list_api_group_resources(&version.group_version)
                .await
                .with_context(|| {
                    format!("Failed to list API resources for {}", version.group_version)
                })?;
            announcements.push(list);
        }
    }

    debug!(
        group_versions = announcements.len(),
        resources = announcements.iter().map(|l| l.resources.len()).sum::<usize>(),
        "Fetched API resource announcements"
    );
    Ok(announcements)
}

/// Fetch and parse the cluster's OpenAPI v2 document
pub async fn fetch_openapi(client: &Client) -> Result<Value> {
    let request = http::Request::get(OPENAPI_V2_PATH)
        .header(http::header::ACCEPT, "application/json")
        .body(Vec::new())
        .context("Failed to build OpenAPI request")?;

    let body = client
        .request_text(request)
        .await
        .with_context(|| format!("Failed to fetch {}", OPENAPI_V2_PATH))?;
    debug!(bytes = body.len(), "Fetched OpenAPI document");

    serde_json::from_str(&body).context("Failed to parse OpenAPI document")
}
