// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use anyhow::{Context, Result, anyhow};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::time::Duration;
use tracing::info;

/// Timeout for connecting to K8s API
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for reading K8s API responses
/// The OpenAPI document of a large cluster runs into tens of megabytes
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// A client bound to one kubeconfig context
pub struct ClusterConnection {
    pub context: String,
    pub client: Client,
}

/// Connect to the given context, or the kubeconfig's current context
pub async fn connect(context: Option<&str>) -> Result<ClusterConnection> {
    let kubeconfig = Kubeconfig::read().context("Failed to read kubeconfig")?;

    let available: Vec<String> = kubeconfig.contexts.iter().map(|c| c.name.clone()).collect();
    let context_name =
        select_context(&available, kubeconfig.current_context.as_deref(), context)?;

    let start = std::time::Instant::now();
    let mut config = Config::from_custom_kubeconfig(
        kubeconfig,
        &KubeConfigOptions {
            context: Some(context_name.clone()),
            ..Default::default()
        },
    )
    .await
    .with_context(|| format!("Failed to load kubeconfig for context '{}'", context_name))?;

    // Set timeouts for reliability
    config.connect_timeout = Some(CONNECT_TIMEOUT);
    config.read_timeout = Some(READ_TIMEOUT);

    let client = Client::try_from(config)
        .with_context(|| format!("Failed to create client for context '{}'", context_name))?;

    info!(
        context = %context_name,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Created client"
    );

    Ok(ClusterConnection {
        context: context_name,
        client,
    })
}

/// Pick the context to use: the requested one if it exists, else the current one
fn select_context(
    available: &[String],
    current: Option<&str>,
    requested: Option<&str>,
) -> Result<String> {
    let context_name = requested
        .or(current)
        .ok_or_else(|| anyhow!("No context specified and no current context in kubeconfig"))?;

    if !available.iter().any(|c| c == context_name) {
        return Err(anyhow!("Context '{}' not found in kubeconfig", context_name));
    }

    Ok(context_name.to_string())
}
