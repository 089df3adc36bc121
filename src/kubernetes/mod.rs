// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! kube-backed collaborators for the catalog: cluster connection, discovery
//! snapshot fetching, and the on-disk snapshot cache.

mod cache;
mod client;
pub mod discovery;

pub use cache::SnapshotCache;
pub use client::{ClusterConnection, connect};
pub use discovery::ServerSnapshot;
