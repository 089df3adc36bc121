// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Discover, index and filter the resource types served by a Kubernetes API server.
//!
//! [`catalog`] holds the I/O-free core: the parser that indexes discovery
//! announcements, the structural schemas, and the filters. [`kubernetes`]
//! fetches the announcements and OpenAPI document from a live cluster and
//! caches them per context.

pub mod catalog;
pub mod config;
pub mod kubernetes;

pub use catalog::{Error, Resource, Resources, SubResource};
