// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Discovery, indexing and filtering of the resource types served by an API server.
//!
//! The entry point is [`Parser`], which pulls the per-group-version resource
//! announcements from a [`DiscoverySource`], resolves a structural schema for
//! each resource through a [`SchemaLookup`], and builds a [`Resources`]
//! catalog keyed by plural resource name. Subresources (`deployments/status`,
//! `deployments/scale`, ...) are attached to the resource that owns them.
//!
//! Catalogs are narrowed down with [`Filter`] implementations:
//!
//! ```ignore
//! let parser = Parser::new(&snapshot, &schemas);
//! let catalog = parser.discover()?;
//! let scalable = catalog.filter(
//!     &AndFilter::new()
//!         .with(FieldFilter::new(["spec", "replicas"]))
//!         .with(SkipSubresourceFilter),
//! );
//! for name in scalable.sort_keys() {
//!     println!("{name}");
//! }
//! ```

pub mod filter;
pub mod parser;
pub mod resource;
pub mod resources;
pub mod schema;

#[cfg(test)]
pub(crate) mod fixtures;

pub use filter::{AndFilter, EmptyFilter, FieldFilter, Filter, OrFilter, SkipSubresourceFilter};
pub use parser::{DiscoverySource, GroupVersionRestriction, Parser};
pub use resource::{FieldSlot, ParentRef, Resource, SubResource};
pub use resources::Resources;
pub use schema::{Definitions, OpenApiSchemas, Schema, SchemaKind, SchemaLookup};

/// Errors produced by the catalog.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The discovery source could not return its announcements
    #[error(transparent)]
    Discovery(anyhow::Error),

    /// A field path does not resolve against an entity's schema
    #[error("field '{path}' not found in schema {schema}")]
    FieldNotFound { path: String, schema: String },

    /// A value on the way to a field is not a JSON object
    #[error("cannot reach field '{path}': parent value is not an object")]
    NotAnObject { path: String },

    /// The OpenAPI document could not be turned into schemas
    #[error("invalid OpenAPI document: {0}")]
    InvalidSchema(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Join a field path into its dotted form for messages
pub(crate) fn dotted<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(|segment| segment.as_ref())
        .collect::<Vec<_>>()
        .join(".")
}
