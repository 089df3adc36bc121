// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Structural schemas backed by the cluster's OpenAPI v2 document.
//!
//! Every definition in the document is reduced to a [`SchemaKind`] tree that
//! only keeps the shape of the data (objects, maps, arrays, primitives and
//! references to other definitions). Definitions carrying the
//! `x-kubernetes-group-version-kind` extension are indexed so a schema can be
//! looked up for a (group, version, kind) triple.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use kube::core::GroupVersionKind;
use serde_json::{Map, Value};
use tracing::debug;

use super::{Error, Result};

/// Prefix of local references inside a swagger 2.0 document
const DEFINITION_PREFIX: &str = "#/definitions/";

/// Vendor extension naming the kinds a definition is served as
const GVK_EXTENSION: &str = "x-kubernetes-group-version-kind";

/// Upper bound on reference chains followed while walking a schema
const MAX_REFERENCE_HOPS: usize = 64;

/// Shape of a schema node
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// Object with a fixed set of named fields
    Kind { fields: BTreeMap<String, SchemaKind> },
    /// Object with arbitrary keys, all holding the same type
    Map(Box<SchemaKind>),
    /// List of items
    Array(Box<SchemaKind>),
    /// Scalar value (string, integer, number, boolean)
    Primitive {
        type_name: String,
        format: Option<String>,
    },
    /// Reference to another named definition
    Reference(String),
    /// No type information, anything is allowed
    Arbitrary,
}

impl SchemaKind {
    /// Build a schema node from its OpenAPI JSON form
    pub fn from_json(value: &Value) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(Error::InvalidSchema(format!(
                "expected a schema object, found {}",
                value
            )));
        };

        if let Some(reference) = object.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| Error::InvalidSchema("$ref must be a string".to_string()))?;
            let name = reference.strip_prefix(DEFINITION_PREFIX).unwrap_or(reference);
            return Ok(SchemaKind::Reference(name.to_string()));
        }

        // Some generators wrap a lone reference in allOf
        if let Some(Value::Array(all_of)) = object.get("allOf")
            && let [single] = all_of.as_slice()
        {
            return Self::from_json(single);
        }

        if let Some(properties) = object.get("properties").and_then(Value::as_object) {
            let fields = properties
                .iter()
                .map(|(name, property)| Ok((name.clone(), Self::from_json(property)?)))
                .collect::<Result<BTreeMap<_, _>>>()?;
            return Ok(SchemaKind::Kind { fields });
        }

        match object.get("type").and_then(Value::as_str) {
            Some("array") => {
                let items = match object.get("items") {
                    Some(items) => Self::from_json(items)?,
                    None => SchemaKind::Arbitrary,
                };
                Ok(SchemaKind::Array(Box::new(items)))
            }
            Some("object") => match object.get("additionalProperties") {
                Some(values @ Value::Object(_)) => {
                    Ok(SchemaKind::Map(Box::new(Self::from_json(values)?)))
                }
                _ => Ok(SchemaKind::Arbitrary),
            },
            Some(type_name) => Ok(SchemaKind::Primitive {
                type_name: type_name.to_string(),
                format: object
                    .get("format")
                    .and_then(Value::as_str)
                    .map(String::from),
            }),
            None => Ok(SchemaKind::Arbitrary),
        }
    }
}

/// All named definitions of an OpenAPI document
#[derive(Debug, Default)]
pub struct Definitions {
    models: HashMap<String, SchemaKind>,
    /// (group, version, kind) to definition name
    by_gvk: HashMap<(String, String, String), String>,
}

impl Definitions {
    /// Parse the `definitions` section of a swagger 2.0 document
    pub fn from_document(document: &Value) -> Result<Self> {
        let definitions = document
            .get("definitions")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::InvalidSchema("document has no definitions".to_string()))?;

        let mut parsed = Definitions::default();
        for (name, definition) in definitions {
            let model = SchemaKind::from_json(definition).map_err(|e| {
                Error::InvalidSchema(format!("definition {}: {}", name, e))
            })?;
            for gvk in Self::served_kinds(definition) {
                parsed.by_gvk.insert(gvk, name.clone());
            }
            parsed.models.insert(name.clone(), model);
        }

        debug!(
            definitions = parsed.models.len(),
            kinds = parsed.by_gvk.len(),
            "Parsed OpenAPI definitions"
        );
        Ok(parsed)
    }

    /// The (group, version, kind) triples a definition is served as
    fn served_kinds(definition: &Value) -> Vec<(String, String, String)> {
        let Some(entries) = definition.get(GVK_EXTENSION).and_then(Value::as_array) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(Value::as_object)
            .map(|entry: &Map<String, Value>| {
                let field = |key: &str| {
                    entry
                        .get(key)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                (field("group"), field("version"), field("kind"))
            })
            .collect()
    }

    pub fn model(&self, name: &str) -> Option<&SchemaKind> {
        self.models.get(name)
    }

    /// Name of the definition served as the given kind
    pub fn definition_for(&self, group: &str, version: &str, kind: &str) -> Option<&str> {
        self.by_gvk
            .get(&(group.to_string(), version.to_string(), kind.to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Schema of one resource: a named definition plus the definitions it may reference
#[derive(Debug, Clone)]
pub struct Schema {
    definitions: Arc<Definitions>,
    name: String,
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.definitions, &other.definitions)
    }
}

impl Schema {
    /// Definition name, e.g. `io.k8s.api.apps.v1.Deployment`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> Option<&SchemaKind> {
        self.definitions.model(&self.name)
    }

    /// Follow references until a concrete node is reached
    fn resolve<'a>(&'a self, node: &'a SchemaKind) -> Option<&'a SchemaKind> {
        let mut node = node;
        for _ in 0..MAX_REFERENCE_HOPS {
            match node {
                SchemaKind::Reference(name) => node = self.definitions.model(name)?,
                _ => return Some(node),
            }
        }
        None
    }

    /// Step from a node into the child named `segment`.
    /// Arrays are transparent: the step applies to their items.
    fn descend<'a>(&'a self, node: &'a SchemaKind, segment: &str) -> Option<&'a SchemaKind> {
        let mut node = node;
        for _ in 0..MAX_REFERENCE_HOPS {
            let SchemaKind::Array(items) = node else {
                break;
            };
            node = self.resolve(items)?;
        }

        let child = match node {
            SchemaKind::Kind { fields } => fields.get(segment)?,
            SchemaKind::Map(values) => values.as_ref(),
            SchemaKind::Arbitrary => return Some(node),
            SchemaKind::Primitive { .. } | SchemaKind::Array(_) | SchemaKind::Reference(_) => {
                return None;
            }
        };
        self.resolve(child)
    }

    /// Node found at `path`, or None if any segment is missing
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> Option<&SchemaKind> {
        let mut node = self.resolve(self.root()?)?;
        for segment in path {
            node = self.descend(node, segment.as_ref())?;
        }
        Some(node)
    }

    pub fn has_field<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.lookup(path).is_some()
    }
}

/// Resolves the structural schema of a (group, version, kind)
pub trait SchemaLookup {
    fn lookup_resource(&self, gvk: &GroupVersionKind) -> Option<Schema>;
}

impl<T: SchemaLookup + ?Sized> SchemaLookup for &T {
    fn lookup_resource(&self, gvk: &GroupVersionKind) -> Option<Schema> {
        (**self).lookup_resource(gvk)
    }
}

/// [`SchemaLookup`] over a parsed OpenAPI v2 document
#[derive(Debug, Clone)]
pub struct OpenApiSchemas {
    definitions: Arc<Definitions>,
}

impl OpenApiSchemas {
    pub fn from_document(document: &Value) -> Result<Self> {
        Ok(Self {
            definitions: Arc::new(Definitions::from_document(document)?),
        })
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }
}

impl SchemaLookup for OpenApiSchemas {
    fn lookup_resource(&self, gvk: &GroupVersionKind) -> Option<Schema> {
        let name = self
            .definitions
            .definition_for(&gvk.group, &gvk.version, &gvk.kind)?;
        Some(Schema {
            definitions: Arc::clone(&self.definitions),
            name: name.to_string(),
        })
    }
}
