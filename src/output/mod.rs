// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Rendering of catalog views as tables, JSON or YAML

mod json;
mod table;
mod yaml;

pub use json::JsonFormatter;
pub use table::TableFormatter;
pub use yaml::YamlFormatter;

use anyhow::{Result, bail};
use k8scatalog::catalog::{FieldFilter, Resource, Resources};
use serde_json::{Map, Value};

use crate::cli::OutputFormat;

/// Display name of the core API group
const CORE_GROUP: &str = "core";

/// Columns rendered as booleans in JSON/YAML output
const BOOLEAN_COLUMNS: &[&str] = &["namespaced", "has_field"];

/// Rows of a catalog view, ready for any output format
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CatalogTable {
    fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// One row per resource name and group/version, names sorted
    pub fn list_view(catalog: &Resources) -> Self {
        let mut table = Self::new(&[
            "name",
            "group",
            "version",
            "kind",
            "namespaced",
            "subresources",
            "short_names",
        ]);

        for name in catalog.sort_keys() {
            for resource in catalog.get(name).unwrap_or_default() {
                let (group, version) = group_version(resource);
                table.rows.push(vec![
                    name.to_string(),
                    group,
                    version,
                    resource.descriptor.kind.clone(),
                    resource.is_namespaced().to_string(),
                    resource.sub_resource_names().join(","),
                    join(resource.descriptor.short_names.as_deref()),
                ]);
            }
        }
        table
    }

    /// Every group/version serving `name`
    pub fn describe_view(catalog: &Resources, name: &str) -> Result<Self> {
        let mut table = Self::new(&[
            "group",
            "version",
            "kind",
            "namespaced",
            "verbs",
            "categories",
            "subresources",
        ]);

        for resource in versions(catalog, name)? {
            let (group, version) = group_version(resource);
            table.rows.push(vec![
                group,
                version,
                resource.descriptor.kind.clone(),
                resource.is_namespaced().to_string(),
                resource.descriptor.verbs.join(","),
                join(resource.descriptor.categories.as_deref()),
                resource.sub_resource_names().join(","),
            ]);
        }
        Ok(table)
    }

    /// Whether each version of `name`, and each of its subresources, has `path`
    pub fn field_view(catalog: &Resources, name: &str, path: &str) -> Result<Self> {
        let path = FieldFilter::from_dotted(path);
        let mut table = Self::new(&["group", "version", "resource", "has_field"]);

        for resource in versions(catalog, name)? {
            let (group, version) = group_version(resource);
            table.rows.push(vec![
                group.clone(),
                version.clone(),
                resource.name().to_string(),
                resource.has_field(path.path()).to_string(),
            ]);
            for sub_resource in &resource.sub_resources {
                table.rows.push(vec![
                    group.clone(),
                    version.clone(),
                    sub_resource.name().to_string(),
                    sub_resource.has_field(path.path()).to_string(),
                ]);
            }
        }
        Ok(table)
    }

    pub fn format(&self, format: &OutputFormat, no_headers: bool) -> String {
        match format {
            OutputFormat::Table => TableFormatter::format(self, no_headers),
            OutputFormat::Json => JsonFormatter::format(self),
            OutputFormat::Yaml => YamlFormatter::format(self),
        }
    }

    /// Rows as objects keyed by column name
    pub fn to_json_rows(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(column, value)| (column.clone(), json_value(column, value)))
                    .collect()
            })
            .collect()
    }
}

fn versions<'a>(catalog: &'a Resources, name: &str) -> Result<&'a [Resource]> {
    match catalog.get(name) {
        Some(versions) => Ok(versions),
        None => bail!("Resource '{}' not found", name),
    }
}

fn group_version(resource: &Resource) -> (String, String) {
    let group_version = &resource.api_group_version;
    let group = if group_version.group.is_empty() {
        CORE_GROUP.to_string()
    } else {
        group_version.group.clone()
    };
    (group, group_version.version.clone())
}

fn join(values: Option<&[String]>) -> String {
    values.unwrap_or_default().join(",")
}

fn json_value(column: &str, value: &str) -> Value {
    if BOOLEAN_COLUMNS.contains(&column) {
        match value {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
    }
    Value::String(value.to_string())
}
