// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use std::collections::HashMap;

use super::filter::Filter;
use super::resource::{Resource, SubResource};

/// The set of resources found on an API server.
///
/// Maps a plural resource name to every resource serving that name, ordered
/// by server preference (one entry per group/version).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resources {
    by_name: HashMap<String, Vec<Resource>>,
}

impl From<HashMap<String, Vec<Resource>>> for Resources {
    fn from(by_name: HashMap<String, Vec<Resource>>) -> Self {
        Self { by_name }
    }
}

impl FromIterator<Resource> for Resources {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        let mut resources = Resources::new();
        for resource in iter {
            resources.insert(resource);
        }
        resources
    }
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resource after any already stored under the same name
    pub fn insert(&mut self, resource: Resource) {
        self.by_name
            .entry(resource.name().to_string())
            .or_default()
            .push(resource);
    }

    pub fn get(&self, name: &str) -> Option<&[Resource]> {
        self.by_name.get(name).map(Vec::as_slice)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Vec<Resource>> {
        self.by_name.get_mut(name)
    }

    /// Number of distinct resource names
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Number of resources across all names and group/versions
    pub fn resource_count(&self) -> usize {
        self.by_name.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Resource])> {
        self.by_name
            .iter()
            .map(|(name, versions)| (name.as_str(), versions.as_slice()))
    }

    /// Resource names in lexicographic order
    pub fn sort_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Copy of the catalog holding only what `filter` accepts.
    ///
    /// Rejected resources disappear together with their subresources. Kept
    /// resources are copied with their subresource list narrowed to the
    /// accepted subresources; a resource left with none is still kept.
    pub fn filter<F: Filter + ?Sized>(&self, filter: &F) -> Resources {
        let mut filtered = Resources::new();
        for (name, versions) in &self.by_name {
            for resource in versions {
                if !filter.resource(resource) {
                    continue;
                }
                filtered
                    .by_name
                    .entry(name.clone())
                    .or_default()
                    .push(Self::filter_sub_resources(resource, filter));
            }
        }
        filtered
    }

    /// Copy of `resource` with only the accepted subresources
    fn filter_sub_resources<F: Filter + ?Sized>(resource: &Resource, filter: &F) -> Resource {
        Resource {
            descriptor: resource.descriptor.clone(),
            api_group_version: resource.api_group_version.clone(),
            schema: resource.schema.clone(),
            sub_resources: resource
                .sub_resources
                .iter()
                .filter(|sub_resource| filter.sub_resource(sub_resource))
                .cloned()
                .collect(),
        }
    }

    /// Resource owning `sub_resource`, if it is part of this catalog
    pub fn parent_of(&self, sub_resource: &SubResource) -> Option<&Resource> {
        self.get(&sub_resource.parent.name)?
            .iter()
            .find(|resource| resource.api_group_version == sub_resource.parent.group_version)
    }
}
