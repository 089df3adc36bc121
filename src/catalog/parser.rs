// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Two-pass indexing of discovery announcements into a [`Resources`] catalog.
//!
//! Pass one indexes every top-level resource that has a schema. Pass two
//! walks the same announcements again and attaches `parent/sub` entries to
//! the resource indexed under the same group, version and parent name.
//! Missing schemas, unmatched group/versions and orphaned subresources are
//! skipped without error: real API servers routinely announce kinds that
//! have no published schema.

use std::collections::HashMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIResource, APIResourceList};
use kube::core::{GroupVersion, GroupVersionKind};
use tracing::{debug, trace};

use super::resource::{ParentRef, Resource, SubResource};
use super::resources::Resources;
use super::schema::{Schema, SchemaLookup};
use super::{Error, Result};

/// Version assumed for an announcement with an empty group/version string
const DEFAULT_VERSION: &str = "v1";

/// Source of per-group-version resource announcements
pub trait DiscoverySource {
    fn server_resources(&self) -> anyhow::Result<Vec<APIResourceList>>;
}

impl<T: DiscoverySource + ?Sized> DiscoverySource for &T {
    fn server_resources(&self) -> anyhow::Result<Vec<APIResourceList>> {
        (**self).server_resources()
    }
}

/// A fixed list of announcements
impl DiscoverySource for Vec<APIResourceList> {
    fn server_resources(&self) -> anyhow::Result<Vec<APIResourceList>> {
        Ok(self.clone())
    }
}

/// Optional restriction of discovery to one API group and/or version.
///
/// `None` matches anything. `Some("")` as the group selects the core group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupVersionRestriction {
    pub group: Option<String>,
    pub version: Option<String>,
}

impl GroupVersionRestriction {
    /// Restriction where an empty group or version matches anything
    pub fn new(group: impl Into<String>, version: impl Into<String>) -> Self {
        let non_empty = |value: String| Some(value).filter(|value| !value.is_empty());
        Self {
            group: non_empty(group.into()),
            version: non_empty(version.into()),
        }
    }

    /// Only the given group; "" is the core group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.group.is_none() && self.version.is_none()
    }

    pub fn matches(&self, group: &str, version: &str) -> bool {
        self.group.as_deref().is_none_or(|expected| expected == group)
            && self.version.as_deref().is_none_or(|expected| expected == version)
    }
}

/// Index key of a top-level resource: (group, version, plural name)
type ResourceKey = (String, String, String);

/// Discovers resources from an API server and indexes them into a catalog
pub struct Parser<D, S> {
    discovery: D,
    schemas: S,
    restriction: GroupVersionRestriction,
}

impl<D: DiscoverySource, S: SchemaLookup> Parser<D, S> {
    pub fn new(discovery: D, schemas: S) -> Self {
        Self {
            discovery,
            schemas,
            restriction: GroupVersionRestriction::default(),
        }
    }

    pub fn with_restriction(mut self, restriction: GroupVersionRestriction) -> Self {
        self.restriction = restriction;
        self
    }

    pub fn restriction(&self) -> &GroupVersionRestriction {
        &self.restriction
    }

    /// Discover and index resources from the API server.
    ///
    /// Each name maps to the resources serving it, in the order the server
    /// announced them. Only a failing discovery source is an error.
    pub fn discover(&self) -> Result<Resources> {
        let announcements = self
            .discovery
            .server_resources()
            .map_err(Error::Discovery)?;

        let (mut resources, by_key) = self.index_resources(&announcements);
        let attached = self.attach_sub_resources(&announcements, &mut resources, &by_key);

        let catalog = Resources::from(resources);
        debug!(
            announcements = announcements.len(),
            names = catalog.len(),
            resources = catalog.resource_count(),
            sub_resources = attached,
            "Indexed API resources"
        );
        Ok(catalog)
    }

    /// Announcements passing the restriction, with their derived group and version
    fn matching<'a>(
        &'a self,
        announcements: &'a [APIResourceList],
    ) -> impl Iterator<Item = (String, String, &'a APIResourceList)> + 'a {
        announcements.iter().filter_map(move |list| {
            let (group, version) = split_group_version(&list.group_version);
            if self.restriction.matches(&group, &version) {
                Some((group, version, list))
            } else {
                trace!(
                    group_version = %list.group_version,
                    "Group/version excluded by restriction"
                );
                None
            }
        })
    }

    fn lookup_schema(&self, descriptor: &APIResource) -> Option<Schema> {
        let gvk = GroupVersionKind::gvk(
            descriptor.group.as_deref().unwrap_or_default(),
            descriptor.version.as_deref().unwrap_or_default(),
            &descriptor.kind,
        );
        let schema = self.schemas.lookup_resource(&gvk);
        if schema.is_none() {
            trace!(
                name = %descriptor.name,
                group = %gvk.group,
                version = %gvk.version,
                kind = %gvk.kind,
                "No schema published, skipping"
            );
        }
        schema
    }

    /// Pass one: index every top-level resource with a schema
    fn index_resources(
        &self,
        announcements: &[APIResourceList],
    ) -> (HashMap<String, Vec<Resource>>, HashMap<ResourceKey, usize>) {
        let mut resources: HashMap<String, Vec<Resource>> = HashMap::new();
        let mut by_key = HashMap::new();

        for (group, version, list) in self.matching(announcements) {
            for descriptor in &list.resources {
                let (name, sub_resource) = split_sub_resource(&descriptor.name);
                if sub_resource.is_some() {
                    continue;
                }

                let mut descriptor = descriptor.clone();
                default_group_version(&mut descriptor, &group, &version);
                let Some(schema) = self.lookup_schema(&descriptor) else {
                    continue;
                };

                let entries = resources.entry(name.to_string()).or_default();
                by_key.insert(
                    (group.clone(), version.clone(), name.to_string()),
                    entries.len(),
                );
                entries.push(Resource {
                    descriptor,
                    api_group_version: GroupVersion::gv(&group, &version),
                    schema,
                    sub_resources: Vec::new(),
                });
            }
        }

        (resources, by_key)
    }

    /// Pass two: attach subresources to the parents indexed in pass one.
    /// Returns the number of attached subresources.
    fn attach_sub_resources(
        &self,
        announcements: &[APIResourceList],
        resources: &mut HashMap<String, Vec<Resource>>,
        by_key: &HashMap<ResourceKey, usize>,
    ) -> usize {
        let mut attached = 0;

        for (group, version, list) in self.matching(announcements) {
            for descriptor in &list.resources {
                let (parent_name, Some(_)) = split_sub_resource(&descriptor.name) else {
                    continue;
                };

                let mut descriptor = descriptor.clone();
                default_group_version(&mut descriptor, &group, &version);
                let Some(schema) = self.lookup_schema(&descriptor) else {
                    continue;
                };

                // The parent may have been skipped in pass one
                let key = (group.clone(), version.clone(), parent_name.to_string());
                let Some(parent) = by_key
                    .get(&key)
                    .and_then(|&index| resources.get_mut(parent_name)?.get_mut(index))
                else {
                    trace!(
                        name = %descriptor.name,
                        group = %group,
                        version = %version,
                        "Parent resource not indexed, skipping subresource"
                    );
                    continue;
                };

                parent.sub_resources.push(SubResource {
                    descriptor,
                    parent: ParentRef {
                        name: parent_name.to_string(),
                        group_version: GroupVersion::gv(&group, &version),
                    },
                    api_group_version: GroupVersion::gv(&group, &version),
                    schema,
                });
                attached += 1;
            }
        }

        attached
    }
}

/// Split an announcement's `groupVersion` into group and version.
///
/// `apps/v1` is ("apps", "v1"), `v1` is the core group ("", "v1"), and an
/// empty string falls back to ("", "v1").
pub fn split_group_version(group_version: &str) -> (String, String) {
    if group_version.is_empty() {
        return (String::new(), DEFAULT_VERSION.to_string());
    }
    let mut parts = group_version.split('/');
    match (parts.next(), parts.next()) {
        (Some(group), Some(version)) => (group.to_string(), version.to_string()),
        (Some(version), None) => (String::new(), version.to_string()),
        _ => (String::new(), DEFAULT_VERSION.to_string()),
    }
}

/// Split a descriptor name into the resource name and, for `parent/sub`, the subresource name
pub fn split_sub_resource(name: &str) -> (&str, Option<&str>) {
    let mut parts = name.split('/');
    let resource = parts.next().unwrap_or_default();
    (resource, parts.next())
}

/// Fill a descriptor's missing group and version from its announcement.
/// An empty group stays empty: it names the core group.
pub fn default_group_version(descriptor: &mut APIResource, group: &str, version: &str) {
    if descriptor.group.as_deref().is_none_or(str::is_empty) {
        descriptor.group = Some(group.to_string());
    }
    if descriptor.version.as_deref().is_none_or(str::is_empty) {
        descriptor.version = Some(version.to_string());
    }
}
