// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Predicates selecting resources and subresources out of a catalog.
//!
//! A [`Filter`] answers two questions: keep this resource, keep this
//! subresource. Both default to "yes", so a filter only overrides the
//! predicate it cares about. Filters are combined by containment through
//! [`AndFilter`] and [`OrFilter`].

use std::fmt;

use super::resource::{Resource, SubResource};

pub trait Filter {
    fn resource(&self, _resource: &Resource) -> bool {
        true
    }

    fn sub_resource(&self, _sub_resource: &SubResource) -> bool {
        true
    }
}

impl<F: Filter + ?Sized> Filter for &F {
    fn resource(&self, resource: &Resource) -> bool {
        (**self).resource(resource)
    }

    fn sub_resource(&self, sub_resource: &SubResource) -> bool {
        (**self).sub_resource(sub_resource)
    }
}

impl<F: Filter + ?Sized> Filter for Box<F> {
    fn resource(&self, resource: &Resource) -> bool {
        (**self).resource(resource)
    }

    fn sub_resource(&self, sub_resource: &SubResource) -> bool {
        (**self).sub_resource(sub_resource)
    }
}

/// Accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyFilter;

impl Filter for EmptyFilter {}

/// Accepts an entity only if every child filter does.
/// With no children it accepts everything.
#[derive(Default)]
pub struct AndFilter {
    pub filters: Vec<Box<dyn Filter>>,
}

impl AndFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl Filter + 'static) -> Self {
        self.push(filter);
        self
    }

    pub fn push(&mut self, filter: impl Filter + 'static) {
        self.filters.push(Box::new(filter));
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Filter for AndFilter {
    fn resource(&self, resource: &Resource) -> bool {
        self.filters.iter().all(|f| f.resource(resource))
    }

    fn sub_resource(&self, sub_resource: &SubResource) -> bool {
        self.filters.iter().all(|f| f.sub_resource(sub_resource))
    }
}

impl fmt::Debug for AndFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AndFilter")
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// Accepts an entity if at least one child filter does.
/// With no children it accepts nothing.
#[derive(Default)]
pub struct OrFilter {
    pub filters: Vec<Box<dyn Filter>>,
}

impl OrFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: impl Filter + 'static) -> Self {
        self.push(filter);
        self
    }

    pub fn push(&mut self, filter: impl Filter + 'static) {
        self.filters.push(Box::new(filter));
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Filter for OrFilter {
    fn resource(&self, resource: &Resource) -> bool {
        self.filters.iter().any(|f| f.resource(resource))
    }

    fn sub_resource(&self, sub_resource: &SubResource) -> bool {
        self.filters.iter().any(|f| f.sub_resource(sub_resource))
    }
}

impl fmt::Debug for OrFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrFilter")
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// Drops `*/status` subresources, keeps every resource
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipSubresourceFilter;

impl Filter for SkipSubresourceFilter {
    fn sub_resource(&self, sub_resource: &SubResource) -> bool {
        !sub_resource.name().ends_with("/status")
    }
}

/// Keeps resources whose schema has the given field path.
///
/// Subresources are not judged; combine with another filter through
/// [`AndFilter`] or [`OrFilter`] to narrow those down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    path: Vec<String>,
}

impl FieldFilter {
    pub fn new<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from a dotted path such as `spec.template.spec`
    pub fn from_dotted(path: &str) -> Self {
        Self::new(path.split('.').filter(|segment| !segment.is_empty()))
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }
}

impl Filter for FieldFilter {
    fn resource(&self, resource: &Resource) -> bool {
        resource.has_field(self.path.as_slice())
    }
}
