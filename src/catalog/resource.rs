// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Catalog entities: resources, their subresources, and schema-checked field access.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResource;
use kube::core::{GroupVersion, GroupVersionKind};
use serde_json::{Map, Value};

use super::schema::Schema;
use super::{Error, dotted};

/// A resource served by the API server in one group/version
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Discovery descriptor, with group and version defaulted from the announcement
    pub descriptor: APIResource,
    /// Group/version of the announcement that served this resource
    pub api_group_version: GroupVersion,
    pub schema: Schema,
    /// Subresources in discovery order
    pub sub_resources: Vec<SubResource>,
}

/// Identity of the resource owning a subresource.
///
/// Only used to navigate back to the parent (see [`super::Resources::parent_of`]);
/// the parent owns the subresource, never the other way around.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParentRef {
    /// Plural resource name, e.g. "deployments"
    pub name: String,
    pub group_version: GroupVersion,
}

/// A subresource such as `deployments/status` or `deployments/scale`
#[derive(Debug, Clone, PartialEq)]
pub struct SubResource {
    /// Discovery descriptor; the name keeps the full `parent/sub` form
    pub descriptor: APIResource,
    pub parent: ParentRef,
    pub api_group_version: GroupVersion,
    pub schema: Schema,
}

impl Resource {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn is_namespaced(&self) -> bool {
        self.descriptor.namespaced
    }

    /// Whether every segment of `path` exists in the resource schema
    pub fn has_field<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.schema.has_field(path)
    }

    /// Hand the location of `path` inside `object` to `accessor`.
    ///
    /// Fails with [`Error::FieldNotFound`] when the path is not part of the schema.
    /// Errors returned by the accessor are passed through untouched.
    pub fn field<S, T, E, F>(&self, path: &[S], object: &mut Value, accessor: F) -> Result<T, E>
    where
        S: AsRef<str>,
        E: From<Error>,
        F: FnOnce(FieldSlot<'_>) -> Result<T, E>,
    {
        access_field(&self.schema, path, object, accessor)
    }

    /// Announcement group/version combined with the descriptor kind
    pub fn group_version_kind(&self) -> GroupVersionKind {
        with_kind(&self.api_group_version, &self.descriptor.kind)
    }

    /// Group/version/kind exactly as recorded on the descriptor
    pub fn resource_group_version_kind(&self) -> GroupVersionKind {
        descriptor_gvk(&self.descriptor)
    }

    /// Back-reference handed to this resource's subresources
    pub fn parent_ref(&self) -> ParentRef {
        ParentRef {
            name: self.descriptor.name.clone(),
            group_version: self.api_group_version.clone(),
        }
    }

    /// Names of the attached subresources, e.g. ["status", "scale"]
    pub fn sub_resource_names(&self) -> Vec<&str> {
        self.sub_resources
            .iter()
            .map(SubResource::sub_resource_name)
            .collect()
    }
}

impl SubResource {
    /// Full descriptor name, e.g. "deployments/status"
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Segment after the slash, e.g. "status"
    pub fn sub_resource_name(&self) -> &str {
        self.descriptor
            .name
            .split_once('/')
            .map_or(self.descriptor.name.as_str(), |(_, sub)| sub)
    }

    pub fn has_field<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.schema.has_field(path)
    }

    /// See [`Resource::field`]
    pub fn field<S, T, E, F>(&self, path: &[S], object: &mut Value, accessor: F) -> Result<T, E>
    where
        S: AsRef<str>,
        E: From<Error>,
        F: FnOnce(FieldSlot<'_>) -> Result<T, E>,
    {
        access_field(&self.schema, path, object, accessor)
    }

    pub fn group_version_kind(&self) -> GroupVersionKind {
        with_kind(&self.api_group_version, &self.descriptor.kind)
    }

    pub fn resource_group_version_kind(&self) -> GroupVersionKind {
        descriptor_gvk(&self.descriptor)
    }
}

fn with_kind(group_version: &GroupVersion, kind: &str) -> GroupVersionKind {
    GroupVersionKind::gvk(&group_version.group, &group_version.version, kind)
}

fn descriptor_gvk(descriptor: &APIResource) -> GroupVersionKind {
    GroupVersionKind::gvk(
        descriptor.group.as_deref().unwrap_or_default(),
        descriptor.version.as_deref().unwrap_or_default(),
        &descriptor.kind,
    )
}

fn access_field<S, T, E, F>(
    schema: &Schema,
    path: &[S],
    object: &mut Value,
    accessor: F,
) -> Result<T, E>
where
    S: AsRef<str>,
    E: From<Error>,
    F: FnOnce(FieldSlot<'_>) -> Result<T, E>,
{
    if path.is_empty() || !schema.has_field(path) {
        return Err(Error::FieldNotFound {
            path: dotted(path),
            schema: schema.name().to_string(),
        }
        .into());
    }

    accessor(FieldSlot {
        object,
        path: path.iter().map(|s| s.as_ref().to_string()).collect(),
    })
}

/// Location of a schema-validated field inside a live object.
///
/// The path is known to exist in the schema; whether the object actually
/// carries a value there is up to the object.
#[derive(Debug)]
pub struct FieldSlot<'a> {
    object: &'a mut Value,
    path: Vec<String>,
}

impl<'a> FieldSlot<'a> {
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Current value at the field, if present
    pub fn get(&self) -> Option<&Value> {
        let mut current: &Value = &*self.object;
        for segment in &self.path {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    pub fn get_mut(&mut self) -> Option<&mut Value> {
        let mut current: &mut Value = &mut *self.object;
        for segment in &self.path {
            current = current.as_object_mut()?.get_mut(segment)?;
        }
        Some(current)
    }

    /// Store `value` at the field, creating missing parent objects.
    /// Returns the previous value.
    pub fn set(self, value: Value) -> Result<Option<Value>, Error> {
        let not_an_object = || Error::NotAnObject {
            path: self.path.join("."),
        };
        let Some((leaf, parents)) = self.path.split_last() else {
            return Err(not_an_object());
        };

        let mut current: &mut Value = self.object;
        for segment in parents {
            current = match current {
                Value::Object(map) => map
                    .entry(segment.clone())
                    .or_insert_with(|| Value::Object(Map::new())),
                _ => return Err(not_an_object()),
            };
        }

        match current {
            Value::Object(map) => Ok(map.insert(leaf.clone(), value)),
            _ => Err(not_an_object()),
        }
    }

    /// Remove the field from the object and return its value
    pub fn take(self) -> Option<Value> {
        let (leaf, parents) = self.path.split_last()?;
        let mut current: &mut Value = self.object;
        for segment in parents {
            current = current.as_object_mut()?.get_mut(segment)?;
        }
        current.as_object_mut()?.remove(leaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;
    use serde_json::json;

    fn deployment() -> Resource {
        fixtures::catalog().get("deployments").unwrap()[1].clone()
    }

    fn nginx() -> Value {
        json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {"name": "nginx"},
            "spec": {"replicas": 3}
        })
    }

    #[derive(Debug)]
    enum AccessError {
        Catalog(Error),
        Rejected(String),
    }

    impl From<Error> for AccessError {
        fn from(e: Error) -> Self {
            AccessError::Catalog(e)
        }
    }

    #[test]
    fn test_group_version_kind() {
        let deployment = deployment();
        assert_eq!(
            deployment.group_version_kind(),
            GroupVersionKind::gvk("apps", "v1", "Deployment")
        );
        assert_eq!(
            deployment.resource_group_version_kind(),
            GroupVersionKind::gvk("apps", "v1", "Deployment")
        );
    }

    #[test]
    fn test_sub_resource_group_version_kinds_differ() {
        let deployment = deployment();
        let scale = deployment
            .sub_resources
            .iter()
            .find(|s| s.sub_resource_name() == "scale")
            .unwrap();
        // Served from apps/v1, but the descriptor announces autoscaling/v1 Scale
        assert_eq!(
            scale.group_version_kind(),
            GroupVersionKind::gvk("apps", "v1", "Scale")
        );
        assert_eq!(
            scale.resource_group_version_kind(),
            GroupVersionKind::gvk("autoscaling", "v1", "Scale")
        );
    }

    #[test]
    fn test_sub_resource_names() {
        let deployment = deployment();
        assert_eq!(deployment.sub_resource_names(), vec!["status", "scale"]);
        assert_eq!(deployment.sub_resources[0].name(), "deployments/status");
    }

    #[test]
    fn test_has_field_on_sub_resource() {
        let deployment = deployment();
        let scale = &deployment.sub_resources[1];
        assert!(scale.has_field(&["spec", "replicas"]));
        assert!(!scale.has_field(&["spec", "template"]));
    }

    #[test]
    fn test_field_reads_value() {
        let mut object = nginx();
        let replicas = deployment()
            .field(&["spec", "replicas"], &mut object, |slot| {
                Ok::<_, Error>(slot.get().and_then(Value::as_i64))
            })
            .unwrap();
        assert_eq!(replicas, Some(3));
    }

    #[test]
    fn test_field_absent_in_object() {
        let mut object = nginx();
        let paused = deployment()
            .field(&["spec", "paused"], &mut object, |slot| {
                Ok::<_, Error>(slot.get().cloned())
            })
            .unwrap();
        assert_eq!(paused, None);
    }

    #[test]
    fn test_field_sets_value_creating_parents() {
        let mut object = nginx();
        let previous = deployment()
            .field(
                &["spec", "template", "spec", "nodeName"],
                &mut object,
                |slot| slot.set(json!("node-1")),
            )
            .unwrap();
        assert_eq!(previous, None);
        assert_eq!(object["spec"]["template"]["spec"]["nodeName"], "node-1");
        assert_eq!(object["spec"]["replicas"], 3);
    }

    #[test]
    fn test_field_set_through_scalar_fails() {
        let mut object = json!({"spec": "not-an-object"});
        let err = deployment()
            .field(&["spec", "replicas"], &mut object, |slot| slot.set(json!(1)))
            .unwrap_err();
        assert!(matches!(err, Error::NotAnObject { .. }));
    }

    #[test]
    fn test_field_take() {
        let mut object = nginx();
        let taken = deployment()
            .field(&["spec", "replicas"], &mut object, |slot| {
                Ok::<_, Error>(slot.take())
            })
            .unwrap();
        assert_eq!(taken, Some(json!(3)));
        assert!(object["spec"].get("replicas").is_none());
    }

    #[test]
    fn test_field_not_in_schema() {
        let mut object = nginx();
        let err = deployment()
            .field(&["spec", "bogus"], &mut object, |_| Ok::<_, Error>(()))
            .unwrap_err();
        match err {
            Error::FieldNotFound { path, schema } => {
                assert_eq!(path, "spec.bogus");
                assert_eq!(schema, "io.k8s.api.apps.v1.Deployment");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_field_empty_path_is_not_found() {
        let mut object = nginx();
        let empty: [&str; 0] = [];
        let err = deployment()
            .field(&empty, &mut object, |_| Ok::<_, Error>(()))
            .unwrap_err();
        assert!(matches!(err, Error::FieldNotFound { .. }));
    }

    #[test]
    fn test_field_propagates_accessor_error() {
        let mut object = nginx();
        let err = deployment()
            .field(&["spec", "replicas"], &mut object, |slot| {
                Err::<(), _>(AccessError::Rejected(slot.path().join("/")))
            })
            .unwrap_err();
        assert!(matches!(err, AccessError::Rejected(ref p) if p == "spec/replicas"));

        let err = deployment()
            .field(&["nope"], &mut object, |_| Ok::<_, AccessError>(()))
            .unwrap_err();
        assert!(matches!(err, AccessError::Catalog(Error::FieldNotFound { .. })));
    }

    #[test]
    fn test_parent_ref() {
        let deployment = deployment();
        let parent = deployment.parent_ref();
        assert_eq!(parent.name, "deployments");
        assert_eq!(parent.group_version, GroupVersion::gv("apps", "v1"));
        assert!(deployment.sub_resources.iter().all(|s| s.parent == parent));
    }
}
