//! In-process build of a kustomization subset.
//!
//! Supported fields: `resources`, `bases`, `namespace`, `namePrefix`,
//! `nameSuffix`, `commonLabels` and `commonAnnotations`. Anything else is
//! rejected by name, so an overlay is never silently rendered wrong; point
//! `--kustomize-path` at a real binary for the full feature set.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::trace;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use super::{descriptor_path, LoadRestrictor, Renderer};
use crate::error::{Error, Result};

/// Kinds that are not namespaced and keep no `metadata.namespace`.
const CLUSTER_SCOPED_KINDS: &[&str] = &[
    "APIService",
    "ClusterRole",
    "ClusterRoleBinding",
    "CustomResourceDefinition",
    "MutatingWebhookConfiguration",
    "Namespace",
    "PersistentVolume",
    "PriorityClass",
    "StorageClass",
    "ValidatingWebhookConfiguration",
];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Kustomization {
    #[serde(default)]
    #[allow(dead_code)]
    api_version: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    kind: Option<String>,
    #[serde(default)]
    resources: Vec<String>,
    #[serde(default)]
    bases: Vec<String>,
    #[serde(default)]
    namespace: Option<String>,
    #[serde(default)]
    name_prefix: Option<String>,
    #[serde(default)]
    name_suffix: Option<String>,
    #[serde(default)]
    common_labels: BTreeMap<String, String>,
    #[serde(default)]
    common_annotations: BTreeMap<String, String>,
}

/// Builds units without an external binary.
#[derive(Debug, Clone, Default)]
pub struct BuiltinRenderer {
    load_restrictor: LoadRestrictor,
}

impl BuiltinRenderer {
    pub fn new(load_restrictor: LoadRestrictor) -> Self {
        Self { load_restrictor }
    }

    fn build_dir(&self, dir: &Path, stack: &mut Vec<PathBuf>) -> Result<Vec<Value>> {
        let dir = fs::canonicalize(dir)?;
        if stack.contains(&dir) {
            return Err(kustomization_error(
                &dir,
                "cycle detected while accumulating resources",
            ));
        }
        let descriptor = descriptor_path(&dir)
            .ok_or_else(|| kustomization_error(&dir, "unable to find a kustomization file"))?;
        let kustomization = load_kustomization(&descriptor)?;

        stack.push(dir.clone());
        let mut resources = Vec::new();
        for entry in kustomization.resources.iter().chain(&kustomization.bases) {
            let accumulated = self
                .accumulate(&dir, entry, stack)
                .map_err(|e| accumulation_error(&descriptor, entry, e))?;
            resources.extend(accumulated);
        }
        stack.pop();

        for resource in &mut resources {
            transform(resource, &kustomization);
        }
        Ok(resources)
    }

    fn accumulate(
        &self,
        root: &Path,
        entry: &str,
        stack: &mut Vec<PathBuf>,
    ) -> Result<Vec<Value>> {
        if entry.contains("://") || entry.starts_with("git@") {
            return Err(kustomization_error(root, "remote resources are not supported"));
        }
        let path = root.join(entry);
        if path.is_dir() {
            return self.build_dir(&path, stack);
        }
        if !path.is_file() {
            return Err(kustomization_error(&path, "resource not found"));
        }
        let path = fs::canonicalize(&path)?;
        if self.load_restrictor.restricts_to_root() && !path.starts_with(root) {
            return Err(kustomization_error(
                &path,
                "security; file is not in or below the kustomization root",
            ));
        }
        load_resources(&path)
    }
}

impl Renderer for BuiltinRenderer {
    fn render(&self, dir: &Path) -> Result<String> {
        let resources = self
            .build_dir(dir, &mut Vec::new())
            .map_err(|e| Error::Render {
                dir: dir.to_path_buf(),
                cause: Box::new(e),
            })?;
        trace!("Built {} resources from {}", resources.len(), dir.display());

        let mut documents = Vec::with_capacity(resources.len());
        for resource in &resources {
            documents.push(serde_yaml::to_string(resource).map_err(|e| Error::Render {
                dir: dir.to_path_buf(),
                cause: Box::new(e.into()),
            })?);
        }
        Ok(documents.join("---\n"))
    }
}

fn load_kustomization(path: &Path) -> Result<Kustomization> {
    let content = fs::read_to_string(path)?;
    // A synthesized unit holds an empty descriptor.
    let blank = content
        .lines()
        .all(|line| line.trim().is_empty() || line.trim_start().starts_with('#'));
    if blank {
        return Ok(Kustomization::default());
    }
    let value: Value =
        serde_yaml::from_str(&content).map_err(|e| kustomization_error(path, &e.to_string()))?;
    if value.is_null() {
        return Ok(Kustomization::default());
    }
    serde_yaml::from_value(value).map_err(|e| kustomization_error(path, &e.to_string()))
}

fn load_resources(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path)?;
    let mut resources = Vec::new();
    for document in serde_yaml::Deserializer::from_str(&content) {
        let value = Value::deserialize(document)
            .map_err(|e| kustomization_error(path, &e.to_string()))?;
        if value.is_null() {
            continue;
        }
        validate_resource(path, &value)?;
        resources.push(value);
    }
    Ok(resources)
}

fn validate_resource(path: &Path, value: &Value) -> Result<()> {
    let Some(mapping) = value.as_mapping() else {
        return Err(kustomization_error(path, "resource is not a mapping"));
    };
    if mapping.get("kind").and_then(Value::as_str).is_none() {
        return Err(kustomization_error(path, "missing kind in resource"));
    }
    let name = mapping
        .get("metadata")
        .and_then(|metadata| metadata.get("name"))
        .and_then(Value::as_str);
    if name.is_none() {
        return Err(kustomization_error(path, "missing metadata.name in resource"));
    }
    Ok(())
}

fn transform(resource: &mut Value, kustomization: &Kustomization) {
    let cluster_scoped = resource
        .get("kind")
        .and_then(Value::as_str)
        .is_some_and(|kind| CLUSTER_SCOPED_KINDS.contains(&kind));
    let Some(metadata) = resource.get_mut("metadata").and_then(Value::as_mapping_mut) else {
        return;
    };

    if kustomization.name_prefix.is_some() || kustomization.name_suffix.is_some() {
        if let Some(name) = metadata.get("name").and_then(Value::as_str) {
            let renamed = format!(
                "{}{}{}",
                kustomization.name_prefix.as_deref().unwrap_or(""),
                name,
                kustomization.name_suffix.as_deref().unwrap_or("")
            );
            metadata.insert(Value::from("name"), Value::from(renamed));
        }
    }

    if let Some(namespace) = &kustomization.namespace {
        if !cluster_scoped {
            metadata.insert(Value::from("namespace"), Value::from(namespace.as_str()));
        }
    }

    merge_string_map(metadata, "labels", &kustomization.common_labels);
    merge_string_map(metadata, "annotations", &kustomization.common_annotations);
}

fn merge_string_map(metadata: &mut Mapping, key: &str, entries: &BTreeMap<String, String>) {
    if entries.is_empty() {
        return;
    }
    if !metadata.get(key).is_some_and(Value::is_mapping) {
        metadata.insert(Value::from(key), Value::Mapping(Mapping::new()));
    }
    if let Some(target) = metadata.get_mut(key).and_then(Value::as_mapping_mut) {
        for (k, v) in entries {
            target.insert(Value::from(k.as_str()), Value::from(v.as_str()));
        }
    }
}

fn kustomization_error(path: &Path, message: &str) -> Error {
    Error::Kustomization {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn accumulation_error(descriptor: &Path, entry: &str, cause: Error) -> Error {
    Error::Kustomization {
        path: descriptor.to_path_buf(),
        message: format!("accumulating resources from '{}': {}", entry, cause),
    }
}
