//! Manifest readers for sibling package checkouts.
//!
//! Absence is never an error here: a missing, unreadable, or structurally
//! invalid manifest degrades to `None` and the entry simply carries no
//! declared identity, description, or dependencies. Only runtime sections
//! are modelled; `require-dev`, `devDependencies` and the like are not
//! deserialized at all.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Runtime-relevant slice of a `composer.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposerManifest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub require: BTreeMap<String, String>,
}

/// Runtime-relevant slice of a `package.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

pub fn read_composer(repo_path: &Path) -> Option<ComposerManifest> {
    read_manifest(&repo_path.join("composer.json"))
}

pub fn read_package_json(repo_path: &Path) -> Option<PackageManifest> {
    read_manifest(&repo_path.join("package.json"))
}

fn read_manifest<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = fs::read_to_string(path).ok()?;
    if raw.trim().is_empty() {
        return None;
    }
    serde_json::from_str(&raw).ok()
}

/// Trimmed, non-empty description from a checkout's composer.json.
pub fn composer_description(repo_path: &Path) -> Option<String> {
    let manifest = read_composer(repo_path)?;
    let description = manifest.description?;
    let trimmed = description.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
