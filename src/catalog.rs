//! Assembles normalized spreadsheet rows into the output document.
//!
//! One entry per named row, keyed by the canonical `decodelabs/<key>`
//! identity. The document is a `BTreeMap`, so serialization is
//! deterministic without any post-sorting.

use crate::coerce::{Language, blank_to_none, coerce_score, normalize_language, normalize_milestone};
use crate::manifest::composer_description;
use crate::resolve::{namespace_dependencies, repo_slug, resolve_repo_key};
use crate::table::{NormalizedRow, RawRow, normalize_row_keys};
use crate::COMPOSER_PREFIX;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct Scores {
    pub code: f64,
    pub readme: f64,
    pub docs: f64,
    pub tests: f64,
}

/// One package record. Optional fields serialize as explicit `null`s; the
/// document always carries the full key set per entry.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub description: Option<String>,
    pub language: Language,
    pub role: String,
    pub milestone: Option<String>,
    pub scores: Scores,
    pub dependencies: Vec<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

pub type Catalog = BTreeMap<String, CatalogEntry>;

/// Fold raw rows into the catalog. Rows without a name are dropped.
pub fn build_catalog(rows: &[RawRow], siblings_root: &Path) -> Catalog {
    rows.iter()
        .filter_map(|row| build_entry(row, siblings_root))
        .collect()
}

/// Build one entry, or `None` for an unnamed row.
pub fn build_entry(raw: &RawRow, siblings_root: &Path) -> Option<(String, CatalogEntry)> {
    let row = normalize_row_keys(raw);
    let name = cell(&row, "name").trim();
    if name.is_empty() {
        return None;
    }

    let raw_language = cell(&row, "language");
    let language = normalize_language(raw_language);

    let scores = Scores {
        code: coerce_score(cell(&row, "code")),
        readme: coerce_score(cell(&row, "readme")),
        // The sheet has carried both "Ref Docs" and "Docs" headers.
        docs: coerce_score(first_cell(&row, &["refDocs", "docs"])),
        tests: coerce_score(cell(&row, "tests")),
    };

    // A name with no sluggable characters matches no checkout; joining an
    // empty slug would point at the siblings root itself. The raw name
    // stands in as the key and the entry degrades to bare defaults.
    let slug = repo_slug(name);
    let (key, exists, description, dependencies) = if slug.is_empty() {
        (name.to_string(), false, None, Vec::new())
    } else {
        let repo_path = siblings_root.join(&slug);
        let dependencies: Vec<String> = namespace_dependencies(&repo_path)
            .into_iter()
            .map(|dep| format!("{COMPOSER_PREFIX}{dep}"))
            .collect();
        let (key, exists) = resolve_repo_key(&repo_path, &slug, raw_language);
        (key, exists, composer_description(&repo_path), dependencies)
    };
    let full_key = format!("{COMPOSER_PREFIX}{key}");

    let entry = CatalogEntry {
        name: name.to_string(),
        description,
        language,
        role: cell(&row, "role").trim().to_string(),
        milestone: normalize_milestone(cell(&row, "milestone")),
        scores,
        dependencies,
        location: exists.then(|| format!("https://github.com/{full_key}")),
        notes: blank_to_none(cell(&row, "notes")),
    };

    Some((full_key, entry))
}

fn cell<'a>(row: &'a NormalizedRow, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("")
}

fn first_cell<'a>(row: &'a NormalizedRow, keys: &[&str]) -> &'a str {
    keys.iter()
        .find_map(|key| row.get(*key))
        .map(String::as_str)
        .unwrap_or("")
}

/// Pretty-printed document with a trailing newline. serde_json leaves
/// slashes unescaped, which the downstream consumers expect.
pub fn serialize_catalog(catalog: &Catalog) -> Result<String> {
    let mut rendered =
        serde_json::to_string_pretty(catalog).context("serializing catalog document")?;
    rendered.push('\n');
    Ok(rendered)
}

/// Atomic write: render to a sibling temp file, then rename over the
/// target. No partial document is ever observable at `path`.
pub fn write_catalog(catalog: &Catalog, path: &Path) -> Result<()> {
    let rendered = serialize_catalog(catalog)?;
    let dir = path
        .parent()
        .with_context(|| format!("output path {} has no parent directory", path.display()))?;

    let mut staged = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    staged
        .write_all(rendered.as_bytes())
        .with_context(|| format!("writing staged catalog in {}", dir.display()))?;
    staged
        .persist(path)
        .with_context(|| format!("persisting catalog to {}", path.display()))?;
    Ok(())
}
