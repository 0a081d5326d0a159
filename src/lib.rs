use anyhow::{Context, Result, bail};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

pub mod catalog;
pub mod coerce;
pub mod fetch;
pub mod manifest;
pub mod resolve;
pub mod schema;
pub mod table;

/// Organizational prefix identifying same-ecosystem packages in manifests
/// and in the output document keys.
pub const NAMESPACE: &str = "decodelabs";

/// Composer package prefix, e.g. `decodelabs/terminus`.
pub const COMPOSER_PREFIX: &str = "decodelabs/";

/// npm scope prefix, e.g. `@decodelabs/zest`.
pub const NPM_PREFIX: &str = "@decodelabs/";

pub const USER_AGENT: &str = "DecodeLabs-Chorus/1.0 (+https://decodelabs.com)";

/// Published CSV export of the packages spreadsheet.
pub const DEFAULT_CSV_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vQaFAnachOWszavqGcgIuXt6rxgauuUGtLzeG1Z1FCg_eum_1BsagTrrHx-Z7kPvoBokwyOfCrDkYZ8/pub?gid=0&single=true&output=csv";

const ENV_CATALOG_ROOT: &str = "PACKAGES_SYNC_ROOT";
const OUTPUT_RELATIVE: &str = "config/packages.json";

/// Resolve the catalog root directory from an explicit flag or the
/// `PACKAGES_SYNC_ROOT` environment variable.
///
/// The root is the checkout holding `config/packages.json`; its parent
/// directory is where sibling package checkouts are expected.
pub fn resolve_catalog_root(flag: Option<&Path>) -> Result<PathBuf> {
    let candidate = match flag {
        Some(path) => path.to_path_buf(),
        None => match env::var(ENV_CATALOG_ROOT) {
            Ok(raw) if !raw.is_empty() => PathBuf::from(raw),
            _ => bail!(
                "No catalog root given. Pass --root or set {ENV_CATALOG_ROOT} to the catalog checkout."
            ),
        },
    };

    if !candidate.is_dir() {
        bail!("Catalog root is not a directory: {}", candidate.display());
    }

    fs::canonicalize(&candidate)
        .with_context(|| format!("canonicalizing catalog root {}", candidate.display()))
}

/// Parent directory holding sibling package checkouts named by slug.
pub fn siblings_root(catalog_root: &Path) -> Result<PathBuf> {
    match catalog_root.parent() {
        Some(parent) => Ok(parent.to_path_buf()),
        None => bail!(
            "Catalog root {} has no parent directory to scan for siblings",
            catalog_root.display()
        ),
    }
}

pub fn default_output_path(catalog_root: &Path) -> PathBuf {
    catalog_root.join(OUTPUT_RELATIVE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_root_must_be_a_directory() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("not-there");
        let err = resolve_catalog_root(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn explicit_root_is_canonicalized() {
        let temp = tempfile::TempDir::new().unwrap();
        let resolved = resolve_catalog_root(Some(temp.path())).unwrap();
        assert_eq!(resolved, temp.path().canonicalize().unwrap());
    }

    #[test]
    fn output_path_lands_in_config() {
        let root = Path::new("/srv/chorus");
        assert_eq!(
            default_output_path(root),
            PathBuf::from("/srv/chorus/config/packages.json")
        );
    }

    #[test]
    fn siblings_root_is_the_parent() {
        let root = Path::new("/srv/chorus");
        assert_eq!(siblings_root(root).unwrap(), PathBuf::from("/srv"));
    }
}
