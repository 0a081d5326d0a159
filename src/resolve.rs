//! Maps spreadsheet names onto local checkouts and canonical package keys.
//!
//! The slug rules and the special-case table mirror how the sibling
//! repositories are actually named on disk; the special cases cover packages
//! whose repository names invert the spreadsheet word order.

use crate::manifest::{read_composer, read_package_json};
use crate::{COMPOSER_PREFIX, NPM_PREFIX};
use std::cmp::Ordering;
use std::path::Path;

/// Spreadsheet names whose repositories do not follow the slug algorithm.
const SPECIAL_SLUGS: &[(&str, &str)] = &[
    ("Zest vite plugin", "vite-plugin-zest"),
    ("Zest Vite plugin", "vite-plugin-zest"),
    ("Castaway vite plugin", "vite-plugin-castaway"),
    ("Castaway Vite plugin", "vite-plugin-castaway"),
    ("PHPStan DecodeLabs", "phpstan-decodelabs"),
];

/// Derive the repository slug for a spreadsheet name.
///
/// Lowercase, `&` → `and`, whitespace runs → one hyphen, strip anything
/// outside `[a-z0-9-]`, collapse repeated hyphens, trim edge hyphens.
pub fn repo_slug(name: &str) -> String {
    let base = name.trim();
    if let Some((_, slug)) = SPECIAL_SLUGS.iter().find(|(raw, _)| *raw == base) {
        return (*slug).to_string();
    }

    let lowered = base.to_lowercase().replace('&', "and");

    // Whitespace runs become single hyphens, everything outside [a-z0-9-]
    // is dropped, hyphen runs collapse, edge hyphens go.
    let mut slug = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match c {
            c if c.is_whitespace() || c == '-' => {
                if !slug.ends_with('-') && !slug.is_empty() {
                    slug.push('-');
                }
            }
            c if c.is_ascii_lowercase() || c.is_ascii_digit() => slug.push(c),
            _ => {}
        }
    }
    slug.trim_end_matches('-').to_string()
}

/// Case-insensitive natural ordering: digit runs compare numerically, so
/// `pkg-2` sorts before `pkg-10`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(lc), Some(rc)) => {
                if lc.is_ascii_digit() && rc.is_ascii_digit() {
                    let ln = take_number(&mut left);
                    let rn = take_number(&mut right);
                    match ln.cmp(&rn) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                } else {
                    let lc = lc.to_ascii_lowercase();
                    let rc = rc.to_ascii_lowercase();
                    match lc.cmp(&rc) {
                        Ordering::Equal => {
                            left.next();
                            right.next();
                        }
                        other => return other,
                    }
                }
            }
        }
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> u64 {
    let mut value: u64 = 0;
    while let Some(c) = chars.peek().copied() {
        if let Some(digit) = c.to_digit(10) {
            value = value.saturating_mul(10).saturating_add(u64::from(digit));
            chars.next();
        } else {
            break;
        }
    }
    value
}

/// Same-namespace runtime dependencies of a checkout, prefix stripped,
/// deduplicated, naturally sorted. Missing or invalid manifests yield an
/// empty list.
pub fn namespace_dependencies(repo_path: &Path) -> Vec<String> {
    let Some(manifest) = read_composer(repo_path) else {
        return Vec::new();
    };

    let mut deps: Vec<String> = manifest
        .require
        .keys()
        .filter_map(|pkg| pkg.strip_prefix(COMPOSER_PREFIX))
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
        .collect();

    deps.sort_by(|a, b| natural_cmp(a, b));
    deps.dedup();
    deps
}

/// Canonical key (the part after `decodelabs/`) plus whether the checkout
/// exists locally.
///
/// Precedence: JS/TS languages prefer the `package.json` identity; composer
/// comes next; an unspecified language falls back to `package.json` as a
/// secondary attempt; failing all of those, the algorithmic slug stands.
/// The exists flag only reflects the directory check.
pub fn resolve_repo_key(repo_path: &Path, slug: &str, raw_language: &str) -> (String, bool) {
    let exists = repo_path.is_dir();
    let language = raw_language.trim().to_ascii_lowercase();

    if matches!(
        language.as_str(),
        "ts" | "typescript" | "node" | "javascript" | "js"
    ) {
        if let Some(name) = package_json_key(repo_path) {
            return (name, exists);
        }
    }

    if let Some(name) = composer_key(repo_path) {
        return (name, exists);
    }

    if language.is_empty() {
        if let Some(name) = package_json_key(repo_path) {
            return (name, exists);
        }
    }

    (slug.to_string(), exists)
}

/// Composer identity, accepted only under the organization namespace.
fn composer_key(repo_path: &Path) -> Option<String> {
    let manifest = read_composer(repo_path)?;
    let name = manifest.name?;
    let rest = name.trim().strip_prefix(COMPOSER_PREFIX)?;
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

/// npm identity: scoped `@decodelabs/x` and `decodelabs-x`/`decodelabs/x`
/// spellings lose their prefix; other non-empty names pass through.
fn package_json_key(repo_path: &Path) -> Option<String> {
    let manifest = read_package_json(repo_path)?;
    let name = manifest.name?;
    let name = name.trim();

    if let Some(rest) = name.strip_prefix(NPM_PREFIX) {
        return Some(rest.to_string());
    }
    if let Some(rest) = name
        .strip_prefix("decodelabs-")
        .or_else(|| name.strip_prefix(COMPOSER_PREFIX))
    {
        return Some(rest.to_string());
    }
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn special_case_names_bypass_the_algorithm() {
        assert_eq!(repo_slug("Zest vite plugin"), "vite-plugin-zest");
        assert_eq!(repo_slug("Castaway Vite plugin"), "vite-plugin-castaway");
        assert_eq!(repo_slug("PHPStan DecodeLabs"), "phpstan-decodelabs");
    }

    #[test]
    fn algorithmic_slugs() {
        assert_eq!(repo_slug("Atlas & Friends"), "atlas-and-friends");
        assert_eq!(repo_slug("A&B"), "aandb");
        assert_eq!(repo_slug("  Terminus  "), "terminus");
        assert_eq!(repo_slug("Glitch (v2)"), "glitch-v2");
        assert_eq!(repo_slug("--Weird--  Name--"), "weird-name");
        assert_eq!(repo_slug("C++ Bridge"), "c-bridge");
    }

    #[test]
    fn natural_order_is_case_insensitive_and_numeric_aware() {
        assert_eq!(natural_cmp("pkg-2", "pkg-10"), Ordering::Less);
        assert_eq!(natural_cmp("Atlas", "atlas"), Ordering::Equal);
        assert_eq!(natural_cmp("Box", "atlas"), Ordering::Greater);
        assert_eq!(natural_cmp("a2b", "a2c"), Ordering::Less);
    }

    fn checkout(composer: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("composer.json"), composer).unwrap();
        temp
    }

    #[test]
    fn dependencies_filter_to_namespace_and_sort() {
        let temp = checkout(
            r#"{
                "name": "decodelabs/widget",
                "require": {
                    "decodelabs/pkg-10": "^1.0",
                    "decodelabs/pkg-2": "^1.0",
                    "php": ">=8.1",
                    "symfony/console": "^6.0"
                }
            }"#,
        );
        assert_eq!(namespace_dependencies(temp.path()), vec!["pkg-2", "pkg-10"]);
    }

    #[test]
    fn dependencies_of_a_missing_checkout_are_empty() {
        let temp = TempDir::new().unwrap();
        assert!(namespace_dependencies(&temp.path().join("absent")).is_empty());
    }

    #[test]
    fn composer_identity_wins_over_slug() {
        let temp = checkout(r#"{"name": "decodelabs/real-name"}"#);
        let (key, exists) = resolve_repo_key(temp.path(), "slug-name", "php");
        assert_eq!(key, "real-name");
        assert!(exists);
    }

    #[test]
    fn ts_language_prefers_package_json_identity() {
        let temp = checkout(r#"{"name": "decodelabs/composer-name"}"#);
        fs::write(
            temp.path().join("package.json"),
            r#"{"name": "@decodelabs/npm-name"}"#,
        )
        .unwrap();
        let (key, _) = resolve_repo_key(temp.path(), "slug-name", "ts");
        assert_eq!(key, "npm-name");
        // Non-JS languages keep the composer identity.
        let (key, _) = resolve_repo_key(temp.path(), "slug-name", "php");
        assert_eq!(key, "composer-name");
    }

    #[test]
    fn unspecified_language_tries_package_json_second() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"name": "decodelabs-hyphen-name"}"#,
        )
        .unwrap();
        let (key, _) = resolve_repo_key(temp.path(), "slug-name", "");
        assert_eq!(key, "hyphen-name");
    }

    #[test]
    fn missing_checkout_falls_back_to_slug() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent");
        let (key, exists) = resolve_repo_key(&path, "slug-name", "php");
        assert_eq!(key, "slug-name");
        assert!(!exists);
    }

    #[test]
    fn existing_checkout_without_manifests_keeps_slug_but_exists() {
        let temp = TempDir::new().unwrap();
        let (key, exists) = resolve_repo_key(temp.path(), "slug-name", "php");
        assert_eq!(key, "slug-name");
        assert!(exists);
    }
}
