//! Output-document contract enforcement.
//!
//! The built catalog is validated against the shipped JSON Schema before it
//! is written, so a coercion bug can never publish an out-of-contract
//! document. The schema is embedded at compile time; there is no runtime
//! path discovery for the tool's own contract files.

use anyhow::{Context, Result, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::sync::OnceLock;

const SCHEMA_JSON: &str = include_str!("../schema/packages.schema.json");

fn schema_value() -> Result<&'static Value> {
    static PARSED: OnceLock<Value> = OnceLock::new();
    if let Some(value) = PARSED.get() {
        return Ok(value);
    }
    let value: Value =
        serde_json::from_str(SCHEMA_JSON).context("parsing embedded packages schema")?;
    Ok(PARSED.get_or_init(|| value))
}

/// Validate a built catalog document against the packages schema.
pub fn validate_catalog_document(document: &Value) -> Result<()> {
    let schema = schema_value()?;
    let compiled = JSONSchema::compile(schema).context("compiling packages schema")?;
    if let Err(errors) = compiled.validate(document) {
        let details = errors
            .map(|err| format!("{}: {err}", err.instance_path))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("catalog failed schema validation:\n{details}");
    }
    Ok(())
}
