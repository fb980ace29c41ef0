//! Cargo.toml generation for the generated crate.
//!
//! The generated sources only need `serde`, `serde_json`, `thiserror` and
//! `base64` at runtime. The manifest declares an empty `[workspace]` so the
//! crate builds on its own wherever it is written.

use std::path::Path;

use tracing::debug;

use crate::errors::GeneratorError;
use crate::output::write_atomic;

/// Package name used when none is given.
pub const DEFAULT_PACKAGE: &str = "tdlib";

/// Runtime dependencies of the generated code, in manifest order.
const DEPENDENCIES: &[(&str, &str)] = &[
    ("base64", r#""0.22""#),
    ("serde", r#"{ version = "1.0", features = ["derive"] }"#),
    ("serde_json", r#""1.0""#),
    ("thiserror", r#""2.0""#),
];

/// Renders the manifest of the generated crate.
///
/// ## Errors
///
/// Returns `GeneratorError::ConfigError` if `package` is not a valid crate name.
///
/// ## Examples
///
/// ```
/// use tlgen_gen::cargo_gen::generate_cargo_toml;
///
/// let manifest = generate_cargo_toml("tdlib").unwrap();
/// assert!(manifest.contains(r#"name = "tdlib""#));
/// assert!(generate_cargo_toml("not a name").is_err());
/// ```
pub fn generate_cargo_toml(package: &str) -> Result<String, GeneratorError> {
    validate_package_name(package)?;

    let dependencies: String = DEPENDENCIES
        .iter()
        .map(|(name, requirement)| format!("{} = {}\n", name, requirement))
        .collect();

    Ok(format!(
        r#"# This file was automatically generated by tlgen. Do not edit manually.

[package]
name = "{package}"
version = "0.1.0"
edition = "2024"
description = "TDLib client types and methods generated from the TL schema"

[dependencies]
{dependencies}
[workspace]
"#
    ))
}

/// Writes `Cargo.toml` into `crate_dir` (the parent of the generated `src/`).
///
/// In dry-run mode the manifest is printed instead.
///
/// ## Errors
///
/// Returns `GeneratorError::ConfigError` for an invalid package name, or
/// `GeneratorError::WriteError` if the file cannot be written.
pub fn write_cargo_toml(crate_dir: &Path, package: &str, dry_run: bool) -> Result<(), GeneratorError> {
    let manifest = generate_cargo_toml(package)?;
    let path = crate_dir.join("Cargo.toml");

    if dry_run {
        println!("=== {} ===\n{}", path.display(), manifest);
        return Ok(());
    }

    write_atomic(&path, &manifest)?;
    debug!(path = %path.display(), "wrote manifest");
    Ok(())
}

fn validate_package_name(package: &str) -> Result<(), GeneratorError> {
    let valid = package.starts_with(|c: char| c.is_ascii_alphabetic())
        && package
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(GeneratorError::ConfigError(format!(
            "Invalid package name '{}': use letters, digits, '-' or '_', starting with a letter",
            package
        )))
    }
}
