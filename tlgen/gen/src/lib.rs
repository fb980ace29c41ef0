//! tlgen code generator library.
//!
//! This crate turns a TDLib TL schema into the source tree of a Rust client
//! crate. The generated code includes:
//!
//! - One struct per TL class, with serde impls keyed by the raw wire names
//! - One enum per TL interface, with discriminant dispatch on `@type`
//! - One `Client` method per TL function
//! - A shared runtime module (`Header`, `JsonInt64`, `Bytes`, `TdError`, ...)
//!
//! ## Modules
//!
//! - [`parser`] - TL line parser producing declarations
//! - [`naming`] - Identifier normalization
//! - [`builder`] - Declarations to resolved [`Schema`](tlgen_define::Schema)
//! - [`codegen`] - Code generation for individual components
//! - [`output`] - Final assembly, validation, and file writing
//! - [`cargo_gen`] - Cargo.toml generation for the output package
//! - [`errors`] - Error types for the generator
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use tlgen_gen::builder::build_schema;
//! use tlgen_gen::output::generate_and_write;
//! use tlgen_gen::parser::parse_schema;
//!
//! let text = std::fs::read_to_string("td_api.tl").unwrap();
//! let schema = build_schema(parse_schema(&text).unwrap()).unwrap();
//!
//! // dry_run=true prints the files instead of writing them
//! let files = generate_and_write(&schema, Path::new("tdlib/src"), true).unwrap();
//! println!("{} files", files.len());
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! schema text ─▶ parser ─▶ declarations ─▶ builder ─▶ Schema ─▶ codegen ─▶ fragments ─▶ output
//! ```

pub mod builder;
pub mod cargo_gen;
pub mod codegen;
pub mod errors;
pub mod naming;
pub mod output;
pub mod parser;

#[cfg(test)]
pub(crate) mod test_utils;

use std::fs;
use std::path::Path;

use tlgen_define::Schema;

use crate::errors::GeneratorError;

/// Reads a `.tl` file and resolves it into a [`Schema`].
///
/// ## Errors
///
/// Returns `GeneratorError::ReadError` if the file cannot be read, or any
/// parse or resolution error.
pub fn load_schema(path: &Path) -> Result<Schema, GeneratorError> {
    let text = fs::read_to_string(path).map_err(|e| GeneratorError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    builder::build_schema(parser::parse_schema(&text)?)
}
