//! Shared test utilities for tlgen-gen tests.

use proc_macro2::TokenStream;
use tlgen_define::Schema;

use crate::builder::build_schema;
use crate::parser::parse_schema;

/// A small TL schema covering every construct the generator handles.
pub const SAMPLE_SCHEMA: &str = include_str!("../tests/fixtures/sample.tl");

/// Parses and resolves [`SAMPLE_SCHEMA`].
pub fn sample_schema() -> Schema {
    build_schema(parse_schema(SAMPLE_SCHEMA).unwrap()).unwrap()
}

/// Validates that generated code is syntactically correct.
///
/// ## Errors
///
/// Returns an error string if the generated code fails to parse.
pub fn validate_generated_code(tokens: &TokenStream) -> Result<(), String> {
    syn::parse2::<syn::File>(tokens.clone()).map_err(|e| e.to_string())?;
    Ok(())
}

/// Formats generated code using prettyplease.
///
/// ## Errors
///
/// Returns an error string if the code fails to parse.
pub fn format_generated_code(tokens: &TokenStream) -> Result<String, String> {
    let file = syn::parse2::<syn::File>(tokens.clone()).map_err(|e| e.to_string())?;
    Ok(prettyplease::unparse(&file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_schema_covers_every_entity_kind() {
        let schema = sample_schema();
        assert!(!schema.interfaces.is_empty());
        assert!(!schema.enums.is_empty());
        assert!(schema.classes.iter().any(|c| c.is_variant()));
        assert!(schema.classes.iter().any(|c| !c.is_variant()));
        assert!(schema.functions.iter().any(|f| f.is_synchronous));
    }
}
