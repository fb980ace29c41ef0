//! Output assembly and file writing for generated code.
//!
//! This module handles the final phase of code generation: emitting every
//! generated piece as a [`Fragment`] bound to an output path, validating and
//! formatting it, then grouping fragments per file and writing them to disk
//! atomically.
//!
//! ## Output Structure
//!
//! ```text
//! tdlib/src/
//! ├── lib.rs                      # Module declarations and re-exports
//! ├── shared.rs                   # Header, JsonInt64, Bytes, TdError, Client, ...
//! ├── types/
//! │   ├── mod.rs                  # One `mod`/`pub use` pair per root type
//! │   ├── message_content.rs      # Interface fragment followed by its variants
//! │   └── formatted_text.rs       # A standalone class
//! └── methods/
//!     ├── mod.rs
//!     └── message.rs              # RPC stubs returning `Message`
//! ```
//!
//! ## Safety Guarantees
//!
//! - **Validation**: Every fragment is validated with `syn` before writing
//! - **Formatting**: Output is formatted with `prettyplease` for consistent style
//! - **Atomic writes**: Uses temp file + rename pattern to prevent partial writes

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use tlgen_define::Schema;
use tracing::{debug, info, instrument};

use crate::codegen::{
    NameTable, generate_class, generate_function, generate_interface, generate_shared_module,
};
use crate::errors::GeneratorError;

/// First line of every generated file.
pub const GENERATED_NOTICE: &str =
    "// This code was automatically generated by tlgen. Do not edit manually.";

/// A piece of generated source bound to a path relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub path: PathBuf,
    pub content: String,
}

/// Tracks which output files already received their header.
///
/// Threaded through one emission pass; the filesystem is never consulted.
#[derive(Debug, Default)]
pub struct EmissionContext {
    headers: HashMap<PathBuf, bool>,
}

impl EmissionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the header of `path` as written.
    ///
    /// Returns true only on the first call for a given path.
    pub fn claim_header(&mut self, path: &Path) -> bool {
        let written = self.headers.entry(path.to_path_buf()).or_insert(false);
        !std::mem::replace(written, true)
    }

    /// Emits a complete file as a single fragment.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::CodeGenError` if the code fails to parse.
    pub fn emit_file(
        &mut self,
        out: &mut Vec<Fragment>,
        path: impl Into<PathBuf>,
        tokens: TokenStream,
    ) -> Result<(), GeneratorError> {
        let path = path.into();
        let file = validate_code(&tokens)?;
        self.claim_header(&path);
        out.push(Fragment {
            path,
            content: format_code(&file),
        });
        Ok(())
    }

    /// Emits one fragment of a multi-fragment file.
    ///
    /// The first fragment for a path is preceded by the file header: the
    /// generated notice, the module doc `doc` and `use super::*;`.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::CodeGenError` if the code fails to parse.
    pub fn emit_fragment(
        &mut self,
        out: &mut Vec<Fragment>,
        path: &Path,
        doc: &str,
        tokens: TokenStream,
    ) -> Result<(), GeneratorError> {
        let body = validate_code(&tokens)?;
        if self.claim_header(path) {
            let header = validate_code(&file_header(doc))?;
            out.push(Fragment {
                path: path.to_path_buf(),
                content: format_code(&header),
            });
        }
        out.push(Fragment {
            path: path.to_path_buf(),
            content: prettyplease::unparse(&body),
        });
        Ok(())
    }
}

fn file_header(doc: &str) -> TokenStream {
    quote! {
        #![doc = #doc]

        use super::*;
    }
}

/// Assembles `lib.rs` of the generated crate.
pub fn assemble_lib_rs() -> TokenStream {
    quote! {
        //! Generated TDLib client.
        //!
        //! - [`types`] - One Rust type per TL class and interface
        //! - [`methods`] - One [`Client`] method per TL function
        //! - [`shared`] - Runtime support shared by all generated code
        //!
        //! Requests are delivered by a [`Transport`] implementation supplied
        //! to [`Client::new`].

        pub mod methods;
        pub mod shared;
        pub mod types;

        pub use shared::*;
        pub use types::*;
    }
}

/// Assembles `types/mod.rs`: shared imports and one module per root type.
pub fn assemble_types_mod(schema: &Schema, names: &NameTable) -> TokenStream {
    let modules: Vec<_> = schema
        .root_names()
        .into_iter()
        .map(|root| format_ident!("{}", names.module_name(root)))
        .collect();

    quote! {
        //! TDLib object types, one module per root type.

        use serde::{Deserialize, Serialize};

        use crate::shared::*;

        #(
            mod #modules;
            pub use #modules::*;
        )*
    }
}

/// Assembles `methods/mod.rs`: one module per distinct return type.
pub fn assemble_methods_mod(schema: &Schema, names: &NameTable) -> TokenStream {
    let modules: Vec<_> = schema
        .return_types()
        .into_iter()
        .map(|ret| format_ident!("{}", names.module_name(ret)))
        .collect();

    quote! {
        //! TDLib methods, grouped by return type.

        use crate::shared::*;
        use crate::types::*;

        #(mod #modules;)*
    }
}

/// Validates generated code using syn.
///
/// ## Errors
///
/// Returns `GeneratorError::CodeGenError` if the code fails to parse.
pub fn validate_code(tokens: &TokenStream) -> Result<syn::File, GeneratorError> {
    syn::parse2(tokens.clone())
        .map_err(|e| GeneratorError::CodeGenError(format!("Generated code is invalid: {}", e)))
}

/// Formats a parsed file with prettyplease, prepending the generated notice.
pub fn format_code(file: &syn::File) -> String {
    format!("{}\n\n{}", GENERATED_NOTICE, prettyplease::unparse(file))
}

/// Emits every fragment of the generated crate, in output order.
///
/// Per-root files hold the interface fragment first, then each variant
/// class in declaration order. Per-return-type files hold the matching RPC
/// stubs in declaration order.
///
/// ## Errors
///
/// Returns `GeneratorError::CodeGenError` if any fragment is invalid Rust.
#[instrument(skip_all)]
pub fn generate_fragments(schema: &Schema) -> Result<Vec<Fragment>, GeneratorError> {
    let names = NameTable::new(schema);
    let mut ctx = EmissionContext::new();
    let mut fragments = Vec::new();

    ctx.emit_file(&mut fragments, "lib.rs", assemble_lib_rs())?;
    ctx.emit_file(&mut fragments, "shared.rs", generate_shared_module())?;
    ctx.emit_file(&mut fragments, "types/mod.rs", assemble_types_mod(schema, &names))?;
    ctx.emit_file(&mut fragments, "methods/mod.rs", assemble_methods_mod(schema, &names))?;

    for root in schema.root_names() {
        let path = Path::new("types").join(format!("{}.rs", names.module_name(root)));

        if let Some(interface) = schema.interface(root) {
            let doc = format!(" The `{}` interface and its variants.", root);
            ctx.emit_fragment(
                &mut fragments,
                &path,
                &doc,
                generate_interface(schema, &names, interface),
            )?;
            for class in schema.variants_of(root) {
                ctx.emit_fragment(&mut fragments, &path, &doc, generate_class(&names, class))?;
            }
        } else if let Some(class) = schema.class(root) {
            let doc = format!(" The `{}` record.", root);
            ctx.emit_fragment(&mut fragments, &path, &doc, generate_class(&names, class))?;
        }
    }

    for return_type in schema.return_types() {
        let path = Path::new("methods").join(format!("{}.rs", names.module_name(return_type)));
        let doc = format!(" Methods returning `{}`.", return_type);

        for function in schema.functions.iter().filter(|f| f.return_type == return_type) {
            ctx.emit_fragment(
                &mut fragments,
                &path,
                &doc,
                generate_function(schema, &names, function),
            )?;
        }
    }

    debug!(fragments = fragments.len(), "emitted fragments");
    Ok(fragments)
}

/// Joins fragments into whole files, keeping first-appearance order.
pub fn group_fragments(fragments: &[Fragment]) -> Vec<(PathBuf, String)> {
    let mut files: Vec<(PathBuf, String)> = Vec::new();
    let mut index: HashMap<&Path, usize> = HashMap::new();

    for fragment in fragments {
        match index.get(fragment.path.as_path()) {
            Some(&idx) => {
                let content = &mut files[idx].1;
                content.push('\n');
                content.push_str(&fragment.content);
            }
            None => {
                index.insert(fragment.path.as_path(), files.len());
                files.push((fragment.path.clone(), fragment.content.clone()));
            }
        }
    }
    files
}

/// Writes content to a file atomically using temp file + rename.
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` if:
/// - Parent directories cannot be created
/// - The temp file cannot be written
/// - The rename operation fails
pub fn write_atomic(path: &Path, content: &str) -> Result<(), GeneratorError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::WriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).map_err(|e| GeneratorError::WriteError {
        path: temp_path.display().to_string(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| GeneratorError::WriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Groups fragments per path and writes each file under `output_dir`.
///
/// The first failed write aborts the rest of the queue.
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` if any file cannot be written.
pub fn persist(fragments: &[Fragment], output_dir: &Path) -> Result<Vec<PathBuf>, GeneratorError> {
    let files = group_fragments(fragments);
    let mut written = Vec::with_capacity(files.len());
    for (path, content) in files {
        let target = output_dir.join(&path);
        write_atomic(&target, &content)?;
        debug!(path = %target.display(), "wrote file");
        written.push(target);
    }
    Ok(written)
}

/// Generates the whole crate source tree and writes it to `output_dir`.
///
/// ## Arguments
///
/// * `schema` - The resolved schema to generate code for
/// * `output_dir` - The `src/` directory of the generated crate
/// * `dry_run` - If true, print every file instead of writing it
///
/// ## Returns
///
/// The relative paths of all generated files, in output order.
///
/// ## Errors
///
/// Returns an error if:
/// - Code generation produces invalid Rust
/// - File writing fails
pub fn generate_and_write(
    schema: &Schema,
    output_dir: &Path,
    dry_run: bool,
) -> Result<Vec<PathBuf>, GeneratorError> {
    let fragments = generate_fragments(schema)?;

    if dry_run {
        let files = group_fragments(&fragments);
        for (path, content) in &files {
            println!("=== {} ===\n{}\n", path.display(), content);
        }
        return Ok(files.into_iter().map(|(path, _)| path).collect());
    }

    let written = persist(&fragments, output_dir)?;
    info!(files = written.len(), dir = %output_dir.display(), "generated crate sources");
    Ok(group_fragments(&fragments).into_iter().map(|(path, _)| path).collect())
}
