//! Code generation modules for tlgen.
//!
//! This module contains generators that produce Rust source code from a
//! resolved TL schema. Each submodule handles one kind of schema entity.
//!
//! ## Submodules
//!
//! - [`names`] - The per-run table of Rust identifiers
//! - [`types`] - Mapping of property types to Rust types
//! - [`shared`] - The shared runtime (`Header`, `JsonInt64`, `Bytes`, `TdError`, `Client`, ...)
//! - [`interface`] - Interface families: union enum, discriminants, dispatch
//! - [`class`] - Record structs with constructors and serde impls
//! - [`function`] - RPC stubs on the generated `Client`
//!
//! ## Output Format
//!
//! All generators return `proc_macro2::TokenStream`, which is then:
//! - Validated with `syn::parse2` to ensure correctness
//! - Formatted with `prettyplease` for consistent style
//!
//! See [`crate::output`] for the assembly and file writing logic.

pub mod class;
pub mod function;
pub mod interface;
pub mod names;
pub mod shared;
pub mod types;

pub use class::generate_class;
pub use function::generate_function;
pub use interface::generate_interface;
pub use names::NameTable;
pub use shared::generate_shared_module;
pub use types::field_type;
