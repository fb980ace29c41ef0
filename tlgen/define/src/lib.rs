//! TL Schema Model
//!
//! This crate provides the semantic model that the `tlgen` generator builds
//! from a TDLib TL schema and then turns into Rust source code.
//!
//! ## Core Types
//!
//! - [`Schema`] - The whole resolved schema (interfaces, enums, classes, functions)
//! - [`Interface`] - An abstract type family, e.g. `MessageContent`
//! - [`Enum`] - The discriminant set of an interface
//! - [`Class`] - A concrete record type
//! - [`Function`] - An RPC method with its return type
//! - [`Property`] - A class property or function parameter
//! - [`ResolvedType`] - A classified property type
//! - [`ScalarType`] - The TL scalar keywords
//!
//! ## Examples
//!
//! ```
//! use tlgen_define::{ResolvedType, ScalarType, TypeKind, split_sequence_wrappers};
//!
//! let (depth, inner) = split_sequence_wrappers("vector<vector<int64>>").unwrap();
//! let ty = ResolvedType::new(depth, TypeKind::Scalar(inner.parse::<ScalarType>().unwrap()));
//!
//! assert_eq!(ty.depth, 2);
//! assert!(ty.requires_precision_wrapper());
//! assert_eq!(ty.to_string(), "vector<vector<int64>>");
//! ```

pub mod prelude;
pub mod schema;
pub mod types;

// Re-export main types at crate root
pub use schema::{Class, ENUM_SUFFIX, Enum, Function, Interface, Property, Schema, lower_first, upper_first};
pub use types::{ResolvedType, ScalarType, TypeExprError, TypeKind, split_sequence_wrappers};
