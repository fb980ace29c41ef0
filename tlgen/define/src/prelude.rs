//! Convenient re-exports for working with the schema model.
//!
//! ## Examples
//!
//! ```
//! use tlgen_define::prelude::*;
//!
//! let interface = Interface {
//!     name: "MessageContent".to_string(),
//!     description: "Contains the content of a message".to_string(),
//! };
//! assert_eq!(interface.enum_type(), "MessageContentEnum");
//! ```

pub use crate::schema::{Class, Enum, Function, Interface, Property, Schema};
pub use crate::types::{ResolvedType, ScalarType, TypeKind};
