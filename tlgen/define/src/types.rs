//! Property type classification.
//!
//! Every property in a TL schema carries a raw type string such as `int32`,
//! `vector<message>` or `vector<vector<PageBlock>>`. This module provides the
//! types that describe the classified form of such a string:
//!
//! - [`ScalarType`] - The fixed set of TL scalar keywords
//! - [`TypeKind`] - Scalar, compound record or polymorphic interface
//! - [`ResolvedType`] - A [`TypeKind`] wrapped in zero or more sequences

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

/// Keyword that opens a sequence wrapper in a TL type string.
const SEQUENCE_OPEN: &str = "vector<";

/// Errors raised while splitting a raw type string into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeExprError {
    /// The type string was empty or only contained whitespace.
    #[error("empty type expression")]
    Empty,

    /// A `vector<` wrapper was not closed (or a stray `>` was found).
    #[error("unbalanced sequence wrapper in '{0}'")]
    Unbalanced(String),

    /// The innermost token of a sequence wrapper was empty.
    #[error("sequence wrapper without an element type in '{0}'")]
    MissingElement(String),
}

/// Scalar TL types.
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
/// use tlgen_define::ScalarType;
///
/// assert_eq!(ScalarType::from_str("int53").unwrap(), ScalarType::Int53);
/// assert_eq!(ScalarType::from_str("bool").unwrap(), ScalarType::Bool);
/// assert_eq!(ScalarType::Bool.to_string(), "Bool");
/// assert!(ScalarType::from_str("user").is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    /// UTF-8 text
    #[strum(to_string = "string")]
    String,
    /// 32-bit signed integer
    #[strum(to_string = "int32")]
    Int32,
    /// Integer that fits in 53 bits; travels as a plain JSON number
    #[strum(to_string = "int53")]
    Int53,
    /// 64-bit signed integer; travels as a quoted decimal string
    #[strum(to_string = "int64")]
    Int64,
    /// Boolean
    #[strum(to_string = "Bool", serialize = "bool")]
    Bool,
    /// Double-precision float
    #[strum(to_string = "double")]
    Double,
    /// Byte array; travels as base64 text
    #[strum(to_string = "bytes")]
    Bytes,
}

impl ScalarType {
    /// Returns true when the value cannot travel as a bare JSON number
    /// without losing precision.
    pub fn requires_precision_wrapper(self) -> bool {
        matches!(self, ScalarType::Int64)
    }
}

/// The classification of the innermost token of a property type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum TypeKind {
    /// A scalar keyword.
    Scalar(ScalarType),
    /// A concrete class, stored behind an owning indirection.
    Record(String),
    /// An abstract type family, decoded by discriminant dispatch.
    Interface(String),
}

/// A fully classified property type.
///
/// `depth` counts the sequence wrappers around `kind`, so
/// `vector<vector<int32>>` is `depth: 2, kind: Scalar(Int32)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedType {
    pub depth: usize,
    pub kind: TypeKind,
}

impl ResolvedType {
    pub fn new(depth: usize, kind: TypeKind) -> Self {
        Self { depth, kind }
    }

    pub fn scalar(scalar: ScalarType) -> Self {
        Self::new(0, TypeKind::Scalar(scalar))
    }

    /// Returns true when the innermost type is an interface, at any depth.
    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface(_))
    }

    /// Returns true for a bare (unwrapped) interface type.
    pub fn is_direct_interface(&self) -> bool {
        self.depth == 0 && self.is_interface()
    }

    /// Returns true when the innermost type is `int64`.
    pub fn requires_precision_wrapper(&self) -> bool {
        matches!(self.kind, TypeKind::Scalar(s) if s.requires_precision_wrapper())
    }

    /// Name of the referenced class or interface, if any.
    pub fn referenced_name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Scalar(_) => None,
            TypeKind::Record(name) | TypeKind::Interface(name) => Some(name),
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.depth {
            f.write_str(SEQUENCE_OPEN)?;
        }
        match &self.kind {
            TypeKind::Scalar(scalar) => write!(f, "{}", scalar)?,
            TypeKind::Record(name) | TypeKind::Interface(name) => f.write_str(name)?,
        }
        for _ in 0..self.depth {
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// Strips any number of `vector<...>` wrappers from a raw type string.
///
/// Returns the nesting depth and the innermost token.
///
/// ## Examples
///
/// ```
/// use tlgen_define::split_sequence_wrappers;
///
/// assert_eq!(split_sequence_wrappers("int32").unwrap(), (0, "int32"));
/// assert_eq!(split_sequence_wrappers("vector<message>").unwrap(), (1, "message"));
/// assert_eq!(
///     split_sequence_wrappers("vector<vector<PageBlock>>").unwrap(),
///     (2, "PageBlock")
/// );
/// assert!(split_sequence_wrappers("vector<int32").is_err());
/// ```
pub fn split_sequence_wrappers(raw: &str) -> Result<(usize, &str), TypeExprError> {
    let mut inner = raw.trim();
    if inner.is_empty() {
        return Err(TypeExprError::Empty);
    }

    let mut depth = 0;
    while let Some(rest) = inner.strip_prefix(SEQUENCE_OPEN) {
        inner = rest
            .strip_suffix('>')
            .ok_or_else(|| TypeExprError::Unbalanced(raw.to_string()))?
            .trim();
        depth += 1;
    }

    if inner.is_empty() {
        return Err(TypeExprError::MissingElement(raw.to_string()));
    }
    if inner.contains(['<', '>']) {
        return Err(TypeExprError::Unbalanced(raw.to_string()));
    }

    Ok((depth, inner))
}
