//! Mapping of resolved property types to Rust types.
//!
//! | Schema type | Rust type |
//! |-------------|-----------|
//! | `string` | `String` |
//! | `int32` | `i32` |
//! | `int53` | `i64` |
//! | `int64` | `JsonInt64` |
//! | `Bool` | `bool` |
//! | `double` | `f64` |
//! | `bytes` | `Bytes` |
//! | `someClass` | `Option<Box<SomeClass>>` |
//! | `SomeInterface` | `Option<SomeInterface>` |
//! | `vector<T>` | `Vec<T>` with the inner type unwrapped |

use proc_macro2::TokenStream;
use quote::quote;
use tlgen_define::{ResolvedType, ScalarType, TypeKind};

use super::names::NameTable;

/// Rust type of a struct field or RPC parameter.
pub fn field_type(names: &NameTable, ty: &ResolvedType) -> TokenStream {
    if ty.depth == 0 {
        return match &ty.kind {
            TypeKind::Scalar(scalar) => scalar_type(*scalar),
            TypeKind::Record(name) => {
                let ident = names.type_ident(name);
                quote! { Option<Box<#ident>> }
            }
            TypeKind::Interface(name) => {
                let ident = names.type_ident(name);
                quote! { Option<#ident> }
            }
        };
    }

    (0..ty.depth).fold(element_type(names, &ty.kind), |inner, _| quote! { Vec<#inner> })
}

/// Element type inside a sequence: no `Option`, no `Box`.
fn element_type(names: &NameTable, kind: &TypeKind) -> TokenStream {
    match kind {
        TypeKind::Scalar(scalar) => scalar_type(*scalar),
        TypeKind::Record(name) | TypeKind::Interface(name) => {
            let ident = names.type_ident(name);
            quote! { #ident }
        }
    }
}

fn scalar_type(scalar: ScalarType) -> TokenStream {
    match scalar {
        ScalarType::String => quote! { String },
        ScalarType::Int32 => quote! { i32 },
        ScalarType::Int53 => quote! { i64 },
        ScalarType::Int64 => quote! { JsonInt64 },
        ScalarType::Bool => quote! { bool },
        ScalarType::Double => quote! { f64 },
        ScalarType::Bytes => quote! { Bytes },
    }
}

/// `#[doc = "..."]` text for a description, with the leading space `///` adds.
pub fn doc_text(description: &str) -> Option<String> {
    let description = description.trim();
    (!description.is_empty()).then(|| format!(" {}", description))
}
