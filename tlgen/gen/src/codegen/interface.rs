//! Generation of interface families.
//!
//! An interface such as `MessageContent` becomes:
//!
//! - `pub enum MessageContent { Text(Box<MessageText>), ... }`, the closed
//!   union of its variant classes
//! - `pub enum MessageContentEnum`, the plain discriminant enum with `ALL`
//!   and `as_str()`
//! - `MessageContent::message_content_enum()`, the contract method
//! - a lazily built registry from `@type` string to decode function, and
//!   `unmarshal_message_content()` which dispatches through it
//! - `Serialize`/`Deserialize`/`TdMessage` impls and one `From` per variant

use proc_macro2::TokenStream;
use quote::quote;
use tlgen_define::{Interface, Schema};

use super::names::NameTable;
use super::types::doc_text;

/// Generates every item of one interface family.
///
/// Variants come from the first enum matching the interface, in declaration
/// order. An interface without variants still yields a valid (uninhabited)
/// enum whose dispatch always reports an unknown discriminant.
pub fn generate_interface(schema: &Schema, names: &NameTable, interface: &Interface) -> TokenStream {
    let raw_name = interface.name.as_str();
    let ident = names.type_ident(raw_name);
    let enum_ident = names.enum_ident(raw_name);
    let enum_method = names.enum_method(raw_name);
    let unmarshal = names.unmarshal_fn(raw_name);
    let registry = names.registry_ident(raw_name);
    let decoder = names.decoder_ident(raw_name);

    let items: &[String] = schema.enum_for(raw_name).map_or(&[], |e| e.items.as_slice());
    let variants: Vec<_> = items.iter().map(|item| names.variant_ident(item)).collect();
    let classes: Vec<_> = items.iter().map(|item| names.type_ident(item)).collect();
    let variant_docs: Vec<_> = items
        .iter()
        .map(|item| {
            let doc = format!(" See [`{}`].", names.type_name(item));
            quote! { #[doc = #doc] }
        })
        .collect();

    let doc = doc_text(&interface.description).map(|d| quote! { #[doc = #d] });
    let enum_doc = format!(" Discriminants of [`{}`].", names.type_name(raw_name));
    let unmarshal_doc = format!(
        " Decodes a `{}` payload by its `@type`; absent or `null` input yields `None`.",
        raw_name
    );

    // Empty enums need `match *self {}`
    let self_match = if items.is_empty() {
        quote! { *self }
    } else {
        quote! { self }
    };
    let capacity = items.len();
    let registry_init = if items.is_empty() {
        quote! {
            let registry: std::collections::HashMap<&'static str, #decoder> =
                std::collections::HashMap::new();
        }
    } else {
        quote! {
            let mut registry: std::collections::HashMap<&'static str, #decoder> =
                std::collections::HashMap::with_capacity(#capacity);
        }
    };

    quote! {
        #doc
        #[derive(Debug, Clone, PartialEq)]
        pub enum #ident {
            #(
                #variant_docs
                #variants(Box<#classes>),
            )*
        }

        #[doc = #enum_doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum #enum_ident {
            #(#variants,)*
        }

        impl #enum_ident {
            /// Every discriminant, in declaration order.
            pub const ALL: &'static [#enum_ident] = &[#(#enum_ident::#variants),*];

            /// The raw `@type` string.
            pub fn as_str(self) -> &'static str {
                match self {
                    #(#enum_ident::#variants => #items,)*
                }
            }
        }

        impl #ident {
            pub fn #enum_method(&self) -> #enum_ident {
                match #self_match {
                    #(#ident::#variants(_) => #enum_ident::#variants,)*
                }
            }
        }

        impl TdMessage for #ident {
            fn message_type(&self) -> &'static str {
                self.#enum_method().as_str()
            }
        }

        impl Serialize for #ident {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match #self_match {
                    #(#ident::#variants(value) => value.serialize(serializer),)*
                }
            }
        }

        impl<'de> Deserialize<'de> for #ident {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let payload = serde_json::Value::deserialize(deserializer)?;
                #unmarshal(Some(&payload))
                    .map_err(<D::Error as serde::de::Error>::custom)?
                    .ok_or_else(|| {
                        <D::Error as serde::de::Error>::custom(TdError::MissingDiscriminant {
                            interface: #raw_name,
                        })
                    })
            }
        }

        #(
            impl From<#classes> for #ident {
                fn from(value: #classes) -> Self {
                    #ident::#variants(Box::new(value))
                }
            }
        )*

        type #decoder = fn(serde_json::Value) -> Result<#ident, TdError>;

        static #registry: std::sync::LazyLock<std::collections::HashMap<&'static str, #decoder>> =
            std::sync::LazyLock::new(|| {
                #registry_init
                #(
                    registry.insert(#items, |payload| {
                        Ok(#ident::#variants(Box::new(serde_json::from_value(payload)?)))
                    });
                )*
                registry
            });

        #[doc = #unmarshal_doc]
        pub fn #unmarshal(raw: Option<&serde_json::Value>) -> Result<Option<#ident>, TdError> {
            let payload = match raw {
                None | Some(serde_json::Value::Null) => return Ok(None),
                Some(payload) => payload,
            };
            let discriminant = payload
                .get("@type")
                .and_then(serde_json::Value::as_str)
                .ok_or(TdError::MissingDiscriminant { interface: #raw_name })?;
            let decode = #registry
                .get(discriminant)
                .ok_or_else(|| TdError::UnknownDiscriminant {
                    interface: #raw_name,
                    discriminant: discriminant.to_string(),
                })?;
            decode(payload.clone()).map(Some)
        }
    }
}
