//! Generation of record structs.
//!
//! Each class becomes a struct that flattens the shared `Header` and carries
//! one field per property, tagged with the raw schema name:
//!
//! ```ignore
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! pub struct FormattedText {
//!     #[serde(flatten)]
//!     pub header: Header,
//!     #[serde(rename = "text", default)]
//!     pub text: String,
//!     #[serde(rename = "entities", default)]
//!     pub entities: Vec<TextEntity>,
//! }
//! ```
//!
//! Classes holding interface-typed properties get a hand-written
//! `Deserialize` that routes those properties through the interface
//! dispatch functions.

use proc_macro2::TokenStream;
use quote::quote;
use tlgen_define::{Class, Property};

use super::names::NameTable;
use super::types::{doc_text, field_type};

/// Clippy's default `too_many_arguments` threshold.
const MAX_CONSTRUCTOR_ARGS: usize = 7;

/// Generates the struct and impls for one class.
pub fn generate_class(names: &NameTable, class: &Class) -> TokenStream {
    let ident = names.type_ident(&class.name);
    let raw_name = class.name.as_str();
    let custom_deserialize = class.has_interface_properties();

    let doc = doc_text(&class.description).map(|d| quote! { #[doc = #d] });
    let derives = if custom_deserialize {
        quote! { #[derive(Debug, Clone, PartialEq, Serialize)] }
    } else {
        quote! { #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)] }
    };

    let fields: Vec<TokenStream> = class.properties.iter().map(|p| field_decl(names, p, true)).collect();
    let constructor = generate_constructor(names, class);

    let default_impl = class.properties.is_empty().then(|| {
        quote! {
            impl Default for #ident {
                fn default() -> Self {
                    Self::new()
                }
            }
        }
    });

    let variant_accessor = class
        .is_variant()
        .then(|| generate_variant_accessor(names, class));

    let deserialize_impl = custom_deserialize.then(|| generate_deserialize(names, class));

    quote! {
        #doc
        #derives
        pub struct #ident {
            #[serde(flatten)]
            pub header: Header,
            #(#fields)*
        }

        #constructor

        impl TdMessage for #ident {
            fn message_type(&self) -> &'static str {
                #raw_name
            }
        }

        #default_impl

        #variant_accessor

        #deserialize_impl
    }
}

/// One struct field with its serde tag.
fn field_decl(names: &NameTable, property: &Property, public: bool) -> TokenStream {
    let field = names.field_ident(&property.name);
    let raw = property.name.as_str();
    let ty = field_type(names, &property.ty);
    let doc = doc_text(&property.description).map(|d| quote! { #[doc = #d] });
    let vis = public.then(|| quote! { pub });

    quote! {
        #doc
        #[serde(rename = #raw, default)]
        #vis #field: #ty,
    }
}

fn generate_constructor(names: &NameTable, class: &Class) -> TokenStream {
    let ident = names.type_ident(&class.name);
    let raw_name = class.name.as_str();
    let params: Vec<_> = class.properties.iter().map(|p| names.field_ident(&p.name)).collect();
    let types: Vec<_> = class.properties.iter().map(|p| field_type(names, &p.ty)).collect();
    let allow = (params.len() > MAX_CONSTRUCTOR_ARGS).then(|| quote! { #[allow(clippy::too_many_arguments)] });
    let doc = format!(" Creates a `{}` with `@type` set.", raw_name);

    quote! {
        impl #ident {
            #[doc = #doc]
            #allow
            pub fn new(#(#params: #types),*) -> Self {
                Self {
                    header: Header::new(#raw_name),
                    #(#params,)*
                }
            }
        }
    }
}

fn generate_variant_accessor(names: &NameTable, class: &Class) -> TokenStream {
    let ident = names.type_ident(&class.name);
    let enum_ident = names.enum_ident(&class.root_name);
    let enum_method = names.enum_method(&class.root_name);
    let variant = names.variant_ident(&class.name);

    quote! {
        impl #ident {
            pub fn #enum_method(&self) -> #enum_ident {
                #enum_ident::#variant
            }
        }
    }
}

/// `Deserialize` for classes with interface-typed properties.
///
/// Structural fields go through an inner derived struct. Direct interface
/// fields are looked up by raw name and passed to the interface's dispatch
/// function; interface sequences use the interface's own `Deserialize`.
fn generate_deserialize(names: &NameTable, class: &Class) -> TokenStream {
    let ident = names.type_ident(&class.name);

    let (interface_props, structural_props): (Vec<&Property>, Vec<&Property>) =
        class.properties.iter().partition(|p| p.ty.is_interface());

    let structural_fields: Vec<_> = structural_props.iter().map(|p| field_decl(names, p, false)).collect();
    let structural_names: Vec<_> = structural_props.iter().map(|p| names.field_ident(&p.name)).collect();

    let interface_inits: Vec<TokenStream> = interface_props
        .iter()
        .map(|p| {
            let field = names.field_ident(&p.name);
            let raw = p.name.as_str();
            if p.ty.is_direct_interface() {
                let interface = p.ty.referenced_name().unwrap_or_default();
                let unmarshal = names.unmarshal_fn(interface);
                quote! {
                    #field: #unmarshal(payload.get(#raw))
                        .map_err(<D::Error as serde::de::Error>::custom)?,
                }
            } else {
                let ty = field_type(names, &p.ty);
                quote! {
                    #field: match payload.get(#raw) {
                        None | Some(serde_json::Value::Null) => Default::default(),
                        Some(value) => <#ty as Deserialize>::deserialize(value)
                            .map_err(<D::Error as serde::de::Error>::custom)?,
                    },
                }
            }
        })
        .collect();

    quote! {
        impl<'de> Deserialize<'de> for #ident {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                #[derive(Deserialize)]
                struct Structural {
                    #[serde(flatten)]
                    header: Header,
                    #(#structural_fields)*
                }

                let payload = serde_json::Value::deserialize(deserializer)?;
                let structural =
                    Structural::deserialize(&payload).map_err(<D::Error as serde::de::Error>::custom)?;

                Ok(Self {
                    header: structural.header,
                    #(#structural_names: structural.#structural_names,)*
                    #(#interface_inits)*
                })
            }
        }
    }
}
