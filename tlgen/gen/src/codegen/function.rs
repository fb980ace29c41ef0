//! Generation of RPC stubs.
//!
//! Every TL function becomes a method on the generated `Client`:
//!
//! ```ignore
//! impl<T: Transport> Client<T> {
//!     pub fn get_file(&self, file_id: i32) -> Result<File, TdError> {
//!         let request = serde_json::json!({ "@type": "getFile", "file_id": file_id });
//!         let response = check_response(self.transport().send(request)?)?;
//!         let file: File = serde_json::from_value(response)?;
//!         Ok(file)
//!     }
//! }
//! ```

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use tlgen_define::{Function, Schema};

use super::names::NameTable;
use super::types::{doc_text, field_type};

/// Locals used by every stub body.
const RESERVED_LOCALS: &[&str] = &["request", "response"];

/// Generates the `Client` method for one function.
pub fn generate_function(schema: &Schema, names: &NameTable, function: &Function) -> TokenStream {
    let method = names.method_ident(&function.name);
    let raw_name = function.name.as_str();
    let return_ident = names.type_ident(&function.return_type);
    let result = names.result_binding(&function.return_type);
    let result_name = result.to_string();

    let params: Vec<_> = function
        .properties
        .iter()
        .map(|p| {
            let ident = names.field_ident(&p.name);
            let name = ident.to_string();
            if name == result_name || RESERVED_LOCALS.contains(&name.as_str()) {
                format_ident!("{}_", name)
            } else {
                ident
            }
        })
        .collect();
    let types: Vec<_> = function.properties.iter().map(|p| field_type(names, &p.ty)).collect();
    let raw_params: Vec<_> = function.properties.iter().map(|p| p.name.as_str()).collect();

    let send = if function.is_synchronous {
        quote! { execute }
    } else {
        quote! { send }
    };

    let decode = if schema.is_interface(&function.return_type) {
        let unmarshal = names.unmarshal_fn(&function.return_type);
        quote! {
            let #result = #unmarshal(Some(&response))?.ok_or(TdError::EmptyResponse)?;
        }
    } else {
        quote! {
            let #result: #return_ident = serde_json::from_value(response)?;
        }
    };

    let doc = doc_text(&function.description).map(|d| quote! { #[doc = #d] });
    let allow = (params.len() > 6).then(|| quote! { #[allow(clippy::too_many_arguments)] });

    quote! {
        impl<T: Transport> Client<T> {
            #doc
            #allow
            pub fn #method(&self #(, #params: #types)*) -> Result<#return_ident, TdError> {
                let request = serde_json::json!({
                    "@type": #raw_name
                    #(, #raw_params: #params)*
                });
                let response = check_response(self.transport().#send(request)?)?;
                #decode
                Ok(#result)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{format_generated_code, sample_schema, validate_generated_code};

    fn render(function: &str) -> String {
        let schema = sample_schema();
        let names = NameTable::new(&schema);
        let tokens = generate_function(&schema, &names, schema.function(function).unwrap());
        assert!(validate_generated_code(&tokens).is_ok());
        format_generated_code(&tokens).unwrap()
    }

    #[test]
    fn asynchronous_stub_uses_send() {
        let code = render("getFile");
        assert!(code.contains("pub fn get_file(&self, file_id: i32) -> Result<File, TdError>"));
        let compact: String = code.split_whitespace().collect();
        assert!(compact.contains(r#""@type":"getFile""#));
        assert!(compact.contains(r#""file_id":file_id"#));
        assert!(code.contains("self.transport().send(request)?"));
        assert!(code.contains("let file: File = serde_json::from_value(response)?;"));
    }

    #[test]
    fn synchronous_stub_uses_execute() {
        let code = render("getLogVerbosityLevel");
        assert!(code.contains("self.transport().execute(request)?"));
    }

    #[test]
    fn interface_return_uses_dispatch() {
        let code = render("getAuthorizationState");
        assert!(code.contains("unmarshal_authorization_state(Some(&response))?"));
        assert!(code.contains("TdError::EmptyResponse"));
    }

    #[test]
    fn parameters_use_field_types() {
        let code = render("sendMessage");
        assert!(code.contains("chat_id: i64"));
        assert!(code.contains("input_message_content: Option<MessageContent>"));
        assert!(code.contains("-> Result<Message, TdError>"));
    }

    #[test]
    fn keyword_parameter_keeps_raw_wire_name() {
        let code = render("getMessages");
        assert!(code.contains("type_: Option<TextEntityType>"));
        let compact: String = code.split_whitespace().collect();
        assert!(compact.contains(r#""type":type_"#));
        assert!(code.contains("message_ids: Vec<i64>"));
    }

    #[test]
    fn parameter_colliding_with_result_binding_is_suffixed() {
        let schema = crate::builder::build_schema(
            crate::parser::parse_schema(
                "file id:int32 = File;\n---functions---\ncopyFile file:file request:int32 = File;",
            )
            .unwrap(),
        )
        .unwrap();
        let names = NameTable::new(&schema);
        let tokens = generate_function(&schema, &names, schema.function("copyFile").unwrap());
        let code = format_generated_code(&tokens).unwrap();

        assert!(code.contains("file_: Option<Box<File>>"));
        assert!(code.contains("request_: i32"));
        let compact: String = code.split_whitespace().collect();
        assert!(compact.contains(r#""file":file_"#));
        assert!(code.contains("let file: File ="));
    }
}
