//! Generation of the shared runtime module (`shared.rs`).
//!
//! Every generated type and RPC stub depends on the items emitted here:
//! the `@type`/`@extra` header, the precision-safe `JsonInt64`, base64
//! `Bytes`, the `TdMessage` trait, the `TdError` runtime error, the
//! `Transport` seam and the `Client` that RPC stubs are attached to.

use proc_macro2::TokenStream;
use quote::quote;

/// Generates the `Header` struct embedded in every record.
pub fn generate_header() -> TokenStream {
    quote! {
        /// Fields present on every TDLib object.
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct Header {
            /// Discriminant naming the concrete type.
            #[serde(rename = "@type", default)]
            pub type_name: String,
            /// Request identifier echoed back in the matching response.
            #[serde(rename = "@extra", default, skip_serializing_if = "Option::is_none")]
            pub extra: Option<serde_json::Value>,
        }

        impl Header {
            pub fn new(type_name: &str) -> Self {
                Self {
                    type_name: type_name.to_string(),
                    extra: None,
                }
            }
        }
    }
}

/// Generates `JsonInt64` and `Bytes`, the two wire-encoded scalars.
pub fn generate_wire_scalars() -> TokenStream {
    quote! {
        /// A 64-bit integer carried as a decimal string.
        ///
        /// JSON numbers lose precision above 2^53, so TDLib quotes `int64`
        /// values. Bare numbers are accepted when decoding.
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct JsonInt64(pub i64);

        impl From<i64> for JsonInt64 {
            fn from(value: i64) -> Self {
                JsonInt64(value)
            }
        }

        impl Serialize for JsonInt64 {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for JsonInt64 {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                #[derive(Deserialize)]
                #[serde(untagged)]
                enum Repr {
                    Text(String),
                    Number(i64),
                }

                match Repr::deserialize(deserializer)? {
                    Repr::Text(text) => text.parse().map(JsonInt64).map_err(serde::de::Error::custom),
                    Repr::Number(number) => Ok(JsonInt64(number)),
                }
            }
        }

        /// Binary data carried as base64 text.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
        pub struct Bytes(pub Vec<u8>);

        impl From<Vec<u8>> for Bytes {
            fn from(value: Vec<u8>) -> Self {
                Bytes(value)
            }
        }

        impl Serialize for Bytes {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&STANDARD.encode(&self.0))
            }
        }

        impl<'de> Deserialize<'de> for Bytes {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                STANDARD.decode(text).map(Bytes).map_err(serde::de::Error::custom)
            }
        }
    }
}

/// Generates the `TdMessage` trait implemented by every class and interface.
pub fn generate_message_trait() -> TokenStream {
    quote! {
        /// A value that travels as a TDLib JSON object.
        pub trait TdMessage {
            /// The `@type` discriminant of this value.
            fn message_type(&self) -> &'static str;
        }
    }
}

/// Generates the `TdError` enum used by generated code at runtime.
pub fn generate_error_type() -> TokenStream {
    quote! {
        /// Errors raised while talking to TDLib.
        #[derive(Debug, thiserror::Error)]
        pub enum TdError {
            /// TDLib answered with an `error` object.
            #[error("TDLib error {code}: {message}")]
            Request { code: i32, message: String },

            /// A polymorphic payload carried a `@type` no variant matches.
            #[error("unknown {interface} discriminant '{discriminant}'")]
            UnknownDiscriminant {
                interface: &'static str,
                discriminant: String,
            },

            /// A polymorphic payload had no `@type`.
            #[error("missing @type for {interface}")]
            MissingDiscriminant { interface: &'static str },

            /// The response carried no value.
            #[error("empty response")]
            EmptyResponse,

            #[error("JSON error: {0}")]
            Json(#[from] serde_json::Error),

            /// The transport failed to deliver the request.
            #[error("transport error: {0}")]
            Transport(String),
        }
    }
}

/// Generates the `Transport` trait, the `Client` and `check_response`.
pub fn generate_client() -> TokenStream {
    quote! {
        /// Delivers JSON requests to a TDLib instance.
        pub trait Transport {
            /// Sends a request and waits for the matching response.
            fn send(&self, request: serde_json::Value) -> Result<serde_json::Value, TdError>;

            /// Executes a request synchronously.
            fn execute(&self, request: serde_json::Value) -> Result<serde_json::Value, TdError>;
        }

        /// Typed entry point for every TDLib method.
        #[derive(Debug)]
        pub struct Client<T> {
            transport: T,
        }

        impl<T: Transport> Client<T> {
            pub fn new(transport: T) -> Self {
                Self { transport }
            }

            pub fn transport(&self) -> &T {
                &self.transport
            }
        }

        /// Turns an `error` response into [`TdError::Request`].
        pub fn check_response(response: serde_json::Value) -> Result<serde_json::Value, TdError> {
            if response.get("@type").and_then(serde_json::Value::as_str) != Some("error") {
                return Ok(response);
            }

            let code = response
                .get("code")
                .and_then(serde_json::Value::as_i64)
                .and_then(|code| i32::try_from(code).ok())
                .unwrap_or_default();
            let message = response
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string();
            Err(TdError::Request { code, message })
        }
    }
}

/// Assembles the complete `shared.rs` module.
pub fn generate_shared_module() -> TokenStream {
    let header = generate_header();
    let wire_scalars = generate_wire_scalars();
    let message_trait = generate_message_trait();
    let error_type = generate_error_type();
    let client = generate_client();

    quote! {
        //! Types shared by every generated module.

        use base64::Engine as _;
        use base64::engine::general_purpose::STANDARD;
        use serde::{Deserialize, Serialize};

        #header

        #wire_scalars

        #message_trait

        #error_type

        #client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{format_generated_code, validate_generated_code};

    #[test]
    fn shared_module_is_valid_rust() {
        let tokens = generate_shared_module();
        assert!(validate_generated_code(&tokens).is_ok());
    }

    #[test]
    fn header_uses_raw_wire_tags() {
        let code = format_generated_code(&generate_shared_module()).unwrap();
        assert!(code.contains(r#"#[serde(rename = "@type", default)]"#));
        assert!(code.contains(r#"rename = "@extra""#));
    }

    #[test]
    fn error_type_has_every_runtime_variant() {
        let code = format_generated_code(&generate_shared_module()).unwrap();
        for variant in [
            "Request {",
            "UnknownDiscriminant {",
            "MissingDiscriminant {",
            "EmptyResponse,",
            "Json(#[from] serde_json::Error)",
            "Transport(String)",
        ] {
            assert!(code.contains(variant), "missing {variant}");
        }
    }

    #[test]
    fn client_exposes_both_send_paths() {
        let code = format_generated_code(&generate_client()).unwrap();
        assert!(code.contains("fn send(&self, request: serde_json::Value)"));
        assert!(code.contains("fn execute(&self, request: serde_json::Value)"));
        assert!(code.contains("pub fn check_response("));
    }
}
