//! The resolved schema model.
//!
//! A [`Schema`] is built once per generator run from the declarations found
//! in a TL file and is never mutated afterwards. Code generation reads it
//! through the lookup helpers defined here.

use serde::{Deserialize, Serialize};

use crate::types::ResolvedType;

/// Suffix appended to an interface name to form its discriminant type name.
pub const ENUM_SUFFIX: &str = "Enum";

/// A single property of a class or parameter of a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Raw schema identifier; reproduced verbatim on the wire.
    pub name: String,
    /// Raw type string as written in the schema (e.g. `vector<int64>`).
    pub raw_type: String,
    /// Human-readable description, possibly empty.
    pub description: String,
    /// Classified form of `raw_type`.
    pub ty: ResolvedType,
}

/// An abstract type family such as `MessageContent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,
    pub description: String,
}

impl Interface {
    /// Name of the discriminant enum belonging to this interface.
    pub fn enum_type(&self) -> String {
        format!("{}{}", self.name, ENUM_SUFFIX)
    }
}

/// The closed set of classes implementing one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enum {
    /// Discriminant type name, `<Interface>Enum`.
    pub enum_type: String,
    /// Name of the owning interface.
    pub interface: String,
    /// Class names in declaration order.
    pub items: Vec<String>,
}

/// A concrete record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub name: String,
    pub description: String,
    /// The owning interface, or `name` itself for a standalone class.
    pub root_name: String,
    pub properties: Vec<Property>,
}

impl Class {
    /// Returns true when this class is a variant of some interface.
    pub fn is_variant(&self) -> bool {
        self.root_name != self.name
    }

    /// Returns true when at least one property is interface-typed.
    pub fn has_interface_properties(&self) -> bool {
        self.properties.iter().any(|p| p.ty.is_interface())
    }
}

/// An RPC method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub description: String,
    /// Declared class or interface name returned by the method.
    pub return_type: String,
    pub properties: Vec<Property>,
    /// True when TDLib allows executing the method synchronously.
    pub is_synchronous: bool,
}

/// The whole resolved schema.
///
/// ## Examples
///
/// ```
/// use tlgen_define::{Class, Schema};
///
/// let schema = Schema {
///     classes: vec![Class {
///         name: "ok".to_string(),
///         description: "An object of this type is returned on success".to_string(),
///         root_name: "ok".to_string(),
///         properties: vec![],
///     }],
///     ..Default::default()
/// };
///
/// assert!(schema.class("ok").is_some());
/// assert!(!schema.is_interface("Ok"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub interfaces: Vec<Interface>,
    pub enums: Vec<Enum>,
    pub classes: Vec<Class>,
    pub functions: Vec<Function>,
}

impl Schema {
    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    pub fn is_interface(&self, name: &str) -> bool {
        self.interface(name).is_some()
    }

    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Returns the first enum whose discriminant type matches the interface.
    ///
    /// Later enums with the same discriminant type name are ignored.
    pub fn enum_for(&self, interface: &str) -> Option<&Enum> {
        let enum_type = format!("{}{}", interface, ENUM_SUFFIX);
        self.enums.iter().find(|e| e.enum_type == enum_type)
    }

    /// Variant classes of an interface, in declaration order.
    pub fn variants_of<'a>(&'a self, interface: &'a str) -> impl Iterator<Item = &'a Class> + 'a {
        self.classes.iter().filter(move |c| c.is_variant() && c.root_name == interface)
    }

    /// Root type names in first-appearance order: interfaces first, then
    /// standalone classes.
    pub fn root_names(&self) -> Vec<&str> {
        let mut roots: Vec<&str> = self.interfaces.iter().map(|i| i.name.as_str()).collect();
        roots.extend(
            self.classes
                .iter()
                .filter(|c| !c.is_variant())
                .map(|c| c.name.as_str()),
        );
        roots
    }

    /// Distinct function return types in first-appearance order.
    pub fn return_types(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for function in &self.functions {
            if !seen.contains(&function.return_type.as_str()) {
                seen.push(&function.return_type);
            }
        }
        seen
    }
}

/// Lower-cases the first character of an identifier.
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Upper-cases the first character of an identifier.
pub fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
