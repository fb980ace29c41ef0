//! Rust identifiers for every schema entity.
//!
//! The [`NameTable`] is computed once per run so every generator agrees on
//! the identifier of a class, interface, discriminant variant or module,
//! including the suffixes added when two raw names normalize to the same
//! Rust name.

use std::collections::{HashMap, HashSet};

use proc_macro2::Ident;
use quote::format_ident;
use tlgen_define::Schema;

use crate::naming::{Role, normalize, strip_variant_prefix, to_screaming_snake_case};

/// Suffix appended until a generated type name is unique.
const COLLISION_SUFFIX: &str = "Object";

/// Identifiers reserved for the generated `Client` type.
const CLIENT_METHODS: &[&str] = &["new", "transport"];

/// Per-run table of generated Rust names.
#[derive(Debug, Default)]
pub struct NameTable {
    types: HashMap<String, String>,
    enums: HashMap<String, String>,
    variants: HashMap<String, String>,
    modules: HashMap<String, String>,
}

impl NameTable {
    /// Assigns names for every interface and class, interfaces first.
    pub fn new(schema: &Schema) -> Self {
        let mut table = NameTable::default();
        let mut taken: HashSet<String> = HashSet::new();
        let mut taken_modules: HashSet<String> = HashSet::new();

        for interface in &schema.interfaces {
            let name = unique(normalize(&interface.name, Role::ExportedType), &mut taken, COLLISION_SUFFIX);
            table.types.insert(interface.name.clone(), name);
        }
        for interface in &schema.interfaces {
            let name = unique(normalize(&interface.enum_type(), Role::ExportedType), &mut taken, COLLISION_SUFFIX);
            table.enums.insert(interface.name.clone(), name);
        }
        for class in &schema.classes {
            let name = unique(normalize(&class.name, Role::ExportedType), &mut taken, COLLISION_SUFFIX);
            table.types.insert(class.name.clone(), name);
        }

        let entity_names = schema
            .interfaces
            .iter()
            .map(|i| &i.name)
            .chain(schema.classes.iter().map(|c| &c.name));
        for raw in entity_names {
            let module = unique(normalize(raw, Role::UnexportedLocal), &mut taken_modules, "_");
            table.modules.insert(raw.clone(), module);
        }

        for interface in &schema.interfaces {
            let Some(e) = schema.enum_for(&interface.name) else {
                continue;
            };
            let interface_name = table.type_name(&interface.name).to_string();
            let mut used: HashSet<String> = HashSet::new();
            for item in &e.items {
                let full = table.type_name(item).to_string();
                let variant = strip_variant_prefix(&full, &interface_name)
                    .filter(|short| normalize(short, Role::EnumConstant) == *short)
                    .filter(|short| !used.contains(*short))
                    .map(str::to_string)
                    .unwrap_or(full);
                used.insert(variant.clone());
                table.variants.insert(item.clone(), variant);
            }
        }

        table
    }

    /// Rust type name of a class or interface.
    pub fn type_name<'a>(&'a self, raw: &'a str) -> &'a str {
        self.types.get(raw).map_or(raw, String::as_str)
    }

    pub fn type_ident(&self, raw: &str) -> Ident {
        format_ident!("{}", self.type_name(raw))
    }

    /// Discriminant enum of an interface, e.g. `MessageContentEnum`.
    pub fn enum_ident(&self, interface: &str) -> Ident {
        match self.enums.get(interface) {
            Some(name) => format_ident!("{}", name),
            None => format_ident!("{}Enum", self.type_name(interface)),
        }
    }

    /// Variant of a class inside its interface and discriminant enums.
    pub fn variant_ident(&self, class: &str) -> Ident {
        match self.variants.get(class) {
            Some(name) => format_ident!("{}", name),
            None => self.type_ident(class),
        }
    }

    /// Snake-case module (and file stem) of a root type.
    pub fn module_name<'a>(&'a self, raw: &'a str) -> &'a str {
        self.modules.get(raw).map_or(raw, String::as_str)
    }

    /// Contract method returning the discriminant, e.g. `message_content_enum`.
    pub fn enum_method(&self, interface: &str) -> Ident {
        format_ident!("{}_enum", normalize(self.type_name(interface), Role::ExportedField).trim_end_matches('_'))
    }

    pub fn unmarshal_fn(&self, interface: &str) -> Ident {
        format_ident!("unmarshal_{}", normalize(self.type_name(interface), Role::ExportedField).trim_end_matches('_'))
    }

    pub fn registry_ident(&self, interface: &str) -> Ident {
        format_ident!("{}_REGISTRY", to_screaming_snake_case(self.type_name(interface)))
    }

    pub fn decoder_ident(&self, interface: &str) -> Ident {
        format_ident!("{}Decoder", self.type_name(interface))
    }

    /// Struct field or parameter name.
    pub fn field_ident(&self, raw: &str) -> Ident {
        format_ident!("{}", normalize(raw, Role::ExportedField))
    }

    /// `Client` method name of an RPC function.
    pub fn method_ident(&self, function: &str) -> Ident {
        let name = normalize(function, Role::ExportedField);
        if CLIENT_METHODS.contains(&name.as_str()) {
            format_ident!("{}_", name)
        } else {
            format_ident!("{}", name)
        }
    }

    /// Local binding holding a decoded result of the given return type.
    pub fn result_binding(&self, return_type: &str) -> Ident {
        format_ident!("{}", normalize(return_type, Role::UnexportedLocal))
    }
}

fn unique(mut name: String, taken: &mut HashSet<String>, suffix: &str) -> String {
    while taken.contains(&name) {
        name.push_str(suffix);
    }
    taken.insert(name.clone());
    name
}
