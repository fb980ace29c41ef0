//! Semantic model builder.
//!
//! Turns the flat declaration list produced by the [parser](crate::parser)
//! into a resolved [`Schema`]: every class gets its root, every property type
//! is classified, interface families get their discriminant enums and every
//! function return type is checked against the declared names.

use std::collections::HashSet;
use std::str::FromStr;

use tlgen_define::prelude::*;
use tlgen_define::{lower_first, split_sequence_wrappers, upper_first};
use tracing::{debug, info, instrument};

use crate::errors::GeneratorError;
use crate::parser::{ClassDecl, Declaration, FunctionDecl, InterfaceDecl, RawProperty};

/// Resolves type names against the declared interfaces and classes.
struct Resolver<'a> {
    interfaces: HashSet<&'a str>,
    classes: HashSet<&'a str>,
}

impl<'a> Resolver<'a> {
    /// Interface first, then class by exact or first-letter-lowered name.
    fn resolve_name(&self, name: &str) -> Option<TypeKind> {
        if self.interfaces.contains(name) {
            return Some(TypeKind::Interface(name.to_string()));
        }
        if self.classes.contains(name) {
            return Some(TypeKind::Record(name.to_string()));
        }
        let lowered = lower_first(name);
        self.classes
            .contains(lowered.as_str())
            .then_some(TypeKind::Record(lowered))
    }

    fn classify(&self, entity: &str, raw_type: &str) -> Result<ResolvedType, GeneratorError> {
        let (depth, inner) =
            split_sequence_wrappers(raw_type).map_err(|source| GeneratorError::InvalidType {
                entity: entity.to_string(),
                raw_type: raw_type.to_string(),
                source,
            })?;

        if let Ok(scalar) = ScalarType::from_str(inner) {
            return Ok(ResolvedType::new(depth, TypeKind::Scalar(scalar)));
        }

        self.resolve_name(inner)
            .map(|kind| ResolvedType::new(depth, kind))
            .ok_or_else(|| GeneratorError::unresolved(entity, inner))
    }

    fn properties(&self, owner: &str, raw: Vec<RawProperty>) -> Result<Vec<Property>, GeneratorError> {
        raw.into_iter()
            .map(|prop| {
                let entity = format!("{}.{}", owner, prop.name);
                let ty = self.classify(&entity, &prop.type_name)?;
                Ok(Property {
                    name: prop.name,
                    raw_type: prop.type_name,
                    description: prop.description,
                    ty,
                })
            })
            .collect()
    }
}

/// Builds the resolved schema from parsed declarations.
///
/// ## Errors
///
/// - `DuplicateDeclaration` when two interfaces, classes or functions share a name
/// - `UnresolvedReference` for an unknown class root, property type or return type
/// - `InvalidType` for an unbalanced `vector<...>` wrapper
#[instrument(skip_all, fields(declarations = declarations.len()))]
pub fn build_schema(declarations: Vec<Declaration>) -> Result<Schema, GeneratorError> {
    let mut interface_decls: Vec<InterfaceDecl> = Vec::new();
    let mut class_decls: Vec<ClassDecl> = Vec::new();
    let mut function_decls: Vec<FunctionDecl> = Vec::new();
    for declaration in declarations {
        match declaration {
            Declaration::Interface(decl) => interface_decls.push(decl),
            Declaration::Class(decl) => class_decls.push(decl),
            Declaration::Function(decl) => function_decls.push(decl),
        }
    }

    let interfaces: Vec<Interface> = interface_decls
        .into_iter()
        .map(|decl| Interface {
            name: decl.name,
            description: decl.description,
        })
        .collect();

    let interface_names = unique_names("interface", interfaces.iter().map(|i| i.name.as_str()))?;
    let class_names = unique_names("class", class_decls.iter().map(|d| d.name.as_str()))?;
    unique_names("function", function_decls.iter().map(|d| d.name.as_str()))?;

    let resolver = Resolver {
        interfaces: interface_names,
        classes: class_names,
    };

    let classes = class_decls
        .iter()
        .cloned()
        .map(|decl| {
            let root_name = resolve_root(&resolver, &decl)?;
            let properties = resolver.properties(&decl.name, decl.properties)?;
            Ok(Class {
                name: decl.name,
                description: decl.description,
                root_name,
                properties,
            })
        })
        .collect::<Result<Vec<_>, GeneratorError>>()?;

    let functions = function_decls
        .into_iter()
        .map(|decl| {
            let return_type = match resolver.resolve_name(&decl.return_type) {
                Some(TypeKind::Interface(name) | TypeKind::Record(name)) => name,
                _ => return Err(GeneratorError::unresolved(&decl.name, &decl.return_type)),
            };
            let properties = resolver.properties(&decl.name, decl.properties)?;
            Ok(Function {
                name: decl.name,
                description: decl.description,
                return_type,
                properties,
                is_synchronous: decl.is_synchronous,
            })
        })
        .collect::<Result<Vec<_>, GeneratorError>>()?;

    let enums: Vec<Enum> = interfaces
        .iter()
        .filter_map(|interface| {
            let items: Vec<String> = classes
                .iter()
                .filter(|c| c.is_variant() && c.root_name == interface.name)
                .map(|c| c.name.clone())
                .collect();
            if items.is_empty() {
                debug!(interface = %interface.name, "interface has no variants");
                return None;
            }
            Some(Enum {
                enum_type: interface.enum_type(),
                interface: interface.name.clone(),
                items,
            })
        })
        .collect();

    let schema = Schema {
        interfaces,
        enums,
        classes,
        functions,
    };
    verify(&schema)?;

    info!(
        interfaces = schema.interfaces.len(),
        classes = schema.classes.len(),
        functions = schema.functions.len(),
        "resolved schema"
    );
    Ok(schema)
}

fn resolve_root(resolver: &Resolver<'_>, decl: &ClassDecl) -> Result<String, GeneratorError> {
    if resolver.interfaces.contains(decl.root.as_str()) {
        Ok(decl.root.clone())
    } else if decl.root == upper_first(&decl.name) {
        Ok(decl.name.clone())
    } else {
        Err(GeneratorError::unresolved(&decl.name, &decl.root))
    }
}

fn unique_names<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<HashSet<&'a str>, GeneratorError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(GeneratorError::DuplicateDeclaration {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(seen)
}

/// Checks that enum items and class roots agree with each other.
fn verify(schema: &Schema) -> Result<(), GeneratorError> {
    let mut claimed: HashSet<&str> = HashSet::new();
    for e in &schema.enums {
        for item in &e.items {
            let owned = schema
                .class(item)
                .is_some_and(|c| c.root_name == e.interface);
            if !owned || !claimed.insert(item.as_str()) {
                return Err(GeneratorError::unresolved(&e.enum_type, item));
            }
        }
    }

    for class in schema.classes.iter().filter(|c| c.is_variant()) {
        if !claimed.contains(class.name.as_str()) {
            return Err(GeneratorError::unresolved(&class.name, &class.root_name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_schema;
    use crate::test_utils::SAMPLE_SCHEMA;

    fn build(text: &str) -> Result<Schema, GeneratorError> {
        build_schema(parse_schema(text)?)
    }

    #[test]
    fn standalone_class_roots_at_itself() {
        let schema = build("testA value:string = TestA;").unwrap();
        let class = schema.class("testA").unwrap();
        assert_eq!(class.root_name, "testA");
        assert!(!class.is_variant());
        assert!(schema.enums.is_empty());
    }

    #[test]
    fn interface_family_gets_enum_in_declaration_order() {
        let schema = build(
            "//@class AbstractX @description Family\n\
             variantOne = AbstractX;\n\
             variantTwo value:int32 = AbstractX;",
        )
        .unwrap();

        let e = schema.enum_for("AbstractX").unwrap();
        assert_eq!(e.enum_type, "AbstractXEnum");
        assert_eq!(e.items, vec!["variantOne", "variantTwo"]);
        assert_eq!(schema.class("variantTwo").unwrap().root_name, "AbstractX");
    }

    #[test]
    fn interface_without_variants_has_no_enum() {
        let schema = build("//@class Lonely @description Nothing implements it").unwrap();
        assert!(schema.is_interface("Lonely"));
        assert!(schema.enum_for("Lonely").is_none());
    }

    #[test]
    fn property_types_are_classified() {
        let schema = build(
            "//@class Content @description Payload\n\
             contentText text:string = Content;\n\
             item id:int53 size:int64 = Item;\n\
             holder items:vector<item> single:Item content:Content nested:vector<vector<Content>> = Holder;",
        )
        .unwrap();

        let item = schema.class("item").unwrap();
        assert_eq!(item.properties[0].ty, ResolvedType::scalar(ScalarType::Int53));
        assert!(!item.properties[0].ty.requires_precision_wrapper());
        assert!(item.properties[1].ty.requires_precision_wrapper());

        let holder = schema.class("holder").unwrap();
        let kinds: Vec<_> = holder.properties.iter().map(|p| p.ty.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                ResolvedType::new(1, TypeKind::Record("item".to_string())),
                ResolvedType::new(0, TypeKind::Record("item".to_string())),
                ResolvedType::new(0, TypeKind::Interface("Content".to_string())),
                ResolvedType::new(2, TypeKind::Interface("Content".to_string())),
            ]
        );
        assert!(holder.has_interface_properties());
    }

    #[test]
    fn forward_references_resolve() {
        let schema = build("first next:second = First;\nsecond = Second;").unwrap();
        assert_eq!(
            schema.class("first").unwrap().properties[0].ty,
            ResolvedType::new(0, TypeKind::Record("second".to_string()))
        );
    }

    #[test]
    fn unknown_property_type_is_unresolved() {
        let err = build("testA value:Missing = TestA;").unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::UnresolvedReference { ref entity, ref reference }
                if entity == "testA.value" && reference == "Missing"
        ));
    }

    #[test]
    fn unknown_root_is_unresolved() {
        let err = build("testA = SomethingElse;").unwrap_err();
        assert!(matches!(err, GeneratorError::UnresolvedReference { .. }));
    }

    #[test]
    fn unbalanced_vector_is_invalid_type() {
        let err = build("testA values:vector<int32 = TestA;").unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidType { .. }));
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let err = build("ok = Ok;\nok = Ok;").unwrap_err();
        assert!(matches!(err, GeneratorError::DuplicateDeclaration { kind: "class", .. }));

        let err = build("ok = Ok;\n---functions---\nclose = Ok;\nclose = Ok;").unwrap_err();
        assert!(matches!(err, GeneratorError::DuplicateDeclaration { kind: "function", .. }));
    }

    #[test]
    fn function_return_types_resolve() {
        let schema = build(
            "ok = Ok;\n//@class State @description S\nstateReady = State;\n\
             ---functions---\nclose = Ok;\ngetState = State;",
        )
        .unwrap();
        assert_eq!(schema.function("close").unwrap().return_type, "ok");
        assert_eq!(schema.function("getState").unwrap().return_type, "State");
    }

    #[test]
    fn unknown_return_type_is_unresolved() {
        let err = build("---functions---\ngetThing = Thing;").unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::UnresolvedReference { ref reference, .. } if reference == "Thing"
        ));
    }

    #[test]
    fn sample_schema_builds() {
        let schema = build(SAMPLE_SCHEMA).unwrap();

        for e in &schema.enums {
            let variants: Vec<_> = schema.variants_of(&e.interface).map(|c| c.name.clone()).collect();
            assert_eq!(variants, e.items);
        }
        assert!(schema.function("getLogVerbosityLevel").unwrap().is_synchronous);
        assert!(!schema.function("sendMessage").unwrap().is_synchronous);
    }
}
