//! Fragment merge and validation.
//!
//! Merging honors cross-service type extension: `extend type` folds into the
//! base definition from any fragment, root operation types merge field-wise
//! across services, and duplicate non-root definitions are accepted only when
//! structurally identical (value types). Fields marked `@external` on an
//! extension are entity-reference stubs owned by another service and are
//! excluded from both conflict checks and the merged output.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use graphql_parser::schema::{
    Definition, DirectiveDefinition, Document, Field, InputValue, ObjectType, Type,
    TypeDefinition, TypeExtension, parse_schema,
};

use super::{CompositionError, ServiceFragment, UnifiedSchema};

const BUILTIN_SCALARS: [&str; 5] = ["String", "Int", "Float", "Boolean", "ID"];
const ROOT_TYPES: [&str; 3] = ["Query", "Mutation", "Subscription"];

/// Merges the active fragment of every service into one validated schema.
///
/// Returns either a complete unified schema or the full error list, never a
/// partial result. An empty fragment list composes to an empty schema.
pub fn compose(fragments: &[ServiceFragment]) -> Result<UnifiedSchema, Vec<CompositionError>> {
    if fragments.is_empty() {
        return Ok(UnifiedSchema::empty());
    }

    let mut parse_errors = Vec::new();
    let mut docs = Vec::new();
    for fragment in fragments {
        match parse_schema::<String>(&fragment.type_defs) {
            Ok(doc) => docs.push(doc),
            Err(e) => parse_errors.push(CompositionError::Parse {
                service: fragment.service_name.clone(),
                message: e.to_string(),
            }),
        }
    }
    if !parse_errors.is_empty() {
        return Err(parse_errors);
    }

    let mut errors = Vec::new();
    let mut merged = Merged::default();
    let mut extensions = Vec::new();

    for doc in docs {
        for definition in doc.definitions {
            match definition {
                Definition::TypeDefinition(td) => merged.add_type(td, &mut errors),
                Definition::TypeExtension(ext) => extensions.push(ext),
                Definition::DirectiveDefinition(dd) => merged.add_directive(dd),
                Definition::SchemaDefinition(_) => {}
            }
        }
    }

    for ext in extensions {
        merged.apply_extension(ext, &mut errors);
    }

    merged.validate(&mut errors);

    if errors.is_empty() {
        Ok(UnifiedSchema {
            sdl: merged.render(),
        })
    } else {
        Err(errors)
    }
}

#[derive(Default)]
struct Merged<'a> {
    order: Vec<String>,
    types: HashMap<String, TypeDefinition<'a, String>>,
    directives: Vec<DirectiveDefinition<'a, String>>,
}

impl<'a> Merged<'a> {
    fn add_type(&mut self, td: TypeDefinition<'a, String>, errors: &mut Vec<CompositionError>) {
        let name = type_name(&td).to_string();
        match self.types.entry(name.clone()) {
            Entry::Vacant(slot) => {
                self.order.push(name);
                slot.insert(td);
            }
            Entry::Occupied(mut slot) => match (slot.get_mut(), td) {
                (TypeDefinition::Object(base), TypeDefinition::Object(incoming))
                    if ROOT_TYPES.contains(&name.as_str()) =>
                {
                    merge_object_fields(base, incoming.fields, &name, false, errors);
                }
                (existing, incoming) => {
                    // Value types: identical definitions may be repeated freely.
                    if existing.to_string() != incoming.to_string() {
                        errors.push(CompositionError::TypeConflict { type_name: name });
                    }
                }
            },
        }
    }

    fn add_directive(&mut self, dd: DirectiveDefinition<'a, String>) {
        if !self.directives.iter().any(|d| d.name == dd.name) {
            self.directives.push(dd);
        }
    }

    fn apply_extension(&mut self, ext: TypeExtension<'a, String>, errors: &mut Vec<CompositionError>) {
        match ext {
            TypeExtension::Object(ext) => match self.types.get_mut(&ext.name) {
                Some(TypeDefinition::Object(base)) => {
                    merge_object_fields(base, ext.fields, &ext.name, true, errors);
                    for interface in ext.implements_interfaces {
                        if !base.implements_interfaces.contains(&interface) {
                            base.implements_interfaces.push(interface);
                        }
                    }
                }
                Some(_) => errors.push(CompositionError::TypeConflict {
                    type_name: ext.name.clone(),
                }),
                None => errors.push(CompositionError::ExtensionWithoutBase {
                    type_name: ext.name.clone(),
                }),
            },
            TypeExtension::Interface(ext) => match self.types.get_mut(&ext.name) {
                Some(TypeDefinition::Interface(base)) => {
                    for field in ext.fields {
                        match base.fields.iter().find(|f| f.name == field.name) {
                            Some(existing) if field_signature(existing) == field_signature(&field) => {}
                            Some(_) => errors.push(CompositionError::FieldConflict {
                                type_name: ext.name.clone(),
                                field_name: field.name.clone(),
                            }),
                            None => base.fields.push(field),
                        }
                    }
                }
                Some(_) => errors.push(CompositionError::TypeConflict {
                    type_name: ext.name.clone(),
                }),
                None => errors.push(CompositionError::ExtensionWithoutBase {
                    type_name: ext.name.clone(),
                }),
            },
            TypeExtension::Enum(ext) => match self.types.get_mut(&ext.name) {
                Some(TypeDefinition::Enum(base)) => {
                    for value in ext.values {
                        if !base.values.iter().any(|v| v.name == value.name) {
                            base.values.push(value);
                        }
                    }
                }
                Some(_) => errors.push(CompositionError::TypeConflict {
                    type_name: ext.name.clone(),
                }),
                None => errors.push(CompositionError::ExtensionWithoutBase {
                    type_name: ext.name.clone(),
                }),
            },
            TypeExtension::Union(ext) => match self.types.get_mut(&ext.name) {
                Some(TypeDefinition::Union(base)) => {
                    for member in ext.types {
                        if !base.types.contains(&member) {
                            base.types.push(member);
                        }
                    }
                }
                Some(_) => errors.push(CompositionError::TypeConflict {
                    type_name: ext.name.clone(),
                }),
                None => errors.push(CompositionError::ExtensionWithoutBase {
                    type_name: ext.name.clone(),
                }),
            },
            TypeExtension::Scalar(ext) => {
                if !self.types.contains_key(&ext.name) {
                    errors.push(CompositionError::ExtensionWithoutBase {
                        type_name: ext.name.clone(),
                    });
                }
            }
            TypeExtension::InputObject(ext) => match self.types.get_mut(&ext.name) {
                Some(TypeDefinition::InputObject(base)) => {
                    for field in ext.fields {
                        match base.fields.iter().find(|f| f.name == field.name) {
                            Some(existing)
                                if input_value_signature(existing)
                                    == input_value_signature(&field) => {}
                            Some(_) => errors.push(CompositionError::FieldConflict {
                                type_name: ext.name.clone(),
                                field_name: field.name.clone(),
                            }),
                            None => base.fields.push(field),
                        }
                    }
                }
                Some(_) => errors.push(CompositionError::TypeConflict {
                    type_name: ext.name.clone(),
                }),
                None => errors.push(CompositionError::ExtensionWithoutBase {
                    type_name: ext.name.clone(),
                }),
            },
        }
    }

    /// Referential integrity: every named type reachable from a field,
    /// argument, union member, or interface list must resolve to a merged
    /// definition or a built-in scalar.
    fn validate(&self, errors: &mut Vec<CompositionError>) {
        for name in &self.order {
            let Some(td) = self.types.get(name) else {
                continue;
            };
            match td {
                TypeDefinition::Object(o) => {
                    for interface in &o.implements_interfaces {
                        self.check_reference(interface, name, errors);
                    }
                    for field in &o.fields {
                        let referenced_by = format!("{name}.{}", field.name);
                        self.check_type(&field.field_type, &referenced_by, errors);
                        for arg in &field.arguments {
                            self.check_type(
                                &arg.value_type,
                                &format!("{referenced_by}.{}", arg.name),
                                errors,
                            );
                        }
                    }
                }
                TypeDefinition::Interface(i) => {
                    for field in &i.fields {
                        let referenced_by = format!("{name}.{}", field.name);
                        self.check_type(&field.field_type, &referenced_by, errors);
                        for arg in &field.arguments {
                            self.check_type(
                                &arg.value_type,
                                &format!("{referenced_by}.{}", arg.name),
                                errors,
                            );
                        }
                    }
                }
                TypeDefinition::Union(u) => {
                    for member in &u.types {
                        self.check_reference(member, name, errors);
                    }
                }
                TypeDefinition::InputObject(io) => {
                    for field in &io.fields {
                        self.check_type(
                            &field.value_type,
                            &format!("{name}.{}", field.name),
                            errors,
                        );
                    }
                }
                TypeDefinition::Enum(_) | TypeDefinition::Scalar(_) => {}
            }
        }
    }

    fn check_type(
        &self,
        ty: &Type<'a, String>,
        referenced_by: &str,
        errors: &mut Vec<CompositionError>,
    ) {
        self.check_reference(base_name(ty), referenced_by, errors);
    }

    fn check_reference(&self, name: &str, referenced_by: &str, errors: &mut Vec<CompositionError>) {
        if BUILTIN_SCALARS.contains(&name) || self.types.contains_key(name) {
            return;
        }
        errors.push(CompositionError::UnknownType {
            type_name: name.to_string(),
            referenced_by: referenced_by.to_string(),
        });
    }

    fn render(mut self) -> String {
        let mut definitions: Vec<Definition<'a, String>> = Vec::new();
        for dd in self.directives.drain(..) {
            definitions.push(Definition::DirectiveDefinition(dd));
        }
        for name in &self.order {
            if let Some(td) = self.types.remove(name) {
                definitions.push(Definition::TypeDefinition(td));
            }
        }
        Document { definitions }.to_string()
    }
}

fn merge_object_fields<'a>(
    base: &mut ObjectType<'a, String>,
    incoming: Vec<Field<'a, String>>,
    type_name: &str,
    from_extension: bool,
    errors: &mut Vec<CompositionError>,
) {
    for field in incoming {
        if from_extension && is_external(&field) {
            continue;
        }
        match base.fields.iter().find(|f| f.name == field.name) {
            Some(existing) if field_signature(existing) == field_signature(&field) => {}
            Some(_) => errors.push(CompositionError::FieldConflict {
                type_name: type_name.to_string(),
                field_name: field.name.clone(),
            }),
            None => base.fields.push(field),
        }
    }
}

fn is_external(field: &Field<'_, String>) -> bool {
    field.directives.iter().any(|d| d.name == "external")
}

fn field_signature(field: &Field<'_, String>) -> String {
    let args: Vec<String> = field.arguments.iter().map(input_value_signature).collect();
    if args.is_empty() {
        format!("{}: {}", field.name, field.field_type)
    } else {
        format!("{}({}): {}", field.name, args.join(", "), field.field_type)
    }
}

fn input_value_signature(value: &InputValue<'_, String>) -> String {
    match &value.default_value {
        Some(default) => format!("{}: {} = {default}", value.name, value.value_type),
        None => format!("{}: {}", value.name, value.value_type),
    }
}

fn type_name<'t>(td: &'t TypeDefinition<'_, String>) -> &'t str {
    match td {
        TypeDefinition::Scalar(t) => &t.name,
        TypeDefinition::Object(t) => &t.name,
        TypeDefinition::Interface(t) => &t.name,
        TypeDefinition::Union(t) => &t.name,
        TypeDefinition::Enum(t) => &t.name,
        TypeDefinition::InputObject(t) => &t.name,
    }
}

fn base_name<'t>(ty: &'t Type<'_, String>) -> &'t str {
    match ty {
        Type::NamedType(name) => name,
        Type::ListType(inner) | Type::NonNullType(inner) => base_name(inner),
    }
}
