//! Structural schema diff.
//!
//! Both documents are parsed into their type systems and compared by
//! type-name + field-name, so reordering and formatting differences produce
//! no changes. Types are walked in document order of the new document; types
//! present only in the old document (pure removals) are appended after.

use graphql_parser::schema::{
    Definition, Document, EnumType, Field, InputObjectType, InputValue, Type, TypeDefinition,
    parse_schema,
};

use crate::error::{DocumentSide, Error, Result};

use super::{Change, ChangeType, Criticality};

const FIELD_REMOVED_REASON: &str = "Removing a field is a breaking change. \
    It is preferable to deprecate the field before removing it.";
const TYPE_REMOVED_REASON: &str = "Removing a type is a breaking change. \
    It is preferable to deprecate and remove all references to it first.";
const TYPE_KIND_CHANGED_REASON: &str =
    "Changing the kind of a type is a breaking change. Consumers relying on the previous kind will break.";
const FIELD_TYPE_CHANGED_REASON: &str =
    "Changing a field's type to an incompatible one is a breaking change. Consumers relying on the previous type will break.";
const FIELD_NULLABILITY_NARROWED_REASON: &str =
    "Narrowing a field's nullability is a breaking change. Consumers must be updated to handle the stricter type.";
const ARGUMENT_REMOVED_REASON: &str = "Removing an argument is a breaking change. \
    It is preferable to deprecate the argument before removing it.";
const REQUIRED_ARGUMENT_ADDED_REASON: &str =
    "Adding a required argument without a default value is a breaking change. Existing consumers do not provide it.";
const REQUIRED_ARGUMENT_WITH_DEFAULT_REASON: &str =
    "Adding a required argument with a default value is dangerous. Existing consumers silently pick up the default.";
const ARGUMENT_TYPE_CHANGED_REASON: &str =
    "Changing an argument's type is a breaking change. Consumers passing the previous type will break.";
const ARGUMENT_DEFAULT_CHANGED_REASON: &str =
    "Changing a default value is a breaking change. Consumers relying on the previous default will observe different behavior.";
const INPUT_FIELD_REMOVED_REASON: &str = "Removing an input field is a breaking change. \
    It is preferable to deprecate the input field before removing it.";
const REQUIRED_INPUT_FIELD_ADDED_REASON: &str =
    "Adding a required input field without a default value is a breaking change. Existing consumers do not provide it.";
const ENUM_VALUE_REMOVED_REASON: &str = "Removing an enum value is a breaking change. \
    It is preferable to deprecate the enum value before removing it.";
const UNION_MEMBER_ADDED_REASON: &str =
    "Adding a member to a union is dangerous. Consumers switching on the union's possible types may miss the new member.";
const UNION_MEMBER_REMOVED_REASON: &str =
    "Removing a member from a union is a breaking change. Consumers handling that member will break.";

type Doc<'a> = Document<'a, String>;
type TypeDef<'a> = TypeDefinition<'a, String>;

/// Computes the ordered change sequence between two schema documents.
///
/// Pure: no I/O, no state. Comparing a document against itself always yields
/// an empty sequence. Malformed input fails the whole call; no partial diff
/// is returned.
pub fn diff(old_defs: &str, new_defs: &str) -> Result<Vec<Change>> {
    let old_doc = parse(old_defs, DocumentSide::Old)?;
    let new_doc = parse(new_defs, DocumentSide::New)?;

    let old_types = type_definitions(&old_doc);
    let new_types = type_definitions(&new_doc);

    let mut changes = Vec::new();

    for new_ty in &new_types {
        match old_types.iter().find(|t| name_of(t) == name_of(new_ty)) {
            None => changes.push(Change {
                criticality: Criticality::non_breaking(),
                change_type: ChangeType::TypeAdded,
                message: format!("Type '{}' was added", name_of(new_ty)),
                path: name_of(new_ty).to_string(),
            }),
            Some(old_ty) => diff_type(old_ty, new_ty, &mut changes),
        }
    }

    for old_ty in &old_types {
        if !new_types.iter().any(|t| name_of(t) == name_of(old_ty)) {
            changes.push(Change {
                criticality: Criticality::breaking(TYPE_REMOVED_REASON),
                change_type: ChangeType::TypeRemoved,
                message: format!("Type '{}' was removed", name_of(old_ty)),
                path: name_of(old_ty).to_string(),
            });
        }
    }

    Ok(changes)
}

fn parse(src: &str, side: DocumentSide) -> Result<Doc<'_>> {
    parse_schema::<String>(src).map_err(|e| Error::Parse {
        side,
        message: e.to_string(),
    })
}

fn type_definitions<'d, 'a>(doc: &'d Doc<'a>) -> Vec<&'d TypeDef<'a>> {
    doc.definitions
        .iter()
        .filter_map(|d| match d {
            Definition::TypeDefinition(t) => Some(t),
            _ => None,
        })
        .collect()
}

fn name_of<'d>(ty: &'d TypeDef<'_>) -> &'d str {
    match ty {
        TypeDefinition::Scalar(t) => &t.name,
        TypeDefinition::Object(t) => &t.name,
        TypeDefinition::Interface(t) => &t.name,
        TypeDefinition::Union(t) => &t.name,
        TypeDefinition::Enum(t) => &t.name,
        TypeDefinition::InputObject(t) => &t.name,
    }
}

fn kind_of(ty: &TypeDef<'_>) -> &'static str {
    match ty {
        TypeDefinition::Scalar(_) => "scalar",
        TypeDefinition::Object(_) => "object type",
        TypeDefinition::Interface(_) => "interface",
        TypeDefinition::Union(_) => "union",
        TypeDefinition::Enum(_) => "enum",
        TypeDefinition::InputObject(_) => "input object type",
    }
}

fn diff_type<'a>(old_ty: &TypeDef<'a>, new_ty: &TypeDef<'a>, changes: &mut Vec<Change>) {
    match (old_ty, new_ty) {
        (TypeDefinition::Object(old), TypeDefinition::Object(new)) => {
            diff_fields(&new.name, "object type", &old.fields, &new.fields, changes);
        }
        (TypeDefinition::Interface(old), TypeDefinition::Interface(new)) => {
            diff_fields(&new.name, "interface", &old.fields, &new.fields, changes);
        }
        (TypeDefinition::Enum(old), TypeDefinition::Enum(new)) => {
            diff_enum(old, new, changes);
        }
        (TypeDefinition::Union(old), TypeDefinition::Union(new)) => {
            for member in &new.types {
                if !old.types.contains(member) {
                    changes.push(Change {
                        criticality: Criticality::dangerous(UNION_MEMBER_ADDED_REASON),
                        change_type: ChangeType::UnionMemberAdded,
                        message: format!("Member '{member}' was added to union '{}'", new.name),
                        path: format!("{}.{member}", new.name),
                    });
                }
            }
            for member in &old.types {
                if !new.types.contains(member) {
                    changes.push(Change {
                        criticality: Criticality::breaking(UNION_MEMBER_REMOVED_REASON),
                        change_type: ChangeType::UnionMemberRemoved,
                        message: format!("Member '{member}' was removed from union '{}'", new.name),
                        path: format!("{}.{member}", new.name),
                    });
                }
            }
        }
        (TypeDefinition::InputObject(old), TypeDefinition::InputObject(new)) => {
            diff_input_object(old, new, changes);
        }
        (TypeDefinition::Scalar(_), TypeDefinition::Scalar(_)) => {}
        _ => changes.push(Change {
            criticality: Criticality::breaking(TYPE_KIND_CHANGED_REASON),
            change_type: ChangeType::TypeKindChanged,
            message: format!(
                "Type '{}' changed kind from '{}' to '{}'",
                name_of(new_ty),
                kind_of(old_ty),
                kind_of(new_ty)
            ),
            path: name_of(new_ty).to_string(),
        }),
    }
}

fn diff_fields<'a>(
    type_name: &str,
    kind_label: &str,
    old_fields: &[Field<'a, String>],
    new_fields: &[Field<'a, String>],
    changes: &mut Vec<Change>,
) {
    for new_field in new_fields {
        let path = format!("{type_name}.{}", new_field.name);
        match old_fields.iter().find(|f| f.name == new_field.name) {
            None => changes.push(Change {
                criticality: Criticality::non_breaking(),
                change_type: ChangeType::FieldAdded,
                message: format!(
                    "Field '{}' was added to {kind_label} '{type_name}'",
                    new_field.name
                ),
                path,
            }),
            Some(old_field) => {
                if old_field.field_type != new_field.field_type {
                    changes.push(field_type_changed(&path, old_field, new_field));
                }
                diff_arguments(&path, &old_field.arguments, &new_field.arguments, changes);
                diff_deprecation(&path, old_field, new_field, changes);
            }
        }
    }

    for old_field in old_fields {
        if !new_fields.iter().any(|f| f.name == old_field.name) {
            changes.push(Change {
                criticality: Criticality::breaking(FIELD_REMOVED_REASON),
                change_type: ChangeType::FieldRemoved,
                message: format!(
                    "Field '{}' was removed from {kind_label} '{type_name}'",
                    old_field.name
                ),
                path: format!("{type_name}.{}", old_field.name),
            });
        }
    }
}

fn field_type_changed<'a>(
    path: &str,
    old_field: &Field<'a, String>,
    new_field: &Field<'a, String>,
) -> Change {
    let criticality = if nullability_relaxed(&old_field.field_type, &new_field.field_type) {
        Criticality::non_breaking()
    } else if nullability_narrowed(&old_field.field_type, &new_field.field_type) {
        Criticality::breaking(FIELD_NULLABILITY_NARROWED_REASON)
    } else {
        Criticality::breaking(FIELD_TYPE_CHANGED_REASON)
    };
    Change {
        criticality,
        change_type: ChangeType::FieldTypeChanged,
        message: format!(
            "Field '{path}' changed type from '{}' to '{}'",
            old_field.field_type, new_field.field_type
        ),
        path: path.to_string(),
    }
}

/// `T` became `T!`.
fn nullability_narrowed<'a>(old: &Type<'a, String>, new: &Type<'a, String>) -> bool {
    matches!(new, Type::NonNullType(inner) if **inner == *old)
}

/// `T!` became `T`.
fn nullability_relaxed<'a>(old: &Type<'a, String>, new: &Type<'a, String>) -> bool {
    matches!(old, Type::NonNullType(inner) if **inner == *new)
}

fn is_required(value: &InputValue<'_, String>) -> bool {
    matches!(value.value_type, Type::NonNullType(_)) && value.default_value.is_none()
}

fn diff_arguments<'a>(
    field_path: &str,
    old_args: &[InputValue<'a, String>],
    new_args: &[InputValue<'a, String>],
    changes: &mut Vec<Change>,
) {
    for new_arg in new_args {
        let path = format!("{field_path}.{}", new_arg.name);
        match old_args.iter().find(|a| a.name == new_arg.name) {
            None => {
                let criticality = if is_required(new_arg) {
                    Criticality::breaking(REQUIRED_ARGUMENT_ADDED_REASON)
                } else if matches!(new_arg.value_type, Type::NonNullType(_)) {
                    Criticality::dangerous(REQUIRED_ARGUMENT_WITH_DEFAULT_REASON)
                } else {
                    Criticality::non_breaking()
                };
                changes.push(Change {
                    criticality,
                    change_type: ChangeType::FieldArgumentAdded,
                    message: format!(
                        "Argument '{}: {}' was added to field '{field_path}'",
                        new_arg.name, new_arg.value_type
                    ),
                    path,
                });
            }
            Some(old_arg) => {
                if old_arg.value_type != new_arg.value_type {
                    changes.push(Change {
                        criticality: Criticality::breaking(ARGUMENT_TYPE_CHANGED_REASON),
                        change_type: ChangeType::FieldArgumentTypeChanged,
                        message: format!(
                            "Argument '{}' on field '{field_path}' changed type from '{}' to '{}'",
                            new_arg.name, old_arg.value_type, new_arg.value_type
                        ),
                        path: path.clone(),
                    });
                }
                if old_arg.default_value != new_arg.default_value {
                    changes.push(Change {
                        criticality: Criticality::breaking(ARGUMENT_DEFAULT_CHANGED_REASON),
                        change_type: ChangeType::FieldArgumentDefaultChanged,
                        message: format!(
                            "Default value for argument '{}' on field '{field_path}' changed from '{}' to '{}'",
                            new_arg.name,
                            render_default(&old_arg.default_value),
                            render_default(&new_arg.default_value)
                        ),
                        path,
                    });
                }
            }
        }
    }

    for old_arg in old_args {
        if !new_args.iter().any(|a| a.name == old_arg.name) {
            changes.push(Change {
                criticality: Criticality::breaking(ARGUMENT_REMOVED_REASON),
                change_type: ChangeType::FieldArgumentRemoved,
                message: format!(
                    "Argument '{}' was removed from field '{field_path}'",
                    old_arg.name
                ),
                path: format!("{field_path}.{}", old_arg.name),
            });
        }
    }
}

fn render_default(value: &Option<graphql_parser::schema::Value<'_, String>>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "none".to_string(),
    }
}

fn diff_input_object<'a>(
    old: &InputObjectType<'a, String>,
    new: &InputObjectType<'a, String>,
    changes: &mut Vec<Change>,
) {
    for new_field in &new.fields {
        let path = format!("{}.{}", new.name, new_field.name);
        match old.fields.iter().find(|f| f.name == new_field.name) {
            None => {
                let criticality = if is_required(new_field) {
                    Criticality::breaking(REQUIRED_INPUT_FIELD_ADDED_REASON)
                } else {
                    Criticality::non_breaking()
                };
                changes.push(Change {
                    criticality,
                    change_type: ChangeType::InputFieldAdded,
                    message: format!(
                        "Input field '{}' was added to input object type '{}'",
                        new_field.name, new.name
                    ),
                    path,
                });
            }
            Some(old_field) => {
                if old_field.value_type != new_field.value_type {
                    changes.push(Change {
                        criticality: Criticality::breaking(ARGUMENT_TYPE_CHANGED_REASON),
                        change_type: ChangeType::InputFieldTypeChanged,
                        message: format!(
                            "Input field '{path}' changed type from '{}' to '{}'",
                            old_field.value_type, new_field.value_type
                        ),
                        path,
                    });
                }
            }
        }
    }

    for old_field in &old.fields {
        if !new.fields.iter().any(|f| f.name == old_field.name) {
            changes.push(Change {
                criticality: Criticality::breaking(INPUT_FIELD_REMOVED_REASON),
                change_type: ChangeType::InputFieldRemoved,
                message: format!(
                    "Input field '{}' was removed from input object type '{}'",
                    old_field.name, new.name
                ),
                path: format!("{}.{}", new.name, old_field.name),
            });
        }
    }
}

fn diff_enum(old: &EnumType<'_, String>, new: &EnumType<'_, String>, changes: &mut Vec<Change>) {
    for value in &new.values {
        if !old.values.iter().any(|v| v.name == value.name) {
            changes.push(Change {
                criticality: Criticality::non_breaking(),
                change_type: ChangeType::EnumValueAdded,
                message: format!("Enum value '{}' was added to enum '{}'", value.name, new.name),
                path: format!("{}.{}", new.name, value.name),
            });
        }
    }
    for value in &old.values {
        if !new.values.iter().any(|v| v.name == value.name) {
            changes.push(Change {
                criticality: Criticality::breaking(ENUM_VALUE_REMOVED_REASON),
                change_type: ChangeType::EnumValueRemoved,
                message: format!(
                    "Enum value '{}' was removed from enum '{}'",
                    value.name, new.name
                ),
                path: format!("{}.{}", new.name, value.name),
            });
        }
    }
}

fn is_deprecated(field: &Field<'_, String>) -> bool {
    field.directives.iter().any(|d| d.name == "deprecated")
}

fn diff_deprecation(
    path: &str,
    old_field: &Field<'_, String>,
    new_field: &Field<'_, String>,
    changes: &mut Vec<Change>,
) {
    match (is_deprecated(old_field), is_deprecated(new_field)) {
        (false, true) => changes.push(Change {
            criticality: Criticality::non_breaking(),
            change_type: ChangeType::FieldDeprecationAdded,
            message: format!("Field '{path}' was deprecated"),
            path: path.to_string(),
        }),
        (true, false) => changes.push(Change {
            criticality: Criticality::non_breaking(),
            change_type: ChangeType::FieldDeprecationRemoved,
            message: format!("Deprecation was removed from field '{path}'"),
            path: path.to_string(),
        }),
        _ => {}
    }
}
