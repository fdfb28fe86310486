//! C# early-bound type rendering.
//!
//! Rendering is pure: the same model and the same resolved names always
//! produce byte-identical text. Each render function returns one
//! [`Artifact`] whose body is a single top-level declaration; file headers
//! and namespace blocks are added by [`render_file`] when the output planner
//! assembles files.

use crate::codegen::naming::ActionNames;
use crate::codegen::types::{
    Action, AttributeType, Entity, OptionSetDefinition, OptionSetScope, ParameterDirection,
};
use crate::codegen::utils::{doc_line, escape_csharp_string};

/// Indentation unit for generated code
const INDENT: &str = "    ";

/// Kind of generated declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Entity,
    LocalOptionSet,
    GlobalOptionSet,
    Action,
}

/// One rendered declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// Generated type name (for actions, the request type)
    pub type_name: String,
    /// Platform logical name of the source item
    pub logical_name: String,
    pub body: String,
}

/// Resolved names used to render one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityNames {
    pub type_name: String,
    /// Property name per attribute, parallel to `Entity::attributes`
    pub members: Vec<String>,
    /// Enum type per attribute when the attribute is typed by an emitted option set
    pub enum_types: Vec<Option<String>>,
}

/// Resolved names used to render one option set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSetNames {
    pub type_name: String,
    /// Member name per option, parallel to `OptionSetDefinition::options`
    pub members: Vec<String>,
}

/// Resolved names used to render one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRenderNames {
    pub types: ActionNames,
    /// Property name per parameter, parallel to `Action::parameters`
    pub members: Vec<String>,
}

fn value_type(name: &str, nullable: bool) -> String {
    if nullable {
        format!("{}?", name)
    } else {
        name.to_string()
    }
}

/// Map an attribute type to its C# type
///
/// Choice types use the enum name only when one is given; otherwise they
/// fall back to their numeric representation so generated code never
/// references a type that was not emitted.
pub fn csharp_type(attribute_type: &AttributeType, nullable: bool, enum_type: Option<&str>) -> String {
    match attribute_type {
        AttributeType::String | AttributeType::Memo => "string".to_string(),
        AttributeType::Integer => value_type("int", nullable),
        AttributeType::BigInt => value_type("long", nullable),
        AttributeType::Decimal | AttributeType::Money => value_type("decimal", nullable),
        AttributeType::Double => value_type("double", nullable),
        AttributeType::Boolean => value_type("bool", nullable),
        AttributeType::DateTime => value_type("DateTime", nullable),
        AttributeType::UniqueIdentifier | AttributeType::Lookup { .. } => {
            value_type("Guid", nullable)
        }
        AttributeType::OptionSet(_) => value_type(enum_type.unwrap_or("int"), nullable),
        AttributeType::MultiSelectOptionSet(_) => format!("{}[]", enum_type.unwrap_or("int")),
        AttributeType::Other(_) => "object".to_string(),
    }
}

fn push_summary(out: &mut String, indent: &str, text: Option<&str>) {
    if let Some(text) = text.map(doc_line).filter(|t| !t.is_empty()) {
        out.push_str(&format!("{indent}/// <summary>\n"));
        out.push_str(&format!("{indent}/// {text}\n"));
        out.push_str(&format!("{indent}/// </summary>\n"));
    }
}

/// Render an entity as a partial class with one property per attribute
pub fn render_entity(entity: &Entity, names: &EntityNames) -> Artifact {
    let mut out = String::new();

    push_summary(&mut out, "", entity.description.as_deref());
    out.push_str(&format!("public partial class {}\n{{\n", names.type_name));
    out.push_str(&format!(
        "{INDENT}public const string EntityLogicalName = \"{}\";\n",
        escape_csharp_string(&entity.logical_name)
    ));
    if let Some(type_code) = entity.type_code {
        out.push_str(&format!("{INDENT}public const int EntityTypeCode = {};\n", type_code));
    }

    if !entity.attributes.is_empty() {
        out.push('\n');
        out.push_str(&format!("{INDENT}public static partial class EntityFields\n{INDENT}{{\n"));
        for (attribute, member) in entity.attributes.iter().zip(&names.members) {
            out.push_str(&format!(
                "{INDENT}{INDENT}public const string {} = \"{}\";\n",
                member,
                escape_csharp_string(&attribute.logical_name)
            ));
        }
        out.push_str(&format!("{INDENT}}}\n"));
    }

    for (index, attribute) in entity.attributes.iter().enumerate() {
        let member = &names.members[index];
        let enum_type = names.enum_types.get(index).and_then(|t| t.as_deref());

        out.push('\n');
        push_summary(&mut out, INDENT, attribute.description.as_deref());
        if let AttributeType::Lookup { targets } = &attribute.attribute_type {
            if !targets.is_empty() {
                out.push_str(&format!(
                    "{INDENT}/// <remarks>Targets: {}</remarks>\n",
                    doc_line(&targets.join(", "))
                ));
            }
        }
        out.push_str(&format!(
            "{INDENT}public {} {} {{ get; set; }}\n",
            csharp_type(&attribute.attribute_type, attribute.nullable, enum_type),
            member
        ));
    }

    out.push_str("}\n");

    Artifact {
        kind: ArtifactKind::Entity,
        type_name: names.type_name.clone(),
        logical_name: entity.logical_name.clone(),
        body: out,
    }
}

/// Render an option set as an enum, values written exactly as given
pub fn render_option_set(definition: &OptionSetDefinition, names: &OptionSetNames) -> Artifact {
    let mut out = String::new();

    push_summary(&mut out, "", definition.description.as_deref());
    out.push_str(&format!("public enum {}\n{{\n", names.type_name));
    for (option, member) in definition.options.iter().zip(&names.members) {
        push_summary(&mut out, INDENT, option.description.as_deref());
        out.push_str(&format!("{INDENT}{} = {},\n", member, option.value));
    }
    out.push_str("}\n");

    let kind = match definition.scope {
        OptionSetScope::Global => ArtifactKind::GlobalOptionSet,
        OptionSetScope::Local => ArtifactKind::LocalOptionSet,
    };

    Artifact {
        kind,
        type_name: names.type_name.clone(),
        logical_name: definition.name.clone(),
        body: out,
    }
}

/// Render an action as a request class, plus a response class for outputs
pub fn render_action(action: &Action, names: &ActionRenderNames) -> Artifact {
    let mut out = String::new();

    push_summary(&mut out, "", action.description.as_deref());
    out.push_str(&format!("public partial class {}\n{{\n", names.types.request));
    out.push_str(&format!(
        "{INDENT}public const string ActionLogicalName = \"{}\";\n",
        escape_csharp_string(&action.logical_name)
    ));
    if let Some(entity) = &action.bound_entity {
        out.push_str(&format!(
            "{INDENT}public const string BoundEntityLogicalName = \"{}\";\n",
            escape_csharp_string(entity)
        ));
    }

    let parameters = || action.parameters.iter().zip(&names.members);

    for (parameter, member) in parameters().filter(|(p, _)| p.direction == ParameterDirection::In) {
        out.push('\n');
        if parameter.required {
            out.push_str(&format!("{INDENT}/// <remarks>Required</remarks>\n"));
        }
        out.push_str(&format!(
            "{INDENT}public {} {} {{ get; set; }}\n",
            csharp_type(&parameter.parameter_type, !parameter.required, None),
            member
        ));
    }
    out.push_str("}\n");

    if let Some(response) = &names.types.response {
        out.push('\n');
        out.push_str(&format!("public partial class {}\n{{\n", response));
        let outputs = parameters().filter(|(p, _)| p.direction == ParameterDirection::Out);
        for (index, (parameter, member)) in outputs.enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&format!(
                "{INDENT}public {} {} {{ get; set; }}\n",
                csharp_type(&parameter.parameter_type, true, None),
                member
            ));
        }
        out.push_str("}\n");
    }

    Artifact {
        kind: ArtifactKind::Action,
        type_name: names.types.request.clone(),
        logical_name: action.logical_name.clone(),
        body: out,
    }
}

/// Fixed banner at the top of every generated file
pub const FILE_HEADER: &str = "\
// <auto-generated>
//     Generated by earlybound from platform metadata.
//     Changes to this file will be lost when the code is regenerated.
// </auto-generated>
";

/// Assemble a complete source file from namespace sections
///
/// Each section is an optional namespace and the artifact bodies placed in
/// it, in order. Sections without a namespace are written at top level.
pub fn render_file<'a, I, B>(sections: I) -> String
where
    I: IntoIterator<Item = (Option<&'a str>, B)>,
    B: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();
    out.push_str(FILE_HEADER);
    out.push_str("\nusing System;\n");

    for (namespace, bodies) in sections {
        out.push('\n');
        match namespace {
            Some(namespace) => {
                out.push_str(&format!("namespace {}\n{{\n", namespace));
                let mut first = true;
                for body in bodies {
                    if !first {
                        out.push('\n');
                    }
                    first = false;
                    for line in body.lines() {
                        if line.is_empty() {
                            out.push('\n');
                        } else {
                            out.push_str(INDENT);
                            out.push_str(line);
                            out.push('\n');
                        }
                    }
                }
                out.push_str("}\n");
            }
            None => {
                let mut first = true;
                for body in bodies {
                    if !first {
                        out.push('\n');
                    }
                    first = false;
                    out.push_str(body);
                }
            }
        }
    }

    out
}
