use super::types::{
    AliasInfo, LiteralValue, ObjectShape, PropertyInfo, Signature, TypeData, TypeId,
    TypeStore,
};
use crate::ast::format_number;

/// Longest rendering kept by the default format
const MAX_DISPLAY_LENGTH: usize = 160;

/// How a type is rendered as text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeFormat {
    pub no_truncation: bool,
    /// Print declared alias names instead of expanding them
    pub use_alias: bool,
}

impl TypeFormat {
    /// Diagnostics: truncated, aliases kept
    pub const DEFAULT: TypeFormat = TypeFormat {
        no_truncation: false,
        use_alias: true,
    };

    /// Assertion reports: complete text, aliases kept
    pub const FULL: TypeFormat = TypeFormat {
        no_truncation: true,
        use_alias: true,
    };

    /// Complete text with every alias expanded
    pub const EXPANDED: TypeFormat = TypeFormat {
        no_truncation: true,
        use_alias: false,
    };
}

impl Default for TypeFormat {
    fn default() -> Self {
        TypeFormat::DEFAULT
    }
}

pub fn type_to_string(store: &TypeStore, id: TypeId, format: TypeFormat) -> String {
    let text = TypePrinter { store, format }.print(id);
    if format.no_truncation || text.chars().count() <= MAX_DISPLAY_LENGTH {
        return text;
    }
    let mut truncated: String = text.chars().take(MAX_DISPLAY_LENGTH - 3).collect();
    truncated.push_str("...");
    truncated
}

struct TypePrinter<'s> {
    store: &'s TypeStore,
    format: TypeFormat,
}

impl TypePrinter<'_> {
    fn print(&self, id: TypeId) -> String {
        if id == self.store.common().not_provided {
            return "NotProvided".to_string();
        }

        match &*self.store.data(id) {
            TypeData::Intrinsic(intrinsic) => intrinsic.name().to_string(),
            TypeData::Literal { value, .. } => print_literal(value),
            TypeData::Union { members, alias } => match alias {
                Some(alias) if self.format.use_alias => self.print_alias(alias),
                _ => self.print_union(members),
            },
            TypeData::Intersection(members) => members
                .iter()
                .map(|member| self.print_operand(*member))
                .collect::<Vec<_>>()
                .join(" & "),
            TypeData::Array { element, readonly } => {
                let prefix = if *readonly { "readonly " } else { "" };
                format!("{}{}[]", prefix, self.print_operand(*element))
            }
            TypeData::Tuple { elements, readonly } => {
                let prefix = if *readonly { "readonly " } else { "" };
                let elements: Vec<String> = elements.iter().map(|e| self.print(*e)).collect();
                format!("{}[{}]", prefix, elements.join(", "))
            }
            TypeData::Object { shape, alias } => match alias {
                Some(alias) if self.format.use_alias => self.print_alias(alias),
                _ => self.print_shape(shape),
            },
            TypeData::Named { decl, args } => {
                let name = self.store.decl(*decl).name;
                self.print_reference(&name, args)
            }
            TypeData::Parameter(_) => self
                .store
                .type_parameter(id)
                .map(|info| info.name)
                .unwrap_or_else(|| "unknown".to_string()),
            TypeData::Assertions { received, .. } => format!("Assertions<{}>", self.print(*received)),
        }
    }

    fn print_alias(&self, alias: &AliasInfo) -> String {
        self.print_reference(&alias.name, &alias.args)
    }

    fn print_reference(&self, name: &str, args: &[TypeId]) -> String {
        if args.is_empty() {
            return name.to_string();
        }
        let args: Vec<String> = args.iter().map(|arg| self.print(*arg)).collect();
        format!("{}<{}>", name, args.join(", "))
    }

    /// `null` and `undefined` go last, the way they are usually written
    fn print_union(&self, members: &[TypeId]) -> String {
        let common = self.store.common();
        let nullable = [common.null, common.undefined];
        let (tail, head): (Vec<TypeId>, Vec<TypeId>) =
            members.iter().copied().partition(|m| nullable.contains(m));
        head.iter()
            .chain(tail.iter())
            .map(|member| self.print_operand(*member))
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Operand of `|`, `&` or `[]`: unions, intersections and functions get parentheses
    fn print_operand(&self, id: TypeId) -> String {
        let text = self.print(id);
        let needs_parentheses = match &*self.store.data(id) {
            TypeData::Union { alias, .. } => alias.is_none() || !self.format.use_alias,
            TypeData::Intersection(_) => true,
            TypeData::Object { shape, alias } => {
                (alias.is_none() || !self.format.use_alias) && is_function_like(shape)
            }
            _ => false,
        };
        if needs_parentheses {
            format!("({})", text)
        } else {
            text
        }
    }

    fn print_shape(&self, shape: &ObjectShape) -> String {
        if is_function_like(shape) {
            if let Some(signature) = shape.call_signatures.first() {
                return self.print_signature(signature, "", " => ");
            }
            if let Some(signature) = shape.construct_signatures.first() {
                return self.print_signature(signature, "new ", " => ");
            }
        }
        if shape.is_empty() {
            return "{}".to_string();
        }

        let mut members = Vec::new();
        for signature in &shape.call_signatures {
            members.push(self.print_signature(signature, "", ": "));
        }
        for signature in &shape.construct_signatures {
            members.push(self.print_signature(signature, "new ", ": "));
        }
        if let Some(index) = shape.string_index {
            members.push(format!("[key: string]: {}", self.print(index)));
        }
        if let Some(index) = shape.number_index {
            members.push(format!("[index: number]: {}", self.print(index)));
        }
        for property in &shape.properties {
            members.push(self.print_property(property));
        }

        format!("{{ {}; }}", members.join("; "))
    }

    fn print_property(&self, property: &PropertyInfo) -> String {
        let readonly = if property.readonly { "readonly " } else { "" };
        let name = property_name_text(&property.name);
        let optional = if property.optional { "?" } else { "" };

        if property.is_method {
            if let TypeData::Object { shape, .. } = &*self.store.data(property.type_id) {
                if let Some(signature) = shape.call_signatures.first() {
                    let signature = self.print_signature(signature, "", ": ");
                    return format!("{}{}{}{}", readonly, name, optional, signature);
                }
            }
        }
        format!(
            "{}{}{}: {}",
            readonly,
            name,
            optional,
            self.print(property.type_id)
        )
    }

    fn print_signature(&self, signature: &Signature, prefix: &str, arrow: &str) -> String {
        let type_parameters = if signature.type_parameters.is_empty() {
            String::new()
        } else {
            let names: Vec<String> = signature
                .type_parameters
                .iter()
                .map(|parameter| self.print_type_parameter(*parameter))
                .collect();
            format!("<{}>", names.join(", "))
        };
        let parameters: Vec<String> = signature
            .parameters
            .iter()
            .map(|parameter| {
                format!(
                    "{}{}{}: {}",
                    if parameter.rest { "..." } else { "" },
                    parameter.name,
                    if parameter.optional { "?" } else { "" },
                    self.print(parameter.type_id)
                )
            })
            .collect();
        format!(
            "{}{}({}){}{}",
            prefix,
            type_parameters,
            parameters.join(", "),
            arrow,
            self.print(signature.return_type)
        )
    }

    fn print_type_parameter(&self, parameter: TypeId) -> String {
        let Some(info) = self.store.type_parameter(parameter) else {
            return self.print(parameter);
        };
        let mut text = info.name;
        if let Some(constraint) = info.constraint {
            text.push_str(" extends ");
            text.push_str(&self.print(constraint));
        }
        if let Some(default) = info.default {
            text.push_str(" = ");
            text.push_str(&self.print(default));
        }
        text
    }
}

/// Shapes made of exactly one call or construct signature print as function types
fn is_function_like(shape: &ObjectShape) -> bool {
    shape.properties.is_empty()
        && shape.string_index.is_none()
        && shape.number_index.is_none()
        && shape.call_signatures.len() + shape.construct_signatures.len() == 1
}

fn print_literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::String(text) => quote(text),
        LiteralValue::Number(number) => format_number(number.value()),
        LiteralValue::Boolean(flag) => flag.to_string(),
    }
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn property_name_text(name: &str) -> String {
    let mut chars = name.chars();
    let is_identifier = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    let is_number = !name.is_empty() && name.chars().all(|c| c.is_ascii_digit());
    if is_identifier || is_number {
        name.to_string()
    } else {
        quote(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typechecker::types::{DeclKind, ParameterInfo};

    #[test]
    fn test_primitive_and_literal_display() {
        let store = TypeStore::new(true);
        let common = *store.common();
        assert_eq!(type_to_string(&store, common.string, TypeFormat::DEFAULT), "string");
        assert_eq!(
            type_to_string(&store, store.string_literal("a\"b", false), TypeFormat::DEFAULT),
            "\"a\\\"b\""
        );
        assert_eq!(
            type_to_string(&store, store.number_literal(-1.5, false), TypeFormat::DEFAULT),
            "-1.5"
        );
        assert_eq!(type_to_string(&store, common.not_provided, TypeFormat::FULL), "NotProvided");
    }

    #[test]
    fn test_composite_display() {
        let store = TypeStore::new(true);
        let common = *store.common();
        let nullable = store.union(vec![common.undefined, common.string]);
        assert_eq!(type_to_string(&store, nullable, TypeFormat::DEFAULT), "string | undefined");
        assert_eq!(
            type_to_string(&store, store.array(nullable, true), TypeFormat::DEFAULT),
            "readonly (string | undefined)[]"
        );
        assert_eq!(
            type_to_string(
                &store,
                store.tuple(vec![common.string, common.number], false),
                TypeFormat::DEFAULT
            ),
            "[string, number]"
        );
        let function = store.function(Signature {
            type_parameters: Vec::new(),
            parameters: vec![ParameterInfo {
                name: "x".to_string(),
                type_id: common.number,
                optional: true,
                rest: false,
            }],
            return_type: common.void,
        });
        assert_eq!(
            type_to_string(&store, function, TypeFormat::DEFAULT),
            "(x?: number) => void"
        );
        assert_eq!(
            type_to_string(&store, store.array(function, false), TypeFormat::DEFAULT),
            "((x?: number) => void)[]"
        );
    }

    #[test]
    fn test_object_display() {
        let store = TypeStore::new(true);
        let common = *store.common();
        let object = store.object(ObjectShape {
            properties: vec![
                PropertyInfo::new("a", common.string).readonly(true),
                PropertyInfo::new("b-c", common.number).optional(true),
            ],
            ..ObjectShape::default()
        });
        assert_eq!(
            type_to_string(&store, object, TypeFormat::DEFAULT),
            "{ readonly a: string; \"b-c\"?: number; }"
        );
        assert_eq!(type_to_string(&store, common.empty_object, TypeFormat::DEFAULT), "{}");
    }

    #[test]
    fn test_alias_and_named_display() {
        let store = TypeStore::new(true);
        let common = *store.common();
        let union = store.union(vec![common.string, common.number]);
        let aliased = store.with_alias(
            union,
            AliasInfo {
                name: "Id".to_string(),
                args: Vec::new(),
            },
        );
        assert_eq!(type_to_string(&store, aliased, TypeFormat::FULL), "Id");
        assert_eq!(type_to_string(&store, aliased, TypeFormat::EXPANDED), "string | number");

        let decl = store.new_decl("Box", DeclKind::Interface);
        let boxed = store.named(decl, vec![common.string]);
        assert_eq!(type_to_string(&store, boxed, TypeFormat::DEFAULT), "Box<string>");
    }

    #[test]
    fn test_truncation() {
        let store = TypeStore::new(true);
        let members: Vec<TypeId> = (0..60)
            .map(|i| store.string_literal(&format!("member{}", i), false))
            .collect();
        let union = store.union(members);
        let short = type_to_string(&store, union, TypeFormat::DEFAULT);
        assert_eq!(short.chars().count(), MAX_DISPLAY_LENGTH);
        assert!(short.ends_with("..."));
        assert!(type_to_string(&store, union, TypeFormat::FULL).len() > MAX_DISPLAY_LENGTH);
    }
}
