use super::{BodyMode, CheckPass, FunctionParts};
use crate::ast::format_number;
use crate::ast::types::{LiteralType, PrimitiveType, Type, TypeKind, TypeReference};
use crate::ast::Ident;
use crate::span::Span;
use crate::typechecker::generics::{declaration_mapping, instantiate_type, TypeMapping};
use crate::typechecker::symbol_table::{Declaration, SymbolId};
use crate::typechecker::types::{
    AliasInfo, DeclId, Intrinsic, LiteralValue, ObjectShape, TypeData, TypeId,
};

impl<'a> CheckPass<'a> {
    /// Resolve a type annotation in the current scope
    pub(super) fn resolve_type(&mut self, typ: &'a Type) -> TypeId {
        match &typ.kind {
            TypeKind::Primitive(primitive) => self.store().intrinsic(intrinsic_for(*primitive)),
            TypeKind::Literal(literal) => match literal {
                LiteralType::String(value) => self.store().string_literal(value, false),
                LiteralType::Number(value) => self.store().number_literal(*value, false),
                LiteralType::Boolean(value) => self.store().boolean_literal(*value, false),
            },
            TypeKind::Reference(reference) => self.resolve_type_reference(reference),
            TypeKind::Union(members) => {
                let members = members.iter().map(|m| self.resolve_type(m)).collect();
                self.store().union(members)
            }
            TypeKind::Intersection(members) => {
                let members = members.iter().map(|m| self.resolve_type(m)).collect();
                self.store().intersection(members)
            }
            TypeKind::Array(element) => {
                let element = self.resolve_type(element);
                self.store().array(element, false)
            }
            TypeKind::Tuple(elements) => {
                let elements = elements.iter().map(|e| self.resolve_type(e)).collect();
                self.store().tuple(elements, false)
            }
            TypeKind::Object(object) => {
                let mut shape = ObjectShape::default();
                for member in &object.members {
                    self.add_type_member(&mut shape, member);
                }
                self.store().object(shape)
            }
            TypeKind::Function(function) => {
                let parts = FunctionParts {
                    type_parameters: function.type_parameters.as_deref(),
                    parameters: &function.parameters,
                    return_type: Some(function.return_type.as_ref()),
                    body: None,
                    span: function.span,
                };
                let signature = self.function_signature(&parts, None, BodyMode::SignatureOnly);
                if function.is_constructor {
                    self.store().object(ObjectShape {
                        construct_signatures: vec![signature],
                        ..ObjectShape::default()
                    })
                } else {
                    self.store().function(signature)
                }
            }
            TypeKind::TypeQuery(path) => self.resolve_type_query(path),
            TypeKind::KeyOf(inner) => {
                let inner = self.resolve_type(inner);
                self.keyof_type(inner)
            }
            TypeKind::Readonly(inner) => {
                let resolved = self.resolve_type(inner);
                let data = self.store().data(resolved);
                match &*data {
                    TypeData::Array { element, .. } => self.store().array(*element, true),
                    TypeData::Tuple { elements, .. } => self.store().tuple(elements.clone(), true),
                    _ => {
                        self.error(
                            typ.span,
                            "'readonly' type modifier is only permitted on array and tuple literal types.",
                        );
                        resolved
                    }
                }
            }
            TypeKind::IndexAccess(object, index) => {
                let object = self.resolve_type(object);
                let index = self.resolve_type(index);
                self.indexed_access_type(object, index, typ.span)
            }
            TypeKind::Parenthesized(inner) => self.resolve_type(inner),
        }
    }

    fn resolve_type_reference(&mut self, reference: &'a TypeReference) -> TypeId {
        let name = &reference.name.node;
        let args: Vec<TypeId> = reference
            .type_arguments
            .iter()
            .flatten()
            .map(|t| self.resolve_type(t))
            .collect();

        match self.symbols.lookup_type(self.scope, name) {
            Some(symbol) => self.type_of_type_symbol(symbol, args, reference),
            None => {
                let message = if self.symbols.lookup_value(self.scope, name).is_some() {
                    format!(
                        "'{}' refers to a value, but is being used as a type here. Did you mean 'typeof {}'?",
                        name, name
                    )
                } else {
                    format!("Cannot find name '{}'.", name)
                };
                self.error(reference.name.span, message);
                self.common().any
            }
        }
    }

    fn type_of_type_symbol(&mut self, symbol: SymbolId, args: Vec<TypeId>, reference: &'a TypeReference) -> TypeId {
        let declaration = self.symbols.symbol(symbol).declaration.clone();
        match declaration {
            Declaration::Resolved(type_id) => {
                if !args.is_empty() {
                    self.error(
                        reference.span,
                        format!("Type '{}' is not generic.", reference.name.node),
                    );
                }
                type_id
            }
            Declaration::Class { decl, .. } | Declaration::Interface { decl } => {
                self.named_reference(decl, args, reference)
            }
            Declaration::TypeAlias(_) => self.alias_reference(symbol, args, reference),
            Declaration::Import { file, name } => {
                let exports = &self.sources[file].exports;
                match (exports.types.get(&name).copied(), exports.values.contains_key(&name)) {
                    (Some(target), _) => self.type_of_type_symbol(target, args, reference),
                    (None, true) => {
                        let local = &reference.name.node;
                        self.error(
                            reference.name.span,
                            format!(
                                "'{}' refers to a value, but is being used as a type here. Did you mean 'typeof {}'?",
                                local, local
                            ),
                        );
                        self.common().any
                    }
                    (None, false) => self.common().any,
                }
            }
            _ => {
                let name = &reference.name.node;
                self.error(
                    reference.name.span,
                    format!(
                        "'{}' refers to a value, but is being used as a type here. Did you mean 'typeof {}'?",
                        name, name
                    ),
                );
                self.common().any
            }
        }
    }

    /// Complete `args` for `parameters`, reporting arity and constraint
    /// violations at `span`
    fn checked_type_arguments(
        &mut self,
        display_name: impl FnOnce(&Self) -> String,
        parameters: &[TypeId],
        mut args: Vec<TypeId>,
        span: Span,
    ) -> Vec<TypeId> {
        let store = self.store();
        let required = parameters
            .iter()
            .take_while(|p| store.type_parameter(**p).and_then(|info| info.default).is_none())
            .count();

        if args.len() < required || args.len() > parameters.len() {
            let name = display_name(self);
            let message = if required == parameters.len() {
                format!("Generic type '{}' requires {} type argument(s).", name, parameters.len())
            } else {
                format!(
                    "Generic type '{}' requires between {} and {} type arguments.",
                    name,
                    required,
                    parameters.len()
                )
            };
            self.error(span, message);
            args = vec![self.common().any; parameters.len()];
        }

        let mapping = declaration_mapping(self.store(), parameters, &args);
        let full: Vec<TypeId> = parameters
            .iter()
            .map(|p| mapping.get(p).copied().unwrap_or(self.common().any))
            .collect();
        self.check_type_constraints(parameters, &full, &mapping, span);
        full
    }

    /// Report arguments that do not satisfy their parameter's constraint
    pub(super) fn check_type_constraints(
        &mut self,
        parameters: &[TypeId],
        args: &[TypeId],
        mapping: &TypeMapping,
        span: Span,
    ) {
        for (parameter, arg) in parameters.iter().zip(args) {
            let Some(constraint) = self.store().type_parameter(*parameter).and_then(|p| p.constraint) else {
                continue;
            };
            let constraint = instantiate_type(self.store(), constraint, mapping);
            if !self.is_assignable(*arg, constraint) {
                let message = format!(
                    "Type '{}' does not satisfy the constraint '{}'.",
                    self.display(*arg),
                    self.display(constraint)
                );
                self.error(span, message);
            }
        }
    }

    fn named_reference(&mut self, decl: DeclId, args: Vec<TypeId>, reference: &'a TypeReference) -> TypeId {
        // Defaults and constraints come with the template
        self.ensure_template(decl);
        let info = self.store().decl(decl);

        let args = if info.type_parameters.is_empty() {
            if !args.is_empty() {
                self.error(reference.span, format!("Type '{}' is not generic.", info.name));
            }
            Vec::new()
        } else {
            self.checked_type_arguments(
                |pass| pass.display(pass.store().decl_self_type(decl)),
                &info.type_parameters,
                args,
                reference.span,
            )
        };

        let well_known = self.store().well_known();
        if well_known.array == Some(decl) && args.len() == 1 {
            return self.store().array(args[0], false);
        }
        if well_known.readonly_array == Some(decl) && args.len() == 1 {
            return self.store().array(args[0], true);
        }
        self.store().named(decl, args)
    }

    fn alias_reference(&mut self, symbol: SymbolId, args: Vec<TypeId>, reference: &'a TypeReference) -> TypeId {
        let Some(entry) = self.env.alias(symbol).cloned() else {
            return self.common().any;
        };
        let body = match entry.body {
            Some(body) => body,
            None => self.resolve_alias_body(symbol),
        };
        let name = self.symbols.symbol(symbol).name.clone();

        if entry.type_parameters.is_empty() {
            if !args.is_empty() {
                self.error(reference.span, format!("Type '{}' is not generic.", name));
            }
            return self.store().with_alias(body, AliasInfo { name, args: Vec::new() });
        }

        let generic_name = name.clone();
        let parameters = entry.type_parameters.clone();
        let args = self.checked_type_arguments(
            move |pass| {
                let names: Vec<String> = parameters.iter().map(|p| pass.display(*p)).collect();
                format!("{}<{}>", generic_name, names.join(", "))
            },
            &entry.type_parameters,
            args,
            reference.span,
        );

        if let Some(instance) = self.env.alias_instance(symbol, &args) {
            return instance;
        }
        let mapping: TypeMapping = entry
            .type_parameters
            .iter()
            .copied()
            .zip(args.iter().copied())
            .collect();
        let instantiated = instantiate_type(self.store(), body, &mapping);
        let instance = self.store().with_alias(
            instantiated,
            AliasInfo {
                name,
                args: args.clone(),
            },
        );
        self.env.cache_alias_instance(symbol, args, instance);
        instance
    }

    /// Resolve the body of a type alias over its own parameters
    pub(super) fn resolve_alias_body(&mut self, symbol: SymbolId) -> TypeId {
        let (alias, file, span, name) = {
            let symbol = self.symbols.symbol(symbol);
            let Declaration::TypeAlias(alias) = symbol.declaration else {
                return self.common().any;
            };
            (alias, symbol.file, symbol.span, symbol.name.clone())
        };
        let Some(entry) = self.env.alias(symbol).cloned() else {
            return self.common().any;
        };
        if let Some(body) = entry.body {
            return body;
        }

        if !self.env.begin_alias(symbol) {
            self.isolated(file, entry.scope, |pass| {
                pass.error(
                    span,
                    format!("Type alias '{}' circularly references itself.", name),
                )
            });
            return self.common().any;
        }
        let body = self.isolated(file, entry.scope, |pass| {
            pass.resolve_type_parameter_bounds(alias.type_parameters.as_deref(), &entry.type_parameters);
            pass.resolve_type(&alias.type_annotation)
        });
        self.env.end_alias(symbol);
        self.env.set_alias_body(symbol, body);
        body
    }

    /// `typeof x` and `typeof x.y`
    fn resolve_type_query(&mut self, path: &'a [Ident]) -> TypeId {
        let Some((first, rest)) = path.split_first() else {
            return self.common().any;
        };
        let mut type_id = match self.symbols.lookup_value(self.scope, &first.node) {
            Some(symbol) => self.value_type_of_symbol(symbol),
            None if first.node == "undefined" => self.common().undefined,
            None => {
                self.error(first.span, format!("Cannot find name '{}'.", first.node));
                return self.common().any;
            }
        };
        for segment in rest {
            type_id = self.property_access_type(type_id, &segment.node, segment.span);
        }
        self.store().regular_literal(type_id)
    }

    /// Union of the property-name literals of `id`
    pub(super) fn keyof_type(&mut self, id: TypeId) -> TypeId {
        let common = self.common();
        if id == common.any {
            return self.store().union(vec![common.string, common.number, common.symbol]);
        }
        self.ensure_named_templates(id);
        let shape = self.checker.apparent_shape(id);

        let mut keys: Vec<TypeId> = shape
            .properties
            .iter()
            .map(|property| self.store().string_literal(&property.name, false))
            .collect();
        if shape.string_index.is_some() {
            keys.push(common.string);
            keys.push(common.number);
        } else if shape.number_index.is_some() {
            keys.push(common.number);
        }
        self.store().union(keys)
    }

    /// `T[K]`
    pub(super) fn indexed_access_type(&mut self, object: TypeId, index: TypeId, span: Span) -> TypeId {
        let common = self.common();
        if object == common.any || index == common.any {
            return common.any;
        }
        self.ensure_named_templates(object);
        let shape = self.checker.apparent_shape(object);

        let mut results = Vec::new();
        for key in self.store().union_members(index) {
            let data = self.store().data(key);
            let found = match &*data {
                TypeData::Literal {
                    value: LiteralValue::String(name),
                    ..
                } => shape
                    .property(name)
                    .map(|p| p.type_id)
                    .or(shape.string_index),
                TypeData::Literal {
                    value: LiteralValue::Number(number),
                    ..
                } => shape
                    .property(&format_number(number.value()))
                    .map(|p| p.type_id)
                    .or(shape.number_index)
                    .or(shape.string_index),
                TypeData::Intrinsic(Intrinsic::Number) => shape.number_index.or(shape.string_index),
                TypeData::Intrinsic(Intrinsic::String) => shape.string_index,
                TypeData::Parameter(_) => Some(common.unknown),
                _ => None,
            };
            match found {
                Some(type_id) => results.push(type_id),
                None => {
                    let message = match &*data {
                        TypeData::Literal { value, .. } => format!(
                            "Property '{}' does not exist on type '{}'.",
                            literal_key(value),
                            self.display(object)
                        ),
                        _ => format!(
                            "Type '{}' cannot be used to index type '{}'.",
                            self.display(key),
                            self.display(object)
                        ),
                    };
                    self.error(span, message);
                    results.push(common.any);
                }
            }
        }
        self.store().union(results)
    }
}

fn intrinsic_for(primitive: PrimitiveType) -> Intrinsic {
    match primitive {
        PrimitiveType::Any => Intrinsic::Any,
        PrimitiveType::Unknown => Intrinsic::Unknown,
        PrimitiveType::Never => Intrinsic::Never,
        PrimitiveType::Void => Intrinsic::Void,
        PrimitiveType::Undefined => Intrinsic::Undefined,
        PrimitiveType::Null => Intrinsic::Null,
        PrimitiveType::String => Intrinsic::String,
        PrimitiveType::Number => Intrinsic::Number,
        PrimitiveType::Boolean => Intrinsic::Boolean,
        PrimitiveType::BigInt => Intrinsic::BigInt,
        PrimitiveType::Symbol => Intrinsic::Symbol,
        PrimitiveType::Object => Intrinsic::NonPrimitive,
    }
}

fn literal_key(value: &LiteralValue) -> String {
    match value {
        LiteralValue::String(s) => s.clone(),
        LiteralValue::Number(n) => format_number(n.value()),
        LiteralValue::Boolean(b) => b.to_string(),
    }
}
