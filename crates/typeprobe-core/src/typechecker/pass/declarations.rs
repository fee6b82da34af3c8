use super::{BodyMode, CheckPass, FunctionBody, FunctionContext, FunctionParts};
use crate::ast::expression::{ArrowBody, ArrowFunction, FunctionExpression};
use crate::ast::statement::{
    ClassDeclaration, ClassMember, ConstructorDeclaration, ExportNamedDeclaration,
    FunctionDeclaration, ImportDeclaration, InterfaceDeclaration, MethodDeclaration, Parameter,
    Statement, TypeAliasDeclaration, TypeParameter, VariableDeclarator, VariableKind,
};
use crate::ast::types::{ObjectTypeMember, TypeKind};
use crate::span::Span;
use crate::typechecker::generics::{declaration_mapping, instantiate_signature};
use crate::typechecker::intrinsics::{expect_type_function, EXPECT_TYPE_NAME, MARKER_MODULES};
use crate::typechecker::symbol_table::{Declaration, ScopeId, Symbol, SymbolId, SymbolKind};
use crate::typechecker::type_environment::{DeclSource, TemplateState};
use crate::typechecker::types::{
    DeclId, DeclKind, ObjectShape, ParameterInfo, PropertyInfo, Signature, TypeData, TypeId,
};

impl<'a> FunctionParts<'a> {
    pub(super) fn from_declaration(function: &'a FunctionDeclaration) -> Self {
        FunctionParts {
            type_parameters: function.type_parameters.as_deref(),
            parameters: &function.parameters,
            return_type: function.return_type.as_ref(),
            body: function.body.as_ref().map(FunctionBody::Block),
            span: function.span,
        }
    }

    pub(super) fn from_method(method: &'a MethodDeclaration) -> Self {
        FunctionParts {
            type_parameters: method.type_parameters.as_deref(),
            parameters: &method.parameters,
            return_type: method.return_type.as_ref(),
            body: method.body.as_ref().map(FunctionBody::Block),
            span: method.span,
        }
    }

    pub(super) fn from_constructor(constructor: &'a ConstructorDeclaration) -> Self {
        FunctionParts {
            type_parameters: None,
            parameters: &constructor.parameters,
            return_type: None,
            body: constructor.body.as_ref().map(FunctionBody::Block),
            span: constructor.span,
        }
    }

    pub(super) fn from_function_expression(function: &'a FunctionExpression) -> Self {
        FunctionParts {
            type_parameters: function.type_parameters.as_deref(),
            parameters: &function.parameters,
            return_type: function.return_type.as_ref(),
            body: Some(FunctionBody::Block(&function.body)),
            span: function.span,
        }
    }

    pub(super) fn from_arrow(arrow: &'a ArrowFunction) -> Self {
        FunctionParts {
            type_parameters: arrow.type_parameters.as_deref(),
            parameters: &arrow.parameters,
            return_type: arrow.return_type.as_ref(),
            body: Some(match &arrow.body {
                ArrowBody::Expression(expression) => FunctionBody::Expression(expression),
                ArrowBody::Block(block) => FunctionBody::Block(block),
            }),
            span: arrow.span,
        }
    }
}

impl<'a> CheckPass<'a> {
    // Binding

    /// Hoist the declarations of one block into `scope`
    pub(super) fn bind_statements(&mut self, statements: &'a [Statement], scope: ScopeId) {
        for statement in statements {
            self.bind_statement(statement, scope, false);
        }
        for statement in statements {
            if let Statement::ExportNamed(export) = statement {
                self.bind_export_specifiers(export, scope);
            }
        }
    }

    fn bind_statement(&mut self, statement: &'a Statement, scope: ScopeId, exported: bool) {
        match statement {
            Statement::Variable(declaration) => {
                let kind = match declaration.kind {
                    VariableKind::Const => SymbolKind::Const,
                    VariableKind::Let | VariableKind::Var => SymbolKind::Variable,
                };
                for declarator in &declaration.declarators {
                    let id = self.symbols.add_symbol(Symbol::new(
                        &declarator.name.node,
                        kind,
                        Declaration::Variable {
                            declarator,
                            kind: declaration.kind,
                        },
                        declarator.name.span,
                        scope,
                        self.file,
                    ));
                    self.declare_value(scope, id);
                    if exported {
                        self.export_value(id);
                    }
                }
            }
            Statement::Function(function) => self.bind_function(function, scope, exported),
            Statement::Class(class) => self.bind_class(class, scope, exported),
            Statement::Interface(interface) => self.bind_interface(interface, scope, exported),
            Statement::TypeAlias(alias) => self.bind_alias(alias, scope, exported),
            Statement::Import(import) => self.bind_import(import, scope),
            Statement::Export(inner) => self.bind_statement(inner, scope, true),
            Statement::ExportDefault(expression) => {
                let id = self.symbols.add_symbol(Symbol::new(
                    "default",
                    SymbolKind::Variable,
                    Declaration::DefaultExport(expression),
                    expression.span,
                    scope,
                    self.file,
                ));
                self.sources[self.file]
                    .exports
                    .values
                    .insert("default".to_string(), id);
            }
            _ => {}
        }
    }

    fn declare_value(&mut self, scope: ScopeId, id: SymbolId) {
        if let Err(message) = self.symbols.declare_value(scope, id) {
            let span = self.symbols.symbol(id).span;
            self.error(span, message);
        }
    }

    fn declare_type(&mut self, scope: ScopeId, id: SymbolId) {
        if let Err(message) = self.symbols.declare_type(scope, id) {
            let span = self.symbols.symbol(id).span;
            self.error(span, message);
        }
    }

    fn export_value(&mut self, id: SymbolId) {
        let name = self.symbols.symbol(id).name.clone();
        self.symbols.symbol_mut(id).is_exported = true;
        self.sources[self.file].exports.values.insert(name, id);
    }

    fn export_type(&mut self, id: SymbolId) {
        let name = self.symbols.symbol(id).name.clone();
        self.symbols.symbol_mut(id).is_exported = true;
        self.sources[self.file].exports.types.insert(name, id);
    }

    fn bind_function(&mut self, function: &'a FunctionDeclaration, scope: ScopeId, exported: bool) {
        if let Some(existing) = self.symbols.lookup_value_local(scope, &function.name.node) {
            if let Declaration::Functions(overloads) = &mut self.symbols.symbol_mut(existing).declaration {
                overloads.push(function);
                if exported {
                    self.export_value(existing);
                }
                return;
            }
        }

        let id = self.symbols.add_symbol(Symbol::new(
            &function.name.node,
            SymbolKind::Function,
            Declaration::Functions(vec![function]),
            function.name.span,
            scope,
            self.file,
        ));
        self.declare_value(scope, id);
        if exported {
            self.export_value(id);
        }
    }

    /// Declare type parameters in `scope`; bounds are resolved separately
    fn bind_type_parameters(&mut self, parameters: Option<&'a [TypeParameter]>, scope: ScopeId) -> Vec<TypeId> {
        let mut ids = Vec::new();
        for parameter in parameters.into_iter().flatten() {
            let type_id = self.store().new_type_parameter(&parameter.name.node);
            let symbol = self.symbols.add_symbol(Symbol::new(
                &parameter.name.node,
                SymbolKind::TypeParameter,
                Declaration::Resolved(type_id),
                parameter.name.span,
                scope,
                self.file,
            ));
            self.declare_type(scope, symbol);
            ids.push(type_id);
        }
        ids
    }

    /// Resolve constraints and defaults in the current scope
    pub(super) fn resolve_type_parameter_bounds(
        &mut self,
        parameters: Option<&'a [TypeParameter]>,
        ids: &[TypeId],
    ) {
        for (parameter, id) in parameters.into_iter().flatten().zip(ids) {
            let constraint = parameter.constraint.as_deref().map(|t| self.resolve_type(t));
            let default = parameter.default.as_deref().map(|t| self.resolve_type(t));
            self.store().set_type_parameter_bounds(*id, constraint, default);
        }
    }

    fn bind_class(&mut self, class: &'a ClassDeclaration, scope: ScopeId, exported: bool) {
        let decl = self.store().new_decl(&class.name.node, DeclKind::Class);
        let class_scope = self.symbols.create_scope(scope);
        let parameters = self.bind_type_parameters(class.type_parameters.as_deref(), class_scope);
        self.store().set_decl_type_parameters(decl, parameters);
        self.env.register_class(decl, class, class_scope, self.file);

        let id = self.symbols.add_symbol(Symbol::new(
            &class.name.node,
            SymbolKind::Class,
            Declaration::Class { class, decl },
            class.name.span,
            class_scope,
            self.file,
        ));
        self.declare_value(scope, id);
        self.declare_type(scope, id);
        if exported {
            self.export_value(id);
            self.export_type(id);
        }
    }

    fn bind_interface(&mut self, interface: &'a InterfaceDeclaration, scope: ScopeId, exported: bool) {
        let existing = self
            .symbols
            .lookup_type_local(scope, &interface.name.node)
            .and_then(|id| match self.symbols.symbol(id).declaration {
                Declaration::Interface { decl } => Some((id, decl)),
                _ => None,
            });

        if let Some((id, decl)) = existing {
            // Merged declaration: reuse the parameters by position
            let parameters = self.store().decl(decl).type_parameters;
            let part_scope = self.symbols.create_scope(scope);
            for (parameter, type_id) in interface.type_parameters.iter().flatten().zip(&parameters) {
                let symbol = self.symbols.add_symbol(Symbol::new(
                    &parameter.name.node,
                    SymbolKind::TypeParameter,
                    Declaration::Resolved(*type_id),
                    parameter.name.span,
                    part_scope,
                    self.file,
                ));
                self.declare_type(part_scope, symbol);
            }
            self.env.register_interface(decl, interface, part_scope, self.file);
            if exported {
                self.export_type(id);
            }
            return;
        }

        let decl = self.store().new_decl(&interface.name.node, DeclKind::Interface);
        let part_scope = self.symbols.create_scope(scope);
        let parameters = self.bind_type_parameters(interface.type_parameters.as_deref(), part_scope);
        self.store().set_decl_type_parameters(decl, parameters);
        self.env.register_interface(decl, interface, part_scope, self.file);

        let id = self.symbols.add_symbol(Symbol::new(
            &interface.name.node,
            SymbolKind::Interface,
            Declaration::Interface { decl },
            interface.name.span,
            scope,
            self.file,
        ));
        self.declare_type(scope, id);
        if exported {
            self.export_type(id);
        }
    }

    fn bind_alias(&mut self, alias: &'a TypeAliasDeclaration, scope: ScopeId, exported: bool) {
        let alias_scope = self.symbols.create_scope(scope);
        let parameters = self.bind_type_parameters(alias.type_parameters.as_deref(), alias_scope);
        let id = self.symbols.add_symbol(Symbol::new(
            &alias.name.node,
            SymbolKind::TypeAlias,
            Declaration::TypeAlias(alias),
            alias.name.span,
            alias_scope,
            self.file,
        ));
        self.declare_type(scope, id);
        self.env.register_alias(id, parameters, alias_scope);
        if exported {
            self.export_type(id);
        }
    }

    fn bind_import(&mut self, import: &'a ImportDeclaration, scope: ScopeId) {
        let specifier = import.source.node.as_str();
        let target = self.sources[self.file].imports.get(specifier).copied();
        let is_marker = target.is_none() && MARKER_MODULES.contains(&specifier);
        let any = self.common().any;

        if let Some(default) = &import.default {
            let declaration = match target {
                Some(file) => Declaration::Import {
                    file,
                    name: "default".to_string(),
                },
                None => Declaration::Resolved(any),
            };
            self.bind_import_symbol(&default.node, default.span, declaration, scope);
        }
        if let Some(namespace) = &import.namespace {
            let declaration = match target {
                Some(file) => Declaration::Namespace { file },
                None => Declaration::Resolved(any),
            };
            self.bind_import_symbol(&namespace.node, namespace.span, declaration, scope);
        }
        for named in &import.specifiers {
            let declaration = match target {
                Some(file) => Declaration::Import {
                    file,
                    name: named.imported.node.clone(),
                },
                None if is_marker && named.imported.node == EXPECT_TYPE_NAME => Declaration::ExpectType,
                None => Declaration::Resolved(any),
            };
            self.bind_import_symbol(&named.local.node, named.local.span, declaration, scope);
        }
    }

    fn bind_import_symbol(&mut self, name: &str, span: Span, declaration: Declaration<'a>, scope: ScopeId) {
        let kind = match declaration {
            Declaration::ExpectType => SymbolKind::Intrinsic,
            Declaration::Namespace { .. } => SymbolKind::Namespace,
            _ => SymbolKind::Import,
        };
        let id = self
            .symbols
            .add_symbol(Symbol::new(name, kind, declaration, span, scope, self.file));
        self.declare_value(scope, id);
        if kind == SymbolKind::Import {
            self.declare_type(scope, id);
        }
    }

    fn bind_export_specifiers(&mut self, export: &'a ExportNamedDeclaration, scope: ScopeId) {
        for specifier in &export.specifiers {
            let value = self.symbols.lookup_value(scope, &specifier.local.node);
            let typ = self.symbols.lookup_type(scope, &specifier.local.node);
            if value.is_none() && typ.is_none() {
                self.error(
                    specifier.local.span,
                    format!("Cannot find name '{}'.", specifier.local.node),
                );
                continue;
            }
            let exports = &mut self.sources[self.file].exports;
            if let Some(value) = value {
                exports.values.insert(specifier.exported.node.clone(), value);
            }
            if let Some(typ) = typ {
                exports.types.insert(specifier.exported.node.clone(), typ);
            }
        }
    }

    // Symbol types

    /// Type of a symbol used as a value, resolved once and cached
    pub(super) fn value_type_of_symbol(&mut self, id: SymbolId) -> TypeId {
        let symbol = self.symbols.symbol(id);
        if let Some(type_id) = symbol.value_type {
            return type_id;
        }
        if symbol.resolving {
            return self.common().any;
        }

        let (declaration, file, scope) = (symbol.declaration.clone(), symbol.file, symbol.scope);
        self.symbols.symbol_mut(id).resolving = true;
        let resolved = self.isolated(file, scope, |pass| pass.compute_value_type(declaration));

        let symbol = self.symbols.symbol_mut(id);
        symbol.resolving = false;
        symbol.value_type = Some(resolved);
        resolved
    }

    fn compute_value_type(&mut self, declaration: Declaration<'a>) -> TypeId {
        let any = self.common().any;
        match declaration {
            Declaration::Variable { declarator, kind } => self.variable_type(declarator, kind),
            Declaration::Functions(functions) => self.function_declarations_type(&functions),
            Declaration::Class { class, decl } => self.constructor_type(class, decl),
            Declaration::Import { file, name } => {
                match self.sources[file].exports.values.get(&name).copied() {
                    Some(target) => self.value_type_of_symbol(target),
                    None => any,
                }
            }
            Declaration::Namespace { file } => self.namespace_type(file),
            Declaration::DefaultExport(expression) => self.check_expression(expression, None),
            Declaration::Resolved(type_id) => type_id,
            Declaration::ExpectType => expect_type_function(self.store()),
            Declaration::Interface { .. } | Declaration::TypeAlias(_) => any,
        }
    }

    /// Declared type of a variable, checking its initializer
    pub(super) fn variable_type(&mut self, declarator: &'a VariableDeclarator, kind: VariableKind) -> TypeId {
        let declared = declarator
            .type_annotation
            .as_ref()
            .map(|annotation| self.resolve_type(annotation));

        match (declared, &declarator.initializer) {
            (Some(declared), Some(initializer)) => {
                let actual = self.check_expression(initializer, Some(declared));
                self.check_assignable(actual, declared, declarator.name.span);
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(initializer)) => {
                let actual = self.check_expression(initializer, None);
                if kind == VariableKind::Const {
                    actual
                } else {
                    self.store().widen_for_declaration(actual)
                }
            }
            (None, None) => self.common().any,
        }
    }

    fn function_declarations_type(&mut self, functions: &[&'a FunctionDeclaration]) -> TypeId {
        let has_implementation = functions.iter().any(|f| f.body.is_some());
        let overloads: Vec<&'a FunctionDeclaration> = if has_implementation && functions.len() > 1 {
            functions.iter().copied().filter(|f| f.body.is_none()).collect()
        } else {
            functions.to_vec()
        };

        let mut call_signatures = Vec::with_capacity(overloads.len());
        for function in overloads {
            let parts = FunctionParts::from_declaration(function);
            call_signatures.push(self.function_signature(&parts, None, BodyMode::Declaration));
        }
        if call_signatures.len() == 1 {
            return self.store().function(call_signatures.remove(0));
        }
        self.store().object(ObjectShape {
            call_signatures,
            ..ObjectShape::default()
        })
    }

    /// Static side of a class: its construct signature and static members
    fn constructor_type(&mut self, class: &'a ClassDeclaration, decl: DeclId) -> TypeId {
        self.ensure_template(decl);
        let type_parameters = self.store().decl(decl).type_parameters;
        let instance = self.store().named(decl, type_parameters.clone());

        let constructor = class.members.iter().find_map(|member| match member {
            ClassMember::Constructor(constructor) => Some(constructor),
            _ => None,
        });
        let parameters = match constructor {
            Some(constructor) => {
                let scope = self.symbols.create_scope(self.scope);
                self.in_scope(scope, |pass| pass.declare_parameters(&constructor.parameters, None, scope))
            }
            None => self.inherited_constructor_parameters(class),
        };

        let mut shape = ObjectShape {
            construct_signatures: vec![Signature {
                type_parameters,
                parameters,
                return_type: instance,
            }],
            ..ObjectShape::default()
        };

        for member in &class.members {
            match member {
                ClassMember::Property(property) if property.is_static => {
                    let type_id = match (&property.type_annotation, &property.initializer) {
                        (Some(annotation), _) => self.resolve_type(annotation),
                        (None, Some(initializer)) => {
                            let actual = self.check_expression(initializer, None);
                            self.widen_member(actual, property.is_readonly)
                        }
                        (None, None) => self.common().any,
                    };
                    shape.set_property(
                        PropertyInfo::new(&property.name.node, type_id)
                            .optional(property.is_optional)
                            .readonly(property.is_readonly),
                    );
                }
                ClassMember::Method(method) if method.is_static => {
                    let parts = FunctionParts::from_method(method);
                    let signature = self.function_signature(&parts, None, BodyMode::Declaration);
                    shape.set_property(
                        PropertyInfo::new(&method.name.node, self.store().function(signature))
                            .optional(method.is_optional)
                            .method(true),
                    );
                }
                _ => {}
            }
        }

        let constructor_type = self.store().object(shape);
        if class.is_abstract {
            self.abstract_constructors.insert(constructor_type);
        }
        constructor_type
    }

    fn inherited_constructor_parameters(&mut self, class: &'a ClassDeclaration) -> Vec<ParameterInfo> {
        let Some(extends) = &class.extends else {
            return Vec::new();
        };
        let TypeKind::Reference(reference) = &extends.kind else {
            return Vec::new();
        };
        let Some(base) = self.symbols.lookup_value(self.scope, &reference.name.node) else {
            return Vec::new();
        };
        let base_constructor = self.value_type_of_symbol(base);
        let Some(signature) = self.checker.construct_signatures(base_constructor).into_iter().next() else {
            return Vec::new();
        };
        let args: Vec<TypeId> = reference
            .type_arguments
            .iter()
            .flatten()
            .map(|t| self.resolve_type(t))
            .collect();
        let mapping = declaration_mapping(self.store(), &signature.type_parameters, &args);
        instantiate_signature(self.store(), &signature, &mapping).parameters
    }

    /// `import * as ns` object: every exported value of the module
    fn namespace_type(&mut self, file: usize) -> TypeId {
        let mut exported: Vec<(String, SymbolId)> = self.sources[file]
            .exports
            .values
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect();
        exported.sort_by(|a, b| a.0.cmp(&b.0));

        let mut shape = ObjectShape::default();
        for (name, id) in exported {
            let type_id = self.value_type_of_symbol(id);
            shape.set_property(PropertyInfo::new(name, type_id).readonly(true));
        }
        self.store().object(shape)
    }

    /// Type of an unannotated class member initialized with `actual`
    fn widen_member(&self, actual: TypeId, readonly: bool) -> TypeId {
        if readonly {
            self.store().regular_literal(actual)
        } else {
            self.store().widen_for_declaration(actual)
        }
    }

    // Functions

    /// Signature of a function-like declaration; the body is checked as
    /// `mode` says, inferring the return type when it is not annotated
    pub(super) fn function_signature(
        &mut self,
        parts: &FunctionParts<'a>,
        contextual: Option<&Signature>,
        mode: BodyMode,
    ) -> Signature {
        let scope = self.symbols.create_scope(self.scope);
        let type_parameters = self.bind_type_parameters(parts.type_parameters, scope);

        let (parameters, declared_return) = self.in_scope(scope, |pass| {
            pass.resolve_type_parameter_bounds(parts.type_parameters, &type_parameters);
            let parameters = pass.declare_parameters(parts.parameters, contextual, scope);
            let declared_return = parts.return_type.map(|t| pass.resolve_type(t));
            (parameters, declared_return)
        });

        let key = (self.file, parts.span.start);
        let run_body = parts.body.is_some()
            && match mode {
                BodyMode::SignatureOnly => false,
                BodyMode::Declaration => {
                    declared_return.is_none() && !self.checked_bodies.contains(&key)
                }
                BodyMode::Statement => !self.checked_bodies.contains(&key),
                BodyMode::Expression => true,
            };

        let mut inferred = None;
        if let (true, Some(body)) = (run_body, parts.body) {
            let contextual_return = contextual.map(|signature| signature.return_type);
            let return_type = self.in_scope(scope, |pass| {
                pass.check_function_body(body, declared_return, contextual_return)
            });
            if mode != BodyMode::Expression {
                self.checked_bodies.insert(key);
                self.inferred_returns.insert(key, return_type);
            }
            inferred = Some(return_type);
        }

        let return_type = declared_return
            .or(inferred)
            .or_else(|| self.inferred_returns.get(&key).copied())
            .unwrap_or(self.common().any);

        Signature {
            type_parameters,
            parameters,
            return_type,
        }
    }

    /// Declare parameter symbols in `scope`
    pub(super) fn declare_parameters(
        &mut self,
        parameters: &'a [Parameter],
        contextual: Option<&Signature>,
        scope: ScopeId,
    ) -> Vec<ParameterInfo> {
        let mut infos = Vec::with_capacity(parameters.len());
        for (index, parameter) in parameters.iter().enumerate() {
            let annotated = parameter
                .type_annotation
                .as_ref()
                .map(|annotation| self.resolve_type(annotation));
            let from_context = contextual.and_then(|signature| {
                if parameter.is_rest {
                    self.contextual_rest_type(signature, index)
                } else {
                    self.parameter_type_for_argument(signature, index)
                }
            });

            let type_id = match (annotated.or(from_context), &parameter.default) {
                (Some(declared), Some(default)) => {
                    let actual = self.check_expression(default, Some(declared));
                    self.check_assignable(actual, declared, default.span);
                    declared
                }
                (Some(declared), None) => declared,
                (None, Some(default)) => {
                    let actual = self.check_expression(default, None);
                    self.store().widen_for_declaration(actual)
                }
                (None, None) => {
                    if self.checker.options().no_implicit_any_enabled() {
                        self.error(
                            parameter.name.span,
                            format!("Parameter '{}' implicitly has an 'any' type.", parameter.name.node),
                        );
                    }
                    let any = self.common().any;
                    if parameter.is_rest {
                        self.store().array(any, false)
                    } else {
                        any
                    }
                }
            };

            let local_type = if parameter.is_optional && self.strict_null_checks() {
                let undefined = self.common().undefined;
                self.store().union(vec![type_id, undefined])
            } else {
                type_id
            };
            let symbol = self.symbols.add_symbol(Symbol::new(
                &parameter.name.node,
                SymbolKind::Parameter,
                Declaration::Resolved(local_type),
                parameter.name.span,
                scope,
                self.file,
            ));
            self.declare_value(scope, symbol);

            infos.push(ParameterInfo {
                name: parameter.name.node.clone(),
                type_id,
                optional: parameter.is_optional || parameter.default.is_some(),
                rest: parameter.is_rest,
            });
        }
        infos
    }

    /// Check a body in the current (parameter) scope and return its
    /// inferred return type
    fn check_function_body(
        &mut self,
        body: FunctionBody<'a>,
        declared_return: Option<TypeId>,
        contextual_return: Option<TypeId>,
    ) -> TypeId {
        self.functions.push(FunctionContext {
            declared_return,
            contextual_return,
            returns: Vec::new(),
        });

        match body {
            FunctionBody::Block(block) => {
                let scope = self.scope;
                self.bind_statements(&block.statements, scope);
                self.build_pending_templates();
                self.check_statements(&block.statements);
            }
            FunctionBody::Expression(expression) => {
                let actual = self.check_expression(expression, declared_return.or(contextual_return));
                if let Some(declared) = declared_return {
                    self.check_assignable(actual, declared, expression.span);
                }
                if let Some(context) = self.functions.last_mut() {
                    context.returns.push(actual);
                }
            }
        }

        let returns = self
            .functions
            .pop()
            .map(|context| context.returns)
            .unwrap_or_default();
        if returns.is_empty() {
            return self.common().void;
        }
        let store = self.store();
        let union = store.union(returns);
        if store.is_fresh_literal(union) && !self.is_literal_context(contextual_return) {
            store.widen_literal(union)
        } else {
            store.regular_literal(union)
        }
    }

    // Templates

    /// Build every template registered so far
    pub(super) fn build_pending_templates(&mut self) {
        for decl in self.env.decls() {
            self.ensure_template(decl);
        }
    }

    pub(super) fn ensure_template(&mut self, decl: DeclId) {
        if self.env.template_state(decl) != TemplateState::Pending {
            return;
        }
        self.env.set_template_state(decl, TemplateState::Resolving);
        match self.env.decl_source(decl) {
            Some(DeclSource::Interface(parts)) => self.build_interface_template(decl, &parts),
            Some(DeclSource::Class { class, scope, file }) => {
                self.isolated(file, scope, |pass| pass.build_class_template(decl, class));
            }
            None => {}
        }
        self.env.set_template_state(decl, TemplateState::Done);
    }

    fn build_interface_template(
        &mut self,
        decl: DeclId,
        parts: &[(&'a InterfaceDeclaration, ScopeId, usize)],
    ) {
        let parameters = self.store().decl(decl).type_parameters;
        let mut shape = ObjectShape::default();

        for (index, &(interface, scope, file)) in parts.iter().enumerate() {
            self.isolated(file, scope, |pass| {
                if index == 0 {
                    pass.resolve_type_parameter_bounds(interface.type_parameters.as_deref(), &parameters);
                }
                for base in &interface.extends {
                    let base_type = pass.resolve_type(base);
                    pass.inherit_members(&mut shape, base_type);
                }
                for member in &interface.members {
                    pass.add_type_member(&mut shape, member);
                }
            });
        }

        self.store().set_decl_template(decl, shape);
    }

    /// Copy the members of `base` that `shape` does not declare itself
    fn inherit_members(&mut self, shape: &mut ObjectShape, base: TypeId) {
        self.ensure_named_templates(base);
        let base_shape = self.checker.apparent_shape(base);
        for property in &base_shape.properties {
            if shape.property(&property.name).is_none() {
                shape.properties.push(property.clone());
            }
        }
        shape
            .call_signatures
            .extend(base_shape.call_signatures.iter().cloned());
        shape
            .construct_signatures
            .extend(base_shape.construct_signatures.iter().cloned());
        shape.string_index = shape.string_index.or(base_shape.string_index);
        shape.number_index = shape.number_index.or(base_shape.number_index);
    }

    /// Add one member of an object type literal or interface body
    pub(super) fn add_type_member(&mut self, shape: &mut ObjectShape, member: &'a ObjectTypeMember) {
        match member {
            ObjectTypeMember::Property(property) => {
                let type_id = property
                    .type_annotation
                    .as_ref()
                    .map(|annotation| self.resolve_type(annotation))
                    .unwrap_or(self.common().any);
                shape.set_property(
                    PropertyInfo::new(&property.name.node, type_id)
                        .optional(property.is_optional)
                        .readonly(property.is_readonly),
                );
            }
            ObjectTypeMember::Method(method) => {
                let parts = FunctionParts {
                    type_parameters: method.type_parameters.as_deref(),
                    parameters: &method.parameters,
                    return_type: method.return_type.as_ref(),
                    body: None,
                    span: method.span,
                };
                let signature = self.function_signature(&parts, None, BodyMode::SignatureOnly);

                // Repeated method names are overloads
                let mut call_signatures = match shape.property(&method.name.node) {
                    Some(existing) if existing.is_method => self.checker.call_signatures(existing.type_id),
                    _ => Vec::new(),
                };
                call_signatures.push(signature);
                let type_id = if call_signatures.len() == 1 {
                    self.store().function(call_signatures.remove(0))
                } else {
                    self.store().object(ObjectShape {
                        call_signatures,
                        ..ObjectShape::default()
                    })
                };
                shape.set_property(
                    PropertyInfo::new(&method.name.node, type_id)
                        .optional(method.is_optional)
                        .method(true),
                );
            }
            ObjectTypeMember::Call(call) => {
                let parts = FunctionParts {
                    type_parameters: call.type_parameters.as_deref(),
                    parameters: &call.parameters,
                    return_type: call.return_type.as_ref(),
                    body: None,
                    span: call.span,
                };
                let signature = self.function_signature(&parts, None, BodyMode::SignatureOnly);
                shape.call_signatures.push(signature);
            }
            ObjectTypeMember::Index(index) => {
                let key = self.resolve_type(&index.key_type);
                let value = self.resolve_type(&index.value_type);
                if key == self.common().number {
                    shape.number_index = Some(value);
                } else {
                    shape.string_index = Some(value);
                }
            }
        }
    }

    /// Instance members of a class. Published in stages so that members
    /// inferred from initializers and method bodies can see the rest.
    fn build_class_template(&mut self, decl: DeclId, class: &'a ClassDeclaration) {
        let parameters = self.store().decl(decl).type_parameters;
        self.resolve_type_parameter_bounds(class.type_parameters.as_deref(), &parameters);
        let this_type = self.store().named(decl, parameters);

        let mut shape = ObjectShape::default();
        if let Some(extends) = &class.extends {
            let base = self.resolve_type(extends);
            if !matches!(&*self.store().data(base), TypeData::Named { .. }) && base != self.common().any {
                let message = format!("Type '{}' is not a constructor function type.", self.display(base));
                self.error(extends.span, message);
            }
            self.inherit_members(&mut shape, base);
        }

        self.this_types.push(this_type);
        let any = self.common().any;
        let mut inferred_properties = Vec::new();
        let mut inferred_methods = Vec::new();

        for member in &class.members {
            match member {
                ClassMember::Constructor(constructor) => {
                    for parameter in constructor.parameters.iter().filter(|p| p.is_property) {
                        let type_id = parameter
                            .type_annotation
                            .as_ref()
                            .map(|annotation| self.resolve_type(annotation))
                            .unwrap_or(any);
                        shape.set_property(
                            PropertyInfo::new(&parameter.name.node, type_id).optional(parameter.is_optional),
                        );
                    }
                }
                ClassMember::Property(property) if !property.is_static => {
                    let type_id = match &property.type_annotation {
                        Some(annotation) => self.resolve_type(annotation),
                        None => {
                            if property.initializer.is_some() {
                                inferred_properties.push(property);
                            }
                            any
                        }
                    };
                    shape.set_property(
                        PropertyInfo::new(&property.name.node, type_id)
                            .optional(property.is_optional)
                            .readonly(property.is_readonly),
                    );
                }
                ClassMember::Method(method) if !method.is_static => {
                    let parts = FunctionParts::from_method(method);
                    let signature = self.function_signature(&parts, None, BodyMode::SignatureOnly);
                    shape.set_property(
                        PropertyInfo::new(&method.name.node, self.store().function(signature))
                            .optional(method.is_optional)
                            .method(true),
                    );
                    if method.return_type.is_none() && method.body.is_some() {
                        inferred_methods.push(method);
                    }
                }
                _ => {}
            }
        }
        self.store().set_decl_template(decl, shape.clone());

        if !inferred_properties.is_empty() {
            for property in inferred_properties {
                if let Some(initializer) = &property.initializer {
                    let actual = self.check_expression(initializer, None);
                    let type_id = self.widen_member(actual, property.is_readonly);
                    shape.set_property(
                        PropertyInfo::new(&property.name.node, type_id)
                            .optional(property.is_optional)
                            .readonly(property.is_readonly),
                    );
                }
            }
            self.store().set_decl_template(decl, shape.clone());
        }

        if !inferred_methods.is_empty() {
            for method in inferred_methods {
                let parts = FunctionParts::from_method(method);
                let signature = self.function_signature(&parts, None, BodyMode::Declaration);
                shape.set_property(
                    PropertyInfo::new(&method.name.node, self.store().function(signature))
                        .optional(method.is_optional)
                        .method(true),
                );
            }
            self.store().set_decl_template(decl, shape);
        }

        self.this_types.pop();
    }
}
