use super::{BodyMode, CheckPass, FunctionParts};
use crate::ast::statement::{
    Block, ClassDeclaration, ClassMember, ForOfStatement, FunctionDeclaration, ImportDeclaration,
    ReturnStatement, Statement, VariableDeclaration, VariableKind,
};
use crate::span::Span;
use crate::typechecker::intrinsics::{EXPECT_TYPE_NAME, MARKER_MODULES};
use crate::typechecker::symbol_table::{Declaration, Symbol, SymbolKind};
use crate::typechecker::types::{Intrinsic, LiteralValue, TypeData, TypeId};

impl<'a> CheckPass<'a> {
    pub(super) fn check_statements(&mut self, statements: &'a [Statement]) {
        for statement in statements {
            self.check_statement(statement);
        }
    }

    fn check_statement(&mut self, statement: &'a Statement) {
        match statement {
            Statement::Variable(declaration) => self.check_variable_declaration(declaration),
            Statement::Function(function) => self.check_function_declaration(function),
            Statement::Class(class) => self.check_class(class),
            Statement::Interface(interface) => {
                let decl = self
                    .symbols
                    .lookup_type(self.scope, &interface.name.node)
                    .and_then(|id| match self.symbols.symbol(id).declaration {
                        Declaration::Interface { decl } => Some(decl),
                        _ => None,
                    });
                if let Some(decl) = decl {
                    self.ensure_template(decl);
                }
            }
            Statement::TypeAlias(alias) => {
                if let Some(symbol) = self.symbols.lookup_type_local(self.scope, &alias.name.node) {
                    if matches!(self.symbols.symbol(symbol).declaration, Declaration::TypeAlias(a) if std::ptr::eq(a, alias)) {
                        self.resolve_alias_body(symbol);
                    }
                }
            }
            Statement::Import(import) => self.check_import(import),
            Statement::Export(inner) => self.check_statement(inner),
            Statement::ExportNamed(_) => {}
            Statement::ExportDefault(_) => {
                if let Some(id) = self.sources[self.file].exports.values.get("default").copied() {
                    self.value_type_of_symbol(id);
                }
            }
            Statement::If(statement) => {
                self.check_expression(&statement.condition, None);
                self.check_nested(&statement.then_branch);
                if let Some(else_branch) = &statement.else_branch {
                    self.check_nested(else_branch);
                }
            }
            Statement::While(statement) => {
                self.check_expression(&statement.condition, None);
                self.check_nested(&statement.body);
            }
            Statement::ForOf(statement) => self.check_for_of(statement),
            Statement::Return(statement) => self.check_return(statement),
            Statement::Throw(expression) | Statement::Expression(expression) => {
                self.check_expression(expression, None);
            }
            Statement::Block(block) => self.check_block(block),
            Statement::Break(_) | Statement::Continue(_) | Statement::Empty(_) => {}
        }
    }

    pub(super) fn check_block(&mut self, block: &'a Block) {
        let scope = self.symbols.create_scope(self.scope);
        self.in_scope(scope, |pass| {
            pass.bind_statements(&block.statements, scope);
            pass.build_pending_templates();
            pass.check_statements(&block.statements);
        });
    }

    /// Body of `if`, `while` and `for`, in a scope of its own
    fn check_nested(&mut self, statement: &'a Statement) {
        if let Statement::Block(block) = statement {
            return self.check_block(block);
        }
        let scope = self.symbols.create_scope(self.scope);
        self.in_scope(scope, |pass| {
            pass.bind_statements(std::slice::from_ref(statement), scope);
            pass.build_pending_templates();
            pass.check_statement(statement);
        });
    }

    fn check_variable_declaration(&mut self, declaration: &'a VariableDeclaration) {
        for declarator in &declaration.declarators {
            let symbol = self
                .symbols
                .lookup_value_local(self.scope, &declarator.name.node)
                .filter(|id| {
                    matches!(
                        self.symbols.symbol(*id).declaration,
                        Declaration::Variable { declarator: d, .. } if std::ptr::eq(d, declarator)
                    )
                });
            match symbol {
                Some(id) => {
                    self.value_type_of_symbol(id);
                }
                None => {
                    // A redeclaration; still check its initializer
                    self.variable_type(declarator, declaration.kind);
                }
            }
        }
    }

    fn check_function_declaration(&mut self, function: &'a FunctionDeclaration) {
        if let Some(id) = self.symbols.lookup_value_local(self.scope, &function.name.node) {
            self.value_type_of_symbol(id);
        }
        if function.body.is_some() {
            let parts = FunctionParts::from_declaration(function);
            self.function_signature(&parts, None, BodyMode::Statement);
        }
    }

    fn check_class(&mut self, class: &'a ClassDeclaration) {
        let Some(symbol) = self.symbols.lookup_type_local(self.scope, &class.name.node) else {
            return;
        };
        let (decl, class_scope) = match self.symbols.symbol(symbol).declaration {
            Declaration::Class { class: c, decl } if std::ptr::eq(c, class) => {
                (decl, self.symbols.symbol(symbol).scope)
            }
            _ => return,
        };

        self.ensure_template(decl);
        self.value_type_of_symbol(symbol);
        let this_type = self.store().decl_self_type(decl);

        self.in_scope(class_scope, |pass| {
            pass.this_types.push(this_type);
            for member in &class.members {
                match member {
                    ClassMember::Property(property) => {
                        if let (Some(annotation), Some(initializer)) =
                            (&property.type_annotation, &property.initializer)
                        {
                            let declared = pass.resolve_type(annotation);
                            let actual = pass.check_expression(initializer, Some(declared));
                            pass.check_assignable(actual, declared, property.name.span);
                        }
                    }
                    ClassMember::Method(method) => {
                        let parts = FunctionParts::from_method(method);
                        pass.function_signature(&parts, None, BodyMode::Statement);
                    }
                    ClassMember::Constructor(constructor) => {
                        let parts = FunctionParts::from_constructor(constructor);
                        pass.function_signature(&parts, None, BodyMode::Statement);
                    }
                }
            }
            pass.this_types.pop();

            for implemented in &class.implements {
                let interface = pass.resolve_type(implemented);
                if !pass.is_assignable(this_type, interface) {
                    let message = format!(
                        "Class '{}' incorrectly implements interface '{}'.",
                        class.name.node,
                        pass.display(interface)
                    );
                    pass.error(class.name.span, message);
                }
            }
        });
    }

    fn check_import(&mut self, import: &'a ImportDeclaration) {
        let specifier = import.source.node.as_str();
        let target = self.sources[self.file].imports.get(specifier).copied();

        let Some(file) = target else {
            if !MARKER_MODULES.contains(&specifier) {
                self.error(
                    import.source.span,
                    format!(
                        "Cannot find module '{}' or its corresponding type declarations.",
                        specifier
                    ),
                );
                return;
            }
            if let Some(default) = &import.default {
                self.error(default.span, format!("Module '\"{}\"' has no default export.", specifier));
            }
            for named in &import.specifiers {
                if named.imported.node != EXPECT_TYPE_NAME {
                    self.error(
                        named.imported.span,
                        format!(
                            "Module '\"{}\"' has no exported member '{}'.",
                            specifier, named.imported.node
                        ),
                    );
                }
            }
            return;
        };

        let exports = &self.sources[file].exports;
        let has_default = exports.values.contains_key("default");
        let missing: Vec<(String, Span)> = import
            .specifiers
            .iter()
            .filter(|named| {
                !exports.values.contains_key(&named.imported.node)
                    && !exports.types.contains_key(&named.imported.node)
            })
            .map(|named| (named.imported.node.clone(), named.imported.span))
            .collect();

        if let (Some(default), false) = (&import.default, has_default) {
            self.error(default.span, format!("Module '\"{}\"' has no default export.", specifier));
        }
        for (name, span) in missing {
            self.error(
                span,
                format!("Module '\"{}\"' has no exported member '{}'.", specifier, name),
            );
        }
    }

    fn check_for_of(&mut self, statement: &'a ForOfStatement) {
        let iterable = self.check_expression(&statement.iterable, None);
        let element = self.iterated_type(iterable, statement.iterable.span);

        let scope = self.symbols.create_scope(self.scope);
        let kind = match statement.kind {
            VariableKind::Const => SymbolKind::Const,
            VariableKind::Let | VariableKind::Var => SymbolKind::Variable,
        };
        let binding = self.symbols.add_symbol(Symbol::new(
            &statement.binding.node,
            kind,
            Declaration::Resolved(element),
            statement.binding.span,
            scope,
            self.file,
        ));
        let _ = self.symbols.declare_value(scope, binding);
        self.in_scope(scope, |pass| pass.check_nested(&statement.body));
    }

    /// Element type of a `for...of` iterable
    fn iterated_type(&mut self, iterable: TypeId, span: Span) -> TypeId {
        let common = self.common();
        let data = self.store().data(iterable);
        match &*data {
            TypeData::Intrinsic(Intrinsic::Any) => common.any,
            TypeData::Intrinsic(Intrinsic::String)
            | TypeData::Literal {
                value: LiteralValue::String(_),
                ..
            } => common.string,
            TypeData::Array { element, .. } => *element,
            TypeData::Tuple { elements, .. } => self.store().union(elements.clone()),
            TypeData::Union { members, .. } => {
                let elements: Vec<TypeId> = members.iter().map(|m| self.iterated_type(*m, span)).collect();
                self.store().union(elements)
            }
            _ => {
                let message = format!(
                    "Type '{}' is not an array type or a string type.",
                    self.display(iterable)
                );
                self.error(span, message);
                common.any
            }
        }
    }

    fn check_return(&mut self, statement: &'a ReturnStatement) {
        let Some(context) = self.functions.last() else {
            self.error(
                statement.span,
                "A 'return' statement can only be used within a function body.",
            );
            if let Some(value) = &statement.value {
                self.check_expression(value, None);
            }
            return;
        };
        let declared = context.declared_return;
        let contextual = declared.or(context.contextual_return);

        let returned = match &statement.value {
            Some(value) => {
                let actual = self.check_expression(value, contextual);
                if let Some(declared) = declared {
                    self.check_assignable(actual, declared, value.span);
                }
                actual
            }
            None => self.common().undefined,
        };
        if let Some(context) = self.functions.last_mut() {
            context.returns.push(returned);
        }
    }
}
