use super::expression::{
    Argument, ArrayElement, ArrowBody, Expression, ExpressionKind, FunctionExpression,
    ObjectProperty,
};
use super::statement::{
    Block, ClassMember, Parameter, Statement, TypeParameter, VariableDeclarator,
};
use super::types::{ObjectTypeMember, Type, TypeKind};
use super::{Ident, Script};
use crate::span::Span;

/// Borrowed view of any syntax node
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Script(&'a Script),
    Statement(&'a Statement),
    Block(&'a Block),
    Expression(&'a Expression),
    Type(&'a Type),
    TypeParameter(&'a TypeParameter),
    Parameter(&'a Parameter),
    VariableDeclarator(&'a VariableDeclarator),
    ClassMember(&'a ClassMember),
    TypeMember(&'a ObjectTypeMember),
    ObjectProperty(&'a ObjectProperty),
    Argument(&'a Argument),
    Identifier(&'a Ident),
}

impl<'a> Node<'a> {
    pub fn span(&self) -> Span {
        match self {
            Node::Script(script) => script.span,
            Node::Statement(statement) => statement.span(),
            Node::Block(block) => block.span,
            Node::Expression(expression) => expression.span,
            Node::Type(typ) => typ.span,
            Node::TypeParameter(param) => param.span,
            Node::Parameter(param) => param.span,
            Node::VariableDeclarator(declarator) => declarator.span,
            Node::ClassMember(member) => match member {
                ClassMember::Property(p) => p.span,
                ClassMember::Method(m) => m.span,
                ClassMember::Constructor(c) => c.span,
            },
            Node::TypeMember(member) => match member {
                ObjectTypeMember::Property(p) => p.span,
                ObjectTypeMember::Method(m) => m.span,
                ObjectTypeMember::Call(c) => c.span,
                ObjectTypeMember::Index(i) => i.span,
            },
            Node::ObjectProperty(property) => match property {
                ObjectProperty::Property { span, .. }
                | ObjectProperty::Method { span, .. }
                | ObjectProperty::Spread { span, .. } => *span,
                ObjectProperty::Shorthand(ident) => ident.span,
            },
            Node::Argument(argument) => argument.span,
            Node::Identifier(ident) => ident.span,
        }
    }

    /// The expression, when this node is a call expression
    pub fn as_call(&self) -> Option<&'a Expression> {
        match self {
            Node::Expression(expression) if matches!(expression.kind, ExpressionKind::Call(_)) => {
                Some(expression)
            }
            _ => None,
        }
    }

    /// Invoke `f` on every direct child, in source order
    pub fn for_each_child(&self, f: &mut dyn FnMut(Node<'a>)) {
        match *self {
            Node::Script(script) => {
                for statement in &script.statements {
                    f(Node::Statement(statement));
                }
            }
            Node::Statement(statement) => statement_children(statement, f),
            Node::Block(block) => {
                for statement in &block.statements {
                    f(Node::Statement(statement));
                }
            }
            Node::Expression(expression) => expression_children(expression, f),
            Node::Type(typ) => type_children(typ, f),
            Node::TypeParameter(param) => {
                f(Node::Identifier(&param.name));
                if let Some(constraint) = &param.constraint {
                    f(Node::Type(constraint));
                }
                if let Some(default) = &param.default {
                    f(Node::Type(default));
                }
            }
            Node::Parameter(param) => {
                f(Node::Identifier(&param.name));
                if let Some(annotation) = &param.type_annotation {
                    f(Node::Type(annotation));
                }
                if let Some(default) = &param.default {
                    f(Node::Expression(default));
                }
            }
            Node::VariableDeclarator(declarator) => {
                f(Node::Identifier(&declarator.name));
                if let Some(annotation) = &declarator.type_annotation {
                    f(Node::Type(annotation));
                }
                if let Some(initializer) = &declarator.initializer {
                    f(Node::Expression(initializer));
                }
            }
            Node::ClassMember(member) => match member {
                ClassMember::Property(property) => {
                    f(Node::Identifier(&property.name));
                    if let Some(annotation) = &property.type_annotation {
                        f(Node::Type(annotation));
                    }
                    if let Some(initializer) = &property.initializer {
                        f(Node::Expression(initializer));
                    }
                }
                ClassMember::Method(method) => {
                    f(Node::Identifier(&method.name));
                    signature_children(
                        method.type_parameters.as_deref(),
                        &method.parameters,
                        method.return_type.as_ref(),
                        f,
                    );
                    if let Some(body) = &method.body {
                        f(Node::Block(body));
                    }
                }
                ClassMember::Constructor(constructor) => {
                    for param in &constructor.parameters {
                        f(Node::Parameter(param));
                    }
                    if let Some(body) = &constructor.body {
                        f(Node::Block(body));
                    }
                }
            },
            Node::TypeMember(member) => match member {
                ObjectTypeMember::Property(property) => {
                    f(Node::Identifier(&property.name));
                    if let Some(annotation) = &property.type_annotation {
                        f(Node::Type(annotation));
                    }
                }
                ObjectTypeMember::Method(method) => {
                    f(Node::Identifier(&method.name));
                    signature_children(
                        method.type_parameters.as_deref(),
                        &method.parameters,
                        method.return_type.as_ref(),
                        f,
                    );
                }
                ObjectTypeMember::Call(call) => signature_children(
                    call.type_parameters.as_deref(),
                    &call.parameters,
                    call.return_type.as_ref(),
                    f,
                ),
                ObjectTypeMember::Index(index) => {
                    f(Node::Identifier(&index.key_name));
                    f(Node::Type(&index.key_type));
                    f(Node::Type(&index.value_type));
                }
            },
            Node::ObjectProperty(property) => match property {
                ObjectProperty::Property { key, value, .. } => {
                    f(Node::Identifier(key));
                    f(Node::Expression(value));
                }
                ObjectProperty::Shorthand(ident) => f(Node::Identifier(ident)),
                ObjectProperty::Method { key, function, .. } => {
                    f(Node::Identifier(key));
                    function_children(function, f);
                }
                ObjectProperty::Spread { value, .. } => f(Node::Expression(value)),
            },
            Node::Argument(argument) => f(Node::Expression(&argument.value)),
            Node::Identifier(_) => {}
        }
    }
}

fn signature_children<'a>(
    type_parameters: Option<&'a [TypeParameter]>,
    parameters: &'a [Parameter],
    return_type: Option<&'a Type>,
    f: &mut dyn FnMut(Node<'a>),
) {
    for param in type_parameters.unwrap_or_default() {
        f(Node::TypeParameter(param));
    }
    for param in parameters {
        f(Node::Parameter(param));
    }
    if let Some(return_type) = return_type {
        f(Node::Type(return_type));
    }
}

fn function_children<'a>(function: &'a FunctionExpression, f: &mut dyn FnMut(Node<'a>)) {
    if let Some(name) = &function.name {
        f(Node::Identifier(name));
    }
    signature_children(
        function.type_parameters.as_deref(),
        &function.parameters,
        function.return_type.as_ref(),
        f,
    );
    f(Node::Block(&function.body));
}

fn statement_children<'a>(statement: &'a Statement, f: &mut dyn FnMut(Node<'a>)) {
    match statement {
        Statement::Variable(declaration) => {
            for declarator in &declaration.declarators {
                f(Node::VariableDeclarator(declarator));
            }
        }
        Statement::Function(function) => {
            f(Node::Identifier(&function.name));
            signature_children(
                function.type_parameters.as_deref(),
                &function.parameters,
                function.return_type.as_ref(),
                f,
            );
            if let Some(body) = &function.body {
                f(Node::Block(body));
            }
        }
        Statement::Class(class) => {
            f(Node::Identifier(&class.name));
            for param in class.type_parameters.as_deref().unwrap_or_default() {
                f(Node::TypeParameter(param));
            }
            if let Some(extends) = &class.extends {
                f(Node::Type(extends));
            }
            for implemented in &class.implements {
                f(Node::Type(implemented));
            }
            for member in &class.members {
                f(Node::ClassMember(member));
            }
        }
        Statement::Interface(interface) => {
            f(Node::Identifier(&interface.name));
            for param in interface.type_parameters.as_deref().unwrap_or_default() {
                f(Node::TypeParameter(param));
            }
            for extended in &interface.extends {
                f(Node::Type(extended));
            }
            for member in &interface.members {
                f(Node::TypeMember(member));
            }
        }
        Statement::TypeAlias(alias) => {
            f(Node::Identifier(&alias.name));
            for param in alias.type_parameters.as_deref().unwrap_or_default() {
                f(Node::TypeParameter(param));
            }
            f(Node::Type(&alias.type_annotation));
        }
        Statement::Import(import) => {
            if let Some(default) = &import.default {
                f(Node::Identifier(default));
            }
            if let Some(namespace) = &import.namespace {
                f(Node::Identifier(namespace));
            }
            for specifier in &import.specifiers {
                f(Node::Identifier(&specifier.imported));
                if specifier.local.span != specifier.imported.span {
                    f(Node::Identifier(&specifier.local));
                }
            }
        }
        Statement::Export(inner) => f(Node::Statement(inner)),
        Statement::ExportNamed(export) => {
            for specifier in &export.specifiers {
                f(Node::Identifier(&specifier.local));
                if specifier.exported.span != specifier.local.span {
                    f(Node::Identifier(&specifier.exported));
                }
            }
        }
        Statement::ExportDefault(expression)
        | Statement::Throw(expression)
        | Statement::Expression(expression) => f(Node::Expression(expression)),
        Statement::If(statement) => {
            f(Node::Expression(&statement.condition));
            f(Node::Statement(&statement.then_branch));
            if let Some(else_branch) = &statement.else_branch {
                f(Node::Statement(else_branch));
            }
        }
        Statement::While(statement) => {
            f(Node::Expression(&statement.condition));
            f(Node::Statement(&statement.body));
        }
        Statement::ForOf(statement) => {
            f(Node::Identifier(&statement.binding));
            f(Node::Expression(&statement.iterable));
            f(Node::Statement(&statement.body));
        }
        Statement::Return(statement) => {
            if let Some(value) = &statement.value {
                f(Node::Expression(value));
            }
        }
        Statement::Block(block) => {
            for statement in &block.statements {
                f(Node::Statement(statement));
            }
        }
        Statement::Break(_) | Statement::Continue(_) | Statement::Empty(_) => {}
    }
}

fn expression_children<'a>(expression: &'a Expression, f: &mut dyn FnMut(Node<'a>)) {
    match &expression.kind {
        ExpressionKind::Identifier(_)
        | ExpressionKind::Literal(_)
        | ExpressionKind::Template(_)
        | ExpressionKind::This => {}
        ExpressionKind::Array(elements) => {
            for element in elements {
                match element {
                    ArrayElement::Expression(value) | ArrayElement::Spread(value) => {
                        f(Node::Expression(value))
                    }
                }
            }
        }
        ExpressionKind::Object(properties) => {
            for property in properties {
                f(Node::ObjectProperty(property));
            }
        }
        ExpressionKind::Function(function) => function_children(function, f),
        ExpressionKind::Arrow(arrow) => {
            signature_children(
                arrow.type_parameters.as_deref(),
                &arrow.parameters,
                arrow.return_type.as_ref(),
                f,
            );
            match &arrow.body {
                ArrowBody::Expression(body) => f(Node::Expression(body)),
                ArrowBody::Block(body) => f(Node::Block(body)),
            }
        }
        ExpressionKind::Call(call) => {
            f(Node::Expression(&call.callee));
            for typ in call.type_arguments.as_deref().unwrap_or_default() {
                f(Node::Type(typ));
            }
            for argument in &call.arguments {
                f(Node::Argument(argument));
            }
        }
        ExpressionKind::New(new) => {
            f(Node::Expression(&new.callee));
            for typ in new.type_arguments.as_deref().unwrap_or_default() {
                f(Node::Type(typ));
            }
            for argument in &new.arguments {
                f(Node::Argument(argument));
            }
        }
        ExpressionKind::Member(member) => {
            f(Node::Expression(&member.object));
            f(Node::Identifier(&member.property));
        }
        ExpressionKind::Index(index) => {
            f(Node::Expression(&index.object));
            f(Node::Expression(&index.index));
        }
        ExpressionKind::Unary(_, operand)
        | ExpressionKind::Postfix(_, operand)
        | ExpressionKind::ConstAssertion(operand)
        | ExpressionKind::NonNull(operand)
        | ExpressionKind::Parenthesized(operand) => f(Node::Expression(operand)),
        ExpressionKind::Binary(_, left, right) | ExpressionKind::Assignment(left, _, right) => {
            f(Node::Expression(left));
            f(Node::Expression(right));
        }
        ExpressionKind::Conditional(condition, then_value, else_value) => {
            f(Node::Expression(condition));
            f(Node::Expression(then_value));
            f(Node::Expression(else_value));
        }
        ExpressionKind::TypeAssertion(value, typ) => {
            f(Node::Expression(value));
            f(Node::Type(typ));
        }
    }
}

fn type_children<'a>(typ: &'a Type, f: &mut dyn FnMut(Node<'a>)) {
    match &typ.kind {
        TypeKind::Primitive(_) | TypeKind::Literal(_) => {}
        TypeKind::Reference(reference) => {
            f(Node::Identifier(&reference.name));
            for argument in reference.type_arguments.as_deref().unwrap_or_default() {
                f(Node::Type(argument));
            }
        }
        TypeKind::Union(members) | TypeKind::Intersection(members) | TypeKind::Tuple(members) => {
            for member in members {
                f(Node::Type(member));
            }
        }
        TypeKind::Array(element)
        | TypeKind::KeyOf(element)
        | TypeKind::Readonly(element)
        | TypeKind::Parenthesized(element) => {
            f(Node::Type(element))
        }
        TypeKind::Object(object) => {
            for member in &object.members {
                f(Node::TypeMember(member));
            }
        }
        TypeKind::Function(function) => signature_children(
            function.type_parameters.as_deref(),
            &function.parameters,
            Some(&function.return_type),
            f,
        ),
        TypeKind::TypeQuery(path) => {
            for ident in path {
                f(Node::Identifier(ident));
            }
        }
        TypeKind::IndexAccess(object, index) => {
            f(Node::Type(object));
            f(Node::Type(index));
        }
    }
}
