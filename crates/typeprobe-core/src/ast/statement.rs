use super::expression::Expression;
use super::types::{ObjectTypeMember, Type};
use super::{Ident, Spanned};
use crate::span::Span;

#[derive(Debug, Clone)]
pub enum Statement {
    Variable(VariableDeclaration),
    Function(FunctionDeclaration),
    Class(ClassDeclaration),
    Interface(InterfaceDeclaration),
    TypeAlias(TypeAliasDeclaration),
    Import(ImportDeclaration),
    /// `export <declaration>`
    Export(Box<Statement>),
    /// `export { a, b as c }`
    ExportNamed(ExportNamedDeclaration),
    ExportDefault(Expression),
    If(IfStatement),
    While(WhileStatement),
    ForOf(ForOfStatement),
    Return(ReturnStatement),
    Throw(Expression),
    Break(Span),
    Continue(Span),
    Expression(Expression),
    Block(Block),
    Empty(Span),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Variable(v) => v.span,
            Statement::Function(f) => f.span,
            Statement::Class(c) => c.span,
            Statement::Interface(i) => i.span,
            Statement::TypeAlias(t) => t.span,
            Statement::Import(i) => i.span,
            Statement::Export(inner) => inner.span(),
            Statement::ExportNamed(e) => e.span,
            Statement::ExportDefault(e) => e.span,
            Statement::If(i) => i.span,
            Statement::While(w) => w.span,
            Statement::ForOf(f) => f.span,
            Statement::Return(r) => r.span,
            Statement::Throw(e) => e.span,
            Statement::Break(s) | Statement::Continue(s) | Statement::Empty(s) => *s,
            Statement::Expression(e) => e.span,
            Statement::Block(b) => b.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Const,
    Let,
    Var,
}

#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    pub kind: VariableKind,
    pub is_declare: bool,
    pub declarators: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VariableDeclarator {
    pub name: Ident,
    pub type_annotation: Option<Type>,
    pub initializer: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeParameter {
    pub name: Ident,
    pub constraint: Option<Box<Type>>,
    pub default: Option<Box<Type>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: Ident,
    pub type_annotation: Option<Type>,
    pub default: Option<Expression>,
    pub is_optional: bool,
    pub is_rest: bool,
    /// Constructor parameter with an accessibility or `readonly` modifier
    pub is_property: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDeclaration {
    pub name: Ident,
    pub is_declare: bool,
    pub type_parameters: Option<Vec<TypeParameter>>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<Type>,
    /// `None` for overload signatures and ambient declarations
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ClassDeclaration {
    pub name: Ident,
    pub is_declare: bool,
    pub is_abstract: bool,
    pub type_parameters: Option<Vec<TypeParameter>>,
    pub extends: Option<Type>,
    pub implements: Vec<Type>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ClassMember {
    Property(PropertyDeclaration),
    Method(MethodDeclaration),
    Constructor(ConstructorDeclaration),
}

#[derive(Debug, Clone)]
pub struct PropertyDeclaration {
    pub is_static: bool,
    pub is_readonly: bool,
    pub is_optional: bool,
    pub name: Ident,
    pub type_annotation: Option<Type>,
    pub initializer: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MethodDeclaration {
    pub is_static: bool,
    pub is_optional: bool,
    pub name: Ident,
    pub type_parameters: Option<Vec<TypeParameter>>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<Type>,
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ConstructorDeclaration {
    pub parameters: Vec<Parameter>,
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InterfaceDeclaration {
    pub name: Ident,
    pub type_parameters: Option<Vec<TypeParameter>>,
    pub extends: Vec<Type>,
    pub members: Vec<ObjectTypeMember>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeAliasDeclaration {
    pub name: Ident,
    pub type_parameters: Option<Vec<TypeParameter>>,
    pub type_annotation: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ImportDeclaration {
    pub is_type_only: bool,
    pub default: Option<Ident>,
    pub namespace: Option<Ident>,
    pub specifiers: Vec<ImportSpecifier>,
    pub source: Spanned<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ImportSpecifier {
    pub imported: Ident,
    pub local: Ident,
    pub is_type_only: bool,
}

#[derive(Debug, Clone)]
pub struct ExportNamedDeclaration {
    pub specifiers: Vec<ExportSpecifier>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ExportSpecifier {
    pub local: Ident,
    pub exported: Ident,
}

#[derive(Debug, Clone)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_branch: Box<Statement>,
    pub else_branch: Option<Box<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForOfStatement {
    pub kind: VariableKind,
    pub binding: Ident,
    pub iterable: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub span: Span,
}
