use super::statement::{Block, Parameter, TypeParameter};
use super::types::Type;
use super::{Ident, NodeId};
use crate::span::Span;

#[derive(Debug, Clone)]
pub struct Expression {
    pub id: NodeId,
    pub kind: ExpressionKind,
    pub span: Span,
}

impl Expression {
    pub fn new(id: NodeId, kind: ExpressionKind, span: Span) -> Self {
        Expression { id, kind, span }
    }
}

#[derive(Debug, Clone)]
pub enum ExpressionKind {
    Identifier(String),
    Literal(Literal),
    Template(TemplateLiteral),
    Array(Vec<ArrayElement>),
    Object(Vec<ObjectProperty>),
    Function(FunctionExpression),
    Arrow(ArrowFunction),
    Call(CallExpression),
    New(NewExpression),
    Member(MemberExpression),
    Index(IndexExpression),
    Unary(UnaryOp, Box<Expression>),
    Postfix(PostfixOp, Box<Expression>),
    Binary(BinaryOp, Box<Expression>, Box<Expression>),
    Assignment(Box<Expression>, AssignmentOp, Box<Expression>),
    Conditional(Box<Expression>, Box<Expression>, Box<Expression>),
    /// `expr as T`
    TypeAssertion(Box<Expression>, Type),
    /// `expr as const`
    ConstAssertion(Box<Expression>),
    /// `expr!`
    NonNull(Box<Expression>),
    Parenthesized(Box<Expression>),
    This,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone)]
pub struct TemplateLiteral {
    pub value: String,
    /// A template with `${...}` parts is typed as plain `string`
    pub has_substitutions: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    And,
    Or,
    NullishCoalescing,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    Plus,
    BitwiseNot,
    Typeof,
    Void,
    PreIncrement,
    PreDecrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOp {
    Assign,
    AddAssign,
    SubtractAssign,
}

#[derive(Debug, Clone)]
pub struct Argument {
    pub value: Expression,
    pub is_spread: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub type_arguments: Option<Vec<Type>>,
    pub arguments: Vec<Argument>,
    /// `f?.()`
    pub optional: bool,
}

#[derive(Debug, Clone)]
pub struct NewExpression {
    pub callee: Box<Expression>,
    pub type_arguments: Option<Vec<Type>>,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: Ident,
    /// `a?.b`
    pub optional: bool,
}

#[derive(Debug, Clone)]
pub struct IndexExpression {
    pub object: Box<Expression>,
    pub index: Box<Expression>,
    pub optional: bool,
}

#[derive(Debug, Clone)]
pub enum ArrayElement {
    Expression(Expression),
    Spread(Expression),
}

#[derive(Debug, Clone)]
pub enum ObjectProperty {
    Property {
        key: Ident,
        value: Expression,
        span: Span,
    },
    /// `{ a }`
    Shorthand(Ident),
    Method {
        key: Ident,
        function: FunctionExpression,
        span: Span,
    },
    Spread {
        value: Expression,
        span: Span,
    },
}

#[derive(Debug, Clone)]
pub struct FunctionExpression {
    pub name: Option<Ident>,
    pub type_parameters: Option<Vec<TypeParameter>>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<Type>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ArrowFunction {
    pub type_parameters: Option<Vec<TypeParameter>>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<Type>,
    pub body: ArrowBody,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ArrowBody {
    Expression(Box<Expression>),
    Block(Block),
}
