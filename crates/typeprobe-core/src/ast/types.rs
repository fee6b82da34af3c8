use super::statement::{Parameter, TypeParameter};
use super::Ident;
use crate::span::Span;

#[derive(Debug, Clone)]
pub struct Type {
    pub kind: TypeKind,
    pub span: Span,
}

impl Type {
    pub fn new(kind: TypeKind, span: Span) -> Self {
        Type { kind, span }
    }
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    Primitive(PrimitiveType),
    Literal(LiteralType),
    Reference(TypeReference),
    Union(Vec<Type>),
    Intersection(Vec<Type>),
    Array(Box<Type>),
    Tuple(Vec<Type>),
    Object(ObjectType),
    Function(FunctionType),
    /// `typeof a.b`
    TypeQuery(Vec<Ident>),
    KeyOf(Box<Type>),
    /// `readonly T[]` and `readonly [A, B]`
    Readonly(Box<Type>),
    /// `T["key"]`
    IndexAccess(Box<Type>, Box<Type>),
    Parenthesized(Box<Type>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Any,
    Unknown,
    Never,
    Void,
    Undefined,
    Null,
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Object,
}

impl PrimitiveType {
    pub fn from_keyword(text: &str) -> Option<PrimitiveType> {
        Some(match text {
            "any" => PrimitiveType::Any,
            "unknown" => PrimitiveType::Unknown,
            "never" => PrimitiveType::Never,
            "void" => PrimitiveType::Void,
            "undefined" => PrimitiveType::Undefined,
            "null" => PrimitiveType::Null,
            "string" => PrimitiveType::String,
            "number" => PrimitiveType::Number,
            "boolean" => PrimitiveType::Boolean,
            "bigint" => PrimitiveType::BigInt,
            "symbol" => PrimitiveType::Symbol,
            "object" => PrimitiveType::Object,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    String(String),
    Number(f64),
    Boolean(bool),
}

#[derive(Debug, Clone)]
pub struct TypeReference {
    pub name: Ident,
    pub type_arguments: Option<Vec<Type>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ObjectType {
    pub members: Vec<ObjectTypeMember>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ObjectTypeMember {
    Property(PropertySignature),
    Method(MethodSignature),
    Call(CallSignature),
    Index(IndexSignature),
}

#[derive(Debug, Clone)]
pub struct PropertySignature {
    pub is_readonly: bool,
    pub name: Ident,
    pub is_optional: bool,
    pub type_annotation: Option<Type>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MethodSignature {
    pub name: Ident,
    pub is_optional: bool,
    pub type_parameters: Option<Vec<TypeParameter>>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<Type>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CallSignature {
    pub type_parameters: Option<Vec<TypeParameter>>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<Type>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IndexSignature {
    pub key_name: Ident,
    pub key_type: Type,
    pub value_type: Type,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionType {
    pub type_parameters: Option<Vec<TypeParameter>>,
    pub parameters: Vec<Parameter>,
    pub return_type: Box<Type>,
    /// `new (...) => T`
    pub is_constructor: bool,
    pub span: Span,
}
