use super::{ExpressionParser, Parser, ParserError};
use crate::ast::statement::{Parameter, TypeParameter};
use crate::ast::types::*;
use crate::ast::Spanned;
use crate::lexer::TokenKind;

pub trait TypeParser {
    fn parse_type(&mut self) -> Result<Type, ParserError>;
    fn parse_type_arguments(&mut self) -> Result<Vec<Type>, ParserError>;
    fn parse_type_parameters(&mut self) -> Result<Vec<TypeParameter>, ParserError>;
    fn parse_parameter_list(&mut self) -> Result<Vec<Parameter>, ParserError>;
    fn parse_object_type_member(&mut self) -> Result<ObjectTypeMember, ParserError>;
}

impl TypeParser for Parser {
    fn parse_type(&mut self) -> Result<Type, ParserError> {
        self.nested(|parser| {
            if parser.starts_function_type() {
                return parser.parse_function_type();
            }
            parser.parse_union_type()
        })
    }

    /// `<A, B>`; the opening `<` is the current token
    fn parse_type_arguments(&mut self) -> Result<Vec<Type>, ParserError> {
        self.consume(TokenKind::Less, "'<' expected.")?;
        let mut arguments = vec![self.parse_type()?];
        while self.match_token(&[TokenKind::Comma]) {
            arguments.push(self.parse_type()?);
        }
        self.consume(TokenKind::Greater, "'>' expected.")?;
        Ok(arguments)
    }

    /// `<T extends C = D>`; the opening `<` is the current token
    fn parse_type_parameters(&mut self) -> Result<Vec<TypeParameter>, ParserError> {
        self.consume(TokenKind::Less, "'<' expected.")?;
        let mut params = Vec::new();

        loop {
            let start = self.current_span();
            let name = self.parse_identifier()?;

            let constraint = if self.match_token(&[TokenKind::Extends]) {
                Some(Box::new(self.parse_type()?))
            } else {
                None
            };

            let default = if self.match_token(&[TokenKind::Equal]) {
                Some(Box::new(self.parse_type()?))
            } else {
                None
            };

            params.push(TypeParameter {
                name,
                constraint,
                default,
                span: self.span_from(start),
            });

            if !self.match_token(&[TokenKind::Comma]) || self.check(&TokenKind::Greater) {
                break;
            }
        }

        self.consume(TokenKind::Greater, "'>' expected.")?;
        Ok(params)
    }

    /// Parameters between parentheses; the opening `(` is the current token
    fn parse_parameter_list(&mut self) -> Result<Vec<Parameter>, ParserError> {
        self.consume(TokenKind::LeftParen, "'(' expected.")?;
        let mut params = Vec::new();

        while !self.check(&TokenKind::RightParen) {
            let start = self.current_span();

            let mut is_property = false;
            while ["public", "private", "protected", "readonly", "override"]
                .iter()
                .any(|modifier| self.is_contextual(modifier))
                && matches!(self.peek(1).kind, TokenKind::Identifier(_))
            {
                self.advance();
                is_property = true;
            }

            let is_rest = self.match_token(&[TokenKind::DotDotDot]);
            let name = if self.check(&TokenKind::This) {
                let span = self.current_span();
                self.advance();
                Spanned::new("this".to_string(), span)
            } else {
                self.parse_identifier()?
            };
            let is_optional = self.match_token(&[TokenKind::Question]);

            let type_annotation = if self.match_token(&[TokenKind::Colon]) {
                Some(self.parse_type()?)
            } else {
                None
            };

            let default = if self.match_token(&[TokenKind::Equal]) {
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };

            params.push(Parameter {
                name,
                type_annotation,
                default,
                is_optional,
                is_rest,
                is_property,
                span: self.span_from(start),
            });

            if !self.match_token(&[TokenKind::Comma]) {
                break;
            }
        }

        self.consume(TokenKind::RightParen, "')' expected.")?;
        Ok(params)
    }

    fn parse_object_type_member(&mut self) -> Result<ObjectTypeMember, ParserError> {
        let start = self.current_span();

        // Call signature
        if self.check(&TokenKind::LeftParen) || self.check(&TokenKind::Less) {
            let type_parameters = if self.check(&TokenKind::Less) {
                Some(self.parse_type_parameters()?)
            } else {
                None
            };
            let parameters = self.parse_parameter_list()?;
            let return_type = self.parse_return_annotation()?;
            return Ok(ObjectTypeMember::Call(CallSignature {
                type_parameters,
                parameters,
                return_type,
                span: self.span_from(start),
            }));
        }

        // Index signature
        if self.check(&TokenKind::LeftBracket)
            && matches!(self.peek(1).kind, TokenKind::Identifier(_))
            && self.peek(2).kind == TokenKind::Colon
        {
            self.advance();
            let key_name = self.parse_identifier()?;
            self.consume(TokenKind::Colon, "':' expected.")?;
            let key_type = self.parse_type()?;
            self.consume(TokenKind::RightBracket, "']' expected.")?;
            self.consume(TokenKind::Colon, "':' expected.")?;
            let value_type = self.parse_type()?;
            return Ok(ObjectTypeMember::Index(IndexSignature {
                key_name,
                key_type,
                value_type,
                span: self.span_from(start),
            }));
        }

        let is_readonly = if self.is_contextual("readonly")
            && !matches!(
                self.peek(1).kind,
                TokenKind::Colon | TokenKind::Question | TokenKind::LeftParen | TokenKind::Less
            ) {
            self.advance();
            true
        } else {
            false
        };

        let name = self.parse_property_name()?;
        let is_optional = self.match_token(&[TokenKind::Question]);

        if self.check(&TokenKind::LeftParen) || self.check(&TokenKind::Less) {
            let type_parameters = if self.check(&TokenKind::Less) {
                Some(self.parse_type_parameters()?)
            } else {
                None
            };
            let parameters = self.parse_parameter_list()?;
            let return_type = self.parse_return_annotation()?;
            return Ok(ObjectTypeMember::Method(MethodSignature {
                name,
                is_optional,
                type_parameters,
                parameters,
                return_type,
                span: self.span_from(start),
            }));
        }

        let type_annotation = if self.match_token(&[TokenKind::Colon]) {
            Some(self.parse_type()?)
        } else {
            None
        };

        Ok(ObjectTypeMember::Property(PropertySignature {
            is_readonly,
            name,
            is_optional,
            type_annotation,
            span: self.span_from(start),
        }))
    }
}

impl Parser {
    pub(super) fn parse_return_annotation(&mut self) -> Result<Option<Type>, ParserError> {
        if self.match_token(&[TokenKind::Colon]) {
            Ok(Some(self.parse_type()?))
        } else {
            Ok(None)
        }
    }

    fn starts_function_type(&mut self) -> bool {
        if self.check(&TokenKind::Less) || self.check(&TokenKind::New) {
            return true;
        }
        if !self.check(&TokenKind::LeftParen) {
            return false;
        }
        // `(` starts a function type only when a parameter list followed by `=>` parses
        let checkpoint = self.checkpoint();
        let is_function = self.parse_parameter_list().is_ok() && self.check(&TokenKind::Arrow);
        self.restore(checkpoint);
        is_function
    }

    fn parse_function_type(&mut self) -> Result<Type, ParserError> {
        let start = self.current_span();
        let is_constructor = self.match_token(&[TokenKind::New]);
        let type_parameters = if self.check(&TokenKind::Less) {
            Some(self.parse_type_parameters()?)
        } else {
            None
        };
        let parameters = self.parse_parameter_list()?;
        self.consume(TokenKind::Arrow, "'=>' expected.")?;
        let return_type = self.parse_type()?;
        let span = self.span_from(start);
        Ok(Type::new(
            TypeKind::Function(FunctionType {
                type_parameters,
                parameters,
                return_type: Box::new(return_type),
                is_constructor,
                span,
            }),
            span,
        ))
    }

    fn parse_union_type(&mut self) -> Result<Type, ParserError> {
        let start = self.current_span();
        self.match_token(&[TokenKind::Pipe]);
        let mut members = vec![self.parse_intersection_type()?];
        while self.match_token(&[TokenKind::Pipe]) {
            members.push(self.parse_intersection_type()?);
        }
        if members.len() == 1 {
            return Ok(members.remove(0));
        }
        let span = self.span_from(start);
        Ok(Type::new(TypeKind::Union(members), span))
    }

    fn parse_intersection_type(&mut self) -> Result<Type, ParserError> {
        let start = self.current_span();
        self.match_token(&[TokenKind::Amp]);
        let mut members = vec![self.parse_type_operator()?];
        while self.match_token(&[TokenKind::Amp]) {
            members.push(self.parse_type_operator()?);
        }
        if members.len() == 1 {
            return Ok(members.remove(0));
        }
        let span = self.span_from(start);
        Ok(Type::new(TypeKind::Intersection(members), span))
    }

    fn parse_type_operator(&mut self) -> Result<Type, ParserError> {
        let start = self.current_span();
        if self.match_token(&[TokenKind::Keyof]) {
            let operand = self.nested(|parser| parser.parse_type_operator())?;
            let span = self.span_from(start);
            return Ok(Type::new(TypeKind::KeyOf(Box::new(operand)), span));
        }
        if self.is_contextual("readonly") {
            self.advance();
            let operand = self.nested(|parser| parser.parse_type_operator())?;
            let span = self.span_from(start);
            return Ok(Type::new(TypeKind::Readonly(Box::new(operand)), span));
        }
        self.parse_postfix_type()
    }

    fn parse_postfix_type(&mut self) -> Result<Type, ParserError> {
        let start = self.current_span();
        let mut typ = self.parse_primary_type()?;

        while self.check(&TokenKind::LeftBracket) && !self.has_preceding_line_break() {
            self.descend()?;
            self.advance();
            if self.match_token(&[TokenKind::RightBracket]) {
                let span = self.span_from(start);
                typ = Type::new(TypeKind::Array(Box::new(typ)), span);
            } else {
                let index = self.parse_type()?;
                self.consume(TokenKind::RightBracket, "']' expected.")?;
                let span = self.span_from(start);
                typ = Type::new(TypeKind::IndexAccess(Box::new(typ), Box::new(index)), span);
            }
        }

        Ok(typ)
    }

    fn parse_primary_type(&mut self) -> Result<Type, ParserError> {
        let start = self.current_span();
        let kind = match self.current().kind.clone() {
            TokenKind::Identifier(name) => {
                if let Some(primitive) = PrimitiveType::from_keyword(&name) {
                    self.advance();
                    TypeKind::Primitive(primitive)
                } else {
                    let name = self.parse_identifier()?;
                    let type_arguments = if self.check(&TokenKind::Less) {
                        Some(self.parse_type_arguments()?)
                    } else {
                        None
                    };
                    TypeKind::Reference(TypeReference {
                        name,
                        type_arguments,
                        span: self.span_from(start),
                    })
                }
            }
            TokenKind::Null => {
                self.advance();
                TypeKind::Primitive(PrimitiveType::Null)
            }
            TokenKind::Void => {
                self.advance();
                TypeKind::Primitive(PrimitiveType::Void)
            }
            TokenKind::True | TokenKind::False => {
                let value = self.check(&TokenKind::True);
                self.advance();
                TypeKind::Literal(LiteralType::Boolean(value))
            }
            TokenKind::String(value) => {
                self.advance();
                TypeKind::Literal(LiteralType::String(value))
            }
            TokenKind::Template {
                value,
                has_substitutions: false,
            } => {
                self.advance();
                TypeKind::Literal(LiteralType::String(value))
            }
            TokenKind::Number(value) => {
                self.advance();
                TypeKind::Literal(LiteralType::Number(value))
            }
            TokenKind::Minus => {
                self.advance();
                match self.current().kind {
                    TokenKind::Number(value) => {
                        self.advance();
                        TypeKind::Literal(LiteralType::Number(-value))
                    }
                    _ => return Err(self.error_here("Type expected.")),
                }
            }
            TokenKind::Typeof => {
                self.advance();
                let mut path = vec![self.parse_identifier()?];
                while self.match_token(&[TokenKind::Dot]) {
                    path.push(self.parse_property_name()?);
                }
                TypeKind::TypeQuery(path)
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.consume(TokenKind::RightParen, "')' expected.")?;
                TypeKind::Parenthesized(Box::new(inner))
            }
            TokenKind::LeftBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !self.check(&TokenKind::RightBracket) {
                    elements.push(self.parse_type()?);
                    if !self.match_token(&[TokenKind::Comma]) {
                        break;
                    }
                }
                self.consume(TokenKind::RightBracket, "']' expected.")?;
                TypeKind::Tuple(elements)
            }
            TokenKind::LeftBrace => {
                self.advance();
                let mut members = Vec::new();
                while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
                    members.push(self.parse_object_type_member()?);
                    if !self.match_token(&[TokenKind::Semicolon, TokenKind::Comma])
                        && !self.check(&TokenKind::RightBrace)
                        && !self.has_preceding_line_break()
                    {
                        return Err(self.error_here("';' expected."));
                    }
                }
                self.consume(TokenKind::RightBrace, "'}' expected.")?;
                TypeKind::Object(ObjectType {
                    members,
                    span: self.span_from(start),
                })
            }
            _ => return Err(self.error_here("Type expected.")),
        };

        Ok(Type::new(kind, self.span_from(start)))
    }
}
