use super::{Parser, ParserError, StatementParser, TypeParser};
use crate::ast::expression::*;
use crate::ast::statement::Parameter;
use crate::ast::Spanned;
use crate::lexer::TokenKind;
use crate::span::Span;

pub trait ExpressionParser {
    fn parse_expression(&mut self) -> Result<Expression, ParserError>;
    fn parse_assignment_expression(&mut self) -> Result<Expression, ParserError>;
}

impl ExpressionParser for Parser {
    fn parse_expression(&mut self) -> Result<Expression, ParserError> {
        self.parse_assignment_expression()
    }

    fn parse_assignment_expression(&mut self) -> Result<Expression, ParserError> {
        self.nested(|parser| parser.parse_assignment())
    }
}

impl Parser {
    fn parse_assignment(&mut self) -> Result<Expression, ParserError> {
        if let Some(arrow) = self.try_parse_arrow_function()? {
            return Ok(arrow);
        }

        let start = self.current_span();
        let left = self.parse_conditional()?;

        let op = match self.current().kind {
            TokenKind::Equal => AssignmentOp::Assign,
            TokenKind::PlusEqual => AssignmentOp::AddAssign,
            TokenKind::MinusEqual => AssignmentOp::SubtractAssign,
            _ => return Ok(left),
        };
        self.advance();

        let right = self.parse_assignment_expression()?;
        Ok(self.make(
            ExpressionKind::Assignment(Box::new(left), op, Box::new(right)),
            start,
        ))
    }
}

fn binary_operator(kind: &TokenKind) -> Option<(u8, BinaryOp)> {
    Some(match kind {
        TokenKind::QuestionQuestion => (1, BinaryOp::NullishCoalescing),
        TokenKind::PipePipe => (2, BinaryOp::Or),
        TokenKind::AmpAmp => (3, BinaryOp::And),
        TokenKind::Pipe => (4, BinaryOp::BitwiseOr),
        TokenKind::Caret => (5, BinaryOp::BitwiseXor),
        TokenKind::Amp => (6, BinaryOp::BitwiseAnd),
        TokenKind::EqualEqual => (7, BinaryOp::Equal),
        TokenKind::BangEqual => (7, BinaryOp::NotEqual),
        TokenKind::EqualEqualEqual => (7, BinaryOp::StrictEqual),
        TokenKind::BangEqualEqual => (7, BinaryOp::StrictNotEqual),
        TokenKind::Less => (8, BinaryOp::LessThan),
        TokenKind::Greater => (8, BinaryOp::GreaterThan),
        TokenKind::LessEqual => (8, BinaryOp::LessThanOrEqual),
        TokenKind::GreaterEqual => (8, BinaryOp::GreaterThanOrEqual),
        TokenKind::In => (8, BinaryOp::In),
        TokenKind::Plus => (10, BinaryOp::Add),
        TokenKind::Minus => (10, BinaryOp::Subtract),
        TokenKind::Star => (11, BinaryOp::Multiply),
        TokenKind::Slash => (11, BinaryOp::Divide),
        TokenKind::Percent => (11, BinaryOp::Modulo),
        TokenKind::StarStar => (12, BinaryOp::Power),
        _ => return None,
    })
}

/// Precedence of `as` assertions (same level as relational operators)
const AS_PRECEDENCE: u8 = 8;

impl Parser {
    fn make(&mut self, kind: ExpressionKind, start: Span) -> Expression {
        let id = self.node_id();
        Expression::new(id, kind, self.span_from(start))
    }

    fn try_parse_arrow_function(&mut self) -> Result<Option<Expression>, ParserError> {
        let start = self.current_span();

        let head = match &self.current().kind {
            TokenKind::Identifier(_) if self.peek(1).kind == TokenKind::Arrow => {
                let name = self.parse_identifier()?;
                let span = name.span;
                Some((
                    None,
                    vec![Parameter {
                        name,
                        type_annotation: None,
                        default: None,
                        is_optional: false,
                        is_rest: false,
                        is_property: false,
                        span,
                    }],
                    None,
                ))
            }
            TokenKind::LeftParen | TokenKind::Less => self.try_parse(|parser| {
                let type_parameters = if parser.check(&TokenKind::Less) {
                    Some(parser.parse_type_parameters()?)
                } else {
                    None
                };
                let parameters = parser.parse_parameter_list()?;
                let return_type = parser.parse_return_annotation()?;
                if parser.check(&TokenKind::Arrow) && !parser.has_preceding_line_break() {
                    Ok((type_parameters, parameters, return_type))
                } else {
                    Err(parser.error_here("'=>' expected."))
                }
            }),
            _ => None,
        };

        let Some((type_parameters, parameters, return_type)) = head else {
            return Ok(None);
        };

        self.consume(TokenKind::Arrow, "'=>' expected.")?;
        let body = if self.check(&TokenKind::LeftBrace) {
            ArrowBody::Block(self.parse_block()?)
        } else {
            ArrowBody::Expression(Box::new(self.parse_assignment_expression()?))
        };

        let span = self.span_from(start);
        Ok(Some(self.make(
            ExpressionKind::Arrow(ArrowFunction {
                type_parameters,
                parameters,
                return_type,
                body,
                span,
            }),
            start,
        )))
    }

    fn parse_conditional(&mut self) -> Result<Expression, ParserError> {
        let start = self.current_span();
        let condition = self.parse_binary(0)?;

        if !self.match_token(&[TokenKind::Question]) {
            return Ok(condition);
        }

        let then_value = self.parse_assignment_expression()?;
        self.consume(TokenKind::Colon, "':' expected.")?;
        let else_value = self.parse_assignment_expression()?;

        Ok(self.make(
            ExpressionKind::Conditional(
                Box::new(condition),
                Box::new(then_value),
                Box::new(else_value),
            ),
            start,
        ))
    }

    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expression, ParserError> {
        let start = self.current_span();
        let mut left = self.parse_unary()?;

        loop {
            if self.is_contextual("as")
                && AS_PRECEDENCE >= min_precedence
                && !self.has_preceding_line_break()
            {
                self.advance();
                self.descend()?;
                left = if self.match_token(&[TokenKind::Const]) {
                    self.make(ExpressionKind::ConstAssertion(Box::new(left)), start)
                } else {
                    let typ = self.parse_type()?;
                    self.make(ExpressionKind::TypeAssertion(Box::new(left), typ), start)
                };
                continue;
            }

            let Some((precedence, op)) = binary_operator(&self.current().kind) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            self.advance();

            let next_min = if op == BinaryOp::Power {
                precedence
            } else {
                precedence + 1
            };
            let right = self.nested(|parser| parser.parse_binary(next_min))?;
            self.descend()?;
            left = self.make(
                ExpressionKind::Binary(op, Box::new(left), Box::new(right)),
                start,
            );
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, ParserError> {
        let start = self.current_span();
        let op = match self.current().kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Negate,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Tilde => UnaryOp::BitwiseNot,
            TokenKind::Typeof => UnaryOp::Typeof,
            TokenKind::Void => UnaryOp::Void,
            TokenKind::PlusPlus => UnaryOp::PreIncrement,
            TokenKind::MinusMinus => UnaryOp::PreDecrement,
            _ => return self.parse_postfix(),
        };
        self.advance();

        let operand = self.nested(|parser| parser.parse_unary())?;
        Ok(self.make(ExpressionKind::Unary(op, Box::new(operand)), start))
    }

    fn parse_postfix(&mut self) -> Result<Expression, ParserError> {
        let start = self.current_span();
        let expression = self.parse_left_hand_side()?;

        if self.has_preceding_line_break() {
            return Ok(expression);
        }
        let op = match self.current().kind {
            TokenKind::PlusPlus => PostfixOp::Increment,
            TokenKind::MinusMinus => PostfixOp::Decrement,
            _ => return Ok(expression),
        };
        self.descend()?;
        self.advance();
        Ok(self.make(ExpressionKind::Postfix(op, Box::new(expression)), start))
    }

    fn parse_left_hand_side(&mut self) -> Result<Expression, ParserError> {
        let start = self.current_span();
        let mut expression = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };

        loop {
            match self.current().kind {
                TokenKind::Dot => {
                    self.descend()?;
                    self.advance();
                    let property = self.parse_property_name()?;
                    expression = self.make(
                        ExpressionKind::Member(MemberExpression {
                            object: Box::new(expression),
                            property,
                            optional: false,
                        }),
                        start,
                    );
                }
                TokenKind::QuestionDot => {
                    self.descend()?;
                    self.advance();
                    expression = match self.current().kind {
                        TokenKind::LeftParen | TokenKind::Less => {
                            let type_arguments = if self.check(&TokenKind::Less) {
                                Some(self.parse_type_arguments()?)
                            } else {
                                None
                            };
                            let arguments = self.parse_arguments()?;
                            self.make(
                                ExpressionKind::Call(CallExpression {
                                    callee: Box::new(expression),
                                    type_arguments,
                                    arguments,
                                    optional: true,
                                }),
                                start,
                            )
                        }
                        TokenKind::LeftBracket => {
                            self.advance();
                            let index = self.parse_expression()?;
                            self.consume(TokenKind::RightBracket, "']' expected.")?;
                            self.make(
                                ExpressionKind::Index(IndexExpression {
                                    object: Box::new(expression),
                                    index: Box::new(index),
                                    optional: true,
                                }),
                                start,
                            )
                        }
                        _ => {
                            let property = self.parse_property_name()?;
                            self.make(
                                ExpressionKind::Member(MemberExpression {
                                    object: Box::new(expression),
                                    property,
                                    optional: true,
                                }),
                                start,
                            )
                        }
                    };
                }
                TokenKind::LeftBracket => {
                    self.descend()?;
                    self.advance();
                    let index = self.parse_expression()?;
                    self.consume(TokenKind::RightBracket, "']' expected.")?;
                    expression = self.make(
                        ExpressionKind::Index(IndexExpression {
                            object: Box::new(expression),
                            index: Box::new(index),
                            optional: false,
                        }),
                        start,
                    );
                }
                TokenKind::LeftParen => {
                    self.descend()?;
                    let arguments = self.parse_arguments()?;
                    expression = self.make(
                        ExpressionKind::Call(CallExpression {
                            callee: Box::new(expression),
                            type_arguments: None,
                            arguments,
                            optional: false,
                        }),
                        start,
                    );
                }
                TokenKind::Less => {
                    // `f<T>(...)`; otherwise `<` is a comparison
                    let type_arguments = self.try_parse(|parser| {
                        let arguments = parser.parse_type_arguments()?;
                        if parser.check(&TokenKind::LeftParen) {
                            Ok(arguments)
                        } else {
                            Err(parser.error_here("'(' expected."))
                        }
                    });
                    let Some(type_arguments) = type_arguments else {
                        break;
                    };
                    self.descend()?;
                    let arguments = self.parse_arguments()?;
                    expression = self.make(
                        ExpressionKind::Call(CallExpression {
                            callee: Box::new(expression),
                            type_arguments: Some(type_arguments),
                            arguments,
                            optional: false,
                        }),
                        start,
                    );
                }
                TokenKind::Bang if !self.has_preceding_line_break() => {
                    self.descend()?;
                    self.advance();
                    expression = self.make(ExpressionKind::NonNull(Box::new(expression)), start);
                }
                _ => break,
            }
        }

        Ok(expression)
    }

    fn parse_new(&mut self) -> Result<Expression, ParserError> {
        let start = self.current_span();
        self.consume(TokenKind::New, "'new' expected.")?;

        let mut callee = self.parse_primary()?;
        while self.match_token(&[TokenKind::Dot]) {
            self.descend()?;
            let property = self.parse_property_name()?;
            callee = self.make(
                ExpressionKind::Member(MemberExpression {
                    object: Box::new(callee),
                    property,
                    optional: false,
                }),
                start,
            );
        }

        let type_arguments = if self.check(&TokenKind::Less) {
            Some(self.parse_type_arguments()?)
        } else {
            None
        };
        let arguments = if self.check(&TokenKind::LeftParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };

        Ok(self.make(
            ExpressionKind::New(NewExpression {
                callee: Box::new(callee),
                type_arguments,
                arguments,
            }),
            start,
        ))
    }

    fn parse_arguments(&mut self) -> Result<Vec<Argument>, ParserError> {
        self.consume(TokenKind::LeftParen, "'(' expected.")?;
        let mut arguments = Vec::new();

        while !self.check(&TokenKind::RightParen) {
            let start = self.current_span();
            let is_spread = self.match_token(&[TokenKind::DotDotDot]);
            let value = self.parse_assignment_expression()?;
            arguments.push(Argument {
                value,
                is_spread,
                span: self.span_from(start),
            });
            if !self.match_token(&[TokenKind::Comma]) {
                break;
            }
        }

        self.consume(TokenKind::RightParen, "')' expected.")?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> Result<Expression, ParserError> {
        let start = self.current_span();
        let kind = match self.current().kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                ExpressionKind::Identifier(name)
            }
            TokenKind::Number(value) => {
                self.advance();
                ExpressionKind::Literal(Literal::Number(value))
            }
            TokenKind::String(value) => {
                self.advance();
                ExpressionKind::Literal(Literal::String(value))
            }
            TokenKind::Template {
                value,
                has_substitutions,
            } => {
                self.advance();
                ExpressionKind::Template(TemplateLiteral {
                    value,
                    has_substitutions,
                })
            }
            TokenKind::True => {
                self.advance();
                ExpressionKind::Literal(Literal::Boolean(true))
            }
            TokenKind::False => {
                self.advance();
                ExpressionKind::Literal(Literal::Boolean(false))
            }
            TokenKind::Null => {
                self.advance();
                ExpressionKind::Literal(Literal::Null)
            }
            TokenKind::This => {
                self.advance();
                ExpressionKind::This
            }
            TokenKind::LeftParen => {
                self.descend()?;
                self.advance();
                let inner = self.parse_expression()?;
                self.consume(TokenKind::RightParen, "')' expected.")?;
                ExpressionKind::Parenthesized(Box::new(inner))
            }
            TokenKind::LeftBracket => {
                self.descend()?;
                self.advance();
                ExpressionKind::Array(self.parse_array_elements()?)
            }
            TokenKind::LeftBrace => {
                self.descend()?;
                self.advance();
                ExpressionKind::Object(self.parse_object_properties()?)
            }
            TokenKind::Function => {
                self.descend()?;
                ExpressionKind::Function(self.parse_function_expression()?)
            }
            _ => return Err(self.error_here("Expression expected.")),
        };

        Ok(self.make(kind, start))
    }

    fn parse_array_elements(&mut self) -> Result<Vec<ArrayElement>, ParserError> {
        let mut elements = Vec::new();
        while !self.check(&TokenKind::RightBracket) {
            if self.match_token(&[TokenKind::DotDotDot]) {
                elements.push(ArrayElement::Spread(self.parse_assignment_expression()?));
            } else {
                elements.push(ArrayElement::Expression(self.parse_assignment_expression()?));
            }
            if !self.match_token(&[TokenKind::Comma]) {
                break;
            }
        }
        self.consume(TokenKind::RightBracket, "']' expected.")?;
        Ok(elements)
    }

    fn parse_object_properties(&mut self) -> Result<Vec<ObjectProperty>, ParserError> {
        let mut properties = Vec::new();

        while !self.check(&TokenKind::RightBrace) {
            let start = self.current_span();

            if self.match_token(&[TokenKind::DotDotDot]) {
                let value = self.parse_assignment_expression()?;
                properties.push(ObjectProperty::Spread {
                    value,
                    span: self.span_from(start),
                });
            } else {
                let is_identifier = matches!(self.current().kind, TokenKind::Identifier(_));
                let key = self.parse_property_name()?;

                if self.check(&TokenKind::LeftParen) || self.check(&TokenKind::Less) {
                    let type_parameters = if self.check(&TokenKind::Less) {
                        Some(self.parse_type_parameters()?)
                    } else {
                        None
                    };
                    let parameters = self.parse_parameter_list()?;
                    let return_type = self.parse_return_annotation()?;
                    let body = self.parse_block()?;
                    let span = self.span_from(start);
                    properties.push(ObjectProperty::Method {
                        key,
                        function: FunctionExpression {
                            name: None,
                            type_parameters,
                            parameters,
                            return_type,
                            body,
                            span,
                        },
                        span,
                    });
                } else if self.match_token(&[TokenKind::Colon]) {
                    let value = self.parse_assignment_expression()?;
                    properties.push(ObjectProperty::Property {
                        key,
                        value,
                        span: self.span_from(start),
                    });
                } else if is_identifier {
                    properties.push(ObjectProperty::Shorthand(key));
                } else {
                    return Err(self.error_here("':' expected."));
                }
            }

            if !self.match_token(&[TokenKind::Comma]) {
                break;
            }
        }

        self.consume(TokenKind::RightBrace, "'}' expected.")?;
        Ok(properties)
    }

    pub(super) fn parse_function_expression(&mut self) -> Result<FunctionExpression, ParserError> {
        let start = self.current_span();
        self.consume(TokenKind::Function, "'function' expected.")?;

        let name = if matches!(self.current().kind, TokenKind::Identifier(_)) {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        let type_parameters = if self.check(&TokenKind::Less) {
            Some(self.parse_type_parameters()?)
        } else {
            None
        };
        let parameters = self.parse_parameter_list()?;
        let return_type = self.parse_return_annotation()?;
        let body = self.parse_block()?;

        Ok(FunctionExpression {
            name,
            type_parameters,
            parameters,
            return_type,
            body,
            span: self.span_from(start),
        })
    }

    /// Spanned string literal (module specifiers)
    pub(super) fn parse_string_literal(&mut self) -> Result<Spanned<String>, ParserError> {
        match &self.current().kind {
            TokenKind::String(value) => {
                let literal = Spanned::new(value.clone(), self.current_span());
                self.advance();
                Ok(literal)
            }
            _ => Err(self.error_here("String literal expected.")),
        }
    }
}
