use super::{ExpressionParser, Parser, ParserError, TypeParser};
use crate::ast::statement::*;
use crate::ast::types::ObjectTypeMember;
use crate::lexer::TokenKind;

pub trait StatementParser {
    fn parse_statement(&mut self) -> Result<Statement, ParserError>;
    fn parse_block(&mut self) -> Result<Block, ParserError>;
}

const CLASS_MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "static",
    "readonly",
    "abstract",
    "override",
];

impl StatementParser for Parser {
    fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        self.nested(|parser| parser.parse_statement_kind())
    }

    fn parse_block(&mut self) -> Result<Block, ParserError> {
        let start = self.current_span();
        self.consume(TokenKind::LeftBrace, "'{' expected.")?;

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        self.consume(TokenKind::RightBrace, "'}' expected.")?;
        Ok(Block {
            statements,
            span: self.span_from(start),
        })
    }
}

// Statement implementations
impl Parser {
    fn parse_statement_kind(&mut self) -> Result<Statement, ParserError> {
        match &self.current().kind {
            TokenKind::Const | TokenKind::Let | TokenKind::Var => {
                self.parse_variable_declaration(false)
            }
            TokenKind::Function => self.parse_function_declaration(false),
            TokenKind::Class => self.parse_class_declaration(false, false),
            TokenKind::Interface => self.parse_interface_declaration(),
            TokenKind::Import => self.parse_import_declaration(),
            TokenKind::Export => self.parse_export_declaration(),
            TokenKind::Declare => self.parse_declare_statement(),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Throw => {
                self.advance();
                let value = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Statement::Throw(value))
            }
            TokenKind::Break | TokenKind::Continue => {
                let is_break = self.check(&TokenKind::Break);
                let span = self.current_span();
                self.advance();
                self.consume_semicolon()?;
                Ok(if is_break {
                    Statement::Break(span)
                } else {
                    Statement::Continue(span)
                })
            }
            TokenKind::LeftBrace => Ok(Statement::Block(self.parse_block()?)),
            TokenKind::Semicolon => {
                let span = self.current_span();
                self.advance();
                Ok(Statement::Empty(span))
            }
            TokenKind::Identifier(name)
                if name == "type" && matches!(self.peek(1).kind, TokenKind::Identifier(_)) =>
            {
                self.parse_type_alias_declaration()
            }
            TokenKind::Identifier(name)
                if name == "abstract" && self.peek(1).kind == TokenKind::Class =>
            {
                self.advance();
                self.parse_class_declaration(false, true)
            }
            _ => {
                // Expression statement
                let expression = self.parse_expression()?;
                self.consume_semicolon()?;
                Ok(Statement::Expression(expression))
            }
        }
    }

    fn parse_variable_declaration(&mut self, is_declare: bool) -> Result<Statement, ParserError> {
        let start = self.current_span();
        let kind = match self.advance().kind {
            TokenKind::Const => VariableKind::Const,
            TokenKind::Let => VariableKind::Let,
            _ => VariableKind::Var,
        };

        let mut declarators = Vec::new();
        loop {
            let declarator_start = self.current_span();
            let name = self.parse_identifier()?;
            // Definite assignment assertion `let x!: T`
            self.match_token(&[TokenKind::Bang]);
            let type_annotation = self.parse_return_annotation()?;
            let initializer = if self.match_token(&[TokenKind::Equal]) {
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };
            declarators.push(VariableDeclarator {
                name,
                type_annotation,
                initializer,
                span: self.span_from(declarator_start),
            });
            if !self.match_token(&[TokenKind::Comma]) {
                break;
            }
        }
        self.consume_semicolon()?;

        Ok(Statement::Variable(VariableDeclaration {
            kind,
            is_declare,
            declarators,
            span: self.span_from(start),
        }))
    }

    fn parse_function_declaration(&mut self, is_declare: bool) -> Result<Statement, ParserError> {
        let start = self.current_span();
        self.consume(TokenKind::Function, "'function' expected.")?;

        let name = self.parse_identifier()?;
        let type_parameters = if self.check(&TokenKind::Less) {
            Some(self.parse_type_parameters()?)
        } else {
            None
        };
        let parameters = self.parse_parameter_list()?;
        let return_type = self.parse_return_annotation()?;

        let body = if self.check(&TokenKind::LeftBrace) && !is_declare {
            Some(self.parse_block()?)
        } else {
            self.consume_semicolon()?;
            None
        };

        Ok(Statement::Function(FunctionDeclaration {
            name,
            is_declare,
            type_parameters,
            parameters,
            return_type,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_class_declaration(
        &mut self,
        is_declare: bool,
        is_abstract: bool,
    ) -> Result<Statement, ParserError> {
        let start = self.current_span();
        self.consume(TokenKind::Class, "'class' expected.")?;

        let name = self.parse_identifier()?;
        let type_parameters = if self.check(&TokenKind::Less) {
            Some(self.parse_type_parameters()?)
        } else {
            None
        };
        let extends = if self.match_token(&[TokenKind::Extends]) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let mut implements = Vec::new();
        if self.match_token(&[TokenKind::Implements]) {
            loop {
                implements.push(self.parse_type()?);
                if !self.match_token(&[TokenKind::Comma]) {
                    break;
                }
            }
        }

        self.consume(TokenKind::LeftBrace, "'{' expected.")?;
        let mut members = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            if self.match_token(&[TokenKind::Semicolon]) {
                continue;
            }
            members.push(self.parse_class_member()?);
        }
        self.consume(TokenKind::RightBrace, "'}' expected.")?;

        Ok(Statement::Class(ClassDeclaration {
            name,
            is_declare,
            is_abstract,
            type_parameters,
            extends,
            implements,
            members,
            span: self.span_from(start),
        }))
    }

    fn parse_class_member(&mut self) -> Result<ClassMember, ParserError> {
        let start = self.current_span();
        let mut is_static = false;
        let mut is_readonly = false;

        // A modifier keyword followed by `(`, `:`, `?`, `=`, `;` or `<` is a member name
        while (CLASS_MODIFIERS.iter().any(|m| self.is_contextual(m))
            || self.check(&TokenKind::Declare))
            && !matches!(
                self.peek(1).kind,
                TokenKind::LeftParen
                    | TokenKind::Colon
                    | TokenKind::Question
                    | TokenKind::Equal
                    | TokenKind::Semicolon
                    | TokenKind::Less
                    | TokenKind::RightBrace
            )
        {
            if self.is_contextual("static") {
                is_static = true;
            } else if self.is_contextual("readonly") {
                is_readonly = true;
            }
            self.advance();
        }

        if self.is_contextual("constructor") && self.peek(1).kind == TokenKind::LeftParen {
            self.advance();
            let parameters = self.parse_parameter_list()?;
            let body = if self.check(&TokenKind::LeftBrace) {
                Some(self.parse_block()?)
            } else {
                self.consume_semicolon()?;
                None
            };
            return Ok(ClassMember::Constructor(ConstructorDeclaration {
                parameters,
                body,
                span: self.span_from(start),
            }));
        }

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
            let body = if self.check(&TokenKind::LeftBrace) {
                Some(self.parse_block()?)
            } else {
                self.consume_semicolon()?;
                None
            };
            return Ok(ClassMember::Method(MethodDeclaration {
                is_static,
                is_optional,
                name,
                type_parameters,
                parameters,
                return_type,
                body,
                span: self.span_from(start),
            }));
        }

        self.match_token(&[TokenKind::Bang]);
        let type_annotation = self.parse_return_annotation()?;
        let initializer = if self.match_token(&[TokenKind::Equal]) {
            Some(self.parse_assignment_expression()?)
        } else {
            None
        };
        self.consume_semicolon()?;

        Ok(ClassMember::Property(PropertyDeclaration {
            is_static,
            is_readonly,
            is_optional,
            name,
            type_annotation,
            initializer,
            span: self.span_from(start),
        }))
    }

    fn parse_interface_declaration(&mut self) -> Result<Statement, ParserError> {
        let start = self.current_span();
        self.consume(TokenKind::Interface, "'interface' expected.")?;

        let name = self.parse_identifier()?;
        let type_parameters = if self.check(&TokenKind::Less) {
            Some(self.parse_type_parameters()?)
        } else {
            None
        };
        let mut extends = Vec::new();
        if self.match_token(&[TokenKind::Extends]) {
            loop {
                extends.push(self.parse_type()?);
                if !self.match_token(&[TokenKind::Comma]) {
                    break;
                }
            }
        }

        self.consume(TokenKind::LeftBrace, "'{' expected.")?;
        let members = self.parse_type_members()?;
        self.consume(TokenKind::RightBrace, "'}' expected.")?;

        Ok(Statement::Interface(InterfaceDeclaration {
            name,
            type_parameters,
            extends,
            members,
            span: self.span_from(start),
        }))
    }

    fn parse_type_members(&mut self) -> Result<Vec<ObjectTypeMember>, ParserError> {
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
        Ok(members)
    }

    fn parse_type_alias_declaration(&mut self) -> Result<Statement, ParserError> {
        let start = self.current_span();
        self.advance(); // `type`

        let name = self.parse_identifier()?;
        let type_parameters = if self.check(&TokenKind::Less) {
            Some(self.parse_type_parameters()?)
        } else {
            None
        };
        self.consume(TokenKind::Equal, "'=' expected.")?;
        let type_annotation = self.parse_type()?;
        self.consume_semicolon()?;

        Ok(Statement::TypeAlias(TypeAliasDeclaration {
            name,
            type_parameters,
            type_annotation,
            span: self.span_from(start),
        }))
    }

    fn parse_declare_statement(&mut self) -> Result<Statement, ParserError> {
        self.consume(TokenKind::Declare, "'declare' expected.")?;
        match &self.current().kind {
            TokenKind::Const | TokenKind::Let | TokenKind::Var => {
                self.parse_variable_declaration(true)
            }
            TokenKind::Function => self.parse_function_declaration(true),
            TokenKind::Class => self.parse_class_declaration(true, false),
            TokenKind::Interface => self.parse_interface_declaration(),
            TokenKind::Identifier(name) if name == "type" => self.parse_type_alias_declaration(),
            TokenKind::Identifier(name) if name == "abstract" => {
                self.advance();
                self.parse_class_declaration(true, true)
            }
            _ => Err(self.error_here("Declaration expected.")),
        }
    }

    fn parse_import_declaration(&mut self) -> Result<Statement, ParserError> {
        let start = self.current_span();
        self.consume(TokenKind::Import, "'import' expected.")?;

        // Side-effect import
        if matches!(self.current().kind, TokenKind::String(_)) {
            let source = self.parse_string_literal()?;
            self.consume_semicolon()?;
            return Ok(Statement::Import(ImportDeclaration {
                is_type_only: false,
                default: None,
                namespace: None,
                specifiers: Vec::new(),
                source,
                span: self.span_from(start),
            }));
        }

        let is_type_only = self.is_contextual("type")
            && !matches!(self.peek(1).kind, TokenKind::Comma)
            && !(matches!(&self.peek(1).kind, TokenKind::Identifier(n) if n == "from"));
        if is_type_only {
            self.advance();
        }

        let mut default = None;
        let mut namespace = None;
        let mut specifiers = Vec::new();

        if matches!(self.current().kind, TokenKind::Identifier(_)) {
            default = Some(self.parse_identifier()?);
            self.match_token(&[TokenKind::Comma]);
        }

        if self.match_token(&[TokenKind::Star]) {
            if !self.eat_contextual("as") {
                return Err(self.error_here("'as' expected."));
            }
            namespace = Some(self.parse_identifier()?);
        } else if self.match_token(&[TokenKind::LeftBrace]) {
            while !self.check(&TokenKind::RightBrace) {
                let specifier_type_only = self.is_contextual("type")
                    && !matches!(
                        self.peek(1).kind,
                        TokenKind::Comma | TokenKind::RightBrace
                    )
                    && !(matches!(&self.peek(1).kind, TokenKind::Identifier(n) if n == "as"));
                if specifier_type_only {
                    self.advance();
                }
                let imported = self.parse_property_name()?;
                let local = if self.eat_contextual("as") {
                    self.parse_identifier()?
                } else {
                    imported.clone()
                };
                specifiers.push(ImportSpecifier {
                    imported,
                    local,
                    is_type_only: specifier_type_only,
                });
                if !self.match_token(&[TokenKind::Comma]) {
                    break;
                }
            }
            self.consume(TokenKind::RightBrace, "'}' expected.")?;
        }

        if !self.eat_contextual("from") {
            return Err(self.error_here("'from' expected."));
        }
        let source = self.parse_string_literal()?;
        self.consume_semicolon()?;

        Ok(Statement::Import(ImportDeclaration {
            is_type_only,
            default,
            namespace,
            specifiers,
            source,
            span: self.span_from(start),
        }))
    }

    fn parse_export_declaration(&mut self) -> Result<Statement, ParserError> {
        let start = self.current_span();
        self.consume(TokenKind::Export, "'export' expected.")?;

        if self.eat_contextual("default") {
            let value = self.parse_expression()?;
            self.consume_semicolon()?;
            return Ok(Statement::ExportDefault(value));
        }

        let type_only_list =
            self.is_contextual("type") && self.peek(1).kind == TokenKind::LeftBrace;
        if type_only_list {
            self.advance();
        }

        if self.match_token(&[TokenKind::LeftBrace]) {
            let mut specifiers = Vec::new();
            while !self.check(&TokenKind::RightBrace) {
                let local = self.parse_identifier()?;
                let exported = if self.eat_contextual("as") {
                    self.parse_property_name()?
                } else {
                    local.clone()
                };
                specifiers.push(ExportSpecifier { local, exported });
                if !self.match_token(&[TokenKind::Comma]) {
                    break;
                }
            }
            self.consume(TokenKind::RightBrace, "'}' expected.")?;
            if self.is_contextual("from") {
                return Err(self.error_here("Re-exports are not supported."));
            }
            self.consume_semicolon()?;
            return Ok(Statement::ExportNamed(ExportNamedDeclaration {
                specifiers,
                span: self.span_from(start),
            }));
        }

        let declaration = self.parse_statement()?;
        match declaration {
            Statement::Variable(_)
            | Statement::Function(_)
            | Statement::Class(_)
            | Statement::Interface(_)
            | Statement::TypeAlias(_) => Ok(Statement::Export(Box::new(declaration))),
            _ => Err(self.error_here("Declaration expected.")),
        }
    }

    fn parse_if_statement(&mut self) -> Result<Statement, ParserError> {
        let start = self.current_span();
        self.consume(TokenKind::If, "'if' expected.")?;
        self.consume(TokenKind::LeftParen, "'(' expected.")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "')' expected.")?;

        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.match_token(&[TokenKind::Else]) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::If(IfStatement {
            condition,
            then_branch,
            else_branch,
            span: self.span_from(start),
        }))
    }

    fn parse_while_statement(&mut self) -> Result<Statement, ParserError> {
        let start = self.current_span();
        self.consume(TokenKind::While, "'while' expected.")?;
        self.consume(TokenKind::LeftParen, "'(' expected.")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "')' expected.")?;
        let body = Box::new(self.parse_statement()?);

        Ok(Statement::While(WhileStatement {
            condition,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_for_statement(&mut self) -> Result<Statement, ParserError> {
        let start = self.current_span();
        self.consume(TokenKind::For, "'for' expected.")?;
        self.consume(TokenKind::LeftParen, "'(' expected.")?;

        let kind = match self.current().kind {
            TokenKind::Const => VariableKind::Const,
            TokenKind::Let => VariableKind::Let,
            TokenKind::Var => VariableKind::Var,
            _ => return Err(self.error_here("Only 'for...of' loops are supported.")),
        };
        self.advance();
        let binding = self.parse_identifier()?;
        if !self.eat_contextual("of") {
            return Err(self.error_here("Only 'for...of' loops are supported."));
        }
        let iterable = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "')' expected.")?;
        let body = Box::new(self.parse_statement()?);

        Ok(Statement::ForOf(ForOfStatement {
            kind,
            binding,
            iterable,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_return_statement(&mut self) -> Result<Statement, ParserError> {
        let start = self.current_span();
        self.consume(TokenKind::Return, "'return' expected.")?;

        let value = if self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RightBrace)
            || self.is_at_end()
            || self.has_preceding_line_break()
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon()?;

        Ok(Statement::Return(ReturnStatement {
            value,
            span: self.span_from(start),
        }))
    }
}
