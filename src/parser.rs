use log::debug;
use miette::Diagnostic;
use std::rc::Rc;
use thiserror::Error;

use crate::{
    ast::*,
    diagnostics::ErrorSite,
    scanner::{Literal, Token, TokenKind},
    side_table::UniqueId,
    source::SourceSpan,
    stack::ensure_sufficient_stack,
};

/// Upper bound on both declared parameters and call-site arguments.
pub const MAX_ARITY: usize = 255;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ParserError {
    #[error("Expect {expected}.")]
    #[diagnostic(code(lox::parser::unexpected_token))]
    Expected {
        expected: String,
        site: ErrorSite,
        #[label("Found this instead")]
        span: SourceSpan,
    },
    #[error("Expect expression.")]
    #[diagnostic(code(lox::parser::expected_expression))]
    ExpectedExpression {
        site: ErrorSite,
        #[label("Expected a number, variable, unary, etc. here")]
        span: SourceSpan,
    },
    #[error("Invalid assignment target.")]
    #[diagnostic(code(lox::parser::invalid_assignment_target))]
    InvalidAssignmentTarget {
        site: ErrorSite,
        #[label("Cannot assign to this expression")]
        span: SourceSpan,
    },
    #[error("Can't have more than 255 parameters.")]
    #[diagnostic(code(lox::parser::too_many_parameters))]
    TooManyParameters {
        site: ErrorSite,
        #[label("The 256th parameter is here")]
        span: SourceSpan,
    },
    #[error("Can't have more than 255 arguments.")]
    #[diagnostic(code(lox::parser::too_many_arguments))]
    TooManyArguments {
        site: ErrorSite,
        #[label("The 256th argument is here")]
        span: SourceSpan,
    },
}
impl ParserError {
    pub fn site(&self) -> &ErrorSite {
        match self {
            Self::Expected { site, .. }
            | Self::ExpectedExpression { site, .. }
            | Self::InvalidAssignmentTarget { site, .. }
            | Self::TooManyParameters { site, .. }
            | Self::TooManyArguments { site, .. } => site,
        }
    }
}

#[derive(Default, Debug, Clone, Copy)]
pub struct ParserOpts {
    is_repl: bool,
}
impl ParserOpts {
    /// Lets the last statement of the input omit its `;`.
    pub fn for_repl(self) -> Self {
        Self { is_repl: true }
    }
}

#[derive(Debug, Clone, Copy)]
enum FunctionKind {
    Function,
    Method,
}
impl FunctionKind {
    fn name(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
        }
    }
}

pub struct Parser {
    opts: ParserOpts,
    tokens: Vec<Token>,
    current: usize,
    recovered_errors: Vec<ParserError>,
}

impl Parser {
    /// Parses a whole token sequence. Declarations that fail to parse are
    /// left out of the program and their errors returned alongside it.
    pub fn parse(tokens: Vec<Token>, opts: ParserOpts) -> (Program, Vec<ParserError>) {
        let mut parser = Self::new(tokens, opts);
        let program = parser.parse_program();
        debug!(
            "parsed {} statements with {} errors",
            program.statements.len(),
            parser.recovered_errors.len()
        );
        (program, parser.recovered_errors)
    }
    fn new(mut tokens: Vec<Token>, opts: ParserOpts) -> Parser {
        if !tokens.last().map_or(false, Token::is_eof) {
            let (line, end) = tokens
                .last()
                .map_or((1, 0), |token| (token.line, token.span.end()));
            tokens.push(Token::new(
                TokenKind::Eof,
                String::new(),
                None,
                line,
                SourceSpan::new(end, 0),
            ));
        }
        Parser {
            opts,
            tokens,
            current: 0,
            recovered_errors: Vec::new(),
        }
    }
}

impl Parser {
    fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.parse_declaration() {
                statements.push(stmt);
            }
        }
        Program { statements }
    }
    /// Recovery boundary: a failed declaration is reported, skipped past and
    /// dropped.
    fn parse_declaration(&mut self) -> Option<Stmt> {
        ensure_sufficient_stack(|| {
            match self.parse_declaration_or_error() {
                Ok(stmt) => Some(stmt),
                Err(err) => {
                    self.recovered_errors.push(err);
                    self.synchronize();
                    None
                }
            }
        })
    }
    fn parse_declaration_or_error(&mut self) -> Result<Stmt, ParserError> {
        if self.consume_token(TokenKind::Class).is_some() {
            return Ok(Stmt::Class(self.parse_class_decl()?));
        }
        if self.consume_token(TokenKind::Fun).is_some() {
            return Ok(Stmt::Function(Rc::new(
                self.parse_function(FunctionKind::Function)?,
            )));
        }
        if self.consume_token(TokenKind::Var).is_some() {
            return Ok(Stmt::Var(self.parse_var_decl()?));
        }
        self.parse_stmt()
    }
    fn parse_class_decl(&mut self) -> Result<ClassStmt, ParserError> {
        let name = self.consume_token_or_error(TokenKind::Identifier, "class name")?;
        self.consume_token_or_error(TokenKind::LeftBrace, "'{' before class body")?;

        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            methods.push(Rc::new(self.parse_function(FunctionKind::Method)?));
        }

        self.consume_token_or_error(TokenKind::RightBrace, "'}' after class body")?;
        Ok(ClassStmt { name, methods })
    }
    fn parse_function(&mut self, kind: FunctionKind) -> Result<FunctionDecl, ParserError> {
        let kind = kind.name();
        let name =
            self.consume_token_or_error(TokenKind::Identifier, &format!("{} name", kind))?;
        self.consume_token_or_error(
            TokenKind::LeftParen,
            &format!("'(' after {} name", kind),
        )?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARITY {
                    let token = self.peek();
                    let err = ParserError::TooManyParameters {
                        site: ErrorSite::of(token),
                        span: token.span,
                    };
                    self.recovered_errors.push(err);
                }
                params.push(self.consume_token_or_error(TokenKind::Identifier, "parameter name")?);
                if self.consume_token(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        self.consume_token_or_error(TokenKind::RightParen, "')' after parameters")?;

        self.consume_token_or_error(
            TokenKind::LeftBrace,
            &format!("'{{' before {} body", kind),
        )?;
        let body = self.parse_block()?;

        Ok(FunctionDecl { name, params, body })
    }
    fn parse_var_decl(&mut self) -> Result<VarStmt, ParserError> {
        let name = self.consume_token_or_error(TokenKind::Identifier, "variable name")?;

        let initializer = match self.consume_token(TokenKind::Equal) {
            Some(_) => Some(self.parse_expr()?),
            None => None,
        };

        self.consume_statement_end_semicolon("';' after variable declaration")?;

        Ok(VarStmt { name, initializer })
    }
    fn parse_stmt(&mut self) -> Result<Stmt, ParserError> {
        ensure_sufficient_stack(|| {
            if self.consume_token(TokenKind::For).is_some() {
                return self.parse_for_stmt();
            }
            if self.consume_token(TokenKind::If).is_some() {
                return Ok(Stmt::If(self.parse_if_stmt()?));
            }
            if let Some(keyword) = self.consume_token(TokenKind::Print) {
                let expression = self.parse_expr()?;
                self.consume_statement_end_semicolon("';' after value")?;
                return Ok(Stmt::Print(PrintStmt {
                    keyword,
                    expression,
                }));
            }
            if let Some(keyword) = self.consume_token(TokenKind::Return) {
                return Ok(Stmt::Return(self.parse_return_stmt(keyword)?));
            }
            if self.consume_token(TokenKind::While).is_some() {
                return Ok(Stmt::While(self.parse_while_stmt()?));
            }
            if self.consume_token(TokenKind::LeftBrace).is_some() {
                return Ok(Stmt::Block(BlockStmt {
                    statements: self.parse_block()?,
                }));
            }

            Ok(Stmt::Expression(self.parse_expr_stmt()?))
        })
    }
    /// Parses the statements of a block whose `{` is already consumed.
    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParserError> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.parse_declaration() {
                statements.push(stmt);
            }
        }
        self.consume_token_or_error(TokenKind::RightBrace, "'}' after block")?;
        Ok(statements)
    }
    fn parse_expr_stmt(&mut self) -> Result<ExpressionStmt, ParserError> {
        let expression = self.parse_expr()?;
        self.consume_statement_end_semicolon("';' after expression")?;
        Ok(ExpressionStmt { expression })
    }
    fn parse_if_stmt(&mut self) -> Result<IfStmt, ParserError> {
        self.consume_token_or_error(TokenKind::LeftParen, "'(' after 'if'")?;
        let condition = self.parse_expr()?;
        self.consume_token_or_error(TokenKind::RightParen, "')' after if condition")?;

        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.consume_token(TokenKind::Else).is_some() {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };

        Ok(IfStmt {
            condition,
            then_branch,
            else_branch,
        })
    }
    fn parse_return_stmt(&mut self, keyword: Token) -> Result<ReturnStmt, ParserError> {
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.consume_statement_end_semicolon("';' after return value")?;
        Ok(ReturnStmt { keyword, value })
    }
    fn parse_while_stmt(&mut self) -> Result<WhileStmt, ParserError> {
        self.consume_token_or_error(TokenKind::LeftParen, "'(' after 'while'")?;
        let condition = self.parse_expr()?;
        self.consume_token_or_error(TokenKind::RightParen, "')' after condition")?;
        let body = Box::new(self.parse_stmt()?);

        Ok(WhileStmt { condition, body })
    }
    /// `for` has no node of its own: it becomes
    /// `{ initializer; while (condition) { body; increment; } }`.
    fn parse_for_stmt(&mut self) -> Result<Stmt, ParserError> {
        let for_span = self.previous().span;
        self.consume_token_or_error(TokenKind::LeftParen, "'(' after 'for'")?;

        let initializer = if self.consume_token(TokenKind::Semicolon).is_some() {
            None
        } else if self.consume_token(TokenKind::Var).is_some() {
            Some(Stmt::Var(self.parse_var_decl()?))
        } else {
            Some(Stmt::Expression(self.parse_expr_stmt()?))
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.consume_token_or_error(TokenKind::Semicolon, "';' after loop condition")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.consume_token_or_error(TokenKind::RightParen, "')' after for clauses")?;

        let mut body = self.parse_stmt()?;

        if let Some(expression) = increment {
            body = Stmt::Block(BlockStmt {
                statements: vec![body, Stmt::Expression(ExpressionStmt { expression })],
            });
        }

        body = Stmt::While(WhileStmt {
            condition: condition.unwrap_or(Expr::Literal(LiteralExpr {
                value: LiteralValue::Boolean(true),
                source_span: for_span,
            })),
            body: Box::new(body),
        });

        if let Some(initializer) = initializer {
            body = Stmt::Block(BlockStmt {
                statements: vec![initializer, body],
            });
        }

        Ok(body)
    }
    fn consume_statement_end_semicolon(&mut self, expected: &str) -> Result<(), ParserError> {
        if self.opts.is_repl && self.is_at_end() {
            return Ok(());
        }
        self.consume_token_or_error(TokenKind::Semicolon, expected)?;
        Ok(())
    }
    fn parse_expr(&mut self) -> Result<Expr, ParserError> {
        ensure_sufficient_stack(|| self.parse_assignment_expr())
    }
    fn parse_assignment_expr(&mut self) -> Result<Expr, ParserError> {
        let expr = self.parse_or_expr()?;

        if let Some(equals) = self.consume_token(TokenKind::Equal) {
            let value = Box::new(self.parse_assignment_expr()?);
            return Ok(match expr {
                Expr::Variable(VariableExpr { name, .. }) => Expr::Assign(AssignExpr {
                    id: UniqueId::new(),
                    name,
                    value,
                }),
                Expr::Get(GetExpr { object, name }) => Expr::Set(SetExpr {
                    object,
                    name,
                    value,
                }),
                target => {
                    // Reported without unwinding: the parser is not confused.
                    self.recovered_errors
                        .push(ParserError::InvalidAssignmentTarget {
                            site: ErrorSite::of(&equals),
                            span: target.source_span(),
                        });
                    *value
                }
            });
        }

        Ok(expr)
    }
    fn parse_or_expr(&mut self) -> Result<Expr, ParserError> {
        let mut last_expr = self.parse_and_expr()?;

        while let Some(token) = self.consume_token(TokenKind::Or) {
            last_expr = Expr::Logical(LogicalExpr {
                left: Box::new(last_expr),
                operator: Operator::new(LogicalOperator::Or, token),
                right: Box::new(self.parse_and_expr()?),
            });
        }

        Ok(last_expr)
    }
    fn parse_and_expr(&mut self) -> Result<Expr, ParserError> {
        let mut last_expr = self.parse_equality_expr()?;

        while let Some(token) = self.consume_token(TokenKind::And) {
            last_expr = Expr::Logical(LogicalExpr {
                left: Box::new(last_expr),
                operator: Operator::new(LogicalOperator::And, token),
                right: Box::new(self.parse_equality_expr()?),
            });
        }

        Ok(last_expr)
    }
    fn parse_equality_expr(&mut self) -> Result<Expr, ParserError> {
        let mut last_expr = self.parse_comparison_expr()?;

        while let Some(operator) = self.consume_match(|token| match token.kind {
            TokenKind::BangEqual => Some(BinaryOperator::NotEqualTo),
            TokenKind::EqualEqual => Some(BinaryOperator::EqualTo),
            _ => None,
        }) {
            last_expr = Expr::Binary(BinaryExpr {
                left: Box::new(last_expr),
                operator,
                right: Box::new(self.parse_comparison_expr()?),
            });
        }

        Ok(last_expr)
    }
    fn parse_comparison_expr(&mut self) -> Result<Expr, ParserError> {
        let mut last_expr = self.parse_term_expr()?;

        while let Some(operator) = self.consume_match(|token| match token.kind {
            TokenKind::Less => Some(BinaryOperator::LessThan),
            TokenKind::LessEqual => Some(BinaryOperator::LessThanOrEqualTo),
            TokenKind::Greater => Some(BinaryOperator::GreaterThan),
            TokenKind::GreaterEqual => Some(BinaryOperator::GreaterThanOrEqualTo),
            _ => None,
        }) {
            last_expr = Expr::Binary(BinaryExpr {
                left: Box::new(last_expr),
                operator,
                right: Box::new(self.parse_term_expr()?),
            });
        }

        Ok(last_expr)
    }
    fn parse_term_expr(&mut self) -> Result<Expr, ParserError> {
        let mut last_expr = self.parse_factor_expr()?;

        while let Some(operator) = self.consume_match(|token| match token.kind {
            TokenKind::Minus => Some(BinaryOperator::Minus),
            TokenKind::Plus => Some(BinaryOperator::Plus),
            _ => None,
        }) {
            last_expr = Expr::Binary(BinaryExpr {
                left: Box::new(last_expr),
                operator,
                right: Box::new(self.parse_factor_expr()?),
            });
        }

        Ok(last_expr)
    }
    fn parse_factor_expr(&mut self) -> Result<Expr, ParserError> {
        let mut last_expr = self.parse_unary_expr()?;

        while let Some(operator) = self.consume_match(|token| match token.kind {
            TokenKind::Star => Some(BinaryOperator::Multiply),
            TokenKind::Slash => Some(BinaryOperator::Divide),
            _ => None,
        }) {
            last_expr = Expr::Binary(BinaryExpr {
                left: Box::new(last_expr),
                operator,
                right: Box::new(self.parse_unary_expr()?),
            });
        }

        Ok(last_expr)
    }
    fn parse_unary_expr(&mut self) -> Result<Expr, ParserError> {
        ensure_sufficient_stack(|| {
            if let Some(operator) = self.consume_match(|token| match token.kind {
                TokenKind::Minus => Some(UnaryOperator::Minus),
                TokenKind::Bang => Some(UnaryOperator::Not),
                _ => None,
            }) {
                Ok(Expr::Unary(UnaryExpr {
                    operator,
                    right: Box::new(self.parse_unary_expr()?),
                }))
            } else {
                self.parse_call_expr()
            }
        })
    }
    fn parse_call_expr(&mut self) -> Result<Expr, ParserError> {
        let mut expr = self.parse_primary_expr()?;
        loop {
            if self.consume_token(TokenKind::LeftParen).is_some() {
                expr = self.finish_call(expr)?;
            } else if self.consume_token(TokenKind::Dot).is_some() {
                let name =
                    self.consume_token_or_error(TokenKind::Identifier, "property name after '.'")?;
                expr = Expr::Get(GetExpr {
                    object: Box::new(expr),
                    name,
                });
            } else {
                break;
            }
        }
        Ok(expr)
    }
    fn finish_call(&mut self, callee: Expr) -> Result<Expr, ParserError> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    let token = self.peek();
                    let err = ParserError::TooManyArguments {
                        site: ErrorSite::of(token),
                        span: token.span,
                    };
                    self.recovered_errors.push(err);
                }
                arguments.push(self.parse_expr()?);
                if self.consume_token(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let paren = self.consume_token_or_error(TokenKind::RightParen, "')' after arguments")?;
        Ok(Expr::Call(CallExpr {
            callee: Box::new(callee),
            paren,
            arguments,
        }))
    }
    fn parse_primary_expr(&mut self) -> Result<Expr, ParserError> {
        let token = self.peek();
        let literal = match (&token.kind, &token.literal) {
            (TokenKind::False, _) => Some(LiteralValue::Boolean(false)),
            (TokenKind::True, _) => Some(LiteralValue::Boolean(true)),
            (TokenKind::Nil, _) => Some(LiteralValue::Nil),
            (TokenKind::Number, Some(Literal::Number(number))) => {
                Some(LiteralValue::Number(*number))
            }
            (TokenKind::String, Some(Literal::String(string))) => {
                Some(LiteralValue::String(Rc::new(string.clone())))
            }
            _ => None,
        };
        if let Some(value) = literal {
            let source_span = self.advance().span;
            return Ok(Expr::Literal(LiteralExpr { value, source_span }));
        }

        if let Some(keyword) = self.consume_token(TokenKind::This) {
            return Ok(Expr::This(ThisExpr {
                id: UniqueId::new(),
                keyword,
            }));
        }

        if let Some(name) = self.consume_token(TokenKind::Identifier) {
            return Ok(Expr::Variable(VariableExpr {
                id: UniqueId::new(),
                name,
            }));
        }

        if self.consume_token(TokenKind::LeftParen).is_some() {
            let expr = self.parse_expr()?;
            self.consume_token_or_error(TokenKind::RightParen, "')' after expression")?;
            return Ok(Expr::Grouping(GroupingExpr {
                expr: Box::new(expr),
            }));
        }

        let unknown = self.peek();
        Err(ParserError::ExpectedExpression {
            site: ErrorSite::of(unknown),
            span: unknown.span,
        })
    }
    /// Skips tokens up to the next likely statement boundary.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            if matches!(
                self.peek().kind,
                TokenKind::Class
                    | TokenKind::Fun
                    | TokenKind::Var
                    | TokenKind::For
                    | TokenKind::If
                    | TokenKind::While
                    | TokenKind::Print
                    | TokenKind::Return
            ) {
                return;
            }
            self.advance();
        }
    }
    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }
    fn peek(&self) -> &Token {
        // `new` guarantees a trailing Eof, which is never consumed
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }
    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }
    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }
    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }
    /// Consumes the next token if `check` maps it to an operator kind.
    fn consume_match<T, F: Fn(&Token) -> Option<T>>(&mut self, check: F) -> Option<Operator<T>> {
        let kind = check(self.peek())?;
        let token = self.advance().clone();
        Some(Operator::new(kind, token))
    }
    fn consume_token(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) && !self.is_at_end() {
            Some(self.advance().clone())
        } else {
            None
        }
    }
    fn consume_token_or_error(
        &mut self,
        kind: TokenKind,
        expected: &str,
    ) -> Result<Token, ParserError> {
        match self.consume_token(kind) {
            Some(token) => Ok(token),
            None => {
                let actual = self.peek();
                Err(ParserError::Expected {
                    expected: expected.to_string(),
                    site: ErrorSite::of(actual),
                    span: actual.span,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> (Program, Vec<ParserError>) {
        let (tokens, scan_errors) = scan(source);
        assert_eq!(scan_errors, vec![]);
        Parser::parse(tokens, ParserOpts::default())
    }

    fn parse_ok(source: &str) -> String {
        let (program, errors) = parse(source);
        assert_eq!(errors, vec![]);
        program.to_string()
    }

    fn error_summary(source: &str) -> Vec<(usize, String)> {
        parse(source)
            .1
            .into_iter()
            .map(|err| (err.site().line, format!("{}{}", err.site().location, err)))
            .collect()
    }

    #[test]
    fn precedence() {
        assert_eq!(
            parse_ok("1 + 2 * 3 - -4 / (5);"),
            "(; (- (+ 1 (* 2 3)) (/ (- 4) (group 5))))\n"
        );
        assert_eq!(
            parse_ok("a == b < c or !d and e;"),
            "(; (or (== a (< b c)) (and (! d) e)))\n"
        );
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_eq!(parse_ok("a = b = 3;"), "(; (= a (= b 3)))\n");
    }

    #[test]
    fn property_assignment_becomes_set() {
        assert_eq!(
            parse_ok("a.b(1).c = \"x\";"),
            "(; (= (. (call (. a b) 1) c) \"x\"))\n"
        );
    }

    #[test]
    fn for_desugars_to_while() {
        assert_eq!(
            parse_ok("for (var i = 0; i < 3; i = i + 1) print i;"),
            "(block (var i 0) (while (< i 3) (block (print i) (; (= i (+ i 1))))))\n"
        );
        assert_eq!(parse_ok("for (;;) print 1;"), "(while true (print 1))\n");
        assert_eq!(
            parse_ok("for (x = 0; x < 1;) {}"),
            "(block (; (= x 0)) (while (< x 1) (block)))\n"
        );
    }

    #[test]
    fn declarations() {
        assert_eq!(
            parse_ok("fun add(a, b) { return a + b; } var c; class Box { get() { return this.v; } }"),
            "(fun add (a b) (return (+ a b)))\n(var c)\n(class Box (fun get () (return (. this v))))\n"
        );
        assert_eq!(
            parse_ok("if (a) print 1; else if (b) return; else {}"),
            "(if a (print 1) (if b (return) (block)))\n"
        );
    }

    #[test]
    fn missing_semicolon() {
        assert_eq!(
            error_summary("print 1\nprint 2;"),
            vec![(2, " at 'print': Expect ';' after value.".to_string())]
        );
        assert_eq!(
            error_summary("var a = 1"),
            vec![(
                1,
                " at end: Expect ';' after variable declaration.".to_string()
            )]
        );
    }

    #[test]
    fn repl_mode_allows_final_semicolon_to_be_omitted() {
        let (tokens, _) = scan("var a = 1; print a");
        let (program, errors) = Parser::parse(tokens, ParserOpts::default().for_repl());
        assert_eq!(errors, vec![]);
        assert_eq!(program.to_string(), "(var a 1)\n(print a)\n");

        let (tokens, _) = scan("print a print b");
        let (_, errors) = Parser::parse(tokens, ParserOpts::default().for_repl());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn recovers_at_declaration_boundaries() {
        let (program, errors) = parse("var = 1;\nprint 2;\nfun (;\nprint 3;\n1 +;\nprint 4;");
        assert_eq!(program.to_string(), "(print 2)\n(print 3)\n(print 4)\n");
        assert_eq!(
            errors
                .iter()
                .map(|err| (err.site().line, err.to_string()))
                .collect::<Vec<_>>(),
            vec![
                (1, "Expect variable name.".to_string()),
                (3, "Expect function name.".to_string()),
                (5, "Expect expression.".to_string()),
            ]
        );
    }

    #[test]
    fn recovers_inside_blocks() {
        let (program, errors) = parse("{ print ; print 1; }");
        assert_eq!(program.to_string(), "(block (print 1))\n");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn invalid_assignment_target_keeps_parsing() {
        let (program, errors) = parse("a + b = c;\nprint 1;");
        assert_eq!(program.to_string(), "(; c)\n(print 1)\n");
        assert_eq!(
            errors
                .iter()
                .map(|err| format!("{}{}", err.site().location, err))
                .collect::<Vec<_>>(),
            vec![" at '=': Invalid assignment target.".to_string()]
        );
    }

    #[test]
    fn arity_limits() {
        let params = (0..256).map(|i| format!("p{}", i)).collect::<Vec<_>>();
        let source = format!("fun f({}) {{}}", params.join(", "));
        let (program, errors) = parse(&source);
        assert_eq!(program.statements.len(), 1);
        assert_eq!(
            errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["Can't have more than 255 parameters.".to_string()]
        );
        assert_eq!(errors[0].site().location.to_string(), " at 'p255'");

        let args = (0..256).map(|i| i.to_string()).collect::<Vec<_>>();
        let (_, errors) = parse(&format!("f({});", args.join(", ")));
        assert_eq!(
            errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["Can't have more than 255 arguments.".to_string()]
        );

        let args = (0..255).map(|i| i.to_string()).collect::<Vec<_>>();
        assert_eq!(parse(&format!("f({});", args.join(", "))).1, vec![]);
    }

    #[test]
    fn each_variable_reference_gets_its_own_identity() {
        let (program, _) = parse("a; a;");
        let ids = program
            .statements
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Expression(ExpressionStmt {
                    expression: Expr::Variable(var),
                }) => Some(var.id),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn tolerates_token_stream_without_eof() {
        let (mut tokens, _) = scan("print 1;");
        tokens.pop();
        let (program, errors) = Parser::parse(tokens, ParserOpts::default());
        assert_eq!(errors, vec![]);
        assert_eq!(program.statements.len(), 1);
    }
}
