use std::{
    fmt::{Debug, Display},
    ops::Deref,
    rc::Rc,
};

use itertools::Itertools;

use crate::{
    scanner::Token,
    side_table::{Unique, UniqueId},
    source::SourceSpan,
};

/// An operator kind together with the token it was parsed from, so runtime
/// errors can point at the operator.
#[derive(Debug, Clone)]
pub struct Operator<T> {
    kind: T,
    token: Token,
}

impl<T> Operator<T> {
    pub fn new(kind: T, token: Token) -> Self {
        Self { kind, token }
    }
    pub fn token(&self) -> &Token {
        &self.token
    }
}
impl<T> Deref for Operator<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

pub trait AstNode {
    fn source_span(&self) -> SourceSpan;
}

#[derive(Debug, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}
impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stmt in self.statements.iter() {
            writeln!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

// Expressions

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Nil,
    Boolean(bool),
    Number(f64),
    String(Rc<String>),
}
impl Display for LiteralValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Boolean(value) => write!(f, "{}", value),
            Self::Number(value) => write!(f, "{}", value),
            Self::String(value) => write!(f, "{:?}", value),
        }
    }
}

#[derive(Debug)]
pub struct LiteralExpr {
    pub value: LiteralValue,
    pub source_span: SourceSpan,
}
impl Display for LiteralExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.value, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    NotEqualTo,
    EqualTo,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
}
impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::NotEqualTo => "!=",
            Self::EqualTo => "==",
            Self::LessThan => "<",
            Self::LessThanOrEqualTo => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqualTo => ">=",
        })
    }
}

#[derive(Debug)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: Operator<BinaryOperator>,
    pub right: Box<Expr>,
}
impl Display for BinaryExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", *self.operator, self.left, self.right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}
impl Display for LogicalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::And => "and",
            Self::Or => "or",
        })
    }
}

/// Short-circuiting `and` / `or`.
#[derive(Debug)]
pub struct LogicalExpr {
    pub left: Box<Expr>,
    pub operator: Operator<LogicalOperator>,
    pub right: Box<Expr>,
}
impl Display for LogicalExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", *self.operator, self.left, self.right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
}
impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Minus => f.write_str("-"),
            Self::Not => f.write_str("!"),
        }
    }
}

#[derive(Debug)]
pub struct UnaryExpr {
    pub operator: Operator<UnaryOperator>,
    pub right: Box<Expr>,
}
impl Display for UnaryExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {})", *self.operator, self.right)
    }
}

#[derive(Debug)]
pub struct GroupingExpr {
    pub expr: Box<Expr>,
}
impl Display for GroupingExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(group {})", self.expr)
    }
}

#[derive(Debug)]
pub struct VariableExpr {
    pub id: UniqueId,
    pub name: Token,
}
impl Unique for VariableExpr {
    fn id(&self) -> UniqueId {
        self.id
    }
}
impl Display for VariableExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name.lexeme)
    }
}

#[derive(Debug)]
pub struct AssignExpr {
    pub id: UniqueId,
    pub name: Token,
    pub value: Box<Expr>,
}
impl Unique for AssignExpr {
    fn id(&self) -> UniqueId {
        self.id
    }
}
impl Display for AssignExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(= {} {})", self.name.lexeme, self.value)
    }
}

#[derive(Debug)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    /// The closing parenthesis; call-site runtime errors report its line.
    pub paren: Token,
    pub arguments: Vec<Expr>,
}
impl Display for CallExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(call {}", self.callee)?;
        for argument in self.arguments.iter() {
            write!(f, " {}", argument)?;
        }
        f.write_str(")")
    }
}

#[derive(Debug)]
pub struct GetExpr {
    pub object: Box<Expr>,
    pub name: Token,
}
impl Display for GetExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(. {} {})", self.object, self.name.lexeme)
    }
}

#[derive(Debug)]
pub struct SetExpr {
    pub object: Box<Expr>,
    pub name: Token,
    pub value: Box<Expr>,
}
impl Display for SetExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(= (. {} {}) {})", self.object, self.name.lexeme, self.value)
    }
}

#[derive(Debug)]
pub struct ThisExpr {
    pub id: UniqueId,
    pub keyword: Token,
}
impl Unique for ThisExpr {
    fn id(&self) -> UniqueId {
        self.id
    }
}

#[derive(Debug)]
pub enum Expr {
    Assign(AssignExpr),
    Binary(BinaryExpr),
    Call(CallExpr),
    Get(GetExpr),
    Grouping(GroupingExpr),
    Literal(LiteralExpr),
    Logical(LogicalExpr),
    Set(SetExpr),
    This(ThisExpr),
    Unary(UnaryExpr),
    Variable(VariableExpr),
}
impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assign(expr) => Display::fmt(expr, f),
            Self::Binary(expr) => Display::fmt(expr, f),
            Self::Call(expr) => Display::fmt(expr, f),
            Self::Get(expr) => Display::fmt(expr, f),
            Self::Grouping(expr) => Display::fmt(expr, f),
            Self::Literal(expr) => Display::fmt(expr, f),
            Self::Logical(expr) => Display::fmt(expr, f),
            Self::Set(expr) => Display::fmt(expr, f),
            Self::This(_) => f.write_str("this"),
            Self::Unary(expr) => Display::fmt(expr, f),
            Self::Variable(expr) => Display::fmt(expr, f),
        }
    }
}
impl AstNode for Expr {
    fn source_span(&self) -> SourceSpan {
        match self {
            Self::Assign(expr) => expr.name.span.to(expr.value.source_span()),
            Self::Binary(expr) => expr.left.source_span().to(expr.right.source_span()),
            Self::Call(expr) => expr.callee.source_span().to(expr.paren.span),
            Self::Get(expr) => expr.object.source_span().to(expr.name.span),
            Self::Grouping(expr) => expr.expr.source_span(),
            Self::Literal(expr) => expr.source_span,
            Self::Logical(expr) => expr.left.source_span().to(expr.right.source_span()),
            Self::Set(expr) => expr.object.source_span().to(expr.value.source_span()),
            Self::This(expr) => expr.keyword.span,
            Self::Unary(expr) => expr.operator.token().span.to(expr.right.source_span()),
            Self::Variable(expr) => expr.name.span,
        }
    }
}

// Statements

/// A named function or method. Shared between the tree and every runtime
/// function value created from it.
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: Token,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}
impl Display for FunctionDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(fun {} ({})",
            self.name.lexeme,
            self.params.iter().map(|param| &param.lexeme).join(" ")
        )?;
        for stmt in self.body.iter() {
            write!(f, " {}", stmt)?;
        }
        f.write_str(")")
    }
}

#[derive(Debug)]
pub struct BlockStmt {
    pub statements: Vec<Stmt>,
}
impl Display for BlockStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("(block")?;
        for stmt in self.statements.iter() {
            write!(f, " {}", stmt)?;
        }
        f.write_str(")")
    }
}

#[derive(Debug)]
pub struct ClassStmt {
    pub name: Token,
    pub methods: Vec<Rc<FunctionDecl>>,
}
impl Display for ClassStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(class {}", self.name.lexeme)?;
        for method in self.methods.iter() {
            write!(f, " {}", method)?;
        }
        f.write_str(")")
    }
}

#[derive(Debug)]
pub struct ExpressionStmt {
    pub expression: Expr,
}
impl Display for ExpressionStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(; {})", self.expression)
    }
}

#[derive(Debug)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
}
impl Display for IfStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.else_branch {
            Some(else_branch) => write!(
                f,
                "(if {} {} {})",
                self.condition, self.then_branch, else_branch
            ),
            None => write!(f, "(if {} {})", self.condition, self.then_branch),
        }
    }
}

#[derive(Debug)]
pub struct PrintStmt {
    pub keyword: Token,
    pub expression: Expr,
}
impl Display for PrintStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(print {})", self.expression)
    }
}

#[derive(Debug)]
pub struct ReturnStmt {
    pub keyword: Token,
    pub value: Option<Expr>,
}
impl Display for ReturnStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(value) => write!(f, "(return {})", value),
            None => f.write_str("(return)"),
        }
    }
}

#[derive(Debug)]
pub struct VarStmt {
    pub name: Token,
    pub initializer: Option<Expr>,
}
impl Display for VarStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.initializer {
            Some(init) => write!(f, "(var {} {})", self.name.lexeme, init),
            None => write!(f, "(var {})", self.name.lexeme),
        }
    }
}

#[derive(Debug)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
}
impl Display for WhileStmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(while {} {})", self.condition, self.body)
    }
}

#[derive(Debug)]
pub enum Stmt {
    Block(BlockStmt),
    Class(ClassStmt),
    Expression(ExpressionStmt),
    Function(Rc<FunctionDecl>),
    If(IfStmt),
    Print(PrintStmt),
    Return(ReturnStmt),
    Var(VarStmt),
    While(WhileStmt),
}
impl Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Block(stmt) => Display::fmt(stmt, f),
            Self::Class(stmt) => Display::fmt(stmt, f),
            Self::Expression(stmt) => Display::fmt(stmt, f),
            Self::Function(decl) => Display::fmt(decl, f),
            Self::If(stmt) => Display::fmt(stmt, f),
            Self::Print(stmt) => Display::fmt(stmt, f),
            Self::Return(stmt) => Display::fmt(stmt, f),
            Self::Var(stmt) => Display::fmt(stmt, f),
            Self::While(stmt) => Display::fmt(stmt, f),
        }
    }
}
