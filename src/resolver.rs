use std::collections::HashMap;

use log::debug;
use miette::Diagnostic;
use thiserror::Error;

use crate::{
    ast::*,
    diagnostics::ErrorSite,
    scanner::Token,
    side_table::{SideTable, Unique},
    stack::ensure_sufficient_stack,
    SourceSpan,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeEntryStatus {
    Declared,
    Defined,
}

#[derive(Debug, Clone)]
struct ScopeEntry {
    declared_at: SourceSpan,
    status: ScopeEntryStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
}

type Scope = HashMap<String, ScopeEntry>;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ResolverError {
    #[error("Can't read local variable in its own initializer.")]
    #[diagnostic(code(lox::resolver::variable_used_in_own_initializer))]
    VariableUsedInOwnInitializer {
        site: ErrorSite,
        #[label("Variable is being declared here")]
        declared_at: SourceSpan,
        #[label("Variable is being used here")]
        used_at: SourceSpan,
    },
    #[error("Already a variable with this name in this scope.")]
    #[diagnostic(code(lox::resolver::variable_already_declared))]
    VariableAlreadyDeclared {
        name: String,
        site: ErrorSite,
        #[label("'{name}' is declared in the same scope again here")]
        found_at: SourceSpan,
        #[label("'{name}' was first declared here")]
        first_found_at: SourceSpan,
    },
    #[error("Can't return from top-level code.")]
    #[diagnostic(code(lox::resolver::return_from_top_level))]
    ReturnFromTopLevel {
        site: ErrorSite,
        #[label("Return outside of function found here")]
        found_at: SourceSpan,
    },
}
impl ResolverError {
    pub fn site(&self) -> &ErrorSite {
        match self {
            Self::VariableUsedInOwnInitializer { site, .. }
            | Self::VariableAlreadyDeclared { site, .. }
            | Self::ReturnFromTopLevel { site, .. } => site,
        }
    }
}

/// Scope distance for every local `Variable`, `Assign` and `This` node. Nodes
/// without an entry are globals.
pub type Resolutions = SideTable<usize>;

pub struct Resolver<'a> {
    scopes: Vec<Scope>,
    current_function: FunctionType,
    errors: Vec<ResolverError>,
    resolutions: &'a mut Resolutions,
}

impl Resolver<'_> {
    /// Runs over the whole program even after errors, so every problem is
    /// reported in one pass.
    pub fn resolve(
        program: &Program,
        resolutions: &mut Resolutions,
    ) -> Result<(), Vec<ResolverError>> {
        let mut resolver = Resolver {
            scopes: Vec::new(),
            current_function: FunctionType::None,
            errors: Vec::new(),
            resolutions,
        };
        resolver.resolve_block(&program.statements);
        if resolver.errors.is_empty() {
            Ok(())
        } else {
            Err(resolver.errors)
        }
    }
    fn resolve_block(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.resolve_stmt(stmt);
        }
    }
    fn resolve_stmt(&mut self, stmt: &Stmt) {
        ensure_sufficient_stack(|| {
            match stmt {
                Stmt::Block(stmt) => {
                    self.begin_scope();
                    self.resolve_block(&stmt.statements);
                    self.end_scope();
                }
                Stmt::Class(stmt) => {
                    self.declare(&stmt.name);
                    self.define(&stmt.name);

                    self.begin_scope();
                    if let Some(scope) = self.scopes.last_mut() {
                        scope.insert(
                            "this".to_string(),
                            ScopeEntry {
                                declared_at: stmt.name.span,
                                status: ScopeEntryStatus::Defined,
                            },
                        );
                    }
                    for method in stmt.methods.iter() {
                        self.resolve_function(method, FunctionType::Method);
                    }
                    self.end_scope();
                }
                Stmt::Expression(stmt) => {
                    self.resolve_expr(&stmt.expression);
                }
                Stmt::Function(decl) => {
                    // Defined before the body so the function can recurse.
                    self.declare(&decl.name);
                    self.define(&decl.name);
                    self.resolve_function(decl, FunctionType::Function);
                }
                Stmt::If(stmt) => {
                    self.resolve_expr(&stmt.condition);
                    self.resolve_stmt(&stmt.then_branch);
                    if let Some(else_branch) = &stmt.else_branch {
                        self.resolve_stmt(else_branch);
                    }
                }
                Stmt::Print(stmt) => {
                    self.resolve_expr(&stmt.expression);
                }
                Stmt::Return(stmt) => {
                    if self.current_function == FunctionType::None {
                        self.errors.push(ResolverError::ReturnFromTopLevel {
                            site: ErrorSite::of(&stmt.keyword),
                            found_at: stmt.keyword.span,
                        })
                    }
                    if let Some(value) = &stmt.value {
                        self.resolve_expr(value);
                    }
                }
                Stmt::Var(stmt) => {
                    self.declare(&stmt.name);
                    if let Some(initializer) = &stmt.initializer {
                        self.resolve_expr(initializer);
                    }
                    self.define(&stmt.name);
                }
                Stmt::While(stmt) => {
                    self.resolve_expr(&stmt.condition);
                    self.resolve_stmt(&stmt.body);
                }
            }
        })
    }
    /// Parameters get their own scope and the body a nested one, matching the
    /// two environments the interpreter creates for a call.
    fn resolve_function(&mut self, decl: &FunctionDecl, function_type: FunctionType) {
        let enclosing_function = self.current_function;
        self.current_function = function_type;

        self.begin_scope();
        for param in decl.params.iter() {
            self.declare(param);
            self.define(param);
        }
        self.begin_scope();
        self.resolve_block(&decl.body);
        self.end_scope();
        self.end_scope();

        self.current_function = enclosing_function;
    }
    fn resolve_expr(&mut self, expr: &Expr) {
        ensure_sufficient_stack(|| {
            match expr {
                Expr::Assign(expr) => {
                    self.resolve_expr(&expr.value);
                    self.resolve_local(expr, &expr.name);
                }
                Expr::Binary(expr) => {
                    self.resolve_expr(&expr.left);
                    self.resolve_expr(&expr.right);
                }
                Expr::Call(expr) => {
                    self.resolve_expr(&expr.callee);
                    for argument in expr.arguments.iter() {
                        self.resolve_expr(argument);
                    }
                }
                Expr::Get(expr) => {
                    self.resolve_expr(&expr.object);
                }
                Expr::Grouping(expr) => {
                    self.resolve_expr(&expr.expr);
                }
                Expr::Literal(_) => {}
                Expr::Logical(expr) => {
                    self.resolve_expr(&expr.left);
                    self.resolve_expr(&expr.right);
                }
                Expr::Set(expr) => {
                    self.resolve_expr(&expr.value);
                    self.resolve_expr(&expr.object);
                }
                Expr::This(expr) => {
                    self.resolve_local(expr, &expr.keyword);
                }
                Expr::Unary(expr) => {
                    self.resolve_expr(&expr.right);
                }
                Expr::Variable(expr) => {
                    if let Some(ScopeEntry {
                        status: ScopeEntryStatus::Declared,
                        declared_at,
                    }) = self.get_entry(&expr.name.lexeme)
                    {
                        self.errors
                            .push(ResolverError::VariableUsedInOwnInitializer {
                                site: ErrorSite::of(&expr.name),
                                declared_at,
                                used_at: expr.name.span,
                            })
                    }
                    self.resolve_local(expr, &expr.name);
                }
            }
        })
    }
    fn resolve_local(&mut self, node: &impl Unique, name: &Token) {
        let indexed_scope = self
            .scopes
            .iter()
            .rev()
            .enumerate()
            .find(|(_, scope)| scope.contains_key(&name.lexeme));

        match indexed_scope {
            Some((distance, _)) => {
                debug!(
                    "resolved '{}' on line {} at distance {}",
                    name.lexeme, name.line, distance
                );
                self.resolutions.set(node, distance);
            }
            None => debug!("'{}' on line {} left global", name.lexeme, name.line),
        }
    }
    fn begin_scope(&mut self) {
        self.scopes.push(Scope::new());
    }
    fn end_scope(&mut self) {
        self.scopes.pop();
    }
    fn declare(&mut self, name: &Token) {
        if let Some(current_scope) = self.scopes.last_mut() {
            if let Some(entry) = current_scope.get(&name.lexeme) {
                self.errors.push(ResolverError::VariableAlreadyDeclared {
                    name: name.lexeme.clone(),
                    site: ErrorSite::of(name),
                    found_at: name.span,
                    first_found_at: entry.declared_at,
                });
                return;
            }
            current_scope.insert(
                name.lexeme.clone(),
                ScopeEntry {
                    status: ScopeEntryStatus::Declared,
                    declared_at: name.span,
                },
            );
        }
    }
    fn define(&mut self, name: &Token) {
        if let Some(entry) = self
            .scopes
            .last_mut()
            .and_then(|scope| scope.get_mut(&name.lexeme))
        {
            entry.status = ScopeEntryStatus::Defined;
        }
    }
    fn get_entry(&self, name: &str) -> Option<ScopeEntry> {
        self.scopes
            .last()
            .and_then(|scope| scope.get(name).cloned())
    }
}
