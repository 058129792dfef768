mod completion;
mod environment;
mod error;
mod lox_callable;
mod lox_class;
mod lox_function;
mod lox_instance;
mod lox_native_function;
mod runtime_value;

use crate::{
    ast::*,
    resolver::{Resolutions, Resolver, ResolverError},
    scanner::Token,
    side_table::{SideTable, Unique, UniqueId},
    stack::ensure_sufficient_stack,
};
use completion::Completion;
use environment::{Environment, EnvironmentRef};
pub use error::RuntimeError;
pub use lox_callable::{Callable, LoxCallable};
use log::{debug, info};
pub use runtime_value::*;
use std::{io::Write, mem};

/// Interpreted call depth allowed by default before `Stack overflow.` is
/// raised.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterOptions {
    /// `None` removes the limit; runaway recursion then grows the stack until
    /// memory runs out.
    pub max_call_depth: Option<usize>,
}
impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            max_call_depth: Some(DEFAULT_MAX_CALL_DEPTH),
        }
    }
}
impl InterpreterOptions {
    pub fn with_max_call_depth(self, max_call_depth: Option<usize>) -> Self {
        Self { max_call_depth }
    }
}

pub struct Interpreter<Stdout: Write> {
    environment: EnvironmentRef,
    globals: EnvironmentRef,
    stdout: Stdout,
    resolutions: Resolutions,
    options: InterpreterOptions,
    call_depth: usize,
    id: UniqueId,
}

/// A program that passed resolution against one particular interpreter.
pub struct PreparedProgram(UniqueId, Program);
impl PreparedProgram {
    pub fn program(&self) -> &Program {
        &self.1
    }
}

impl<Stdout: Write> Interpreter<Stdout> {
    pub fn new(stdout: Stdout) -> Self {
        Self::with_options(stdout, InterpreterOptions::default())
    }
    pub fn with_options(stdout: Stdout, options: InterpreterOptions) -> Self {
        let globals = Environment::new().wrap();
        let mut interpreter = Self {
            environment: globals.clone(),
            globals,
            stdout,
            resolutions: SideTable::new(),
            options,
            call_depth: 0,
            id: UniqueId::new(),
        };
        interpreter.define_native_fn("clock", 0, lox_native_function::natives::clock);
        interpreter
    }
    /// Resolves `program`, recording its scope distances in this
    /// interpreter. Only a prepared program can be interpreted.
    pub fn prepare(&mut self, program: Program) -> Result<PreparedProgram, Vec<ResolverError>> {
        Resolver::resolve(&program, &mut self.resolutions)?;
        info!(
            "resolved {} statements, {} local references known",
            program.statements.len(),
            self.resolutions.len()
        );
        Ok(PreparedProgram(self.id, program))
    }
    /// Runs the statements in order. The first runtime error abandons the
    /// rest of the program. Globals persist into the next call.
    pub fn interpret(&mut self, program: &PreparedProgram) -> Result<(), RuntimeError> {
        assert_eq!(
            program.0, self.id,
            "a program must be prepared by the interpreter that runs it"
        );
        info!("interpreting {} statements", program.1.statements.len());
        for stmt in program.1.statements.iter() {
            if let Err(err) = self.execute(stmt) {
                info!("aborted by runtime error on line {}", err.line());
                return Err(err);
            }
        }
        Ok(())
    }
    pub fn resolutions(&self) -> &Resolutions {
        &self.resolutions
    }
    pub fn output(&self) -> &Stdout {
        &self.stdout
    }
    pub fn into_output(self) -> Stdout {
        self.stdout
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<Completion, RuntimeError> {
        ensure_sufficient_stack(|| {
            match stmt {
                Stmt::Block(stmt) => self.execute_block(
                    &stmt.statements,
                    Environment::new_with_parent(self.environment.clone()).wrap(),
                ),
                Stmt::Class(stmt) => {
                    let methods = stmt
                        .methods
                        .iter()
                        .map(|method| {
                            lox_function::LoxFunction::new(method.clone(), self.environment.clone())
                        })
                        .collect();
                    debug!("defining class {}", stmt.name.lexeme);
                    let class = lox_class::LoxClass::new(&stmt.name.lexeme, methods);
                    self.environment
                        .borrow_mut()
                        .define(&stmt.name.lexeme, class.into());
                    Ok(Completion::Normal)
                }
                Stmt::Expression(stmt) => {
                    self.eval_expr(&stmt.expression)?;
                    Ok(Completion::Normal)
                }
                Stmt::Function(decl) => {
                    let function = lox_function::LoxFunction::new(decl.clone(), self.environment.clone());
                    self.environment
                        .borrow_mut()
                        .define(&decl.name.lexeme, function.into());
                    Ok(Completion::Normal)
                }
                Stmt::If(stmt) => {
                    if self.eval_expr(&stmt.condition)?.is_truthy() {
                        self.execute(&stmt.then_branch)
                    } else if let Some(else_branch) = &stmt.else_branch {
                        self.execute(else_branch)
                    } else {
                        Ok(Completion::Normal)
                    }
                }
                Stmt::Print(stmt) => {
                    let value = self.eval_expr(&stmt.expression)?;
                    writeln!(self.stdout, "{}", value).map_err(|source| RuntimeError::Output {
                        line: stmt.keyword.line,
                        source,
                    })?;
                    Ok(Completion::Normal)
                }
                Stmt::Return(stmt) => {
                    let value = match &stmt.value {
                        Some(value) => self.eval_expr(value)?,
                        None => RuntimeValue::Nil,
                    };
                    Ok(Completion::Return(value))
                }
                Stmt::Var(stmt) => {
                    let value = match &stmt.initializer {
                        Some(initializer) => self.eval_expr(initializer)?,
                        None => RuntimeValue::Nil,
                    };
                    self.environment
                        .borrow_mut()
                        .define(&stmt.name.lexeme, value);
                    Ok(Completion::Normal)
                }
                Stmt::While(stmt) => {
                    while self.eval_expr(&stmt.condition)?.is_truthy() {
                        let completion = self.execute(&stmt.body)?;
                        if !completion.is_normal() {
                            return Ok(completion);
                        }
                    }
                    Ok(Completion::Normal)
                }
            }
        })
    }
    /// Executes `statements` inside `environment`; the previous environment
    /// is restored whether they complete, return or fail.
    pub(crate) fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: EnvironmentRef,
    ) -> Result<Completion, RuntimeError> {
        self.run_with_env(environment, |interpreter| {
            for stmt in statements {
                let completion = interpreter.execute(stmt)?;
                if !completion.is_normal() {
                    return Ok(completion);
                }
            }
            Ok(Completion::Normal)
        })
    }
    fn eval_expr(&mut self, expr: &Expr) -> Result<RuntimeValue, RuntimeError> {
        ensure_sufficient_stack(|| {
            match expr {
                Expr::Assign(expr) => {
                    let value = self.eval_expr(&expr.value)?;
                    match self.resolutions.get(expr) {
                        Some(distance) => self.environment.borrow_mut().assign_at(
                            *distance,
                            &expr.name,
                            value.clone(),
                        )?,
                        None => self.globals.borrow_mut().assign(&expr.name, value.clone())?,
                    }
                    Ok(value)
                }
                Expr::Binary(expr) => self.eval_binary(expr),
                Expr::Call(expr) => self.eval_call(expr),
                Expr::Get(expr) => match self.eval_expr(&expr.object)? {
                    RuntimeValue::Instance(instance) => instance.get(&expr.name),
                    other => Err(RuntimeError::NotAnInstance {
                        actual_type: other.type_of(),
                        line: expr.name.line,
                        span: expr.name.span,
                    }),
                },
                Expr::Grouping(expr) => self.eval_expr(&expr.expr),
                Expr::Literal(expr) => Ok((&expr.value).into()),
                Expr::Logical(expr) => {
                    let left = self.eval_expr(&expr.left)?;
                    let short_circuits = match *expr.operator {
                        LogicalOperator::Or => left.is_truthy(),
                        LogicalOperator::And => !left.is_truthy(),
                    };
                    if short_circuits {
                        Ok(left)
                    } else {
                        self.eval_expr(&expr.right)
                    }
                }
                Expr::Set(expr) => {
                    let instance = match self.eval_expr(&expr.object)? {
                        RuntimeValue::Instance(instance) => instance,
                        other => {
                            return Err(RuntimeError::FieldsOnNonInstance {
                                actual_type: other.type_of(),
                                line: expr.name.line,
                                span: expr.name.span,
                            })
                        }
                    };
                    let value = self.eval_expr(&expr.value)?;
                    instance.set(&expr.name, value.clone());
                    Ok(value)
                }
                Expr::This(expr) => self.look_up_variable(&expr.keyword, expr),
                Expr::Unary(expr) => {
                    let right = self.eval_expr(&expr.right)?;
                    match *expr.operator {
                        UnaryOperator::Minus => right
                            .as_number()
                            .map(|value| RuntimeValue::Number(-value))
                            .ok_or_else(|| {
                                RuntimeError::operand_must_be_number(expr.operator.token())
                            }),
                        UnaryOperator::Not => Ok((!right.is_truthy()).into()),
                    }
                }
                Expr::Variable(expr) => self.look_up_variable(&expr.name, expr),
            }
        })
    }
    fn eval_binary(&mut self, expr: &BinaryExpr) -> Result<RuntimeValue, RuntimeError> {
        let left = self.eval_expr(&expr.left)?;
        let right = self.eval_expr(&expr.right)?;
        let operator = expr.operator.token();
        let numbers = || match (&left, &right) {
            (RuntimeValue::Number(left), RuntimeValue::Number(right)) => Ok((*left, *right)),
            _ => Err(RuntimeError::operands_must_be_numbers(operator)),
        };

        Ok(match *expr.operator {
            BinaryOperator::Plus => match (&left, &right) {
                (RuntimeValue::Number(left), RuntimeValue::Number(right)) => {
                    (left + right).into()
                }
                (RuntimeValue::String(left), RuntimeValue::String(right)) => {
                    let mut new_str = String::with_capacity(left.len() + right.len());
                    new_str.push_str(left);
                    new_str.push_str(right);
                    new_str.into()
                }
                _ => {
                    return Err(RuntimeError::OperandsMustBeNumbersOrStrings {
                        line: operator.line,
                        span: operator.span,
                    })
                }
            },
            BinaryOperator::Minus => numbers().map(|(left, right)| left - right)?.into(),
            BinaryOperator::Multiply => numbers().map(|(left, right)| left * right)?.into(),
            BinaryOperator::Divide => numbers().map(|(left, right)| left / right)?.into(),
            BinaryOperator::LessThan => numbers().map(|(left, right)| left < right)?.into(),
            BinaryOperator::LessThanOrEqualTo => {
                numbers().map(|(left, right)| left <= right)?.into()
            }
            BinaryOperator::GreaterThan => numbers().map(|(left, right)| left > right)?.into(),
            BinaryOperator::GreaterThanOrEqualTo => {
                numbers().map(|(left, right)| left >= right)?.into()
            }
            BinaryOperator::EqualTo => (left == right).into(),
            BinaryOperator::NotEqualTo => (left != right).into(),
        })
    }
    fn eval_call(&mut self, expr: &CallExpr) -> Result<RuntimeValue, RuntimeError> {
        let callee = self.eval_expr(&expr.callee)?;
        let arguments = expr
            .arguments
            .iter()
            .map(|argument| self.eval_expr(argument))
            .collect::<Result<Vec<_>, _>>()?;

        let callable = match callee {
            RuntimeValue::Callable(callable) => callable,
            other => {
                return Err(RuntimeError::NotCallable {
                    actual_type: other.type_of(),
                    line: expr.paren.line,
                    span: expr.callee.source_span(),
                })
            }
        };
        if arguments.len() != callable.arity() {
            return Err(RuntimeError::ArityMismatch {
                expected: callable.arity(),
                actual: arguments.len(),
                line: expr.paren.line,
                span: expr.callee.source_span().to(expr.paren.span),
            });
        }
        if let Some(max_call_depth) = self.options.max_call_depth {
            if self.call_depth >= max_call_depth {
                return Err(RuntimeError::StackOverflow {
                    line: expr.paren.line,
                    span: expr.paren.span,
                });
            }
        }

        self.call_depth += 1;
        let result = callable.call(self, &arguments);
        self.call_depth -= 1;
        result
    }
    /// Resolved references read their exact frame; anything else is global.
    fn look_up_variable(
        &self,
        name: &Token,
        node: &impl Unique,
    ) -> Result<RuntimeValue, RuntimeError> {
        match self.resolutions.get(node) {
            Some(distance) => self.environment.borrow().get_at(*distance, name),
            None => self.globals.borrow().get(name),
        }
    }
    fn run_with_env<T, F: FnOnce(&mut Self) -> T>(&mut self, new_env: EnvironmentRef, run: F) -> T {
        let old_env = mem::replace(&mut self.environment, new_env);
        let result = run(self);
        self.environment = old_env;
        result
    }
    fn define_native_fn(
        &mut self,
        name: &'static str,
        arity: usize,
        implementation: lox_native_function::NativeImplementation,
    ) {
        self.globals.borrow_mut().define(
            name,
            lox_native_function::LoxNativeFunction::new(name, arity, implementation).into(),
        );
    }
}

impl<Stdout: Write> Interpreter<Stdout> {
    /// Current value of a global variable.
    pub fn global(&self, name: &str) -> Option<RuntimeValue> {
        let token = Token::new(
            crate::scanner::TokenKind::Identifier,
            name.to_string(),
            None,
            0,
            Default::default(),
        );
        self.globals.borrow().get(&token).ok()
    }
}

impl<Stdout: Write> std::fmt::Debug for Interpreter<Stdout> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("call_depth", &self.call_depth)
            .field("options", &self.options)
            .field("resolved_references", &self.resolutions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{scanner::scan, Parser, ParserOpts};
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Program {
        let (tokens, scan_errors) = scan(source);
        assert_eq!(scan_errors, vec![]);
        let (program, parse_errors) = Parser::parse(tokens, ParserOpts::default());
        assert_eq!(parse_errors, vec![]);
        program
    }

    fn interpret_in(
        interpreter: &mut Interpreter<Vec<u8>>,
        source: &str,
    ) -> Result<(), RuntimeError> {
        let program = interpreter.prepare(parse(source)).unwrap();
        interpreter.interpret(&program)
    }

    fn run_with(source: &str, options: InterpreterOptions) -> (String, Result<(), RuntimeError>) {
        let mut interpreter = Interpreter::with_options(Vec::new(), options);
        let result = interpret_in(&mut interpreter, source);
        (String::from_utf8(interpreter.into_output()).unwrap(), result)
    }

    fn run(source: &str) -> String {
        let (output, result) = run_with(source, InterpreterOptions::default());
        result.unwrap();
        output
    }

    /// Output so far plus the runtime error as `[line N] message`.
    fn run_err(source: &str) -> (String, String) {
        let (output, result) = run_with(source, InterpreterOptions::default());
        let err = result.unwrap_err();
        (output, format!("[line {}] {}", err.line(), err))
    }

    #[test]
    fn arithmetic_and_stringify() {
        assert_eq!(
            run("print 1 + 2 * 3; print 6; print 3 + 3; print 10 / 4; print -(1);
                 print \"a\" + \"b\"; print nil; print !nil; print 1 == 1.0;
                 print \"1\" == 1; print nil == false; print 2 >= 2; print 1 != 1;"),
            "7\n6\n6\n2.5\n-1\nab\nnil\ntrue\ntrue\nfalse\nfalse\ntrue\nfalse\n"
        );
    }

    #[test]
    fn logical_operators_return_an_operand() {
        assert_eq!(
            run("print nil or \"yes\"; print 0 and \"zero is truthy\"; print false and boom();
                 print \"left\" or boom();"),
            "yes\nzero is truthy\nfalse\nleft\n"
        );
    }

    #[test]
    fn assignment_yields_the_value() {
        assert_eq!(run("var a; var b; print a = b = 3; print a;"), "3\n3\n");
    }

    #[test]
    fn counter_closure() {
        assert_eq!(
            run("fun makeCounter() { var i = 0; fun inc() { i = i + 1; print i; } return inc; }
                 var c = makeCounter(); c(); c();"),
            "1\n2\n"
        );
    }

    #[test]
    fn closures_capture_their_frame_not_the_callers() {
        assert_eq!(
            run("var a = \"global\";
                 { fun show() { print a; } show(); var a = \"block\"; show(); }"),
            "global\nglobal\n"
        );
    }

    #[test]
    fn shadowing() {
        assert_eq!(
            run("var a = \"outer\"; { var a = \"inner\"; print a; } print a;"),
            "inner\nouter\n"
        );
    }

    #[test]
    fn for_loop() {
        assert_eq!(run("for (var i = 0; i < 3; i = i + 1) print i;"), "0\n1\n2\n");
    }

    #[test]
    fn recursion() {
        assert_eq!(
            run("fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(10);"),
            "55\n"
        );
    }

    #[test]
    fn return_unwinds_loops_and_blocks() {
        assert_eq!(
            run("fun f() { while (true) { { for (var i = 0; ; i = i + 1) { if (i == 3) return i; } } } }
                 print f();
                 fun g() {} print g();"),
            "3\nnil\n"
        );
    }

    #[test]
    fn classes_and_instances() {
        assert_eq!(
            run("class Cake { taste() { print \"delicious\"; } flavor() { return this.kind; } }
                 var c = Cake(); c.taste(); c.kind = \"lemon\"; print c.flavor();
                 print c; print Cake; print c.taste;"),
            "delicious\nlemon\nCake instance\nCake\n<fn taste>\n"
        );
    }

    #[test]
    fn detached_method_keeps_its_instance() {
        assert_eq!(
            run("class Person { name() { return this.n; } }
                 var a = Person(); a.n = \"alice\";
                 var m = a.name;
                 var b = Person(); b.n = \"bob\"; b.m = m;
                 print b.m(); print m();"),
            "alice\nalice\n"
        );
    }

    #[test]
    fn fields_shadow_methods() {
        assert_eq!(
            run("class A { m() { return 1; } } var a = A(); print a.m(); a.m = 2; print a.m;"),
            "1\n2\n"
        );
    }

    #[test]
    fn identity_equality() {
        assert_eq!(
            run("class A {} var a = A(); var b = A(); fun f() {}
                 print a == a; print a == b; print f == f; print A == A; print clock == clock;"),
            "true\nfalse\ntrue\ntrue\ntrue\n"
        );
    }

    #[test]
    fn clock_is_a_native_global() {
        assert_eq!(
            run("print clock; print clock() > 0; var t = clock(); print clock() >= t;"),
            "<native fn>\ntrue\ntrue\n"
        );
    }

    #[test]
    fn runtime_error_aborts_the_rest_of_the_program() {
        assert_eq!(
            run_err("print 1;\nprint -\"x\";\nprint 2;"),
            (
                "1\n".to_string(),
                "[line 2] Operand must be a number.".to_string()
            )
        );
    }

    #[test]
    fn runtime_error_messages() {
        let cases = [
            ("\"a\" + 1;", "[line 1] Operands must be two numbers or two strings."),
            ("1 <\n\"a\";", "[line 1] Operands must be numbers."),
            ("\"x\"();", "[line 1] Can only call functions and classes."),
            ("fun f() {}\nf(1);", "[line 2] Expected 0 arguments but got 1."),
            ("class A {} A(1, 2);", "[line 1] Expected 0 arguments but got 2."),
            ("var n = 1; n.x;", "[line 1] Only instances have properties."),
            ("var n = 1; n.x = boom;", "[line 1] Only instances have fields."),
            ("class A {} A().missing;", "[line 1] Undefined property 'missing'."),
            ("print missing;", "[line 1] Undefined variable 'missing'."),
            ("missing = 1;", "[line 1] Undefined variable 'missing'."),
            ("print this;", "[line 1] Undefined variable 'this'."),
        ];
        for (source, expected) in cases {
            assert_eq!(run_err(source).1, expected, "running {:?}", source);
        }
    }

    #[test]
    fn call_depth_limit() {
        let options = InterpreterOptions::default().with_max_call_depth(Some(16));
        let (output, result) = run_with(
            "fun count(n) { print n; count(n + 1); }\ncount(1);",
            options,
        );
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Stack overflow.");
        assert_eq!(err.line(), 1);
        assert_eq!(output.lines().count(), 16);

        let (_, result) = run_with(
            "fun down(n) { if (n > 0) down(n - 1); } down(15);",
            options,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn state_is_restored_after_a_runtime_error() {
        let mut interpreter = Interpreter::with_options(
            Vec::new(),
            InterpreterOptions::default().with_max_call_depth(Some(8)),
        );
        interpret_in(&mut interpreter, "var a = \"global\";").unwrap();
        assert!(interpret_in(&mut interpreter, "{ var a = \"block\"; fail(); }").is_err());
        assert!(interpret_in(&mut interpreter, "fun f() { f(); } f();").is_err());
        interpret_in(
            &mut interpreter,
            "print a; fun g(n) { if (n > 0) g(n - 1); } g(7); print \"deep enough\";",
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(interpreter.into_output()).unwrap(),
            "global\ndeep enough\n"
        );
    }

    #[test]
    fn globals_persist_and_may_be_redeclared() {
        let mut interpreter = Interpreter::new(Vec::new());
        interpret_in(&mut interpreter, "var a = 1; fun get() { return a; }").unwrap();
        interpret_in(&mut interpreter, "var a = 2; print get();").unwrap();
        assert_eq!(interpreter.global("a"), Some(RuntimeValue::Number(2.0)));
        assert_eq!(interpreter.global("missing"), None);
        assert_eq!(interpreter.output().as_slice(), b"2\n");
    }

    #[test]
    fn output_failures_are_runtime_errors() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let mut interpreter = Interpreter::new(Closed);
        let program = interpreter.prepare(parse("\nprint 1;")).unwrap();
        let err = interpreter.interpret(&program).unwrap_err();
        assert!(matches!(err, RuntimeError::Output { line: 2, .. }));
    }

    #[test]
    #[should_panic(expected = "prepared by the interpreter that runs it")]
    fn programs_are_bound_to_their_interpreter() {
        let mut first = Interpreter::new(Vec::new());
        let mut second = Interpreter::new(Vec::new());
        let program = first.prepare(parse("print 1;")).unwrap();
        let _ = second.interpret(&program);
    }

    struct NodeId(UniqueId);
    impl Unique for NodeId {
        fn id(&self) -> UniqueId {
            self.0
        }
    }

    fn references(stmts: &[Stmt], out: &mut Vec<(String, UniqueId)>) {
        fn expr(e: &Expr, out: &mut Vec<(String, UniqueId)>) {
            match e {
                Expr::Assign(e) => {
                    out.push((e.name.lexeme.clone(), e.id));
                    expr(&e.value, out);
                }
                Expr::Binary(e) => {
                    expr(&e.left, out);
                    expr(&e.right, out);
                }
                Expr::Logical(e) => {
                    expr(&e.left, out);
                    expr(&e.right, out);
                }
                Expr::Call(e) => {
                    expr(&e.callee, out);
                    e.arguments.iter().for_each(|a| expr(a, out));
                }
                Expr::Get(e) => expr(&e.object, out),
                Expr::Set(e) => {
                    expr(&e.object, out);
                    expr(&e.value, out);
                }
                Expr::Grouping(e) => expr(&e.expr, out),
                Expr::Unary(e) => expr(&e.right, out),
                Expr::This(e) => out.push(("this".to_string(), e.id)),
                Expr::Variable(e) => out.push((e.name.lexeme.clone(), e.id)),
                Expr::Literal(_) => {}
            }
        }
        for stmt in stmts {
            match stmt {
                Stmt::Block(s) => references(&s.statements, out),
                Stmt::Class(s) => s.methods.iter().for_each(|m| references(&m.body, out)),
                Stmt::Expression(s) => expr(&s.expression, out),
                Stmt::Function(decl) => references(&decl.body, out),
                Stmt::If(s) => {
                    expr(&s.condition, out);
                    references(std::slice::from_ref(&*s.then_branch), out);
                    if let Some(else_branch) = &s.else_branch {
                        references(std::slice::from_ref(&**else_branch), out);
                    }
                }
                Stmt::Print(s) => expr(&s.expression, out),
                Stmt::Return(s) => s.value.iter().for_each(|v| expr(v, out)),
                Stmt::Var(s) => s.initializer.iter().for_each(|v| expr(v, out)),
                Stmt::While(s) => {
                    expr(&s.condition, out);
                    references(std::slice::from_ref(&*s.body), out);
                }
            }
        }
    }

    #[test]
    fn every_reference_is_resolved_or_global() {
        let mut interpreter = Interpreter::new(Vec::new());
        let program = interpreter
            .prepare(parse(
                "var g = 1;
                 { var a = 2; fun f(b) { var c = b; return a + b + c + g; } print f(3); }
                 class Box { get() { return this.v; } set(v) { this.v = v; } }
                 for (var i = 0; i < 2; i = i + 1) { g = g + i; }
                 fun outer() { var x = 0; fun inner() { x = x + 1; return x; } return inner; }
                 print outer()();",
            ))
            .unwrap();
        interpreter.interpret(&program).unwrap();

        let mut refs = Vec::new();
        references(&program.program().statements, &mut refs);
        assert!(refs.len() > 10);
        for (name, id) in refs {
            let resolved = interpreter.resolutions().contains(&NodeId(id));
            assert!(
                resolved || interpreter.global(&name).is_some(),
                "'{}' is neither resolved nor global",
                name
            );
        }
        assert_eq!(
            String::from_utf8(interpreter.into_output()).unwrap(),
            "9\n1\n"
        );
    }
}
