use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use crate::class::{Class, Instance};
use crate::environment::Environment;
use crate::error::{Diagnostic, RuntimeError, Unwind};
use crate::expr::{Expr, ExprVisitor, NodeId};
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::{Stmt, StmtVisitor};
use crate::token::{Token, Type};

/// Walks the resolved AST, carrying a mutable *current environment*
/// pointer that starts at [`Interpreter::globals`] and moves with
/// every block, function call, and class body. Produces [`Object`]
/// values for expressions and side effects (`print`, field mutation,
/// variable assignment) for statements.
pub struct Interpreter {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<NodeId, usize>,
    output: Box<dyn Write>,
}

impl Interpreter {
    /// Builds an interpreter whose `print` statements write to stdout.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Builds an interpreter that writes `print` output to `output`
    /// instead of stdout; used by the integration test harness to
    /// capture what a fixture script prints.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));
        for native in NativeFunction::globals() {
            globals.borrow_mut().define(native.name, Object::from(native));
        }

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// Records the distance the resolver computed for a use-site node.
    /// Called once per `Variable`/`Assign`/`This`/`Super` node, before
    /// any evaluation happens.
    pub fn resolve(&mut self, id: NodeId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Executes a parsed and resolved program. Stops at the first
    /// runtime error (reported to the driver via [`Diagnostic::throw`])
    /// rather than continuing; a `return` that escapes every call frame
    /// would be a resolver bug, not a user-visible condition.
    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            if let Err(unwind) = self.execute(statement) {
                match unwind {
                    Unwind::Error(error) => {
                        error.throw();
                        return;
                    }
                    Unwind::Return(_) => {
                        unreachable!("resolver rejects return outside of a function")
                    }
                }
            }
        }
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Object, Unwind> {
        expr.accept(self)
    }

    /// Runs `statements` with `environment` as the current scope,
    /// restoring the previous environment on every exit path (normal
    /// completion, a `return` unwind, or a runtime error). Called
    /// directly by [`Function::call`] for function and method bodies,
    /// and by `Block`'s own visitor below.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> Result<(), Unwind> {
        let previous = std::mem::replace(&mut self.environment, environment);

        for statement in statements {
            if let Err(unwind) = self.execute(statement) {
                self.environment = previous;
                return Err(unwind);
            }
        }

        self.environment = previous;
        Ok(())
    }

    /// Resolves a `Variable`/`This` use: if the resolver recorded a
    /// distance for this use-site, walk exactly that many environment
    /// links; otherwise fall back to a dynamic lookup in globals.
    fn look_up_variable(&self, id: NodeId, name: &Token) -> Result<Object, RuntimeError> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// Invokes anything callable: a user function, a native function,
    /// or a class (which constructs an instance). Shared by `Call`
    /// dispatch so arity checking lives in exactly one place.
    fn call(&mut self, callee: Object, paren: &Token, arguments: Vec<Object>) -> Result<Object, Unwind> {
        if !callee.is_callable() {
            return Err(RuntimeError {
                token: paren.clone(),
                message: "Can only call functions and classes.".to_string(),
            }
            .into());
        }

        let callable: &dyn Callable = match &callee {
            Object::Function(function) => function,
            Object::NativeFunction(function) => function,
            Object::Class(class) => class,
            _ => unreachable!("is_callable checked above"),
        };

        if arguments.len() != callable.arity() {
            return Err(RuntimeError {
                token: paren.clone(),
                message: format!("Expected {} arguments but got {}.", callable.arity(), arguments.len()),
            }
            .into());
        }

        callable.call(self, arguments).map_err(Unwind::from)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprVisitor<Result<Object, Unwind>> for Interpreter {
    fn visit_literal_expr(&mut self, expr: &Expr) -> Result<Object, Unwind> {
        let Expr::Literal(literal) = expr else { unreachable!() };
        Ok(Object::from(literal.clone()))
    }

    fn visit_grouping_expr(&mut self, expr: &Expr) -> Result<Object, Unwind> {
        let Expr::Grouping(data) = expr else { unreachable!() };
        self.evaluate(&data.expr)
    }

    fn visit_unary_expr(&mut self, expr: &Expr) -> Result<Object, Unwind> {
        let Expr::Unary(data) = expr else { unreachable!() };
        let right = self.evaluate(&data.expr)?;

        match data.operator.r#type {
            Type::Bang => Ok(!right),
            Type::Minus => {
                let type_str = right.type_str();
                (-right).ok_or_else(|| {
                    RuntimeError {
                        token: data.operator.clone(),
                        message: format!("Operand of unary '-' must be a number, got {type_str}."),
                    }
                    .into()
                })
            }
            _ => unreachable!(),
        }
    }

    fn visit_binary_expr(&mut self, expr: &Expr) -> Result<Object, Unwind> {
        let Expr::Binary(data) = expr else { unreachable!() };
        let left = self.evaluate(&data.left)?;
        let right = self.evaluate(&data.right)?;
        let (left_type, right_type) = (left.type_str(), right.type_str());

        let numbers_required = || {
            Unwind::from(RuntimeError {
                token: data.operator.clone(),
                message: format!("Operands must be numbers, got {left_type} and {right_type}."),
            })
        };

        match data.operator.r#type {
            Type::Plus => (left + right).ok_or_else(|| {
                RuntimeError {
                    token: data.operator.clone(),
                    message: format!(
                        "Binary operation '+' is not supported between {left_type} and {right_type}."
                    ),
                }
                .into()
            }),
            Type::Minus => (left - right).ok_or_else(numbers_required),
            Type::Star => (left * right).ok_or_else(numbers_required),
            Type::Slash => (left / right).ok_or_else(numbers_required),
            Type::Greater => left.partial_cmp(&right).map(|o| Object::from(o.is_gt())).ok_or_else(numbers_required),
            Type::GreaterEqual => {
                left.partial_cmp(&right).map(|o| Object::from(o.is_ge())).ok_or_else(numbers_required)
            }
            Type::Less => left.partial_cmp(&right).map(|o| Object::from(o.is_lt())).ok_or_else(numbers_required),
            Type::LessEqual => {
                left.partial_cmp(&right).map(|o| Object::from(o.is_le())).ok_or_else(numbers_required)
            }
            Type::EqualEqual => Ok(Object::from(left == right)),
            Type::BangEqual => Ok(Object::from(left != right)),
            _ => unreachable!(),
        }
    }

    fn visit_logical_expr(&mut self, expr: &Expr) -> Result<Object, Unwind> {
        let Expr::Logical(data) = expr else { unreachable!() };
        let left = self.evaluate(&data.left)?;

        match data.operator.r#type {
            Type::Or if left.as_bool() => return Ok(left),
            Type::And if !left.as_bool() => return Ok(left),
            Type::Or | Type::And => {}
            _ => unreachable!(),
        }

        self.evaluate(&data.right)
    }

    fn visit_variable_expr(&mut self, expr: &Expr) -> Result<Object, Unwind> {
        let Expr::Variable(data) = expr else { unreachable!() };
        self.look_up_variable(data.id, &data.name).map_err(Unwind::from)
    }

    fn visit_assign_expr(&mut self, expr: &Expr) -> Result<Object, Unwind> {
        let Expr::Assign(data) = expr else { unreachable!() };
        let value = self.evaluate(&data.value)?;

        match self.locals.get(&data.id) {
            Some(&distance) => Environment::assign_at(&self.environment, distance, &data.name, value.clone())?,
            None => self.globals.borrow_mut().assign(&data.name, value.clone())?,
        }

        Ok(value)
    }

    fn visit_call_expr(&mut self, expr: &Expr) -> Result<Object, Unwind> {
        let Expr::Call(data) = expr else { unreachable!() };
        let callee = self.evaluate(&data.callee)?;

        let mut arguments = Vec::with_capacity(data.arguments.len());
        for argument in &data.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        self.call(callee, &data.paren, arguments)
    }

    fn visit_get_expr(&mut self, expr: &Expr) -> Result<Object, Unwind> {
        let Expr::Get(data) = expr else { unreachable!() };
        let object = self.evaluate(&data.object)?;

        match object {
            Object::Instance(instance) => Instance::get(&instance, &data.name).map_err(Unwind::from),
            _ => Err(RuntimeError {
                token: data.name.clone(),
                message: "Only instances have properties.".to_string(),
            }
            .into()),
        }
    }

    fn visit_set_expr(&mut self, expr: &Expr) -> Result<Object, Unwind> {
        let Expr::Set(data) = expr else { unreachable!() };
        let object = self.evaluate(&data.object)?;

        let Object::Instance(instance) = object else {
            return Err(RuntimeError {
                token: data.name.clone(),
                message: "Only instances have fields.".to_string(),
            }
            .into());
        };

        let value = self.evaluate(&data.value)?;
        instance.borrow_mut().set(&data.name, value.clone());
        Ok(value)
    }

    fn visit_this_expr(&mut self, expr: &Expr) -> Result<Object, Unwind> {
        let Expr::This(data) = expr else { unreachable!() };
        self.look_up_variable(data.id, &data.keyword).map_err(Unwind::from)
    }

    fn visit_super_expr(&mut self, expr: &Expr) -> Result<Object, Unwind> {
        let Expr::Super(data) = expr else { unreachable!() };

        let distance = *self
            .locals
            .get(&data.id)
            .expect("resolver records a distance for every 'super' use");

        let superclass = Environment::get_at(&self.environment, distance, &Token::synthetic(Type::Super, "super"))?;
        let instance =
            Environment::get_at(&self.environment, distance - 1, &Token::synthetic(Type::This, "this"))?;

        let Object::Class(superclass) = superclass else {
            unreachable!("'super' always resolves to a class value")
        };

        match superclass.borrow().find_method(&data.method.lexeme) {
            Some(method) => Ok(Object::from(method.bind(instance))),
            None => Err(RuntimeError {
                token: data.method.clone(),
                message: format!("Undefined property '{}'.", data.method.lexeme),
            }
            .into()),
        }
    }
}

impl StmtVisitor<Result<(), Unwind>> for Interpreter {
    fn visit_expression_stmt(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        let Stmt::Expression(data) = stmt else { unreachable!() };
        self.evaluate(&data.expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        let Stmt::Print(data) = stmt else { unreachable!() };
        let value = self.evaluate(&data.expr)?;
        let _ = writeln!(self.output, "{value}");
        Ok(())
    }

    fn visit_var_stmt(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        let Stmt::Var(data) = stmt else { unreachable!() };
        let value = match &data.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::from(Literal::Nil),
        };

        self.environment.borrow_mut().define(&data.name.lexeme, value);
        Ok(())
    }

    fn visit_block_stmt(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        let Stmt::Block(data) = stmt else { unreachable!() };
        let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
        self.execute_block(&data.statements, environment)
    }

    fn visit_if_stmt(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        let Stmt::If(data) = stmt else { unreachable!() };

        if self.evaluate(&data.condition)?.as_bool() {
            self.execute(&data.then_branch)
        } else if let Some(else_branch) = &data.else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_while_stmt(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        let Stmt::While(data) = stmt else { unreachable!() };

        while self.evaluate(&data.condition)?.as_bool() {
            self.execute(&data.body)?;
        }

        Ok(())
    }

    fn visit_function_stmt(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        let Stmt::Function(data) = stmt else { unreachable!() };
        let function = Function::new(Rc::new(data.clone()), Rc::clone(&self.environment), false);
        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(function));
        Ok(())
    }

    fn visit_return_stmt(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        let Stmt::Return(data) = stmt else { unreachable!() };
        let value = match &data.value {
            Some(expr) => self.evaluate(expr)?,
            None => Object::from(Literal::Nil),
        };

        Err(Unwind::Return(crate::error::ReturnSignal { value }))
    }

    fn visit_class_stmt(&mut self, stmt: &Stmt) -> Result<(), Unwind> {
        let Stmt::Class(data) = stmt else { unreachable!() };

        let superclass = match &data.superclass {
            Some(superclass_expr) => {
                let Expr::Variable(superclass_var) = superclass_expr else {
                    unreachable!("the parser only ever produces a Variable superclass expression")
                };

                match self.evaluate(superclass_expr)? {
                    Object::Class(class) => Some(class),
                    _ => {
                        return Err(RuntimeError {
                            token: superclass_var.name.clone(),
                            message: "Superclass must be a class.".to_string(),
                        }
                        .into())
                    }
                }
            }
            None => None,
        };

        self.environment.borrow_mut().define(&data.name.lexeme, Object::from(Literal::Nil));

        let previous_environment = superclass.as_ref().map(|superclass| {
            let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
            environment.borrow_mut().define("super", Object::Class(Rc::clone(superclass)));
            std::mem::replace(&mut self.environment, environment)
        });

        let mut methods = HashMap::new();
        for method in &data.methods {
            let Stmt::Function(method_data) = method else { unreachable!() };
            let is_initializer = method_data.name.lexeme == "init";
            let function = Function::new(Rc::new(method_data.clone()), Rc::clone(&self.environment), is_initializer);
            methods.insert(method_data.name.lexeme.clone(), function);
        }

        let class = Rc::new(RefCell::new(Class::new(data.name.lexeme.clone(), superclass, methods)));

        if let Some(previous_environment) = previous_environment {
            self.environment = previous_environment;
        }

        self.environment.borrow_mut().assign(&data.name, Object::Class(class))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Location;

    fn token(r#type: Type, lexeme: &str) -> Token {
        Token::new(r#type, lexeme.to_string(), None, Location::new(0, 0))
    }

    fn num(n: f64) -> Expr {
        Expr::Literal(Literal::Number(n))
    }

    #[test]
    fn evaluate_literal() {
        let mut interpreter = Interpreter::new();
        assert_eq!(interpreter.evaluate(&num(12.0)).unwrap(), Object::from(12.0));
    }

    #[test]
    fn evaluate_unary_minus() {
        let mut interpreter = Interpreter::new();
        let expr = Expr::Unary(crate::expr::UnaryData {
            operator: token(Type::Minus, "-"),
            expr: Box::new(num(12.0)),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(-12.0));
    }

    #[test]
    fn evaluate_unary_bang_on_instance_is_false() {
        let mut interpreter = Interpreter::new();
        let class = Rc::new(RefCell::new(Class::new("C".to_string(), None, HashMap::new())));
        let instance = Object::Instance(Rc::new(RefCell::new(Instance::new(class))));
        assert_eq!(!instance, Object::from(false));
    }

    #[test]
    fn evaluate_binary_arithmetic_and_precedence() {
        let mut interpreter = Interpreter::new();
        // 1 + 2 * 3
        let mul = Expr::Binary(crate::expr::BinaryData {
            left: Box::new(num(2.0)),
            operator: token(Type::Star, "*"),
            right: Box::new(num(3.0)),
        });
        let add = Expr::Binary(crate::expr::BinaryData {
            left: Box::new(num(1.0)),
            operator: token(Type::Plus, "+"),
            right: Box::new(mul),
        });
        assert_eq!(interpreter.evaluate(&add).unwrap(), Object::from(7.0));
    }

    #[test]
    fn string_concatenation() {
        let mut interpreter = Interpreter::new();
        let expr = Expr::Binary(crate::expr::BinaryData {
            left: Box::new(Expr::Literal(Literal::String("Hi, ".to_string()))),
            operator: token(Type::Plus, "+"),
            right: Box::new(Expr::Literal(Literal::String("world".to_string()))),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from("Hi, world"));
    }

    #[test]
    fn adding_string_and_number_is_a_runtime_error() {
        let mut interpreter = Interpreter::new();
        let expr = Expr::Binary(crate::expr::BinaryData {
            left: Box::new(Expr::Literal(Literal::String("x".to_string()))),
            operator: token(Type::Plus, "+"),
            right: Box::new(num(1.0)),
        });
        assert!(interpreter.evaluate(&expr).is_err());
    }

    #[test]
    fn division_by_zero_yields_infinity_not_an_error() {
        let mut interpreter = Interpreter::new();
        let expr = Expr::Binary(crate::expr::BinaryData {
            left: Box::new(num(1.0)),
            operator: token(Type::Slash, "/"),
            right: Box::new(num(0.0)),
        });
        let Object::Literal(Literal::Number(result)) = interpreter.evaluate(&expr).unwrap() else {
            panic!("expected a number")
        };
        assert!(result.is_infinite());
    }

    #[test]
    fn logical_or_returns_the_deciding_operand() {
        let mut interpreter = Interpreter::new();
        let expr = Expr::Logical(crate::expr::LogicalData {
            left: Box::new(Expr::Literal(Literal::Nil)),
            operator: token(Type::Or, "or"),
            right: Box::new(Expr::Literal(Literal::String("ok".to_string()))),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from("ok"));
    }

    #[test]
    fn logical_and_returns_the_deciding_operand() {
        let mut interpreter = Interpreter::new();
        let expr = Expr::Logical(crate::expr::LogicalData {
            left: Box::new(num(1.0)),
            operator: token(Type::And, "and"),
            right: Box::new(num(2.0)),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(2.0));
    }

    #[test]
    fn block_creates_and_restores_environment() {
        let mut interpreter = Interpreter::new();
        interpreter.environment.borrow_mut().define("a", Object::from(1.0));

        let block = Stmt::Block(crate::stmt::BlockData {
            statements: vec![Stmt::Var(crate::stmt::VarData {
                name: token(Type::Identifier, "a"),
                initializer: Some(num(2.0)),
            })],
        });

        interpreter.execute(&block).unwrap();

        assert_eq!(
            interpreter.environment.borrow().get(&token(Type::Identifier, "a")).unwrap(),
            Object::from(1.0)
        );
    }

    #[test]
    fn assigning_to_an_undefined_global_is_a_runtime_error() {
        let mut interpreter = Interpreter::new();
        let expr = Expr::Assign(crate::expr::AssignData {
            id: 0,
            name: token(Type::Identifier, "missing"),
            value: Box::new(num(1.0)),
        });
        assert!(interpreter.evaluate(&expr).is_err());
    }
}
