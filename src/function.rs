use std::cell::RefCell;
use std::fmt::{Debug, Display};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::environment::Environment;
use crate::error::{RuntimeError, Unwind};
use crate::interpreter::Interpreter;
use crate::object::{Callable, Object};
use crate::stmt::FunctionData;
use crate::token::{Token, Type};

/// A user-defined function or method. Carries its own closure
/// environment, captured at the point the `fun`/method declaration
/// was evaluated, so nested functions see the variables alive at
/// definition time rather than at call time.
#[derive(Debug, Clone)]
pub struct Function {
    declaration: Rc<FunctionData>,
    closure: Rc<RefCell<Environment>>,
    is_initializer: bool,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.declaration, &other.declaration) && Rc::ptr_eq(&self.closure, &other.closure)
    }
}

impl Function {
    pub fn new(declaration: Rc<FunctionData>, closure: Rc<RefCell<Environment>>, is_initializer: bool) -> Self {
        Function { declaration, closure, is_initializer }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    /// Produces a copy of this method bound to `instance`: a new
    /// environment, enclosed by the method's original closure, with
    /// `this` defined in it. Called once per `Get` on an instance, so
    /// each bound method gets its own tiny environment rather than
    /// mutating the shared class-level closure.
    pub fn bind(&self, instance: Object) -> Function {
        let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.closure)))));
        environment.borrow_mut().define("this", instance);

        Function::new(Rc::clone(&self.declaration), environment, self.is_initializer)
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.closure)))));

        for (param, argument) in self.declaration.params.iter().zip(arguments.into_iter()) {
            environment.borrow_mut().define(&param.lexeme, argument);
        }

        match interpreter.execute_block(&self.declaration.body, environment) {
            Ok(()) => {
                if self.is_initializer {
                    self.closure_this()
                } else {
                    Ok(Object::from(crate::literal::Literal::Nil))
                }
            }
            Err(Unwind::Return(signal)) => {
                if self.is_initializer {
                    self.closure_this()
                } else {
                    Ok(signal.value)
                }
            }
            Err(Unwind::Error(error)) => Err(error),
        }
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }
}

impl Function {
    /// `init()` always returns the instance, regardless of any
    /// explicit `return;`. `this` lives one scope up from the
    /// parameter environment the resolver bound it in.
    fn closure_this(&self) -> Result<Object, RuntimeError> {
        let this_token = Token::synthetic(Type::This, "this");
        Environment::get_at(&self.closure, 0, &this_token)
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<function {}>", self.name())
    }
}

/// A function implemented in Rust and exposed to Lox programs, with
/// no Lox-level closure or user body.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub function: fn(&mut Interpreter, Vec<Object>) -> Result<Object, RuntimeError>,
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && std::ptr::eq(self.function as *const (), other.function as *const ())
    }
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        (self.function)(interpreter, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl NativeFunction {
    /// The builtins every `Interpreter` seeds its global scope with.
    pub fn globals() -> Vec<NativeFunction> {
        vec![
            NativeFunction {
                name: "clock",
                arity: 0,
                function: |_, _| {
                    let now = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .expect("system clock to be after the unix epoch")
                        .as_secs_f64();
                    Ok(Object::from(now))
                },
            },
            NativeFunction {
                name: "assert",
                arity: 1,
                function: |_, arguments| {
                    if arguments[0].as_bool() {
                        Ok(Object::from(crate::literal::Literal::Nil))
                    } else {
                        Err(RuntimeError {
                            token: Token::synthetic(Type::Identifier, "assert"),
                            message: "Assertion failed".to_string(),
                        })
                    }
                },
            },
            NativeFunction {
                name: "assertFalse",
                arity: 1,
                function: |_, arguments| {
                    if !arguments[0].as_bool() {
                        Ok(Object::from(crate::literal::Literal::Nil))
                    } else {
                        Err(RuntimeError {
                            token: Token::synthetic(Type::Identifier, "assertFalse"),
                            message: "Assertion failed".to_string(),
                        })
                    }
                },
            },
        ]
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native function {}>", self.name)
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native function {}>", self.name)
    }
}
