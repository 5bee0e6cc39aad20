//! Tree‑walking evaluator.
//!
//! Executes resolved statements against an environment chain rooted at a
//! per‑instance global environment.  Statements return a [`Flow`] so that
//! `return` unwinds to its call boundary as ordinary control flow; runtime
//! errors travel separately as `Err(RuntimeError)` and abort the whole
//! `interpret` call.

use std::cell::RefCell;
use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::class::{LoxClass, INITIALIZER};
use crate::environment::{EnvRef, Environment};
use crate::error::RuntimeError;
use crate::function::{LoxFunction, NativeFunction};
use crate::output::Output;
use crate::reporter::Reporter;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Convenient alias for interpreter results.
pub type IResult<T> = Result<T, RuntimeError>;

/// Deepest nesting of user function and class calls before a program is
/// stopped with "Stack overflow.".
pub const MAX_CALL_DEPTH: usize = 1024;

/// Remaining native stack below which a call moves onto a fresh segment.
const RED_ZONE: usize = 256 * 1024;

/// Size of each extra stack segment.
const STACK_PER_GROWTH: usize = 1024 * 1024;

/// How a statement finished.
#[derive(Debug)]
pub enum Flow {
    Normal,
    /// A `return` is unwinding towards the nearest call boundary.
    Return(Value),
}

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    locals: HashMap<ExprId, usize>,
    output: Rc<dyn Output>,
    call_depth: usize,
}

impl Interpreter {
    /// Creates a new Interpreter whose globals hold the native functions.
    pub fn new(output: Rc<dyn Output>) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef = Rc::new(RefCell::new(Environment::new()));

        debug!("Defining native function 'clock'");

        globals
            .borrow_mut()
            .define("clock", Value::NativeFunction(Rc::new(NativeFunction::clock())));

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
            call_depth: 0,
        }
    }

    /// Resolver callback: `id` refers to a binding `depth` scopes out.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        debug!("Recording {:?} at depth {}", id, depth);

        self.locals.insert(id, depth);
    }

    /// Run a program.  The first runtime error stops execution and is
    /// reported; output already produced stays.
    pub fn interpret(&mut self, statements: &[Stmt], reporter: &mut Reporter) {
        info!("Interpreting {} statements", statements.len());

        if let Err(e) = self.execute_all(statements) {
            debug!("Runtime error: {}", e);
            reporter.runtime_error(&e);
            return;
        }

        info!("Interpretation completed successfully");
    }

    /// Like [`Interpreter::interpret`] but hands the error back instead of
    /// reporting it.
    pub fn execute_all(&mut self, statements: &[Stmt]) -> IResult<()> {
        for stmt in statements {
            self.execute(stmt)?;
        }

        Ok(())
    }

    // ───────────────────────────── statements ──────────────────────────────

    /// Executes a single statement.
    pub fn execute(&mut self, stmt: &Stmt) -> IResult<Flow> {
        match stmt {
            Stmt::Block(statements) => {
                let environment: EnvRef = Environment::child_of(&self.environment);
                self.execute_block(statements, environment)
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                self.define_class(name, superclass.as_ref(), methods)?;
                Ok(Flow::Normal)
            }

            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                let function: LoxFunction =
                    LoxFunction::new(Rc::clone(declaration), Rc::clone(&self.environment), false);

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));

                Ok(Flow::Normal)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;
                self.output.print_line(&value.to_string());
                debug!("Printed value: {}", value);
                Ok(Flow::Normal)
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Returning value: {}", value);

                Ok(Flow::Return(value))
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(Flow::Normal)
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }

                Ok(Flow::Normal)
            }
        }
    }

    /// Run `statements` inside `environment`, restoring the current
    /// environment on every exit path.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> IResult<Flow> {
        let previous: EnvRef = mem::replace(&mut self.environment, environment);

        let result: IResult<Flow> = self.execute_sequence(statements);

        self.environment = previous;

        result
    }

    fn execute_sequence(&mut self, statements: &[Stmt]) -> IResult<Flow> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute(stmt)? {
                return Ok(Flow::Return(value));
            }
        }

        Ok(Flow::Normal)
    }

    fn define_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> IResult<()> {
        debug!("Defining class '{}'", name.lexeme);

        let superclass: Option<Rc<LoxClass>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    let at: &Token = match expr {
                        Expr::Variable { name, .. } => name,
                        _ => name,
                    };
                    return Err(RuntimeError::not_class(at));
                }
            },
            None => None,
        };

        // Bound first so methods can refer to the class by name.
        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Nil);

        let method_env: EnvRef = match &superclass {
            Some(superclass) => {
                let env: EnvRef = Environment::child_of(&self.environment);
                env.borrow_mut()
                    .define("super", Value::Class(Rc::clone(superclass)));
                env
            }
            None => Rc::clone(&self.environment),
        };

        let methods: HashMap<String, Rc<LoxFunction>> = methods
            .iter()
            .map(|decl| {
                let function: LoxFunction = LoxFunction::new(
                    Rc::clone(decl),
                    Rc::clone(&method_env),
                    decl.name.lexeme == INITIALIZER,
                );
                (decl.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        let class: LoxClass = LoxClass::new(name.lexeme.clone(), superclass, methods);

        self.environment
            .borrow_mut()
            .assign(name, Value::Class(Rc::new(class)))
    }

    // ───────────────────────────── expressions ─────────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> IResult<Value> {
        match expr {
            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;
                let right: Value = self.evaluate(right)?;
                binary(operator, left, right)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee: Value = self.evaluate(callee)?;

                let mut values: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                self.call(callee, paren, values)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => instance.get(name),
                _ => Err(RuntimeError::not_instance(
                    name,
                    "Only instances have properties.",
                )),
            },

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::from(s.as_str()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;

                let short_circuit: bool = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(RuntimeError::not_instance(name, "Only instances have fields."));
                };

                let value: Value = self.evaluate(value)?;
                instance.set(name, value.clone());

                Ok(value)
            }

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),

            Expr::This { id, keyword } => self.look_up_variable(keyword, *id),

            Expr::Unary { operator, right } => {
                let right: Value = self.evaluate(right)?;

                match operator.token_type {
                    TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
                    TokenType::MINUS => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::type_mismatch(
                            operator,
                            "Operand must be a number.",
                        )),
                    },
                    _ => Err(RuntimeError::unexpected(format!(
                        "Invalid unary operator '{}'.",
                        operator.lexeme
                    ))),
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(name, *id),
        }
    }

    /// Resolved references walk a fixed number of hops; unresolved ones are
    /// globals, looked up by name at run time.
    fn look_up_variable(&self, name: &Token, id: ExprId) -> IResult<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, &name.lexeme),
            None => self.globals.borrow().get(name),
        }
    }

    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> IResult<Value> {
        let distance: usize = *self
            .locals
            .get(&id)
            .ok_or_else(|| RuntimeError::unexpected("'super' was never resolved."))?;

        let Value::Class(superclass) = Environment::get_at(&self.environment, distance, "super")?
        else {
            return Err(RuntimeError::unexpected("'super' is not bound to a class."));
        };

        // `this` always lives one scope inside the `super` scope.
        let this_distance: usize = distance
            .checked_sub(1)
            .ok_or_else(|| RuntimeError::unexpected("'super' resolved without a 'this' scope."))?;

        let Value::Instance(object) = Environment::get_at(&self.environment, this_distance, "this")?
        else {
            return Err(RuntimeError::unexpected("'this' is not bound to an instance."));
        };

        debug!(
            "Dispatching super.{} from line {}",
            method.lexeme, keyword.line
        );

        let found: Rc<LoxFunction> = superclass
            .find_method(&method.lexeme)
            .ok_or_else(|| RuntimeError::undefined_property(method))?;

        Ok(Value::Function(Rc::new(found.bind(object))))
    }

    /// Invokes a callable (native function, closure or class).
    fn call(&mut self, callee: Value, paren: &Token, arguments: Vec<Value>) -> IResult<Value> {
        let arity: usize = callee
            .arity()
            .ok_or_else(|| RuntimeError::not_callable(paren))?;

        if arguments.len() != arity {
            return Err(RuntimeError::argument_mismatch(
                paren,
                arity,
                arguments.len(),
            ));
        }

        if let Value::NativeFunction(native) = &callee {
            debug!("Calling native function '{}'", native.name);
            return Ok(native.call(&arguments));
        }

        if self.call_depth >= MAX_CALL_DEPTH {
            debug!("Call depth limit of {} reached", MAX_CALL_DEPTH);
            return Err(RuntimeError::stack_overflow(paren));
        }

        self.call_depth += 1;

        let result: IResult<Value> = stacker::maybe_grow(RED_ZONE, STACK_PER_GROWTH, || {
            match callee {
                Value::Function(function) => function.call(self, arguments),
                Value::Class(class) => LoxClass::instantiate(&class, self, arguments),
                _ => Err(RuntimeError::not_callable(paren)),
            }
        });

        self.call_depth -= 1;

        result
    }
}

fn numeric_operands(operator: &Token, left: &Value, right: &Value) -> IResult<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(RuntimeError::type_mismatch(
            operator,
            "Operands must be numbers.",
        )),
    }
}

/// Evaluates a binary operator over two already evaluated operands.
fn binary(operator: &Token, left: Value, right: Value) -> IResult<Value> {
    debug!("Binary {} on {} and {}", operator.lexeme, left, right);

    let value: Value = match operator.token_type {
        TokenType::PLUS => match (&left, &right) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + b),
            (Value::String(a), Value::String(b)) => {
                let mut joined: String = String::with_capacity(a.len() + b.len());
                joined.push_str(a);
                joined.push_str(b);
                Value::from(joined.as_str())
            }
            _ => {
                return Err(RuntimeError::type_mismatch(
                    operator,
                    "Operands must be two numbers or two strings.",
                ))
            }
        },

        TokenType::MINUS => {
            let (a, b) = numeric_operands(operator, &left, &right)?;
            Value::Number(a - b)
        }

        // IEEE semantics: dividing by zero yields an infinity or NaN.
        TokenType::SLASH => {
            let (a, b) = numeric_operands(operator, &left, &right)?;
            Value::Number(a / b)
        }

        TokenType::STAR => {
            let (a, b) = numeric_operands(operator, &left, &right)?;
            Value::Number(a * b)
        }

        TokenType::GREATER => {
            let (a, b) = numeric_operands(operator, &left, &right)?;
            Value::Bool(a > b)
        }

        TokenType::GREATER_EQUAL => {
            let (a, b) = numeric_operands(operator, &left, &right)?;
            Value::Bool(a >= b)
        }

        TokenType::LESS => {
            let (a, b) = numeric_operands(operator, &left, &right)?;
            Value::Bool(a < b)
        }

        TokenType::LESS_EQUAL => {
            let (a, b) = numeric_operands(operator, &left, &right)?;
            Value::Bool(a <= b)
        }

        TokenType::EQUAL_EQUAL => Value::Bool(left == right),

        TokenType::BANG_EQUAL => Value::Bool(left != right),

        _ => {
            return Err(RuntimeError::unexpected(format!(
                "Invalid binary operator '{}'.",
                operator.lexeme
            )))
        }
    };

    Ok(value)
}
