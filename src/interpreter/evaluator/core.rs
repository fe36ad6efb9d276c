use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{Expr, FunctionDecl, LogicalOperator, MapEntry, Stmt, VarInit},
    error::RuntimeError,
    interpreter::{
        environment::Environment,
        evaluator::function::builtin::BUILTIN_TABLE,
        value::{
            core::{Callable, UserFunction, Value},
            key::MapKey,
        },
    },
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure. Runtime errors are fatal:
/// evaluation halts and the host sees the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// The control signal produced by executing a statement.
///
/// `Return` unwinds through blocks and loops until a function-call
/// boundary converts it back into a plain value. Everything else is
/// `Normal`.
#[derive(Debug)]
pub enum Flow {
    /// Ordinary completion carrying the statement's value.
    Normal(Value),
    /// A `return` in flight, carrying the function result.
    Return(Value),
}

/// Stores the runtime evaluation context.
///
/// The context owns the global environment, pre-populated with the
/// built-in callables, and tracks the environment active for the code
/// currently being evaluated. Blocks and function calls swap the active
/// environment and restore it when they finish, whether they finish
/// normally or not.
pub struct Context {
    env: Rc<Environment>,
}

#[allow(clippy::new_without_default)]
impl Context {
    /// Creates a new evaluation context whose global scope holds the
    /// built-in callables.
    #[must_use]
    pub fn new() -> Self {
        let globals = Environment::global();
        for def in BUILTIN_TABLE {
            globals.define(def.name, Value::Callable(Callable::Builtin(def)));
        }
        Self { env: globals }
    }

    /// The environment active for the code currently being evaluated.
    #[must_use]
    pub fn env(&self) -> &Rc<Environment> {
        &self.env
    }

    /// Evaluates a sequence of top-level statements.
    ///
    /// Statements execute in source order. The value of the last top-level
    /// expression statement is returned, or `None` when the program ends
    /// without one. A `return` at top level ends the program early,
    /// yielding its value as the program result.
    ///
    /// # Parameters
    /// - `statements`: Slice of top-level statements.
    ///
    /// # Returns
    /// The last evaluated expression-statement value or `None`.
    pub fn eval_toplevel(&mut self, statements: &[Stmt]) -> EvalResult<Option<Value>> {
        let mut last = None;
        for stmt in statements {
            match self.execute(stmt)? {
                Flow::Return(value) => return Ok(Some(value)),
                Flow::Normal(value) => {
                    if matches!(stmt, Stmt::Expression { .. }) {
                        last = Some(value);
                    }
                },
            }
        }
        Ok(last)
    }

    /// Evaluates an expression and returns the resulting value.
    ///
    /// This is the main entry point for expression evaluation. The
    /// evaluator dispatches based on expression variant: literals,
    /// variables with selectors, assignments, unary, binary and logical
    /// operations, groupings, calls, composite literals, and function
    /// literals.
    ///
    /// # Parameters
    /// - `expr`: Expression to evaluate.
    ///
    /// # Returns
    /// The computed value.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal { value, .. } => Ok(Value::from(value)),
            Expr::Variable { name, selectors, line } => {
                let value = self.env
                                .get(name)
                                .ok_or_else(|| RuntimeError::UndefinedVariable {
                                    name: name.clone(),
                                    line: *line,
                                })?;
                if selectors.is_empty() {
                    return Ok(value);
                }
                self.apply_selectors(value, selectors, *line)
            },
            Expr::Assign { name, value, selectors, line } => {
                self.eval_assign(name, value, selectors, *line)
            },
            Expr::Unary { op, expr, line } => {
                let value = self.eval(expr)?;
                Self::eval_unary(*op, &value, *line)
            },
            Expr::Binary { left, op, right, line } => {
                let left_value = self.eval(left)?;
                let right_value = self.eval(right)?;
                Self::eval_binary(*op, &left_value, &right_value, *line)
            },
            Expr::Logical { left, op, right, .. } => {
                let left_value = self.eval(left)?;
                match op {
                    LogicalOperator::Or if left_value.is_truthy() => Ok(left_value),
                    LogicalOperator::And if !left_value.is_truthy() => Ok(left_value),
                    _ => self.eval(right),
                }
            },
            Expr::Grouping { expr, .. } => self.eval(expr),
            Expr::GroupingAbs { expr, line } => {
                let value = self.eval(expr)?;
                Ok(Value::Number(value.as_number(*line)?.abs()))
            },
            Expr::Call { callee, arguments, receiver, line } => {
                self.eval_call(callee, arguments, receiver.as_deref(), *line)
            },
            Expr::ArrayLiteral { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval(element)?);
                }
                Ok(values.into())
            },
            Expr::MapLiteral { entries, line } => self.eval_map_literal(entries, *line),
            Expr::Function { declaration, .. } => Ok(self.make_function(declaration)),
        }
    }

    /// Evaluates a single statement, producing a control-flow signal.
    ///
    /// Handles expression statements, variable declarations, blocks,
    /// conditionals, loops, function declarations, and `return`.
    ///
    /// # Parameters
    /// - `stmt`: Statement to execute.
    ///
    /// # Returns
    /// `Flow::Normal` with the statement's value, or `Flow::Return` when a
    /// `return` is unwinding.
    pub fn execute(&mut self, stmt: &Stmt) -> EvalResult<Flow> {
        match stmt {
            Stmt::Expression { expr, .. } => Ok(Flow::Normal(self.eval(expr)?)),
            Stmt::VarDecl { name, init, line } => {
                let value = self.eval_var_init(init, *line)?;
                self.env.define(name, value);
                Ok(Flow::Normal(Value::Nil))
            },
            Stmt::Block { statements, .. } => {
                let child = Environment::with_enclosing(&self.env);
                self.execute_block(statements, child)
            },
            Stmt::If { condition, then_branch, else_branch, .. } => {
                if self.eval(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal(Value::Nil))
                }
            },
            Stmt::While { condition, body, .. } => {
                while self.eval(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal(Value::Nil))
            },
            Stmt::Function { declaration, .. } => {
                let function = self.make_function(declaration);
                let name = declaration.name.as_deref().unwrap_or_default();
                self.env.define(name, function);
                Ok(Flow::Normal(Value::Nil))
            },
            Stmt::Return { value, .. } => {
                let result = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(result))
            },
        }
    }

    /// Executes statements inside `env`, restoring the previous
    /// environment afterwards.
    ///
    /// The child environment is discarded when the block exits, even on a
    /// `return` or an error, so a binding declared in an inner block never
    /// outlives it.
    pub(crate) fn execute_block(&mut self,
                                statements: &[Stmt],
                                env: Rc<Environment>)
                                -> EvalResult<Flow> {
        let previous = Rc::clone(&self.env);
        self.env = env;

        let mut flow = Ok(Flow::Normal(Value::Nil));
        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal(_)) => {},
                other => {
                    flow = other;
                    break;
                },
            }
        }

        self.env = previous;
        flow
    }

    /// Computes the initializer of a variable declaration.
    ///
    /// - `Scalar`: the expression's value.
    /// - `Array`: a fresh array; with the bare fixed-size syntax the array
    ///   holds `declared_size` nils, otherwise one slot per item, each item
    ///   recursively and fully evaluated.
    /// - `Map`: a fresh map with keys and values fully evaluated.
    /// - `Function`: a function value closing over the current
    ///   environment.
    /// - `None`: nil.
    fn eval_var_init(&mut self, init: &VarInit, line: usize) -> EvalResult<Value> {
        match init {
            VarInit::None => Ok(Value::Nil),
            VarInit::Scalar(expr) => self.eval(expr),
            VarInit::Array { items, declared_size } => {
                if items.is_empty() && let Some(size) = declared_size {
                    return Ok(vec![Value::Nil; *size].into());
                }
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item)?);
                }
                Ok(values.into())
            },
            VarInit::Map(entries) => self.eval_map_literal(entries, line),
            VarInit::Function(declaration) => Ok(self.make_function(declaration)),
        }
    }

    /// Builds a fresh map from literal entries, evaluating keys and values
    /// in source order.
    fn eval_map_literal(&mut self, entries: &[MapEntry], line: usize) -> EvalResult<Value> {
        let mut values = HashMap::with_capacity(entries.len());
        for entry in entries {
            let key_value = self.eval(&entry.key)?;
            let key = MapKey::from_value(&key_value, line)?;
            let value = self.eval(&entry.value)?;
            values.insert(key, value);
        }
        Ok(values.into())
    }

    /// Wraps a declaration into a function value capturing the current
    /// environment as its closure.
    fn make_function(&self, declaration: &Rc<FunctionDecl>) -> Value {
        Value::Callable(Callable::Function(Rc::new(UserFunction {
            declaration: Rc::clone(declaration),
            closure:     Rc::clone(&self.env),
        })))
    }

    /// Evaluates an assignment expression and yields the assigned value.
    ///
    /// Without selectors, the innermost binding of `name` is overwritten;
    /// assigning to a name that is undefined anywhere in the chain is a
    /// runtime error. With selectors, the value is written through the
    /// selector path into the composite bound to `name`.
    fn eval_assign(&mut self,
                   name: &str,
                   value: &Expr,
                   selectors: &[Vec<Expr>],
                   line: usize)
                   -> EvalResult<Value> {
        let value = self.eval(value)?;

        if selectors.is_empty() {
            if !self.env.assign(name, value.clone()) {
                return Err(RuntimeError::UndefinedVariable { name: name.to_string(),
                                                             line });
            }
            return Ok(value);
        }

        self.assign_selector_path(name, selectors, value.clone(), line)?;
        Ok(value)
    }
}
