use crate::{
    ast::{Expr, LiteralValue},
    error::RuntimeError,
    interpreter::{
        environment::Environment,
        evaluator::{
            core::{Context, EvalResult, Flow},
            strings,
        },
        value::core::{Callable, UserFunction, Value},
    },
};

impl Context {
    /// Evaluates a call expression.
    ///
    /// The callee is evaluated first. When it resolves to a string and the
    /// call carries a selector-based method name (the last selector group
    /// of the callee names a registered string method), the call is
    /// dispatched to the string-method registry with the string receiver
    /// and the raw argument expressions; the registry evaluates them
    /// itself.
    ///
    /// Otherwise the callee must be callable. Arguments are evaluated
    /// strictly left to right, the arity is checked, and the callable is
    /// invoked with the receiver (resolved from the call's receiver hint)
    /// bound to `this`.
    ///
    /// # Parameters
    /// - `callee`: The callee expression.
    /// - `arguments`: The raw argument expressions.
    /// - `receiver`: The receiver hint recorded by the parser, if any.
    /// - `line`: Line number for error reporting.
    ///
    /// # Returns
    /// The call's result.
    pub(crate) fn eval_call(&mut self,
                            callee: &Expr,
                            arguments: &[Expr],
                            receiver: Option<&Expr>,
                            line: usize)
                            -> EvalResult<Value> {
        let callee_value = self.eval(callee)?;

        if let Value::Str(receiver_string) = &callee_value
           && let Some(method) = trailing_method_name(callee)
           && let Some(def) = strings::core::find_string_method(method)
        {
            if !def.arity.check(arguments.len()) {
                return Err(RuntimeError::ArityMismatch { expected: def.arity.expected(),
                                                         found: arguments.len(),
                                                         line });
            }
            let receiver_string = receiver_string.clone();
            return (def.func)(self, &receiver_string, arguments, line);
        }

        let Value::Callable(callable) = callee_value else {
            return Err(RuntimeError::NotCallable { line });
        };

        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            args.push(self.eval(argument)?);
        }

        let this = match receiver {
            Some(expr) => self.eval(expr)?,
            None => Value::Nil,
        };

        self.call_value(&callable, args, this, line)
    }

    /// Invokes a callable with already-evaluated arguments.
    ///
    /// Built-ins check their declared arity (`Variadic` accepts any count)
    /// and run directly. User functions check an exact parameter match and
    /// execute their body in a fresh environment.
    ///
    /// # Parameters
    /// - `callable`: The callable to invoke.
    /// - `args`: Evaluated arguments, in order.
    /// - `this`: The receiver value bound to `this` (nil when absent).
    /// - `line`: Line number for error reporting.
    ///
    /// # Returns
    /// The callable's result.
    pub fn call_value(&mut self,
                      callable: &Callable,
                      args: Vec<Value>,
                      this: Value,
                      line: usize)
                      -> EvalResult<Value> {
        match callable {
            Callable::Builtin(def) => {
                if !def.arity.check(args.len()) {
                    return Err(RuntimeError::ArityMismatch { expected: def.arity.expected(),
                                                             found: args.len(),
                                                             line });
                }
                (def.func)(&args, line)
            },
            Callable::Function(function) => self.call_function(function, args, this, line),
        }
    }

    /// Executes a user-defined function.
    ///
    /// A new environment is created whose parent is the function's
    /// captured closure. Each parameter is bound to its argument and
    /// `this` to the receiver. The body runs as a block; a `return`
    /// signal is converted back into the call's result here, and a normal
    /// fall-through returns nil.
    fn call_function(&mut self,
                     function: &UserFunction,
                     args: Vec<Value>,
                     this: Value,
                     line: usize)
                     -> EvalResult<Value> {
        let declaration = &function.declaration;
        if args.len() != declaration.params.len() {
            return Err(RuntimeError::ArityMismatch { expected: declaration.params.len(),
                                                     found: args.len(),
                                                     line });
        }

        let env = Environment::with_enclosing(&function.closure);
        for (param, arg) in declaration.params.iter().zip(args) {
            env.define(param, arg);
        }
        env.define("this", this);

        match self.execute_block(&declaration.body, env)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal(_) => Ok(Value::Nil),
        }
    }
}

/// Extracts the method name a call would dispatch on: the callee must be a
/// variable whose last selector group is a single string literal.
fn trailing_method_name(callee: &Expr) -> Option<&str> {
    if let Expr::Variable { selectors, .. } = callee
       && let Some(group) = selectors.last()
       && let [Expr::Literal { value: LiteralValue::Str(name), .. }] = group.as_slice()
    {
        return Some(name);
    }
    None
}
