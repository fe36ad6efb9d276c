use std::rc::Rc;

/// Represents a literal value in the language.
///
/// `LiteralValue` covers all raw, constant values that can appear directly in
/// source code: `nil`, booleans, numbers, and strings. It is used in the AST
/// to represent literal expressions and as a convenient container for
/// constants produced by desugaring.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// The absent value, written `nil`.
    Nil,
    /// A boolean literal value: `true` or `false`.
    Bool(bool),
    /// A 64-bit floating-point number literal.
    Number(f64),
    /// A double-quoted string literal with escapes already interpreted.
    Str(String),
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// An abstract syntax tree (AST) node representing an expression.
///
/// `Expr` covers all types of expressions, from literals and variables to
/// assignments, calls, logical operators, composite literals, and the
/// absolute-value grouping form. Each variant carries the source line it was
/// parsed from.
///
/// A `selectors` field is an ordered list of selector groups. Each group is
/// one bracket's worth of comma-separated index expressions; a dotted access
/// `.name` is normalized by the parser into a one-element group holding the
/// name as a string literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value (`nil`, boolean, number, or string).
    Literal {
        /// The constant value.
        value: LiteralValue,
        /// Line number in the source code.
        line:  usize,
    },
    /// Reference to a variable by name, with optional trailing selectors.
    Variable {
        /// Name of the variable.
        name:      String,
        /// Selector groups applied left to right after resolution.
        selectors: Vec<Vec<Expr>>,
        /// Line number in the source code.
        line:      usize,
    },
    /// Assignment to a variable, optionally through a selector path.
    Assign {
        /// Name of the target variable.
        name:      String,
        /// The value being assigned.
        value:     Box<Expr>,
        /// Selector groups describing the path into the target.
        selectors: Vec<Vec<Expr>>,
        /// Line number in the source code.
        line:      usize,
    },
    /// A unary operation (negation, logical not, prefix increment).
    Unary {
        /// The unary operator to apply.
        op:   UnaryOperator,
        /// The operand expression.
        expr: Box<Expr>,
        /// Line number in the source code.
        line: usize,
    },
    /// A binary operation (arithmetic, comparison, equality).
    Binary {
        /// Left operand.
        left:  Box<Expr>,
        /// The operator.
        op:    BinaryOperator,
        /// Right operand.
        right: Box<Expr>,
        /// Line number in the source code.
        line:  usize,
    },
    /// A short-circuiting logical operation (`and` / `or`).
    Logical {
        /// Left operand.
        left:  Box<Expr>,
        /// The logical operator.
        op:    LogicalOperator,
        /// Right operand.
        right: Box<Expr>,
        /// Line number in the source code.
        line:  usize,
    },
    /// A parenthesized expression.
    Grouping {
        /// The inner expression.
        expr: Box<Expr>,
        /// Line number in the source code.
        line: usize,
    },
    /// An absolute-value grouping, written `|expr|`.
    GroupingAbs {
        /// The inner expression.
        expr: Box<Expr>,
        /// Line number in the source code.
        line: usize,
    },
    /// A call expression.
    ///
    /// When the callee is a variable with at least one selector group, the
    /// parser records the receiver (the variable minus its last group) so
    /// the evaluator can dispatch string methods and bind `this`.
    Call {
        /// The callee expression.
        callee:    Box<Expr>,
        /// Argument expressions, evaluated left to right.
        arguments: Vec<Expr>,
        /// The receiver hint for method-style calls.
        receiver:  Option<Box<Expr>>,
        /// Line number in the source code.
        line:      usize,
    },
    /// Array literal expression, including nested composite literals.
    ArrayLiteral {
        /// Elements of the array.
        elements: Vec<Expr>,
        /// Line number in the source code.
        line:     usize,
    },
    /// Map literal expression.
    MapLiteral {
        /// Key/value entries of the map.
        entries: Vec<MapEntry>,
        /// Line number in the source code.
        line:    usize,
    },
    /// An anonymous function literal, written `fun (params) { body }`.
    Function {
        /// The function's parameters and body.
        declaration: Rc<FunctionDecl>,
        /// Line number in the source code.
        line:        usize,
    },
}

impl Expr {
    /// Gets the line number from `self`.
    ///
    /// ## Example
    /// ```
    /// use selva::ast::Expr;
    ///
    /// let expr = Expr::Variable { name:      "x".to_string(),
    ///                             selectors: Vec::new(),
    ///                             line:      5, };
    ///
    /// assert_eq!(expr.line_number(), 5);
    /// ```
    #[must_use]
    pub const fn line_number(&self) -> usize {
        match self {
            Self::Literal { line, .. }
            | Self::Variable { line, .. }
            | Self::Assign { line, .. }
            | Self::Unary { line, .. }
            | Self::Binary { line, .. }
            | Self::Logical { line, .. }
            | Self::Grouping { line, .. }
            | Self::GroupingAbs { line, .. }
            | Self::Call { line, .. }
            | Self::ArrayLiteral { line, .. }
            | Self::MapLiteral { line, .. }
            | Self::Function { line, .. } => *line,
        }
    }
}

/// One `key: value` (or `key => function`) entry of a map literal.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    /// The key expression. Bare identifier keys are normalized by the parser
    /// into string literals.
    pub key:   Expr,
    /// The value expression.
    pub value: Expr,
}

/// Represents a function definition: a parameter list and a body of
/// statements. Named for declarations, anonymous for function literals.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    /// The name of the function, if it has one.
    pub name:   Option<String>,
    /// The parameter names, in order.
    pub params: Vec<String>,
    /// The statements forming the function body.
    pub body:   Vec<Stmt>,
    /// Line number in the source code.
    pub line:   usize,
}

/// Represents a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// A standalone expression evaluated for its result.
    Expression {
        /// The expression to evaluate.
        expr: Expr,
        /// Line number in the source code.
        line: usize,
    },
    /// A variable declaration using `var` or `let`.
    VarDecl {
        /// The name of the variable.
        name: String,
        /// The initializer variant.
        init: VarInit,
        /// Line number in the source code.
        line: usize,
    },
    /// A braced block of statements with its own scope.
    Block {
        /// Statements inside the block.
        statements: Vec<Stmt>,
        /// Line number in the source code.
        line:       usize,
    },
    /// Conditional statement with an optional `else` branch.
    If {
        /// The condition expression.
        condition:   Expr,
        /// Statement executed when the condition is truthy.
        then_branch: Box<Stmt>,
        /// Statement executed otherwise, if present.
        else_branch: Option<Box<Stmt>>,
        /// Line number in the source code.
        line:        usize,
    },
    /// A `while` loop. `for` loops desugar to this at parse time.
    While {
        /// The loop condition, evaluated before each iteration.
        condition: Expr,
        /// The loop body.
        body:      Box<Stmt>,
        /// Line number in the source code.
        line:      usize,
    },
    /// A named function declaration.
    Function {
        /// The function's name, parameters, and body.
        declaration: Rc<FunctionDecl>,
        /// Line number in the source code.
        line:        usize,
    },
    /// A `return` statement with an optional result expression.
    Return {
        /// The result expression, or `None` for a bare `return;`.
        value: Option<Expr>,
        /// Line number in the source code.
        line:  usize,
    },
}

/// The initializer variants of a variable declaration.
///
/// The `varTail` grammar admits a plain scalar initializer, an array literal
/// with an optional declared size, a map literal, a function literal, or no
/// initializer at all (the variable starts as `nil`).
#[derive(Debug, Clone, PartialEq)]
pub enum VarInit {
    /// No initializer: `var x;`.
    None,
    /// A scalar expression initializer: `var x = expr;`.
    Scalar(Expr),
    /// An array literal initializer: `var a[] = [ ... ];` or
    /// `var a[N] = [ ... ];` or the bare fixed-size form `var a[N];`.
    Array {
        /// Element expressions, in order.
        items:         Vec<Expr>,
        /// The declared size, when the `[N]` syntax was used. With items
        /// present the parser guarantees it equals `items.len()`; without
        /// items the array is created as `N` nils.
        declared_size: Option<usize>,
    },
    /// A map literal initializer: `var m{} = { ... };`.
    Map(Vec<MapEntry>),
    /// A function literal initializer: `var f = fun (params) { ... };`.
    Function(Rc<FunctionDecl>),
}

/// Represents a binary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Addition or string concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication or string repetition (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Exponentiation (`**`)
    Pow,
    /// Percentage (`%`): `a % b` is `a * b / 100`
    Percent,
    /// Less than (`<`)
    Less,
    /// Greater than (`>`)
    Greater,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Equal to (`==`)
    Equal,
    /// Not equal to (`!=`, also written `<>`)
    NotEqual,
}

/// Represents a unary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Arithmetic negation (e.g. `-x`).
    Negate,
    /// Logical NOT over truthiness (e.g. `!x`).
    Not,
    /// Prefix increment (`++x`): yields `x + 1` without mutating `x`.
    Increment,
    /// Prefix decrement (`--x`): yields `x - 1` without mutating `x`.
    Decrement,
}

/// Represents a short-circuiting logical operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogicalOperator {
    /// Logical conjunction (`and`).
    And,
    /// Logical disjunction (`or`).
    Or,
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use BinaryOperator::{
            Add, Div, Equal, Greater, GreaterEqual, Less, LessEqual, Mul, NotEqual, Percent, Pow,
            Sub,
        };
        let operator = match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Pow => "**",
            Percent => "%",
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            Equal => "==",
            NotEqual => "!=",
        };
        write!(f, "{operator}")
    }
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::Negate => "-",
            Self::Not => "!",
            Self::Increment => "++",
            Self::Decrement => "--",
        };
        write!(f, "{operator}")
    }
}

impl std::fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::And => "and",
            Self::Or => "or",
        };
        write!(f, "{operator}")
    }
}
