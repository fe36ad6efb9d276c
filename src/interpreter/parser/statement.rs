use std::{iter::Peekable, rc::Rc};

use crate::{
    ast::{Expr, FunctionDecl, LiteralValue, Stmt, VarInit},
    error::ParseError,
    interpreter::{
        parser::{
            core::{ParseResult, parse_expression},
            unary::{parse_array_elements, parse_map_entries},
            utils::{expect_token, parse_comma_separated, parse_identifier},
        },
        scanner::Token,
    },
};

/// Parses a single declaration.
///
/// A declaration may be one of:
/// - a function declaration (`fun name(params) { body }`),
/// - a variable declaration (`var` or `let` with any `varTail` form),
/// - a statement.
///
/// Reserved keywords in declaration position are rejected with a dedicated
/// diagnostic rather than silently accepted.
///
/// # Parameters
/// - `tokens`: Token iterator containing `(Token, line)` pairs.
///
/// # Returns
/// A parsed [`Stmt`] node.
pub fn parse_declaration<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.peek() {
        Some((Token::Fun, line)) => {
            let line = *line;
            tokens.next();
            let (name, _) = parse_identifier(tokens)?;
            let declaration = parse_function_parts(tokens, Some(name), line)?;
            Ok(Stmt::Function { declaration, line })
        },
        Some((Token::Var | Token::Let, line)) => {
            let line = *line;
            tokens.next();
            parse_var_declaration(tokens, line)
        },
        Some((token, line)) if token.reserved_word().is_some() => {
            let word = token.reserved_word().unwrap_or_default().to_string();
            Err(ParseError::ReservedWord { word, line: *line })
        },
        _ => parse_statement(tokens),
    }
}

/// Parses the parameter list and body shared by function declarations,
/// function literals, and `=>` map entries.
///
/// The caller has already consumed everything up to the parameter list;
/// parsing starts at `(`.
///
/// Grammar: `functionParts := "(" (IDENT ("," IDENT)*)? ")" block`
///
/// # Parameters
/// - `tokens`: Token iterator positioned at `(`.
/// - `name`: The function's name, or `None` for anonymous literals.
/// - `line`: Line of the introducing token, for diagnostics.
///
/// # Returns
/// The shared declaration node.
///
/// # Errors
/// Returns a `ParseError` if the parameter list or body is malformed, or
/// if there are more than 255 parameters.
pub(crate) fn parse_function_parts<'a, I>(tokens: &mut Peekable<I>,
                                          name: Option<String>,
                                          line: usize)
                                          -> ParseResult<Rc<FunctionDecl>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    expect_token(tokens, &Token::LeftParen, "Expected '(' before parameters")?;
    let params =
        parse_comma_separated(tokens, |t| parse_identifier(t).map(|(n, _)| n), &Token::RightParen)?;
    if params.len() > 255 {
        return Err(ParseError::TooManyParameters { line });
    }

    expect_token(tokens, &Token::LeftBrace, "Expected '{' before function body")?;
    let body = parse_block_statements(tokens)?;

    Ok(Rc::new(FunctionDecl { name,
                              params,
                              body,
                              line }))
}

/// Parses the tail of a `var` / `let` declaration, whose keyword has been
/// consumed.
///
/// Supported forms:
///
/// - `var x;`
/// - `var x = expression;`
/// - `var f = fun (params) { body };`
/// - `var a[] = [ items ];`
/// - `var a[N] = [ items ];` (N must equal the item count)
/// - `var a[N];` (an array of N nils)
/// - `var m{} = { entries };`
///
/// # Parameters
/// - `tokens`: Token iterator positioned at the variable name.
/// - `line`: Line of the `var` / `let` keyword.
///
/// # Returns
/// A [`Stmt::VarDecl`] carrying the matching [`VarInit`] variant.
pub(crate) fn parse_var_declaration<'a, I>(tokens: &mut Peekable<I>,
                                           line: usize)
                                           -> ParseResult<Stmt>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (name, _) = parse_identifier(tokens)?;

    let init = match tokens.peek() {
        Some((Token::Equal, _)) => {
            tokens.next();
            let init = if let Some((Token::Fun, fun_line)) = tokens.peek() {
                let fun_line = *fun_line;
                tokens.next();
                VarInit::Function(parse_function_parts(tokens, Some(name.clone()), fun_line)?)
            } else {
                VarInit::Scalar(parse_expression(tokens)?)
            };
            expect_token(tokens, &Token::Semicolon, "Expected ';' after variable declaration")?;
            init
        },
        Some((Token::LeftBracket, _)) => {
            tokens.next();
            parse_array_tail(tokens, line)?
        },
        Some((Token::LeftBrace, _)) => {
            tokens.next();
            expect_token(tokens, &Token::RightBrace, "Expected '}' after '{'")?;
            expect_token(tokens, &Token::Equal, "Expected '=' after '}'")?;
            expect_token(tokens, &Token::LeftBrace, "Expected '{' after '='")?;
            let entries = parse_map_entries(tokens)?;
            expect_token(tokens, &Token::Semicolon, "Expected ';' after variable declaration")?;
            VarInit::Map(entries)
        },
        _ => {
            expect_token(tokens, &Token::Semicolon, "Expected ';' after variable declaration")?;
            VarInit::None
        },
    };

    Ok(Stmt::VarDecl { name, init, line })
}

/// Parses the array form of a declaration tail, after its `[` has been
/// consumed: an optional declared size, then an optional `= [ items ]`
/// initializer.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
fn parse_array_tail<'a, I>(tokens: &mut Peekable<I>, line: usize) -> ParseResult<VarInit>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let declared_size = if let Some((Token::Number(n), size_line)) = tokens.peek() {
        let (n, size_line) = (*n, *size_line);
        tokens.next();
        if n.fract() != 0.0 || n < 0.0 {
            return Err(ParseError::UnexpectedToken {
                token: "Array size must be a non-negative integer".to_string(),
                line:  size_line,
            });
        }
        Some(n as usize)
    } else {
        None
    };
    expect_token(tokens, &Token::RightBracket, "Expected ']' after array size")?;

    let items = if let Some((Token::Equal, _)) = tokens.peek() {
        tokens.next();
        expect_token(tokens, &Token::LeftBracket, "Expected '[' after '='")?;
        parse_array_elements(tokens)?
    } else {
        Vec::new()
    };

    if let Some(declared) = declared_size
       && !items.is_empty()
       && declared != items.len()
    {
        return Err(ParseError::ArraySizeMismatch { declared,
                                                   found: items.len(),
                                                   line });
    }

    expect_token(tokens, &Token::Semicolon, "Expected ';' after variable declaration")?;
    Ok(VarInit::Array { items, declared_size })
}

/// Parses a single statement.
///
/// A statement is a block, a conditional, a loop, a `return`, or an
/// expression statement. A `{` in statement position always begins a
/// block; map literals only occur in expression position.
pub fn parse_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.peek() {
        Some((Token::LeftBrace, line)) => {
            let line = *line;
            tokens.next();
            let statements = parse_block_statements(tokens)?;
            Ok(Stmt::Block { statements, line })
        },
        Some((Token::If, _)) => parse_if_statement(tokens),
        Some((Token::While, _)) => parse_while_statement(tokens),
        Some((Token::For, _)) => parse_for_statement(tokens),
        Some((Token::Return, _)) => parse_return_statement(tokens),
        _ => {
            let line = tokens.peek().map_or(0, |(_, l)| *l);
            let expr = parse_expression(tokens)?;
            expect_token(tokens, &Token::Semicolon, "Expected ';' after expression")?;
            Ok(Stmt::Expression { expr, line })
        },
    }
}

/// Parses declarations until the matching `}`, consuming it.
pub(crate) fn parse_block_statements<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<Stmt>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut statements = Vec::new();
    loop {
        match tokens.peek() {
            Some((Token::RightBrace, _)) => {
                tokens.next();
                return Ok(statements);
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line: 0 }),
            _ => statements.push(parse_declaration(tokens)?),
        }
    }
}

/// Parses an `if` statement with an optional `else` branch.
///
/// Grammar: `ifStmt := "if" "(" expression ")" statement ("else" statement)?`
fn parse_if_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (_, line) = tokens.next().expect("peeked 'if'");
    expect_token(tokens, &Token::LeftParen, "Expected '(' after 'if'")?;
    let condition = parse_expression(tokens)?;
    expect_token(tokens, &Token::RightParen, "Expected ')' after if condition")?;

    let then_branch = Box::new(parse_statement(tokens)?);
    let else_branch = if let Some((Token::Else, _)) = tokens.peek() {
        tokens.next();
        Some(Box::new(parse_statement(tokens)?))
    } else {
        None
    };

    Ok(Stmt::If { condition,
                  then_branch,
                  else_branch,
                  line: *line, })
}

/// Parses a `while` statement.
///
/// Grammar: `whileStmt := "while" "(" expression ")" statement`
fn parse_while_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (_, line) = tokens.next().expect("peeked 'while'");
    expect_token(tokens, &Token::LeftParen, "Expected '(' after 'while'")?;
    let condition = parse_expression(tokens)?;
    expect_token(tokens, &Token::RightParen, "Expected ')' after while condition")?;
    let body = Box::new(parse_statement(tokens)?);

    Ok(Stmt::While { condition,
                     body,
                     line: *line, })
}

/// Parses a `for` statement and desugars it at parse time.
///
/// `for (init; cond; incr) body` becomes
/// `{ init; while (cond) { body; incr; } }`. An absent condition becomes
/// the literal `true`.
///
/// Grammar:
/// ```text
///     forStmt := "for" "(" (varDecl | exprStmt | ";")
///                expression? ";" expression? ")" statement
/// ```
fn parse_for_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (_, line) = tokens.next().expect("peeked 'for'");
    let line = *line;
    expect_token(tokens, &Token::LeftParen, "Expected '(' after 'for'")?;

    let initializer = match tokens.peek() {
        Some((Token::Semicolon, _)) => {
            tokens.next();
            None
        },
        Some((Token::Var | Token::Let, decl_line)) => {
            let decl_line = *decl_line;
            tokens.next();
            Some(parse_var_declaration(tokens, decl_line)?)
        },
        _ => {
            let expr = parse_expression(tokens)?;
            expect_token(tokens, &Token::Semicolon, "Expected ';' after loop initializer")?;
            Some(Stmt::Expression { expr, line })
        },
    };

    let condition = if let Some((Token::Semicolon, _)) = tokens.peek() {
        None
    } else {
        Some(parse_expression(tokens)?)
    };
    expect_token(tokens, &Token::Semicolon, "Expected ';' after loop condition")?;

    let increment = if let Some((Token::RightParen, _)) = tokens.peek() {
        None
    } else {
        Some(parse_expression(tokens)?)
    };
    expect_token(tokens, &Token::RightParen, "Expected ')' after for clauses")?;

    let mut body = parse_statement(tokens)?;

    if let Some(increment) = increment {
        body = Stmt::Block { statements: vec![body, Stmt::Expression { expr: increment, line }],
                             line };
    }

    let condition = condition.unwrap_or(Expr::Literal { value: LiteralValue::Bool(true),
                                                        line });
    body = Stmt::While { condition,
                         body: Box::new(body),
                         line };

    if let Some(initializer) = initializer {
        body = Stmt::Block { statements: vec![initializer, body],
                             line };
    }

    Ok(body)
}

/// Parses a `return` statement with an optional result expression.
///
/// Grammar: `returnStmt := "return" expression? ";"`
fn parse_return_statement<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Stmt>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (_, line) = tokens.next().expect("peeked 'return'");
    let value = if let Some((Token::Semicolon, _)) = tokens.peek() {
        None
    } else {
        Some(parse_expression(tokens)?)
    };
    expect_token(tokens, &Token::Semicolon, "Expected ';' after return value")?;

    Ok(Stmt::Return { value,
                      line: *line, })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::scanner::scan_tokens;

    fn parse_one(source: &str) -> Stmt {
        let (tokens, errors) = scan_tokens(source);
        assert!(errors.is_empty());
        let mut iter = tokens.iter().peekable();
        parse_declaration(&mut iter).expect("declaration should parse")
    }

    #[test]
    fn var_without_initializer() {
        let Stmt::VarDecl { init, .. } = parse_one("var x;") else {
            panic!("expected a declaration");
        };
        assert!(matches!(init, VarInit::None));
    }

    #[test]
    fn fixed_size_array_declaration() {
        let Stmt::VarDecl { init, .. } = parse_one("var a[3] = [1, 2, 3];") else {
            panic!("expected a declaration");
        };
        let VarInit::Array { items, declared_size } = init else {
            panic!("expected an array initializer");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(declared_size, Some(3));
    }

    #[test]
    fn mismatched_declared_size_is_an_error() {
        let (tokens, _) = scan_tokens("var a[2] = [1, 2, 3];");
        let mut iter = tokens.iter().peekable();
        let result = parse_declaration(&mut iter);
        assert!(matches!(
            result,
            Err(ParseError::ArraySizeMismatch { declared: 2, found: 3, .. })
        ));
    }

    #[test]
    fn bare_fixed_size_array() {
        let Stmt::VarDecl { init, .. } = parse_one("var a[4];") else {
            panic!("expected a declaration");
        };
        assert!(matches!(init, VarInit::Array { declared_size: Some(4), ref items } if items.is_empty()));
    }

    #[test]
    fn map_declaration_tail() {
        let Stmt::VarDecl { init, .. } = parse_one("var m{} = { a: 1, b: 2 };") else {
            panic!("expected a declaration");
        };
        assert!(matches!(init, VarInit::Map(ref entries) if entries.len() == 2));
    }

    #[test]
    fn function_literal_initializer() {
        let Stmt::VarDecl { init, .. } = parse_one("var f = fun (a) { return a; };") else {
            panic!("expected a declaration");
        };
        assert!(matches!(init, VarInit::Function(_)));
    }

    #[test]
    fn named_function_declaration() {
        let Stmt::Function { declaration, .. } = parse_one("fun add(a, b) { return a + b; }")
        else {
            panic!("expected a function declaration");
        };
        assert_eq!(declaration.name.as_deref(), Some("add"));
        assert_eq!(declaration.params, vec!["a".to_string(), "b".to_string()]);
    }
}
