use std::iter::Peekable;

use crate::{
    ast::{Expr, LiteralValue, MapEntry, UnaryOperator},
    error::ParseError,
    interpreter::{
        parser::{
            core::{ParseResult, parse_expression},
            statement::parse_function_parts,
            utils::{expect_token, parse_comma_separated, parse_identifier},
        },
        scanner::Token,
    },
};

/// Parses a unary expression.
///
/// Supports prefix operators:
/// - `-`  (numeric negation)
/// - `!`  (logical not)
/// - `++` (yields `x + 1` without mutation)
/// - `--` (yields `x - 1` without mutation)
///
/// Unary operators are right-associative, so an input like `!-x` is parsed
/// as `!(-x)`.
///
/// If no unary operator is present, the function delegates to
/// [`parse_call`].
///
/// Grammar:
/// ```text
///     unary := ("-" | "!" | "++" | "--") unary
///            | call
/// ```
/// # Parameters
/// - `tokens`: Token iterator with lookahead.
///
/// # Returns
/// An [`Expr::Unary`] or a call-level expression.
pub(crate) fn parse_unary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let op = match tokens.peek() {
        Some((Token::Minus, _)) => Some(UnaryOperator::Negate),
        Some((Token::Bang, _)) => Some(UnaryOperator::Not),
        Some((Token::PlusPlus, _)) => Some(UnaryOperator::Increment),
        Some((Token::MinusMinus, _)) => Some(UnaryOperator::Decrement),
        _ => None,
    };

    if let Some(op) = op {
        let (_, line) = tokens.next().expect("peeked operator");
        let expr = parse_unary(tokens)?;
        return Ok(Expr::Unary { op,
                                expr: Box::new(expr),
                                line: *line, });
    }

    parse_call(tokens)
}

/// Parses a call-level expression.
///
/// After a primary expression, any number of `(args)` invocations may
/// follow; each one wraps the expression so far as the callee of a new
/// call.
///
/// Grammar: `call := primary ("(" arguments? ")")*`
pub(crate) fn parse_call<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut expr = parse_primary(tokens)?;

    while let Some((Token::LeftParen, line)) = tokens.peek() {
        let line = *line;
        tokens.next();
        expr = finish_call(tokens, expr, line)?;
    }

    Ok(expr)
}

/// Parses the argument list of a call whose `(` has been consumed.
///
/// When the callee is a variable with at least one selector group, the
/// receiver (the variable minus its last group) is recorded on the call
/// node. The evaluator uses the receiver to dispatch string methods and to
/// bind `this` inside user functions held in maps.
fn finish_call<'a, I>(tokens: &mut Peekable<I>, callee: Expr, line: usize) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let receiver = match &callee {
        Expr::Variable { name, selectors, line } if !selectors.is_empty() => {
            Some(Box::new(Expr::Variable { name:      name.clone(),
                                           selectors: selectors[..selectors.len() - 1].to_vec(),
                                           line:      *line, }))
        },
        _ => None,
    };

    let arguments = parse_comma_separated(tokens, parse_expression, &Token::RightParen)?;
    if arguments.len() > 255 {
        return Err(ParseError::TooManyArguments { line });
    }

    Ok(Expr::Call { callee: Box::new(callee),
                    arguments,
                    receiver,
                    line })
}

/// Parses a primary (atomic) expression.
///
/// Primary expressions form the base of the expression grammar and include:
/// - `nil`, boolean, numeric, and string literals
/// - identifiers with trailing selectors
/// - parenthesized expressions
/// - absolute-value groupings (`|expr|`)
/// - array literals (`[ ... ]`)
/// - map literals (`{ ... }`)
/// - anonymous function literals (`fun (params) { body }`)
///
/// Reserved keywords and operators in primary position are rejected with a
/// dedicated diagnostic.
///
/// Grammar (simplified):
/// ```text
///     primary := literal
///              | IDENT selector*
///              | "(" expression ")"
///              | "|" expression "|"
///              | "[" arrayElements "]"
///              | "{" mapEntries "}"
///              | "fun" "(" params? ")" block
/// ```
/// # Parameters
/// - `tokens`: Token iterator positioned at the start of a primary
///   expression.
///
/// # Returns
/// The parsed primary [`Expr`] or a `ParseError` on failure.
pub(crate) fn parse_primary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let peeked = tokens.peek()
                       .ok_or(ParseError::UnexpectedEndOfInput { line: 0 })?;

    match peeked {
        (Token::Nil, line) => {
            let line = *line;
            tokens.next();
            Ok(Expr::Literal { value: LiteralValue::Nil,
                               line })
        },
        (Token::True, line) => {
            let line = *line;
            tokens.next();
            Ok(Expr::Literal { value: true.into(),
                               line })
        },
        (Token::False, line) => {
            let line = *line;
            tokens.next();
            Ok(Expr::Literal { value: false.into(),
                               line })
        },
        (Token::Number(n), line) => {
            let (value, line) = (*n, *line);
            tokens.next();
            Ok(Expr::Literal { value: value.into(),
                               line })
        },
        (Token::Str(s), line) => {
            let (value, line) = (s.clone(), *line);
            tokens.next();
            Ok(Expr::Literal { value: value.into(),
                               line })
        },
        (Token::Identifier(_), _) => parse_variable(tokens),
        (Token::LeftParen, _) => parse_grouping(tokens),
        (Token::Pipe, _) => parse_abs(tokens),
        (Token::LeftBracket, _) => parse_array_literal(tokens),
        (Token::LeftBrace, _) => parse_map_literal(tokens),
        (Token::Fun, _) => parse_function_literal(tokens),
        (tok, line) => {
            if let Some(word) = tok.reserved_word() {
                return Err(ParseError::ReservedWord { word: word.to_string(),
                                                      line: *line, });
            }
            Err(ParseError::UnexpectedToken { token: format!("Unexpected token {tok:?}"),
                                              line:  *line, })
        },
    }
}

/// Parses an identifier with its trailing selectors.
///
/// Grammar:
/// ```text
///     variable := IDENT selector*
///     selector := "[" expression ("," expression)* "]"
///               | "." IDENT
/// ```
fn parse_variable<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (name, line) = parse_identifier(tokens)?;
    let selectors = parse_selectors(tokens)?;
    Ok(Expr::Variable { name, selectors, line })
}

/// Greedily consumes `[indexList]` and `.name` selector groups.
///
/// Each bracket group is a comma-separated list of index expressions. A
/// dotted access is normalized to a one-element group holding the property
/// name as a string literal.
pub(crate) fn parse_selectors<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<Vec<Expr>>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut selectors = Vec::new();
    loop {
        match tokens.peek() {
            Some((Token::LeftBracket, _)) => {
                tokens.next();
                let group = parse_comma_separated(tokens, parse_expression, &Token::RightBracket)?;
                selectors.push(group);
            },
            Some((Token::Dot, line)) => {
                let line = *line;
                tokens.next();
                match tokens.next() {
                    Some((Token::Identifier(property), _)) => {
                        selectors.push(vec![Expr::Literal { value: property.clone().into(),
                                                            line }]);
                    },
                    Some((tok, l)) => {
                        return Err(ParseError::UnexpectedToken {
                            token: format!("Expected property name after '.', found {tok:?}"),
                            line:  *l,
                        });
                    },
                    None => return Err(ParseError::UnexpectedEndOfInput { line }),
                }
            },
            _ => break,
        }
    }
    Ok(selectors)
}

/// Parses a parenthesized expression.
///
/// Grammar: `grouping := "(" expression ")"`
fn parse_grouping<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (_, line) = tokens.next().expect("peeked '('");
    let expr = parse_expression(tokens)?;
    expect_token(tokens, &Token::RightParen, "Expected ')' after expression")?;
    Ok(Expr::Grouping { expr: Box::new(expr),
                        line: *line, })
}

/// Parses an absolute-value grouping of the form `| expression |`.
///
/// Grammar: `abs := "|" expression "|"`
fn parse_abs<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (_, line) = tokens.next().expect("peeked '|'");
    let expr = parse_expression(tokens)?;
    expect_token(tokens, &Token::Pipe, "Expected '|' after expression")?;
    Ok(Expr::GroupingAbs { expr: Box::new(expr),
                           line: *line, })
}

/// Parses an array literal whose `[` has not been consumed yet.
fn parse_array_literal<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (_, line) = tokens.next().expect("peeked '['");
    let elements = parse_array_elements(tokens)?;
    Ok(Expr::ArrayLiteral { elements,
                            line: *line, })
}

/// Parses the elements of an array literal, consuming the closing `]`.
///
/// Besides plain expressions, a pair of numeric literals joined by `..`
/// expands to the inclusive integer range between them, each number
/// becoming its own element. Nested array, map, and function literals
/// parse as ordinary expression elements.
///
/// Grammar:
/// ```text
///     arrayElements := (element ("," element)*)? "]"
///     element       := expression | NUMBER ".." NUMBER
/// ```
/// # Errors
/// Returns a `ParseError` if an element fails to parse, if range bounds
/// are not numeric literals, or if the closing `]` is missing.
pub(crate) fn parse_array_elements<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<Expr>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut elements = Vec::new();

    if let Some((Token::RightBracket, _)) = tokens.peek() {
        tokens.next();
        return Ok(elements);
    }

    loop {
        let line = tokens.peek().map_or(0, |(_, l)| *l);
        if elements.len() > 255 {
            return Err(ParseError::TooManyArguments { line });
        }

        let expr = parse_expression(tokens)?;

        if let Some((Token::Dot, _)) = tokens.peek() {
            tokens.next();
            expect_token(tokens, &Token::Dot, "Expected '..' in range")?;
            let end_expr = parse_expression(tokens)?;
            expand_range(&mut elements, &expr, &end_expr, line)?;
        } else {
            elements.push(expr);
        }

        match tokens.peek() {
            Some((Token::Comma, _)) => {
                tokens.next();
            },
            Some((Token::RightBracket, _)) => {
                tokens.next();
                break;
            },
            Some((tok, l)) => {
                return Err(ParseError::UnexpectedToken {
                    token: format!("Expected ',' or ']' after array element, found {tok:?}"),
                    line:  *l,
                });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line }),
        }
    }

    Ok(elements)
}

/// Expands `start..end` into one literal element per integer in the
/// inclusive range. Both bounds must be numeric literals.
#[allow(clippy::cast_possible_truncation)]
fn expand_range(elements: &mut Vec<Expr>,
                start: &Expr,
                end: &Expr,
                line: usize)
                -> ParseResult<()> {
    let (Expr::Literal { value: LiteralValue::Number(start), .. },
         Expr::Literal { value: LiteralValue::Number(end), .. }) = (start, end)
    else {
        return Err(ParseError::UnexpectedToken {
            token: "Range bounds must be numeric literals".to_string(),
            line,
        });
    };

    if !start.is_finite() || !end.is_finite() {
        return Err(ParseError::MalformedNumber { line });
    }

    let (start, end) = (start.trunc() as i64, end.trunc() as i64);
    for i in start..=end {
        #[allow(clippy::cast_precision_loss)]
        elements.push(Expr::Literal { value: LiteralValue::Number(i as f64),
                                      line });
    }
    Ok(())
}

/// Parses a map literal whose `{` has not been consumed yet.
fn parse_map_literal<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (_, line) = tokens.next().expect("peeked '{'");
    let entries = parse_map_entries(tokens)?;
    Ok(Expr::MapLiteral { entries,
                          line: *line, })
}

/// Parses the entries of a map literal, consuming the closing `}`.
///
/// An entry is `key : value` or `key => (params) { body }`, the latter
/// binding a function value under the key. A bare identifier key is
/// treated as a string literal equal to its lexeme. Entries may be
/// separated by commas or semicolons, with a trailing separator allowed.
///
/// Grammar:
/// ```text
///     mapEntries := (entry ((","|";") entry)* (","|";")?)? "}"
///     entry      := key (":" expression | "=>" "(" params? ")" block)
/// ```
pub(crate) fn parse_map_entries<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<MapEntry>>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut entries = Vec::new();

    if let Some((Token::RightBrace, _)) = tokens.peek() {
        tokens.next();
        return Ok(entries);
    }

    loop {
        let line = tokens.peek().map_or(0, |(_, l)| *l);
        if entries.len() > 255 {
            return Err(ParseError::TooManyArguments { line });
        }

        let key_expr = parse_expression(tokens)?;
        let key = match key_expr {
            Expr::Variable { name, selectors, line } if selectors.is_empty() => {
                Expr::Literal { value: name.into(),
                                line }
            },
            other => other,
        };

        let value = match tokens.peek() {
            Some((Token::Colon, _)) => {
                tokens.next();
                parse_expression(tokens)?
            },
            Some((Token::Arrow, arrow_line)) => {
                let arrow_line = *arrow_line;
                tokens.next();
                let declaration = parse_function_parts(tokens, None, arrow_line)?;
                Expr::Function { declaration,
                                 line: arrow_line, }
            },
            Some((tok, l)) => {
                return Err(ParseError::UnexpectedToken {
                    token: format!("Expected ':' or '=>' after map key, found {tok:?}"),
                    line:  *l,
                });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line }),
        };

        entries.push(MapEntry { key, value });

        match tokens.peek() {
            Some((Token::Comma | Token::Semicolon, _)) => {
                tokens.next();
                if let Some((Token::RightBrace, _)) = tokens.peek() {
                    tokens.next();
                    break;
                }
            },
            Some((Token::RightBrace, _)) => {
                tokens.next();
                break;
            },
            Some((tok, l)) => {
                return Err(ParseError::UnexpectedToken {
                    token: format!("Expected ',' or '}}' after map entry, found {tok:?}"),
                    line:  *l,
                });
            },
            None => return Err(ParseError::UnexpectedEndOfInput { line }),
        }
    }

    Ok(entries)
}

/// Parses an anonymous function literal: `fun (params) { body }`.
fn parse_function_literal<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let (_, line) = tokens.next().expect("peeked 'fun'");
    let declaration = parse_function_parts(tokens, None, *line)?;
    Ok(Expr::Function { declaration,
                        line: *line, })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::scanner::scan_tokens;

    fn parse(source: &str) -> Expr {
        let (tokens, errors) = scan_tokens(source);
        assert!(errors.is_empty());
        let mut iter = tokens.iter().peekable();
        parse_expression(&mut iter).expect("expression should parse")
    }

    #[test]
    fn selectors_accumulate_in_order() {
        let Expr::Variable { name, selectors, .. } = parse("t[1][\"k\"].size") else {
            panic!("expected a variable");
        };
        assert_eq!(name, "t");
        assert_eq!(selectors.len(), 3);
        assert!(matches!(
            selectors[2][0],
            Expr::Literal { value: LiteralValue::Str(ref s), .. } if s == "size"
        ));
    }

    #[test]
    fn multi_index_group_keeps_all_indices() {
        let Expr::Variable { selectors, .. } = parse("s[1, 3, 5]") else {
            panic!("expected a variable");
        };
        assert_eq!(selectors.len(), 1);
        assert_eq!(selectors[0].len(), 3);
    }

    #[test]
    fn range_expands_to_individual_literals() {
        let Expr::ArrayLiteral { elements, .. } = parse("[0..3, 99]") else {
            panic!("expected an array literal");
        };
        assert_eq!(elements.len(), 5);
    }

    #[test]
    fn method_call_records_its_receiver() {
        let Expr::Call { receiver, .. } = parse("s.upper()") else {
            panic!("expected a call");
        };
        let receiver = receiver.expect("receiver should be recorded");
        assert!(matches!(
            *receiver,
            Expr::Variable { ref name, ref selectors, .. } if name == "s" && selectors.is_empty()
        ));
    }

    #[test]
    fn bare_map_keys_become_string_literals() {
        let Expr::MapLiteral { entries, .. } = parse("{ name: 1, \"age\": 2 }") else {
            panic!("expected a map literal");
        };
        assert!(matches!(
            entries[0].key,
            Expr::Literal { value: LiteralValue::Str(ref s), .. } if s == "name"
        ));
    }

    #[test]
    fn absolute_grouping_parses() {
        assert!(matches!(parse("|1 - 2|"), Expr::GroupingAbs { .. }));
    }
}
