use std::iter::Peekable;

use crate::{
    ast::{BinaryOperator, Expr, LiteralValue, LogicalOperator},
    error::ParseError,
    interpreter::{
        parser::{core::ParseResult, unary::parse_unary},
        scanner::Token,
    },
};

/// Parses an assignment expression.
///
/// Grammar: `assignment := or ("=" assignment)?`
///
/// Assignment is right-associative. The left-hand side must be a variable
/// reference, optionally carrying selector groups; the groups become the
/// path of a nested assignment. Anything else is an invalid assignment
/// target.
///
/// # Parameters
/// - `tokens`: Token stream with line information.
///
/// # Returns
/// An `Expr::Assign` node, or the underlying expression when no `=`
/// follows.
pub fn parse_assignment<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let expr = parse_or(tokens)?;

    if let Some((Token::Equal, line)) = tokens.peek() {
        let line = *line;
        tokens.next();
        let value = parse_assignment(tokens)?;

        if let Expr::Variable { name, selectors, .. } = expr {
            return Ok(Expr::Assign { name,
                                     value: Box::new(value),
                                     selectors,
                                     line });
        }

        return Err(ParseError::InvalidAssignmentTarget { line });
    }

    Ok(expr)
}

/// Parses logical OR expressions.
///
/// Handles left-associative chains of the `or` keyword. `or`
/// short-circuits at evaluation time, so it builds `Expr::Logical` nodes
/// rather than plain binary operators.
///
/// Grammar: `or := and ("or" and)*`
pub fn parse_or<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut left = parse_and(tokens)?;

    while let Some((Token::Or, line)) = tokens.peek() {
        let line = *line;
        tokens.next();

        let right = parse_and(tokens)?;
        left = Expr::Logical { left: Box::new(left),
                               op: LogicalOperator::Or,
                               right: Box::new(right),
                               line };
    }

    Ok(left)
}

/// Parses logical AND expressions.
///
/// Handles left-associative chains of the `and` keyword.
///
/// Grammar: `and := equality ("and" equality)*`
pub fn parse_and<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut left = parse_equality(tokens)?;

    while let Some((Token::And, line)) = tokens.peek() {
        let line = *line;
        tokens.next();

        let right = parse_equality(tokens)?;
        left = Expr::Logical { left: Box::new(left),
                               op: LogicalOperator::And,
                               right: Box::new(right),
                               line };
    }

    Ok(left)
}

/// Parses equality expressions.
///
/// Grammar: `equality := comparison (("==" | "!=") comparison)*`
pub fn parse_equality<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut left = parse_comparison(tokens)?;
    loop {
        if let Some((token, line)) = tokens.peek()
           && let Some(op) = token_to_binary_operator(token)
           && matches!(op, BinaryOperator::Equal | BinaryOperator::NotEqual)
        {
            let line = *line;
            tokens.next();
            let right = parse_comparison(tokens)?;
            left = Expr::Binary { left: Box::new(left),
                                  op,
                                  right: Box::new(right),
                                  line };
            continue;
        }
        break;
    }
    Ok(left)
}

/// Parses comparison expressions.
///
/// Grammar: `comparison := term (("<" | "<=" | ">" | ">=") term)*`
pub fn parse_comparison<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut left = parse_term(tokens)?;
    loop {
        if let Some((token, line)) = tokens.peek()
           && let Some(op) = token_to_binary_operator(token)
           && matches!(op,
                       BinaryOperator::Less
                       | BinaryOperator::LessEqual
                       | BinaryOperator::Greater
                       | BinaryOperator::GreaterEqual)
        {
            let line = *line;
            tokens.next();
            let right = parse_term(tokens)?;
            left = Expr::Binary { left: Box::new(left),
                                  op,
                                  right: Box::new(right),
                                  line };
            continue;
        }
        break;
    }
    Ok(left)
}

/// Parses addition and subtraction, plus the postfix `++` / `--` sugar.
///
/// Grammar: `term := factor (("+" | "-") factor | "++" | "--")*`
///
/// `x++` desugars to `x = x + 1` and `x--` to `x = x - 1`. The sugar only
/// applies when the preceding expression is a plain variable reference.
///
/// # Parameters
/// - `tokens`: Token stream with line information.
///
/// # Returns
/// An expression tree with the postfix sugar folded into assignments.
pub fn parse_term<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut left = parse_factor(tokens)?;
    loop {
        match tokens.peek() {
            Some((token @ (Token::Plus | Token::Minus), line)) => {
                let op = if matches!(token, Token::Plus) {
                    BinaryOperator::Add
                } else {
                    BinaryOperator::Sub
                };
                let line = *line;
                tokens.next();
                let right = parse_factor(tokens)?;
                left = Expr::Binary { left: Box::new(left),
                                      op,
                                      right: Box::new(right),
                                      line };
            },
            Some((Token::PlusPlus, line)) => {
                let line = *line;
                tokens.next();
                left = desugar_postfix(left, BinaryOperator::Add, line)?;
            },
            Some((Token::MinusMinus, line)) => {
                let line = *line;
                tokens.next();
                left = desugar_postfix(left, BinaryOperator::Sub, line)?;
            },
            _ => break,
        }
    }
    Ok(left)
}

/// Parses multiplication-level expressions.
///
/// Grammar: `factor := unary (("*" | "/" | "**" | "%") unary)*`
pub fn parse_factor<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let mut left = parse_unary(tokens)?;
    loop {
        if let Some((token, line)) = tokens.peek()
           && let Some(op) = token_to_binary_operator(token)
           && matches!(op,
                       BinaryOperator::Mul
                       | BinaryOperator::Div
                       | BinaryOperator::Pow
                       | BinaryOperator::Percent)
        {
            let line = *line;
            tokens.next();
            let right = parse_unary(tokens)?;
            left = Expr::Binary { left: Box::new(left),
                                  op,
                                  right: Box::new(right),
                                  line };
            continue;
        }
        break;
    }
    Ok(left)
}

/// Rewrites `x++` / `x--` into `x = x ± 1`.
fn desugar_postfix(target: Expr, op: BinaryOperator, line: usize) -> ParseResult<Expr> {
    let Expr::Variable { name, selectors, .. } = &target else {
        return Err(ParseError::InvalidAssignmentTarget { line });
    };
    if !selectors.is_empty() {
        return Err(ParseError::InvalidAssignmentTarget { line });
    }

    let name = name.clone();
    let one = Expr::Literal { value: LiteralValue::Number(1.0),
                              line };
    Ok(Expr::Assign { name,
                      value: Box::new(Expr::Binary { left: Box::new(target),
                                                     op,
                                                     right: Box::new(one),
                                                     line }),
                      selectors: Vec::new(),
                      line })
}

/// Maps a token to its corresponding binary operator.
///
/// Returns `Some(BinaryOperator)` when the token represents a binary
/// operator and `None` for all other tokens. The logical keywords `and` /
/// `or` are not included; they build short-circuiting `Expr::Logical`
/// nodes instead.
#[must_use]
pub const fn token_to_binary_operator(token: &Token) -> Option<BinaryOperator> {
    match token {
        Token::Plus => Some(BinaryOperator::Add),
        Token::Minus => Some(BinaryOperator::Sub),
        Token::Star => Some(BinaryOperator::Mul),
        Token::Slash => Some(BinaryOperator::Div),
        Token::StarStar => Some(BinaryOperator::Pow),
        Token::Percent => Some(BinaryOperator::Percent),
        Token::Less => Some(BinaryOperator::Less),
        Token::LessEqual => Some(BinaryOperator::LessEqual),
        Token::Greater => Some(BinaryOperator::Greater),
        Token::GreaterEqual => Some(BinaryOperator::GreaterEqual),
        Token::EqualEqual => Some(BinaryOperator::Equal),
        Token::BangEqual => Some(BinaryOperator::NotEqual),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::scanner::scan_tokens;

    fn parse(source: &str) -> Expr {
        let (tokens, errors) = scan_tokens(source);
        assert!(errors.is_empty());
        let mut iter = tokens.iter().peekable();
        parse_assignment(&mut iter).expect("expression should parse")
    }

    #[test]
    fn factor_binds_tighter_than_term() {
        let expr = parse("1 + 2 * 3");
        let Expr::Binary { op: BinaryOperator::Add, right, .. } = expr else {
            panic!("expected '+' at the root");
        };
        assert!(matches!(*right, Expr::Binary { op: BinaryOperator::Mul, .. }));
    }

    #[test]
    fn postfix_increment_desugars_to_assignment() {
        let expr = parse("x++");
        let Expr::Assign { name, value, selectors, .. } = expr else {
            panic!("expected assignment");
        };
        assert_eq!(name, "x");
        assert!(selectors.is_empty());
        assert!(matches!(*value, Expr::Binary { op: BinaryOperator::Add, .. }));
    }

    #[test]
    fn postfix_increment_requires_a_variable() {
        let (tokens, _) = scan_tokens("1++");
        let mut iter = tokens.iter().peekable();
        let result = parse_assignment(&mut iter);
        assert!(matches!(result, Err(ParseError::InvalidAssignmentTarget { .. })));
    }

    #[test]
    fn assignment_target_keeps_its_selectors() {
        let expr = parse("t[1].k = 9");
        let Expr::Assign { name, selectors, .. } = expr else {
            panic!("expected assignment");
        };
        assert_eq!(name, "t");
        assert_eq!(selectors.len(), 2);
    }

    #[test]
    fn diamond_parses_as_not_equal() {
        let expr = parse("1 <> 2");
        assert!(matches!(expr, Expr::Binary { op: BinaryOperator::NotEqual, .. }));
    }
}
