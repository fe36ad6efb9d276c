use logos::{Logos, Skip};

use crate::error::ParseError;

/// Represents a lexical token in the source input.
///
/// A token is a minimal but meaningful unit of text produced by the scanner.
/// This enum defines all recognized tokens in the language, including the
/// reserved keywords and operators that are scanned but rejected by the
/// parser. The end of the token stream stands in for an explicit EOF token.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
pub enum Token {
    /// Numeric literal tokens, such as `42` or `3.14`. Parsed as 64-bit
    /// floats.
    #[regex(r"[0-9]+(\.[0-9]+)?", parse_number)]
    Number(f64),
    /// String literal tokens. Escapes are interpreted and the surrounding
    /// quotes stripped. Strings may span lines.
    #[regex(r#""([^"\\]|\\.)*""#, parse_string)]
    Str(String),
    /// Identifier tokens; variable or function names such as `x` or `fib`.
    /// Note that `this` is an ordinary identifier resolved through the
    /// environment.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// `// Comments.`
    #[regex(r"//[^\n\r]*", logos::skip)]
    Comment,
    /// Newlines advance the line counter and are otherwise skipped.
    #[token("\n", |lex| {
        lex.extras.line += 1;
        Skip
    })]
    Newline,
    /// Spaces, tabs, carriage returns, and feeds.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Whitespace,

    /// `(`
    #[token("(")]
    LeftParen,
    /// `)`
    #[token(")")]
    RightParen,
    /// `{`
    #[token("{")]
    LeftBrace,
    /// `}`
    #[token("}")]
    RightBrace,
    /// `[`
    #[token("[")]
    LeftBracket,
    /// `]`
    #[token("]")]
    RightBracket,
    /// `,`
    #[token(",")]
    Comma,
    /// `.`
    #[token(".")]
    Dot,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `:`
    #[token(":")]
    Colon,
    /// `?`
    #[token("?")]
    Question,
    /// `^`
    #[token("^")]
    Caret,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,

    /// `+`
    #[token("+")]
    Plus,
    /// `++`
    #[token("++")]
    PlusPlus,
    /// `-`
    #[token("-")]
    Minus,
    /// `--`
    #[token("--")]
    MinusMinus,
    /// `*`
    #[token("*")]
    Star,
    /// `**`
    #[token("**")]
    StarStar,
    /// `!`
    #[token("!")]
    Bang,
    /// `!=`, also written `<>`
    #[token("!=")]
    #[token("<>")]
    BangEqual,
    /// `=`
    #[token("=")]
    Equal,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `=>`
    #[token("=>")]
    Arrow,
    /// `<`
    #[token("<")]
    Less,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `<<`
    #[token("<<")]
    Left,
    /// `>`
    #[token(">")]
    Greater,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `>>`
    #[token(">>")]
    Right,
    /// `|`
    #[token("|")]
    Pipe,
    /// `||`
    #[token("||")]
    OrOr,
    /// `&`
    #[token("&")]
    Ampersand,
    /// `&&`
    #[token("&&")]
    AndAnd,

    /// `and`
    #[token("and")]
    And,
    /// `or`
    #[token("or")]
    Or,
    /// `if`
    #[token("if")]
    If,
    /// `else`
    #[token("else")]
    Else,
    /// `for`
    #[token("for")]
    For,
    /// `while`
    #[token("while")]
    While,
    /// `fun`
    #[token("fun")]
    Fun,
    /// `return`
    #[token("return")]
    Return,
    /// `var`
    #[token("var")]
    Var,
    /// `let`
    #[token("let")]
    Let,
    /// `true`
    #[token("true")]
    True,
    /// `false`
    #[token("false")]
    False,
    /// `nil`
    #[token("nil")]
    Nil,

    /// `class` (reserved)
    #[token("class")]
    Class,
    /// `super` (reserved)
    #[token("super")]
    Super,
    /// `const` (reserved)
    #[token("const")]
    Const,
    /// `break` (reserved)
    #[token("break")]
    Break,
    /// `continue` (reserved)
    #[token("continue")]
    Continue,
    /// `mod` (reserved)
    #[token("mod")]
    Mod,
    /// `not` (reserved)
    #[token("not")]
    Not,
    /// `try` (reserved)
    #[token("try")]
    Try,
    /// `catch` (reserved)
    #[token("catch")]
    Catch,
    /// `finally` (reserved)
    #[token("finally")]
    Finally,
    /// `throw` (reserved)
    #[token("throw")]
    Throw,
    /// `add` (reserved)
    #[token("add")]
    Add,
    /// `delete` (reserved)
    #[token("delete")]
    Delete,
    /// `typeof` (reserved)
    #[token("typeof")]
    Typeof,
    /// `instanceof` (reserved)
    #[token("instanceof")]
    Instanceof,
    /// `switch` (reserved)
    #[token("switch")]
    Switch,
    /// `case` (reserved)
    #[token("case")]
    Case,
    /// `default` (reserved)
    #[token("default")]
    Default,
    /// `do` (reserved)
    #[token("do")]
    Do,
    /// `extends` (reserved)
    #[token("extends")]
    Extends,
}

impl Token {
    /// Returns the source spelling of a token that is scanned but carries no
    /// meaning in the language, or `None` for tokens the parser accepts.
    ///
    /// The parser uses this to reject reserved words with a clear
    /// diagnostic instead of silently accepting them.
    #[must_use]
    pub const fn reserved_word(&self) -> Option<&'static str> {
        match self {
            Self::Class => Some("class"),
            Self::Super => Some("super"),
            Self::Const => Some("const"),
            Self::Break => Some("break"),
            Self::Continue => Some("continue"),
            Self::Mod => Some("mod"),
            Self::Not => Some("not"),
            Self::Try => Some("try"),
            Self::Catch => Some("catch"),
            Self::Finally => Some("finally"),
            Self::Throw => Some("throw"),
            Self::Add => Some("add"),
            Self::Delete => Some("delete"),
            Self::Typeof => Some("typeof"),
            Self::Instanceof => Some("instanceof"),
            Self::Switch => Some("switch"),
            Self::Case => Some("case"),
            Self::Default => Some("default"),
            Self::Do => Some("do"),
            Self::Extends => Some("extends"),
            Self::AndAnd => Some("&&"),
            Self::OrOr => Some("||"),
            Self::Left => Some("<<"),
            Self::Right => Some(">>"),
            Self::Caret => Some("^"),
            Self::Ampersand => Some("&"),
            Self::Question => Some("?"),
            _ => None,
        }
    }
}

/// Additional information carried by the scanner during tokenization.
///
/// Tracks the current line number for error reporting and diagnostics.
/// Incremented as newlines are processed, including newlines inside string
/// literals.
#[derive(Default)]
pub struct LexerExtras {
    /// The current line number in the source being tokenized.
    pub line: usize,
}

/// Parses a numeric literal from the current token slice.
fn parse_number(lex: &logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

/// Interprets the escapes of a string literal and strips its quotes.
///
/// Recognized escapes are `\n`, `\t`, `\r`, `\"`, and `\\`. Any other
/// escaped character is kept verbatim. Newlines inside the literal advance
/// the scanner's line counter.
fn parse_string(lex: &mut logos::Lexer<Token>) -> String {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\n' {
            lex.extras.line += 1;
            out.push(c);
            continue;
        }
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                if other == '\n' {
                    lex.extras.line += 1;
                }
                out.push(other);
            },
            None => {},
        }
    }
    out
}

/// Scans the whole source into `(Token, line)` pairs.
///
/// Scan errors are collected alongside the tokens so several diagnostics can
/// surface from one run; the caller decides whether to reject the source.
/// An unterminated string stops the scan, since the rest of the input is
/// inside the string.
///
/// # Parameters
/// - `source`: The complete source text.
///
/// # Returns
/// The token stream and any scan errors, both in source order.
#[must_use]
pub fn scan_tokens(source: &str) -> (Vec<(Token, usize)>, Vec<ParseError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = Token::lexer_with_extras(source, LexerExtras { line: 1 });

    while let Some(item) = lexer.next() {
        match item {
            Ok(token) => tokens.push((token, lexer.extras.line)),
            Err(()) => {
                let slice = lexer.slice();
                if slice.starts_with('"') {
                    errors.push(ParseError::UnterminatedString { line: lexer.extras.line });
                    break;
                }
                errors.push(ParseError::UnexpectedCharacter {
                    character: slice.chars().next().unwrap_or('\0'),
                    line:      lexer.extras.line,
                });
            },
        }
    }

    (tokens, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str) -> Vec<Token> {
        let (tokens, errors) = scan_tokens(input);
        assert!(errors.is_empty(), "scan errors: {errors:?}");
        tokens.into_iter().map(|(token, _)| token).collect()
    }

    #[test]
    fn fixed_tokens() {
        assert_eq!(
            scan("( ) { } [ ] , . - + ; * / % : ^"),
            vec![
                Token::LeftParen,
                Token::RightParen,
                Token::LeftBrace,
                Token::RightBrace,
                Token::LeftBracket,
                Token::RightBracket,
                Token::Comma,
                Token::Dot,
                Token::Minus,
                Token::Plus,
                Token::Semicolon,
                Token::Star,
                Token::Slash,
                Token::Percent,
                Token::Colon,
                Token::Caret,
            ]
        );
    }

    #[test]
    fn two_character_tokens() {
        assert_eq!(
            scan("!= == <= >= ++ -- ** => << >> || &&"),
            vec![
                Token::BangEqual,
                Token::EqualEqual,
                Token::LessEqual,
                Token::GreaterEqual,
                Token::PlusPlus,
                Token::MinusMinus,
                Token::StarStar,
                Token::Arrow,
                Token::Left,
                Token::Right,
                Token::OrOr,
                Token::AndAnd,
            ]
        );
    }

    #[test]
    fn diamond_is_an_alias_for_bang_equal() {
        assert_eq!(scan("<>"), vec![Token::BangEqual]);
    }

    #[test]
    fn number_literals() {
        assert_eq!(scan("42 4.2"), vec![Token::Number(42.0), Token::Number(4.2)]);
    }

    #[test]
    fn range_dots_do_not_consume_digits() {
        assert_eq!(
            scan("0..5"),
            vec![Token::Number(0.0), Token::Dot, Token::Dot, Token::Number(5.0)]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            scan(r#""a\tb\n\"q\"""#),
            vec![Token::Str("a\tb\n\"q\"".to_string())]
        );
    }

    #[test]
    fn unknown_escape_is_kept_verbatim() {
        assert_eq!(scan(r#""a\qb""#), vec![Token::Str("aqb".to_string())]);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            scan("var let fun if while foo _bar t42"),
            vec![
                Token::Var,
                Token::Let,
                Token::Fun,
                Token::If,
                Token::While,
                Token::Identifier("foo".to_string()),
                Token::Identifier("_bar".to_string()),
                Token::Identifier("t42".to_string()),
            ]
        );
    }

    #[test]
    fn this_is_an_ordinary_identifier() {
        assert_eq!(scan("this"), vec![Token::Identifier("this".to_string())]);
    }

    #[test]
    fn comments_are_ignored() {
        assert_eq!(scan("true // false\n1"), vec![Token::True, Token::Number(1.0)]);
    }

    #[test]
    fn scanner_keeps_track_of_lines() {
        let (tokens, errors) = scan_tokens("1\n2 3\n4");
        assert!(errors.is_empty());
        assert_eq!(
            tokens,
            vec![
                (Token::Number(1.0), 1),
                (Token::Number(2.0), 2),
                (Token::Number(3.0), 2),
                (Token::Number(4.0), 3),
            ]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let (_, errors) = scan_tokens("\"abc");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ParseError::UnterminatedString { line: 1 }));
    }

    #[test]
    fn unexpected_character_is_collected_and_scanning_continues() {
        let (tokens, errors) = scan_tokens("1 @ 2 # 3");
        assert_eq!(errors.len(), 2);
        assert_eq!(
            tokens,
            vec![(Token::Number(1.0), 1), (Token::Number(2.0), 1), (Token::Number(3.0), 1)]
        );
    }
}
