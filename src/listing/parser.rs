//! Parser for the Starlark subset used by `libraries.bzl`.
//!
//! The listing file only ever assigns flat lists of strings, so instead of
//! evaluating it we tokenize and parse this grammar:
//!
//! ```text
//! file      := (statement? NEWLINE)*
//! statement := expr                   # docstring, ignored
//!            | NAME '=' expr
//! expr      := term ('+' term)*
//! term      := STRING+ | NAME | list | '(' expr ')'
//! list      := '[' (expr (',' expr)* ','?)? ']'
//! ```
//!
//! `#` comments run to the end of the line. Line breaks end a statement
//! unless they occur inside brackets or parentheses or follow a `\`.
//! Adjacent string literals are joined. A `NAME` term refers to an earlier
//! assignment. Anything outside the grammar (`load`, `def`, calls, numbers) is
//! a [`ProtodepsError::ListingSyntax`] carrying the offending line.

use crate::core::ProtodepsError;
use std::collections::BTreeMap;

/// A value bound by an assignment in the listing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A string literal or the concatenation of string literals.
    Str(String),
    /// A list literal or the concatenation of lists.
    List(Vec<Value>),
}

impl Value {
    /// Short type name used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "a string",
            Self::List(_) => "a list",
        }
    }

    /// Borrow the elements as strings, if this is a list of strings.
    #[must_use]
    pub fn as_string_list(&self) -> Option<Vec<&str>> {
        match self {
            Self::List(items) => items
                .iter()
                .map(|item| match item {
                    Self::Str(s) => Some(s.as_str()),
                    Self::List(_) => None,
                })
                .collect(),
            Self::Str(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Name(String),
    Str(String),
    Assign,
    Plus,
    Comma,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Newline,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            Self::Name(name) => format!("`{name}`"),
            Self::Str(_) => "string literal".to_string(),
            Self::Assign => "`=`".to_string(),
            Self::Plus => "`+`".to_string(),
            Self::Comma => "`,`".to_string(),
            Self::LBracket => "`[`".to_string(),
            Self::RBracket => "`]`".to_string(),
            Self::LParen => "`(`".to_string(),
            Self::RParen => "`)`".to_string(),
            Self::Newline => "end of line".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    line: usize,
}

/// Parse a listing file and return every top-level assignment.
///
/// Later assignments to the same name replace earlier ones.
///
/// # Errors
///
/// Returns [`ProtodepsError::ListingSyntax`] for any token or construct outside
/// the supported grammar, for references to unassigned names, and for `+`
/// applied to a string and a list.
pub fn parse(source: &str, file: &str) -> Result<BTreeMap<String, Value>, ProtodepsError> {
    let tokens = Lexer::new(source, file).tokenize()?;
    Parser {
        tokens,
        pos: 0,
        file,
        bindings: BTreeMap::new(),
    }
    .parse_file()
}

fn syntax_error(file: &str, line: usize, reason: impl Into<String>) -> ProtodepsError {
    ProtodepsError::ListingSyntax {
        file: file.to_string(),
        line,
        reason: reason.into(),
    }
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    file: &'a str,
    // Open brackets and parentheses; line breaks inside them are not tokens
    depth: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, file: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            file,
            depth: 0,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn tokenize(mut self) -> Result<Vec<Token>, ProtodepsError> {
        let mut tokens = Vec::new();
        while let Some(&c) = self.chars.peek() {
            let line = self.line;
            let kind = match c {
                '\n' => {
                    self.bump();
                    let after_statement =
                        tokens.last().is_some_and(|t: &Token| t.kind != TokenKind::Newline);
                    if self.depth > 0 || !after_statement {
                        continue;
                    }
                    TokenKind::Newline
                }
                c if c.is_whitespace() => {
                    self.bump();
                    continue;
                }
                '#' => {
                    while self.chars.peek().is_some_and(|&c| c != '\n') {
                        self.bump();
                    }
                    continue;
                }
                '\\' => {
                    // Explicit line continuation
                    self.bump();
                    if self.chars.peek() == Some(&'\r') {
                        self.bump();
                    }
                    if self.bump() != Some('\n') {
                        return Err(syntax_error(self.file, line, "stray `\\`"));
                    }
                    continue;
                }
                '"' | '\'' => TokenKind::Str(self.string_literal()?),
                '=' => self.single(TokenKind::Assign),
                '+' => self.single(TokenKind::Plus),
                ',' => self.single(TokenKind::Comma),
                '[' | '(' => {
                    self.depth += 1;
                    self.single(if c == '[' { TokenKind::LBracket } else { TokenKind::LParen })
                }
                ']' | ')' => {
                    self.depth = self.depth.saturating_sub(1);
                    self.single(if c == ']' { TokenKind::RBracket } else { TokenKind::RParen })
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let mut name = String::new();
                    while let Some(&c) = self.chars.peek() {
                        if !(c.is_ascii_alphanumeric() || c == '_') {
                            break;
                        }
                        name.push(c);
                        self.bump();
                    }
                    TokenKind::Name(name)
                }
                other => {
                    return Err(syntax_error(
                        self.file,
                        line,
                        format!("unexpected character `{other}`"),
                    ));
                }
            };
            tokens.push(Token { kind, line });
        }
        Ok(tokens)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.bump();
        kind
    }

    fn string_literal(&mut self) -> Result<String, ProtodepsError> {
        let start_line = self.line;
        let Some(quote) = self.bump() else {
            return Err(syntax_error(self.file, start_line, "unterminated string"));
        };

        // Distinguish "" (empty) from """ (triple-quoted)
        let mut triple = false;
        if self.chars.peek() == Some(&quote) {
            self.bump();
            if self.chars.peek() == Some(&quote) {
                self.bump();
                triple = true;
            } else {
                return Ok(String::new());
            }
        }

        let mut value = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(syntax_error(self.file, start_line, "unterminated string"));
            };
            match c {
                '\\' => {
                    let Some(escaped) = self.bump() else {
                        return Err(syntax_error(self.file, start_line, "unterminated string"));
                    };
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        '\\' | '\'' | '"' => value.push(escaped),
                        '\n' => {}
                        other => {
                            value.push('\\');
                            value.push(other);
                        }
                    }
                }
                '\n' if !triple => {
                    return Err(syntax_error(self.file, start_line, "unterminated string"));
                }
                c if c == quote && !triple => return Ok(value),
                c if c == quote => {
                    if self.chars.peek() == Some(&quote) {
                        self.bump();
                        if self.chars.peek() == Some(&quote) {
                            self.bump();
                            return Ok(value);
                        }
                        value.push(quote);
                    }
                    value.push(quote);
                }
                c => value.push(c),
            }
        }
    }
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    file: &'a str,
    bindings: BTreeMap<String, Value>,
}

impl Parser<'_> {
    fn parse_file(mut self) -> Result<BTreeMap<String, Value>, ProtodepsError> {
        while let Some(token) = self.next() {
            match token.kind {
                TokenKind::Newline => continue,
                TokenKind::Str(_) => {
                    // Docstring
                    self.pos -= 1;
                    self.expr()?;
                }
                TokenKind::Name(name) => {
                    self.expect(&TokenKind::Assign, &format!("after `{name}`"))?;
                    let value = self.expr()?;
                    self.bindings.insert(name, value);
                }
                other => {
                    return Err(self.error_at(
                        token.line,
                        format!("expected an assignment, found {}", other.describe()),
                    ));
                }
            }
            self.end_of_statement()?;
        }
        Ok(self.bindings)
    }

    fn end_of_statement(&mut self) -> Result<(), ProtodepsError> {
        match self.next() {
            None
            | Some(Token {
                kind: TokenKind::Newline,
                ..
            }) => Ok(()),
            Some(token) => Err(self.error_at(
                token.line,
                format!("expected end of line, found {}", token.kind.describe()),
            )),
        }
    }

    fn expr(&mut self) -> Result<Value, ProtodepsError> {
        let mut value = self.term()?;
        while self.peek_kind() == Some(&TokenKind::Plus) {
            let line = self.next().map_or(0, |t| t.line);
            let rhs = self.term()?;
            value = match (value, rhs) {
                (Value::List(mut lhs), Value::List(rhs)) => {
                    lhs.extend(rhs);
                    Value::List(lhs)
                }
                (Value::Str(lhs), Value::Str(rhs)) => Value::Str(lhs + &rhs),
                (lhs, rhs) => {
                    return Err(self.error_at(
                        line,
                        format!("cannot add {} and {}", lhs.type_name(), rhs.type_name()),
                    ));
                }
            };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<Value, ProtodepsError> {
        let Some(token) = self.next() else {
            return Err(self.error_at(self.last_line(), "unexpected end of file"));
        };
        match token.kind {
            TokenKind::Str(mut s) => {
                while let Some(TokenKind::Str(next)) = self.peek_kind() {
                    s.push_str(next);
                    self.pos += 1;
                }
                Ok(Value::Str(s))
            }
            TokenKind::Name(name) => {
                if self.peek_kind() == Some(&TokenKind::LParen) {
                    return Err(self.error_at(
                        token.line,
                        format!("function calls are not supported (`{name}(...)`)"),
                    ));
                }
                self.bindings
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| self.error_at(token.line, format!("undefined name `{name}`")))
            }
            TokenKind::LParen => {
                let value = self.expr()?;
                self.expect(&TokenKind::RParen, "to close `(`")?;
                Ok(value)
            }
            TokenKind::LBracket => self.list(),
            other => Err(self.error_at(
                token.line,
                format!("expected a value, found {}", other.describe()),
            )),
        }
    }

    fn list(&mut self) -> Result<Value, ProtodepsError> {
        let mut items = Vec::new();
        loop {
            if self.peek_kind() == Some(&TokenKind::RBracket) {
                self.next();
                return Ok(Value::List(items));
            }
            items.push(self.expr()?);
            match self.next() {
                Some(Token {
                    kind: TokenKind::Comma,
                    ..
                }) => {}
                Some(Token {
                    kind: TokenKind::RBracket,
                    ..
                }) => return Ok(Value::List(items)),
                Some(token) => {
                    return Err(self.error_at(
                        token.line,
                        format!("expected `,` or `]`, found {}", token.kind.describe()),
                    ));
                }
                None => return Err(self.error_at(self.last_line(), "unterminated list")),
            }
        }
    }

    fn expect(&mut self, kind: &TokenKind, context: &str) -> Result<(), ProtodepsError> {
        match self.next() {
            Some(token) if &token.kind == kind => Ok(()),
            Some(token) => Err(self.error_at(
                token.line,
                format!(
                    "expected {} {context}, found {}",
                    kind.describe(),
                    token.kind.describe()
                ),
            )),
            None => Err(self.error_at(
                self.last_line(),
                format!("expected {} {context}, found end of file", kind.describe()),
            )),
        }
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn last_line(&self) -> usize {
        self.tokens.last().map_or(1, |t| t.line)
    }

    fn error_at(&self, line: usize, reason: impl Into<String>) -> ProtodepsError {
        syntax_error(self.file, line, reason)
    }
}
