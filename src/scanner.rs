use crate::source::SourceSpan;
use derive_new::new;
use lazy_static::lazy_static;
use log::trace;
use miette::Diagnostic;
use std::{collections::HashMap, fmt::Display};
use strum::Display as StrumDisplay;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ScannerError {
    #[error("Unexpected character.")]
    #[diagnostic(code(lox::scanner::unexpected_character))]
    UnexpectedCharacter {
        character: char,
        line: usize,
        #[label("{character:?} found here")]
        at: SourceSpan,
    },
    #[error("Unterminated string.")]
    #[diagnostic(code(lox::scanner::unterminated_string))]
    UnterminatedString {
        line: usize,
        #[label("String starts here")]
        at: SourceSpan,
    },
}
impl ScannerError {
    pub fn line(&self) -> usize {
        match self {
            Self::UnexpectedCharacter { line, .. } | Self::UnterminatedString { line, .. } => *line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Identifier,
    String,
    Number,
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,
    Eof,
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenKind> = HashMap::from([
        ("and", TokenKind::And),
        ("class", TokenKind::Class),
        ("else", TokenKind::Else),
        ("false", TokenKind::False),
        ("for", TokenKind::For),
        ("fun", TokenKind::Fun),
        ("if", TokenKind::If),
        ("nil", TokenKind::Nil),
        ("or", TokenKind::Or),
        ("print", TokenKind::Print),
        ("return", TokenKind::Return),
        ("super", TokenKind::Super),
        ("this", TokenKind::This),
        ("true", TokenKind::True),
        ("var", TokenKind::Var),
        ("while", TokenKind::While),
    ]);
}

/// Payload of a literal token.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
}
impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, new)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Option<Literal>,
    /// 1-based.
    pub line: usize,
    pub span: SourceSpan,
}
impl Token {
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}
impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.literal {
            Some(literal) => write!(f, "{} {} {}", self.kind, self.lexeme, literal),
            None => write!(f, "{} {} null", self.kind, self.lexeme),
        }
    }
}

/// Scans a whole source buffer, splitting the stream into tokens (always
/// ending in exactly one `Eof`) and the diagnostics reported along the way.
pub fn scan(source: &str) -> (Vec<Token>, Vec<ScannerError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    for item in Scanner::new(source) {
        match item {
            Ok(token) => tokens.push(token),
            Err(error) => errors.push(error),
        }
    }
    (tokens, errors)
}

pub struct Scanner<'a> {
    source: &'a str,
    current_token_start: usize,
    current_offset: usize,
    line: usize,
    emitted_eof: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            current_token_start: 0,
            current_offset: 0,
            line: 1,
            emitted_eof: false,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source[self.current_offset..].chars().next()?;
        self.current_offset += ch.len_utf8();
        Some(ch)
    }

    fn advance_while<F: Fn(char) -> bool>(&mut self, check: F) {
        while matches!(self.peek(), Some(ch) if check(ch)) {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current_offset..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        self.source[self.current_offset..].chars().nth(1)
    }

    fn consume_if(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> SourceSpan {
        SourceSpan::range(self.current_token_start, self.current_offset)
    }

    fn yield_token(&self, kind: TokenKind, literal: Option<Literal>) -> Token {
        let token = Token::new(
            kind,
            self.source[self.current_token_start..self.current_offset].to_string(),
            literal,
            self.line,
            self.current_span(),
        );
        trace!("scanned {} on line {}", token, token.line);
        token
    }

    fn yield_conditional_token(
        &mut self,
        target_ch: char,
        token_if_found: TokenKind,
        token_if_not_found: TokenKind,
    ) -> Token {
        let kind = if self.consume_if(target_ch) {
            token_if_found
        } else {
            token_if_not_found
        };
        self.yield_token(kind, None)
    }

    /// Scans the lexeme starting with `ch`. Whitespace and comments produce
    /// nothing.
    fn scan_token(&mut self, ch: char) -> Option<Result<Token, ScannerError>> {
        let token = match ch {
            '(' => self.yield_token(TokenKind::LeftParen, None),
            ')' => self.yield_token(TokenKind::RightParen, None),
            '{' => self.yield_token(TokenKind::LeftBrace, None),
            '}' => self.yield_token(TokenKind::RightBrace, None),
            ',' => self.yield_token(TokenKind::Comma, None),
            '.' => self.yield_token(TokenKind::Dot, None),
            '-' => self.yield_token(TokenKind::Minus, None),
            '+' => self.yield_token(TokenKind::Plus, None),
            ';' => self.yield_token(TokenKind::Semicolon, None),
            '*' => self.yield_token(TokenKind::Star, None),
            '!' => self.yield_conditional_token('=', TokenKind::BangEqual, TokenKind::Bang),
            '=' => self.yield_conditional_token('=', TokenKind::EqualEqual, TokenKind::Equal),
            '<' => self.yield_conditional_token('=', TokenKind::LessEqual, TokenKind::Less),
            '>' => self.yield_conditional_token('=', TokenKind::GreaterEqual, TokenKind::Greater),
            '/' => {
                if self.consume_if('/') {
                    self.advance_while(|ch| ch != '\n');
                    return None;
                }
                self.yield_token(TokenKind::Slash, None)
            }
            ' ' | '\r' | '\t' => return None,
            '\n' => {
                self.line += 1;
                return None;
            }
            '"' => return self.scan_string(),
            ch if ch.is_ascii_digit() => self.scan_number(),
            ch if ch.is_ascii_alphabetic() || ch == '_' => self.scan_identifier(),
            character => {
                return Some(Err(ScannerError::UnexpectedCharacter {
                    character,
                    line: self.line,
                    at: self.current_span(),
                }))
            }
        };
        Some(Ok(token))
    }

    fn scan_string(&mut self) -> Option<Result<Token, ScannerError>> {
        loop {
            match self.advance() {
                Some('"') => break,
                Some('\n') => self.line += 1,
                Some(_) => {}
                None => {
                    return Some(Err(ScannerError::UnterminatedString {
                        line: self.line,
                        at: self.current_span(),
                    }))
                }
            }
        }
        let value = &self.source[self.current_token_start + 1..self.current_offset - 1];
        Some(Ok(self.yield_token(
            TokenKind::String,
            Some(Literal::String(value.to_string())),
        )))
    }

    fn scan_number(&mut self) -> Token {
        self.advance_while(|ch| ch.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_next().map_or(false, |ch| ch.is_ascii_digit()) {
            self.advance();
            self.advance_while(|ch| ch.is_ascii_digit());
        }

        // digits with at most one interior '.' always parse
        let number: f64 = self.source[self.current_token_start..self.current_offset]
            .parse()
            .unwrap_or_default();

        self.yield_token(TokenKind::Number, Some(Literal::Number(number)))
    }

    fn scan_identifier(&mut self) -> Token {
        self.advance_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        let word = &self.source[self.current_token_start..self.current_offset];
        let kind = KEYWORDS.get(word).copied().unwrap_or(TokenKind::Identifier);
        self.yield_token(kind, None)
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token, ScannerError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.emitted_eof {
            self.current_token_start = self.current_offset;
            match self.advance() {
                None => {
                    self.emitted_eof = true;
                    return Some(Ok(self.yield_token(TokenKind::Eof, None)));
                }
                Some(ch) => {
                    if let Some(result) = self.scan_token(ch) {
                        return Some(result);
                    }
                }
            }
        }
        None
    }
}

impl<'a> std::iter::FusedIterator for Scanner<'a> {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, errors) = scan(source);
        assert_eq!(errors, vec![]);
        tokens.into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn punctuation_and_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("(){},.-+;/* ! != = == < <= > >="),
            vec![
                LeftParen,
                RightParen,
                LeftBrace,
                RightBrace,
                Comma,
                Dot,
                Minus,
                Plus,
                Semicolon,
                Slash,
                Star,
                Bang,
                BangEqual,
                Equal,
                EqualEqual,
                Less,
                LessEqual,
                Greater,
                GreaterEqual,
                Eof
            ]
        );
    }

    #[test]
    fn two_char_operators_are_maximal_munch() {
        use TokenKind::*;
        assert_eq!(kinds("!==="), vec![BangEqual, EqualEqual, Eof]);
        assert_eq!(kinds("<=="), vec![LessEqual, Equal, Eof]);
    }

    #[test]
    fn keywords_and_identifiers() {
        use TokenKind::*;
        assert_eq!(
            kinds("and class else false fun for if nil or print return super this true var while"),
            vec![
                And, Class, Else, False, Fun, For, If, Nil, Or, Print, Return, Super, This, True,
                Var, While, Eof
            ]
        );
        let (tokens, _) = scan("orchid _under score2 classy");
        assert_eq!(
            tokens
                .iter()
                .map(|token| (token.kind, token.lexeme.as_str()))
                .collect::<Vec<_>>(),
            vec![
                (Identifier, "orchid"),
                (Identifier, "_under"),
                (Identifier, "score2"),
                (Identifier, "classy"),
                (Eof, ""),
            ]
        );
    }

    #[test]
    fn number_literals() {
        let (tokens, _) = scan("123 45.67 8. .5");
        let literals = tokens
            .iter()
            .map(|token| (token.kind, token.literal.clone()))
            .collect::<Vec<_>>();
        assert_eq!(
            literals,
            vec![
                (TokenKind::Number, Some(Literal::Number(123.0))),
                (TokenKind::Number, Some(Literal::Number(45.67))),
                (TokenKind::Number, Some(Literal::Number(8.0))),
                (TokenKind::Dot, None),
                (TokenKind::Dot, None),
                (TokenKind::Number, Some(Literal::Number(5.0))),
                (TokenKind::Eof, None),
            ]
        );
    }

    #[test]
    fn strings_span_lines() {
        let (tokens, errors) = scan("\"one\ntwo\" x");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].literal, Some(Literal::String("one\ntwo".into())));
        assert_eq!(tokens[0].lexeme, "\"one\ntwo\"");
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn comments_and_lines() {
        let (tokens, _) = scan("a // comment ( ) \"\nb\n\nc");
        let lines = tokens
            .iter()
            .map(|token| (token.lexeme.as_str(), token.line))
            .collect::<Vec<_>>();
        assert_eq!(lines, vec![("a", 1), ("b", 2), ("c", 4), ("", 4)]);
    }

    #[test]
    fn unexpected_characters_are_reported_and_skipped() {
        let (tokens, errors) = scan(",.$(#\n@");
        assert_eq!(
            tokens.iter().map(|token| token.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::LeftParen,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            errors
                .iter()
                .map(|error| (error.to_string(), error.line()))
                .collect::<Vec<_>>(),
            vec![
                ("Unexpected character.".to_string(), 1),
                ("Unexpected character.".to_string(), 1),
                ("Unexpected character.".to_string(), 2),
            ]
        );
    }

    #[test]
    fn unterminated_string_emits_no_token() {
        let (tokens, errors) = scan("print \"abc\ndef");
        assert_eq!(
            tokens.iter().map(|token| token.kind).collect::<Vec<_>>(),
            vec![TokenKind::Print, TokenKind::Eof]
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "Unterminated string.");
        assert_eq!(errors[0].line(), 2);
    }

    #[test]
    fn exactly_one_eof() {
        let mut scanner = Scanner::new("");
        assert!(matches!(scanner.next(), Some(Ok(Token { kind: TokenKind::Eof, .. }))));
        assert!(scanner.next().is_none());
        assert!(scanner.next().is_none());
    }

    #[test]
    fn token_display() {
        let (tokens, _) = scan("var x = 3; \"hi\"");
        let rendered = tokens.iter().map(ToString::to_string).collect::<Vec<_>>();
        assert_eq!(
            rendered,
            vec![
                "VAR var null",
                "IDENTIFIER x null",
                "EQUAL = null",
                "NUMBER 3 3",
                "SEMICOLON ; null",
                "STRING \"hi\" hi",
                "EOF  null",
            ]
        );
    }
}
