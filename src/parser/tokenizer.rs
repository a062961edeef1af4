use super::locations::{Location, Span};
use crate::error::{Error, Result};
use const_format::concatcp;
use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Clone, Default, Debug, PartialEq)]
pub struct Token {
    pub(crate) typ: TokenType,
    pub(crate) lexeme: String,
    pub(crate) span: Span,
}

impl Token {
    pub fn typ(&self) -> TokenType {
        self.typ
    }
    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}('{}')", self.typ, self.lexeme)
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TokenType {
    NUMBER,
    NAME,
    /// Reserved; the tokenizer has no string literals yet.
    STRING,
    LET,
    CONST,
    LPAR,
    RPAR,
    LBRACE,
    RBRACE,
    COMMA,
    COLON,
    SEMI,
    EQUAL,
    OPERATOR,
    #[default]
    ENDMARKER,
}

const COMMA: (char, TokenType) = (',', TokenType::COMMA);
const COLON: (char, TokenType) = (':', TokenType::COLON);
const SEMI: (char, TokenType) = (';', TokenType::SEMI);
const EQUAL: (char, TokenType) = ('=', TokenType::EQUAL);
const LPAR: (char, TokenType) = ('(', TokenType::LPAR);
const RPAR: (char, TokenType) = (')', TokenType::RPAR);
const LBRACE: (char, TokenType) = ('{', TokenType::LBRACE);
const RBRACE: (char, TokenType) = ('}', TokenType::RBRACE);
const PLUS: (char, TokenType) = ('+', TokenType::OPERATOR);
const MINUS: (char, TokenType) = ('-', TokenType::OPERATOR);
const STAR: (char, TokenType) = ('*', TokenType::OPERATOR);
const SLASH: (char, TokenType) = ('/', TokenType::OPERATOR);
const PERCENT: (char, TokenType) = ('%', TokenType::OPERATOR);

const SIMPLE_TOKENS: [(char, TokenType); 13] = [
    COMMA, COLON, SEMI, EQUAL, LPAR, RPAR, LBRACE, RBRACE, PLUS, MINUS, STAR, SLASH, PERCENT,
];

const KEYWORDS: [(&str, TokenType); 2] = [("let", TokenType::LET), ("const", TokenType::CONST)];

const S_DIGIT: &str = r"[0-9]";
const S_ALPHA: &str = r"[[:alpha:]]";
const S_WHITESPACE: &str = r"^\s+";
const S_NUMBER: &str = concatcp!("^", S_DIGIT, "+");
const S_NAME: &str = concatcp!("^", S_ALPHA, "+");

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(S_WHITESPACE).expect("Error compiling regex."));
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(S_NUMBER).expect("Error compiling regex."));
static NAME: Lazy<Regex> = Lazy::new(|| Regex::new(S_NAME).expect("Error compiling regex."));

pub struct Tokenizer {
    tokens: Vec<Token>,
    current: Token,
    /// Byte offsets into the current line.
    start: usize,
    end: usize,
    /// Characters before `start`; columns count characters, not bytes.
    column: usize,
    lineno: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            tokens: vec![],
            current: Token::default(),
            start: 0,
            end: 0,
            column: 0,
            lineno: 0,
        }
    }

    pub fn tokenize<'a>(&mut self, input: impl Iterator<Item = &'a str>) -> Result<()> {
        for line in input {
            self.lineno += 1;
            self.tokenize_line(line)?;
        }
        Ok(())
    }

    /// Closes the stream with an ENDMARKER placed after the last line seen.
    pub fn finalize(mut self) -> Vec<Token> {
        let line = self.lineno.max(1);
        let column = self.tokens.last().map_or(1, |t| t.span.end.column);
        self.tokens.push(Token {
            typ: TokenType::ENDMARKER,
            lexeme: "".to_string(),
            span: Span::new(line, column, line, column),
        });
        self.tokens
    }

    fn tokenize_line(&mut self, line: &str) -> Result<()> {
        self.start = 0;
        self.end = 0;
        self.column = 0;

        while self.start < line.len() {
            let rest = &line[self.start..];

            if let Some(m) = WHITESPACE.find(rest) {
                self.start += m.end();
                self.column += m.as_str().chars().count();
                continue;
            }

            // Single characters take priority over the multi-character classes.
            if let Some(chr) = rest.chars().next() {
                if let Some((_, tok_type)) = SIMPLE_TOKENS.iter().find(|(c, _)| *c == chr) {
                    self.current.typ = *tok_type;
                    self.current.lexeme = chr.to_string();
                    self.end = self.start + chr.len_utf8();
                    self.push();
                    continue;
                }
            }

            if self.find_by_regex(&NUMBER, TokenType::NUMBER, rest) {
                continue;
            }
            if self.find_by_regex(&NAME, TokenType::NAME, rest) {
                continue;
            }

            let character = rest.chars().next().unwrap_or_default();
            return Err(Error::Lex {
                character,
                location: Location::new(self.lineno, self.column + 1),
            });
        }
        Ok(())
    }

    fn push(&mut self) {
        let width = self.current.lexeme.chars().count();
        self.current.span = Span::new(
            self.lineno,
            self.column + 1,
            self.lineno,
            self.column + width + 1,
        );
        trace!("token {} at {}", self.current, self.current.span);
        self.tokens.push(std::mem::take(&mut self.current));
        self.start = self.end;
        self.column += width;
    }

    fn find_by_regex(&mut self, regex: &Regex, token_type: TokenType, rest: &str) -> bool {
        if let Some(m) = regex.find(rest) {
            self.current.typ = match token_type {
                TokenType::NAME => KEYWORDS
                    .iter()
                    .find(|(kw, _)| *kw == m.as_str())
                    .map_or(token_type, |(_, keyword)| *keyword),
                _ => token_type,
            };
            self.current.lexeme = m.as_str().to_string();
            self.end = self.start + m.end();
            self.push();
            return true;
        }
        false
    }
}

/// Splits `source` into tokens, always ending with an ENDMARKER.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokenizer = Tokenizer::new();
    tokenizer.tokenize(source.lines())?;
    Ok(tokenizer.finalize())
}
