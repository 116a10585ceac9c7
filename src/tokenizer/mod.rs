//=====================================================
// File: tokenizer/mod.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Kwenda lexical analysis
// Objective: Convert free-form Kwenda source text into a flat stream of
//            classified tokens without ever failing
//=====================================================

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

//=============================================
//            Section 1: Keyword Table
//=============================================

static KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "kazi", "kama", "sivyo", "wakati", "kwa", "vunja", "endelea", "rudisha", "namba",
        "maneno", "buliani", "orodha", "kamusi", "andika", "ingiza", "na", "au", "jaribu",
        "shika", "hatimaye", "tupa", "leta", "darasa", "rithi", "unda", "hii",
    ]
    .into_iter()
    .collect()
});

/// Type keywords that introduce a declaration.
pub const TYPE_KEYWORDS: [&str; 5] = ["namba", "maneno", "buliani", "orodha", "kamusi"];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(word)
}

pub fn is_type_keyword(word: &str) -> bool {
    TYPE_KEYWORDS.contains(&word)
}

//=============================================
//            Section 2: Tokens
//=============================================

/// All token classes produced by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Identifier,
    Number,
    Keyword,
    Operator,
    Punctuation,
    String,
    Boolean,
}

/// A token: its class, its verbatim text and the line it started on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }

    pub fn is_punct(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == symbol
    }

    pub fn is_operator(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == symbol
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == word
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    /// True for operators that may split a binary expression (`=` excluded).
    pub fn is_binary_operator(&self) -> bool {
        match self.kind {
            TokenKind::Operator => self.text != "=",
            TokenKind::Keyword => self.text == "na" || self.text == "au",
            _ => false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "\"{}\"", self.text),
            _ => f.write_str(&self.text),
        }
    }
}

//=============================================
//            Section 3: Tokenizer
//=============================================

const OPERATOR_CHARS: [char; 8] = ['+', '-', '*', '/', '=', '!', '<', '>'];
const PUNCTUATION_CHARS: [char; 9] = ['{', '}', '(', ')', '[', ']', ';', ',', ':'];

/// Tokenizer for Kwenda
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
    line: usize,
    buffer: String,
    buffer_line: usize,
    tokens: Vec<Token>,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            buffer: String::new(),
            buffer_line: 1,
            tokens: Vec::new(),
        }
    }

    //Function: tokenize
    //Purpose: Scan the whole input once, left to right, and classify tokens
    //Inputs: &mut self
    //Returns: Vec<Token>
    pub fn tokenize(&mut self) -> Vec<Token> {
        while let Some(ch) = self.current() {
            match ch {
                '"' => self.read_string(),
                '#' => self.skip_comment(),
                c if c.is_whitespace() => {
                    self.flush();
                    if c == '\n' {
                        self.line += 1;
                    }
                    self.position += 1;
                }
                c if OPERATOR_CHARS.contains(&c) => self.read_operator(c),
                c if PUNCTUATION_CHARS.contains(&c) => {
                    self.flush();
                    self.push(TokenKind::Punctuation, c.to_string());
                    self.position += 1;
                }
                '.' => self.read_dot(),
                c => {
                    if self.buffer.is_empty() {
                        self.buffer_line = self.line;
                    }
                    self.buffer.push(c);
                    self.position += 1;
                }
            }
        }
        self.flush();
        std::mem::take(&mut self.tokens)
    }

    fn current(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn push(&mut self, kind: TokenKind, text: String) {
        self.tokens.push(Token::new(kind, text, self.line));
    }

    fn read_string(&mut self) {
        self.flush();
        let start_line = self.line;
        self.position += 1;
        let mut content = String::new();
        while let Some(ch) = self.current() {
            self.position += 1;
            if ch == '"' {
                break;
            }
            if ch == '\n' {
                self.line += 1;
            }
            content.push(ch);
        }
        // An unterminated literal still yields its content.
        self.tokens
            .push(Token::new(TokenKind::String, content, start_line));
    }

    fn skip_comment(&mut self) {
        self.flush();
        while let Some(ch) = self.current() {
            if ch == '\n' {
                break;
            }
            self.position += 1;
        }
    }

    fn read_operator(&mut self, ch: char) {
        self.flush();
        if matches!(ch, '=' | '!' | '<' | '>') && self.peek(1) == Some('=') {
            self.push(TokenKind::Operator, format!("{ch}="));
            self.position += 2;
        } else {
            self.push(TokenKind::Operator, ch.to_string());
            self.position += 1;
        }
    }

    fn read_dot(&mut self) {
        let numeric_buffer =
            !self.buffer.is_empty() && self.buffer.chars().all(|c| c.is_ascii_digit());
        let digit_before = self.position > 0
            && self
                .input
                .get(self.position - 1)
                .is_some_and(|c| c.is_ascii_digit());
        let digit_after = self.peek(1).is_some_and(|c| c.is_ascii_digit());
        if numeric_buffer && digit_before && digit_after {
            self.buffer.push('.');
        } else {
            self.flush();
            self.push(TokenKind::Punctuation, ".".to_string());
        }
        self.position += 1;
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.buffer);
        let kind = classify(&text);
        self.tokens.push(Token::new(kind, text, self.buffer_line));
    }
}

fn classify(text: &str) -> TokenKind {
    if is_keyword(text) {
        TokenKind::Keyword
    } else if text == "kweli" || text == "uwongo" {
        TokenKind::Boolean
    } else if is_number_shape(text) {
        TokenKind::Number
    } else {
        TokenKind::Identifier
    }
}

/// Digits with at most one interior decimal point.
fn is_number_shape(text: &str) -> bool {
    if text.starts_with('.') || text.ends_with('.') {
        return false;
    }
    let mut dots = 0;
    for ch in text.chars() {
        match ch {
            '.' => dots += 1,
            c if c.is_ascii_digit() => {}
            _ => return false,
        }
    }
    !text.is_empty() && dots <= 1
}

/// Convenience wrapper around [`Tokenizer`].
pub fn tokenize(source: &str) -> Vec<Token> {
    Tokenizer::new(source).tokenize()
}


//=====================================================
// End of file
//=====================================================
