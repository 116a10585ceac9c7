//=============================================
// kwenda/parser/span.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Token span discovery for the Kwenda parser
// Objective: Delimit statements and bracketed regions by balance counting and
//            keyword lookahead, since the language has no terminators
//=============================================

use crate::tokenizer::{Token, TokenKind, is_type_keyword};

/// Keywords that always begin a new statement when seen at depth zero.
const STATEMENT_KEYWORDS: [&str; 14] = [
    "andika", "kama", "sivyo", "wakati", "kwa", "rudisha", "vunja", "endelea", "tupa", "jaribu",
    "shika", "hatimaye", "darasa", "leta",
];

pub fn is_open(token: &Token) -> bool {
    token.kind == TokenKind::Punctuation && matches!(token.text.as_str(), "(" | "[" | "{")
}

pub fn is_close(token: &Token) -> bool {
    token.kind == TokenKind::Punctuation && matches!(token.text.as_str(), ")" | "]" | "}")
}

/// Index of the bracket closing the one opened at `open`.
pub fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        if is_open(token) {
            depth += 1;
        } else if is_close(token) {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

/// Index of the bracket opening the one closed at `close`.
pub fn matching_open(tokens: &[Token], close: usize) -> Option<usize> {
    let mut depth = 0usize;
    for index in (0..=close.min(tokens.len().checked_sub(1)?)).rev() {
        let token = &tokens[index];
        if is_close(token) {
            depth += 1;
        } else if is_open(token) {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

/// First index at or after `from`, outside any brackets, whose token satisfies `pred`.
pub fn find_top_level<F>(tokens: &[Token], from: usize, pred: F) -> Option<usize>
where
    F: Fn(&Token) -> bool,
{
    let mut depth = 0i32;
    for (index, token) in tokens.iter().enumerate().skip(from) {
        if depth == 0 && pred(token) {
            return Some(index);
        }
        if is_open(token) {
            depth += 1;
        } else if is_close(token) {
            depth -= 1;
            if depth < 0 {
                return None;
            }
        }
    }
    None
}

/// Split on a punctuation separator that sits outside any brackets.
pub fn split_top_level<'a>(tokens: &'a [Token], separator: &str) -> Vec<&'a [Token]> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (index, token) in tokens.iter().enumerate() {
        if is_open(token) {
            depth += 1;
        } else if is_close(token) {
            depth -= 1;
        } else if depth == 0 && token.is_punct(separator) {
            parts.push(&tokens[start..index]);
            start = index + 1;
        }
    }
    parts.push(&tokens[start..]);
    parts
}

/// End (exclusive) of a `{ ... }` region: the first top-level brace at or
/// after `from` and its match. Runs to the end of input when unbalanced.
pub fn brace_span_end(tokens: &[Token], from: usize) -> usize {
    find_top_level(tokens, from, |t| t.is_punct("{"))
        .and_then(|open| matching_close(tokens, open))
        .map_or(tokens.len(), |close| close + 1)
}

fn starts_statement(tokens: &[Token], index: usize) -> bool {
    let token = &tokens[index];
    if token.kind != TokenKind::Keyword {
        return false;
    }
    if STATEMENT_KEYWORDS.contains(&token.text.as_str()) || is_type_keyword(&token.text) {
        return true;
    }
    // A named function starts a statement; `kazi (` is a lambda inside an expression.
    token.text == "kazi" && tokens.get(index + 1).is_some_and(Token::is_identifier)
}

fn ends_operand(token: &Token) -> bool {
    match token.kind {
        TokenKind::Identifier | TokenKind::Number | TokenKind::String | TokenKind::Boolean => true,
        TokenKind::Punctuation => matches!(token.text.as_str(), ")" | "]" | "}"),
        TokenKind::Keyword => token.text == "hii",
        TokenKind::Operator => false,
    }
}

fn begins_operand(token: &Token) -> bool {
    match token.kind {
        TokenKind::Identifier | TokenKind::Number | TokenKind::String | TokenKind::Boolean => true,
        TokenKind::Keyword => token.text != "na" && token.text != "au",
        TokenKind::Operator | TokenKind::Punctuation => false,
    }
}

//Function: statement_end
//Purpose: Find where a terminator-free statement stops
//Inputs: tokens: &[Token], from: usize (first token after the statement's lead)
//Returns: usize (exclusive end)
pub fn statement_end(tokens: &[Token], from: usize) -> usize {
    let mut depth = 0i32;
    for index in from..tokens.len() {
        let token = &tokens[index];
        if depth == 0 {
            if token.is_punct(";") || starts_statement(tokens, index) {
                return index;
            }
            // Two adjacent operands never belong to the same expression.
            if index > 0 && ends_operand(&tokens[index - 1]) && begins_operand(token) {
                return index;
            }
        }
        if is_open(token) {
            depth += 1;
        } else if is_close(token) {
            depth -= 1;
            if depth < 0 {
                return index;
            }
        }
    }
    tokens.len()
}

/// End of a `kama` chain including any `sivyo` / `sivyo kama` clauses.
pub fn if_span_end(tokens: &[Token], start: usize) -> usize {
    let Some(open) = find_top_level(tokens, start + 1, |t| t.is_punct("{")) else {
        return statement_end(tokens, start + 1);
    };
    let Some(close) = matching_close(tokens, open) else {
        return tokens.len();
    };
    let after = close + 1;
    if !tokens.get(after).is_some_and(|t| t.is_keyword("sivyo")) {
        return after;
    }
    if tokens.get(after + 1).is_some_and(|t| t.is_keyword("kama")) {
        return if_span_end(tokens, after + 1);
    }
    brace_span_end(tokens, after + 1)
}

/// End of a `jaribu` statement with its optional `shika` and `hatimaye` clauses.
pub fn try_span_end(tokens: &[Token], start: usize) -> usize {
    let mut end = brace_span_end(tokens, start + 1);
    if tokens.get(end).is_some_and(|t| t.is_keyword("shika")) {
        end = brace_span_end(tokens, end + 1);
    }
    if tokens.get(end).is_some_and(|t| t.is_keyword("hatimaye")) {
        end = brace_span_end(tokens, end + 1);
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn matches_nested_brackets() {
        let tokens = tokenize("f(a, [1, 2], g(3))");
        assert_eq!(matching_close(&tokens, 1), Some(tokens.len() - 1));
        assert_eq!(matching_open(&tokens, tokens.len() - 1), Some(1));
    }

    #[test]
    fn statement_end_stops_at_keywords_and_adjacent_operands() {
        let tokens = tokenize("x = x + 1 andika(x)");
        assert_eq!(statement_end(&tokens, 2), 5);
        let tokens = tokenize("x = 5 y = 6");
        assert_eq!(statement_end(&tokens, 2), 3);
        let tokens = tokenize("f = kazi(a) { rudisha a } g(2)");
        assert_eq!(statement_end(&tokens, 2), 10);
    }

    #[test]
    fn if_span_covers_else_chain() {
        let tokens = tokenize("kama a { b() } sivyo kama c { d() } sivyo { e() } andika(1)");
        let end = if_span_end(&tokens, 0);
        assert!(tokens[end].is_keyword("andika"));
    }

    #[test]
    fn try_span_covers_all_clauses() {
        let tokens = tokenize("jaribu { f() } shika (e) { g() } hatimaye { h() } x = 1");
        let end = try_span_end(&tokens, 0);
        assert_eq!(tokens[end].text, "x");
    }
}

//=============================================
// End of file
//=============================================
