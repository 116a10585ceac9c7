//=============================================
// kwenda/parser/expr.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Kwenda expression parsing
// Objective: Route bounded token spans to expression nodes, including the
//            first-operator binary split the language has always used
//=============================================

use std::rc::Rc;

use super::span::{find_top_level, is_close, is_open, matching_close, matching_open, split_top_level};
use super::{parse_block, parse_params, return_type_between};
use crate::ast::{FunctionDecl, Node};
use crate::tokenizer::{Token, TokenKind};

//=============================================
//            Section 1: Expression Routing
//=============================================

/// Parse an already-bounded span as one expression.
///
/// Routing order: array and dictionary literals, lambdas, call-like forms,
/// `unda` instantiation, the binary split, member and method access, `hii`,
/// parenthesised groups, a leading sign, single-token literals, and finally
/// element access. Anything else yields `None`.
pub fn parse_expression(tokens: &[Token]) -> Option<Node> {
    let first = tokens.first()?;
    let last = tokens.len() - 1;
    let closes_at_end = |open: usize| matching_close(tokens, open) == Some(last);

    if first.is_punct("[") && closes_at_end(0) {
        return Some(Node::Array {
            elements: parse_arguments(&tokens[1..last]),
        });
    }
    if first.is_punct("{") && closes_at_end(0) {
        return Some(Node::Dictionary {
            pairs: parse_pairs(&tokens[1..last]),
        });
    }
    if first.is_keyword("kazi") && tokens.get(1).is_some_and(|t| t.is_punct("(")) {
        if let Some(lambda) = parse_lambda(tokens) {
            return Some(lambda);
        }
    }
    if is_callable_name(first) && tokens.len() >= 3 && tokens[1].is_punct("(") && closes_at_end(1)
    {
        return Some(call_node(&first.text, parse_arguments(&tokens[2..last])));
    }
    if first.is_keyword("unda")
        && tokens.len() >= 4
        && tokens[1].is_identifier()
        && tokens[2].is_punct("(")
        && closes_at_end(2)
    {
        return Some(Node::NewInstance {
            class_name: tokens[1].text.clone(),
            args: parse_arguments(&tokens[3..last]),
        });
    }
    if let Some(split) = find_binary_split(tokens) {
        let left = parse_expression(&tokens[..split])?;
        let right = parse_expression(&tokens[split + 1..])?;
        return Some(Node::BinaryOp {
            left: left.boxed(),
            op: tokens[split].text.clone(),
            right: right.boxed(),
        });
    }
    if let Some(member) = parse_member(tokens) {
        return Some(member);
    }
    if tokens.len() == 1 && first.is_keyword("hii") {
        return Some(Node::This);
    }
    if first.is_punct("(") && closes_at_end(0) {
        return parse_expression(&tokens[1..last]);
    }
    if first.is_operator("-") && tokens.len() > 1 {
        let operand = parse_expression(&tokens[1..])?;
        return Some(Node::BinaryOp {
            left: Node::Number("0".into()).boxed(),
            op: "-".into(),
            right: operand.boxed(),
        });
    }
    if tokens.len() == 1 {
        return literal(first);
    }
    if tokens[last].is_punct("]") {
        return parse_element_access(tokens);
    }
    None
}

fn literal(token: &Token) -> Option<Node> {
    match token.kind {
        TokenKind::Boolean => Some(Node::Boolean(token.text == "kweli")),
        TokenKind::String => Some(Node::String(token.text.clone())),
        TokenKind::Number => Some(Node::Number(token.text.clone())),
        TokenKind::Identifier => Some(Node::Identifier(token.text.clone())),
        _ => None,
    }
}

//=============================================
//            Section 2: Binary Split
//=============================================

/// Position of the first operator outside brackets (excluding `=`).
///
/// The right operand is the whole remainder, so `a * b + c` groups as
/// `a * (b + c)`. An operator at index 0, or directly after another operator,
/// is a sign of the following operand rather than a split point.
pub fn find_binary_split(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0i32;
    for (index, token) in tokens.iter().enumerate() {
        if is_open(token) {
            depth += 1;
            continue;
        }
        if is_close(token) {
            depth -= 1;
            continue;
        }
        if depth != 0 || index == 0 || !token.is_binary_operator() {
            continue;
        }
        if tokens[index - 1].is_binary_operator() {
            continue;
        }
        return (index < tokens.len() - 1).then_some(index);
    }
    None
}

//=============================================
//            Section 3: Calls, Members, Access
//=============================================

fn is_callable_name(token: &Token) -> bool {
    token.is_identifier() || token.is_keyword("andika") || token.is_keyword("ingiza")
}

/// Builds the node for `name(args)`, lifting input and file I/O into their own nodes.
fn call_node(name: &str, args: Vec<Node>) -> Node {
    let mut args = args;
    match (name, args.len()) {
        ("ingiza", 0 | 1) => Node::Input {
            prompt: args.pop().map(Node::boxed),
        },
        ("soma_faili", 1) => Node::FileRead {
            filename: args.remove(0).boxed(),
        },
        ("andika_faili" | "ongeza_faili", 2) => {
            let content = args.remove(1);
            let filename = args.remove(0);
            Node::FileWrite {
                filename: filename.boxed(),
                content: content.boxed(),
                append: name == "ongeza_faili",
            }
        }
        _ => Node::FunctionCall {
            name: name.to_string(),
            args,
        },
    }
}

/// Comma-separated expressions; malformed entries are dropped.
pub fn parse_arguments(tokens: &[Token]) -> Vec<Node> {
    if tokens.is_empty() {
        return Vec::new();
    }
    split_top_level(tokens, ",")
        .into_iter()
        .filter(|part| !part.is_empty())
        .filter_map(parse_expression)
        .collect()
}

fn parse_pairs(tokens: &[Token]) -> Vec<(Node, Node)> {
    if tokens.is_empty() {
        return Vec::new();
    }
    split_top_level(tokens, ",")
        .into_iter()
        .filter_map(|entry| {
            let colon = find_top_level(entry, 0, |t| t.is_punct(":"))?;
            let key = parse_expression(&entry[..colon])?;
            let value = parse_expression(&entry[colon + 1..])?;
            Some((key, value))
        })
        .collect()
}

fn parse_member(tokens: &[Token]) -> Option<Node> {
    let mut depth = 0i32;
    let mut dot = None;
    for (index, token) in tokens.iter().enumerate() {
        if is_open(token) {
            depth += 1;
        } else if is_close(token) {
            depth -= 1;
        } else if depth == 0 && token.is_punct(".") {
            dot = Some(index);
        }
    }
    let dot = dot.filter(|&index| index > 0)?;
    let suffix = &tokens[dot + 1..];
    let name = suffix.first().filter(|t| t.is_identifier())?;

    if suffix.len() == 1 {
        let object = parse_expression(&tokens[..dot])?;
        return Some(Node::MemberAccess {
            object: object.boxed(),
            member: name.text.clone(),
        });
    }
    if suffix.len() >= 3
        && suffix[1].is_punct("(")
        && matching_close(suffix, 1) == Some(suffix.len() - 1)
    {
        let object = parse_expression(&tokens[..dot])?;
        return Some(Node::MethodCall {
            object: object.boxed(),
            method: name.text.clone(),
            args: parse_arguments(&suffix[2..suffix.len() - 1]),
        });
    }
    None
}

fn parse_element_access(tokens: &[Token]) -> Option<Node> {
    let close = tokens.len() - 1;
    let open = matching_open(tokens, close).filter(|&open| open > 0)?;
    let container = parse_expression(&tokens[..open])?;
    let index = parse_expression(&tokens[open + 1..close])?;
    Some(match index {
        Node::String(_) => Node::DictionaryAccess {
            dictionary: container.boxed(),
            key: index.boxed(),
        },
        _ => Node::ArrayAccess {
            array: container.boxed(),
            index: index.boxed(),
        },
    })
}

/// `kazi (params) [: type] { body }` used as a value.
fn parse_lambda(tokens: &[Token]) -> Option<Node> {
    let params_close = matching_close(tokens, 1)?;
    let open = find_top_level(tokens, params_close + 1, |t| t.is_punct("{"))?;
    if matching_close(tokens, open)? != tokens.len() - 1 {
        return None;
    }
    Some(Node::Lambda(Rc::new(FunctionDecl {
        name: String::new(),
        params: parse_params(&tokens[2..params_close]),
        return_type: return_type_between(&tokens[params_close + 1..open]),
        body: parse_block(&tokens[open + 1..tokens.len() - 1]),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn expr(source: &str) -> Node {
        parse_expression(&tokenize(source)).expect("expression parses")
    }

    fn num(text: &str) -> Box<Node> {
        Node::Number(text.into()).boxed()
    }

    fn ident(name: &str) -> Box<Node> {
        Node::Identifier(name.into()).boxed()
    }

    #[test]
    fn first_operator_takes_the_whole_remainder() {
        assert_eq!(
            expr("a * b + c"),
            Node::BinaryOp {
                left: ident("a"),
                op: "*".into(),
                right: Node::BinaryOp {
                    left: ident("b"),
                    op: "+".into(),
                    right: ident("c"),
                }
                .boxed(),
            }
        );
    }

    #[test]
    fn parentheses_group_explicitly() {
        assert_eq!(
            expr("(1 + 2) * 3"),
            Node::BinaryOp {
                left: Node::BinaryOp {
                    left: num("1"),
                    op: "+".into(),
                    right: num("2"),
                }
                .boxed(),
                op: "*".into(),
                right: num("3"),
            }
        );
    }

    #[test]
    fn leading_minus_is_a_sign() {
        assert_eq!(
            expr("-5"),
            Node::BinaryOp {
                left: num("0"),
                op: "-".into(),
                right: num("5"),
            }
        );
        assert!(matches!(expr("x * -2"), Node::BinaryOp { ref op, .. } if op == "*"));
    }

    #[test]
    fn logical_keywords_split() {
        assert!(matches!(expr("a na b"), Node::BinaryOp { ref op, .. } if op == "na"));
    }

    #[test]
    fn calls_and_builtin_nodes() {
        assert_eq!(
            expr("jumla(1, x)"),
            Node::FunctionCall {
                name: "jumla".into(),
                args: vec![Node::Number("1".into()), Node::Identifier("x".into())],
            }
        );
        assert_eq!(
            expr("ingiza(\"Jina?\")"),
            Node::Input {
                prompt: Some(Node::String("Jina?".into()).boxed())
            }
        );
        assert!(matches!(expr("soma_faili(\"a.txt\")"), Node::FileRead { .. }));
        assert!(matches!(
            expr("ongeza_faili(\"a.txt\", \"x\")"),
            Node::FileWrite { append: true, .. }
        ));
    }

    #[test]
    fn member_method_and_element_access() {
        assert!(matches!(expr("mtu.jina"), Node::MemberAccess { ref member, .. } if member == "jina"));
        assert!(matches!(expr("hii.jina"), Node::MemberAccess { ref object, .. } if **object == Node::This));
        assert!(matches!(
            expr("hesabu.jumla(1, 2)"),
            Node::MethodCall { ref method, ref args, .. } if method == "jumla" && args.len() == 2
        ));
        assert!(matches!(expr("a[0]"), Node::ArrayAccess { .. }));
        assert!(matches!(expr("d[\"k\"]"), Node::DictionaryAccess { .. }));
        assert!(matches!(expr("hii.vitu[1]"), Node::ArrayAccess { ref array, .. } if matches!(**array, Node::MemberAccess { .. })));
    }

    #[test]
    fn literals_and_instances() {
        assert_eq!(expr("kweli"), Node::Boolean(true));
        assert_eq!(expr("\"habari\""), Node::String("habari".into()));
        assert!(matches!(expr("[1, 2, 3]"), Node::Array { ref elements } if elements.len() == 3));
        assert!(matches!(expr("{\"a\": 1, \"b\": 2}"), Node::Dictionary { ref pairs } if pairs.len() == 2));
        assert!(matches!(expr("unda Mtu(\"Amina\")"), Node::NewInstance { ref class_name, .. } if class_name == "Mtu"));
    }

    #[test]
    fn lambda_expression() {
        match expr("kazi(x) { rudisha x * 2 }") {
            Node::Lambda(decl) => {
                assert_eq!(decl.params.len(), 1);
                assert_eq!(decl.body.len(), 1);
            }
            other => panic!("expected lambda, found {other:?}"),
        }
    }

    #[test]
    fn malformed_spans_are_absent() {
        assert_eq!(parse_expression(&tokenize("")), None);
        assert_eq!(parse_expression(&tokenize("+")), None);
        assert_eq!(parse_expression(&tokenize("1 +")), None);
    }
}

//=============================================
// End of file
//=============================================
