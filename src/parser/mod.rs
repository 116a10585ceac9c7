//=============================================
// kwenda/parser/mod.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Kwenda statement parser
// Objective: Turn the flat token stream into a Program of top-level forms,
//            delimiting terminator-free statements by bracket balance and
//            keyword lookahead, and dropping spans that do not parse
//=============================================

mod expr;
pub mod span;

pub use expr::{find_binary_split, parse_arguments, parse_expression};

use std::rc::Rc;

use tracing::debug;

use crate::ast::{ClassDecl, FunctionDecl, Node, Param, Program, Property};
use crate::tokenizer::{Token, TokenKind, is_type_keyword};
use span::{
    brace_span_end, find_top_level, if_span_end, matching_close, matching_open, split_top_level,
    statement_end, try_span_end,
};

//=============================================
//            Section 1: Parser Entry Points
//=============================================

/// Parser over an owned token stream
pub struct Parser {
    tokens: Vec<Token>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn parse(&self) -> Program {
        parse_program(&self.tokens)
    }
}

//Function: parse_program
//Purpose: Collect imports and top-level forms (functions, classes, declarations)
//Inputs: tokens: &[Token]
//Returns: Program
pub fn parse_program(tokens: &[Token]) -> Program {
    let mut program = Program::default();
    let mut index = 0;
    while index < tokens.len() {
        let token = &tokens[index];
        if token.is_keyword("leta") {
            if let Some(path) = tokens.get(index + 1).filter(|t| t.kind == TokenKind::String) {
                program.imports.push(Node::Import {
                    module_path: path.text.clone(),
                });
            }
            index = (index + 2).min(tokens.len());
            continue;
        }

        let end = statement_span_end(tokens, index);
        let is_form = token.is_keyword("darasa")
            || is_type_keyword(&token.text) && token.kind == TokenKind::Keyword
            || token.is_keyword("kazi") && tokens.get(index + 1).is_some_and(Token::is_identifier);
        if is_form {
            match parse(&tokens[index..end]) {
                Some(form) => program.forms.push(form),
                None => debug!(line = token.line, "dropping malformed top-level form"),
            }
        } else if !token.is_punct(";") {
            debug!(line = token.line, token = %token, "skipping top-level statement");
        }
        index = end;
    }
    program
}

/// Parse a statement sequence; unparseable statements contribute nothing.
pub fn parse_block(tokens: &[Token]) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut index = 0;
    while index < tokens.len() {
        if tokens[index].is_punct(";") {
            index += 1;
            continue;
        }
        let end = statement_span_end(tokens, index);
        match parse(&tokens[index..end]) {
            Some(node) => nodes.push(node),
            None => debug!(line = tokens[index].line, "dropping unparsed statement"),
        }
        index = end;
    }
    nodes
}

/// Exclusive end of the statement starting at `start`; always past `start`.
fn statement_span_end(tokens: &[Token], start: usize) -> usize {
    let lead = &tokens[start];
    let end = match lead.text.as_str() {
        _ if lead.kind != TokenKind::Keyword => statement_end(tokens, start + 1),
        "kama" => if_span_end(tokens, start),
        "wakati" | "kwa" | "darasa" => brace_span_end(tokens, start + 1),
        "jaribu" => try_span_end(tokens, start),
        "vunja" | "endelea" => start + 1,
        "leta" => start + 2,
        "kazi" if tokens.get(start + 1).is_some_and(Token::is_identifier) => {
            brace_span_end(tokens, start + 1)
        }
        word if is_type_keyword(word) => {
            statement_end(tokens, declaration_name_index(tokens, start) + 1)
        }
        _ => statement_end(tokens, start + 1),
    };
    end.clamp(start + 1, tokens.len())
}

/// Index of the declared name, past an optional `[]` suffix on the type.
fn declaration_name_index(tokens: &[Token], start: usize) -> usize {
    let array_suffix = tokens.get(start + 1).is_some_and(|t| t.is_punct("["))
        && tokens.get(start + 2).is_some_and(|t| t.is_punct("]"));
    if array_suffix { start + 3 } else { start + 1 }
}

//=============================================
//            Section 2: Statement Dispatch
//=============================================

//Function: parse
//Purpose: Route one already-bounded statement span to its node
//Inputs: tokens: &[Token]
//Returns: Option<Node> (None when the span is malformed)
pub fn parse(tokens: &[Token]) -> Option<Node> {
    let first = tokens.first()?;
    if first.kind == TokenKind::Keyword {
        match first.text.as_str() {
            "kama" => return parse_if(tokens),
            "wakati" => return parse_while(tokens),
            "kwa" => return parse_for(tokens),
            "vunja" => return Some(Node::Break),
            "endelea" => return Some(Node::Continue),
            "rudisha" => {
                return Some(Node::Return {
                    value: parse_expression(&tokens[1..]).map(Node::boxed),
                });
            }
            "tupa" => {
                let message =
                    parse_expression(&tokens[1..]).unwrap_or_else(|| Node::String(String::new()));
                return Some(Node::Throw {
                    message: message.boxed(),
                });
            }
            "jaribu" => return parse_try(tokens),
            "darasa" => return parse_class(tokens),
            "kazi" if tokens.get(1).is_some_and(Token::is_identifier) => {
                return parse_function(tokens).map(|decl| Node::Function(Rc::new(decl)));
            }
            "leta" => {
                let path = tokens.get(1).filter(|t| t.kind == TokenKind::String)?;
                return Some(Node::Import {
                    module_path: path.text.clone(),
                });
            }
            word if is_type_keyword(word) => return parse_declaration(tokens),
            _ => {}
        }
    }
    if let Some(eq) = find_top_level(tokens, 0, |t| t.is_operator("=")) {
        return parse_assignment(tokens, eq);
    }
    parse_expression(tokens)
}

/// Condition tokens before the body brace, and the body's bracket positions.
fn header_and_body(tokens: &[Token], from: usize) -> Option<(usize, usize)> {
    let open = find_top_level(tokens, from, |t| t.is_punct("{"))?;
    let close = matching_close(tokens, open)?;
    Some((open, close))
}

fn parse_if(tokens: &[Token]) -> Option<Node> {
    let (open, close) = header_and_body(tokens, 1)?;
    let condition = parse_expression(&tokens[1..open])?;
    let then_body = parse_block(&tokens[open + 1..close]);

    let after = close + 1;
    let else_body = if tokens.get(after).is_some_and(|t| t.is_keyword("sivyo")) {
        if tokens.get(after + 1).is_some_and(|t| t.is_keyword("kama")) {
            Some(vec![parse_if(&tokens[after + 1..])?])
        } else {
            let (else_open, else_close) = header_and_body(tokens, after + 1)?;
            Some(parse_block(&tokens[else_open + 1..else_close]))
        }
    } else {
        None
    };

    Some(Node::If {
        condition: condition.boxed(),
        then_body,
        else_body,
    })
}

fn parse_while(tokens: &[Token]) -> Option<Node> {
    let (open, close) = header_and_body(tokens, 1)?;
    let condition = parse_expression(&tokens[1..open])?;
    Some(Node::While {
        condition: condition.boxed(),
        body: parse_block(&tokens[open + 1..close]),
    })
}

fn strip_parens(tokens: &[Token]) -> &[Token] {
    let wrapped = tokens.first().is_some_and(|t| t.is_punct("("))
        && matching_close(tokens, 0) == Some(tokens.len() - 1);
    if wrapped {
        &tokens[1..tokens.len() - 1]
    } else {
        tokens
    }
}

fn parse_for(tokens: &[Token]) -> Option<Node> {
    let (open, close) = header_and_body(tokens, 1)?;
    let header = strip_parens(&tokens[1..open]);
    let body = parse_block(&tokens[open + 1..close]);

    let clauses = split_top_level(header, ";");
    let (init, condition, update) = if clauses.len() == 3 {
        (
            parse(clauses[0]),
            parse_expression(clauses[1]),
            parse(clauses[2]),
        )
    } else {
        (None, parse_expression(header), None)
    };

    Some(Node::For {
        init: init.map(Node::boxed),
        condition: condition.map(Node::boxed),
        update: update.map(Node::boxed),
        body,
    })
}

fn parse_try(tokens: &[Token]) -> Option<Node> {
    let (open, close) = header_and_body(tokens, 1)?;
    let try_body = parse_block(&tokens[open + 1..close]);
    let mut position = close + 1;

    let mut catch_var = None;
    let mut catch_body = None;
    if tokens.get(position).is_some_and(|t| t.is_keyword("shika")) {
        position += 1;
        if tokens.get(position).is_some_and(|t| t.is_punct("(")) {
            let var_close = matching_close(tokens, position)?;
            catch_var = tokens[position + 1..var_close]
                .iter()
                .find(|t| t.is_identifier())
                .map(|t| t.text.clone());
            position = var_close + 1;
        }
        let (open, close) = header_and_body(tokens, position)?;
        catch_body = Some(parse_block(&tokens[open + 1..close]));
        position = close + 1;
    }

    let mut finally_body = None;
    if tokens.get(position).is_some_and(|t| t.is_keyword("hatimaye")) {
        let (open, close) = header_and_body(tokens, position + 1)?;
        finally_body = Some(parse_block(&tokens[open + 1..close]));
    }

    Some(Node::Try {
        try_body,
        catch_var,
        catch_body,
        finally_body,
    })
}

//=============================================
//            Section 3: Functions and Classes
//=============================================

/// Parameters written as `a`, `namba a`, `namba[] a` or `a : namba`.
fn parse_params(tokens: &[Token]) -> Vec<Param> {
    if tokens.is_empty() {
        return Vec::new();
    }
    split_top_level(tokens, ",")
        .into_iter()
        .filter_map(|part| match part {
            [name] if name.is_identifier() => Some(Param {
                name: name.text.clone(),
                ty: None,
            }),
            [name, colon, ty] if name.is_identifier() && colon.is_punct(":") => Some(Param {
                name: name.text.clone(),
                ty: Some(ty.text.clone()),
            }),
            [.., name] if name.is_identifier() => Some(Param {
                name: name.text.clone(),
                ty: type_annotation(&part[..part.len() - 1]),
            }),
            _ => None,
        })
        .collect()
}

/// Text of a type written as `namba` or `namba[]`.
fn type_annotation(tokens: &[Token]) -> Option<String> {
    match tokens {
        [ty] => Some(ty.text.clone()),
        [ty, open, close] if open.is_punct("[") && close.is_punct("]") => {
            Some(format!("{}[]", ty.text))
        }
        _ => None,
    }
}

/// Optional return type between a parameter list and its body: `: namba` or `namba`.
fn return_type_between(tokens: &[Token]) -> Option<String> {
    let tokens = match tokens.first() {
        Some(colon) if colon.is_punct(":") => &tokens[1..],
        _ => tokens,
    };
    type_annotation(tokens)
}

//Function: parse_function
//Purpose: Parse `kazi name(params) [: type] { body }`
//Inputs: tokens: &[Token] (the bounded span)
//Returns: Option<FunctionDecl>
fn parse_function(tokens: &[Token]) -> Option<FunctionDecl> {
    let name = tokens.get(1).filter(|t| t.is_identifier())?;
    if !tokens.get(2).is_some_and(|t| t.is_punct("(")) {
        return None;
    }
    let params_close = matching_close(tokens, 2)?;
    let (open, close) = header_and_body(tokens, params_close + 1)?;
    Some(FunctionDecl {
        name: name.text.clone(),
        params: parse_params(&tokens[3..params_close]),
        return_type: return_type_between(&tokens[params_close + 1..open]),
        body: parse_block(&tokens[open + 1..close]),
    })
}

fn parse_class(tokens: &[Token]) -> Option<Node> {
    let name = tokens.get(1).filter(|t| t.is_identifier())?;
    let parent = match (tokens.get(2), tokens.get(3)) {
        (Some(rithi), Some(parent)) if rithi.is_keyword("rithi") && parent.is_identifier() => {
            Some(parent.text.clone())
        }
        _ => None,
    };
    let (open, close) = header_and_body(tokens, 2)?;
    let body = &tokens[open + 1..close];

    let mut properties = Vec::new();
    let mut methods = Vec::new();
    let mut constructor = None;
    let mut index = 0;
    while index < body.len() {
        let token = &body[index];
        if token.is_keyword("unda") && body.get(index + 1).is_some_and(|t| t.is_punct("(")) {
            let params_close = matching_close(body, index + 1)?;
            let (ctor_open, ctor_close) = header_and_body(body, params_close + 1)?;
            constructor = Some(Rc::new(FunctionDecl {
                name: "unda".into(),
                params: parse_params(&body[index + 2..params_close]),
                return_type: None,
                body: parse_block(&body[ctor_open + 1..ctor_close]),
            }));
            index = ctor_close + 1;
            continue;
        }

        let end = statement_span_end(body, index);
        if token.is_keyword("kazi") {
            match parse_function(&body[index..end]) {
                Some(method) => methods.push(Rc::new(method)),
                None => debug!(line = token.line, "dropping malformed method"),
            }
        } else if token.kind == TokenKind::Keyword && is_type_keyword(&token.text) {
            match parse_property(&body[index..end]) {
                Some(property) => properties.push(property),
                None => debug!(line = token.line, "dropping malformed property"),
            }
        } else if !token.is_punct(";") {
            debug!(line = token.line, token = %token, "ignoring statement in class body");
        }
        index = end;
    }

    Some(Node::Class(Rc::new(ClassDecl {
        name: name.text.clone(),
        parent,
        properties,
        methods,
        constructor,
    })))
}

fn parse_property(tokens: &[Token]) -> Option<Property> {
    let name_index = declaration_name_index(tokens, 0);
    let ty = type_annotation(&tokens[..name_index])?;
    let name = tokens.get(name_index).filter(|t| t.is_identifier())?;
    let default = match tokens.get(name_index + 1) {
        Some(eq) if eq.is_operator("=") => Some(parse_expression(&tokens[name_index + 2..])?),
        _ => None,
    };
    Some(Property {
        name: name.text.clone(),
        ty,
        default,
    })
}

//=============================================
//            Section 4: Declarations and Assignment
//=============================================

//Function: parse_declaration
//Purpose: Parse `type [ [] ] name [= value]`, defaulting to the type's zero value
//Inputs: tokens: &[Token]
//Returns: Option<Node>
fn parse_declaration(tokens: &[Token]) -> Option<Node> {
    let ty = tokens[0].text.as_str();
    let name_index = declaration_name_index(tokens, 0);
    let is_array = ty == "orodha" || name_index == 3;
    let name = tokens.get(name_index).filter(|t| t.is_identifier())?.text.clone();

    let value = match tokens.get(name_index + 1) {
        Some(eq) if eq.is_operator("=") => Some(parse_expression(&tokens[name_index + 2..])?),
        Some(_) => return None,
        None => None,
    };

    let node = match (value, ty) {
        (None, _) if is_array => Node::ArrayDeclaration {
            name,
            elem_type: ty.to_string(),
            elements: Vec::new(),
        },
        (Some(Node::Array { elements }), _) if is_array => Node::ArrayDeclaration {
            name,
            elem_type: ty.to_string(),
            elements,
        },
        (None, "kamusi") => Node::DictionaryDeclaration {
            name,
            pairs: Vec::new(),
        },
        (Some(Node::Dictionary { pairs }), "kamusi") => Node::DictionaryDeclaration { name, pairs },
        (value, "maneno") => Node::StringVariableDeclaration {
            name,
            value: value.unwrap_or_else(|| Node::String(String::new())).boxed(),
        },
        (Some(value), _) => Node::VariableDeclaration {
            name,
            value: value.boxed(),
        },
        (None, _) => Node::VariableDeclaration {
            name,
            value: zero_value(ty).boxed(),
        },
    };
    Some(node)
}

fn zero_value(ty: &str) -> Node {
    match ty {
        "buliani" => Node::Boolean(false),
        _ => Node::Number("0".into()),
    }
}

fn parse_assignment(tokens: &[Token], eq: usize) -> Option<Node> {
    let target = &tokens[..eq];
    let value = parse_expression(&tokens[eq + 1..])?.boxed();
    let last = target.len().checked_sub(1)?;

    if let [name] = target {
        return name.is_identifier().then(|| Node::VariableDeclaration {
            name: name.text.clone(),
            value,
        });
    }
    if target[last].is_punct("]") {
        let open = matching_open(target, last).filter(|&open| open > 0)?;
        let container = parse_expression(&target[..open])?.boxed();
        let index = parse_expression(&target[open + 1..last])?;
        return Some(match index {
            Node::String(_) => Node::DictionaryAssignment {
                dictionary: container,
                key: index.boxed(),
                value,
            },
            _ => Node::ArrayAssignment {
                array: container,
                index: index.boxed(),
                value,
            },
        });
    }
    if last >= 2 && target[last - 1].is_punct(".") && target[last].is_identifier() {
        let object = parse_expression(&target[..last - 1])?.boxed();
        return Some(Node::MemberAssignment {
            object,
            member: target[last].text.clone(),
            value,
        });
    }
    None
}


//=============================================
// End of file
//=============================================
