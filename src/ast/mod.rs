//=====================================================
// File: ast/mod.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Kwenda Abstract Syntax Tree definitions
// Objective: Define the tagged node shapes produced by the parser and walked
//            by the interpreter, plus a source-like renderer for them
//=====================================================

use std::fmt;
use std::rc::Rc;

/// A declared parameter: `a` or `namba a`
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Option<String>,
}

/// Shared shape of named functions, methods, constructors and lambdas
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<String>,
    pub body: Vec<Node>,
}

/// A class property: `namba umri = 0`
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: String,
    pub default: Option<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub parent: Option<String>,
    pub properties: Vec<Property>,
    pub methods: Vec<Rc<FunctionDecl>>,
    pub constructor: Option<Rc<FunctionDecl>>,
}

/// One variant per language construct
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(String),
    Boolean(bool),
    String(String),
    Identifier(String),
    BinaryOp {
        left: Box<Node>,
        op: String,
        right: Box<Node>,
    },
    Return {
        value: Option<Box<Node>>,
    },
    Input {
        prompt: Option<Box<Node>>,
    },
    FunctionCall {
        name: String,
        args: Vec<Node>,
    },
    /// Declaration with `namba`/`buliani`/`orodha`/`kamusi`, and plain assignment
    VariableDeclaration {
        name: String,
        value: Box<Node>,
    },
    StringVariableDeclaration {
        name: String,
        value: Box<Node>,
    },
    Function(Rc<FunctionDecl>),
    If {
        condition: Box<Node>,
        then_body: Vec<Node>,
        else_body: Option<Vec<Node>>,
    },
    While {
        condition: Box<Node>,
        body: Vec<Node>,
    },
    For {
        init: Option<Box<Node>>,
        condition: Option<Box<Node>>,
        update: Option<Box<Node>>,
        body: Vec<Node>,
    },
    Break,
    Continue,
    Array {
        elements: Vec<Node>,
    },
    ArrayDeclaration {
        name: String,
        elem_type: String,
        elements: Vec<Node>,
    },
    ArrayAccess {
        array: Box<Node>,
        index: Box<Node>,
    },
    ArrayAssignment {
        array: Box<Node>,
        index: Box<Node>,
        value: Box<Node>,
    },
    FileRead {
        filename: Box<Node>,
    },
    FileWrite {
        filename: Box<Node>,
        content: Box<Node>,
        append: bool,
    },
    Try {
        try_body: Vec<Node>,
        catch_var: Option<String>,
        catch_body: Option<Vec<Node>>,
        finally_body: Option<Vec<Node>>,
    },
    Throw {
        message: Box<Node>,
    },
    Import {
        module_path: String,
    },
    Class(Rc<ClassDecl>),
    NewInstance {
        class_name: String,
        args: Vec<Node>,
    },
    MemberAccess {
        object: Box<Node>,
        member: String,
    },
    MethodCall {
        object: Box<Node>,
        method: String,
        args: Vec<Node>,
    },
    MemberAssignment {
        object: Box<Node>,
        member: String,
        value: Box<Node>,
    },
    This,
    Dictionary {
        pairs: Vec<(Node, Node)>,
    },
    DictionaryDeclaration {
        name: String,
        pairs: Vec<(Node, Node)>,
    },
    DictionaryAccess {
        dictionary: Box<Node>,
        key: Box<Node>,
    },
    DictionaryAssignment {
        dictionary: Box<Node>,
        key: Box<Node>,
        value: Box<Node>,
    },
    Lambda(Rc<FunctionDecl>),
}

impl Node {
    pub fn boxed(self) -> Box<Node> {
        Box::new(self)
    }
}

/// Parsed program: top-level forms plus the imports collected beside them
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub forms: Vec<Node>,
    pub imports: Vec<Node>,
}

impl Program {
    pub fn new(forms: Vec<Node>, imports: Vec<Node>) -> Self {
        Self { forms, imports }
    }

    /// Find a top-level function declaration by name.
    pub fn function(&self, name: &str) -> Option<&Rc<FunctionDecl>> {
        self.forms.iter().find_map(|form| match form {
            Node::Function(decl) if decl.name == name => Some(decl),
            _ => None,
        })
    }
}

//=============================================
//            Source Rendering
//=============================================

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

fn block(body: &[Node]) -> String {
    if body.is_empty() {
        "{ }".to_string()
    } else {
        format!("{{ {} }}", join(body, " "))
    }
}

fn pairs(items: &[(Node, Node)]) -> String {
    items
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ty {
            Some(ty) => write!(f, "{ty} {}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl fmt::Display for FunctionDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", join(&self.params, ", "))?;
        if let Some(ret) = &self.return_type {
            write!(f, " : {ret}")?;
        }
        write!(f, " {}", block(&self.body))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Number(text) => f.write_str(text),
            Node::Boolean(true) => f.write_str("kweli"),
            Node::Boolean(false) => f.write_str("uwongo"),
            Node::String(text) => write!(f, "\"{text}\""),
            Node::Identifier(name) => f.write_str(name),
            Node::BinaryOp { left, op, right } => write!(f, "({left} {op} {right})"),
            Node::Return { value: Some(value) } => write!(f, "rudisha {value}"),
            Node::Return { value: None } => f.write_str("rudisha"),
            Node::Input { prompt: Some(prompt) } => write!(f, "ingiza({prompt})"),
            Node::Input { prompt: None } => f.write_str("ingiza()"),
            Node::FunctionCall { name, args } => write!(f, "{name}({})", join(args, ", ")),
            Node::VariableDeclaration { name, value } => write!(f, "{name} = {value}"),
            Node::StringVariableDeclaration { name, value } => {
                write!(f, "maneno {name} = {value}")
            }
            Node::Function(decl) => write!(f, "kazi {}{decl}", decl.name),
            Node::If {
                condition,
                then_body,
                else_body,
            } => {
                write!(f, "kama {condition} {}", block(then_body))?;
                if let Some(else_body) = else_body {
                    write!(f, " sivyo {}", block(else_body))?;
                }
                Ok(())
            }
            Node::While { condition, body } => write!(f, "wakati {condition} {}", block(body)),
            Node::For {
                init,
                condition,
                update,
                body,
            } => {
                let part = |node: &Option<Box<Node>>| {
                    node.as_ref().map(ToString::to_string).unwrap_or_default()
                };
                write!(
                    f,
                    "kwa {}; {}; {} {}",
                    part(init),
                    part(condition),
                    part(update),
                    block(body)
                )
            }
            Node::Break => f.write_str("vunja"),
            Node::Continue => f.write_str("endelea"),
            Node::Array { elements } => write!(f, "[{}]", join(elements, ", ")),
            Node::ArrayDeclaration {
                name,
                elem_type,
                elements,
            } => write!(f, "{elem_type}[] {name} = [{}]", join(elements, ", ")),
            Node::ArrayAccess { array, index } => write!(f, "{array}[{index}]"),
            Node::ArrayAssignment {
                array,
                index,
                value,
            } => write!(f, "{array}[{index}] = {value}"),
            Node::FileRead { filename } => write!(f, "soma_faili({filename})"),
            Node::FileWrite {
                filename,
                content,
                append,
            } => {
                let name = if *append { "ongeza_faili" } else { "andika_faili" };
                write!(f, "{name}({filename}, {content})")
            }
            Node::Try {
                try_body,
                catch_var,
                catch_body,
                finally_body,
            } => {
                write!(f, "jaribu {}", block(try_body))?;
                if let Some(catch_body) = catch_body {
                    match catch_var {
                        Some(var) => write!(f, " shika ({var}) {}", block(catch_body))?,
                        None => write!(f, " shika {}", block(catch_body))?,
                    }
                }
                if let Some(finally_body) = finally_body {
                    write!(f, " hatimaye {}", block(finally_body))?;
                }
                Ok(())
            }
            Node::Throw { message } => write!(f, "tupa {message}"),
            Node::Import { module_path } => write!(f, "leta \"{module_path}\""),
            Node::Class(class) => {
                write!(f, "darasa {}", class.name)?;
                if let Some(parent) = &class.parent {
                    write!(f, " rithi {parent}")?;
                }
                f.write_str(" {")?;
                for property in &class.properties {
                    write!(f, " {} {}", property.ty, property.name)?;
                    if let Some(default) = &property.default {
                        write!(f, " = {default}")?;
                    }
                }
                if let Some(constructor) = &class.constructor {
                    write!(f, " unda{constructor}")?;
                }
                for method in &class.methods {
                    write!(f, " kazi {}{method}", method.name)?;
                }
                f.write_str(" }")
            }
            Node::NewInstance { class_name, args } => {
                write!(f, "unda {class_name}({})", join(args, ", "))
            }
            Node::MemberAccess { object, member } => write!(f, "{object}.{member}"),
            Node::MethodCall {
                object,
                method,
                args,
            } => write!(f, "{object}.{method}({})", join(args, ", ")),
            Node::MemberAssignment {
                object,
                member,
                value,
            } => write!(f, "{object}.{member} = {value}"),
            Node::This => f.write_str("hii"),
            Node::Dictionary { pairs: items } => write!(f, "{{{}}}", pairs(items)),
            Node::DictionaryDeclaration { name, pairs: items } => {
                write!(f, "kamusi {name} = {{{}}}", pairs(items))
            }
            Node::DictionaryAccess { dictionary, key } => write!(f, "{dictionary}[{key}]"),
            Node::DictionaryAssignment {
                dictionary,
                key,
                value,
            } => write!(f, "{dictionary}[{key}] = {value}"),
            Node::Lambda(decl) => write!(f, "kazi{decl}"),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for import in &self.imports {
            writeln!(f, "{import}")?;
        }
        for form in &self.forms {
            writeln!(f, "{form}")?;
        }
        Ok(())
    }
}

//=====================================================
// End of file
//=====================================================
