//=============================================
// kwenda/interpreter/value.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Kwenda runtime values
// Objective: Define the closed value universe, the control signals threaded
//            through evaluation, and the coercions every operator relies on
//=============================================

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::FunctionDecl;
use crate::environment::{ClassDef, Env};

//=============================================
//            Section 1: Values
//=============================================

/// A function value: its declaration plus the frame it was created in.
pub struct Closure {
    pub decl: Rc<FunctionDecl>,
    pub scope: Env,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.decl.name)
            .field("params", &self.decl.params.len())
            .finish()
    }
}

#[derive(Debug)]
pub struct Instance {
    pub class: Rc<ClassDef>,
    pub properties: BTreeMap<String, Value>,
}

/// Payload of a thrown error.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorValue {
    pub message: String,
    pub context: Option<String>,
}

impl ErrorValue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Some(context.into()),
        }
    }
}

/// Kwenda runtime values. Arrays, dictionaries and instances are shared by reference.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Dict(Rc<RefCell<BTreeMap<String, Value>>>),
    Function(Rc<Closure>),
    Instance(Rc<RefCell<Instance>>),
    Error(ErrorValue),
    Nil,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;

        match (self, other) {
            (Int(a), Int(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Array(a), Array(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Dict(a), Dict(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Function(a), Function(b)) => Rc::ptr_eq(a, b),
            (Instance(a), Instance(b)) => Rc::ptr_eq(a, b),
            (Error(a), Error(b)) => a == b,
            (Nil, Nil) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(true) => f.write_str("kweli"),
            Value::Bool(false) => f.write_str("uwongo"),
            Value::Str(s) => f.write_str(s),
            Value::Array(items) => render_once(address(items), f, "[...]", |f| {
                f.write_str("[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }),
            Value::Dict(entries) => render_once(address(entries), f, "{...}", |f| {
                f.write_str("{")?;
                for (i, (key, value)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }),
            Value::Function(closure) if closure.decl.name.is_empty() => f.write_str("<kazi>"),
            Value::Function(closure) => write!(f, "<kazi {}>", closure.decl.name),
            Value::Instance(cell) => render_once(address(cell), f, "{...}", |f| {
                let instance = cell.borrow();
                write!(f, "{}{{", instance.class.name())?;
                for (i, (key, value)) in instance.properties.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }),
            Value::Error(error) => f.write_str(&error.message),
            Value::Nil => f.write_str("tupu"),
        }
    }
}

thread_local! {
    /// Containers currently being rendered on this thread.
    static RENDERING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

fn address<T>(shared: &Rc<T>) -> usize {
    Rc::as_ptr(shared) as *const () as usize
}

/// Render a shared container, writing `placeholder` when it already encloses itself.
fn render_once(
    addr: usize,
    f: &mut fmt::Formatter<'_>,
    placeholder: &str,
    body: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
    let entered = RENDERING.with(|stack| {
        let mut stack = stack.borrow_mut();
        if stack.contains(&addr) {
            false
        } else {
            stack.push(addr);
            true
        }
    });
    if !entered {
        return f.write_str(placeholder);
    }
    let result = body(f);
    RENDERING.with(|stack| {
        stack.borrow_mut().pop();
    });
    result
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Value::Dict(Rc::new(RefCell::new(entries)))
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Str(text.to_string())
    }
}

//=============================================
//            Section 2: Coercions
//=============================================

/// Result of numeric coercion, remembering whether float arithmetic applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn is_float(self) -> bool {
        matches!(self, Number::Float(_))
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(x) => x,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Number::Int(n) => n,
            Number::Float(x) => x as i64,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(n) => n == 0,
            Number::Float(x) => x == 0.0,
        }
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Int(n) => Value::Int(n),
            Number::Float(x) => Value::Float(x),
        }
    }
}

/// Parse numeric text; float-ness follows the presence of a `.`.
pub fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if text.contains('.') {
        text.parse::<f64>().ok().map(Number::Float)
    } else {
        text.parse::<i64>().ok().map(Number::Int)
    }
}

impl Value {
    //Function: to_bool
    //Purpose: Kwenda truthiness: false, zero and empty strings are false
    //Inputs: &self
    //Returns: bool
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
            _ => false,
        }
    }

    //Function: to_number
    //Purpose: Numeric coercion that never fails; unconvertible values become 0
    //Inputs: &self
    //Returns: Number
    pub fn to_number(&self) -> Number {
        match self {
            Value::Int(n) => Number::Int(*n),
            Value::Float(x) => Number::Float(*x),
            Value::Bool(b) => Number::Int(i64::from(*b)),
            Value::Str(s) => parse_number(s).unwrap_or(Number::Int(0)),
            _ => Number::Int(0),
        }
    }

    /// Strings and error values take part in concatenation and string equality.
    pub fn is_string_like(&self) -> bool {
        matches!(self, Value::Str(_) | Value::Error(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) | Value::Float(_) => "namba",
            Value::Bool(_) => "buliani",
            Value::Str(_) => "maneno",
            Value::Array(_) => "orodha",
            Value::Dict(_) => "kamusi",
            Value::Function(_) => "kazi",
            Value::Instance(_) => "kitu",
            Value::Error(_) => "hitilafu",
            Value::Nil => "tupu",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Error(error) => Some(&error.message),
            _ => None,
        }
    }
}

//=============================================
//            Section 3: Control Signals
//=============================================

/// Early exits threaded through every statement executor as `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Break,
    Continue,
    Return(Value),
    Throw(ErrorValue),
}

impl Signal {
    pub fn throw(message: impl Into<String>) -> Self {
        Signal::Throw(ErrorValue::new(message))
    }

    pub fn throw_with(message: impl Into<String>, context: impl Into<String>) -> Self {
        Signal::Throw(ErrorValue::with_context(message, context))
    }
}

pub type Flow<T = Value> = Result<T, Signal>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::Bool(false).to_bool());
        assert!(Value::Int(3).to_bool());
        assert!(!Value::Int(0).to_bool());
        assert!(!Value::Float(0.0).to_bool());
        assert!(Value::from("a").to_bool());
        assert!(!Value::from("").to_bool());
        assert!(!Value::Nil.to_bool());
        assert!(!Value::from(vec![Value::Int(1)]).to_bool());
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(Value::from("42").to_number(), Number::Int(42));
        assert_eq!(Value::from("2.5").to_number(), Number::Float(2.5));
        assert_eq!(Value::Bool(true).to_number(), Number::Int(1));
        assert_eq!(Value::from("habari").to_number(), Number::Int(0));
        assert_eq!(Value::Nil.to_number(), Number::Int(0));
    }

    #[test]
    fn self_containing_containers_render_a_placeholder() {
        let items = Value::from(vec![Value::Int(1)]);
        if let Value::Array(cell) = &items {
            cell.borrow_mut().push(items.clone());
        }
        assert_eq!(items.to_string(), "[1, [...]]");

        let entries = Value::from(BTreeMap::<String, Value>::new());
        if let Value::Dict(cell) = &entries {
            cell.borrow_mut().insert("mimi".into(), entries.clone());
        }
        assert_eq!(entries.to_string(), "{mimi: {...}}");
        assert_eq!(items.to_string(), "[1, [...]]");
    }

    #[test]
    fn arrays_render_with_comma_space() {
        assert_eq!(Value::from(Vec::<Value>::new()).to_string(), "[]");
        let nested = Value::from(vec![
            Value::Int(1),
            Value::from("a"),
            Value::from(vec![Value::Bool(true)]),
        ]);
        assert_eq!(nested.to_string(), "[1, a, [kweli]]");
    }

    #[test]
    fn arrays_alias_storage() {
        let a = Value::from(vec![Value::Int(1)]);
        let b = a.clone();
        if let Value::Array(items) = &b {
            items.borrow_mut().push(Value::Int(2));
        }
        assert_eq!(a.to_string(), "[1, 2]");
    }

    #[test]
    fn error_displays_message() {
        let error = Value::Error(ErrorValue::with_context("X", "faili"));
        assert_eq!(error.to_string(), "X");
        assert_eq!(error.as_str(), Some("X"));
    }
}

//=============================================
// End of file
//=============================================
