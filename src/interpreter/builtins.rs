//=============================================
// kwenda/interpreter/builtins.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Built-in function table
// Objective: Register fixed-name, fixed-arity natives for printing, arrays,
//            dictionaries, text, conversion, randomness, time and files
//=============================================

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use rand::Rng;

use super::ops::equals;
use super::value::{Flow, Signal, Value};
use super::{Interpreter, element_at};

//=============================================
// Section 1: Native Function Arity
//=============================================

/// Supported arity constraints for native (built-in) functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeArity {
    /// The function expects exactly this many arguments.
    Exact(usize),
    /// Inclusive minimum and optional maximum; `None` means no upper bound.
    Range { min: usize, max: Option<usize> },
}

impl NativeArity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            NativeArity::Exact(n) => *n == count,
            NativeArity::Range { min, max } => {
                count >= *min && max.is_none_or(|max| count <= max)
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            NativeArity::Exact(n) => format!("{n}"),
            NativeArity::Range { min, max } => match max {
                Some(max) if min == max => format!("{min}"),
                Some(max) => format!("{min}..={max} arguments"),
                None if *min == 0 => "any number of arguments".to_string(),
                None => format!("at least {min} arguments"),
            },
        }
    }
}

pub(super) type NativeFn = fn(&mut Interpreter, &[Value]) -> Flow;

#[derive(Clone, Copy)]
pub(super) struct NativeFunction {
    pub arity: NativeArity,
    pub func: NativeFn,
}

//=============================================
// Section 2: Registration
//=============================================

impl Interpreter {
    pub(super) fn init_builtins(&mut self) {
        use NativeArity::Exact;

        self.register_builtin("andika", NativeArity::Range { min: 0, max: None }, builtin_andika);
        self.register_builtin("urefu", Exact(1), builtin_urefu);
        self.register_builtin("ongeza", Exact(2), builtin_ongeza);
        self.register_builtin("pata", Exact(2), builtin_pata);
        self.register_builtin("weka", Exact(3), builtin_weka);
        self.register_builtin("ondoa", Exact(2), builtin_ondoa);
        self.register_builtin("funguo", Exact(1), builtin_funguo);
        self.register_builtin("ina_ufunguo", Exact(2), builtin_ina_ufunguo);
        self.register_builtin("herufi_kubwa", Exact(1), builtin_herufi_kubwa);
        self.register_builtin("herufi_ndogo", Exact(1), builtin_herufi_ndogo);
        self.register_builtin("punguza", Exact(1), builtin_punguza);
        self.register_builtin("gawanya", Exact(2), builtin_gawanya);
        self.register_builtin("unganisha", Exact(2), builtin_unganisha);
        self.register_builtin("badilisha", Exact(3), builtin_badilisha);
        self.register_builtin("ina", Exact(2), builtin_ina);
        self.register_builtin("sehemu", Exact(3), builtin_sehemu);
        self.register_builtin("aina", Exact(1), builtin_aina);
        self.register_builtin("kwa_namba", Exact(1), builtin_kwa_namba);
        self.register_builtin("kwa_maneno", Exact(1), builtin_kwa_maneno);
        self.register_builtin("nasibu", Exact(2), builtin_nasibu);
        self.register_builtin("tarehe", Exact(0), builtin_tarehe);
        self.register_builtin("unda_faili", Exact(1), builtin_unda_faili);
        self.register_builtin("ondoa_faili", Exact(1), builtin_ondoa_faili);
        self.register_builtin("faili_ipo", Exact(1), builtin_faili_ipo);
    }

    fn register_builtin(&mut self, name: &'static str, arity: NativeArity, func: NativeFn) {
        self.builtins.insert(name, NativeFunction { arity, func });
    }
}

//=============================================
// Section 3: Console
//=============================================

fn builtin_andika(interp: &mut Interpreter, args: &[Value]) -> Flow {
    let line = args
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    interp.console.write_line(&line);
    Ok(Value::Nil)
}

//=============================================
// Section 4: Arrays and Dictionaries
//=============================================

fn builtin_urefu(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    let len = match &args[0] {
        Value::Array(items) => items.borrow().len(),
        Value::Dict(entries) => entries.borrow().len(),
        Value::Str(text) => text.chars().count(),
        _ => 0,
    };
    Ok(Value::Int(len as i64))
}

fn expect_array<'a>(value: &'a Value, op: &str) -> Flow<&'a Rc<RefCell<Vec<Value>>>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(Signal::throw_with(
            format!("{op} inahitaji orodha, si {}", other.type_name()),
            op,
        )),
    }
}

fn builtin_ongeza(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    expect_array(&args[0], "ongeza")?
        .borrow_mut()
        .push(args[1].clone());
    Ok(args[0].clone())
}

fn builtin_pata(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    element_at(&args[0], &args[1], "pata")
}

fn builtin_weka(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    if let Value::Dict(entries) = &args[0] {
        let key = args[1].to_string();
        entries.borrow_mut().insert(key, args[2].clone());
        return Ok(args[2].clone());
    }
    let items = expect_array(&args[0], "weka")?;
    // Bounds are checked by reading first.
    element_at(&args[0], &args[1], "weka")?;
    let at = index_number(&args[1]);
    items.borrow_mut()[at] = args[2].clone();
    Ok(args[2].clone())
}

fn builtin_ondoa(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    if let Value::Dict(entries) = &args[0] {
        let key = args[1].to_string();
        let removed = entries.borrow_mut().remove(&key);
        return Ok(removed.unwrap_or(Value::Nil));
    }
    let items = expect_array(&args[0], "ondoa")?;
    element_at(&args[0], &args[1], "ondoa")?;
    let at = index_number(&args[1]);
    Ok(items.borrow_mut().remove(at))
}

/// Position of an index already validated by `element_at`.
fn index_number(index: &Value) -> usize {
    match index {
        Value::Str(s) => s.trim().parse().unwrap_or(0),
        other => other.to_number().as_i64().max(0) as usize,
    }
}

fn builtin_funguo(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    let keys = match &args[0] {
        Value::Dict(entries) => entries.borrow().keys().map(|k| Value::from(k.as_str())).collect(),
        _ => Vec::new(),
    };
    Ok(Value::from(keys))
}

fn builtin_ina_ufunguo(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    let found = match &args[0] {
        Value::Dict(entries) => entries.borrow().contains_key(&args[1].to_string()),
        _ => false,
    };
    Ok(Value::Bool(found))
}

//=============================================
// Section 5: Text
//=============================================

fn builtin_herufi_kubwa(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    Ok(Value::Str(args[0].to_string().to_uppercase()))
}

fn builtin_herufi_ndogo(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    Ok(Value::Str(args[0].to_string().to_lowercase()))
}

fn builtin_punguza(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    Ok(Value::Str(args[0].to_string().trim().to_string()))
}

fn builtin_gawanya(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    let text = args[0].to_string();
    let separator = args[1].to_string();
    let parts: Vec<Value> = if separator.is_empty() {
        text.chars().map(|c| Value::Str(c.to_string())).collect()
    } else {
        text.split(separator.as_str()).map(Value::from).collect()
    };
    Ok(Value::from(parts))
}

fn builtin_unganisha(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    let items = expect_array(&args[0], "unganisha")?;
    let joined = items
        .borrow()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(&args[1].to_string());
    Ok(Value::Str(joined))
}

fn builtin_badilisha(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    let text = args[0].to_string();
    let from = args[1].to_string();
    if from.is_empty() {
        return Ok(Value::Str(text));
    }
    Ok(Value::Str(text.replace(&from, &args[2].to_string())))
}

fn builtin_ina(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    let found = match &args[0] {
        Value::Array(items) => items.borrow().iter().any(|item| equals(item, &args[1])),
        Value::Dict(entries) => entries.borrow().contains_key(&args[1].to_string()),
        other => other.to_string().contains(&args[1].to_string()),
    };
    Ok(Value::Bool(found))
}

fn builtin_sehemu(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    let chars: Vec<char> = args[0].to_string().chars().collect();
    let clamp = |value: &Value| value.to_number().as_i64().clamp(0, chars.len() as i64) as usize;
    let (start, end) = (clamp(&args[1]), clamp(&args[2]));
    if start >= end {
        return Ok(Value::Str(String::new()));
    }
    Ok(Value::Str(chars[start..end].iter().collect()))
}

//=============================================
// Section 6: Conversion, Randomness, Time
//=============================================

fn builtin_aina(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    Ok(Value::from(args[0].type_name()))
}

fn builtin_kwa_namba(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    Ok(args[0].to_number().into())
}

fn builtin_kwa_maneno(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    Ok(Value::Str(args[0].to_string()))
}

fn builtin_nasibu(_interp: &mut Interpreter, args: &[Value]) -> Flow {
    let a = args[0].to_number().as_i64();
    let b = args[1].to_number().as_i64();
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    Ok(Value::Int(rand::thread_rng().gen_range(low..=high)))
}

fn builtin_tarehe(_interp: &mut Interpreter, _args: &[Value]) -> Flow {
    let now = chrono::Local::now();
    Ok(Value::Str(now.format("%Y-%m-%d %H:%M:%S").to_string()))
}

//=============================================
// Section 7: Files
//=============================================

fn builtin_unda_faili(interp: &mut Interpreter, args: &[Value]) -> Flow {
    let path = args[0].to_string();
    Ok(Value::Bool(interp.fs.create(Path::new(&path)).is_ok()))
}

fn builtin_ondoa_faili(interp: &mut Interpreter, args: &[Value]) -> Flow {
    let path = args[0].to_string();
    Ok(Value::Bool(interp.fs.remove(Path::new(&path)).is_ok()))
}

fn builtin_faili_ipo(interp: &mut Interpreter, args: &[Value]) -> Flow {
    let path = args[0].to_string();
    Ok(Value::Bool(interp.fs.exists(Path::new(&path))))
}


//=============================================
// End of file
//=============================================
