//=============================================
// kwenda/interpreter/ops.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Binary operator semantics
// Objective: Apply arithmetic, comparison and logical operators over coerced
//            values, including the silent zero on division by zero
//=============================================

use super::value::{Number, Value};

//Function: binary
//Purpose: Evaluate `left op right` on already-evaluated operands
//Inputs: left: &Value, op: &str, right: &Value
//Returns: Option<Value> (None for an operator the language does not define)
pub fn binary(left: &Value, op: &str, right: &Value) -> Option<Value> {
    let value = match op {
        "+" if left.is_string_like() || right.is_string_like() => {
            Value::Str(format!("{left}{right}"))
        }
        "+" | "-" | "*" => arithmetic(left.to_number(), op, right.to_number()),
        "/" => divide(left.to_number(), right.to_number()),
        "==" => Value::Bool(equals(left, right)),
        "!=" => Value::Bool(!equals(left, right)),
        "<" | "<=" | ">" | ">=" => Value::Bool(compare(left.to_number(), op, right.to_number())),
        "na" => Value::Bool(left.to_bool() && right.to_bool()),
        "au" => Value::Bool(left.to_bool() || right.to_bool()),
        _ => return None,
    };
    Some(value)
}

fn arithmetic(a: Number, op: &str, b: Number) -> Value {
    if a.is_float() || b.is_float() {
        let (x, y) = (a.as_f64(), b.as_f64());
        return Value::Float(match op {
            "+" => x + y,
            "-" => x - y,
            _ => x * y,
        });
    }
    let (x, y) = (a.as_i64(), b.as_i64());
    Value::Int(match op {
        "+" => x.wrapping_add(y),
        "-" => x.wrapping_sub(y),
        _ => x.wrapping_mul(y),
    })
}

/// Truncating integer division unless either side is a float; zero divisors give 0.
fn divide(a: Number, b: Number) -> Value {
    if b.is_zero() {
        return Value::Int(0);
    }
    if a.is_float() || b.is_float() {
        Value::Float(a.as_f64() / b.as_f64())
    } else {
        Value::Int(a.as_i64().wrapping_div(b.as_i64()))
    }
}

pub fn equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => match (left.as_str(), right.as_str()) {
            (Some(a), Some(b)) => a == b,
            _ => numeric_eq(left.to_number(), right.to_number()),
        },
    }
}

fn numeric_eq(a: Number, b: Number) -> bool {
    if a.is_float() || b.is_float() {
        a.as_f64() == b.as_f64()
    } else {
        a.as_i64() == b.as_i64()
    }
}

fn compare(a: Number, op: &str, b: Number) -> bool {
    let ordering = if a.is_float() || b.is_float() {
        a.as_f64().partial_cmp(&b.as_f64())
    } else {
        Some(a.as_i64().cmp(&b.as_i64()))
    };
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        "<" => ordering.is_lt(),
        "<=" => ordering.is_le(),
        ">" => ordering.is_gt(),
        _ => ordering.is_ge(),
    }
}


//=============================================
// End of file
//=============================================
