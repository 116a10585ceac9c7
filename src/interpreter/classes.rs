//=============================================
// kwenda/interpreter/classes.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Classes, instances and dotted access
// Objective: Register classes, build instances ancestor-first, and resolve
//            `a.b` / `a.b(...)` against instances, modules, errors and containers
//=============================================

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::warn;

use super::value::{Closure, Flow, Instance, Signal, Value};
use super::Interpreter;
use crate::ast::{ClassDecl, Node};
use crate::environment::{ClassDef, Env, Environment};

/// Zero value for a declared property type.
fn zero_value(ty: &str) -> Value {
    match ty {
        "namba" => Value::Int(0),
        "maneno" => Value::Str(String::new()),
        "buliani" => Value::Bool(false),
        "kamusi" => Value::from(BTreeMap::<String, Value>::new()),
        ty if ty == "orodha" || ty.ends_with("[]") => Value::from(Vec::<Value>::new()),
        _ => Value::Nil,
    }
}

impl Interpreter {
    //Function: define_class
    //Purpose: Register a class, resolving its parent from the shared class table
    //Inputs: &mut self, decl: &Rc<ClassDecl>, env: &Env
    //Returns: ()
    pub(super) fn define_class(&mut self, decl: &Rc<ClassDecl>, env: &Env) {
        let parent = match &decl.parent {
            Some(name) => {
                let parent = env.borrow().get_class(name);
                if parent.is_none() {
                    warn!(class = %decl.name, parent = %name, "unknown parent class");
                    self.console
                        .write_line(&format!("Darasa mzazi halijulikani: {name}"));
                }
                parent
            }
            None => None,
        };
        env.borrow().set_class(Rc::new(ClassDef {
            decl: Rc::clone(decl),
            parent,
        }));
    }

    //Function: new_instance
    //Purpose: Evaluate `unda Jina(args)`: properties ancestor-first, then the nearest constructor
    //Inputs: &mut self, class_name: &str, args: &[Node], env: &Env
    //Returns: Flow (the instance)
    pub(super) fn new_instance(&mut self, class_name: &str, args: &[Node], env: &Env) -> Flow {
        let class = env.borrow().get_class(class_name);
        let Some(class) = class else {
            warn!(class = class_name, "unknown class");
            self.console
                .write_line(&format!("Darasa halijulikani: {class_name}"));
            return Ok(Value::Nil);
        };

        let mut properties = BTreeMap::new();
        for ancestor in class.lineage().iter().rev() {
            for property in &ancestor.decl.properties {
                let value = match &property.default {
                    Some(default) => self.eval(default, env)?,
                    None => zero_value(&property.ty),
                };
                properties.insert(property.name.clone(), value);
            }
        }
        let instance = Value::Instance(Rc::new(RefCell::new(Instance {
            class: Rc::clone(&class),
            properties,
        })));

        if let Some(constructor) = class.find_constructor() {
            let values = self.eval_all(args, env)?;
            self.invoke(
                &constructor,
                values,
                Environment::child(env),
                Some(instance.clone()),
            )?;
        }
        Ok(instance)
    }

    /// Module bound under `name`, unless a variable of that name shadows it.
    fn module_named(&self, object: &Node, env: &Env) -> Option<Env> {
        let Node::Identifier(name) = object else {
            return None;
        };
        let frame = env.borrow();
        if frame.get(name).is_some() {
            return None;
        }
        frame.get_module(name)
    }

    //Function: member_access
    //Purpose: Resolve `object.member` for modules, instances, errors and containers
    //Inputs: &mut self, object: &Node, member: &str, env: &Env
    //Returns: Flow (the dotted text when nothing matches)
    pub(super) fn member_access(&mut self, object: &Node, member: &str, env: &Env) -> Flow {
        if let Some(module) = self.module_named(object, env) {
            let frame = module.borrow();
            if let Some(value) = frame.get(member) {
                return Ok(value);
            }
            if let Some(decl) = frame.get_function(member) {
                return Ok(Value::Function(Rc::new(Closure {
                    decl,
                    scope: Rc::clone(&module),
                })));
            }
            return Ok(Value::Str(format!("{object}.{member}")));
        }

        let value = self.eval(object, env)?;
        let resolved = match (&value, member) {
            (Value::Instance(instance), _) => Some(
                instance
                    .borrow()
                    .properties
                    .get(member)
                    .cloned()
                    .unwrap_or(Value::Nil),
            ),
            (Value::Error(error), "ujumbe") => Some(Value::Str(error.message.clone())),
            (Value::Error(error), "muktadha") => {
                Some(error.context.clone().map(Value::Str).unwrap_or(Value::Nil))
            }
            (Value::Array(items), "urefu") => Some(Value::Int(items.borrow().len() as i64)),
            (Value::Str(text), "urefu") => Some(Value::Int(text.chars().count() as i64)),
            (Value::Dict(entries), "urefu") if !entries.borrow().contains_key("urefu") => {
                Some(Value::Int(entries.borrow().len() as i64))
            }
            (Value::Dict(entries), _) => {
                Some(entries.borrow().get(member).cloned().unwrap_or(Value::Nil))
            }
            _ => None,
        };
        Ok(resolved.unwrap_or_else(|| Value::Str(format!("{object}.{member}"))))
    }

    //Function: method_call
    //Purpose: Dispatch `object.method(args)` to a module function or an instance method
    //Inputs: &mut self, object: &Node, method: &str, args: &[Node], env: &Env
    //Returns: Flow
    pub(super) fn method_call(
        &mut self,
        object: &Node,
        method: &str,
        args: &[Node],
        env: &Env,
    ) -> Flow {
        if let Some(module) = self.module_named(object, env) {
            let decl = module.borrow().get_function(method);
            if let Some(decl) = decl {
                let values = self.eval_all(args, env)?;
                // Module functions run in a child of the module's own frame.
                return self.invoke(&decl, values, Environment::child(&module), None);
            }
            let variable = module.borrow().get(method);
            if let Some(Value::Function(closure)) = variable {
                let values = self.eval_all(args, env)?;
                return self.call_closure(&closure, values);
            }
            return self.unknown_function(&format!("{object}.{method}"));
        }

        let receiver = self.eval(object, env)?;
        match &receiver {
            Value::Instance(instance) => {
                let class = Rc::clone(&instance.borrow().class);
                let Some(decl) = class.find_method(method) else {
                    warn!(class = class.name(), method, "unknown method");
                    self.console
                        .write_line(&format!("Njia haijulikani: {}.{method}", class.name()));
                    return Ok(Value::Nil);
                };
                let values = self.eval_all(args, env)?;
                self.invoke(&decl, values, Environment::child(env), Some(receiver.clone()))
            }
            Value::Dict(entries) => {
                let entry = entries.borrow().get(method).cloned();
                match entry {
                    Some(Value::Function(closure)) => {
                        let values = self.eval_all(args, env)?;
                        self.call_closure(&closure, values)
                    }
                    _ => self.unknown_function(&format!("{object}.{method}")),
                }
            }
            _ => self.unknown_function(&format!("{object}.{method}")),
        }
    }

    /// `object.member = value` on instances (creating the property) and dictionaries.
    pub(super) fn member_assignment(
        &mut self,
        object: &Node,
        member: &str,
        value: &Node,
        env: &Env,
    ) -> Flow {
        let value = self.eval(value, env)?;
        match self.eval(object, env)? {
            Value::Instance(instance) => {
                instance
                    .borrow_mut()
                    .properties
                    .insert(member.to_string(), value);
                Ok(Value::Nil)
            }
            Value::Dict(entries) => {
                entries.borrow_mut().insert(member.to_string(), value);
                Ok(Value::Nil)
            }
            other => Err(Signal::throw_with(
                format!("Haiwezi kuweka sifa '{member}' kwenye {}", other.type_name()),
                format!("{object}.{member}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_zero_values() {
        assert_eq!(zero_value("namba"), Value::Int(0));
        assert_eq!(zero_value("maneno"), Value::from(""));
        assert_eq!(zero_value("namba[]").to_string(), "[]");
        assert_eq!(zero_value("kamusi").to_string(), "{}");
        assert_eq!(zero_value("Mtu"), Value::Nil);
    }
}

//=============================================
// End of file
//=============================================
