//=====================================================
// File: environment/mod.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Kwenda lexical scope frames
// Objective: Provide per-frame variable maps chained to their parent, with the
//            function, class and module tables shared by every frame that
//            descends from one root
//=====================================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{ClassDecl, FunctionDecl};
use crate::interpreter::value::Value;

/// Shared handle to a scope frame.
pub type Env = Rc<RefCell<Environment>>;

/// A registered class with its parent already resolved.
#[derive(Debug)]
pub struct ClassDef {
    pub decl: Rc<ClassDecl>,
    pub parent: Option<Rc<ClassDef>>,
}

impl ClassDef {
    /// Walk this class and its ancestors, nearest first.
    pub fn lineage(self: &Rc<Self>) -> Vec<Rc<ClassDef>> {
        let mut chain = vec![Rc::clone(self)];
        let mut current = self.parent.clone();
        while let Some(class) = current {
            current = class.parent.clone();
            chain.push(class);
        }
        chain
    }

    pub fn find_method(self: &Rc<Self>, name: &str) -> Option<Rc<FunctionDecl>> {
        self.lineage()
            .iter()
            .find_map(|class| class.decl.methods.iter().find(|m| m.name == name).cloned())
    }

    pub fn find_constructor(self: &Rc<Self>) -> Option<Rc<FunctionDecl>> {
        self.lineage()
            .iter()
            .find_map(|class| class.decl.constructor.clone())
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }
}

type Table<T> = Rc<RefCell<HashMap<String, T>>>;

/// One scope frame.
///
/// `parent` is an owning handle: closures keep their defining frame alive
/// through it, so a frame can outlive the call that created it.
#[derive(Debug, Default)]
pub struct Environment {
    variables: HashMap<String, Value>,
    functions: Table<Rc<FunctionDecl>>,
    classes: Table<Rc<ClassDef>>,
    modules: Table<Env>,
    parent: Option<Env>,
}

impl Environment {
    //Function: new_root
    //Purpose: Create a fresh root frame with empty shared tables
    //Inputs: None
    //Returns: Env
    pub fn new_root() -> Env {
        Rc::new(RefCell::new(Environment::default()))
    }

    //Function: child
    //Purpose: Create an empty frame that shares `parent`'s tables
    //Inputs: parent: &Env
    //Returns: Env
    pub fn child(parent: &Env) -> Env {
        let frame = parent.borrow();
        Rc::new(RefCell::new(Environment {
            variables: HashMap::new(),
            functions: Rc::clone(&frame.functions),
            classes: Rc::clone(&frame.classes),
            modules: Rc::clone(&frame.modules),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Look a variable up through the parent chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.variables.get(name) {
            return Some(value.clone());
        }
        let mut current = self.parent.clone();
        while let Some(frame) = current {
            let frame = frame.borrow();
            if let Some(value) = frame.variables.get(name) {
                return Some(value.clone());
            }
            current = frame.parent.clone();
        }
        None
    }

    /// Bind in this frame only; an existing binding here is overwritten.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn get_function(&self, name: &str) -> Option<Rc<FunctionDecl>> {
        self.functions.borrow().get(name).cloned()
    }

    pub fn set_function(&self, decl: Rc<FunctionDecl>) {
        self.functions.borrow_mut().insert(decl.name.clone(), decl);
    }

    pub fn get_class(&self, name: &str) -> Option<Rc<ClassDef>> {
        self.classes.borrow().get(name).cloned()
    }

    pub fn set_class(&self, class: Rc<ClassDef>) {
        self.classes
            .borrow_mut()
            .insert(class.name().to_string(), class);
    }

    pub fn get_module(&self, name: &str) -> Option<Env> {
        self.modules.borrow().get(name).cloned()
    }

    pub fn set_module(&self, name: impl Into<String>, module: Env) {
        self.modules.borrow_mut().insert(name.into(), module);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;

    fn decl(name: &str) -> Rc<FunctionDecl> {
        Rc::new(FunctionDecl {
            name: name.into(),
            params: vec![],
            return_type: None,
            body: vec![Node::Break],
        })
    }

    #[test]
    fn lookup_walks_parents_but_set_stays_local() {
        let root = Environment::new_root();
        root.borrow_mut().set("x", Value::Int(1));
        let child = Environment::child(&root);
        assert_eq!(child.borrow().get("x"), Some(Value::Int(1)));

        child.borrow_mut().set("x", Value::Int(2));
        assert_eq!(child.borrow().get("x"), Some(Value::Int(2)));
        assert_eq!(root.borrow().get("x"), Some(Value::Int(1)));
        assert_eq!(root.borrow().get("missing"), None);
    }

    #[test]
    fn redeclaring_overwrites() {
        let root = Environment::new_root();
        root.borrow_mut().set("x", Value::Int(5));
        root.borrow_mut().set("x", Value::Str("tano".into()));
        assert_eq!(root.borrow().get("x"), Some(Value::Str("tano".into())));
    }

    #[test]
    fn function_table_is_shared_by_descendants() {
        let root = Environment::new_root();
        let child = Environment::child(&root);
        let grandchild = Environment::child(&child);
        grandchild.borrow().set_function(decl("salimu"));
        assert!(root.borrow().get_function("salimu").is_some());
        assert!(child.borrow().get_function("salimu").is_some());
    }

    #[test]
    fn separate_roots_do_not_share() {
        let a = Environment::new_root();
        let b = Environment::new_root();
        a.borrow().set_function(decl("f"));
        a.borrow().set_module("m", Environment::new_root());
        assert!(b.borrow().get_function("f").is_none());
        assert!(b.borrow().get_module("m").is_none());
    }
}

//=====================================================
// End of file
//=====================================================
