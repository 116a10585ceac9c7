//=============================================
// kwenda/interpreter/mod.rs
//=============================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Kwenda tree-walking interpreter
// Objective: Evaluate parsed programs against shared scope frames, threading
//            break/continue/return/throw as explicit signals and delegating
//            console and file access to host collaborators
//=============================================

//=============================================
// Section 1: Imports
//=============================================

mod builtins;
mod classes;
mod stack;
pub mod errors;
pub mod ops;
pub mod value;

pub use builtins::NativeArity;
pub use errors::{ErrorCode, ScriptError};
pub use value::{Closure, ErrorValue, Flow, Number, Signal, Value};

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::ast::{FunctionDecl, Node};
use crate::config::KwendaConfig;
use crate::environment::{Env, Environment};
use crate::modules::{ModuleError, ModuleLoader, module_name, preprocess_imports};
use crate::parser::Parser;
use crate::runtime::{Console, FileSystem, StdConsole, StdFileSystem};
use crate::tokenizer::tokenize;
use builtins::NativeFunction;
use stack::ensure_sufficient_stack;
use value::parse_number;

/// Function run after the top-level forms have been registered.
pub const ENTRY_POINT: &str = "kuu";

//=============================================
// Section 2: Interpreter State
//=============================================

pub struct Interpreter {
    console: Box<dyn Console>,
    fs: Box<dyn FileSystem>,
    loader: ModuleLoader,
    base_dirs: Vec<PathBuf>,
    config: KwendaConfig,
    call_depth: usize,
    builtins: HashMap<&'static str, NativeFunction>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    //Function: new
    //Purpose: Interpreter with default settings bound to stdin/stdout and std::fs
    //Inputs: None
    //Returns: Self
    pub fn new() -> Self {
        Self::with_config(KwendaConfig::default())
    }

    pub fn with_config(config: KwendaConfig) -> Self {
        Self::with_host(config, Box::new(StdConsole), Box::new(StdFileSystem))
    }

    //Function: with_host
    //Purpose: Build an interpreter over injected console and filesystem collaborators
    //Inputs: config: KwendaConfig, console: Box<dyn Console>, fs: Box<dyn FileSystem>
    //Returns: Self
    pub fn with_host(
        config: KwendaConfig,
        console: Box<dyn Console>,
        fs: Box<dyn FileSystem>,
    ) -> Self {
        let mut interpreter = Self {
            console,
            fs,
            loader: ModuleLoader::new(config.module_paths.clone()),
            base_dirs: Vec::new(),
            config,
            call_depth: 0,
            builtins: HashMap::new(),
        };
        interpreter.init_builtins();
        interpreter
    }

    pub fn add_module_search_path(&mut self, path: impl Into<PathBuf>) {
        self.loader.add_search_path(path);
    }

    //=============================================
    // Section 3: Program Driver
    //=============================================

    /// Read and run a script file.
    pub fn run_file(&mut self, path: &Path) -> Result<Value, ScriptError> {
        let source = fs::read_to_string(path).map_err(|err| {
            ScriptError::new(
                ErrorCode::Io,
                format!("failed to read {}: {err}", path.display()),
            )
        })?;
        self.run_source(&source, Some(path))
    }

    //Function: run_source
    //Purpose: Load imports, register top-level forms, then run `kuu`
    //Inputs: &mut self, source: &str, origin: Option<&Path> (the script's path)
    //Returns: Result<Value, ScriptError> (the value returned by `kuu`)
    pub fn run_source(&mut self, source: &str, origin: Option<&Path>) -> Result<Value, ScriptError> {
        let base_dir = origin
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        self.base_dirs.push(base_dir);
        let result = self.run_main(source);
        self.base_dirs.pop();
        result
    }

    fn run_main(&mut self, source: &str) -> Result<Value, ScriptError> {
        let (stripped, imports) = preprocess_imports(source);
        let root = Environment::new_root();
        for import in &imports {
            self.import_module(import, &root)?;
        }

        let tokens = tokenize(&stripped);
        let program = Parser::new(tokens.clone()).parse();
        if !tokens.is_empty() && program.forms.is_empty() && program.imports.is_empty() && imports.is_empty() {
            return Err(ScriptError::new(
                ErrorCode::Syntax,
                "no top-level function, class or declaration found",
            ));
        }
        for import in &program.imports {
            if let Node::Import { module_path } = import {
                self.import_module(module_path, &root)?;
            }
        }

        debug!(forms = program.forms.len(), "registering top-level forms");
        if let Err(signal) = self.exec_block(&program.forms, &root) {
            self.report_escaped(signal);
            return Ok(Value::Nil);
        }

        let entry = root.borrow().get_function(ENTRY_POINT);
        let Some(entry) = entry else {
            warn!("program has no `{ENTRY_POINT}` function");
            return Ok(Value::Nil);
        };
        debug!("running `{ENTRY_POINT}`");
        let scope = Environment::child(&root);
        match self.invoke(&entry, Vec::new(), scope, None) {
            Ok(value) => Ok(value),
            Err(signal) => {
                self.report_escaped(signal);
                Ok(Value::Nil)
            }
        }
    }

    /// Program boundary: uncaught throws are rendered, other signals dropped.
    fn report_escaped(&mut self, signal: Signal) {
        if let Signal::Throw(error) = signal {
            let rule = "=".repeat(40);
            self.console.write_line(&rule);
            self.console.write_line(&format!("Hitilafu: {}", error.message));
            if let Some(context) = &error.context {
                self.console.write_line(&format!("Muktadha: {context}"));
            }
            self.console.write_line(&rule);
        }
    }

    //=============================================
    // Section 4: Modules
    //=============================================

    //Function: import_module
    //Purpose: Resolve, load once, and bind a module under its file stem
    //Inputs: &mut self, module_path: &str, into: &Env
    //Returns: Result<(), ModuleError>
    fn import_module(&mut self, module_path: &str, into: &Env) -> Result<(), ModuleError> {
        let base_dir = self.base_dirs.last().cloned();
        let path = self.loader.resolve(module_path, base_dir.as_deref())?;
        let module_env = match self.loader.begin(&path)? {
            Some(env) => env,
            None => match self.load_module(&path) {
                Ok(env) => {
                    self.loader.finish(&path, Rc::clone(&env));
                    env
                }
                Err(err) => {
                    self.loader.abandon(&path);
                    return Err(err);
                }
            },
        };
        into.borrow().set_module(module_name(&path), module_env);
        Ok(())
    }

    fn load_module(&mut self, path: &Path) -> Result<Env, ModuleError> {
        debug!(path = %path.display(), "loading module");
        let module = self.loader.read(path)?;
        let env = Environment::new_root();
        self.base_dirs.push(module.base_dir.clone());
        let result = self.init_module(&module.source, &module.imports, &env);
        self.base_dirs.pop();
        result.map(|_| env)
    }

    fn init_module(&mut self, source: &str, imports: &[String], env: &Env) -> Result<(), ModuleError> {
        for import in imports {
            self.import_module(import, env)?;
        }
        let program = Parser::new(tokenize(source)).parse();
        for import in &program.imports {
            if let Node::Import { module_path } = import {
                self.import_module(module_path, env)?;
            }
        }
        if let Err(signal) = self.exec_block(&program.forms, env) {
            self.report_escaped(signal);
        }
        Ok(())
    }

    //=============================================
    // Section 5: Statement Execution
    //=============================================

    /// Run statements in order; the first signal stops the block.
    pub fn exec_block(&mut self, nodes: &[Node], env: &Env) -> Flow {
        let mut last = Value::Nil;
        for node in nodes {
            last = self.eval(node, env)?;
        }
        Ok(last)
    }

    //Function: eval
    //Purpose: Evaluate one node; early exits come back as Err(Signal)
    //Inputs: &mut self, node: &Node, env: &Env
    //Returns: Flow
    pub fn eval(&mut self, node: &Node, env: &Env) -> Flow {
        ensure_sufficient_stack(|| self.eval_node(node, env))
    }

    fn eval_node(&mut self, node: &Node, env: &Env) -> Flow {
        match node {
            Node::Number(text) => Ok(number_literal(text)),
            Node::Boolean(b) => Ok(Value::Bool(*b)),
            Node::String(text) => Ok(Value::Str(text.clone())),
            Node::Identifier(name) => Ok(self.lookup(name, env)),
            Node::BinaryOp { left, op, right } => {
                let left = self.eval(left, env)?;
                let right = self.eval(right, env)?;
                match ops::binary(&left, op, &right) {
                    Some(value) => Ok(value),
                    None => {
                        warn!(op = %op, "unknown operator");
                        self.console
                            .write_line(&format!("Operesheni isiyojulikana: {op}"));
                        Ok(Value::Nil)
                    }
                }
            }
            Node::Return { value } => {
                let value = match value {
                    Some(node) => self.eval(node, env)?,
                    None => Value::Nil,
                };
                Err(Signal::Return(value))
            }
            Node::Input { prompt } => self.eval_input(prompt.as_deref(), env),
            Node::FunctionCall { name, args } => self.call_function(name, args, env),
            Node::VariableDeclaration { name, value } => {
                let value = self.eval(value, env)?;
                env.borrow_mut().set(name.as_str(), value);
                Ok(Value::Nil)
            }
            Node::StringVariableDeclaration { name, value } => {
                let value = match self.eval(value, env)? {
                    text @ Value::Str(_) => text,
                    other => Value::Str(other.to_string()),
                };
                env.borrow_mut().set(name.as_str(), value);
                Ok(Value::Nil)
            }
            Node::Function(decl) => {
                env.borrow().set_function(Rc::clone(decl));
                Ok(Value::Nil)
            }
            Node::If {
                condition,
                then_body,
                else_body,
            } => {
                if self.eval(condition, env)?.to_bool() {
                    self.exec_block(then_body, env)
                } else if let Some(else_body) = else_body {
                    self.exec_block(else_body, env)
                } else {
                    Ok(Value::Nil)
                }
            }
            Node::While { condition, body } => {
                while self.eval(condition, env)?.to_bool() {
                    match self.exec_block(body, env) {
                        Ok(_) | Err(Signal::Continue) => {}
                        Err(Signal::Break) => break,
                        Err(signal) => return Err(signal),
                    }
                }
                Ok(Value::Nil)
            }
            Node::For {
                init,
                condition,
                update,
                body,
            } => self.exec_for(init.as_deref(), condition.as_deref(), update.as_deref(), body, env),
            Node::Break => Err(Signal::Break),
            Node::Continue => Err(Signal::Continue),
            Node::Array { elements } => Ok(Value::from(self.eval_all(elements, env)?)),
            Node::ArrayDeclaration { name, elements, .. } => {
                let items = self.eval_all(elements, env)?;
                env.borrow_mut().set(name.as_str(), Value::from(items));
                Ok(Value::Nil)
            }
            Node::ArrayAccess { array, index } => {
                let container = self.eval(array, env)?;
                let index = self.eval(index, env)?;
                element_at(&container, &index, "orodha")
            }
            Node::ArrayAssignment {
                array,
                index,
                value,
            } => {
                let container = self.eval(array, env)?;
                let index = self.eval(index, env)?;
                let value = self.eval(value, env)?;
                store_at(&container, &index, value)
            }
            Node::FileRead { filename } => {
                let path = self.eval(filename, env)?.to_string();
                match self.fs.read(Path::new(&path)) {
                    Ok(text) => Ok(Value::Str(text)),
                    Err(err) => Err(Signal::throw_with(
                        format!("Imeshindwa kusoma faili: {path}"),
                        err.to_string(),
                    )),
                }
            }
            Node::FileWrite {
                filename,
                content,
                append,
            } => {
                let path = self.eval(filename, env)?.to_string();
                let content = self.eval(content, env)?.to_string();
                let written = self.fs.write(Path::new(&path), &content, *append);
                if let Err(err) = &written {
                    warn!(path = %path, error = %err, "file write failed");
                }
                Ok(Value::Bool(written.is_ok()))
            }
            Node::Try {
                try_body,
                catch_var,
                catch_body,
                finally_body,
            } => self.exec_try(
                try_body,
                catch_var.as_deref(),
                catch_body.as_deref(),
                finally_body.as_deref(),
                env,
            ),
            Node::Throw { message } => match self.eval(message, env)? {
                Value::Error(error) => Err(Signal::Throw(error)),
                other => Err(Signal::throw(other.to_string())),
            },
            Node::Import { module_path } => match self.import_module(module_path, env) {
                Ok(()) => Ok(Value::Nil),
                Err(err) => Err(Signal::throw_with(err.to_string(), module_path.clone())),
            },
            Node::Class(decl) => {
                self.define_class(decl, env);
                Ok(Value::Nil)
            }
            Node::NewInstance { class_name, args } => self.new_instance(class_name, args, env),
            Node::MemberAccess { object, member } => self.member_access(object, member, env),
            Node::MethodCall {
                object,
                method,
                args,
            } => self.method_call(object, method, args, env),
            Node::MemberAssignment {
                object,
                member,
                value,
            } => self.member_assignment(object, member, value, env),
            Node::This => Ok(env.borrow().get("hii").unwrap_or(Value::Nil)),
            Node::Dictionary { pairs } => Ok(Value::from(self.eval_pairs(pairs, env)?)),
            Node::DictionaryDeclaration { name, pairs } => {
                let entries = self.eval_pairs(pairs, env)?;
                env.borrow_mut().set(name.as_str(), Value::from(entries));
                Ok(Value::Nil)
            }
            Node::DictionaryAccess { dictionary, key } => {
                let container = self.eval(dictionary, env)?;
                let key = self.eval(key, env)?;
                element_at(&container, &key, "kamusi")
            }
            Node::DictionaryAssignment {
                dictionary,
                key,
                value,
            } => {
                let container = self.eval(dictionary, env)?;
                let key = self.eval(key, env)?;
                let value = self.eval(value, env)?;
                store_at(&container, &key, value)
            }
            Node::Lambda(decl) => Ok(Value::Function(Rc::new(Closure {
                decl: Rc::clone(decl),
                scope: Rc::clone(env),
            }))),
        }
    }

    fn eval_all(&mut self, nodes: &[Node], env: &Env) -> Flow<Vec<Value>> {
        nodes.iter().map(|node| self.eval(node, env)).collect()
    }

    fn eval_pairs(&mut self, pairs: &[(Node, Node)], env: &Env) -> Flow<BTreeMap<String, Value>> {
        let mut entries = BTreeMap::new();
        for (key, value) in pairs {
            let key = self.eval(key, env)?.to_string();
            let value = self.eval(value, env)?;
            entries.insert(key, value);
        }
        Ok(entries)
    }

    /// Variables first, then named functions as values, else the name itself.
    fn lookup(&self, name: &str, env: &Env) -> Value {
        let frame = env.borrow();
        if let Some(value) = frame.get(name) {
            return value;
        }
        if let Some(decl) = frame.get_function(name) {
            return Value::Function(Rc::new(Closure {
                decl,
                scope: Rc::clone(env),
            }));
        }
        Value::Str(name.to_string())
    }

    fn exec_for(
        &mut self,
        init: Option<&Node>,
        condition: Option<&Node>,
        update: Option<&Node>,
        body: &[Node],
        env: &Env,
    ) -> Flow {
        if let Some(init) = init {
            self.eval(init, env)?;
        }
        let Some(condition) = condition else {
            // No condition: the body runs exactly once.
            return match self.exec_block(body, env) {
                Ok(_) | Err(Signal::Break | Signal::Continue) => Ok(Value::Nil),
                Err(signal) => Err(signal),
            };
        };
        while self.eval(condition, env)?.to_bool() {
            match self.exec_block(body, env) {
                Ok(_) | Err(Signal::Continue) => {}
                Err(Signal::Break) => break,
                Err(signal) => return Err(signal),
            }
            if let Some(update) = update {
                self.eval(update, env)?;
            }
        }
        Ok(Value::Nil)
    }

    //Function: exec_try
    //Purpose: Run try/catch/finally; a signal out of `hatimaye` replaces the pending outcome
    //Inputs: bodies of each clause, the catch variable, env
    //Returns: Flow
    fn exec_try(
        &mut self,
        try_body: &[Node],
        catch_var: Option<&str>,
        catch_body: Option<&[Node]>,
        finally_body: Option<&[Node]>,
        env: &Env,
    ) -> Flow {
        let outcome = match (self.exec_block(try_body, env), catch_body) {
            (Err(Signal::Throw(error)), Some(catch_body)) => {
                trace!(message = %error.message, "caught");
                let scope = Environment::child(env);
                if let Some(var) = catch_var {
                    scope.borrow_mut().set(var, Value::Error(error));
                }
                self.exec_block(catch_body, &scope)
            }
            (outcome, _) => outcome,
        };
        if let Some(finally_body) = finally_body {
            self.exec_block(finally_body, env)?;
        }
        outcome
    }

    fn eval_input(&mut self, prompt: Option<&Node>, env: &Env) -> Flow {
        let prompt = match prompt {
            Some(node) => {
                let text = self.eval(node, env)?.to_string();
                if text.ends_with(char::is_whitespace) {
                    text
                } else {
                    format!("{text} ")
                }
            }
            None => self.config.input_prompt.clone(),
        };
        self.console.prompt(&prompt);
        let Some(line) = self.console.read_line() else {
            return Ok(Value::Str(String::new()));
        };
        let trimmed = line.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            return Ok(Value::Int(n));
        }
        if let Ok(x) = trimmed.parse::<f64>() {
            return Ok(Value::Float(x));
        }
        Ok(Value::Str(line))
    }

    //=============================================
    // Section 6: Calls
    //=============================================

    //Function: call_function
    //Purpose: Dispatch `name(args)`: user function, closure variable, then builtin
    //Inputs: &mut self, name: &str, args: &[Node], env: &Env
    //Returns: Flow
    fn call_function(&mut self, name: &str, args: &[Node], env: &Env) -> Flow {
        trace!(function = name, args = args.len(), "call");
        let declared = env.borrow().get_function(name);
        if let Some(decl) = declared {
            let values = self.eval_all(args, env)?;
            return self.invoke(&decl, values, Environment::child(env), None);
        }

        let variable = env.borrow().get(name);
        if let Some(Value::Function(closure)) = variable {
            let values = self.eval_all(args, env)?;
            return self.call_closure(&closure, values);
        }

        let native = self.builtins.get(name).copied();
        match native {
            Some(native) if native.arity.accepts(args.len()) => {
                let values = self.eval_all(args, env)?;
                (native.func)(self, &values)
            }
            Some(native) => {
                warn!(
                    function = name,
                    expected = %native.arity.describe(),
                    got = args.len(),
                    "builtin called with wrong arity"
                );
                self.unknown_function(name)
            }
            None => self.unknown_function(name),
        }
    }

    fn unknown_function(&mut self, name: &str) -> Flow {
        warn!(function = name, "unknown function");
        self.console.write_line(&format!("Kazi haijulikani: {name}"));
        Ok(Value::Nil)
    }

    /// Call a function value in a child of the frame it was created in.
    pub(crate) fn call_closure(&mut self, closure: &Closure, args: Vec<Value>) -> Flow {
        self.invoke(&closure.decl, args, Environment::child(&closure.scope), None)
    }

    //Function: invoke
    //Purpose: Bind parameters into `scope` and run a function body
    //Inputs: decl, positional args (missing ones stay unbound), scope, optional `hii`
    //Returns: Flow (Return unwrapped; stray Break/Continue discarded)
    fn invoke(
        &mut self,
        decl: &FunctionDecl,
        args: Vec<Value>,
        scope: Env,
        this: Option<Value>,
    ) -> Flow {
        if self.call_depth >= self.config.max_call_depth {
            return Err(Signal::throw_with(
                format!(
                    "Kina cha miito kimezidi kikomo cha {}",
                    self.config.max_call_depth
                ),
                decl.name.clone(),
            ));
        }
        {
            let mut frame = scope.borrow_mut();
            for (param, value) in decl.params.iter().zip(args) {
                frame.set(param.name.as_str(), value);
            }
            if let Some(this) = this {
                frame.set("hii", this);
            }
        }

        self.call_depth += 1;
        let result = self.exec_block(&decl.body, &scope);
        self.call_depth -= 1;

        match result {
            Ok(_) | Err(Signal::Break | Signal::Continue) => Ok(Value::Nil),
            Err(Signal::Return(value)) => Ok(value),
            Err(signal) => Err(signal),
        }
    }
}

//=============================================
// Section 7: Value Helpers
//=============================================

fn number_literal(text: &str) -> Value {
    match parse_number(text) {
        Some(number) => number.into(),
        None => text.parse::<f64>().map(Value::Float).unwrap_or(Value::Nil),
    }
}

/// Integer index from a numeric value; anything else throws.
fn index_of(index: &Value, op: &str) -> Flow<i64> {
    match index {
        Value::Int(n) => Ok(*n),
        Value::Float(x) if x.fract() == 0.0 => Ok(*x as i64),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| Signal::throw_with(format!("Kielelezo lazima kiwe namba, si '{s}'"), op)),
        other => Err(Signal::throw_with(
            format!("Kielelezo lazima kiwe namba, si '{other}'"),
            op,
        )),
    }
}

fn out_of_bounds(index: i64, len: usize, op: &str) -> Signal {
    Signal::throw_with(
        format!("Kielelezo {index} kiko nje ya mipaka (urefu {len})"),
        op,
    )
}

/// Checked position within a sequence of `len` elements.
fn position(index: &Value, len: usize, op: &str) -> Flow<usize> {
    let i = index_of(index, op)?;
    usize::try_from(i)
        .ok()
        .filter(|&p| p < len)
        .ok_or_else(|| out_of_bounds(i, len, op))
}

//Function: element_at
//Purpose: Read `container[index]` for arrays, strings and dictionaries
//Inputs: container: &Value, index: &Value, op: &str (named in error context)
//Returns: Flow (throws when out of bounds or the index is not numeric)
pub(crate) fn element_at(container: &Value, index: &Value, op: &str) -> Flow {
    match container {
        Value::Array(items) => {
            let items = items.borrow();
            let at = position(index, items.len(), op)?;
            Ok(items[at].clone())
        }
        Value::Str(text) => {
            let chars: Vec<char> = text.chars().collect();
            let at = position(index, chars.len(), op)?;
            Ok(Value::Str(chars[at].to_string()))
        }
        Value::Dict(entries) => Ok(entries
            .borrow()
            .get(&index.to_string())
            .cloned()
            .unwrap_or(Value::Nil)),
        other => Err(Signal::throw_with(
            format!("Haiwezi kusoma kielelezo cha {}", other.type_name()),
            op,
        )),
    }
}

/// Write `container[index] = value`; an array index equal to the length appends.
pub(crate) fn store_at(container: &Value, index: &Value, value: Value) -> Flow {
    match container {
        Value::Array(items) => {
            // The index may render the array itself, so resolve it before borrowing.
            let i = index_of(index, "orodha")?;
            let mut items = items.borrow_mut();
            let len = items.len();
            match usize::try_from(i) {
                Ok(at) if at < len => items[at] = value,
                Ok(at) if at == len => items.push(value),
                _ => return Err(out_of_bounds(i, len, "orodha")),
            }
            Ok(Value::Nil)
        }
        Value::Dict(entries) => {
            let key = index.to_string();
            entries.borrow_mut().insert(key, value);
            Ok(Value::Nil)
        }
        other => Err(Signal::throw_with(
            format!("Haiwezi kuweka kielelezo kwenye {}", other.type_name()),
            index.to_string(),
        )),
    }
}


//=============================================
// End of file
//=============================================
