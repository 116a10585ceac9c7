//==============================================
// File: src/tests/util.rs
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Shared harness for integration tests
// Objective: Run Kwenda source against an in-memory console and hand back
//            what the program printed
//==============================================

#![allow(dead_code)]

use std::path::Path;

use kwenda::config::KwendaConfig;
use kwenda::interpreter::{Interpreter, ScriptError, Value};
use kwenda::runtime::{BufferedConsole, StdFileSystem};

/// Interpreter writing to `console`, reading files through std::fs.
pub fn interpreter_with(console: &BufferedConsole) -> Interpreter {
    Interpreter::with_host(
        KwendaConfig::default(),
        Box::new(console.clone()),
        Box::new(StdFileSystem),
    )
}

/// Run a program and return everything it printed.
pub fn run_kwenda_source(source: &str) -> String {
    let console = BufferedConsole::new();
    interpreter_with(&console)
        .run_source(source, None)
        .expect("program should run");
    console.output()
}

/// Run a program with scripted console input.
pub fn run_with_input(source: &str, input: &[&str]) -> String {
    let console = BufferedConsole::with_input(input.iter().copied());
    interpreter_with(&console)
        .run_source(source, None)
        .expect("program should run");
    console.output()
}

/// Run a program and return the value produced by `kuu` alongside the output.
pub fn run_for_value(source: &str) -> (Value, String) {
    let console = BufferedConsole::new();
    let value = interpreter_with(&console)
        .run_source(source, None)
        .expect("program should run");
    (value, console.output())
}

/// Run a script file, keeping driver errors for the caller to inspect.
pub fn run_kwenda_file(path: &Path) -> (Result<Value, ScriptError>, String) {
    let console = BufferedConsole::new();
    let result = interpreter_with(&console).run_file(path);
    (result, console.output())
}

/// Output split into lines.
pub fn lines(output: &str) -> Vec<&str> {
    output.lines().collect()
}

//==============================================
// End of file
//==============================================
