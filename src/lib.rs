//=====================================================
// File: lib.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Kwenda library root
// Objective: Expose the lexer, parser, scope frames, interpreter and module
//            loader for the Swahili-keyword scripting language
//=====================================================

pub mod ast;
pub mod config;
pub mod environment;
pub mod interpreter;
pub mod modules;
pub mod parser;
pub mod runtime;
pub mod tokenizer;

pub use config::KwendaConfig;
pub use interpreter::{ErrorCode, Interpreter, ScriptError, Value};

//=====================================================
// End of file
//=====================================================
