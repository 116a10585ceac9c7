//=====================================================
// File: main.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Kwenda CLI entry point
// Objective: Command-line interface for running .swh scripts, with token and
//            AST dumps, extra module search paths and env-driven logging
//=====================================================

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use kwenda::config::KwendaConfig;
use kwenda::interpreter::{ErrorCode, Interpreter, ScriptError};
use kwenda::parser::Parser as AstParser;
use kwenda::tokenizer::tokenize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter.
const LOG_ENV: &str = "KWENDA_LOG";

/// Deep recursion in scripts maps onto the host stack.
const INTERPRETER_STACK: usize = 64 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "kwenda", about = "Kwenda script interpreter")]
pub struct Args {
    /// Path to the .swh script to execute.
    pub script: PathBuf,

    /// Print the token stream as JSON before execution.
    #[arg(long = "print-tokens")]
    pub print_tokens: bool,

    /// Print the parsed program before execution.
    #[arg(long = "print-ast")]
    pub print_ast: bool,

    /// Extra directory searched for `leta` imports (repeatable).
    #[arg(long = "module-path", value_name = "DIR")]
    pub module_paths: Vec<PathBuf>,
}

fn main() -> Result<()> {
    install_tracing();
    let args = Args::parse();

    let source = fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read {}", args.script.display()))?;
    let script_dir = args
        .script
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut config = KwendaConfig::load_from_dir(&script_dir)
        .map_err(ScriptError::from)?
        .with_env_paths();
    // Command-line directories are searched before configured ones.
    let mut module_paths = args.module_paths.clone();
    module_paths.append(&mut config.module_paths);
    config.module_paths = module_paths;

    if args.print_tokens {
        let tokens = tokenize(&source);
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    }
    if args.print_ast {
        let program = AstParser::new(tokenize(&source)).parse();
        println!("{program}");
    }

    debug!(script = %args.script.display(), "starting interpreter");
    let script = args.script.clone();
    let worker = thread::Builder::new()
        .name("kwenda-main".into())
        .stack_size(INTERPRETER_STACK)
        .spawn(move || {
            let mut interpreter = Interpreter::with_config(config);
            interpreter.run_source(&source, Some(&script)).map(|_| ())
        })
        .context("failed to spawn interpreter thread")?;

    let outcome = worker.join().unwrap_or_else(|_| {
        Err(ScriptError::new(
            ErrorCode::RuntimePanic,
            "interpreter thread panicked",
        ))
    });
    outcome.map_err(|err| anyhow!(err))
}

fn install_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

//=====================================================
// End of file
//=====================================================
