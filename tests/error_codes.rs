//==============================================
// File: tests/error_codes.rs
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Driver error classification
// Objective: Each failure that stops a program before or around evaluation
//            maps onto its stable error code
//==============================================

#[path = "../src/tests/util.rs"]
mod util;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use kwenda::config::KwendaConfig;
use kwenda::interpreter::{ErrorCode, ScriptError};
use kwenda::modules::ModuleError;
use kwenda::runtime::BufferedConsole;
use tempfile::tempdir;
use util::{interpreter_with, run_kwenda_file};

#[test]
fn source_without_forms_uses_e001() {
    let console = BufferedConsole::new();
    let err = interpreter_with(&console)
        .run_source("andika(\"hakuna kazi\")", None)
        .expect_err("no top-level forms");
    assert_eq!(err.code_str(), "E001");
    assert!(err.to_string().starts_with("[E001]"));
}

#[test]
fn empty_source_is_not_an_error() {
    let console = BufferedConsole::new();
    let value = interpreter_with(&console)
        .run_source("# maoni tu\n", None)
        .expect("empty program runs");
    assert_eq!(value, kwenda::Value::Nil);
}

#[test]
fn missing_module_uses_e002() {
    let dir = tempdir().expect("create temp dir");
    let main = dir.path().join("main.swh");
    fs::write(&main, "leta \"haipo_kabisa\"\nkazi kuu() { }\n").expect("write script");

    let (result, _) = run_kwenda_file(&main);
    let err = result.expect_err("module is missing");
    assert_eq!(err.code, ErrorCode::ModuleResolution);
    assert!(err.message.contains("haipo_kabisa"));
}

#[test]
fn cyclic_import_uses_e002() {
    let dir = tempdir().expect("create temp dir");
    fs::write(dir.path().join("a.swh"), "leta \"b\"\nkazi a() { rudisha 1 }\n").expect("write a");
    fs::write(dir.path().join("b.swh"), "leta \"a\"\nkazi b() { rudisha 2 }\n").expect("write b");
    let main = dir.path().join("main.swh");
    fs::write(&main, "leta \"a\"\nkazi kuu() { }\n").expect("write script");

    let (result, _) = run_kwenda_file(&main);
    let err = result.expect_err("cycle is rejected");
    assert_eq!(err.code_str(), "E002");
    assert!(err.message.contains("cyclic"), "got {}", err.message);
}

#[test]
fn unreadable_script_uses_e003() {
    let (result, _) = run_kwenda_file(Path::new("/hakuna/kabisa/main.swh"));
    assert_eq!(result.expect_err("missing script").code_str(), "E003");

    let err: ScriptError = ModuleError::Io {
        path: PathBuf::from("moduli.swh"),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    }
    .into();
    assert_eq!(err.code_str(), "E003");
}

#[test]
fn invalid_config_uses_e004() {
    let err = KwendaConfig::from_toml("max_call_depth = \"nyingi\"", Path::new("kwenda.toml"))
        .expect_err("type mismatch");
    let err: ScriptError = err.into();
    assert_eq!(err.code_str(), "E004");
}

#[test]
fn runtime_panic_code_is_stable() {
    let err = ScriptError::new(ErrorCode::RuntimePanic, "interpreter thread panicked");
    assert_eq!(err.to_string(), "[E005] interpreter thread panicked");
}

//==============================================
// End of file
//==============================================
