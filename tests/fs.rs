//==============================================
// File: tests/fs.rs
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: File built-ins against a real directory
// Objective: Write, append, read, create, probe and remove files, and the
//            throw-versus-false failure split between reads and writes
//==============================================

#[path = "../src/tests/util.rs"]
mod util;

use std::fs;

use tempfile::tempdir;
use util::{lines, run_kwenda_source};

#[test]
fn write_append_read_and_remove() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("data.txt");
    let script = format!(
        r#"
kazi kuu() {{
    maneno njia = "{}"
    andika(andika_faili(njia, "habari"))
    ongeza_faili(njia, " dunia")
    andika(soma_faili(njia))
    andika(faili_ipo(njia))
    andika(ondoa_faili(njia))
    andika(faili_ipo(njia))
}}
"#,
        path.display()
    );

    let output = run_kwenda_source(&script);
    assert_eq!(
        lines(&output),
        vec!["kweli", "habari dunia", "kweli", "kweli", "uwongo"]
    );
    assert!(!path.exists());
}

#[test]
fn create_makes_an_empty_file() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("tupu.txt");
    let script = format!(
        "kazi kuu() {{\n    andika(unda_faili(\"{}\"))\n}}\n",
        path.display()
    );

    let output = run_kwenda_source(&script);
    assert_eq!(lines(&output), vec!["kweli"]);
    assert_eq!(fs::read_to_string(&path).expect("created file"), "");
}

#[test]
fn read_failure_throws_but_write_failure_returns_false() {
    let dir = tempdir().expect("create temp dir");
    let missing = dir.path().join("haipo.txt");
    let unwritable = dir.path().join("hakuna").join("faili.txt");
    let script = format!(
        r#"
kazi kuu() {{
    jaribu {{
        soma_faili("{}")
    }} shika (e) {{
        andika(e.ujumbe)
    }}
    andika(andika_faili("{}", "x"))
    andika(ondoa_faili("{}"))
}}
"#,
        missing.display(),
        unwritable.display(),
        missing.display()
    );

    let output = run_kwenda_source(&script);
    assert_eq!(
        lines(&output),
        vec![
            format!("Imeshindwa kusoma faili: {}", missing.display()),
            "uwongo".to_string(),
            "uwongo".to_string(),
        ]
    );
}

//==============================================
// End of file
//==============================================
