//==============================================
// File: tests/control_flow.rs
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Control-flow signal coverage
// Objective: Loops, break/continue, conditionals, try/catch/finally and the
//            framed report for throws that escape `kuu`
//==============================================

#[path = "../src/tests/util.rs"]
mod util;

use kwenda::config::KwendaConfig;
use kwenda::interpreter::{Interpreter, Value};
use kwenda::runtime::{BufferedConsole, StdFileSystem};
use util::{lines, run_for_value, run_kwenda_source};

fn frame() -> String {
    "=".repeat(40)
}

#[test]
fn for_loop_counts_up() {
    let output = run_kwenda_source(
        r#"
kazi kuu() {
    kwa i = 0; i < 3; i = i + 1 {
        andika(i)
    }
}
"#,
    );
    assert_eq!(lines(&output), vec!["0", "1", "2"]);
}

#[test]
fn break_stops_the_loop_before_printing() {
    let output = run_kwenda_source(
        r#"
kazi kuu() {
    kwa i = 0; i < 3; i = i + 1 {
        kama i == 1 {
            vunja
        }
        andika(i)
    }
}
"#,
    );
    assert_eq!(lines(&output), vec!["0"]);
}

#[test]
fn continue_still_runs_the_update() {
    let output = run_kwenda_source(
        r#"
kazi kuu() {
    kwa (i = 0; i < 4; i = i + 1) {
        kama i == 2 { endelea }
        andika(i)
    }
}
"#,
    );
    assert_eq!(lines(&output), vec!["0", "1", "3"]);
}

#[test]
fn while_loop_counts_down() {
    let output = run_kwenda_source(
        r#"
kazi kuu() {
    namba n = 3
    wakati n > 0 {
        andika(n)
        n = n - 1
    }
}
"#,
    );
    assert_eq!(lines(&output), vec!["3", "2", "1"]);
}

#[test]
fn conditional_chain_picks_one_branch() {
    let output = run_kwenda_source(
        r#"
kazi daraja(alama) {
    kama alama >= 80 {
        rudisha "A"
    } sivyo kama alama >= 50 {
        rudisha "B"
    } sivyo {
        rudisha "C"
    }
}

kazi kuu() {
    andika(daraja(90))
    andika(daraja(65))
    andika(daraja(10))
}
"#,
    );
    assert_eq!(lines(&output), vec!["A", "B", "C"]);
}

#[test]
fn return_leaves_nested_loops() {
    let (value, _) = run_for_value(
        r#"
kazi tafuta() {
    wakati kweli {
        kwa i = 0; i < 10; i = i + 1 {
            kama i == 4 {
                rudisha i
            }
        }
    }
}

kazi kuu() {
    rudisha tafuta()
}
"#,
    );
    assert_eq!(value, Value::Int(4));
}

#[test]
fn caught_throw_becomes_an_error_value() {
    let (value, output) = run_for_value(
        r#"
kazi kuu() {
    jaribu {
        tupa "X"
    } shika (e) {
        rudisha e
    }
}
"#,
    );
    match &value {
        Value::Error(error) => assert_eq!(error.message, "X"),
        other => panic!("expected an error value, found {other:?}"),
    }
    assert!(output.is_empty(), "caught throws print nothing, got {output}");
}

#[test]
fn uncaught_throw_is_framed_and_unwinds_kuu() {
    let output = run_kwenda_source(
        r#"
kazi kuu() {
    tupa "boom"
    andika("baadaye")
}
"#,
    );
    let rule = frame();
    assert_eq!(
        lines(&output),
        vec![rule.as_str(), "Hitilafu: boom", rule.as_str()]
    );
}

#[test]
fn finally_runs_after_the_handler() {
    let output = run_kwenda_source(
        r#"
kazi kuu() {
    jaribu {
        tupa "a"
    } shika (e) {
        andika("imeshikwa " + e)
    } hatimaye {
        andika("mwisho")
    }
    jaribu {
        andika("salama")
    } hatimaye {
        andika("mwisho tena")
    }
}
"#,
    );
    assert_eq!(
        lines(&output),
        vec!["imeshikwa a", "mwisho", "salama", "mwisho tena"]
    );
}

#[test]
fn builtin_failures_carry_message_and_context() {
    let output = run_kwenda_source(
        r#"
kazi kuu() {
    orodha a = [1, 2]
    jaribu {
        pata(a, 5)
    } shika (e) {
        andika(e.ujumbe)
        andika(e.muktadha)
    }
}
"#,
    );
    assert_eq!(
        lines(&output),
        vec!["Kielelezo 5 kiko nje ya mipaka (urefu 2)", "pata"]
    );
}

#[test]
fn throws_cross_function_boundaries() {
    let output = run_kwenda_source(
        r#"
kazi hatari(n) {
    kama n > 2 {
        tupa "kubwa mno"
    }
    rudisha n
}

kazi kuu() {
    jaribu {
        andika(hatari(1))
        andika(hatari(3))
        andika("haifikiwi")
    } shika (e) {
        andika("kosa: " + e)
    }
}
"#,
    );
    assert_eq!(lines(&output), vec!["1", "kosa: kubwa mno"]);
}

#[test]
fn call_depth_limit_is_catchable() {
    let console = BufferedConsole::new();
    let config = KwendaConfig {
        max_call_depth: 20,
        ..KwendaConfig::default()
    };
    let mut interpreter =
        Interpreter::with_host(config, Box::new(console.clone()), Box::new(StdFileSystem));
    interpreter
        .run_source(
            r#"
kazi milele(n) {
    rudisha milele(n + 1)
}

kazi kuu() {
    jaribu {
        milele(0)
    } shika (e) {
        andika(e.ujumbe)
        andika(e.muktadha)
    }
}
"#,
            None,
        )
        .expect("program runs");
    assert_eq!(
        console.lines(),
        vec!["Kina cha miito kimezidi kikomo cha 20", "milele"]
    );
}

#[test]
fn return_in_finally_overrides_pending_return() {
    let output = run_kwenda_source(
        r#"
kazi f() {
    jaribu {
        rudisha 1
    } hatimaye {
        rudisha 2
    }
}

kazi g() {
    jaribu {
        rudisha 1
    } hatimaye {
        andika("fin")
    }
}

kazi kuu() {
    andika(f())
    andika(g())
}
"#,
    );
    assert_eq!(lines(&output), vec!["2", "fin", "1"]);
}

#[test]
fn for_without_condition_runs_once() {
    let output = run_kwenda_source(
        r#"
kazi kuu() {
    kwa ;; {
        andika("mara")
    }
    andika("mwisho")
}
"#,
    );
    assert_eq!(lines(&output), vec!["mara", "mwisho"]);
}

#[test]
fn logical_operators_evaluate_both_sides() {
    let output = run_kwenda_source(
        r#"
kazi s() {
    andika("s")
    rudisha kweli
}

kazi kuu() {
    andika(uwongo na s())
    andika(kweli au s())
}
"#,
    );
    assert_eq!(lines(&output), vec!["s", "uwongo", "s", "kweli"]);
}

#[test]
fn default_call_depth_is_reachable_on_a_plain_thread() {
    let output = run_kwenda_source(
        r#"
kazi jumla(n) {
    kama n == 0 {
        rudisha 0
    }
    rudisha n + jumla(n - 1)
}

kazi milele(n) {
    rudisha milele(n + 1)
}

kazi kuu() {
    andika(jumla(190))
    jaribu {
        milele(0)
    } shika (e) {
        andika(e.ujumbe)
    }
}
"#,
    );
    assert_eq!(
        lines(&output),
        vec!["18145", "Kina cha miito kimezidi kikomo cha 200"]
    );
}

//==============================================
// End of file
//==============================================
