//==============================================
// File: tests/call_user_function.rs
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: User function and closure calls
// Objective: Parameter binding, recursion, first-class functions, lambdas
//            and the scope each kind of call runs in
//==============================================

#[path = "../src/tests/util.rs"]
mod util;

use util::{lines, run_kwenda_source, run_with_input};

#[test]
fn parameters_bind_positionally() {
    let output = run_kwenda_source(
        r#"
kazi jumlisha(namba a, namba b) : namba {
    rudisha a + b
}

kazi kuu() {
    andika(jumlisha(2, 3))
}
"#,
    );
    assert_eq!(lines(&output), vec!["5"]);
}

#[test]
fn recursion_computes_factorial() {
    let output = run_kwenda_source(
        r#"
kazi faktoria(n) {
    kama n <= 1 {
        rudisha 1
    }
    rudisha n * faktoria(n - 1)
}

kazi kuu() {
    andika(faktoria(5))
}
"#,
    );
    assert_eq!(lines(&output), vec!["120"]);
}

#[test]
fn lambdas_are_values() {
    let output = run_kwenda_source(
        r#"
kazi kuu() {
    namba mara_mbili = kazi(x) { rudisha x * 2 }
    andika(mara_mbili(4))
    andika(aina(mara_mbili))
}
"#,
    );
    assert_eq!(lines(&output), vec!["8", "kazi"]);
}

#[test]
fn closures_keep_their_defining_scope() {
    let output = run_kwenda_source(
        r#"
kazi mtengeneza(n) {
    rudisha kazi(x) { rudisha x + n }
}

kazi kuu() {
    namba ongeza5 = mtengeneza(5)
    andika(ongeza5(10))
}
"#,
    );
    assert_eq!(lines(&output), vec!["15"]);
}

#[test]
fn named_functions_can_be_passed_around() {
    let output = run_kwenda_source(
        r#"
kazi mara_tatu(x) {
    rudisha x * 3
}

kazi tumia(f, v) {
    rudisha f(v)
}

kazi kuu() {
    andika(tumia(mara_tatu, 2))
}
"#,
    );
    assert_eq!(lines(&output), vec!["6"]);
}

#[test]
fn callee_frames_see_the_caller_but_do_not_write_to_it() {
    let output = run_kwenda_source(
        r#"
kazi onyesha() {
    andika(y)
}

kazi badili() {
    y = 99
    andika(y)
}

kazi kuu() {
    namba y = 7
    onyesha()
    badili()
    andika(y)
}
"#,
    );
    assert_eq!(lines(&output), vec!["7", "99", "7"]);
}

#[test]
fn missing_arguments_stay_unbound() {
    let output = run_kwenda_source(
        r#"
kazi salamu(jina) {
    andika("Habari " + jina)
}

kazi kuu() {
    salamu("Amina")
    salamu()
}
"#,
    );
    assert_eq!(lines(&output), vec!["Habari Amina", "Habari jina"]);
}

#[test]
fn wrong_builtin_arity_is_reported_like_an_unknown_function() {
    let output = run_kwenda_source(
        r#"
kazi kuu() {
    urefu(1, 2)
}
"#,
    );
    assert_eq!(lines(&output), vec!["Kazi haijulikani: urefu"]);
}

#[test]
fn input_is_parsed_as_a_number_when_possible() {
    let output = run_with_input(
        r#"
kazi kuu() {
    namba x = ingiza("Weka namba:")
    andika(x + 1)
    maneno jina = ingiza()
    andika("Habari " + jina)
}
"#,
        &["41", "Juma"],
    );
    assert_eq!(output, "Weka namba: 42\nIngiza thamani: Habari Juma\n");
}

//==============================================
// End of file
//==============================================
