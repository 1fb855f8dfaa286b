// Integration tests for the DCL interpreter
//
// These tests run complete DCL programs and check what they print. Tests cover:
// - Single-level and labeled multi-level BREAK
// - READ/PRINT over identifier lists
// - Loop-label stack balance across sibling and nested loops
// - Runtime and syntax error reporting

use dcl::errors::ErrorKind;
use dcl::interpreter::Interpreter;
use dcl::config::RunConfig;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

fn run_with_input(code: &str, input: &str) -> (Interpreter, Result<(), dcl::errors::LangError>, String) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let mut interp = Interpreter::new();
    interp.set_output(buffer.clone());
    interp.set_input(Cursor::new(input.to_string()));
    let result = interp.run_source(code);
    let output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    (interp, result, output)
}

fn run_code(code: &str) -> String {
    let (_, result, output) = run_with_input(code, "");
    if let Err(err) = result {
        panic!("program failed: {:?}", err);
    }
    output
}

fn lines(output: &str) -> Vec<&str> {
    output.lines().collect()
}

#[test]
fn test_single_level_break() {
    let output = run_code(
        r#"
        one = 1; two = 2; three = 3;
        LOOP L:
            PRINT one;
            BREAK;
            PRINT two;
        REPEAT;
        PRINT three;
        "#,
    );
    assert_eq!(lines(&output), vec!["1", "3"]);
}

#[test]
fn test_labeled_multi_level_break() {
    let output = run_code(
        r#"
        n9 = 9; n10 = 10; n11 = 11; n12 = 12;
        LOOP A:
            LOOP B:
                PRINT n9;
                BREAK A;
                PRINT n10;
            REPEAT;
            PRINT n11;
        REPEAT;
        PRINT n12;
        "#,
    );
    assert_eq!(lines(&output), vec!["9", "12"]);
}

#[test]
fn test_unlabeled_break_in_inner_loop_resumes_outer() {
    let output = run_code(
        r#"
        i = 0;
        LOOP outer:
            i = i + 1;
            LOOP inner:
                PRINT i;
                BREAK;
            REPEAT;
            IF i == 3 THEN BREAK outer; END;
        REPEAT;
        PRINT i;
        "#,
    );
    assert_eq!(lines(&output), vec!["1", "2", "3", "3"]);
}

#[test]
fn test_break_inside_if_leaves_loop() {
    let output = run_code(
        r#"
        n = 0;
        LOOP count:
            n = n + 1;
            IF n >= 4 THEN
                BREAK;
            ELSE
                PRINT n;
            END;
        REPEAT;
        PRINT n;
        "#,
    );
    assert_eq!(lines(&output), vec!["1", "2", "3", "4"]);
}

#[test]
fn test_break_unwinds_three_levels() {
    let output = run_code(
        r#"
        a = 1; b = 2; c = 3; d = 4;
        LOOP x:
            LOOP y:
                LOOP z:
                    PRINT a;
                    BREAK x;
                REPEAT;
                PRINT b;
            REPEAT;
            PRINT c;
        REPEAT;
        PRINT d;
        "#,
    );
    assert_eq!(lines(&output), vec!["1", "4"]);
}

#[test]
fn test_sibling_loops_with_same_label() {
    let output = run_code(
        r#"
        k = 1;
        LOOP again: PRINT k; BREAK again; REPEAT;
        k = 2;
        LOOP again: PRINT k; BREAK again; REPEAT;
        "#,
    );
    assert_eq!(lines(&output), vec!["1", "2"]);
}

#[test]
fn test_named_break_targets_innermost_duplicate_label() {
    let output = run_code(
        r#"
        p = 5; q = 6;
        LOOP a:
            LOOP a:
                BREAK a;
            REPEAT;
            PRINT p;
            BREAK;
        REPEAT;
        PRINT q;
        "#,
    );
    assert_eq!(lines(&output), vec!["5", "6"]);
}

#[test]
fn test_loop_stack_is_empty_after_run() {
    let (interp, result, _) = run_with_input("LOOP a: LOOP b: BREAK a; REPEAT; REPEAT;", "");
    assert!(result.is_ok());
    assert_eq!(interp.state().loop_depth(), 0);
}

#[test]
fn test_id_list_round_trip() {
    let (_, result, output) = run_with_input(
        "READ first, second , third,fourth; PRINT first, second, third, fourth;",
        "3.5 -2\n100\n0.25\n",
    );
    assert!(result.is_ok());
    assert_eq!(lines(&output), vec!["3.5", "-2", "100", "0.25"]);
}

#[test]
fn test_read_inside_loop_until_sentinel() {
    let (interp, result, output) = run_with_input(
        r#"
        total = 0;
        LOOP sum:
            READ x;
            IF x < 0 THEN BREAK sum; END;
            total = total + x;
        REPEAT;
        PRINT total;
        "#,
        "1 2 3\n4\n-1\n",
    );
    assert!(result.is_ok());
    assert_eq!(output, "10\n");
    assert_eq!(interp.symbols().get("x"), Some(-1.0));
}

#[test]
fn test_print_unbound_identifier() {
    let (_, result, output) = run_with_input("x = 1; PRINT x, y;", "");
    let err = result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnboundIdentifier);
    assert_eq!(err.message, "Identifier 'y' is not bound");
    // The first identifier was printed before the failure
    assert_eq!(output, "1\n");
}

#[test]
fn test_read_past_end_of_input() {
    let (_, result, _) = run_with_input("READ a, b;", "7\n");
    assert_eq!(result.unwrap_err().kind, ErrorKind::InputError);
}

#[test]
fn test_label_check_runs_before_execution() {
    let (_, result, output) = run_with_input("x = 1; PRINT x; LOOP a: BREAK b; REPEAT;", "");
    let err = result.unwrap_err();
    assert_eq!(err.kind, ErrorKind::UndefinedLabel);
    assert!(output.is_empty());
}

#[test]
fn test_runtime_label_error_when_check_disabled() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let mut interp = Interpreter::with_config(&RunConfig { check_labels: false, max_loop_iterations: None });
    interp.set_output(buffer.clone());
    let err = interp.run_source("x = 1; PRINT x; LOOP a: BREAK b; REPEAT;").unwrap_err();
    assert_eq!(err.kind, ErrorKind::UndefinedLabel);
    assert_eq!(String::from_utf8(buffer.lock().unwrap().clone()).unwrap(), "1\n");
    assert_eq!(interp.state().loop_depth(), 0);
}

#[test]
fn test_syntax_error_carries_source_line() {
    let mut interp = Interpreter::new();
    interp.set_source_file("demo.dcl");
    let err = interp.run_source("LOOP a:\n  BREAK;\n").unwrap_err();
    assert_eq!(err.kind, ErrorKind::SyntaxError);
    assert_eq!(err.message, "Expected 'REPEAT' after loop body");
    assert_eq!(err.location.file.as_deref(), Some("demo.dcl"));
}

#[test]
fn test_iteration_limit_stops_runaway_loop() {
    let mut interp = Interpreter::with_config(&RunConfig { check_labels: true, max_loop_iterations: Some(10) });
    interp.set_output(Arc::new(Mutex::new(Vec::new())));
    let err = interp.run_source("i = 0; LOOP forever: i = i + 1; REPEAT;").unwrap_err();
    assert_eq!(err.kind, ErrorKind::IterationLimit);
    assert_eq!(interp.symbols().get("i"), Some(11.0));
}

#[test]
fn test_iteration_limit_allows_break_after_limit_completions() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let mut interp = Interpreter::with_config(&RunConfig { check_labels: true, max_loop_iterations: Some(2) });
    interp.set_output(buffer.clone());
    interp
        .run_source("i = 0; LOOP a: i = i + 1; IF i == 3 THEN BREAK; END; REPEAT; PRINT i;")
        .unwrap();
    assert_eq!(String::from_utf8(buffer.lock().unwrap().clone()).unwrap(), "3\n");
}

#[test]
fn test_state_persists_between_runs() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let mut interp = Interpreter::new();
    interp.set_output(buffer.clone());
    interp.run_source("x = 41;").unwrap();
    interp.run_source("x = x + 1; PRINT x;").unwrap();
    assert_eq!(String::from_utf8(buffer.lock().unwrap().clone()).unwrap(), "42\n");
}
