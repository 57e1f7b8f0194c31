mod common;
use basic::lang::ErrorCode;
use common::*;

#[test]
fn test_for_counts() {
    let s = exec(
        r#"10 FOR I=1 TO 3
        20 PRINT I;
        30 NEXT I
        40 PRINT"#,
    );
    assert_eq!(s, "123\n");
}

#[test]
fn test_for_step_down() {
    let s = exec(
        r#"10 FOR I=10 TO 0 STEP -5
        20 PRINT I;" ";
        30 NEXT I"#,
    );
    assert_eq!(s, "10 5 0 ");
}

#[test]
fn test_for_runs_once_when_equal() {
    assert_eq!(exec("10 FOR I=4 TO 4: PRINT I: NEXT I"), "4\n");
}

#[test]
fn test_loop_variable_restored() {
    let s = exec(
        r#"10 I=7
        20 FOR I=1 TO 2
        30 NEXT I
        40 PRINT I"#,
    );
    assert_eq!(s, "7\n");
}

#[test]
fn test_nested_loops() {
    let s = exec(
        r#"10 FOR I=1 TO 2
        20 FOR J=1 TO 2
        30 PRINT I*10+J;" ";
        40 NEXT J
        50 NEXT I"#,
    );
    assert_eq!(s, "11 12 21 22 ");
}

#[test]
fn test_next_outer_closes_inner() {
    let s = exec(
        r#"10 J=9
        20 FOR I=1 TO 3
        30 FOR J=1 TO 3
        40 PRINT I;J;" ";
        50 NEXT I
        60 PRINT J"#,
    );
    assert_eq!(s, "11 21 31 9\n");
}

#[test]
fn test_reentered_loop_keeps_saved_value() {
    let s = exec(
        r#"10 I=5: N=0
        20 FOR I=1 TO 2
        30 N=N+1
        40 IF N<3 THEN 20
        50 NEXT I
        60 PRINT N; I"#,
    );
    assert_eq!(s, "45\n");
}

// The loop ends only when the variable lands exactly on the target.
#[test]
fn test_overshoot_does_not_terminate() {
    let mut r = runtime(
        r#"10 FOR I=1 TO 2 STEP 2
        20 NEXT I
        30 PRINT "DONE""#,
    );
    let mut host = Script::new(&[]);
    r.run(&mut host);
    assert!(!drive(&mut r, &mut host, 50));
    assert!(!r.is_complete());
    assert_eq!(host.output, "");
    assert!(r.variables().get("I").unwrap() != basic::mach::Val::Real(2.0));
}

#[test]
fn test_next_without_for() {
    let e = run_error("10 NEXT I");
    assert!(e.is(ErrorCode::NextWithoutFor));
    assert_eq!(e.detail(), "I");
    assert_eq!(e.line(), Some(1));
}

#[test]
fn test_next_after_loop_finished() {
    let e = run_error(
        r#"10 FOR I=1 TO 2
        20 NEXT I
        30 NEXT I"#,
    );
    assert!(e.is(ErrorCode::NextWithoutFor));
    assert_eq!(e.line(), Some(3));
}

#[test]
fn test_for_without_next() {
    let e = compile_error("10 FOR I=1 TO 3\n20 PRINT I");
    assert!(e.is(ErrorCode::ForWithoutNext));
    assert_eq!(e.line(), Some(1));
}

#[test]
fn test_for_needs_real_variable() {
    let e = compile_error("10 FOR I%=1 TO 3\n20 NEXT I%");
    assert!(e.is(ErrorCode::SyntaxError));
}
