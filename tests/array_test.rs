mod common;
use basic::lang::ErrorCode;
use basic::mach::Array;
use common::*;

#[test]
fn test_array_basics() {
    let s = exec(
        r#"10 DIM A$(100), X(10,10)
        20 A$(42)="THE ANSWER"
        30 X(4,2)=2.5
        40 PRINT A$(42)+"!";X(4,2)"#,
    );
    assert_eq!(s, "THE ANSWER!2.5\n");
}

#[test]
fn test_auto_dimension() {
    assert_eq!(exec("10 B(10)=3\n20 PRINT B(10); B(0)"), "30\n");
    let e = run_error("10 B(11)=1");
    assert!(e.is(ErrorCode::SubscriptOutOfRange));
    assert_eq!(e.line(), Some(1));
}

#[test]
fn test_redimensioned() {
    let e = run_error("10 DIM A(5)\n20 DIM A(5)");
    assert!(e.is(ErrorCode::RedimensionedArray));
    assert_eq!(e.line(), Some(2));
    let e = run_error("10 A(1)=1\n20 DIM A(5)");
    assert!(e.is(ErrorCode::RedimensionedArray));
}

#[test]
fn test_dim_with_expressions() {
    let s = exec(
        r#"10 N=3
        20 DIM A(N*2)
        30 A(6)=1
        40 PRINT A(6)"#,
    );
    assert_eq!(s, "1\n");
    let e = run_error("10 DIM A(-1)");
    assert!(e.is(ErrorCode::IllegalFunctionCall));
}

#[test]
fn test_integer_array_wraps() {
    assert_eq!(exec("10 DIM C%(2)\n20 C%(1)=70000\n30 PRINT C%(1)"), "4464\n");
}

#[test]
fn test_defaults() {
    assert_eq!(exec(r#"10 DIM Z(3), Z$(3)
        20 PRINT Z(0); "["; Z$(0); "]""#), "0[]\n");
}

#[test]
fn test_assignment_declares_array() {
    assert_eq!(exec("10 Q(2)=Q(2)+4\n20 PRINT Q(2)"), "4\n");
    let e = compile_error("10 PRINT Q(2)\n20 Q(2)=1");
    assert!(e.is(ErrorCode::UndefinedUserFunction));
    assert_eq!(e.detail(), "Q");
    assert_eq!(e.line(), Some(1));
}

#[test]
fn test_huge_dim_out_of_memory() {
    let e = run_error("10 DIM A(10^30, 1)\n20 PRINT \"OK\"");
    assert!(e.is(ErrorCode::OutOfMemory));
    assert_eq!(e.line(), Some(1));
    let e = run_error("10 DIM B(1000, 1000, 1000)");
    assert!(e.is(ErrorCode::OutOfMemory));
}

#[test]
fn test_array_and_scalar_are_separate() {
    assert_eq!(exec("10 A=1: A(1)=2: PRINT A; A(1)"), "12\n");
}

#[test]
fn test_wrong_depth() {
    let e = run_error("10 DIM M(2,2)\n20 PRINT M(1)");
    assert!(e.is(ErrorCode::SubscriptOutOfRange));
    assert_eq!(e.line(), Some(2));
}

#[test]
fn test_subscript_type() {
    let e = run_error("10 DIM A(2)\n20 PRINT A(\"X\")");
    assert!(e.is(ErrorCode::TypeMismatch));
    assert_eq!(e.line(), Some(2));
}

#[test]
fn test_array_visible_to_debugger() {
    let mut r = runtime("10 DIM M(1,2)\n20 M(1,2)=5");
    let mut host = Script::new(&[]);
    r.run(&mut host);
    assert!(drive(&mut r, &mut host, 10));
    let vars = r.variables();
    match vars.array("M") {
        Some(Array::Nested(rows)) => {
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[1], Array::Real(vec![0.0, 0.0, 5.0]));
        }
        other => panic!("{:?}", other),
    }
    assert_eq!(vars.get("M"), None);
    assert_eq!(host.outcome, Some(Ok(())));
}
