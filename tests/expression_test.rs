mod common;
use basic::lang::ErrorCode;
use common::*;

#[test]
fn test_precedence() {
    assert_eq!(exec("10 PRINT 1+2*3"), "7\n");
    assert_eq!(exec("10 PRINT (1+2)*3"), "9\n");
}

#[test]
fn test_left_assoc() {
    assert_eq!(exec("10 PRINT 1.5/2*3"), "2.25\n");
    assert_eq!(exec("10 PRINT 1.5/(2.0*3)"), "0.25\n");
    assert_eq!(exec("10 PRINT 10-4-3"), "3\n");
}

#[test]
fn test_power_is_left_assoc() {
    assert_eq!(exec("10 PRINT 2^3^2"), "64\n");
}

#[test]
fn test_unary_binds_to_term() {
    assert_eq!(exec("10 PRINT -2^2"), "4\n");
    assert_eq!(exec("10 PRINT 3*-2"), "-6\n");
    assert_eq!(exec("10 PRINT +5"), "5\n");
}

#[test]
fn test_division_is_real() {
    assert_eq!(exec("10 PRINT 10/4"), "2.5\n");
    assert_eq!(exec("10 PRINT 10/5"), "2\n");
}

#[test]
fn test_modulus() {
    assert_eq!(exec("10 PRINT 7 % 3"), "1\n");
    assert_eq!(exec("10 PRINT 7.5 % 2"), "1\n");
}

#[test]
fn test_division_by_zero() {
    let e = run_error("10 PRINT 1/0");
    assert!(e.is(ErrorCode::DivisionByZero));
    assert_eq!(e.line(), Some(1));
    let e = run_error("10 A=0\n20 PRINT 5 % A");
    assert!(e.is(ErrorCode::DivisionByZero));
    assert_eq!(e.line(), Some(2));
}

#[test]
fn test_integer_overflow_promotes() {
    assert_eq!(exec("10 PRINT 32000+1000"), "33000\n");
    assert_eq!(exec("10 PRINT 300*300"), "90000\n");
}

#[test]
fn test_storage_truncation() {
    assert_eq!(
        exec(r#"10 A%=70000: A=70000: PRINT A%; " "; A"#),
        "4464 70000\n"
    );
    assert_eq!(exec("10 A%=5/2: PRINT A%"), "2\n");
    assert_eq!(exec("10 A%=-2.7: PRINT A%"), "-2\n");
}

#[test]
fn test_comparisons() {
    assert_eq!(exec("10 PRINT 1<2; 2<1"), "-10\n");
    assert_eq!(exec("10 PRINT 2<=2; 3>=4; 1<>1; 1><2"), "-100-1\n");
    assert_eq!(exec("10 PRINT 2=2.0"), "-1\n");
}

#[test]
fn test_logic() {
    assert_eq!(exec("10 PRINT 1 AND 0"), "0\n");
    assert_eq!(exec("10 PRINT 0 OR 5"), "-1\n");
    assert_eq!(exec("10 PRINT NOT 0; NOT 1"), "-10\n");
}

#[test]
fn test_strings() {
    assert_eq!(exec(r#"10 A$="AB"+"CD": PRINT A$"#), "ABCD\n");
    assert_eq!(exec(r#"10 PRINT "APPLE"<"BANANA""#), "-1\n");
    assert_eq!(exec(r#"10 PRINT "Mixed Case""#), "Mixed Case\n");
}

#[test]
fn test_type_mismatch() {
    let e = run_error(r#"10 PRINT "A"+1"#);
    assert!(e.is(ErrorCode::TypeMismatch));
    let e = run_error(r#"10 A$=1"#);
    assert!(e.is(ErrorCode::TypeMismatch));
    let e = run_error(r#"10 A="1""#);
    assert!(e.is(ErrorCode::TypeMismatch));
}

#[test]
fn test_variables_start_at_zero() {
    assert_eq!(exec(r#"10 PRINT A; A%; "["; A$; "]""#), "00[]\n");
}

#[test]
fn test_aliased_names_share_storage() {
    let s = exec(
        r#"10 AB1=1
        20 ABC=2
        30 PRINT AB1"#,
    );
    assert_eq!(
        s,
        "WARNING: ABC IS AN ALIAS FOR AB1; BOTH NAME THE SAME VARIABLE\n2\n"
    );
}

#[test]
fn test_suffix_separates_names() {
    assert_eq!(exec(r#"10 A=1: A%=2: A$="3": PRINT A; A%; A$"#), "123\n");
}
