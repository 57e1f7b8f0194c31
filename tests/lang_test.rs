mod common;
use basic::lang::ast::{Command, Expression};
use basic::lang::token::{Kind, Word};
use basic::lang::{lex, link, parse, ErrorCode, Ident};
use common::*;

#[test]
fn test_lex_lines() {
    let tokens = lex("10 PRINT A\n\n20 END\n");
    assert_eq!(tokens.len(), 5);
    assert_eq!(tokens[0].kind, Kind::StatementNumber(10));
    assert_eq!(tokens[1].kind, Kind::Word(Word::Print));
    assert_eq!(tokens[3].line, 3);
}

#[test]
fn test_crunched_source() {
    assert_eq!(exec("10 FORI=1TO3:PRINTI;:NEXTI"), "123");
}

#[test]
fn test_lowercase_source() {
    assert_eq!(exec("10 let a = 2: print a * 3"), "6\n");
}

#[test]
fn test_front_end_stages() {
    let program = parse(&lex("20 GOTO 10\n10 A=1")).unwrap();
    assert_eq!(program.statements[0].number, 20);
    let program = link(program).unwrap();
    assert_eq!(program.statements[0].number, 10);
    assert_eq!(program.index_of(20), Some(1));
    match &program.statements[1].commands[0] {
        Command::Goto(target) => assert_eq!(target.index, Some(0)),
        c => panic!("{:?}", c),
    }
}

#[test]
fn test_array_after_dim_is_index() {
    let program = parse(&lex("10 DIM A(3)\n20 X=A(1)+B(1)")).unwrap();
    match &program.statements[1].commands[0] {
        Command::Let(_, Expression::Binary(_, lhs, rhs)) => {
            assert!(matches!(**lhs, Expression::Index(..)));
            assert_eq!(
                **rhs,
                Expression::Call(Ident::new("B"), vec![Expression::Integer(1)])
            );
        }
        c => panic!("{:?}", c),
    }
}

#[test]
fn test_syntax_errors() {
    let e = compile_error("PRINT 1");
    assert!(e.is(ErrorCode::SyntaxError));
    assert_eq!(e.line(), Some(1));
    let e = compile_error("10 PRINT 1\n20 PRINT 1 +");
    assert!(e.is(ErrorCode::SyntaxError));
    assert_eq!(e.line(), Some(2));
    assert_eq!(e.detail(), "EXPECTED EXPRESSION");
    let e = compile_error("10 X=@");
    assert_eq!(e.detail(), "EXPECTED EXPRESSION, FOUND @");
    let e = compile_error("10 IF A 20");
    assert_eq!(e.detail(), "EXPECTED THEN, FOUND 20");
    let e = compile_error("10 A=1 2");
    assert_eq!(e.detail(), "UNEXPECTED 2");
    let e = compile_error("10");
    assert_eq!(e.detail(), "EXPECTED STATEMENT");
}

#[test]
fn test_error_display() {
    let e = compile_error("10 GOTO 100");
    assert_eq!(e.to_string(), "UNDEFINED LINE IN 1; 100");
    let e = run_error("10 PRINT 1/0");
    assert_eq!(e.to_string(), "DIVISION BY ZERO IN 1");
}
