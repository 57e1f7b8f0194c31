use super::{ast::*, Error, StatementNumber};
use crate::error;
use std::collections::HashMap;

type Result<T> = std::result::Result<T, Error>;

/// Orders statements by number and resolves every jump target to a
/// statement index. When a number repeats, the last one in the source wins.
pub fn link(program: Program) -> Result<Program> {
    let mut statements = program.statements;
    statements.sort_by_key(|s| s.number);

    let mut kept: Vec<Statement> = Vec::with_capacity(statements.len());
    for statement in statements {
        if let Some(last) = kept.last_mut() {
            if last.number == statement.number {
                log::warn!(
                    "statement {} on line {} replaced by line {}",
                    last.number,
                    last.line,
                    statement.line
                );
                *last = statement;
                continue;
            }
        }
        kept.push(statement);
    }

    let index_to_number: Vec<StatementNumber> = kept.iter().map(|s| s.number).collect();
    let number_to_index: HashMap<StatementNumber, usize> = index_to_number
        .iter()
        .enumerate()
        .map(|(index, number)| (*number, index))
        .collect();

    for statement in kept.iter_mut() {
        let line = statement.line;
        for command in statement.commands.iter_mut() {
            if let Some(target) = command.target_mut() {
                match number_to_index.get(&target.number) {
                    Some(index) => target.index = Some(*index),
                    None => {
                        return Err(error!(UndefinedLine, line; &target.number.to_string()));
                    }
                }
            }
        }
    }

    log::debug!("linked {} statements", kept.len());
    Ok(Program {
        statements: kept,
        number_to_index,
        index_to_number,
    })
}

#[cfg(test)]
mod tests {
    use super::super::{lex, parse, ErrorCode};
    use super::*;

    fn link_str(s: &str) -> Result<Program> {
        link(parse(&lex(s))?)
    }

    #[test]
    fn test_sorts_and_maps() {
        let program = link_str("30 END\n10 GOTO 30\n20 PRINT 1").unwrap();
        assert_eq!(program.index_to_number, vec![10, 20, 30]);
        assert_eq!(program.index_of(30), Some(2));
        assert_eq!(program.number_of(1), Some(20));
        assert_eq!(
            program.statements[0].commands[0],
            Command::Goto(Target {
                number: 30,
                index: Some(2)
            })
        );
    }

    #[test]
    fn test_undefined_target() {
        let e = link_str("10 GOSUB 100\n20 END").unwrap_err();
        assert!(e.is(ErrorCode::UndefinedLine));
        assert_eq!(e.to_string(), "UNDEFINED LINE IN 1; 100");
    }

    #[test]
    fn test_duplicate_last_wins() {
        let program = link_str("10 PRINT 1\n10 PRINT 2\n20 END").unwrap();
        assert_eq!(program.statements.len(), 2);
        assert_eq!(program.statements[0].line, 2);
        assert_eq!(program.number_to_index.len(), program.index_to_number.len());
    }
}
