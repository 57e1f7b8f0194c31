use super::{Address, Opcode, Val};
use crate::error;
use crate::lang::{Error, SourceLine, StatementNumber};
use std::collections::HashMap;

type Result<T> = std::result::Result<T, Error>;

/// ## Forward reference fixups
///
/// Jumps are emitted before their destination has an address. Each one
/// records the address of its placeholder literal; `link` patches them
/// once every statement has been emitted.

#[derive(Debug, Default)]
pub struct Link {
    statements: HashMap<StatementNumber, Address>,
    unlinked: Vec<(Address, StatementNumber, SourceLine)>,
}

impl Link {
    pub fn new() -> Link {
        Link::default()
    }

    pub fn insert(&mut self, number: StatementNumber, addr: Address) {
        self.statements.insert(number, addr);
    }

    pub fn address_of(&self, number: StatementNumber) -> Option<Address> {
        self.statements.get(&number).copied()
    }

    pub fn link_addr_to_statement(&mut self, addr: Address, number: StatementNumber, line: SourceLine) {
        self.unlinked.push((addr, number, line));
    }

    pub fn link(&mut self, code: &mut [Opcode]) -> Result<()> {
        for (op_addr, number, line) in std::mem::take(&mut self.unlinked) {
            let dest = match self.statements.get(&number) {
                Some(dest) => *dest,
                None => return Err(error!(InternalError, line; "LINK FAILURE")),
            };
            match code.get_mut(op_addr) {
                Some(op @ Opcode::Literal(Val::Address(_))) => *op = Opcode::Literal(Val::Address(dest)),
                _ => return Err(error!(InternalError, line; "LINK FAILURE")),
            }
        }
        Ok(())
    }

    /// Statement numbers and their addresses, in program order.
    pub fn into_table(self) -> Vec<(StatementNumber, Address)> {
        let mut table: Vec<(StatementNumber, Address)> = self.statements.into_iter().collect();
        table.sort_unstable();
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patches_forward_reference() {
        let mut link = Link::new();
        let mut code = vec![Opcode::Literal(Val::Address(0)), Opcode::Jump, Opcode::End];
        link.link_addr_to_statement(0, 20, 1);
        link.insert(10, 0);
        link.insert(20, 2);
        link.link(&mut code).unwrap();
        assert_eq!(code[0], Opcode::Literal(Val::Address(2)));
        assert_eq!(link.into_table(), vec![(10, 0), (20, 2)]);
    }

    #[test]
    fn test_missing_statement_is_internal() {
        let mut link = Link::new();
        let mut code = vec![Opcode::Literal(Val::Address(0)), Opcode::Jump];
        link.link_addr_to_statement(0, 99, 4);
        let e = link.link(&mut code).unwrap_err();
        assert_eq!(e.to_string(), "INTERNAL ERROR IN 4; LINK FAILURE");
    }
}
