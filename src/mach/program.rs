use super::{Address, Namespace, Opcode};
use crate::lang::{SourceLine, StatementNumber};

/// ## Compiled program
///
/// The instruction array, the four slot namespaces and the address of
/// every statement. This is everything the virtual machine needs.

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub(super) code: Vec<Opcode>,
    pub(super) lines: Vec<SourceLine>,
    pub(super) statements: Vec<(StatementNumber, Address)>,
    pub(super) strings: Namespace,
    pub(super) integers: Namespace,
    pub(super) reals: Namespace,
    pub(super) arrays: Namespace,
    pub(super) warnings: Vec<String>,
}

impl Program {
    pub fn code(&self) -> &[Opcode] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn opcode(&self, addr: Address) -> Option<&Opcode> {
        self.code.get(addr)
    }

    /// Source line of the instruction at `addr`.
    pub fn line_for(&self, addr: Address) -> Option<SourceLine> {
        self.lines.get(addr).copied().filter(|line| *line > 0)
    }

    pub fn address_of(&self, number: StatementNumber) -> Option<Address> {
        self.statements
            .binary_search_by_key(&number, |(n, _)| *n)
            .ok()
            .map(|i| self.statements[i].1)
    }

    /// The statement containing `addr`.
    pub fn statement_for(&self, addr: Address) -> Option<StatementNumber> {
        self.statements
            .iter()
            .rev()
            .find(|(_, a)| *a <= addr)
            .map(|(n, _)| *n)
    }

    pub fn statements(&self) -> &[(StatementNumber, Address)] {
        &self.statements
    }

    pub fn strings(&self) -> &Namespace {
        &self.strings
    }

    pub fn integers(&self) -> &Namespace {
        &self.integers
    }

    pub fn reals(&self) -> &Namespace {
        &self.reals
    }

    pub fn arrays(&self) -> &Namespace {
        &self.arrays
    }

    /// Aliasing warnings, shown when the program starts.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut statements = self.statements.iter().peekable();
        for (addr, op) in self.code.iter().enumerate() {
            while let Some((number, _)) = statements.next_if(|(_, a)| *a == addr) {
                writeln!(f, "{}:", number)?;
            }
            writeln!(f, "  {:04} {}", addr, op)?;
        }
        Ok(())
    }
}
