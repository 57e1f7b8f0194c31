use super::{Builtin, Slot, Val};
use crate::lang::{DataType, SourceLine};
use std::rc::Rc;

/// ## Virtual machine instruction set
///
/// The BASIC virtual machine has no registers.
/// Every operation is performed on the stack.
///
/// For example: `LET A=3*B` compiles to
/// `[LITERAL(3), LOAD(B), MUL, STORE(A)]` where `A` and `B` are slots
/// in the real namespace.
///
/// Array instructions expect the subscripts on the stack followed by
/// the subscript count as an integer literal.
///
/// See <https://en.wikipedia.org/wiki/Reverse_Polish_notation>

#[derive(Clone, PartialEq)]
pub enum Opcode {
    // *** Stack manipulation
    /// Push literal value on to the stack.
    Literal(Val),
    /// Push the value of a scalar variable.
    Load(DataType, Slot),
    /// Pop the stack into a scalar variable, converting to its type.
    Store(DataType, Slot),
    DimArr(DataType, Slot),
    LoadArr(DataType, Slot),
    /// Pops the value first, then the subscripts.
    StoreArr(DataType, Slot),
    Swap,
    /// Discard the top of the stack.
    Pop,

    // *** Branch control
    /// Pop an address and branch to it.
    Jump,
    /// Pop an address, then a predicate. Branch if the predicate is true.
    JumpIf,
    /// Like `Jump` but remembers where to `Return`.
    Call,
    Return,
    /// Pop step, target and initial value and enter a loop on a real slot.
    For(Slot),
    Next(Slot),
    End,

    // *** Statements
    Print,
    PrintLn,
    /// Pop a prompt and suspend until the host supplies one value per type.
    Input(Rc<[DataType]>),
    /// Move the top n values into the data pool.
    StoreData(usize),
    /// Push the next n values from the data pool.
    ReadData(usize),
    Restore,
    /// Suspend for the debugger before a statement.
    SourceLine(SourceLine),

    // *** Expression operations
    Neg,
    Not,
    Pow,
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,

    // *** Built-in functions
    Builtin(Builtin),
}

impl std::fmt::Debug for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Opcode::*;
        match self {
            Literal(Val::String(s)) => write!(f, "LITERAL(\"{}\")", s),
            Literal(v) => write!(f, "LITERAL({})", v),
            Load(t, s) => write!(f, "LOAD{}({})", t.suffix(), s),
            Store(t, s) => write!(f, "STORE{}({})", t.suffix(), s),
            DimArr(t, s) => write!(f, "DIMARR{}({})", t.suffix(), s),
            LoadArr(t, s) => write!(f, "LOADARR{}({})", t.suffix(), s),
            StoreArr(t, s) => write!(f, "STOREARR{}({})", t.suffix(), s),
            Swap => write!(f, "SWAP"),
            Pop => write!(f, "POP"),

            Jump => write!(f, "JUMP"),
            JumpIf => write!(f, "JUMPIF"),
            Call => write!(f, "CALL"),
            Return => write!(f, "RETURN"),
            For(s) => write!(f, "FOR({})", s),
            Next(s) => write!(f, "NEXT({})", s),
            End => write!(f, "END"),

            Print => write!(f, "PRINT"),
            PrintLn => write!(f, "PRINTLN"),
            Input(types) => {
                let types: Vec<String> = types.iter().map(|t| t.to_string()).collect();
                write!(f, "INPUT({})", types.join(","))
            }
            StoreData(n) => write!(f, "STOREDATA({})", n),
            ReadData(n) => write!(f, "READDATA({})", n),
            Restore => write!(f, "RESTORE"),
            SourceLine(n) => write!(f, "SOURCELINE({})", n),

            Neg => write!(f, "NEG"),
            Not => write!(f, "NOT"),
            Pow => write!(f, "POW"),
            Mul => write!(f, "MUL"),
            Div => write!(f, "DIV"),
            Mod => write!(f, "MOD"),
            Add => write!(f, "ADD"),
            Sub => write!(f, "SUB"),
            Eq => write!(f, "EQ"),
            NotEq => write!(f, "NOTEQ"),
            Lt => write!(f, "LT"),
            LtEq => write!(f, "LTEQ"),
            Gt => write!(f, "GT"),
            GtEq => write!(f, "GTEQ"),
            And => write!(f, "AND"),
            Or => write!(f, "OR"),

            Builtin(b) => write!(f, "BUILTIN({})", b),
        }
    }
}
