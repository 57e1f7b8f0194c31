use super::{Address, Val, Variables};
use crate::lang::{DataType, Error, SourceLine};
use std::rc::Rc;

/// ## Host collaborator
///
/// The virtual machine never blocks and never touches a terminal. It
/// calls into a `Host` for output, for input and to decide when the
/// next time slice runs. Whenever the machine stops short of finishing
/// it hands the host exactly one `Continuation`, which the host passes
/// back to `Runtime::resume` (or `Runtime::resume_with_input`) when it
/// is ready.
pub trait Host {
    fn print(&mut self, val: &Val);

    fn println(&mut self);

    /// Ask for one value per requested type. Answer with
    /// `Runtime::resume_with_input`; a reply that does not parse is
    /// asked for again.
    fn input(&mut self, request: InputRequest, cont: Continuation);

    /// Called before each statement of an instrumented program.
    /// The default continues immediately.
    fn debug(&mut self, cont: Continuation, _pc: Address, _vars: &mut Variables, _line: SourceLine) {
        self.schedule(cont)
    }

    /// Arrange for `cont` to be resumed later.
    fn schedule(&mut self, cont: Continuation);

    /// Called once when a run ends, by `END` or by an error.
    fn finish(&mut self, _outcome: &Result<(), Error>) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Resume {
    Slice,
    Input,
    Debug,
}

/// A suspended run. Only the most recently issued continuation of the
/// current run resumes anything; any other is ignored.
#[derive(Debug, PartialEq)]
pub struct Continuation {
    pub(super) ticket: u64,
    pub(super) pc: Address,
    pub(super) resume: Resume,
}

impl Continuation {
    /// Address of the next instruction to execute.
    pub fn pc(&self) -> Address {
        self.pc
    }

    /// Continue somewhere else. Only a debugger continuation moves the
    /// program counter; the others resume where they stopped.
    pub fn jump(self, pc: Address) -> Continuation {
        Continuation { pc, ..self }
    }

    pub fn is_input(&self) -> bool {
        self.resume == Resume::Input
    }

    pub fn is_debug(&self) -> bool {
        self.resume == Resume::Debug
    }
}

/// What an `INPUT` statement is waiting for.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRequest {
    prompt: Rc<str>,
    types: Rc<[DataType]>,
    retry: bool,
}

impl InputRequest {
    pub fn new(prompt: Rc<str>, types: Rc<[DataType]>) -> InputRequest {
        InputRequest {
            prompt,
            types,
            retry: false,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn types(&self) -> &[DataType] {
        &self.types
    }

    /// True when the previous reply was rejected.
    pub fn is_retry(&self) -> bool {
        self.retry
    }

    pub(super) fn retry(self) -> InputRequest {
        InputRequest {
            retry: true,
            ..self
        }
    }

    /// Splits a reply on commas into one value per requested type.
    /// A single string request takes the whole line. Returns `None`
    /// when the count is wrong or a number does not parse.
    pub fn parse(&self, text: &str) -> Option<Vec<Val>> {
        let text = text.trim_end_matches(|c| c == '\r' || c == '\n');
        if let [DataType::String] = self.types() {
            return Some(vec![InputRequest::string(text)]);
        }
        let fields: Vec<&str> = text.split(',').collect();
        if fields.len() != self.types.len() {
            return None;
        }
        let mut vals = vec![];
        for (field, data_type) in fields.iter().zip(self.types.iter()) {
            vals.push(match data_type {
                DataType::String => InputRequest::string(field),
                DataType::Integer | DataType::Real => InputRequest::number(field)?,
            });
        }
        Some(vals)
    }

    fn string(field: &str) -> Val {
        let field = field.trim();
        let unquoted = field
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(field);
        Val::String(unquoted.into())
    }

    fn number(field: &str) -> Option<Val> {
        let field = field.trim();
        if let Ok(n) = field.parse::<i16>() {
            return Some(Val::Integer(n));
        }
        match field.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(Val::Real(n)),
            _ => None,
        }
    }
}
