use super::host::Resume;
use super::{
    Address, Continuation, Function, Host, InputRequest, Opcode, Operation, Program, Slot, Stack,
    Val, Var, Variables,
};
use crate::error;
use crate::lang::Error;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Instructions executed before control returns to the host.
pub const DEFAULT_TIME_SLICE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub time_slice: usize,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            time_slice: DEFAULT_TIME_SLICE,
        }
    }
}

#[derive(Debug)]
struct LoopFrame {
    slot: Slot,
    step: f64,
    target: f64,
    pc: Address,
    saved: f64,
}

/// ## Virtual machine
///
/// Executes a compiled `Program` cooperatively. Each call to `run` or
/// `resume` executes at most one time slice and then either finishes,
/// or hands the host a `Continuation` and returns.
pub struct Runtime {
    program: Rc<Program>,
    config: Config,
    pc: Address,
    stack: Stack<Val>,
    calls: Stack<Address>,
    loops: Stack<LoopFrame>,
    vars: Var,
    data: Vec<Val>,
    data_index: usize,
    function: Function,
    paused: bool,
    complete: bool,
    outcome: Option<Result<()>>,
    ticket: u64,
    outstanding: Option<u64>,
    pending_input: Option<InputRequest>,
}

impl Runtime {
    pub fn new(program: Program, config: Config) -> Runtime {
        let vars = Var::new(&program);
        Runtime {
            program: Rc::new(program),
            config,
            pc: 0,
            stack: Stack::new("STACK FULL"),
            calls: Stack::new("TOO MANY GOSUBS"),
            loops: Stack::new("TOO MANY FOR LOOPS"),
            vars,
            data: vec![],
            data_index: 0,
            function: Function::new(),
            paused: false,
            complete: false,
            outcome: None,
            ticket: 0,
            outstanding: None,
            pending_input: None,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Address of the next instruction.
    pub fn pc(&self) -> Address {
        self.pc
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The result of the last finished run.
    pub fn outcome(&self) -> Option<&Result<()>> {
        self.outcome.as_ref()
    }

    pub fn variables(&mut self) -> Variables<'_> {
        Variables::new(&mut self.vars, &self.program)
    }

    /// Starts the program from the beginning with fresh memory.
    /// Any continuation from an earlier run becomes stale.
    pub fn run(&mut self, host: &mut dyn Host) {
        log::debug!("run {} instructions", self.program.len());
        self.pc = 0;
        self.stack.clear();
        self.calls.clear();
        self.loops.clear();
        self.vars = Var::new(&self.program);
        self.data.clear();
        self.data_index = 0;
        self.function = Function::new();
        self.complete = false;
        self.outcome = None;
        self.outstanding = None;
        self.pending_input = None;
        let program = Rc::clone(&self.program);
        for warning in program.warnings() {
            host.print(&Val::String(warning.as_str().into()));
            host.println();
        }
        self.execute(host);
    }

    /// Continues after a time slice or a debugger stop. An input
    /// continuation resumed without a reply asks for input again.
    pub fn resume(&mut self, cont: Continuation, host: &mut dyn Host) {
        if !self.accept(&cont) {
            return;
        }
        match cont.resume {
            Resume::Input => {
                if let Some(request) = self.pending_input.take() {
                    self.request_input(request, host);
                }
            }
            Resume::Slice => self.execute(host),
            Resume::Debug => {
                self.pc = cont.pc;
                self.execute(host);
            }
        }
    }

    /// Answers an `INPUT`. A reply that does not fit the request is
    /// refused and the host is asked again.
    pub fn resume_with_input(&mut self, cont: Continuation, text: &str, host: &mut dyn Host) {
        if !self.accept(&cont) {
            return;
        }
        let request = match (cont.resume, self.pending_input.take()) {
            (Resume::Input, Some(request)) => request,
            (_, pending) => {
                log::debug!("input reply for a continuation not waiting on input");
                self.pending_input = pending;
                if cont.is_debug() {
                    self.pc = cont.pc;
                }
                self.execute(host);
                return;
            }
        };
        let vals = match request.parse(text) {
            Some(vals) => vals,
            None => {
                log::debug!("rejected input {:?}", text);
                self.request_input(request.retry(), host);
                return;
            }
        };
        for val in vals {
            if let Err(error) = self.stack.push(val) {
                self.fail(error, host);
                return;
            }
        }
        self.execute(host);
    }

    fn issue(&mut self, resume: Resume) -> Continuation {
        self.ticket += 1;
        self.outstanding = Some(self.ticket);
        Continuation {
            ticket: self.ticket,
            pc: self.pc,
            resume,
        }
    }

    fn accept(&mut self, cont: &Continuation) -> bool {
        if self.complete || self.outstanding != Some(cont.ticket) {
            log::debug!("ignored stale continuation {}", cont.ticket);
            return false;
        }
        self.outstanding = None;
        true
    }

    fn request_input(&mut self, request: InputRequest, host: &mut dyn Host) {
        self.paused = true;
        let cont = self.issue(Resume::Input);
        self.pending_input = Some(request.clone());
        host.input(request, cont);
    }

    fn execute(&mut self, host: &mut dyn Host) {
        self.paused = false;
        let program = Rc::clone(&self.program);
        let time_slice = self.config.time_slice.max(1);
        let mut count = 0;
        while !self.complete && !self.paused {
            if count == time_slice {
                let cont = self.issue(Resume::Slice);
                host.schedule(cont);
                return;
            }
            count += 1;
            let pc = self.pc;
            if let Err(error) = self.step(&program, host) {
                let error = match program.line_for(pc) {
                    Some(line) => error.in_line(line),
                    None => error,
                };
                self.fail(error, host);
            }
        }
    }

    fn fail(&mut self, error: Error, host: &mut dyn Host) {
        log::debug!("run failed at {}: {}", self.pc, error);
        self.finish(Err(error), host);
    }

    fn finish(&mut self, outcome: Result<()>, host: &mut dyn Host) {
        self.complete = true;
        self.paused = false;
        self.outstanding = None;
        self.pending_input = None;
        host.finish(&outcome);
        self.outcome = Some(outcome);
    }

    fn step(&mut self, program: &Program, host: &mut dyn Host) -> Result<()> {
        let op = match program.opcode(self.pc) {
            Some(op) => op,
            None => return Err(error!(InternalError; "PROGRAM COUNTER OUT OF RANGE")),
        };
        log::trace!("{:04} {}", self.pc, op);
        self.pc += 1;
        match op {
            Opcode::Literal(val) => self.stack.push(val.clone())?,
            Opcode::Load(data_type, slot) => {
                let val = self.vars.fetch(*data_type, *slot)?;
                self.stack.push(val)?;
            }
            Opcode::Store(data_type, slot) => {
                let val = self.stack.pop()?;
                self.vars.store(*data_type, *slot, val)?;
            }
            Opcode::DimArr(data_type, slot) => {
                let bounds = self.pop_subscripts()?;
                self.vars.dimension_array(*data_type, *slot, bounds)?;
            }
            Opcode::LoadArr(data_type, slot) => {
                let indices = self.pop_subscripts()?;
                let val = self.vars.fetch_array(*data_type, *slot, indices)?;
                self.stack.push(val)?;
            }
            Opcode::StoreArr(data_type, slot) => {
                let val = self.stack.pop()?;
                let indices = self.pop_subscripts()?;
                self.vars.store_array(*data_type, *slot, indices, val)?;
            }
            Opcode::Swap => {
                let (lhs, rhs) = self.stack.pop_2()?;
                self.stack.push(rhs)?;
                self.stack.push(lhs)?;
            }
            Opcode::Pop => {
                self.stack.pop()?;
            }
            Opcode::Jump => {
                self.pc = Address::try_from(self.stack.pop()?)?;
            }
            Opcode::JumpIf => {
                let addr = Address::try_from(self.stack.pop()?)?;
                if self.stack.pop()?.is_true()? {
                    self.pc = addr;
                }
            }
            Opcode::Call => {
                let addr = Address::try_from(self.stack.pop()?)?;
                self.calls.push(self.pc)?;
                self.pc = addr;
            }
            Opcode::Return => {
                if self.calls.is_empty() {
                    return Err(error!(ReturnWithoutGosub));
                }
                self.pc = self.calls.pop()?;
            }
            Opcode::For(slot) => self.r#for(*slot)?,
            Opcode::Next(slot) => self.next(program, *slot)?,
            Opcode::End => {
                log::debug!("end at {}", self.pc - 1);
                self.finish(Ok(()), host);
            }
            Opcode::Print => {
                let val = self.stack.pop()?;
                host.print(&val);
            }
            Opcode::PrintLn => host.println(),
            Opcode::Input(types) => {
                let prompt = Rc::<str>::try_from(self.stack.pop()?)?;
                self.request_input(InputRequest::new(prompt, Rc::clone(types)), host);
            }
            Opcode::StoreData(len) => {
                let vals = self.stack.pop_n(*len)?;
                self.data.extend(vals);
            }
            Opcode::ReadData(len) => {
                let end = self.data_index + len;
                if end > self.data.len() {
                    return Err(error!(OutOfData));
                }
                for val in &self.data[self.data_index..end] {
                    self.stack.push(val.clone())?;
                }
                self.data_index = end;
            }
            Opcode::Restore => self.data_index = 0,
            Opcode::SourceLine(line) => {
                self.paused = true;
                let cont = self.issue(Resume::Debug);
                let mut vars = Variables::new(&mut self.vars, program);
                host.debug(cont, self.pc, &mut vars, *line);
            }
            Opcode::Neg => {
                let val = self.stack.pop()?;
                self.stack.push(Operation::negate(val)?)?;
            }
            Opcode::Not => {
                let val = self.stack.pop()?;
                self.stack.push(Operation::not(val)?)?;
            }
            Opcode::Pow => self.binary(Operation::power)?,
            Opcode::Mul => self.binary(Operation::multiply)?,
            Opcode::Div => self.binary(Operation::divide)?,
            Opcode::Mod => self.binary(Operation::modulus)?,
            Opcode::Add => self.binary(Operation::sum)?,
            Opcode::Sub => self.binary(Operation::subtract)?,
            Opcode::Eq => self.binary(Operation::equal)?,
            Opcode::NotEq => self.binary(Operation::not_equal)?,
            Opcode::Lt => self.binary(Operation::less)?,
            Opcode::LtEq => self.binary(Operation::less_equal)?,
            Opcode::Gt => self.binary(Operation::greater)?,
            Opcode::GtEq => self.binary(Operation::greater_equal)?,
            Opcode::And => self.binary(Operation::and)?,
            Opcode::Or => self.binary(Operation::or)?,
            Opcode::Builtin(builtin) => {
                let val = self.stack.pop()?;
                let val = self.function.call(*builtin, val)?;
                self.stack.push(val)?;
            }
        }
        Ok(())
    }

    fn binary(&mut self, op: fn(Val, Val) -> Result<Val>) -> Result<()> {
        let (lhs, rhs) = self.stack.pop_2()?;
        self.stack.push(op(lhs, rhs)?)
    }

    fn pop_subscripts(&mut self) -> Result<Vec<Val>> {
        let depth = Address::try_from(self.stack.pop()?)?;
        self.stack.pop_n(depth)
    }

    /// Pops frames above the innermost one for `slot`, restoring their
    /// variables, and returns its index. `None` leaves the stack alone.
    fn unwind_to(&mut self, slot: Slot) -> Result<Option<usize>> {
        let index = match self.loops.iter().rposition(|frame| frame.slot == slot) {
            Some(index) => index,
            None => return Ok(None),
        };
        while self.loops.len() > index + 1 {
            let frame = self.loops.pop()?;
            self.vars.set_real(frame.slot, frame.saved)?;
        }
        Ok(Some(index))
    }

    fn r#for(&mut self, slot: Slot) -> Result<()> {
        let step = f64::try_from(self.stack.pop()?)?;
        let target = f64::try_from(self.stack.pop()?)?;
        let init = f64::try_from(self.stack.pop()?)?;
        // Re-entering an active loop replaces its frame but keeps the
        // value to restore when it finally ends.
        let saved = match self.unwind_to(slot)? {
            Some(_) => self.loops.pop()?.saved,
            None => self.vars.real(slot)?,
        };
        self.vars.set_real(slot, init)?;
        self.loops.push(LoopFrame {
            slot,
            step,
            target,
            pc: self.pc,
            saved,
        })
    }

    /// Compare, then step. The loop ends only when the variable equals
    /// the target exactly.
    fn next(&mut self, program: &Program, slot: Slot) -> Result<()> {
        if self.unwind_to(slot)?.is_none() {
            let name = program.reals().name(slot).map_or("?", |name| &**name);
            return Err(error!(NextWithoutFor; name));
        }
        let value = self.vars.real(slot)?;
        let (step, target, pc) = match self.loops.last() {
            Some(frame) => (frame.step, frame.target, frame.pc),
            None => return Err(error!(InternalError; "NO LOOP FRAME")),
        };
        if value == target {
            let frame = self.loops.pop()?;
            self.vars.set_real(slot, frame.saved)?;
        } else {
            self.vars.set_real(slot, value + step)?;
            self.pc = pc;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("pc", &self.pc)
            .field("stack", &self.stack)
            .field("paused", &self.paused)
            .field("complete", &self.complete)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::{DataType, ErrorCode, Ident};
    use crate::mach::Namespace;

    #[derive(Default)]
    struct Collect {
        out: String,
        queue: Vec<Continuation>,
        finished: Option<std::result::Result<(), Error>>,
    }

    impl Host for Collect {
        fn print(&mut self, val: &Val) {
            self.out.push_str(&val.to_string());
        }
        fn println(&mut self) {
            self.out.push('\n');
        }
        fn input(&mut self, _request: InputRequest, _cont: Continuation) {}
        fn schedule(&mut self, cont: Continuation) {
            self.queue.push(cont);
        }
        fn finish(&mut self, outcome: &std::result::Result<(), Error>) {
            self.finished = Some(outcome.clone());
        }
    }

    fn program(code: Vec<Opcode>) -> Program {
        let lines = vec![1; code.len()];
        let mut reals = Namespace::new();
        reals.slot(&Ident::new("I"));
        Program {
            code,
            lines,
            reals,
            ..Program::default()
        }
    }

    #[test]
    fn test_time_slice_schedules() {
        let p = program(vec![
            Opcode::Literal(Val::Address(0)),
            Opcode::Jump,
        ]);
        let mut r = Runtime::new(p, Config { time_slice: 10 });
        let mut host = Collect::default();
        r.run(&mut host);
        assert!(!r.is_complete());
        assert_eq!(host.queue.len(), 1);
        let cont = host.queue.pop().unwrap();
        assert_eq!(cont.pc(), 0);
        r.resume(cont, &mut host);
        assert_eq!(host.queue.len(), 1);
    }

    #[test]
    fn test_stale_continuation_ignored() {
        let p = program(vec![
            Opcode::Literal(Val::Address(0)),
            Opcode::Jump,
        ]);
        let mut r = Runtime::new(p, Config { time_slice: 4 });
        let mut host = Collect::default();
        r.run(&mut host);
        let stale = host.queue.pop().unwrap();
        r.run(&mut host);
        r.resume(stale, &mut host);
        assert_eq!(host.queue.len(), 1);
    }

    #[test]
    fn test_error_carries_line() {
        let p = program(vec![Opcode::Return]);
        let mut r = Runtime::new(p, Config::default());
        let mut host = Collect::default();
        r.run(&mut host);
        let error = host.finished.unwrap().unwrap_err();
        assert!(error.is(ErrorCode::ReturnWithoutGosub));
        assert_eq!(error.line(), Some(1));
        assert!(r.is_complete());
    }

    #[test]
    fn test_next_without_for() {
        let p = program(vec![Opcode::Next(0), Opcode::End]);
        let mut r = Runtime::new(p, Config::default());
        let mut host = Collect::default();
        r.run(&mut host);
        let error = r.outcome().unwrap().clone().unwrap_err();
        assert!(error.is(ErrorCode::NextWithoutFor));
        assert_eq!(error.detail(), "I");
    }

    #[test]
    fn test_for_next_counts() {
        let p = program(vec![
            Opcode::Literal(Val::Integer(1)),
            Opcode::Literal(Val::Integer(3)),
            Opcode::Literal(Val::Integer(1)),
            Opcode::For(0),
            Opcode::Load(DataType::Real, 0),
            Opcode::Print,
            Opcode::Next(0),
            Opcode::Load(DataType::Real, 0),
            Opcode::Print,
            Opcode::End,
        ]);
        let mut r = Runtime::new(p, Config::default());
        let mut host = Collect::default();
        r.run(&mut host);
        assert_eq!(host.out, "1230");
        assert_eq!(host.finished, Some(Ok(())));
    }
}
