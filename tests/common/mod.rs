#![allow(dead_code)]

use basic::lang::{Error, SourceLine};
use basic::mach::{
    Address, Array, Config, Continuation, Host, InputRequest, Options, Program, Runtime, Val,
    Variables,
};
use std::collections::VecDeque;
use std::rc::Rc;

pub enum Pending {
    Resume(Continuation),
    Input(InputRequest, Continuation),
}

/// A host that records output and answers `INPUT` from a queue.
#[derive(Default)]
pub struct Script {
    pub output: String,
    pub replies: VecDeque<String>,
    pub requests: Vec<InputRequest>,
    pub pending: Option<Pending>,
    pub outcome: Option<Result<(), Error>>,
    pub finished: usize,
    pub stops: Vec<(Address, SourceLine)>,
    pub snapshots: Vec<Vec<(Rc<str>, Val)>>,
    pub array_snapshots: Vec<Vec<(Rc<str>, Array)>>,
    /// At a stop on this line, assign this variable.
    pub sets: Vec<(SourceLine, String, Val)>,
    /// At a stop on this line, continue at this address instead.
    pub jumps: Vec<(SourceLine, Address)>,
}

impl Script {
    pub fn new(replies: &[&str]) -> Script {
        Script {
            replies: replies.iter().map(|s| s.to_string()).collect(),
            ..Script::default()
        }
    }
}

impl Host for Script {
    fn print(&mut self, val: &Val) {
        self.output.push_str(&val.to_string());
    }

    fn println(&mut self) {
        self.output.push('\n');
    }

    fn input(&mut self, request: InputRequest, cont: Continuation) {
        self.requests.push(request.clone());
        self.pending = Some(Pending::Input(request, cont));
    }

    fn debug(&mut self, cont: Continuation, pc: Address, vars: &mut Variables, line: SourceLine) {
        self.stops.push((pc, line));
        self.snapshots.push(vars.snapshot());
        let arrays = vars.arrays().into_iter().map(|(name, a)| (name, a.clone())).collect();
        self.array_snapshots.push(arrays);
        for (at, name, val) in &self.sets {
            if *at == line {
                vars.set(name, val.clone()).unwrap();
            }
        }
        let jump = self.jumps.iter().find(|(at, _)| *at == line).map(|(_, addr)| *addr);
        match jump {
            Some(addr) => self.schedule(cont.jump(addr)),
            None => self.schedule(cont),
        }
    }

    fn schedule(&mut self, cont: Continuation) {
        self.pending = Some(Pending::Resume(cont));
    }

    fn finish(&mut self, outcome: &Result<(), Error>) {
        self.outcome = Some(outcome.clone());
        self.finished += 1;
    }
}

/// Resumes continuations until the run ends, input runs out, or
/// `turns` is used up. True when nothing is left pending.
pub fn drive(runtime: &mut Runtime, host: &mut Script, turns: usize) -> bool {
    for _ in 0..turns {
        match host.pending.take() {
            None => return true,
            Some(Pending::Resume(cont)) => runtime.resume(cont, host),
            Some(Pending::Input(request, cont)) => match host.replies.pop_front() {
                Some(text) => runtime.resume_with_input(cont, &text, host),
                None => {
                    host.pending = Some(Pending::Input(request, cont));
                    return false;
                }
            },
        }
    }
    host.pending.is_none()
}

pub fn compile(source: &str) -> Program {
    basic::compile(source, &Options::default()).unwrap()
}

pub fn compile_error(source: &str) -> Error {
    basic::compile(source, &Options::default()).unwrap_err()
}

pub fn runtime(source: &str) -> Runtime {
    Runtime::new(compile(source), Config::default())
}

pub fn instrumented(source: &str) -> Runtime {
    let options = Options { instrument: true };
    Runtime::new(basic::compile(source, &options).unwrap(), Config::default())
}

/// Runs `source` to completion and returns what it printed. A runtime
/// error is appended as `?ERROR`.
pub fn exec(source: &str) -> String {
    exec_with_input(source, &[])
}

pub fn exec_with_input(source: &str, replies: &[&str]) -> String {
    let mut r = runtime(source);
    let mut host = Script::new(replies);
    r.run(&mut host);
    drive(&mut r, &mut host, 100_000);
    if let Some(Err(error)) = &host.outcome {
        host.output.push_str(&format!("?{}\n", error));
    }
    host.output
}

/// Runs `source` expecting it to fail.
pub fn run_error(source: &str) -> Error {
    let mut r = runtime(source);
    let mut host = Script::new(&[]);
    r.run(&mut host);
    drive(&mut r, &mut host, 100_000);
    match host.outcome {
        Some(Err(error)) => error,
        other => panic!("expected an error, got {:?}", other),
    }
}
