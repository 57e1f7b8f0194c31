use ansi_term::Style;
use basic::lang::{Error, Ident, SourceLine, StatementNumber};
use basic::mach::{
    Address, Config, Continuation, Host, InputRequest, Program, Runtime, Val, Variables,
};
use linefeed::{DefaultTerminal, Interface, ReadResult, Signal};
use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Prints a compile or runtime error in bold.
pub fn report(error: &Error) {
    eprintln!("{}", Style::new().bold().paint(error.to_string()));
}

/// Runs `program` on the terminal until it ends, fails, is interrupted
/// or the debugger quits. Returns false unless the program reached `END`.
pub fn run(program: Program, config: Config, debug: bool) -> io::Result<bool> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let int_moved = interrupted.clone();
    if let Err(error) = ctrlc::set_handler(move || {
        int_moved.store(true, Ordering::SeqCst);
    }) {
        log::warn!("Ctrl-C handler not installed: {}", error);
    }

    let mut host = Terminal::new(&program, debug)?;
    let mut runtime = Runtime::new(program, config);
    runtime.run(&mut host);

    while let Some(pending) = host.pending.take() {
        if interrupted.swap(false, Ordering::SeqCst) {
            host.interrupt(runtime.program(), runtime.pc());
            break;
        }
        match pending {
            Pending::Resume(cont) => runtime.resume(cont, &mut host),
            Pending::Input(request, cont) => {
                let prompt = host.input_prompt(&request);
                host.interface.set_prompt(&prompt)?;
                match host.interface.read_line()? {
                    ReadResult::Input(text) => {
                        host.interface.add_history_unique(text.clone());
                        runtime.resume_with_input(cont, &text, &mut host);
                    }
                    ReadResult::Signal(_) | ReadResult::Eof => {
                        host.interrupt(runtime.program(), runtime.pc());
                        break;
                    }
                }
            }
        }
    }
    host.flush();
    Ok(matches!(runtime.outcome(), Some(Ok(()))))
}

enum Pending {
    Resume(Continuation),
    Input(InputRequest, Continuation),
}

/// ## Terminal host
///
/// Output is held until a newline so a partial line can become the
/// start of an `INPUT` prompt.
struct Terminal {
    interface: Interface<DefaultTerminal>,
    line: String,
    pending: Option<Pending>,
    statements: Vec<(StatementNumber, Address)>,
    breakpoints: HashSet<StatementNumber>,
    stepping: bool,
}

impl Terminal {
    fn new(program: &Program, debug: bool) -> io::Result<Terminal> {
        let interface = Interface::new("BASIC")?;
        interface.set_report_signal(Signal::Interrupt, true);
        Ok(Terminal {
            interface,
            line: String::new(),
            pending: None,
            statements: program.statements().to_vec(),
            breakpoints: HashSet::new(),
            stepping: debug,
        })
    }

    fn write(&self, s: &str) {
        if let Err(error) = self.interface.write_fmt(format_args!("{}", s)) {
            log::error!("terminal write failed: {}", error);
        }
    }

    fn flush(&mut self) {
        if !self.line.is_empty() {
            let line = std::mem::take(&mut self.line);
            self.write(&line);
            self.write("\n");
        }
    }

    fn input_prompt(&mut self, request: &InputRequest) -> String {
        if request.is_retry() {
            self.write("?REENTER\n");
        }
        let mut prompt = std::mem::take(&mut self.line);
        prompt.push_str(request.prompt());
        prompt.push_str("? ");
        prompt
    }

    fn interrupt(&mut self, program: &Program, pc: Address) {
        self.flush();
        let message = match program.statement_for(pc) {
            Some(number) => format!("BREAK IN {}", number),
            None => "BREAK".to_string(),
        };
        self.write(&format!("{}\n", Style::new().bold().paint(message)));
    }

    fn statement_for(&self, pc: Address) -> Option<StatementNumber> {
        self.statements
            .iter()
            .rev()
            .find(|(_, addr)| *addr < pc)
            .map(|(number, _)| *number)
    }

    fn read_command(&self, prompt: &str) -> Option<String> {
        if let Err(error) = self.interface.set_prompt(prompt) {
            log::error!("{}", error);
            return None;
        }
        match self.interface.read_line() {
            Ok(ReadResult::Input(text)) => {
                self.interface.add_history_unique(text.clone());
                Some(text)
            }
            Ok(_) => None,
            Err(error) => {
                log::error!("{}", error);
                None
            }
        }
    }

    /// The line debugger. Returns true to keep running.
    fn debugger(&mut self, vars: &mut Variables, number: Option<StatementNumber>, line: SourceLine) -> bool {
        match number {
            Some(number) => self.write(&format!("AT {} (LINE {})\n", number, line)),
            None => self.write(&format!("AT LINE {}\n", line)),
        }
        loop {
            let text = match self.read_command("DEBUG> ") {
                Some(text) => text,
                None => return false,
            };
            let mut words = text.split_whitespace();
            match words.next().map(|w| w.to_ascii_lowercase()).as_deref() {
                None | Some("s") | Some("step") => {
                    self.stepping = true;
                    return true;
                }
                Some("c") | Some("continue") => {
                    self.stepping = false;
                    return true;
                }
                Some("q") | Some("quit") => return false,
                Some("b") | Some("break") => match words.next().map(str::parse::<StatementNumber>) {
                    Some(Ok(number)) => {
                        self.breakpoints.insert(number);
                    }
                    _ => self.write("?BREAK WHICH STATEMENT\n"),
                },
                Some("p") | Some("print") => match words.next() {
                    Some(name) => match (vars.get(name), vars.array(name)) {
                        (Some(val), _) => self.write(&format!("{} = {}\n", name.to_ascii_uppercase(), val)),
                        (None, Some(array)) => {
                            self.write(&format!("{}() = {}\n", name.to_ascii_uppercase(), array))
                        }
                        (None, None) => self.write(&format!("?NO VARIABLE {}\n", name.to_ascii_uppercase())),
                    },
                    None => self.write("?PRINT WHICH VARIABLE\n"),
                },
                Some("set") => {
                    let name = words.next().unwrap_or_default();
                    let rest: Vec<&str> = words.collect();
                    self.set(vars, name, &rest.join(" "));
                }
                Some("v") | Some("vars") => {
                    for (name, val) in vars.snapshot() {
                        match val {
                            Val::String(s) => self.write(&format!("{} = \"{}\"\n", name, s)),
                            val => self.write(&format!("{} = {}\n", name, val)),
                        }
                    }
                    for (name, array) in vars.arrays() {
                        self.write(&format!("{}() = {}\n", name, array));
                    }
                }
                Some(_) => self.write("?STEP CONTINUE BREAK N PRINT NAME SET NAME VALUE VARS QUIT\n"),
            }
        }
    }

    fn set(&mut self, vars: &mut Variables, name: &str, value: &str) {
        if name.is_empty() {
            self.write("?SET WHICH VARIABLE\n");
            return;
        }
        let ident = Ident::new(&name.to_ascii_uppercase());
        let request = InputRequest::new("".into(), vec![ident.data_type()].into());
        match request.parse(value).and_then(|mut vals| vals.pop()) {
            Some(val) => {
                if let Err(error) = vars.set(name, val) {
                    self.write(&format!("{}\n", error));
                }
            }
            None => self.write("?REENTER\n"),
        }
    }
}

impl Host for Terminal {
    fn print(&mut self, val: &Val) {
        let s = val.to_string();
        match s.rfind('\n') {
            Some(i) => {
                self.line.push_str(&s[..=i]);
                let line = std::mem::take(&mut self.line);
                self.write(&line);
                self.line.push_str(&s[i + 1..]);
            }
            None => self.line.push_str(&s),
        }
    }

    fn println(&mut self) {
        self.line.push('\n');
        let line = std::mem::take(&mut self.line);
        self.write(&line);
    }

    fn input(&mut self, request: InputRequest, cont: Continuation) {
        self.pending = Some(Pending::Input(request, cont));
    }

    fn debug(&mut self, cont: Continuation, pc: Address, vars: &mut Variables, line: SourceLine) {
        let number = self.statement_for(pc);
        let stop = self.stepping || number.map_or(false, |n| self.breakpoints.contains(&n));
        if !stop {
            return self.schedule(cont);
        }
        self.flush();
        if self.debugger(vars, number, line) {
            self.schedule(cont);
        }
    }

    fn schedule(&mut self, cont: Continuation) {
        self.pending = Some(Pending::Resume(cont));
    }

    fn finish(&mut self, outcome: &Result<(), Error>) {
        self.flush();
        if let Err(error) = outcome {
            self.write(&format!("{}\n", Style::new().bold().paint(error.to_string())));
        }
    }
}
