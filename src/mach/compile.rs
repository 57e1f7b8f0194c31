use super::{Function, Link, Namespace, Opcode, Program, Slot, Val};
use crate::error;
use crate::lang::ast::{self, AcceptVisitor, Command, Expression, PrintItem, Variable};
use crate::lang::token::{Operator, Unary};
use crate::lang::{DataType, Error, Ident, SourceLine};
use std::collections::HashMap;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Compiler options.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Options {
    /// Emit a `SOURCELINE` before every statement and every inlined
    /// function body so a host debugger can stop there.
    pub instrument: bool,
}

/// Lowers a linked program to bytecode.
///
/// `DATA` values are gathered into a prologue that runs first, so `READ`
/// sees every `DATA` statement regardless of where it appears. Jumps are
/// emitted with placeholder addresses and patched once every statement
/// has an address.
pub fn compile(program: &ast::Program, options: &Options) -> Result<Program> {
    let compiled = Compiler::new(options).compile(program)?;
    log::debug!(
        "compiled {} statements to {} instructions",
        program.statements.len(),
        compiled.len()
    );
    Ok(compiled)
}

#[derive(Debug, Clone)]
struct UserFunction {
    param: Ident,
    body: Expression,
    line: SourceLine,
}

/// Collects `DEF` statements ahead of code generation.
#[derive(Default)]
struct Definitions {
    line: SourceLine,
    functions: HashMap<Rc<str>, UserFunction>,
}

impl ast::Visitor for Definitions {
    fn visit_command(&mut self, command: &Command) {
        if let Command::Def(name, param, body) = command {
            self.functions.insert(
                name.name().clone(),
                UserFunction {
                    param: param.clone(),
                    body: body.clone(),
                    line: self.line,
                },
            );
        }
    }
}

struct Compiler<'a> {
    options: &'a Options,
    code: Vec<Opcode>,
    lines: Vec<SourceLine>,
    line: SourceLine,
    link: Link,
    strings: Namespace,
    integers: Namespace,
    reals: Namespace,
    arrays: Namespace,
    warnings: Vec<String>,
    functions: HashMap<Rc<str>, UserFunction>,
    expanding: Vec<Rc<str>>,
}

impl<'a> Compiler<'a> {
    fn new(options: &'a Options) -> Compiler<'a> {
        Compiler {
            options,
            code: vec![],
            lines: vec![],
            line: 0,
            link: Link::new(),
            strings: Namespace::new(),
            integers: Namespace::new(),
            reals: Namespace::new(),
            arrays: Namespace::new(),
            warnings: vec![],
            functions: HashMap::new(),
            expanding: vec![],
        }
    }

    fn compile(mut self, program: &ast::Program) -> Result<Program> {
        let mut definitions = Definitions::default();
        for statement in &program.statements {
            definitions.line = statement.line;
            statement.accept(&mut definitions);
        }
        self.functions = definitions.functions;

        for statement in &program.statements {
            self.line = statement.line;
            for command in &statement.commands {
                if let Command::Data(items) = command {
                    for item in items {
                        self.expression(item)?;
                    }
                    self.emit(Opcode::StoreData(items.len()));
                }
            }
        }

        for statement in &program.statements {
            self.line = statement.line;
            self.link.insert(statement.number, self.code.len());
            if self.options.instrument {
                self.emit(Opcode::SourceLine(statement.line));
            }
            for command in &statement.commands {
                self.command(command)?;
            }
        }
        self.line = 0;
        self.emit(Opcode::End);

        self.link.link(&mut self.code)?;
        Ok(Program {
            code: self.code,
            lines: self.lines,
            statements: self.link.into_table(),
            strings: self.strings,
            integers: self.integers,
            reals: self.reals,
            arrays: self.arrays,
            warnings: self.warnings,
        })
    }

    fn emit(&mut self, op: Opcode) {
        self.code.push(op);
        self.lines.push(self.line);
    }

    fn warn(&mut self, warning: Option<String>) {
        if let Some(warning) = warning {
            log::warn!("line {}: {}", self.line, warning);
            self.warnings.push(warning);
        }
    }

    fn slot(&mut self, ident: &Ident) -> Slot {
        let (slot, warning) = match ident.data_type() {
            DataType::String => self.strings.slot(ident),
            DataType::Integer => self.integers.slot(ident),
            DataType::Real => self.reals.slot(ident),
        };
        self.warn(warning);
        slot
    }

    fn array_slot(&mut self, ident: &Ident) -> Slot {
        let (slot, warning) = self.arrays.slot(ident);
        self.warn(warning);
        slot
    }

    fn store(&mut self, ident: &Ident) {
        let slot = self.slot(ident);
        self.emit(Opcode::Store(ident.data_type(), slot));
    }

    fn jump(&mut self, target: &ast::Target, op: Opcode) -> Result<()> {
        if target.index.is_none() {
            return Err(error!(InternalError, self.line; "UNLINKED TARGET"));
        }
        self.link
            .link_addr_to_statement(self.code.len(), target.number, self.line);
        self.emit(Opcode::Literal(Val::Address(0)));
        self.emit(op);
        Ok(())
    }

    fn subscripts(&mut self, indices: &[Expression]) -> Result<()> {
        for index in indices {
            self.expression(index)?;
        }
        self.emit(Opcode::Literal(Val::Integer(indices.len() as i16)));
        Ok(())
    }

    fn command(&mut self, command: &Command) -> Result<()> {
        match command {
            Command::Let(Variable::Unary(ident), expr) => {
                self.expression(expr)?;
                self.store(ident);
            }
            Command::Let(Variable::Array(ident, indices), expr) => {
                self.subscripts(indices)?;
                self.expression(expr)?;
                let slot = self.array_slot(ident);
                self.emit(Opcode::StoreArr(ident.data_type(), slot));
            }
            Command::Goto(target) => self.jump(target, Opcode::Jump)?,
            Command::GoSub(target) => self.jump(target, Opcode::Call)?,
            Command::If(predicate, target) => {
                self.expression(predicate)?;
                self.jump(target, Opcode::JumpIf)?;
            }
            Command::Return => self.emit(Opcode::Return),
            Command::End | Command::Stop => self.emit(Opcode::End),
            Command::Input(prompt, vars) => {
                self.emit(Opcode::Literal(Val::String(prompt.clone())));
                let types: Rc<[DataType]> = vars.iter().map(|v| v.data_type()).collect();
                self.emit(Opcode::Input(types));
                for var in vars.iter().rev() {
                    self.store(var);
                }
            }
            Command::Print(items, newline) => {
                for item in items {
                    match item {
                        PrintItem::Expression(expr) => self.expression(expr)?,
                        PrintItem::Tab => self.emit(Opcode::Literal(Val::String("\t".into()))),
                    }
                    self.emit(Opcode::Print);
                }
                if *newline {
                    self.emit(Opcode::PrintLn);
                }
            }
            Command::Dim(ident, bounds) => {
                self.subscripts(bounds)?;
                let slot = self.array_slot(ident);
                self.emit(Opcode::DimArr(ident.data_type(), slot));
            }
            Command::Def(..) | Command::Data(_) => {}
            Command::Read(vars) => {
                self.emit(Opcode::ReadData(vars.len()));
                for var in vars.iter().rev() {
                    self.store(var);
                }
            }
            Command::Restore => self.emit(Opcode::Restore),
            Command::For(f) => {
                self.expression(&f.init)?;
                self.expression(&f.to)?;
                match &f.step {
                    Some(step) => self.expression(step)?,
                    None => self.emit(Opcode::Literal(Val::Integer(1))),
                }
                let slot = self.slot(&f.var);
                self.emit(Opcode::For(slot));
            }
            Command::Next(ident) => {
                let slot = self.slot(ident);
                self.emit(Opcode::Next(slot));
            }
            Command::Evaluate(expr) => {
                self.expression(expr)?;
                self.emit(Opcode::Pop);
            }
        }
        Ok(())
    }

    fn expression(&mut self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Integer(n) => self.emit(Opcode::Literal(Val::Integer(*n))),
            Expression::Real(n) => self.emit(Opcode::Literal(Val::Real(*n))),
            Expression::String(s) => self.emit(Opcode::Literal(Val::String(s.clone()))),
            Expression::Variable(ident) => {
                let slot = self.slot(ident);
                self.emit(Opcode::Load(ident.data_type(), slot));
            }
            Expression::Unary(op, expr) => {
                self.expression(expr)?;
                match op {
                    Unary::Neg => self.emit(Opcode::Neg),
                    Unary::Not => self.emit(Opcode::Not),
                    Unary::Pos => {}
                }
            }
            Expression::Binary(op, lhs, rhs) => {
                self.expression(lhs)?;
                self.expression(rhs)?;
                self.emit(Compiler::binary_opcode(*op));
            }
            Expression::Call(name, args) => self.call(name, args)?,
            Expression::Index(name, indices) => self.load_array(name, indices)?,
        }
        Ok(())
    }

    fn binary_opcode(op: Operator) -> Opcode {
        use Operator::*;
        match op {
            Pow => Opcode::Pow,
            Mul => Opcode::Mul,
            Div => Opcode::Div,
            Mod => Opcode::Mod,
            Add => Opcode::Add,
            Sub => Opcode::Sub,
            Eq => Opcode::Eq,
            NotEq => Opcode::NotEq,
            Lt => Opcode::Lt,
            LtEq => Opcode::LtEq,
            Gt => Opcode::Gt,
            GtEq => Opcode::GtEq,
            And => Opcode::And,
            Or => Opcode::Or,
        }
    }

    fn load_array(&mut self, name: &Ident, indices: &[Expression]) -> Result<()> {
        self.subscripts(indices)?;
        let slot = self.array_slot(name);
        self.emit(Opcode::LoadArr(name.data_type(), slot));
        Ok(())
    }

    /// Built-in, then user function. Arrays never get here: the parser
    /// turns a name it has seen dimensioned or assigned into an index.
    fn call(&mut self, name: &Ident, args: &[Expression]) -> Result<()> {
        if let Some((opcode, arity)) = Function::opcode_and_arity(name.name()) {
            if !arity.contains(&args.len()) {
                return Err(error!(IllegalFunctionCall, self.line; "WRONG NUMBER OF ARGUMENTS"));
            }
            for arg in args {
                self.expression(arg)?;
            }
            self.emit(opcode);
            return Ok(());
        }
        if let Some(function) = self.functions.get(name.name()).cloned() {
            return self.user_call(name, &function, args);
        }
        Err(error!(UndefinedUserFunction, self.line; name.name()))
    }

    /// Inlines the body. The parameter's previous value waits on the
    /// stack underneath and is restored afterwards.
    fn user_call(&mut self, name: &Ident, function: &UserFunction, args: &[Expression]) -> Result<()> {
        if args.len() != 1 {
            return Err(error!(IllegalFunctionCall, self.line; "WRONG NUMBER OF ARGUMENTS"));
        }
        if self.expanding.contains(name.name()) {
            return Err(
                error!(IllegalFunctionCall, self.line; &format!("RECURSIVE FUNCTION {}", name)),
            );
        }
        self.expression(&args[0])?;
        let data_type = function.param.data_type();
        let slot = self.slot(&function.param);
        self.emit(Opcode::Load(data_type, slot));
        self.emit(Opcode::Swap);
        self.emit(Opcode::Store(data_type, slot));

        let call_line = self.line;
        self.line = function.line;
        self.expanding.push(name.name().clone());
        if self.options.instrument {
            self.emit(Opcode::SourceLine(function.line));
        }
        self.expression(&function.body)?;
        self.expanding.pop();
        self.line = call_line;

        self.emit(Opcode::Swap);
        self.emit(Opcode::Store(data_type, slot));
        Ok(())
    }
}
