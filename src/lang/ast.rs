use super::token::{Operator, Unary};
use super::{Ident, SourceLine, StatementNumber};
use std::collections::HashMap;
use std::rc::Rc;

/// Statements in program order plus the statement number mappings.
/// The mappings are empty until the program is linked.
#[derive(Debug, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub number_to_index: HashMap<StatementNumber, usize>,
    pub index_to_number: Vec<StatementNumber>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Program {
        Program {
            statements,
            ..Program::default()
        }
    }

    pub fn index_of(&self, number: StatementNumber) -> Option<usize> {
        self.number_to_index.get(&number).copied()
    }

    pub fn number_of(&self, index: usize) -> Option<StatementNumber> {
        self.index_to_number.get(index).copied()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Statement {
    pub line: SourceLine,
    pub number: StatementNumber,
    pub commands: Vec<Command>,
}

/// A jump destination. `index` is filled in by the linker.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Target {
    pub number: StatementNumber,
    pub index: Option<usize>,
}

impl Target {
    pub fn new(number: StatementNumber) -> Target {
        Target {
            number,
            index: None,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Command {
    Let(Variable, Expression),
    Goto(Target),
    GoSub(Target),
    Return,
    End,
    Stop,
    If(Expression, Target),
    Input(Rc<str>, Vec<Ident>),
    /// Items and whether a newline follows.
    Print(Vec<PrintItem>, bool),
    Dim(Ident, Vec<Expression>),
    /// Function name, parameter, body.
    Def(Ident, Ident, Expression),
    Data(Vec<Expression>),
    Read(Vec<Ident>),
    Restore,
    For(For),
    Next(Ident),
    /// A bare call or array access; the value is discarded.
    Evaluate(Expression),
}

impl Command {
    pub fn target_mut(&mut self) -> Option<&mut Target> {
        match self {
            Command::Goto(target) | Command::GoSub(target) | Command::If(_, target) => Some(target),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct For {
    pub var: Ident,
    pub init: Expression,
    pub to: Expression,
    pub step: Option<Expression>,
    /// Source line of the matching NEXT.
    pub exit: SourceLine,
}

#[derive(Debug, PartialEq, Clone)]
pub enum PrintItem {
    Expression(Expression),
    /// A comma between items.
    Tab,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Variable {
    Unary(Ident),
    Array(Ident, Vec<Expression>),
}

impl Variable {
    pub fn ident(&self) -> &Ident {
        match self {
            Variable::Unary(ident) | Variable::Array(ident, _) => ident,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Integer(i16),
    Real(f64),
    String(Rc<str>),
    Variable(Ident),
    Unary(Unary, Box<Expression>),
    Binary(Operator, Box<Expression>, Box<Expression>),
    /// Built-in or user function.
    Call(Ident, Vec<Expression>),
    Index(Ident, Vec<Expression>),
}

pub trait Visitor {
    fn visit_command(&mut self, _: &Command) {}
    fn visit_variable(&mut self, _: &Variable) {}
    fn visit_ident(&mut self, _: &Ident) {}
    fn visit_expression(&mut self, _: &Expression) {}
}

pub trait AcceptVisitor {
    fn accept<V: Visitor>(&self, visitor: &mut V);
}

impl AcceptVisitor for Ident {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        visitor.visit_ident(self)
    }
}

impl AcceptVisitor for Variable {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        match self {
            Variable::Unary(ident) => ident.accept(visitor),
            Variable::Array(ident, vec_expr) => {
                ident.accept(visitor);
                for expr in vec_expr {
                    expr.accept(visitor);
                }
            }
        }
        visitor.visit_variable(self)
    }
}

impl AcceptVisitor for Statement {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        for command in &self.commands {
            command.accept(visitor);
        }
    }
}

impl AcceptVisitor for Command {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        use Command::*;
        match self {
            Goto(_) | GoSub(_) | Return | End | Stop | Restore => {}
            Let(var, expr) => {
                var.accept(visitor);
                expr.accept(visitor);
            }
            If(expr, _) | Evaluate(expr) => expr.accept(visitor),
            Input(_, vec_ident) | Read(vec_ident) => {
                for ident in vec_ident {
                    ident.accept(visitor);
                }
            }
            Print(items, _) => {
                for item in items {
                    if let PrintItem::Expression(expr) = item {
                        expr.accept(visitor);
                    }
                }
            }
            Dim(ident, vec_expr) => {
                ident.accept(visitor);
                for expr in vec_expr {
                    expr.accept(visitor);
                }
            }
            Def(_, param, body) => {
                param.accept(visitor);
                body.accept(visitor);
            }
            Data(vec_expr) => {
                for expr in vec_expr {
                    expr.accept(visitor);
                }
            }
            For(f) => {
                f.var.accept(visitor);
                f.init.accept(visitor);
                f.to.accept(visitor);
                if let Some(step) = &f.step {
                    step.accept(visitor);
                }
            }
            Next(ident) => ident.accept(visitor),
        }
        visitor.visit_command(self)
    }
}

impl AcceptVisitor for Expression {
    fn accept<V: Visitor>(&self, visitor: &mut V) {
        use Expression::*;
        match self {
            Integer(_) | Real(_) | String(_) => {}
            Variable(ident) => ident.accept(visitor),
            Unary(_, expr) => expr.accept(visitor),
            Binary(_, lhs, rhs) => {
                lhs.accept(visitor);
                rhs.accept(visitor);
            }
            // Function names live outside the variable namespaces.
            Call(_, vec_expr) => {
                for expr in vec_expr {
                    expr.accept(visitor);
                }
            }
            Index(ident, vec_expr) => {
                ident.accept(visitor);
                for expr in vec_expr {
                    expr.accept(visitor);
                }
            }
        }
        visitor.visit_expression(self)
    }
}
