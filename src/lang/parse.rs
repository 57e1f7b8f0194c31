use super::{ast::*, token::*, Error, Ident, SourceLine};
use crate::error;
use std::collections::HashSet;

type Result<T> = std::result::Result<T, Error>;

/// Builds an unlinked program from tokens, one statement per source line.
pub fn parse(tokens: &[Token]) -> Result<Program> {
    let statements = Parser::parse(tokens)?;
    log::debug!("parsed {} statements", statements.len());
    Ok(Program::new(statements))
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    line: SourceLine,
    arrays: HashSet<Ident>,
}

impl<'a> Parser<'a> {
    fn parse(tokens: &'a [Token]) -> Result<Vec<Statement>> {
        let mut parse = Parser {
            tokens,
            pos: 0,
            line: 0,
            arrays: HashSet::new(),
        };
        let mut r: Vec<Statement> = vec![];
        while parse.pos < parse.tokens.len() {
            r.push(parse.statement()?);
        }
        Ok(r)
    }

    /// Next token on the current line. A comment ends the line.
    fn next(&mut self) -> Option<&'a Token> {
        let t = self.peek()?;
        self.pos += 1;
        Some(t)
    }

    fn peek(&self) -> Option<&'a Token> {
        let t = self.tokens.get(self.pos)?;
        if t.line != self.line {
            return None;
        }
        if let Kind::Comment(_) = t.kind {
            return None;
        }
        Some(t)
    }

    fn peek_kind(&self) -> Option<&'a Kind> {
        self.peek().map(|t| &t.kind)
    }

    fn unexpected(&self, t: Option<&Token>) -> Error {
        match t {
            Some(t) => error!(SyntaxError, self.line; &format!("UNEXPECTED {}", t)),
            None => error!(SyntaxError, self.line; "UNEXPECTED END OF LINE"),
        }
    }

    fn statement(&mut self) -> Result<Statement> {
        let tokens = self.tokens;
        let first = &tokens[self.pos];
        self.line = first.line;
        self.pos += 1;
        let number = match first.kind {
            Kind::StatementNumber(n) => n,
            _ => {
                return Err(
                    error!(SyntaxError, self.line; &format!("EXPECTED STATEMENT NUMBER, FOUND {}", first)),
                )
            }
        };
        let mut commands = vec![];
        if self.peek().is_none() && !self.at_comment() {
            return Err(error!(SyntaxError, self.line; "EXPECTED STATEMENT"));
        }
        while self.peek().is_some() {
            self.command(&mut commands)?;
            match self.peek_kind() {
                Some(Kind::Colon) => {
                    self.next();
                }
                _ => break,
            }
        }
        if self.at_comment() {
            self.pos += 1;
        }
        if let Some(t) = self.peek() {
            return Err(self.unexpected(Some(t)));
        }
        Ok(Statement {
            line: self.line,
            number,
            commands,
        })
    }

    fn at_comment(&self) -> bool {
        match self.tokens.get(self.pos) {
            Some(Token {
                kind: Kind::Comment(_),
                line,
            }) => *line == self.line,
            _ => false,
        }
    }

    fn command(&mut self, commands: &mut Vec<Command>) -> Result<()> {
        let t = match self.next() {
            Some(t) => t,
            None => return Err(self.unexpected(None)),
        };
        use Word::*;
        let command = match &t.kind {
            Kind::Ident(_) => {
                self.pos -= 1;
                self.r#let()?
            }
            Kind::Word(word) => match word {
                Let => self.r#let()?,
                Goto => Command::Goto(self.target()?),
                Gosub => Command::GoSub(self.target()?),
                Return => Command::Return,
                End => Command::End,
                Stop => Command::Stop,
                Restore => Command::Restore,
                If => self.r#if()?,
                Print => self.r#print()?,
                Input => self.r#input()?,
                For => self.r#for()?,
                Next => Command::Next(self.real_ident()?),
                Def => self.r#def()?,
                Read => Command::Read(self.ident_list()?),
                Data => self.r#data()?,
                Dim => return self.r#dim(commands),
                Then | Step | To => return Err(self.unexpected(Some(t))),
            },
            _ => return Err(self.unexpected(Some(t))),
        };
        commands.push(command);
        Ok(())
    }

    fn expect(&mut self, kind: Kind) -> Result<()> {
        match self.next() {
            Some(t) if t.kind == kind => Ok(()),
            Some(t) => Err(error!(SyntaxError, self.line; &format!("EXPECTED {}, FOUND {}", kind, t))),
            None => Err(error!(SyntaxError, self.line; &format!("EXPECTED {}", kind))),
        }
    }

    fn ident(&mut self) -> Result<Ident> {
        match self.next() {
            Some(Token {
                kind: Kind::Ident(i),
                ..
            }) => Ok(i.clone()),
            Some(t) => Err(error!(SyntaxError, self.line; &format!("EXPECTED VARIABLE, FOUND {}", t))),
            None => Err(error!(SyntaxError, self.line; "EXPECTED VARIABLE")),
        }
    }

    fn real_ident(&mut self) -> Result<Ident> {
        let ident = self.ident()?;
        match ident {
            Ident::Real(_) => Ok(ident),
            _ => Err(error!(SyntaxError, self.line; &format!("EXPECTED REAL VARIABLE, FOUND {}", ident))),
        }
    }

    fn ident_list(&mut self) -> Result<Vec<Ident>> {
        let mut v = vec![self.ident()?];
        while let Some(Kind::Comma) = self.peek_kind() {
            self.next();
            v.push(self.ident()?);
        }
        Ok(v)
    }

    fn target(&mut self) -> Result<Target> {
        if let Some(Token {
            kind: Kind::Literal(Literal::Integer(s)),
            ..
        }) = self.peek()
        {
            if let Ok(n) = s.parse() {
                self.next();
                return Ok(Target::new(n));
            }
        }
        let found = self.next();
        Err(match found {
            Some(t) => error!(SyntaxError, self.line; &format!("EXPECTED STATEMENT NUMBER, FOUND {}", t)),
            None => error!(SyntaxError, self.line; "EXPECTED STATEMENT NUMBER"),
        })
    }

    fn expression(&mut self) -> Result<Expression> {
        fn parse(this: &mut Parser, precedence: usize) -> Result<Expression> {
            let mut lhs = this.term()?;
            while let Some(Kind::BinOp(op)) = this.peek_kind() {
                let op_precedence = Parser::op_precedence(*op);
                if op_precedence < precedence {
                    break;
                }
                this.next();
                let rhs = parse(this, op_precedence + 1)?;
                lhs = Expression::Binary(*op, Box::new(lhs), Box::new(rhs));
            }
            Ok(lhs)
        }
        parse(self, 0)
    }

    fn op_precedence(op: Operator) -> usize {
        use Operator::*;
        match op {
            Eq => 3,
            Or => 4,
            And => 5,
            Lt | LtEq | Gt | GtEq | NotEq => 6,
            Add | Sub => 8,
            Mul | Div | Mod => 9,
            Pow => 10,
        }
    }

    fn term(&mut self) -> Result<Expression> {
        let t = match self.next() {
            Some(t) => t,
            None => return Err(error!(SyntaxError, self.line; "EXPECTED EXPRESSION")),
        };
        match &t.kind {
            Kind::LParen => {
                let expr = self.expression()?;
                self.expect(Kind::RParen)?;
                Ok(expr)
            }
            Kind::UnOp(op) => Ok(Expression::Unary(*op, Box::new(self.term()?))),
            Kind::Literal(lit) => self.literal(lit),
            Kind::Ident(i) => {
                if let Some(Kind::LParen) = self.peek_kind() {
                    let args = self.expression_list()?;
                    if self.arrays.contains(i) {
                        Ok(Expression::Index(i.clone(), args))
                    } else {
                        Ok(Expression::Call(i.clone(), args))
                    }
                } else {
                    Ok(Expression::Variable(i.clone()))
                }
            }
            _ => Err(error!(SyntaxError, self.line; &format!("EXPECTED EXPRESSION, FOUND {}", t))),
        }
    }

    fn literal(&self, lit: &Literal) -> Result<Expression> {
        match lit {
            Literal::Integer(s) => match s.parse::<i16>() {
                Ok(n) => Ok(Expression::Integer(n)),
                Err(_) => self.real(s),
            },
            Literal::Float(s) => self.real(s),
            Literal::String(s) => Ok(Expression::String(s.as_str().into())),
        }
    }

    fn real(&self, s: &str) -> Result<Expression> {
        match s.parse::<f64>() {
            Ok(n) => Ok(Expression::Real(n)),
            Err(_) => Err(error!(SyntaxError, self.line; &format!("INVALID NUMBER {}", s))),
        }
    }

    fn expression_list(&mut self) -> Result<Vec<Expression>> {
        self.expect(Kind::LParen)?;
        let mut v: Vec<Expression> = vec![];
        loop {
            v.push(self.expression()?);
            match self.next() {
                Some(Token {
                    kind: Kind::RParen, ..
                }) => return Ok(v),
                Some(Token {
                    kind: Kind::Comma, ..
                }) => continue,
                t => return Err(self.unexpected(t)),
            }
        }
    }

    fn r#let(&mut self) -> Result<Command> {
        let ident = self.ident()?;
        if let Some(Kind::LParen) = self.peek_kind() {
            let args = self.expression_list()?;
            if let Some(Kind::BinOp(Operator::Eq)) = self.peek_kind() {
                self.next();
                self.arrays.insert(ident.clone());
                let expr = self.expression()?;
                return Ok(Command::Let(Variable::Array(ident, args), expr));
            }
            if self.arrays.contains(&ident) {
                return Ok(Command::Evaluate(Expression::Index(ident, args)));
            }
            return Ok(Command::Evaluate(Expression::Call(ident, args)));
        }
        self.expect(Kind::BinOp(Operator::Eq))?;
        let expr = self.expression()?;
        Ok(Command::Let(Variable::Unary(ident), expr))
    }

    fn r#if(&mut self) -> Result<Command> {
        let predicate = self.expression()?;
        match self.next() {
            Some(Token {
                kind: Kind::Word(Word::Then),
                ..
            })
            | Some(Token {
                kind: Kind::Word(Word::Goto),
                ..
            }) => {}
            Some(t) => return Err(error!(SyntaxError, self.line; &format!("EXPECTED THEN, FOUND {}", t))),
            None => return Err(error!(SyntaxError, self.line; "EXPECTED THEN")),
        }
        Ok(Command::If(predicate, self.target()?))
    }

    fn r#print(&mut self) -> Result<Command> {
        let mut items: Vec<PrintItem> = vec![];
        let mut newline = true;
        loop {
            match self.peek_kind() {
                None | Some(Kind::Colon) => return Ok(Command::Print(items, newline)),
                Some(Kind::Semicolon) => {
                    newline = false;
                    self.next();
                }
                Some(Kind::Comma) => {
                    newline = false;
                    self.next();
                    items.push(PrintItem::Tab);
                }
                _ => {
                    newline = true;
                    items.push(PrintItem::Expression(self.expression()?));
                }
            }
        }
    }

    fn r#input(&mut self) -> Result<Command> {
        let mut prompt = String::new();
        if let Some(Kind::Literal(Literal::String(s))) = self.peek_kind() {
            prompt.push_str(s);
            self.next();
            match self.peek_kind() {
                Some(Kind::Semicolon) | Some(Kind::Comma) => {
                    self.next();
                }
                _ => {}
            }
        }
        Ok(Command::Input(prompt.as_str().into(), self.ident_list()?))
    }

    fn r#def(&mut self) -> Result<Command> {
        let name = self.ident()?;
        self.expect(Kind::LParen)?;
        let param = self.ident()?;
        self.expect(Kind::RParen)?;
        self.expect(Kind::BinOp(Operator::Eq))?;
        let body = self.expression()?;
        Ok(Command::Def(name, param, body))
    }

    fn r#dim(&mut self, commands: &mut Vec<Command>) -> Result<()> {
        loop {
            let ident = self.ident()?;
            let bounds = self.expression_list()?;
            self.arrays.insert(ident.clone());
            commands.push(Command::Dim(ident, bounds));
            match self.peek_kind() {
                Some(Kind::Comma) => {
                    self.next();
                }
                _ => return Ok(()),
            }
        }
    }

    fn r#data(&mut self) -> Result<Command> {
        let mut v = vec![self.datum()?];
        while let Some(Kind::Comma) = self.peek_kind() {
            self.next();
            v.push(self.datum()?);
        }
        Ok(Command::Data(v))
    }

    /// A literal with an optional sign.
    fn datum(&mut self) -> Result<Expression> {
        let negate = match self.peek_kind() {
            Some(Kind::UnOp(Unary::Neg)) => {
                self.next();
                true
            }
            Some(Kind::UnOp(Unary::Pos)) => {
                self.next();
                false
            }
            _ => false,
        };
        let expr = match self.next() {
            Some(Token {
                kind: Kind::Literal(lit),
                ..
            }) => self.literal(lit)?,
            t => return Err(self.unexpected(t)),
        };
        if !negate {
            return Ok(expr);
        }
        match expr {
            Expression::Integer(n) => Ok(Expression::Integer(-n)),
            Expression::Real(n) => Ok(Expression::Real(-n)),
            _ => Err(error!(SyntaxError, self.line; "EXPECTED NUMBER")),
        }
    }

    fn r#for(&mut self) -> Result<Command> {
        let var = self.real_ident()?;
        self.expect(Kind::BinOp(Operator::Eq))?;
        let init = self.expression()?;
        self.expect(Kind::Word(Word::To))?;
        let to = self.expression()?;
        let mut step = None;
        if let Some(Kind::Word(Word::Step)) = self.peek_kind() {
            self.next();
            step = Some(self.expression()?);
        }
        let exit = self.find_next(&var)?;
        Ok(Command::For(For {
            var,
            init,
            to,
            step,
            exit,
        }))
    }

    /// Scans ahead for the NEXT closing the loop on `var` without
    /// consuming anything. A NEXT naming `var`, or naming an enclosing
    /// loop's variable, closes it.
    fn find_next(&self, var: &Ident) -> Result<SourceLine> {
        let mut depth = 0;
        let mut iter = self.tokens[self.pos..].iter().peekable();
        while let Some(t) = iter.next() {
            match t.kind {
                Kind::Word(Word::For) => depth += 1,
                Kind::Word(Word::Next) => {
                    let named = match iter.peek() {
                        Some(Token {
                            kind: Kind::Ident(i),
                            ..
                        }) => i == var,
                        _ => false,
                    };
                    if named || depth == 0 {
                        return Ok(t.line);
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        Err(error!(ForWithoutNext, self.line; &format!("FOR {}", var)))
    }
}
