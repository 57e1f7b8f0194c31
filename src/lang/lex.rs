use super::token::*;
use super::SourceLine;

/// Converts source text into a flat token sequence.
/// Each line is lexed on its own; nothing here fails.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = vec![];
    for (index, text) in source.lines().enumerate() {
        tokens.extend(BasicLexer::new(text, index + 1));
    }
    log::debug!("lexed {} tokens", tokens.len());
    tokens
}

fn is_basic_whitespace(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r'
}

fn is_basic_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_basic_alphabetic(c: char) -> bool {
    c.is_ascii_alphabetic()
}

struct BasicLexer<'a> {
    text: &'a str,
    pos: usize,
    line: SourceLine,
    first: bool,
    operand: bool,
}

impl<'a> Iterator for BasicLexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.whitespace();
        let pk = self.peek()?;
        let kind = if self.first && is_basic_digit(pk) {
            self.statement_number()
        } else if pk == '\'' {
            self.comment()
        } else if is_basic_alphabetic(pk) {
            self.alphabetic()
        } else if pk == '"' {
            self.string()
        } else {
            self.minutia()
        };
        self.first = false;
        self.operand = kind.is_operand();
        Some(Token::new(kind, self.line))
    }
}

impl<'a> BasicLexer<'a> {
    fn new(text: &'a str, line: SourceLine) -> BasicLexer<'a> {
        BasicLexer {
            text,
            pos: 0,
            line,
            first: true,
            operand: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !f(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
        &self.text[start..self.pos]
    }

    fn whitespace(&mut self) {
        self.take_while(is_basic_whitespace);
    }

    fn statement_number(&mut self) -> Kind {
        let digits = self.take_while(is_basic_digit);
        match digits.parse::<u16>() {
            Ok(n) => Kind::StatementNumber(n),
            Err(_) => Kind::Literal(Literal::Integer(digits.to_string())),
        }
    }

    fn comment(&mut self) -> Kind {
        let rest = self.rest();
        self.pos = self.text.len();
        Kind::Comment(rest.trim_end().to_string())
    }

    fn number(&mut self) -> Kind {
        let start = self.pos;
        self.take_while(is_basic_digit);
        let mut float = false;
        if self.peek() == Some('.') && self.peek_second().map_or(false, is_basic_digit) {
            float = true;
            self.bump();
            self.take_while(is_basic_digit);
        }
        let s = self.text[start..self.pos].to_string();
        if float {
            Kind::Literal(Literal::Float(s))
        } else {
            Kind::Literal(Literal::Integer(s))
        }
    }

    fn string(&mut self) -> Kind {
        self.bump();
        let s = self.take_while(|c| c != '"').to_string();
        self.bump();
        Kind::Literal(Literal::String(s))
    }

    fn alphabetic(&mut self) -> Kind {
        if let Some((len, kind)) = Kind::keyword_at(self.rest()) {
            if let Kind::Comment(_) = kind {
                return self.comment();
            }
            self.pos += len;
            return kind;
        }
        let start = self.pos;
        self.bump();
        while let Some(ch) = self.peek() {
            if !is_basic_alphabetic(ch) && !is_basic_digit(ch) {
                break;
            }
            // A keyword ends the name: `FORI=ATOB` lexes as `FOR I = A TO B`.
            if Kind::keyword_at(self.rest()).is_some() {
                break;
            }
            self.bump();
        }
        if let Some('$') | Some('%') = self.peek() {
            self.bump();
        }
        let name = self.text[start..self.pos].to_ascii_uppercase();
        Kind::Ident(Ident::new(&name))
    }

    fn minutia(&mut self) -> Kind {
        let rest = self.rest();
        if self.operand {
            for len in [2, 1].iter() {
                if let Some(op) = rest.get(..*len).and_then(Operator::for_symbol) {
                    self.pos += len;
                    return Kind::BinOp(op);
                }
            }
        }
        let ch = match self.bump() {
            Some(ch) => ch,
            None => return Kind::Unknown(String::new()),
        };
        match ch {
            '(' => Kind::LParen,
            ')' => Kind::RParen,
            ',' => Kind::Comma,
            ':' => Kind::Colon,
            ';' => Kind::Semicolon,
            '-' => Kind::UnOp(Unary::Neg),
            '+' => Kind::UnOp(Unary::Pos),
            '.' if self.peek().map_or(false, is_basic_digit) => {
                self.pos -= 1;
                self.number()
            }
            _ if is_basic_digit(ch) => {
                self.pos -= 1;
                self.number()
            }
            _ => Kind::Unknown(ch.to_string()),
        }
    }
}
