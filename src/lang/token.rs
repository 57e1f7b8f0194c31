pub use super::ident::Ident;
use super::{SourceLine, StatementNumber};

/// One lexeme, tagged with the source line it came from.
#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: Kind,
    pub line: SourceLine,
}

impl Token {
    pub fn new(kind: Kind, line: SourceLine) -> Token {
        Token { kind, line }
    }

    pub fn text(&self) -> String {
        self.kind.to_string()
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Kind {
    /// Sentinel for a character the lexer does not recognize.
    Unknown(String),
    StatementNumber(StatementNumber),
    Literal(Literal),
    Word(Word),
    BinOp(Operator),
    UnOp(Unary),
    Ident(Ident),
    /// `REM` or `'` and the rest of the line, verbatim.
    Comment(String),
    LParen,
    RParen,
    Comma,
    Colon,
    Semicolon,
}

impl Kind {
    /// Reserved words, longest first so that a prefix never shadows a
    /// longer keyword.
    const KEYWORDS: [&'static str; 22] = [
        "RESTORE", "RETURN", "GOSUB", "INPUT", "PRINT", "GOTO", "DATA", "NEXT", "READ", "STEP",
        "STOP", "THEN", "AND", "DEF", "DIM", "END", "FOR", "LET", "NOT", "REM", "IF", "OR",
    ];

    /// Matches a reserved word at the start of `s`, ignoring case.
    pub fn keyword_at(s: &str) -> Option<(usize, Kind)> {
        for word in Kind::KEYWORDS.iter() {
            if let Some(prefix) = s.get(..word.len()) {
                if prefix.eq_ignore_ascii_case(word) {
                    return Some((word.len(), Kind::for_keyword(word)));
                }
            }
        }
        None
    }

    fn for_keyword(s: &str) -> Kind {
        use Word::*;
        match s {
            "AND" => Kind::BinOp(Operator::And),
            "OR" => Kind::BinOp(Operator::Or),
            "NOT" => Kind::UnOp(Unary::Not),
            "REM" => Kind::Comment(String::new()),
            "DATA" => Kind::Word(Data),
            "DEF" => Kind::Word(Def),
            "DIM" => Kind::Word(Dim),
            "END" => Kind::Word(End),
            "FOR" => Kind::Word(For),
            "GOSUB" => Kind::Word(Gosub),
            "GOTO" => Kind::Word(Goto),
            "IF" => Kind::Word(If),
            "INPUT" => Kind::Word(Input),
            "LET" => Kind::Word(Let),
            "NEXT" => Kind::Word(Next),
            "PRINT" => Kind::Word(Print),
            "READ" => Kind::Word(Read),
            "RESTORE" => Kind::Word(Restore),
            "RETURN" => Kind::Word(Return),
            "STEP" => Kind::Word(Step),
            "STOP" => Kind::Word(Stop),
            "THEN" => Kind::Word(Then),
            _ => Kind::Word(To),
        }
    }

    /// True for tokens that may stand as the left operand of a binary
    /// operator. Decides whether `-` is binary or unary.
    pub fn is_operand(&self) -> bool {
        matches!(self, Kind::Literal(_) | Kind::Ident(_) | Kind::RParen)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Kind::*;
        match self {
            Unknown(s) => write!(f, "{}", s),
            StatementNumber(n) => write!(f, "{}", n),
            Literal(s) => write!(f, "{}", s),
            Word(s) => write!(f, "{}", s),
            BinOp(s) => write!(f, "{}", s),
            UnOp(s) => write!(f, "{}", s),
            Ident(s) => write!(f, "{}", s),
            Comment(s) => write!(f, "{}", s),
            LParen => write!(f, "("),
            RParen => write!(f, ")"),
            Comma => write!(f, ","),
            Colon => write!(f, ":"),
            Semicolon => write!(f, ";"),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Integer(String),
    Float(String),
    String(String),
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Literal::*;
        match self {
            Integer(s) => write!(f, "{}", s),
            Float(s) => write!(f, "{}", s),
            String(s) => write!(f, "\"{}\"", s),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Word {
    Data,
    Def,
    Dim,
    End,
    For,
    Gosub,
    Goto,
    If,
    Input,
    Let,
    Next,
    Print,
    Read,
    Restore,
    Return,
    Step,
    Stop,
    Then,
    To,
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Word::*;
        match self {
            Data => write!(f, "DATA"),
            Def => write!(f, "DEF"),
            Dim => write!(f, "DIM"),
            End => write!(f, "END"),
            For => write!(f, "FOR"),
            Gosub => write!(f, "GOSUB"),
            Goto => write!(f, "GOTO"),
            If => write!(f, "IF"),
            Input => write!(f, "INPUT"),
            Let => write!(f, "LET"),
            Next => write!(f, "NEXT"),
            Print => write!(f, "PRINT"),
            Read => write!(f, "READ"),
            Restore => write!(f, "RESTORE"),
            Return => write!(f, "RETURN"),
            Step => write!(f, "STEP"),
            Stop => write!(f, "STOP"),
            Then => write!(f, "THEN"),
            To => write!(f, "TO"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Operator {
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
}

impl Operator {
    /// Symbolic operators, two-character spellings first.
    pub fn for_symbol(s: &str) -> Option<Operator> {
        use Operator::*;
        match s {
            "<>" | "><" => Some(NotEq),
            "<=" | "=<" => Some(LtEq),
            ">=" | "=>" => Some(GtEq),
            "<" => Some(Lt),
            ">" => Some(Gt),
            "=" => Some(Eq),
            "+" => Some(Add),
            "-" => Some(Sub),
            "*" => Some(Mul),
            "/" => Some(Div),
            "%" => Some(Mod),
            "^" => Some(Pow),
            _ => None,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Operator::*;
        match self {
            Pow => write!(f, "^"),
            Mul => write!(f, "*"),
            Div => write!(f, "/"),
            Mod => write!(f, "%"),
            Add => write!(f, "+"),
            Sub => write!(f, "-"),
            Eq => write!(f, "="),
            NotEq => write!(f, "<>"),
            Lt => write!(f, "<"),
            LtEq => write!(f, "<="),
            Gt => write!(f, ">"),
            GtEq => write!(f, ">="),
            And => write!(f, "AND"),
            Or => write!(f, "OR"),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Unary {
    Neg,
    Pos,
    Not,
}

impl std::fmt::Display for Unary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Unary::Neg => write!(f, "-"),
            Unary::Pos => write!(f, "+"),
            Unary::Not => write!(f, "NOT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_at() {
        assert_eq!(Kind::keyword_at("REM hi"), Some((3, Kind::Comment(String::new()))));
        assert_eq!(Kind::keyword_at("gosub 10"), Some((5, Kind::Word(Word::Gosub))));
        assert_eq!(Kind::keyword_at("TOTAL"), Some((2, Kind::Word(Word::To))));
        assert_eq!(Kind::keyword_at("PICKLES"), None);
    }

    #[test]
    fn test_for_symbol() {
        assert_eq!(Operator::for_symbol("><"), Some(Operator::NotEq));
        assert_eq!(Operator::for_symbol("=>"), Some(Operator::GtEq));
        assert_eq!(Operator::for_symbol("&"), None);
    }
}
