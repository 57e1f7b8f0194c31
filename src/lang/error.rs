use super::SourceLine;

#[derive(Clone, PartialEq)]
pub struct Error {
    code: u16,
    line: Option<SourceLine>,
    message: String,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, $line:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_line($line)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, $line:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line($line)
            .message($msg)
    };
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code: code as u16,
            line: None,
            message: String::new(),
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code as u16
    }

    pub fn line(&self) -> Option<SourceLine> {
        self.line
    }

    pub fn detail(&self) -> &str {
        &self.message
    }

    /// Attaches a source line unless one is already known.
    /// Errors raised deep inside a stage keep the most precise line.
    pub fn in_line(self, line: SourceLine) -> Error {
        if self.line.is_some() {
            return self;
        }
        Error {
            line: Some(line),
            ..self
        }
    }

    pub fn message(self, message: &str) -> Error {
        debug_assert!(self.message.is_empty());
        Error {
            message: message.to_string(),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorCode {
    NextWithoutFor = 1,
    SyntaxError = 2,
    ReturnWithoutGosub = 3,
    OutOfData = 4,
    IllegalFunctionCall = 5,
    Overflow = 6,
    OutOfMemory = 7,
    UndefinedLine = 8,
    SubscriptOutOfRange = 9,
    RedimensionedArray = 10,
    DivisionByZero = 11,
    TypeMismatch = 13,
    UndefinedUserFunction = 18,
    ForWithoutNext = 26,
    InternalError = 51,
}

impl std::error::Error for Error {}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let code_str = match self.code {
            1 => "NEXT WITHOUT FOR",
            2 => "SYNTAX ERROR",
            3 => "RETURN WITHOUT GOSUB",
            4 => "OUT OF DATA",
            5 => "ILLEGAL FUNCTION CALL",
            6 => "OVERFLOW",
            7 => "OUT OF MEMORY",
            8 => "UNDEFINED LINE",
            9 => "SUBSCRIPT OUT OF RANGE",
            10 => "REDIMENSIONED ARRAY",
            11 => "DIVISION BY ZERO",
            13 => "TYPE MISMATCH",
            18 => "UNDEFINED USER FUNCTION",
            26 => "FOR WITHOUT NEXT",
            51 => "INTERNAL ERROR",
            _ => "",
        };
        let mut suffix = String::new();
        if let Some(line) = self.line {
            suffix.push_str(&format!(" {}", line));
        }
        if !self.message.is_empty() {
            suffix.push_str(&format!("; {}", self.message));
        }
        if code_str.is_empty() {
            if self.line.is_none() {
                write!(f, "PROGRAM ERROR {}{}", self.code, suffix)
            } else {
                write!(f, "PROGRAM ERROR {} IN{}", self.code, suffix)
            }
        } else if self.line.is_none() {
            write!(f, "{}{}", code_str, suffix)
        } else {
            write!(f, "{} IN{}", code_str, suffix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(error!(SyntaxError).to_string(), "SYNTAX ERROR");
        assert_eq!(error!(SyntaxError, 3).to_string(), "SYNTAX ERROR IN 3");
        assert_eq!(
            error!(UndefinedLine, 7; "GOTO 100").to_string(),
            "UNDEFINED LINE IN 7; GOTO 100"
        );
        assert_eq!(
            error!(OutOfData; "READ").to_string(),
            "OUT OF DATA; READ"
        );
    }

    #[test]
    fn test_first_line_wins() {
        let e = error!(TypeMismatch, 4).in_line(9);
        assert_eq!(e.line(), Some(4));
        assert!(e.is(ErrorCode::TypeMismatch));
    }
}
