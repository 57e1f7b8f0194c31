use super::Address;
use crate::error;
use crate::lang::{DataType, Error};
use std::rc::Rc;

/// ## Runtime values
///
/// Everything the operand stack can hold.

#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    String(Rc<str>),
    Integer(i16),
    Real(f64),
    /// An instruction address pushed ahead of a jump.
    Address(Address),
}

impl Val {
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Val::String(_) => Some(DataType::String),
            Val::Integer(_) => Some(DataType::Integer),
            Val::Real(_) => Some(DataType::Real),
            Val::Address(_) => None,
        }
    }

    /// The zero value a variable of type `data_type` starts with.
    pub fn zero(data_type: DataType) -> Val {
        match data_type {
            DataType::String => Val::String("".into()),
            DataType::Integer => Val::Integer(0),
            DataType::Real => Val::Real(0.0),
        }
    }

    pub fn is_true(&self) -> Result<bool, Error> {
        match self {
            Val::Integer(n) => Ok(*n != 0),
            Val::Real(n) => Ok(*n != 0.0),
            Val::String(_) => Err(error!(TypeMismatch)),
            Val::Address(_) => Err(error!(InternalError; "ADDRESS IS NOT A VALUE")),
        }
    }

    pub fn from_bool(b: bool) -> Val {
        if b {
            Val::Integer(-1)
        } else {
            Val::Integer(0)
        }
    }

    /// Converts to the storage type, wrapping integers into 16 bits.
    pub fn coerce(self, data_type: DataType) -> Result<Val, Error> {
        Ok(match data_type {
            DataType::String => Val::String(Rc::<str>::try_from(self)?),
            DataType::Integer => Val::Integer(i16::try_from(self)?),
            DataType::Real => Val::Real(f64::try_from(self)?),
        })
    }
}

impl TryFrom<Val> for i16 {
    type Error = Error;

    /// Truncates toward zero, then wraps into the signed 16-bit range.
    fn try_from(val: Val) -> Result<Self, Self::Error> {
        match val {
            Val::Integer(n) => Ok(n),
            Val::Real(n) => {
                if n.is_finite() {
                    Ok(n.trunc() as i64 as i16)
                } else {
                    Err(error!(Overflow))
                }
            }
            Val::String(_) => Err(error!(TypeMismatch)),
            Val::Address(_) => Err(error!(InternalError; "ADDRESS IS NOT A VALUE")),
        }
    }
}

impl TryFrom<Val> for f64 {
    type Error = Error;

    fn try_from(val: Val) -> Result<Self, Self::Error> {
        match val {
            Val::Integer(n) => Ok(n as f64),
            Val::Real(n) => Ok(n),
            Val::String(_) => Err(error!(TypeMismatch)),
            Val::Address(_) => Err(error!(InternalError; "ADDRESS IS NOT A VALUE")),
        }
    }
}

impl TryFrom<Val> for Rc<str> {
    type Error = Error;

    fn try_from(val: Val) -> Result<Self, Self::Error> {
        match val {
            Val::String(s) => Ok(s),
            Val::Address(_) => Err(error!(InternalError; "ADDRESS IS NOT A VALUE")),
            _ => Err(error!(TypeMismatch)),
        }
    }
}

impl TryFrom<Val> for Address {
    type Error = Error;

    fn try_from(val: Val) -> Result<Self, Self::Error> {
        match val {
            Val::Address(addr) => Ok(addr),
            Val::Integer(n) if n >= 0 => Ok(n as usize),
            _ => Err(error!(InternalError; "EXPECTED ADDRESS")),
        }
    }
}

impl std::fmt::Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Val::String(s) => write!(f, "{}", s),
            Val::Integer(n) => write!(f, "{}", n),
            Val::Real(n) => {
                if *n == 0.0 {
                    write!(f, "0")
                } else {
                    write!(f, "{}", n)
                }
            }
            Val::Address(a) => write!(f, "@{}", a),
        }
    }
}
