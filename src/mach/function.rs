use super::{Opcode, Val};
use crate::error;
use crate::lang::Error;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

type Result<T> = std::result::Result<T, Error>;

/// Seed for the generator at the start of every run.
const RND_SEED: u64 = 0x5EED_BA51C;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Abs,
    Cos,
    Int,
    Len,
    Rnd,
    Sgn,
    Sin,
    Sqr,
    Tab,
}

impl std::fmt::Display for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        use Builtin::*;
        match self {
            Abs => write!(f, "ABS"),
            Cos => write!(f, "COS"),
            Int => write!(f, "INT"),
            Len => write!(f, "LEN"),
            Rnd => write!(f, "RND"),
            Sgn => write!(f, "SGN"),
            Sin => write!(f, "SIN"),
            Sqr => write!(f, "SQR"),
            Tab => write!(f, "TAB"),
        }
    }
}

pub struct Function {
    rng: StdRng,
    last: f64,
}

impl Default for Function {
    fn default() -> Function {
        Function::new()
    }
}

impl Function {
    pub fn new() -> Function {
        Function {
            rng: StdRng::seed_from_u64(RND_SEED),
            last: 0.0,
        }
    }

    pub fn opcode_and_arity(func_name: &str) -> Option<(Opcode, std::ops::RangeInclusive<usize>)> {
        use Builtin::*;
        let builtin = match func_name {
            "ABS" => Abs,
            "COS" => Cos,
            "INT" => Int,
            "LEN" => Len,
            "RND" => Rnd,
            "SGN" => Sgn,
            "SIN" => Sin,
            "SQR" => Sqr,
            "TAB" => Tab,
            _ => return None,
        };
        Some((Opcode::Builtin(builtin), 1..=1))
    }

    pub fn call(&mut self, builtin: Builtin, val: Val) -> Result<Val> {
        use Builtin::*;
        match builtin {
            Abs => Function::abs(val),
            Cos => Ok(Val::Real(f64::try_from(val)?.cos())),
            Int => Ok(Val::Real(f64::try_from(val)?.floor())),
            Len => Function::len(val),
            Rnd => self.rnd(val),
            Sgn => Function::sgn(val),
            Sin => Ok(Val::Real(f64::try_from(val)?.sin())),
            Sqr => Function::sqr(val),
            Tab => Function::tab(val),
        }
    }

    fn abs(val: Val) -> Result<Val> {
        match val {
            Val::Integer(n) => match n.checked_abs() {
                Some(n) => Ok(Val::Integer(n)),
                None => Ok(Val::Real((n as f64).abs())),
            },
            Val::Real(n) => Ok(Val::Real(n.abs())),
            _ => Err(error!(TypeMismatch)),
        }
    }

    fn len(val: Val) -> Result<Val> {
        match val {
            Val::String(s) => {
                let len = s.chars().count();
                if len > i16::MAX as usize {
                    Ok(Val::Real(len as f64))
                } else {
                    Ok(Val::Integer(len as i16))
                }
            }
            _ => Err(error!(TypeMismatch)),
        }
    }

    /// `RND(x)`: x>0 draws the next number in [0,1), x=0 repeats the last
    /// one and x<0 reseeds from x before drawing.
    fn rnd(&mut self, val: Val) -> Result<Val> {
        let x = f64::try_from(val)?;
        if x < 0.0 {
            self.rng = StdRng::seed_from_u64(x.to_bits());
        }
        if x != 0.0 {
            self.last = self.rng.gen::<f64>();
        }
        Ok(Val::Real(self.last))
    }

    fn sgn(val: Val) -> Result<Val> {
        let n = f64::try_from(val)?;
        Ok(Val::Integer(if n > 0.0 {
            1
        } else if n < 0.0 {
            -1
        } else {
            0
        }))
    }

    fn sqr(val: Val) -> Result<Val> {
        let n = f64::try_from(val)?;
        if n < 0.0 {
            return Err(error!(IllegalFunctionCall; "SQR OF NEGATIVE NUMBER"));
        }
        Ok(Val::Real(n.sqrt()))
    }

    fn tab(val: Val) -> Result<Val> {
        let n = i16::try_from(val)?;
        if n < 0 {
            return Err(error!(IllegalFunctionCall; "TAB OF NEGATIVE NUMBER"));
        }
        Ok(Val::String(" ".repeat(n as usize).into()))
    }
}
