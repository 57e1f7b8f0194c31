use super::Val;
use crate::error;
use crate::lang::Error;
use std::cmp::Ordering;

type Result<T> = std::result::Result<T, Error>;

/// ## Operator semantics
///
/// Integer arithmetic that leaves the 16-bit range is promoted to real.
/// Comparisons and logical operators yield -1 for true and 0 for false.

pub struct Operation {}

impl Operation {
    pub fn negate(val: Val) -> Result<Val> {
        use Val::*;
        match val {
            Integer(n) => match n.checked_neg() {
                Some(n) => Ok(Integer(n)),
                None => Ok(Real(-(n as f64))),
            },
            Real(n) => Ok(Real(-n)),
            String(_) | Address(_) => Err(error!(TypeMismatch)),
        }
    }

    pub fn not(val: Val) -> Result<Val> {
        Ok(Val::from_bool(!val.is_true()?))
    }

    pub fn and(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(lhs.is_true()? && rhs.is_true()?))
    }

    pub fn or(lhs: Val, rhs: Val) -> Result<Val> {
        Ok(Val::from_bool(lhs.is_true()? || rhs.is_true()?))
    }

    fn reals(lhs: Val, rhs: Val) -> Result<(f64, f64)> {
        Ok((f64::try_from(lhs)?, f64::try_from(rhs)?))
    }

    fn integer_or_real(
        lhs: Val,
        rhs: Val,
        int_op: fn(i16, i16) -> Option<i16>,
        real_op: fn(f64, f64) -> f64,
    ) -> Result<Val> {
        use Val::*;
        match (lhs, rhs) {
            (Integer(l), Integer(r)) => match int_op(l, r) {
                Some(n) => Ok(Integer(n)),
                None => Ok(Real(real_op(l as f64, r as f64))),
            },
            (lhs, rhs) => {
                let (l, r) = Operation::reals(lhs, rhs)?;
                Ok(Real(real_op(l, r)))
            }
        }
    }

    pub fn sum(lhs: Val, rhs: Val) -> Result<Val> {
        match (lhs, rhs) {
            (Val::String(l), Val::String(r)) => Ok(Val::String((l.to_string() + &r).into())),
            (lhs, rhs) => Operation::integer_or_real(lhs, rhs, i16::checked_add, |l, r| l + r),
        }
    }

    pub fn subtract(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::integer_or_real(lhs, rhs, i16::checked_sub, |l, r| l - r)
    }

    pub fn multiply(lhs: Val, rhs: Val) -> Result<Val> {
        Operation::integer_or_real(lhs, rhs, i16::checked_mul, |l, r| l * r)
    }

    pub fn divide(lhs: Val, rhs: Val) -> Result<Val> {
        let (l, r) = Operation::reals(lhs, rhs)?;
        if r == 0.0 {
            return Err(error!(DivisionByZero));
        }
        Ok(Val::Real(l / r))
    }

    /// The remainder, truncated to a whole number.
    pub fn modulus(lhs: Val, rhs: Val) -> Result<Val> {
        if let (Val::Integer(l), Val::Integer(r)) = (&lhs, &rhs) {
            if *r == 0 {
                return Err(error!(DivisionByZero));
            }
            return Ok(Val::Integer(l.checked_rem(*r).unwrap_or(0)));
        }
        let (l, r) = Operation::reals(lhs, rhs)?;
        if r == 0.0 {
            return Err(error!(DivisionByZero));
        }
        let n = (l % r).trunc();
        if n >= i16::MIN as f64 && n <= i16::MAX as f64 {
            Ok(Val::Integer(n as i16))
        } else {
            Ok(Val::Real(n))
        }
    }

    pub fn power(lhs: Val, rhs: Val) -> Result<Val> {
        let (l, r) = Operation::reals(lhs, rhs)?;
        Ok(Val::Real(l.powf(r)))
    }

    fn compare(lhs: Val, rhs: Val) -> Result<Option<Ordering>> {
        match (lhs, rhs) {
            (Val::String(l), Val::String(r)) => Ok(Some(l.cmp(&r))),
            (Val::String(_), _) | (_, Val::String(_)) => Err(error!(TypeMismatch)),
            (Val::Integer(l), Val::Integer(r)) => Ok(Some(l.cmp(&r))),
            (lhs, rhs) => {
                let (l, r) = Operation::reals(lhs, rhs)?;
                Ok(l.partial_cmp(&r))
            }
        }
    }

    pub fn equal(lhs: Val, rhs: Val) -> Result<Val> {
        let ord = Operation::compare(lhs, rhs)?;
        Ok(Val::from_bool(ord == Some(Ordering::Equal)))
    }

    pub fn not_equal(lhs: Val, rhs: Val) -> Result<Val> {
        let ord = Operation::compare(lhs, rhs)?;
        Ok(Val::from_bool(ord != Some(Ordering::Equal)))
    }

    pub fn less(lhs: Val, rhs: Val) -> Result<Val> {
        let ord = Operation::compare(lhs, rhs)?;
        Ok(Val::from_bool(ord == Some(Ordering::Less)))
    }

    pub fn less_equal(lhs: Val, rhs: Val) -> Result<Val> {
        let ord = Operation::compare(lhs, rhs)?;
        Ok(Val::from_bool(matches!(ord, Some(Ordering::Less) | Some(Ordering::Equal))))
    }

    pub fn greater(lhs: Val, rhs: Val) -> Result<Val> {
        let ord = Operation::compare(lhs, rhs)?;
        Ok(Val::from_bool(ord == Some(Ordering::Greater)))
    }

    pub fn greater_equal(lhs: Val, rhs: Val) -> Result<Val> {
        let ord = Operation::compare(lhs, rhs)?;
        Ok(Val::from_bool(matches!(ord, Some(Ordering::Greater) | Some(Ordering::Equal))))
    }
}
