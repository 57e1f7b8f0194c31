use super::{Program, Slot, Val};
use crate::error;
use crate::lang::{DataType, Error, Ident};
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// Bound used for every dimension of an array used before `DIM`.
const DEFAULT_BOUND: usize = 10;

/// Largest number of elements a single array may hold.
const MAX_ELEMENTS: usize = 1 << 20;

/// ## Variable memory
///
/// Four typed stores addressed by slot. Scalars start at zero or the
/// empty string; arrays are created by `DIM` or on first use.

#[derive(Debug, Default)]
pub struct Var {
    strings: Vec<Rc<str>>,
    integers: Vec<i16>,
    reals: Vec<f64>,
    arrays: Vec<Option<Array>>,
}

/// A fixed-size, jagged, nested array. A bound of `n` holds `n+1` elements.
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    Nested(Vec<Array>),
    Integer(Vec<i16>),
    Real(Vec<f64>),
    String(Vec<Rc<str>>),
}

impl Array {
    fn new(data_type: DataType, bounds: &[usize]) -> Array {
        match bounds.split_first() {
            Some((bound, [])) => match data_type {
                DataType::Integer => Array::Integer(vec![0; bound + 1]),
                DataType::Real => Array::Real(vec![0.0; bound + 1]),
                DataType::String => Array::String(vec!["".into(); bound + 1]),
            },
            Some((bound, rest)) => {
                Array::Nested((0..=*bound).map(|_| Array::new(data_type, rest)).collect())
            }
            None => Array::Nested(vec![]),
        }
    }

    /// Number of subscripts this array takes.
    pub fn depth(&self) -> usize {
        match self {
            Array::Nested(v) => 1 + v.first().map_or(0, |a| a.depth()),
            _ => 1,
        }
    }

    fn get(&self, indices: &[usize]) -> Result<Val> {
        let val = match (self, indices.split_first()) {
            (Array::Nested(v), Some((i, rest))) => {
                return match v.get(*i) {
                    Some(a) => a.get(rest),
                    None => Err(error!(SubscriptOutOfRange)),
                }
            }
            (Array::Integer(v), Some((i, []))) => v.get(*i).map(|n| Val::Integer(*n)),
            (Array::Real(v), Some((i, []))) => v.get(*i).map(|n| Val::Real(*n)),
            (Array::String(v), Some((i, []))) => v.get(*i).map(|s| Val::String(s.clone())),
            _ => None,
        };
        val.ok_or_else(|| error!(SubscriptOutOfRange))
    }

    fn set(&mut self, indices: &[usize], val: Val) -> Result<()> {
        match (self, indices.split_first()) {
            (Array::Nested(v), Some((i, rest))) => match v.get_mut(*i) {
                Some(a) => a.set(rest, val),
                None => Err(error!(SubscriptOutOfRange)),
            },
            (Array::Integer(v), Some((i, []))) => match v.get_mut(*i) {
                Some(n) => {
                    *n = i16::try_from(val)?;
                    Ok(())
                }
                None => Err(error!(SubscriptOutOfRange)),
            },
            (Array::Real(v), Some((i, []))) => match v.get_mut(*i) {
                Some(n) => {
                    *n = f64::try_from(val)?;
                    Ok(())
                }
                None => Err(error!(SubscriptOutOfRange)),
            },
            (Array::String(v), Some((i, []))) => match v.get_mut(*i) {
                Some(s) => {
                    *s = Rc::<str>::try_from(val)?;
                    Ok(())
                }
                None => Err(error!(SubscriptOutOfRange)),
            },
            _ => Err(error!(SubscriptOutOfRange)),
        }
    }
}

/// Elements in parentheses, one level per subscript: `((0, 1), (2, 3))`.
impl std::fmt::Display for Array {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        fn list<T>(
            f: &mut std::fmt::Formatter,
            items: &[T],
            item: impl Fn(&mut std::fmt::Formatter, &T) -> std::fmt::Result,
        ) -> std::fmt::Result {
            write!(f, "(")?;
            for (i, t) in items.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                item(f, t)?;
            }
            write!(f, ")")
        }
        match self {
            Array::Nested(v) => list(f, v, |f, a| write!(f, "{}", a)),
            Array::Integer(v) => list(f, v, |f, n| write!(f, "{}", Val::Integer(*n))),
            Array::Real(v) => list(f, v, |f, n| write!(f, "{}", Val::Real(*n))),
            Array::String(v) => list(f, v, |f, s| write!(f, "\"{}\"", s)),
        }
    }
}

impl Var {
    pub fn new(program: &Program) -> Var {
        Var {
            strings: vec!["".into(); program.strings().len()],
            integers: vec![0; program.integers().len()],
            reals: vec![0.0; program.reals().len()],
            arrays: vec![None; program.arrays().len()],
        }
    }

    fn missing_slot() -> Error {
        error!(InternalError; "NO SUCH SLOT")
    }

    pub fn fetch(&self, data_type: DataType, slot: Slot) -> Result<Val> {
        let val = match data_type {
            DataType::String => self.strings.get(slot).map(|s| Val::String(s.clone())),
            DataType::Integer => self.integers.get(slot).map(|n| Val::Integer(*n)),
            DataType::Real => self.reals.get(slot).map(|n| Val::Real(*n)),
        };
        val.ok_or_else(Var::missing_slot)
    }

    pub fn store(&mut self, data_type: DataType, slot: Slot, value: Val) -> Result<()> {
        match data_type {
            DataType::String => {
                let s = Rc::<str>::try_from(value)?;
                *self.strings.get_mut(slot).ok_or_else(Var::missing_slot)? = s;
            }
            DataType::Integer => {
                let n = i16::try_from(value)?;
                *self.integers.get_mut(slot).ok_or_else(Var::missing_slot)? = n;
            }
            DataType::Real => {
                let n = f64::try_from(value)?;
                *self.reals.get_mut(slot).ok_or_else(Var::missing_slot)? = n;
            }
        }
        Ok(())
    }

    pub fn real(&self, slot: Slot) -> Result<f64> {
        self.reals.get(slot).copied().ok_or_else(Var::missing_slot)
    }

    pub fn set_real(&mut self, slot: Slot, value: f64) -> Result<()> {
        *self.reals.get_mut(slot).ok_or_else(Var::missing_slot)? = value;
        Ok(())
    }

    pub fn array(&self, slot: Slot) -> Option<&Array> {
        self.arrays.get(slot).and_then(|a| a.as_ref())
    }

    pub fn dimension_array(&mut self, data_type: DataType, slot: Slot, bounds: Vec<Val>) -> Result<()> {
        let bounds = Var::vec_val_to_vec_usize(bounds, error!(IllegalFunctionCall; "NEGATIVE BOUND"))?;
        let entry = self.arrays.get_mut(slot).ok_or_else(Var::missing_slot)?;
        if entry.is_some() {
            return Err(error!(RedimensionedArray));
        }
        let elements = bounds
            .iter()
            .try_fold(1usize, |acc, b| b.checked_add(1).and_then(|n| acc.checked_mul(n)));
        match elements {
            Some(n) if n <= MAX_ELEMENTS => {}
            _ => return Err(error!(OutOfMemory; "ARRAY TOO LARGE")),
        }
        *entry = Some(Array::new(data_type, &bounds));
        Ok(())
    }

    pub fn fetch_array(&mut self, data_type: DataType, slot: Slot, indices: Vec<Val>) -> Result<Val> {
        let indices = Var::vec_val_to_vec_usize(indices, error!(SubscriptOutOfRange))?;
        self.auto_dimension(data_type, slot, indices.len())?.get(&indices)
    }

    pub fn store_array(&mut self, data_type: DataType, slot: Slot, indices: Vec<Val>, value: Val) -> Result<()> {
        let indices = Var::vec_val_to_vec_usize(indices, error!(SubscriptOutOfRange))?;
        self.auto_dimension(data_type, slot, indices.len())?.set(&indices, value)
    }

    fn auto_dimension(&mut self, data_type: DataType, slot: Slot, depth: usize) -> Result<&mut Array> {
        let entry = self.arrays.get_mut(slot).ok_or_else(Var::missing_slot)?;
        let array = entry.get_or_insert_with(|| Array::new(data_type, &vec![DEFAULT_BOUND; depth]));
        if array.depth() != depth {
            return Err(error!(SubscriptOutOfRange));
        }
        Ok(array)
    }

    fn vec_val_to_vec_usize(vals: Vec<Val>, negative: Error) -> Result<Vec<usize>> {
        let mut v: Vec<usize> = vec![];
        for val in vals {
            let n = f64::try_from(val)?.trunc();
            if n < 0.0 {
                return Err(negative);
            }
            v.push(n as usize);
        }
        Ok(v)
    }
}

/// ## Debugger view of variable memory
///
/// Variables are named as written in the program, with any spelling
/// that shares the storage key.

pub struct Variables<'a> {
    var: &'a mut Var,
    program: &'a Program,
}

impl<'a> Variables<'a> {
    pub fn new(var: &'a mut Var, program: &'a Program) -> Variables<'a> {
        Variables { var, program }
    }

    fn slot(&self, ident: &Ident) -> Option<Slot> {
        match ident.data_type() {
            DataType::String => self.program.strings().lookup(ident),
            DataType::Integer => self.program.integers().lookup(ident),
            DataType::Real => self.program.reals().lookup(ident),
        }
    }

    pub fn get(&self, name: &str) -> Option<Val> {
        let ident = Ident::new(&name.to_ascii_uppercase());
        let slot = self.slot(&ident)?;
        self.var.fetch(ident.data_type(), slot).ok()
    }

    /// Stores `value` with the same conversions as `LET`.
    pub fn set(&mut self, name: &str, value: Val) -> Result<()> {
        let ident = Ident::new(&name.to_ascii_uppercase());
        match self.slot(&ident) {
            Some(slot) => self.var.store(ident.data_type(), slot, value),
            None => Err(error!(IllegalFunctionCall; &format!("NO VARIABLE {}", ident))),
        }
    }

    /// Every scalar in namespace order: strings, integers, then reals.
    pub fn snapshot(&self) -> Vec<(Rc<str>, Val)> {
        let mut v = vec![];
        let namespaces = [
            (DataType::String, self.program.strings()),
            (DataType::Integer, self.program.integers()),
            (DataType::Real, self.program.reals()),
        ];
        for (data_type, namespace) in namespaces.iter() {
            for (slot, name) in namespace.iter() {
                if let Ok(val) = self.var.fetch(*data_type, slot) {
                    v.push((name.clone(), val));
                }
            }
        }
        v
    }

    pub fn array(&self, name: &str) -> Option<&Array> {
        let ident = Ident::new(&name.to_ascii_uppercase());
        let slot = self.program.arrays().lookup(&ident)?;
        self.var.array(slot)
    }

    /// Every array dimensioned so far, in namespace order.
    pub fn arrays(&self) -> Vec<(Rc<str>, &Array)> {
        self.program
            .arrays()
            .iter()
            .filter_map(|(slot, name)| self.var.array(slot).map(|a| (name.clone(), a)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    fn var() -> Var {
        Var {
            strings: vec!["".into(); 2],
            integers: vec![0; 2],
            reals: vec![0.0; 2],
            arrays: vec![None; 2],
        }
    }

    #[test]
    fn test_store_converts() {
        let mut v = var();
        v.store(DataType::Integer, 0, Val::Real(70000.0)).unwrap();
        assert_eq!(v.fetch(DataType::Integer, 0).unwrap(), Val::Integer(4464));
        v.store(DataType::Real, 0, Val::Real(70000.0)).unwrap();
        assert_eq!(v.fetch(DataType::Real, 0).unwrap(), Val::Real(70000.0));
        assert!(v
            .store(DataType::String, 0, Val::Integer(1))
            .unwrap_err()
            .is(ErrorCode::TypeMismatch));
    }

    #[test]
    fn test_auto_dimension() {
        let mut v = var();
        v.store_array(DataType::Real, 0, vec![Val::Integer(10)], Val::Integer(5))
            .unwrap();
        assert_eq!(
            v.fetch_array(DataType::Real, 0, vec![Val::Integer(10)]).unwrap(),
            Val::Real(5.0)
        );
        assert!(v
            .fetch_array(DataType::Real, 0, vec![Val::Integer(11)])
            .unwrap_err()
            .is(ErrorCode::SubscriptOutOfRange));
        assert!(v
            .fetch_array(DataType::Real, 0, vec![Val::Integer(1), Val::Integer(1)])
            .unwrap_err()
            .is(ErrorCode::SubscriptOutOfRange));
        assert!(v
            .dimension_array(DataType::Real, 0, vec![Val::Integer(3)])
            .unwrap_err()
            .is(ErrorCode::RedimensionedArray));
    }

    #[test]
    fn test_jagged_shape() {
        let mut v = var();
        v.dimension_array(DataType::String, 1, vec![Val::Integer(1), Val::Integer(2)])
            .unwrap();
        let array = v.array(1).unwrap();
        assert_eq!(array.depth(), 2);
        match array {
            Array::Nested(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0], Array::String(vec!["".into(); 3]));
            }
            _ => panic!(),
        }
        v.store_array(
            DataType::String,
            1,
            vec![Val::Integer(1), Val::Integer(2)],
            Val::String("X".into()),
        )
        .unwrap();
        assert_eq!(
            v.fetch_array(DataType::String, 1, vec![Val::Real(1.9), Val::Integer(2)])
                .unwrap(),
            Val::String("X".into())
        );
    }

    #[test]
    fn test_huge_bound_out_of_memory() {
        let mut v = var();
        assert!(v
            .dimension_array(DataType::Real, 0, vec![Val::Real(1e30), Val::Integer(1)])
            .unwrap_err()
            .is(ErrorCode::OutOfMemory));
        assert!(v.array(0).is_none());
    }

    #[test]
    fn test_array_display() {
        let mut v = var();
        v.dimension_array(DataType::Integer, 0, vec![Val::Integer(1), Val::Integer(1)])
            .unwrap();
        v.store_array(DataType::Integer, 0, vec![Val::Integer(1), Val::Integer(0)], Val::Integer(7))
            .unwrap();
        assert_eq!(v.array(0).unwrap().to_string(), "((0, 0), (7, 0))");
        v.dimension_array(DataType::String, 1, vec![Val::Integer(1)]).unwrap();
        assert_eq!(v.array(1).unwrap().to_string(), "(\"\", \"\")");
    }

    #[test]
    fn test_negative_subscript() {
        let mut v = var();
        assert!(v
            .fetch_array(DataType::Integer, 0, vec![Val::Integer(-1)])
            .unwrap_err()
            .is(ErrorCode::SubscriptOutOfRange));
    }
}
