use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// ## Stack enforced and size limited vector

pub struct Stack<T> {
    overflow_message: &'static str,
    vec: Vec<T>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.vec)
    }
}

impl<T> Stack<T> {
    pub fn new(overflow_message: &'static str) -> Stack<T> {
        Stack {
            overflow_message,
            vec: vec![],
        }
    }
    fn max_len(&self) -> usize {
        u16::MAX as usize
    }
    fn overflow_check(&self) -> Result<()> {
        if self.vec.len() > self.max_len() {
            Err(error!(OutOfMemory; self.overflow_message))
        } else {
            Ok(())
        }
    }
    fn underflow_error(&self) -> Error {
        error!(InternalError; "UNDERFLOW")
    }
    pub fn clear(&mut self) {
        self.vec.clear()
    }
    pub fn len(&self) -> usize {
        self.vec.len()
    }
    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }
    pub fn last(&self) -> Option<&T> {
        self.vec.last()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.vec.iter()
    }
    pub fn push(&mut self, val: T) -> Result<()> {
        self.vec.push(val);
        self.overflow_check()
    }
    pub fn pop(&mut self) -> Result<T> {
        match self.vec.pop() {
            Some(v) => Ok(v),
            None => Err(self.underflow_error()),
        }
    }
    pub fn pop_2(&mut self) -> Result<(T, T)> {
        let two = self.pop()?;
        let one = self.pop()?;
        Ok((one, two))
    }
    pub fn pop_n(&mut self, len: usize) -> Result<Vec<T>> {
        if len > self.vec.len() {
            Err(self.underflow_error())
        } else {
            let range = (self.vec.len() - len)..;
            Ok(self.vec.drain(range).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ErrorCode;

    #[test]
    fn test_pop_order() {
        let mut s: Stack<i32> = Stack::new("TEST");
        for n in 1..=4 {
            s.push(n).unwrap();
        }
        assert_eq!(s.pop_2().unwrap(), (3, 4));
        assert_eq!(s.pop_n(2).unwrap(), vec![1, 2]);
        assert!(s.is_empty());
    }

    #[test]
    fn test_underflow_is_internal() {
        let mut s: Stack<i32> = Stack::new("TEST");
        s.push(1).unwrap();
        assert!(s.pop_n(2).unwrap_err().is(ErrorCode::InternalError));
        assert_eq!(s.len(), 1);
        assert!(s.pop_2().unwrap_err().is(ErrorCode::InternalError));
    }

    #[test]
    fn test_overflow() {
        let mut s: Stack<u8> = Stack::new("STACK FULL");
        let mut result = Ok(());
        for _ in 0..=u16::MAX as usize + 1 {
            result = s.push(0);
            if result.is_err() {
                break;
            }
        }
        assert_eq!(result.unwrap_err().to_string(), "OUT OF MEMORY; STACK FULL");
    }
}
