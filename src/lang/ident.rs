// Used in Token, Ast and the compiler's namespaces

use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    String,
    Integer,
    Real,
}

impl DataType {
    pub fn suffix(self) -> &'static str {
        match self {
            DataType::String => "$",
            DataType::Integer => "%",
            DataType::Real => "",
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DataType::String => write!(f, "STRING"),
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Real => write!(f, "REAL"),
        }
    }
}

/// A variable name as written, typed by its suffix.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Ident {
    String(Rc<str>),
    Integer(Rc<str>),
    Real(Rc<str>),
}

impl Ident {
    pub fn new(name: &str) -> Ident {
        if name.ends_with('$') {
            Ident::String(name.into())
        } else if name.ends_with('%') {
            Ident::Integer(name.into())
        } else {
            Ident::Real(name.into())
        }
    }

    pub fn name(&self) -> &Rc<str> {
        match self {
            Ident::String(s) | Ident::Integer(s) | Ident::Real(s) => s,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Ident::String(_) => DataType::String,
            Ident::Integer(_) => DataType::Integer,
            Ident::Real(_) => DataType::Real,
        }
    }

    /// Storage identity: the first two characters of the name, uppercased,
    /// plus the type suffix. `ABC` and `AB1` share a key.
    pub fn key(&self) -> String {
        let suffix = self.data_type().suffix();
        let name = self.name();
        let base = &name[..name.len() - suffix.len()];
        let mut key: String = base.chars().take(2).collect::<String>().to_ascii_uppercase();
        key.push_str(suffix);
        key
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
