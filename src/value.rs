//! Runtime values produced by the interpreter.

use std::fmt;

/// A single decoded scalar field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Timestamps: unsigned, any base prefix accepted on input.
    Unsigned(u64),
    /// Integers: signed decimal.
    Signed(i64),
    /// Mnemonics: trimmed text.
    Mnemonic(String),
}

impl Value {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Unsigned(x) => Some(*x),
            Value::Signed(x) => (*x).try_into().ok(),
            Value::Mnemonic(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Signed(x) => Some(*x),
            Value::Unsigned(x) => (*x).try_into().ok(),
            Value::Mnemonic(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Mnemonic(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Unsigned(_) | Value::Signed(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unsigned(_) => "unsigned",
            Value::Signed(_) => "signed",
            Value::Mnemonic(_) => "mnemonic",
        }
    }
}

/// String form used by condition comparisons: integers in decimal, mnemonics verbatim.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unsigned(x) => write!(f, "{}", x),
            Value::Signed(x) => write!(f, "{}", x),
            Value::Mnemonic(s) => f.write_str(s),
        }
    }
}
