//! Compiled program: an indexed set of opcode sequences.
//!
//! Index 0 is the root, executed for every record. Every other index is the body
//! of exactly one [`Opcode::ParseCondition`] and runs only when that condition
//! matches. A `Program` is immutable once compiled and holds no per-call state,
//! so one instance can be shared by any number of concurrent decoders.

use std::fmt;

/// One compiled instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opcode {
    /// Consume one token as an unsigned integer (`0x` hex, leading-`0` octal, or decimal).
    ParseTimestamp { name: String },
    /// Consume one token as a signed decimal integer.
    ParseInteger { name: String },
    /// Consume one token as trimmed text.
    ParseMnemonic { name: String },
    /// Consume N two-hex-digit tokens into the payload, N read from `length_field`.
    ParseByteRun { name: String, length_field: String },
    /// Run `subprogram` when the string form of `identifier_field` equals `expected`.
    ParseCondition {
        name: String,
        identifier_field: String,
        expected: String,
        subprogram: usize,
    },
}

impl Opcode {
    pub fn name(&self) -> &str {
        match self {
            Opcode::ParseTimestamp { name }
            | Opcode::ParseInteger { name }
            | Opcode::ParseMnemonic { name }
            | Opcode::ParseByteRun { name, .. }
            | Opcode::ParseCondition { name, .. } => name,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::ParseTimestamp { name } => write!(f, "timestamp {}", name),
            Opcode::ParseInteger { name } => write!(f, "integer {}", name),
            Opcode::ParseMnemonic { name } => write!(f, "mnemonic {}", name),
            Opcode::ParseByteRun { name, length_field } => {
                write!(f, "bytestream {} [length = {}]", name, length_field)
            }
            Opcode::ParseCondition {
                name,
                identifier_field,
                expected,
                subprogram,
            } => write!(
                f,
                "{}: if {} == {:?} -> #{}",
                name, identifier_field, expected, subprogram
            ),
        }
    }
}

/// Sub-program index -> ordered opcode sequence. Indices are contiguous from 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    subprograms: Vec<Vec<Opcode>>,
}

impl Default for Program {
    fn default() -> Self {
        Program {
            subprograms: vec![Vec::new()],
        }
    }
}

impl Program {
    pub const ROOT: usize = 0;

    pub(crate) fn from_subprograms(subprograms: Vec<Vec<Opcode>>) -> Self {
        debug_assert!(!subprograms.is_empty());
        Program { subprograms }
    }

    pub fn root(&self) -> &[Opcode] {
        &self.subprograms[Self::ROOT]
    }

    pub fn subprogram(&self, index: usize) -> Option<&[Opcode]> {
        self.subprograms.get(index).map(Vec::as_slice)
    }

    /// Number of sub-programs (root included).
    pub fn len(&self) -> usize {
        self.subprograms.len()
    }

    /// Always false: the root exists even when empty.
    pub fn is_empty(&self) -> bool {
        self.subprograms.is_empty()
    }

    /// Sub-programs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Opcode])> {
        self.subprograms
            .iter()
            .enumerate()
            .map(|(i, ops)| (i, ops.as_slice()))
    }

    pub fn opcode_count(&self) -> usize {
        self.subprograms.iter().map(Vec::len).sum()
    }
}
