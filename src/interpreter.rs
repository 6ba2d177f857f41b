//! Execute a compiled [`Program`] against one record's tokens.
//!
//! The program is read-only; all per-call state (cursor and record under
//! construction) lives in an execution context owned by a single call, so one
//! program can serve any number of concurrent decodes.

use crate::cursor::{Dialect, TokenCursor, TokenizeError};
use crate::program::{Opcode, Program};
use crate::record::ParsedRecord;
use crate::value::Value;
use log::trace;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpretError {
    #[error("field {field} (sub-program #{subprogram}): expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        subprogram: usize,
        /// Token index, when the mismatch is in a token rather than a stored field.
        position: Option<usize>,
        expected: &'static str,
        found: String,
    },
    #[error("field {field} (sub-program #{subprogram}): input exhausted at token {position}")]
    InputExhausted {
        field: String,
        subprogram: usize,
        position: usize,
    },
    #[error("field {field} (sub-program #{subprogram}): references {referenced}, which has not been decoded")]
    UnknownField {
        field: String,
        subprogram: usize,
        referenced: String,
    },
    #[error("malformed record: {0}")]
    MalformedRecord(#[from] TokenizeError),
}

/// Reusable decoder: a compiled program plus the record dialect.
/// `decode` takes `&self`, so one decoder can be shared across threads.
#[derive(Debug, Clone)]
pub struct EventDecoder {
    program: Program,
    dialect: Dialect,
}

impl EventDecoder {
    pub fn new(program: Program, dialect: Dialect) -> Self {
        EventDecoder { program, dialect }
    }

    pub fn with_default_dialect(program: Program) -> Self {
        Self::new(program, Dialect::default())
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Tokenize and decode one record.
    pub fn decode(&self, line: &str) -> Result<ParsedRecord, InterpretError> {
        decode_line(&self.program, line, &self.dialect)
    }
}

/// Tokenize `line` with `dialect`, then interpret it.
pub fn decode_line(
    program: &Program,
    line: &str,
    dialect: &Dialect,
) -> Result<ParsedRecord, InterpretError> {
    let mut cursor = TokenCursor::from_line(line, dialect)?;
    interpret(program, &mut cursor)
}

/// Run the root sub-program (and whatever it activates) over `cursor`.
///
/// Consumes exactly the tokens the program needs; trailing tokens are left
/// in the cursor. On error no record is returned.
pub fn interpret(program: &Program, cursor: &mut TokenCursor) -> Result<ParsedRecord, InterpretError> {
    let mut ctx = ExecContext {
        cursor,
        record: ParsedRecord::new(),
    };
    run(program, Program::ROOT, &mut ctx)?;
    Ok(ctx.record)
}

struct ExecContext<'c> {
    cursor: &'c mut TokenCursor,
    record: ParsedRecord,
}

fn run(program: &Program, index: usize, ctx: &mut ExecContext<'_>) -> Result<(), InterpretError> {
    let ops = program.subprogram(index).unwrap_or(&[]);
    for op in ops {
        match op {
            Opcode::ParseTimestamp { name } => {
                let (position, token) = take(ctx.cursor, name, index)?;
                let v = parse_unsigned(token).ok_or_else(|| {
                    token_mismatch(name, index, position, token, "unsigned integer")
                })?;
                ctx.record.insert(name.as_str(), Value::Unsigned(v));
            }
            Opcode::ParseInteger { name } => {
                let (position, token) = take(ctx.cursor, name, index)?;
                let v = token.trim().parse::<i64>().map_err(|_| {
                    token_mismatch(name, index, position, token, "signed integer")
                })?;
                ctx.record.insert(name.as_str(), Value::Signed(v));
            }
            Opcode::ParseMnemonic { name } => {
                let (_, token) = take(ctx.cursor, name, index)?;
                let v = Value::Mnemonic(token.trim().to_string());
                ctx.record.insert(name.as_str(), v);
            }
            Opcode::ParseByteRun { name, length_field } => {
                let length = byte_run_length(&ctx.record, name, length_field, index)?;
                let payload = ctx.record.payload_mut();
                payload.reserve(length.min(ctx.cursor.remaining()));
                for _ in 0..length {
                    let (position, token) = take(ctx.cursor, name, index)?;
                    let byte = parse_byte(token).ok_or_else(|| {
                        token_mismatch(name, index, position, token, "two-digit hex byte")
                    })?;
                    payload.push(byte);
                }
            }
            Opcode::ParseCondition {
                name,
                identifier_field,
                expected,
                subprogram,
            } => {
                let actual = ctx.record.get(identifier_field).ok_or_else(|| {
                    InterpretError::UnknownField {
                        field: name.clone(),
                        subprogram: index,
                        referenced: identifier_field.clone(),
                    }
                })?;
                let matched = match actual {
                    Value::Mnemonic(s) => s == expected,
                    other => other.to_string() == *expected,
                };
                if matched {
                    trace!("{}: {} == {:?}, running #{}", name, identifier_field, expected, subprogram);
                    run(program, *subprogram, ctx)?;
                } else {
                    trace!("{}: {} != {:?}, skipping #{}", name, identifier_field, expected, subprogram);
                }
            }
        }
    }
    Ok(())
}

fn take<'t>(
    cursor: &'t mut TokenCursor,
    field: &str,
    subprogram: usize,
) -> Result<(usize, &'t str), InterpretError> {
    let position = cursor.position();
    cursor
        .next_token()
        .map(|token| (position, token))
        .ok_or_else(|| InterpretError::InputExhausted {
            field: field.to_string(),
            subprogram,
            position,
        })
}

fn byte_run_length(
    record: &ParsedRecord,
    field: &str,
    length_field: &str,
    subprogram: usize,
) -> Result<usize, InterpretError> {
    let value = record
        .get(length_field)
        .ok_or_else(|| InterpretError::UnknownField {
            field: field.to_string(),
            subprogram,
            referenced: length_field.to_string(),
        })?;
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| InterpretError::TypeMismatch {
            field: field.to_string(),
            subprogram,
            position: None,
            expected: "non-negative integer length",
            found: format!("{} field {} = {:?}", value.type_name(), length_field, value.to_string()),
        })
}

fn token_mismatch(
    field: &str,
    subprogram: usize,
    position: usize,
    token: &str,
    expected: &'static str,
) -> InterpretError {
    InterpretError::TypeMismatch {
        field: field.to_string(),
        subprogram,
        position: Some(position),
        expected,
        found: format!("token {} {:?}", position, token),
    }
}

/// Optional leading `+`; then a `0x`/`0X` prefix is hex, a leading `0` is octal, anything else decimal.
fn parse_unsigned(token: &str) -> Option<u64> {
    let t = token.trim();
    let t = t.strip_prefix('+').unwrap_or(t);
    let (digits, radix) = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        (hex, 16)
    } else if t.len() > 1 && t.starts_with('0') {
        (&t[1..], 8)
    } else {
        (t, 10)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

fn parse_byte(token: &str) -> Option<u8> {
    let t = token.trim();
    if t.len() != 2 || !t.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(t, 16).ok()
}
