//! Format decoded records and compiled programs for display.

use crate::program::Program;
use crate::record::ParsedRecord;
use crate::value::Value;

const HEX_BYTES_PER_LINE: usize = 16;

/// Raw scalar string: integers as-is, mnemonics quoted.
pub fn format_scalar_raw(v: &Value) -> String {
    match v {
        Value::Unsigned(x) => format!("{}", x),
        Value::Signed(x) => format!("{}", x),
        Value::Mnemonic(s) => format!("{:?}", s),
    }
}

/// Upper-case hex pairs, 16 per line, each line prefixed with its byte offset.
pub fn format_payload_hex(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(HEX_BYTES_PER_LINE).enumerate() {
        let hex = chunk
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&format!("{:04x}: {}\n", i * HEX_BYTES_PER_LINE, hex));
    }
    out
}

/// `Metadata:` block (one `name: value` line per field, in insertion order)
/// followed by `Payload (N bytes):` and the hex dump.
pub fn format_record(record: &ParsedRecord) -> String {
    let mut out = String::from("Metadata:\n");
    for (name, value) in record.iter() {
        out.push_str(&format!("  {}: {}\n", name, format_scalar_raw(value)));
    }
    out.push_str(&format!("Payload ({} bytes):\n", record.payload().len()));
    out.push_str(&format_payload_hex(record.payload()));
    out
}

/// Opcode listing grouped by sub-program index.
pub fn format_program(program: &Program) -> String {
    let mut out = String::new();
    for (index, ops) in program.iter() {
        out.push_str(&format!("#{}:\n", index));
        for op in ops {
            out.push_str(&format!("  {}\n", op));
        }
    }
    out
}
