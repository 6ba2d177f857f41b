//! # csvevent — Declarative decoder for comma-separated protocol events
//!
//! A protocol description (a small XML document of field directives) is
//! compiled once into an indexed program of opcodes. The program is then
//! interpreted against each input record, a delimiter-separated line such as a
//! `PKT_RX` capture event, yielding typed named fields plus the raw byte payload.
//!
//! ## Directives
//!
//! - `eventdef`: root container
//! - `timestamp name=..`: unsigned integer, `0x` / leading-`0` prefixes accepted
//! - `integer name=..`: signed decimal integer
//! - `mnemonic name=..`: trimmed text
//! - `bytestream name=.. length=..`: N two-hex-digit tokens, N taken from an earlier field
//! - `condition field="literal"`: children run only when `field` equals `literal`
//!
//! ## Example description
//!
//! ```text
//! <eventdef>
//!   <timestamp name="host_timestamp"/>
//!   <mnemonic name="event_type"/>
//!   <integer name="length"/>
//!   <condition event_type="PKT_RX">
//!     <mnemonic name="port"/>
//!   </condition>
//!   <bytestream name="payload" length="length"/>
//! </eventdef>
//! ```
//!
//! ## Usage
//!
//! ```
//! use csvevent::{compile_source, EventDecoder, Value};
//!
//! let program = compile_source(r#"
//!   <eventdef>
//!     <timestamp name="ts"/>
//!     <mnemonic name="type"/>
//!     <integer name="length"/>
//!     <bytestream name="payload" length="length"/>
//!   </eventdef>"#).unwrap();
//! let decoder = EventDecoder::with_default_dialect(program);
//! let record = decoder.decode("42,PKT_RX,3,0a,0b,0c").unwrap();
//! assert_eq!(record.get("ts"), Some(&Value::Unsigned(42)));
//! assert_eq!(record.payload(), &[0x0a, 0x0b, 0x0c]);
//! ```

pub mod ast;
pub mod compiler;
pub mod cursor;
pub mod dump;
pub mod interpreter;
pub mod parser;
pub mod program;
pub mod record;
pub mod value;

pub use ast::{Directive, DirectiveKind, DirectiveTree};
pub use compiler::{compile, compile_file, compile_source, CompileError};
pub use cursor::{tokenize, Dialect, TokenCursor, TokenizeError};
pub use interpreter::{decode_line, interpret, EventDecoder, InterpretError};
pub use parser::{parse, MAX_NESTING_DEPTH};
pub use program::{Opcode, Program};
pub use record::ParsedRecord;
pub use value::Value;
