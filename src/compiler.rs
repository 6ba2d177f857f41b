//! Compile a directive tree into an indexed [`Program`].
//!
//! Conditional directives become separate sub-programs. Indices are handed out
//! depth-first in the order conditions are met, so compiling the same
//! description twice gives identical programs.

use crate::ast::{Directive, DirectiveKind, DirectiveTree};
use crate::parser::{self, MAX_NESTING_DEPTH};
use crate::program::{Opcode, Program};
use log::{debug, warn};
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Unknown directive: <{kind}>")]
    UnknownDirective { kind: String },
    #[error("Directive <{directive}> is missing attribute {attribute}")]
    MissingAttribute { directive: String, attribute: String },
    #[error("Directive <{kind}> is not allowed here")]
    MisplacedDirective { kind: String },
    #[error("Conditions nested deeper than {limit}")]
    NestingTooDeep { limit: usize },
    #[error("Description unavailable: {0}")]
    SourceUnavailable(String),
}

/// Compile a directive tree. Every top-level node must be an `eventdef`;
/// a later `eventdef` replaces the program of an earlier one.
pub fn compile(tree: &DirectiveTree) -> Result<Program, CompileError> {
    let mut state = CompileState::default();
    let mut seen_eventdef = false;
    for node in &tree.nodes {
        match node.kind() {
            Some(DirectiveKind::EventDef) => {
                if seen_eventdef {
                    warn!("eventdef replaces the program built by an earlier eventdef");
                }
                seen_eventdef = true;
                state = CompileState::default();
                state.directives(&node.children)?;
            }
            Some(_) => {
                return Err(CompileError::MisplacedDirective {
                    kind: node.kind.clone(),
                })
            }
            None => {
                return Err(CompileError::UnknownDirective {
                    kind: node.kind.clone(),
                })
            }
        }
    }
    if !seen_eventdef {
        warn!("description has no eventdef; program root is empty");
    }
    let program = Program::from_subprograms(state.subprograms);
    debug!(
        "compiled program: {} sub-program(s), {} opcode(s)",
        program.len(),
        program.opcode_count()
    );
    Ok(program)
}

/// Parse description source, then compile it.
pub fn compile_source(source: &str) -> Result<Program, CompileError> {
    let tree = parser::parse(source).map_err(CompileError::SourceUnavailable)?;
    compile(&tree)
}

/// Read and compile a description file.
pub fn compile_file<P: AsRef<Path>>(path: P) -> Result<Program, CompileError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .map_err(|e| CompileError::SourceUnavailable(format!("{}: {}", path.display(), e)))?;
    compile_source(&source).map_err(|e| match e {
        CompileError::SourceUnavailable(msg) => {
            CompileError::SourceUnavailable(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

/// Per-call compiler state; never outlives one `compile`.
struct CompileState {
    subprograms: Vec<Vec<Opcode>>,
    stack: Vec<usize>,
    current: usize,
    condition_counter: usize,
}

impl Default for CompileState {
    fn default() -> Self {
        CompileState {
            subprograms: vec![Vec::new()],
            stack: Vec::new(),
            current: Program::ROOT,
            condition_counter: 0,
        }
    }
}

impl CompileState {
    fn directives(&mut self, nodes: &[Directive]) -> Result<(), CompileError> {
        for node in nodes {
            self.directive(node)?;
        }
        Ok(())
    }

    fn directive(&mut self, node: &Directive) -> Result<(), CompileError> {
        let kind = node.kind().ok_or_else(|| CompileError::UnknownDirective {
            kind: node.kind.clone(),
        })?;
        let op = match kind {
            DirectiveKind::EventDef => {
                return Err(CompileError::MisplacedDirective {
                    kind: node.kind.clone(),
                })
            }
            DirectiveKind::Condition => return self.condition(node),
            DirectiveKind::Timestamp => Opcode::ParseTimestamp {
                name: required(node, "name")?,
            },
            DirectiveKind::Integer => Opcode::ParseInteger {
                name: required(node, "name")?,
            },
            DirectiveKind::Mnemonic => Opcode::ParseMnemonic {
                name: required(node, "name")?,
            },
            DirectiveKind::ByteStream => Opcode::ParseByteRun {
                name: required(node, "name")?,
                length_field: required(node, "length")?,
            },
        };
        self.subprograms[self.current].push(op);
        Ok(())
    }

    fn condition(&mut self, node: &Directive) -> Result<(), CompileError> {
        let (identifier, expected) =
            node.first_attribute()
                .ok_or_else(|| CompileError::MissingAttribute {
                    directive: node.kind.clone(),
                    attribute: "identifier=value".to_string(),
                })?;
        if node.attributes.len() > 1 {
            debug!(
                "condition on {}: ignoring {} extra attribute(s)",
                identifier,
                node.attributes.len() - 1
            );
        }

        // The eventdef holds one level of the element nesting budget.
        if self.stack.len() + 1 >= MAX_NESTING_DEPTH {
            return Err(CompileError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH - 1,
            });
        }

        self.stack.push(self.current);
        let index = self.subprograms.len();
        self.subprograms.push(Vec::new());
        let name = format!("condition{}", self.condition_counter);
        self.condition_counter += 1;
        self.subprograms[self.current].push(Opcode::ParseCondition {
            name,
            identifier_field: identifier.to_string(),
            expected: expected.to_string(),
            subprogram: index,
        });

        self.current = index;
        self.directives(&node.children)?;
        self.current = self.stack.pop().unwrap_or(Program::ROOT);
        Ok(())
    }
}

fn required(node: &Directive, attribute: &str) -> Result<String, CompileError> {
    node.attribute(attribute)
        .map(str::to_string)
        .ok_or_else(|| CompileError::MissingAttribute {
            directive: node.kind.clone(),
            attribute: attribute.to_string(),
        })
}
