//! A tree-walking Brainfuck interpreter library.
//!
//! Source text is parsed once into a nested [`Program`] tree, then executed
//! against a [`Tape`] that starts as a single zero cell and grows to the
//! right on demand.
//!
//! Features and behaviors:
//! - Bracket matching happens while the tree is built; unmatched `[` or `]`
//!   is a [`ParseError`] reported before anything runs.
//! - Characters outside `><+-.,[]` are comments.
//! - Cells are bytes that wrap on overflow and underflow.
//! - Moving left of cell 0 is an [`ExecutionError::PointerUnderflow`].
//! - Byte I/O goes through an [`IoChannel`]; what `,` stores at end of input
//!   is the channel's [`EofPolicy`].
//!
//! Quick start:
//!
//! ```
//! use tree_bf::{run_source, BufferIo};
//!
//! let mut io = BufferIo::new("");
//! let tape = run_source("++++++++[>++++++++<-]>+.", &mut io).expect("program should run");
//! assert_eq!(io.output(), b"A");
//! assert_eq!(tape.cells(), &[0, 65]);
//! ```

pub mod cli_util;
pub mod commands;
pub mod config;
pub mod interpreter;
pub mod io;
pub mod parser;
pub mod program;
pub mod repl;
pub mod tape;
mod theme;

pub use interpreter::{execute, ExecutionError, Interpreter};
pub use io::{BufferIo, EofPolicy, IoChannel, StdIo};
pub use parser::{parse, ParseError};
pub use program::{Instruction, Node, Program};
pub use tape::Tape;

/// Either failure of a parse-then-run pipeline. The two taxonomies stay
/// distinct variants.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Runtime error: {0}")]
    Execution(#[from] ExecutionError),
}

/// Parse `source` and run it on a fresh tape, returning the final tape.
pub fn run_source<I>(source: &str, io: &mut I) -> Result<Tape, Error>
where
    I: IoChannel + ?Sized,
{
    let program = parse(source)?;
    let mut tape = Tape::new();
    execute(&program, &mut tape, io)?;
    Ok(tape)
}
