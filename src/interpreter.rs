//! Recursive tree-walk over a parsed [`Program`].
//!
//! Behaviors:
//! - `>` grows the tape on demand; `<` at cell 0 aborts the run.
//! - `+`/`-` wrap at the byte boundary.
//! - `.` writes the active cell as one byte; `,` reads one byte, applying the
//!   channel's [`EofPolicy`](crate::io::EofPolicy) once input is exhausted.
//! - A loop re-tests the cell under the pointer before every iteration, so
//!   the body may move the pointer and change which cell ends the loop.
//!
//! There is no step limit. The first error unwinds the whole walk; output
//! written before it stands.
//!
//! The trace is best-effort. The first failed write to the trace sink is
//! kept in [`Interpreter::trace_error`] and tracing stops; the run carries on.

use std::fmt;
use std::io::{self, Write};

use crate::io::IoChannel;
use crate::program::{Instruction, Node, Program};
use crate::tape::Tape;

/// Runtime violation of the tape model, or a failure of the I/O channel.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The pointer attempted to move left of cell 0.
    #[error("pointer moved left of cell 0")]
    PointerUnderflow,

    /// Reading or writing a byte failed.
    #[error("I/O failure: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

/// Execute `program` against `tape`, performing I/O through `io`.
pub fn execute<I>(program: &Program, tape: &mut Tape, io: &mut I) -> Result<(), ExecutionError>
where
    I: IoChannel + ?Sized,
{
    Interpreter::new().run(program, tape, io)
}

/// Tree-walking interpreter with an optional execution trace.
#[derive(Default)]
pub struct Interpreter {
    trace: Option<Box<dyn Write>>,
    trace_error: Option<io::Error>,
    steps: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one table row per executed instruction and per loop test to `sink`.
    /// The trace never goes through the program's output channel.
    pub fn with_trace(mut self, sink: Box<dyn Write>) -> Self {
        self.trace = Some(sink);
        self.trace_error = None;
        self
    }

    /// The write error that stopped the trace, if one occurred.
    pub fn trace_error(&self) -> Option<&io::Error> {
        self.trace_error.as_ref()
    }

    /// Instructions executed plus loop tests performed during the last run.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn run<I>(&mut self, program: &Program, tape: &mut Tape, io: &mut I) -> Result<(), ExecutionError>
    where
        I: IoChannel + ?Sized,
    {
        self.steps = 0;
        self.emit(format_args!("STEP | DEPTH | PTR | CELL | OP | ACTION"));
        self.emit(format_args!("-----+-------+-----+------+----+------------------------------------------"));

        let walked = self.walk(program.nodes(), 0, tape, io);
        // Flush whatever was written, even when the walk failed part way.
        let flushed = io.flush().map_err(ExecutionError::from);
        if let Some(Err(err)) = self.trace.as_mut().map(|sink| sink.flush()) {
            self.fail_trace(err);
        }
        walked.and(flushed)
    }

    fn walk<I>(&mut self, nodes: &[Node], depth: usize, tape: &mut Tape, io: &mut I) -> Result<(), ExecutionError>
    where
        I: IoChannel + ?Sized,
    {
        for node in nodes {
            match node {
                Node::Instruction(instruction) => self.step(*instruction, depth, tape, io)?,
                Node::Loop(body) => {
                    let mut entered = false;
                    while self.test(entered, depth, tape) {
                        entered = true;
                        self.walk(body, depth + 1, tape, io)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Loop condition: is the cell under the pointer nonzero right now?
    fn test(&mut self, entered: bool, depth: usize, tape: &Tape) -> bool {
        let nonzero = tape.current() != 0;
        if self.trace.is_some() {
            let (op, action) = match (entered, nonzero) {
                (false, false) => ('[', "Cell is 0; skip loop"),
                (false, true) => ('[', "Enter loop (cell != 0)"),
                (true, true) => (']', "Cell != 0; repeat loop body"),
                (true, false) => (']', "Exit loop (cell is 0)"),
            };
            self.trace_row(depth, tape.pointer(), tape.current(), op, action);
        }
        self.steps += 1;
        nonzero
    }

    fn step<I>(&mut self, instruction: Instruction, depth: usize, tape: &mut Tape, io: &mut I) -> Result<(), ExecutionError>
    where
        I: IoChannel + ?Sized,
    {
        let (ptr_before, cell_before) = (tape.pointer(), tape.current());
        let tracing = self.trace.is_some();
        let mut action: Option<String> = None;

        match instruction {
            Instruction::MoveRight => {
                let len_before = tape.len();
                tape.move_right();
                if tracing {
                    let grown = if tape.len() > len_before { " (tape grew)" } else { "" };
                    action = Some(format!("Moved pointer head to index {}{grown}", tape.pointer()));
                }
            }
            Instruction::MoveLeft => {
                if let Err(err) = tape.move_left() {
                    if tracing {
                        self.trace_row(depth, ptr_before, cell_before, '<', "Pointer underflow; abort");
                    }
                    return Err(err);
                }
                if tracing {
                    action = Some(format!("Moved pointer head to index {}", tape.pointer()));
                }
            }
            Instruction::Increment => {
                tape.increment();
                if tracing {
                    action = Some(format!("Increment cell[{ptr_before}] from {cell_before} to {}", tape.current()));
                }
            }
            Instruction::Decrement => {
                tape.decrement();
                if tracing {
                    action = Some(format!("Decrement cell[{ptr_before}] from {cell_before} to {}", tape.current()));
                }
            }
            Instruction::Output => {
                io.write_byte(tape.current())?;
                if tracing {
                    action = Some(format!("Output byte {cell_before}"));
                }
            }
            Instruction::Input => {
                match io.read_byte()? {
                    Some(byte) => {
                        tape.set_current(byte);
                        if tracing {
                            action = Some(format!("Read byte -> {byte}"));
                        }
                    }
                    None => {
                        let policy = io.eof_policy();
                        tape.set_current(policy.apply(cell_before));
                        if tracing {
                            action = Some(format!("End of input ({policy}) -> {}", tape.current()));
                        }
                    }
                }
            }
        }

        if let Some(action) = action {
            self.trace_row(depth, ptr_before, cell_before, instruction.as_char(), &action);
        }
        self.steps += 1;
        Ok(())
    }

    fn trace_row(&mut self, depth: usize, ptr: usize, cell: u8, op: char, action: &str) {
        let step = self.steps;
        self.emit(format_args!("{step:<4} | {depth:<5} | {ptr:<3} | {cell:<4} | {op}  | {action}"));
    }

    fn emit(&mut self, line: fmt::Arguments<'_>) {
        if let Some(Err(err)) = self.trace.as_mut().map(|sink| writeln!(sink, "{line}")) {
            self.fail_trace(err);
        }
    }

    fn fail_trace(&mut self, err: io::Error) {
        self.trace = None;
        self.trace_error.get_or_insert(err);
    }
}
