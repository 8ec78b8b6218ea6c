//! Byte-level I/O collaborators for the interpreter.
//!
//! The interpreter only sees [`IoChannel`]. What a `,` does at end of input
//! is the channel's [`EofPolicy`], not a decision of the interpreter.

use std::fmt;
use std::io::{self, BufWriter, Read, Stdout, Write};
use std::str::FromStr;

/// What `,` stores into the active cell once input is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EofPolicy {
    /// Store 0.
    #[default]
    Zero,
    /// Leave the cell as it is.
    Unchanged,
    /// Store a fixed byte, e.g. 255 to mimic C's `EOF`.
    Value(u8),
}

impl EofPolicy {
    /// The value `,` leaves in a cell currently holding `current`.
    pub fn apply(self, current: u8) -> u8 {
        match self {
            EofPolicy::Zero => 0,
            EofPolicy::Unchanged => current,
            EofPolicy::Value(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid EOF policy '{0}', expected 'zero', 'unchanged', 'max' or a byte value 0-255")]
pub struct InvalidEofPolicy(pub String);

impl FromStr for EofPolicy {
    type Err = InvalidEofPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = s.trim().to_ascii_lowercase();
        match v.as_str() {
            "zero" | "0" => Ok(EofPolicy::Zero),
            "unchanged" | "keep" => Ok(EofPolicy::Unchanged),
            "max" | "255" | "-1" => Ok(EofPolicy::Value(u8::MAX)),
            other => other
                .parse::<u8>()
                .map(EofPolicy::Value)
                .map_err(|_| InvalidEofPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for EofPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EofPolicy::Zero => write!(f, "zero"),
            EofPolicy::Unchanged => write!(f, "unchanged"),
            EofPolicy::Value(v) => write!(f, "{v}"),
        }
    }
}

/// Blocking, ordered byte input and output.
pub trait IoChannel {
    /// Next input byte, or `None` once input is exhausted.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    fn eof_policy(&self) -> EofPolicy {
        EofPolicy::Zero
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: IoChannel + ?Sized> IoChannel for &mut T {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        (**self).write_byte(byte)
    }

    fn eof_policy(&self) -> EofPolicy {
        (**self).eof_policy()
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Process stdin and stdout.
///
/// Output is buffered and flushed before every read, so anything the
/// program printed is visible before it blocks on input.
pub struct StdIo {
    out: BufWriter<Stdout>,
    eof: EofPolicy,
}

impl StdIo {
    pub fn new(eof: EofPolicy) -> Self {
        Self {
            out: BufWriter::new(io::stdout()),
            eof,
        }
    }
}

impl Default for StdIo {
    fn default() -> Self {
        Self::new(EofPolicy::default())
    }
}

impl IoChannel for StdIo {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.out.flush()?;
        let mut buf = [0u8; 1];
        loop {
            match io::stdin().lock().read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.out.write_all(&[byte])
    }

    fn eof_policy(&self) -> EofPolicy {
        self.eof
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// In-memory input and captured output.
#[derive(Debug, Clone, Default)]
pub struct BufferIo {
    input: Vec<u8>,
    read_pos: usize,
    output: Vec<u8>,
    eof: EofPolicy,
}

impl BufferIo {
    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn with_eof_policy(mut self, eof: EofPolicy) -> Self {
        self.eof = eof;
        self
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    pub fn into_output(self) -> Vec<u8> {
        self.output
    }

    /// Input bytes not consumed yet.
    pub fn remaining_input(&self) -> &[u8] {
        &self.input[self.read_pos..]
    }
}

impl IoChannel for BufferIo {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = self.input.get(self.read_pos).copied();
        if byte.is_some() {
            self.read_pos += 1;
        }
        Ok(byte)
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.output.push(byte);
        Ok(())
    }

    fn eof_policy(&self) -> EofPolicy {
        self.eof
    }
}
