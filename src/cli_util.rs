use std::io::{self, Write};

use crate::{Error, ExecutionError};

/// Render `err` for a human. Parse errors get a caret under the offending
/// bracket.
pub fn format_error(program: Option<&str>, code: &str, err: &Error) -> String {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    match err {
        Error::Parse(parse_err) => {
            let msg = prefix_program(&format!("Parse error: {parse_err}"));
            format!("{msg}\n{}", context_window(code, parse_err.position()))
        }
        Error::Execution(underflow @ ExecutionError::PointerUnderflow) => {
            prefix_program(&format!("Runtime error: {underflow}"))
        }
        Error::Execution(ExecutionError::Io { source }) => prefix_program(&format!("I/O error: {source}")),
    }
}

/// Print [`format_error`] to stderr and flush it.
pub fn print_error(program: Option<&str>, code: &str, err: &Error) {
    eprintln!("{}", format_error(program, code, err));
    let _ = io::stderr().flush();
}

/// Message for a trace sink that stopped accepting writes.
pub fn format_trace_failure(program: Option<&str>, err: &io::Error) -> String {
    match program {
        Some(p) => format!("{p}: trace disabled after write failure: {err}"),
        None => format!("trace disabled after write failure: {err}"),
    }
}

/// Report a trace failure on stderr. Stderr may be the broken sink, so a
/// failed write here is ignored rather than panicking.
pub fn report_trace_failure(program: Option<&str>, err: &io::Error) {
    let mut stderr = io::stderr();
    let _ = writeln!(stderr, "{}", format_trace_failure(program, err));
    let _ = stderr.flush();
}

/// A short window of `code` around char index `pos` with a caret line
/// beneath it. Newlines and tabs in the window are shown as spaces so the
/// caret stays aligned.
pub fn context_window(code: &str, pos: usize) -> String {
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    let start_byte = char_to_byte_index(code, start_char);
    let end_byte = char_to_byte_index(code, end_char);
    let slice: String = code[start_byte..end_byte]
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();

    // Caret under the exact position
    let caret_offset_chars = pos.saturating_sub(start_char);
    let underline = format!("{}^", " ".repeat(caret_offset_chars));
    format!("  {slice}\n  {underline}")
}

/// Convert a char index into a byte index in the given UTF-8 string.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map(|(i, _)| i).unwrap_or(s.len())
}
