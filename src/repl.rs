use std::env;
use std::io::{self, IsTerminal, Write};

use nu_ansi_term::Style;
use reedline::{DefaultPrompt, DefaultPromptSegment, Highlighter, HistoryItem, Signal, StyledText};

use crate::cli_util;
use crate::config::Settings;
use crate::io::StdIo;
use crate::{parse, Error, Interpreter, Tape};

pub const META_HELP: &str = r#"Meta commands (line starts with ":")
  :exit    Exit immediately (code 0)
  :help    Show this help
  :reset   Discard the code entered so far in this submission"#;

/// What a submission asks the REPL to do once meta commands are applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Submission {
    /// Code lines left to run, in order.
    pub code: String,
    /// `:exit` was seen; nothing after it runs.
    pub exit: bool,
    /// `:help` was seen.
    pub help: bool,
    /// Lines that looked like meta commands but are not known.
    pub unknown: Vec<String>,
}

/// Split a raw submission into code and meta commands. Lines are processed
/// in order: `:reset` drops code collected so far, `:exit` stops processing.
pub fn interpret_submission(text: &str) -> Submission {
    let mut out = Submission::default();
    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(cmd) = trimmed.strip_prefix(':') {
            match cmd.trim() {
                "exit" | "quit" => {
                    out.exit = true;
                    break;
                }
                "help" => out.help = true,
                "reset" => out.code.clear(),
                _ => out.unknown.push(trimmed.to_string()),
            }
            continue;
        }
        out.code.push_str(line);
        out.code.push('\n');
    }
    out
}

/// True when `code` holds at least one instruction or bracket.
fn has_instructions(code: &str) -> bool {
    code.chars()
        .any(|c| matches!(c, '>' | '<' | '+' | '-' | '.' | ',' | '[' | ']'))
}

/// Executes a single Brainfuck program contained in `buffer` on a fresh tape.
/// - Program output goes to stdout.
/// - Errors are printed concisely to stderr.
/// - A newline is always written to stdout after execution (success or error)
///   so that the prompt begins at column 0 on the next iteration.
pub fn execute_buffer(buffer: &str, settings: Settings) {
    if let Err(err) = run_buffer(buffer, settings) {
        cli_util::print_error(None, buffer, &err);
    }
    println!();
    let _ = io::stdout().flush();
}

fn run_buffer(buffer: &str, settings: Settings) -> Result<(), Error> {
    let program = parse(buffer)?;
    let mut interpreter = Interpreter::new();
    if settings.trace {
        interpreter = interpreter.with_trace(Box::new(io::stderr()));
    }
    let mut io = StdIo::new(settings.eof);
    let result = interpreter.run(&program, &mut Tape::new(), &mut io);
    if let Some(err) = interpreter.trace_error() {
        cli_util::report_trace_failure(None, err);
    }
    result?;
    Ok(())
}

/// Apply one submission. Returns `false` when the session should end.
fn handle_submission(text: &str, settings: Settings) -> bool {
    let submission = interpret_submission(text);
    for unknown in &submission.unknown {
        eprintln!("repl: unknown meta command {unknown} (try :help)");
    }
    if submission.help {
        eprintln!("{META_HELP}");
    }
    let _ = io::stderr().flush();

    if submission.exit {
        return false;
    }
    if has_instructions(&submission.code) {
        execute_buffer(&submission.code, settings);
    }
    true
}

fn once_requested() -> bool {
    env::var("BF_REPL_ONCE").ok().as_deref() == Some("1")
}

pub fn repl_loop(settings: Settings) -> io::Result<()> {
    let mut editor = init_line_editor()?;

    loop {
        let Some(submission) = read_submission_interactive(&mut editor)? else {
            // EOF or editor closed. End the session cleanly to avoid hanging when stdin is closed
            println!();
            io::stdout().flush()?;
            return Ok(());
        };

        if submission.trim().is_empty() {
            continue;
        }

        if !handle_submission(&submission, settings) {
            return Ok(());
        }

        // Test hook: if BF_REPL_ONCE=1, exit after one execution
        if once_requested() {
            return Ok(());
        }
    }
}

fn init_line_editor() -> io::Result<reedline::Reedline> {
    use reedline::{
        default_emacs_keybindings, EditCommand, Emacs, KeyCode, KeyModifiers, Reedline, ReedlineEvent,
    };

    // - Enter -> InsertNewLine (do not submit)
    // - Ctrl+D -> Submit
    // - Ctrl+Z -> Submit (Windows)
    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Enter, ReedlineEvent::Edit(vec![EditCommand::InsertNewline]));
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('d'), ReedlineEvent::Submit);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Char('z'), ReedlineEvent::Submit);

    // Up/down move within the current multiline buffer; Alt/Ctrl+Up/Down browse history.
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Up, ReedlineEvent::Up);
    keybindings.add_binding(KeyModifiers::NONE, KeyCode::Down, ReedlineEvent::Down);
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Up, ReedlineEvent::PreviousHistory);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Up, ReedlineEvent::PreviousHistory);
    keybindings.add_binding(KeyModifiers::ALT, KeyCode::Down, ReedlineEvent::NextHistory);
    keybindings.add_binding(KeyModifiers::CONTROL, KeyCode::Down, ReedlineEvent::NextHistory);

    let history = reedline::FileBackedHistory::new(1_000)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    let editor = Reedline::create()
        .with_highlighter(Box::new(BrainfuckHighlighter))
        .with_history(Box::new(history))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    Ok(editor)
}

/// Collect all lines until EOF.
pub fn read_submission<R: io::BufRead>(stdin: &mut R) -> Option<String> {
    let mut buffer = String::new();

    loop {
        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => buffer.push_str(&line),
            Err(_) => return None,
        }
    }

    if buffer.is_empty() { None } else { Some(buffer) }
}

fn read_submission_interactive(editor: &mut reedline::Reedline) -> io::Result<Option<String>> {
    let prompt = DefaultPrompt::new(DefaultPromptSegment::Basic("bf".to_string()), DefaultPromptSegment::Empty);

    match editor.read_line(&prompt) {
        Ok(Signal::Success(buffer)) => {
            // One history item per submitted buffer (program-level)
            if !buffer.trim().is_empty() {
                let _ = editor.history_mut().save(HistoryItem::from_command_line(buffer.clone()));
            }
            Ok(Some(buffer))
        }
        Ok(Signal::CtrlC) | Ok(Signal::CtrlD) => Ok(None),
        Err(e) => {
            eprintln!("repl: editor error: {e}");
            let _ = io::stderr().flush();
            Ok(None)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplMode {
    Bare,
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlagOverride {
    None,
    Bare,
    Editor,
}

/// Determine mode: flags -> `BF_REPL_MODE` -> auto-detect via is_terminal()
pub fn select_mode(flag: ModeFlagOverride) -> Result<ReplMode, String> {
    let stdin_tty = io::stdin().is_terminal();
    select_mode_with(flag, env::var("BF_REPL_MODE").ok().as_deref(), stdin_tty)
}

fn select_mode_with(flag: ModeFlagOverride, env_mode: Option<&str>, stdin_tty: bool) -> Result<ReplMode, String> {
    match flag {
        ModeFlagOverride::Bare => return Ok(ReplMode::Bare),
        ModeFlagOverride::Editor => {
            if !stdin_tty {
                return Err("cannot start editor: stdin is not a TTY (use --bare or BF_REPL_MODE=bare)".to_string());
            }
            return Ok(ReplMode::Editor);
        }
        ModeFlagOverride::None => {}
    }

    if let Some(val) = env_mode {
        return match val.trim().to_ascii_lowercase().as_str() {
            "bare" => Ok(ReplMode::Bare),
            "editor" if stdin_tty => Ok(ReplMode::Editor),
            "editor" => Err("cannot start editor: stdin is not a TTY (use BF_REPL_MODE=bare)".to_string()),
            _ => Err(format!("invalid BF_REPL_MODE value: {val}, must be 'bare' or 'editor'")),
        };
    }

    if stdin_tty { Ok(ReplMode::Editor) } else { Ok(ReplMode::Bare) }
}

/// Bare mode: read stdin until EOF, run it once.
pub fn execute_bare_once(settings: Settings) -> io::Result<()> {
    let mut locked = io::BufReader::new(io::stdin().lock());
    if let Some(text) = read_submission(&mut locked) {
        if !text.trim().is_empty() {
            handle_submission(&text, settings);
        }
    }
    Ok(())
}

/// Colors each character by its instruction class.
struct BrainfuckHighlighter;

impl Highlighter for BrainfuckHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut out = StyledText::new();
        let mut current_style: Option<Style> = None;
        let mut buffer = String::new();

        for ch in line.chars() {
            let style = crate::theme::style_for(ch);
            match current_style {
                Some(s) if s == style => buffer.push(ch),
                Some(s) => {
                    out.push((s, std::mem::take(&mut buffer)));
                    current_style = Some(style);
                    buffer.push(ch);
                }
                None => {
                    current_style = Some(style);
                    buffer.push(ch);
                }
            }
        }

        if let Some(s) = current_style {
            if !buffer.is_empty() {
                out.push((s, buffer));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_submission_reads_until_eof_multiple_lines() {
        let input = b"+++\n>+.\n";
        let mut cursor = Cursor::new(&input[..]);
        let got = read_submission(&mut cursor);
        assert_eq!(got.as_deref(), Some("+++\n>+.\n"));
    }

    #[test]
    fn read_submission_empty_returns_none() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        assert!(read_submission(&mut cursor).is_none());
    }

    #[test]
    fn plain_code_passes_through() {
        let s = interpret_submission("+++\n>.");
        assert_eq!(s.code, "+++\n>.\n");
        assert!(!s.exit && !s.help);
    }

    #[test]
    fn reset_drops_previous_code() {
        let s = interpret_submission("+++\n:reset\n+.\n");
        assert_eq!(s.code, "+.\n");
    }

    #[test]
    fn exit_stops_processing() {
        let s = interpret_submission("+.\n:exit\n-.\n");
        assert!(s.exit);
        assert_eq!(s.code, "+.\n");
    }

    #[test]
    fn help_and_unknown_meta_commands() {
        let s = interpret_submission(" :help\n:frob\n+");
        assert!(s.help);
        assert_eq!(s.unknown, vec![":frob".to_string()]);
        assert_eq!(s.code, "+\n");
    }

    #[test]
    fn comment_only_code_has_no_instructions() {
        assert!(!has_instructions("just words\n"));
        assert!(has_instructions("a]"));
    }

    #[test]
    fn mode_flags_override_env_and_tty() {
        assert_eq!(select_mode_with(ModeFlagOverride::Bare, Some("editor"), true), Ok(ReplMode::Bare));
        assert_eq!(select_mode_with(ModeFlagOverride::Editor, None, true), Ok(ReplMode::Editor));
        assert!(select_mode_with(ModeFlagOverride::Editor, None, false).is_err());
    }

    #[test]
    fn mode_env_then_auto_detect() {
        assert_eq!(select_mode_with(ModeFlagOverride::None, Some("BARE"), true), Ok(ReplMode::Bare));
        assert!(select_mode_with(ModeFlagOverride::None, Some("editor"), false).is_err());
        assert!(select_mode_with(ModeFlagOverride::None, Some("fancy"), true).is_err());
        assert_eq!(select_mode_with(ModeFlagOverride::None, None, true), Ok(ReplMode::Editor));
        assert_eq!(select_mode_with(ModeFlagOverride::None, None, false), Ok(ReplMode::Bare));
    }

    #[test]
    fn highlighter_groups_runs_of_same_style() {
        let styled = BrainfuckHighlighter.highlight("++>x", 0);
        let parts: Vec<&str> = styled.buffer.iter().map(|(_, s)| s.as_str()).collect();
        assert_eq!(parts, vec!["++", ">", "x"]);
    }
}
