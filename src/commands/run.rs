use clap::Args;
use std::fs;
use std::io::{self, Write};

use crate::cli_util::{print_error, report_trace_failure};
use crate::config::{Overrides, Settings};
use crate::io::{EofPolicy, StdIo};
use crate::{parse, Error, Interpreter, Tape};

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    pub file: Option<String>,

    /// What `,` stores at end of input: zero, unchanged, max or 0-255 (fallback BF_EOF; default zero)
    #[arg(long = "eof", value_name = "POLICY")]
    pub eof: Option<EofPolicy>,

    /// Write an execution trace to stderr (fallback BF_TRACE)
    #[arg(short = 't', long = "trace", overrides_with = "no_trace")]
    pub trace: bool,

    /// Disable the trace even when BF_TRACE or bf.toml enables it
    #[arg(long = "no-trace", overrides_with = "trace")]
    pub no_trace: bool,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let RunArgs { file, eof, trace, no_trace, code, .. } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    // Either flag beats env and file; clap keeps only the last one given.
    let trace = match (trace, no_trace) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    };
    let settings = match Settings::load(Overrides { eof, trace }) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 2;
        }
    };

    let code_str = if let Some(path) = file {
        match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{program}: failed to read code file as UTF-8: {e}");
                let _ = io::stderr().flush();
                return 1;
            }
        }
    } else {
        code.join("")
    };

    match execute_source(program, &code_str, settings) {
        Ok(()) => 0,
        Err(err) => {
            print_error(Some(program), &code_str, &err);
            1
        }
    }
}

fn execute_source(program: &str, code: &str, settings: Settings) -> Result<(), Error> {
    let parsed = parse(code)?;
    let mut interpreter = Interpreter::new();
    if settings.trace {
        interpreter = interpreter.with_trace(Box::new(io::stderr()));
    }
    let mut io = StdIo::new(settings.eof);
    let result = interpreter.run(&parsed, &mut Tape::new(), &mut io);
    if let Some(err) = interpreter.trace_error() {
        report_trace_failure(Some(program), err);
    }
    result?;
    Ok(())
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [--eof POLICY] [--trace|-t|--no-trace] "<code>"
  {0} run [--eof POLICY] [--trace|-t|--no-trace] --file <PATH>

Options:
  --file,  -f <PATH>  Read Brainfuck code from PATH instead of positional "<code>"
  --eof <POLICY>      What `,` stores at end of input: zero, unchanged, max, or 0-255
  --trace, -t         Print a step-by-step table of operations to stderr
  --no-trace          Turn the trace off even if BF_TRACE or bf.toml turns it on
  --help,  -h         Show this help

Notes:
- Input (`,`) reads a single byte from stdin.
- Characters outside of Brainfuck's ><+-.,[] are comments.
- The tape starts with one cell and grows to the right; moving left of cell 0 is an error.
- Settings fall back to BF_EOF / BF_TRACE, then the [run] section of bf.toml
  in the XDG config home (or the file named by BF_CONFIG).

Examples:
- Load Brainfuck code from a file:
    {0} run --file ./program.bf
- Read bytes from a file as stdin (`,` will consume file input):
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
