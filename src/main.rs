use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};

use tree_bf::commands::repl::{self, ReplArgs};
use tree_bf::commands::run::{self, RunArgs};

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run  [--eof POLICY] [--trace] "<code>"       # Run Brainfuck code (args are concatenated)
  {0} run  [--eof POLICY] [--trace] --file <PATH>  # Run Brainfuck code loaded from file
  {0} repl [--bare|--editor]                       # Start a Brainfuck REPL (read-eval-print loop)
  {0}                                              # Same as `repl`

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "bf", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(RunArgs),
    Repl(ReplArgs),
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bf"));

    let cli = Cli::parse();

    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let code = match cli.command {
        Some(Command::Run(args)) => run::run(&program, args),
        Some(Command::Repl(args)) => repl::run(&program, args),
        None => repl::run(&program, ReplArgs::default()),
    };

    std::process::exit(code);
}
