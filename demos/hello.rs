use tree_bf::{parse, Interpreter, StdIo, Tape};

fn main() {
    // Classic Brainfuck "Hello World!" program
    let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";

    let program = match parse(code) {
        Ok(p) => p,
        Err(err) => {
            eprintln!("Parse error: {err}");
            std::process::exit(1);
        }
    };
    println!("{} instructions, {} loops, depth {}", program.instruction_count(), program.loop_count(), program.depth());

    let mut tape = Tape::new();
    let mut io = StdIo::default();
    if let Err(err) = Interpreter::new().run(&program, &mut tape, &mut io) {
        eprintln!("Runtime error: {err}");
        std::process::exit(1);
    }

    // Print a newline after the Brainfuck program output for readability
    println!();
    println!("tape grew to {} cells: {:?}", tape.len(), tape.cells());

    // Tip: to see every step, attach a trace sink:
    // Interpreter::new().with_trace(Box::new(std::io::stderr()))
}
