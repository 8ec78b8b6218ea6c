//! Single-pass, stack-based construction of the program tree.
//!
//! The parser keeps a stack of open sequences seeded with the top level.
//! `[` pushes a fresh sequence, `]` pops one and wraps it in a loop node on
//! the enclosing sequence. Bracket validation falls out of the construction;
//! there is no separate matching pass.

use crate::program::{Instruction, Node, Program};

/// Structural malformation found before any execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A `[` was never closed. `position` is the innermost one still open.
    #[error("unmatched '[' at position {position}")]
    UnmatchedOpen { position: usize },

    /// A `]` appeared with no open `[` to close.
    #[error("unmatched ']' at position {position}")]
    UnmatchedClose { position: usize },
}

impl ParseError {
    /// Character index (not byte index) of the offending bracket.
    pub fn position(&self) -> usize {
        match *self {
            ParseError::UnmatchedOpen { position } | ParseError::UnmatchedClose { position } => position,
        }
    }
}

/// An open sequence on the parse stack, and where its `[` appeared.
struct Frame {
    opened_at: usize,
    nodes: Vec<Node>,
}

/// Parse `source` into a [`Program`]. Characters outside `><+-.,[]` are
/// comments and are skipped.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let mut stack: Vec<Frame> = vec![Frame { opened_at: 0, nodes: Vec::new() }];

    for (position, c) in source.chars().enumerate() {
        match c {
            '[' => stack.push(Frame { opened_at: position, nodes: Vec::new() }),
            ']' => {
                // Popping the top level leaves nothing to attach the loop to.
                let body = stack.pop();
                match (body, stack.last_mut()) {
                    (Some(body), Some(parent)) => parent.nodes.push(Node::Loop(body.nodes)),
                    _ => return Err(ParseError::UnmatchedClose { position }),
                }
            }
            _ => {
                if let Some(instruction) = Instruction::from_char(c) {
                    if let Some(top) = stack.last_mut() {
                        top.nodes.push(Node::Instruction(instruction));
                    }
                }
            }
        }
    }

    if stack.len() > 1 {
        let innermost = stack.last().map(|frame| frame.opened_at).unwrap_or_default();
        return Err(ParseError::UnmatchedOpen { position: innermost });
    }

    let top = stack.pop().map(|frame| frame.nodes).unwrap_or_default();
    Ok(Program::new(top))
}

#[cfg(test)]
mod tests {
    use super::*;
    use Instruction::*;

    fn i(instr: Instruction) -> Node {
        Node::Instruction(instr)
    }

    #[test]
    fn empty_source_is_empty_program() {
        let p = parse("").unwrap();
        assert!(p.is_empty());
    }

    #[test]
    fn comments_only_is_empty_program() {
        let p = parse("hello world\n # nothing here").unwrap();
        assert!(p.is_empty());
    }

    #[test]
    fn flat_instructions_in_source_order() {
        let p = parse("><+-.,").unwrap();
        assert_eq!(
            p.nodes(),
            &[i(MoveRight), i(MoveLeft), i(Increment), i(Decrement), i(Output), i(Input)]
        );
    }

    #[test]
    fn loop_body_is_nested() {
        let p = parse("++[>+<-]").unwrap();
        assert_eq!(
            p.nodes(),
            &[
                i(Increment),
                i(Increment),
                Node::Loop(vec![i(MoveRight), i(Increment), i(MoveLeft), i(Decrement)]),
            ]
        );
    }

    #[test]
    fn siblings_after_loop_stay_at_outer_level() {
        let p = parse("[-]+[.]").unwrap();
        assert_eq!(
            p.nodes(),
            &[Node::Loop(vec![i(Decrement)]), i(Increment), Node::Loop(vec![i(Output)])]
        );
    }

    #[test]
    fn comment_tolerance() {
        assert_eq!(parse("+ + +.#!").unwrap(), parse("+++.").unwrap());
    }

    #[test]
    fn stray_close_is_unmatched_close() {
        assert_eq!(parse("]"), Err(ParseError::UnmatchedClose { position: 0 }));
        assert_eq!(parse("[]]"), Err(ParseError::UnmatchedClose { position: 2 }));
    }

    #[test]
    fn missing_close_is_unmatched_open() {
        assert_eq!(parse("["), Err(ParseError::UnmatchedOpen { position: 0 }));
        // The innermost open bracket is reported.
        assert_eq!(parse("[[]"), Err(ParseError::UnmatchedOpen { position: 0 }));
        assert_eq!(parse("+[-[+"), Err(ParseError::UnmatchedOpen { position: 3 }));
    }

    #[test]
    fn positions_count_chars_not_bytes() {
        let err = parse("é→]").unwrap_err();
        assert_eq!(err.position(), 2);
    }

    #[test]
    fn loop_count_and_depth_mirror_brackets() {
        let cases = [
            ("", 0, 0),
            ("[]", 1, 1),
            ("[][]", 2, 1),
            ("[[]]", 2, 2),
            ("+[>[-]<[[.]]]", 4, 3),
        ];
        for (src, loops, depth) in cases {
            let p = parse(src).unwrap();
            assert_eq!(p.loop_count(), loops, "loops in {src:?}");
            assert_eq!(p.depth(), depth, "depth in {src:?}");
        }
    }

    #[test]
    fn deep_nesting_builds_whole_tree() {
        let depth = 200_000;
        let src = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let p = parse(&src).unwrap();
        assert_eq!(p.loop_count(), depth);
        assert_eq!(p.depth(), depth);
        assert_eq!(p.to_string(), src);
        drop(p);
    }

    #[test]
    fn canonical_display_reparses_to_same_tree() {
        let p = parse("a+[b-[c>]d<]e.").unwrap();
        assert_eq!(p.to_string(), "+[-[>]<].");
        assert_eq!(parse(&p.to_string()).unwrap(), p);
    }
}
