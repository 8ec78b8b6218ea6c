//! The program tree produced by the parser.
//!
//! A [`Program`] is an ordered sequence of [`Node`]s. A node is either an
//! atomic [`Instruction`] or a `Loop` that owns its own body. The tree is a
//! strict forest: no sharing, no cycles, sibling order mirrors source order.

use std::fmt;

/// One of the six atomic Brainfuck operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// `>`
    MoveRight,
    /// `<`
    MoveLeft,
    /// `+`
    Increment,
    /// `-`
    Decrement,
    /// `.`
    Output,
    /// `,`
    Input,
}

impl Instruction {
    /// Map a source character to its instruction. Brackets and every other
    /// character yield `None`.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(Instruction::MoveRight),
            '<' => Some(Instruction::MoveLeft),
            '+' => Some(Instruction::Increment),
            '-' => Some(Instruction::Decrement),
            '.' => Some(Instruction::Output),
            ',' => Some(Instruction::Input),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Instruction::MoveRight => '>',
            Instruction::MoveLeft => '<',
            Instruction::Increment => '+',
            Instruction::Decrement => '-',
            Instruction::Output => '.',
            Instruction::Input => ',',
        }
    }
}

/// A single element of a program sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Instruction(Instruction),
    /// A `[...]` block; its body runs while the active cell is nonzero.
    Loop(Vec<Node>),
}

/// Top-level parsed code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    nodes: Vec<Node>,
}

impl Program {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of loop nodes anywhere in the tree.
    pub fn loop_count(&self) -> usize {
        self.descendants().filter(|(_, node)| matches!(node, Node::Loop(_))).count()
    }

    /// Number of atomic instructions anywhere in the tree.
    pub fn instruction_count(&self) -> usize {
        self.descendants().filter(|(_, node)| matches!(node, Node::Instruction(_))).count()
    }

    /// Maximum loop nesting depth; 0 when the program has no loops.
    pub fn depth(&self) -> usize {
        self.descendants()
            .filter(|(_, node)| matches!(node, Node::Loop(_)))
            .map(|(level, _)| level + 1)
            .max()
            .unwrap_or(0)
    }

    fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self.nodes.iter()] }
    }
}

/// Pre-order walk over every node, paired with the number of loops enclosing it.
/// Uses a heap stack so arbitrarily deep trees do not exhaust the thread stack.
struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.len().checked_sub(1)?;
            match self.stack.last_mut()?.next() {
                Some(node) => {
                    if let Node::Loop(body) = node {
                        self.stack.push(body.iter());
                    }
                    return Some((level, node));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

// The generated drop glue recurses once per nesting level. Detach loop bodies
// onto a flat list instead so every node is dropped with an empty body.
impl Drop for Node {
    fn drop(&mut self) {
        let Node::Loop(body) = self else { return };
        let mut pending = std::mem::take(body);
        while let Some(mut node) = pending.pop() {
            if let Node::Loop(children) = &mut node {
                pending.append(children);
            }
        }
    }
}

/// Renders canonical source: instruction characters and brackets only.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![self.nodes.iter()];
        while let Some(top) = stack.last_mut() {
            match top.next() {
                Some(Node::Instruction(i)) => write!(f, "{}", i.as_char())?,
                Some(Node::Loop(body)) => {
                    f.write_str("[")?;
                    stack.push(body.iter());
                }
                None => {
                    stack.pop();
                    if !stack.is_empty() {
                        f.write_str("]")?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn copy_loop() -> Program {
        use Instruction::*;
        Program::new(vec![
            Node::Instruction(Increment),
            Node::Instruction(Increment),
            Node::Loop(vec![
                Node::Instruction(MoveRight),
                Node::Instruction(Increment),
                Node::Instruction(MoveLeft),
                Node::Instruction(Decrement),
            ]),
        ])
    }

    #[test]
    fn char_mapping_round_trips_for_all_instructions() {
        for c in "><+-.,".chars() {
            let instr = Instruction::from_char(c).unwrap();
            assert_eq!(instr.as_char(), c);
        }
        assert_eq!(Instruction::from_char('['), None);
        assert_eq!(Instruction::from_char('#'), None);
    }

    #[test]
    fn counts_and_depth_of_flat_program() {
        let p = Program::new(vec![Node::Instruction(Instruction::Output)]);
        assert_eq!(p.loop_count(), 0);
        assert_eq!(p.depth(), 0);
        assert_eq!(p.instruction_count(), 1);
    }

    #[test]
    fn counts_and_depth_of_nested_program() {
        let p = copy_loop();
        assert_eq!(p.loop_count(), 1);
        assert_eq!(p.depth(), 1);
        assert_eq!(p.instruction_count(), 6);

        let nested = Program::new(vec![Node::Loop(vec![Node::Loop(vec![]), Node::Loop(vec![Node::Loop(vec![])])])]);
        assert_eq!(nested.loop_count(), 4);
        assert_eq!(nested.depth(), 3);
        assert_eq!(nested.instruction_count(), 0);
    }

    #[test]
    fn display_renders_canonical_source() {
        assert_eq!(copy_loop().to_string(), "++[>+<-]");
        assert_eq!(Program::default().to_string(), "");
    }

    fn nested(levels: usize) -> Program {
        let mut node = Node::Loop(vec![Node::Instruction(Instruction::Increment)]);
        for _ in 1..levels {
            node = Node::Loop(vec![node]);
        }
        Program::new(vec![node])
    }

    #[test]
    fn deep_tree_counts_renders_and_drops() {
        let levels = 200_000;
        let p = nested(levels);
        assert_eq!(p.loop_count(), levels);
        assert_eq!(p.depth(), levels);
        assert_eq!(p.instruction_count(), 1);

        let text = p.to_string();
        assert_eq!(text.len(), 2 * levels + 1);
        assert!(text.starts_with("[[["));
        assert!(text.ends_with("+]]]"));
        drop(p);
    }

    #[test]
    fn sibling_loops_render_in_source_order() {
        let p = Program::new(vec![
            Node::Loop(vec![Node::Loop(vec![])]),
            Node::Instruction(Instruction::Output),
            Node::Loop(vec![Node::Instruction(Instruction::Input)]),
        ]);
        assert_eq!(p.to_string(), "[[]].[,]");
        assert_eq!(p.depth(), 2);
    }
}
