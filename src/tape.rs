use crate::interpreter::ExecutionError;

/// Growable memory tape of wrapping byte cells with a single data pointer.
///
/// A fresh tape holds one zero cell with the pointer on it. Moving right past
/// the last cell appends one zero cell; the tape never shrinks and the
/// pointer always indexes an existing cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u8>,
    pointer: usize,
}

impl Default for Tape {
    fn default() -> Self {
        Self::new()
    }
}

impl Tape {
    pub fn new() -> Self {
        Self {
            cells: vec![0],
            pointer: 0,
        }
    }

    /// Value of the active cell.
    pub fn current(&self) -> u8 {
        self.cells[self.pointer]
    }

    pub fn set_current(&mut self, value: u8) {
        self.cells[self.pointer] = value;
    }

    /// Advance the pointer, growing the tape by one zero cell when needed.
    pub fn move_right(&mut self) {
        if self.pointer == self.cells.len() - 1 {
            self.cells.push(0);
        }
        self.pointer += 1;
    }

    /// Step the pointer left. Cell 0 is the left edge of the tape.
    pub fn move_left(&mut self) -> Result<(), ExecutionError> {
        if self.pointer == 0 {
            return Err(ExecutionError::PointerUnderflow);
        }
        self.pointer -= 1;
        Ok(())
    }

    pub fn increment(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_sub(1);
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; a tape starts with one cell and never shrinks.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}
