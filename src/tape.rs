//! The machine tape: a bi-infinite strip of symbols, materialized lazily.
//!
//! Only the cells that were seeded from the input or written by a transition are stored.
//! The head is a signed index into that storage and may point past either end, in which
//! case it reads the blank symbol.

use crate::types::{Direction, DEFAULT_BLANK_SYMBOL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<char>,
    head: isize,
    blank: char,
}

impl Default for Tape {
    fn default() -> Self {
        Self::empty(DEFAULT_BLANK_SYMBOL)
    }
}

impl Tape {
    /// Creates a tape with one cell per input character and the head on the first cell.
    pub fn new(input: &str, blank: char) -> Self {
        Self {
            cells: input.chars().collect(),
            head: 0,
            blank,
        }
    }

    /// Creates a tape with no materialized cells.
    pub fn empty(blank: char) -> Self {
        Self::new("", blank)
    }

    /// Returns the symbol under the head, or blank when the head is outside the stored range.
    pub fn read(&self) -> char {
        self.read_at(self.head)
    }

    /// Returns the symbol at `index`, or blank for cells that were never materialized.
    pub fn read_at(&self, index: isize) -> char {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.cells.get(i))
            .copied()
            .unwrap_or(self.blank)
    }

    /// Writes `symbol` under the head, materializing cells as needed.
    ///
    /// Writing past the right end pads with blanks up to and including the head.
    /// Writing left of the first cell prepends blanks and renormalizes the head to 0.
    pub fn write(&mut self, symbol: char) {
        if self.head < 0 {
            let mut cells = vec![self.blank; self.head.unsigned_abs()];
            cells.append(&mut self.cells);
            self.cells = cells;
            self.head = 0;
        }

        let index = self.head as usize;
        if index >= self.cells.len() {
            self.cells.resize(index + 1, self.blank);
        }

        self.cells[index] = symbol;
    }

    /// Moves the head one cell. Moving never materializes cells.
    pub fn shift(&mut self, direction: Direction) {
        self.head += direction.offset();
    }

    pub fn head(&self) -> isize {
        self.head
    }

    pub fn blank(&self) -> char {
        self.blank
    }

    /// The materialized cells, leftmost first.
    pub fn cells(&self) -> &[char] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether the head points at a materialized cell.
    pub fn head_in_bounds(&self) -> bool {
        self.head >= 0 && (self.head as usize) < self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tape_from_input() {
        let tape = Tape::new("101", '_');

        assert_eq!(tape.cells(), &['1', '0', '1']);
        assert_eq!(tape.head(), 0);
        assert_eq!(tape.read(), '1');
    }

    #[test]
    fn test_empty_tape_reads_blank() {
        let tape = Tape::empty('B');

        assert!(tape.is_empty());
        assert!(!tape.head_in_bounds());
        assert_eq!(tape.read(), 'B');
    }

    #[test]
    fn test_read_outside_bounds_is_blank() {
        let tape = Tape::new("ab", '_');

        assert_eq!(tape.read_at(-1), '_');
        assert_eq!(tape.read_at(-100), '_');
        assert_eq!(tape.read_at(2), '_');
        assert_eq!(tape.read_at(1), 'b');
    }

    #[test]
    fn test_write_past_right_end_pads_with_blanks() {
        let mut tape = Tape::new("a", '_');
        tape.shift(Direction::Right);
        tape.shift(Direction::Right);
        tape.shift(Direction::Right);

        assert_eq!(tape.len(), 1);
        tape.write('x');

        assert_eq!(tape.cells(), &['a', '_', '_', 'x']);
        assert_eq!(tape.head(), 3);
    }

    #[test]
    fn test_write_left_of_start_prepends_and_renormalizes() {
        let mut tape = Tape::new("ab", '_');
        tape.shift(Direction::Left);

        assert_eq!(tape.head(), -1);
        assert_eq!(tape.read(), '_');

        tape.write('x');

        assert_eq!(tape.cells(), &['x', 'a', 'b']);
        assert_eq!(tape.head(), 0);
    }

    #[test]
    fn test_write_far_left_prepends_gap() {
        let mut tape = Tape::new("a", '_');
        tape.shift(Direction::Left);
        tape.shift(Direction::Left);
        tape.write('x');

        assert_eq!(tape.cells(), &['x', '_', 'a']);
        assert_eq!(tape.head(), 0);
    }

    #[test]
    fn test_shift_does_not_materialize() {
        let mut tape = Tape::empty('_');
        tape.shift(Direction::Left);
        tape.shift(Direction::Right);
        tape.shift(Direction::Right);

        assert!(tape.is_empty());
        assert_eq!(tape.head(), 1);
    }
}
