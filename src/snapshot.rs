//! Read-only views of the engine handed to front-ends.

use serde::Serialize;

use crate::types::Status;

/// An owned copy of the machine configuration at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// The materialized cells, leftmost first.
    pub tape: Vec<char>,
    /// Head index into `tape`; may be negative or past the end.
    pub head: isize,
    pub state: String,
    pub step_count: usize,
    pub status: Status,
    pub blank: char,
}

/// One cell of a tape window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub index: isize,
    pub symbol: char,
    pub is_head: bool,
}

impl Snapshot {
    /// Whether the head points at a materialized cell.
    pub fn head_in_bounds(&self) -> bool {
        self.head >= 0 && (self.head as usize) < self.tape.len()
    }

    /// The symbol under the head.
    pub fn symbol(&self) -> char {
        usize::try_from(self.head)
            .ok()
            .and_then(|i| self.tape.get(i))
            .copied()
            .unwrap_or(self.blank)
    }

    /// The materialized cells within `radius` of the head.
    ///
    /// If the head is outside the materialized range, a blank cell for it is added at the
    /// matching end so the head is always visible.
    pub fn window(&self, radius: usize) -> Vec<Cell> {
        let radius = radius as isize;
        let len = self.tape.len() as isize;
        let start = (self.head - radius).max(0);
        let end = (self.head + radius + 1).min(len);

        let mut cells: Vec<Cell> = (start..end)
            .map(|index| Cell {
                index,
                symbol: self.tape[index as usize],
                is_head: index == self.head,
            })
            .collect();

        if !self.head_in_bounds() {
            let head = Cell {
                index: self.head,
                symbol: self.blank,
                is_head: true,
            };
            if self.head < 0 {
                cells.insert(0, head);
            } else {
                cells.push(head);
            }
        }

        cells
    }

    /// The materialized tape as a string.
    pub fn tape_string(&self) -> String {
        self.tape.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(tape: &str, head: isize) -> Snapshot {
        Snapshot {
            tape: tape.chars().collect(),
            head,
            state: "q0".into(),
            step_count: 0,
            status: Status::Running,
            blank: '_',
        }
    }

    #[test]
    fn test_window_clips_to_materialized_range() {
        let cells = snapshot("abcdef", 1).window(2);

        let symbols: String = cells.iter().map(|c| c.symbol).collect();
        assert_eq!(symbols, "abcd");
        assert_eq!(cells.iter().filter(|c| c.is_head).count(), 1);
        assert_eq!(cells[1].index, 1);
        assert!(cells[1].is_head);
    }

    #[test]
    fn test_window_adds_head_cell_past_right_end() {
        let snap = snapshot("ab", 2);
        assert!(!snap.head_in_bounds());
        assert_eq!(snap.symbol(), '_');

        let cells = snap.window(10);
        assert_eq!(cells.len(), 3);
        assert_eq!(
            cells[2],
            Cell {
                index: 2,
                symbol: '_',
                is_head: true
            }
        );
    }

    #[test]
    fn test_window_adds_head_cell_left_of_start() {
        let cells = snapshot("ab", -1).window(1);

        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].index, -1);
        assert!(cells[0].is_head);
        assert_eq!(cells[1].symbol, 'a');
        assert!(!cells[1].is_head);
    }

    #[test]
    fn test_window_on_empty_tape() {
        let cells = snapshot("", 0).window(3);

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].symbol, '_');
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let json = serde_json::to_value(snapshot("1", 0)).unwrap();

        assert_eq!(json["state"], "q0");
        assert_eq!(json["status"], "Running");
        assert_eq!(json["tape"], serde_json::json!(["1"]));
    }
}
