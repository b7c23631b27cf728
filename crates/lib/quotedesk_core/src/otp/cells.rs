//! Six-cell code input model.
//!
//! The code is entered as six independent single-character cells accepting
//! digits only. Focus movement mirrors the usual OTP-box behavior: typing a
//! digit moves to the next cell, backspace on an empty cell moves to the
//! previous one, and a paste is split across all cells starting at index 0.

/// Number of code cells.
pub const CODE_LEN: usize = 6;

/// The cell grid plus the focused index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeCells {
    cells: [Option<char>; CODE_LEN],
    focus: usize,
}

impl Default for CodeCells {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeCells {
    pub fn new() -> Self {
        Self {
            cells: [None; CODE_LEN],
            focus: 0,
        }
    }

    /// Currently focused cell index.
    pub fn focus(&self) -> usize {
        self.focus
    }

    /// Character in a cell, if any.
    pub fn cell(&self, index: usize) -> Option<char> {
        self.cells.get(index).copied().flatten()
    }

    /// Type a character into the focused cell. Non-digits are ignored.
    /// Typing a digit auto-focuses the next cell.
    pub fn type_char(&mut self, c: char) {
        if !c.is_ascii_digit() {
            return;
        }
        self.cells[self.focus] = Some(c);
        if self.focus + 1 < CODE_LEN {
            self.focus += 1;
        }
    }

    /// Backspace: clears the focused cell when filled, otherwise only moves
    /// focus to the previous cell.
    pub fn backspace(&mut self) {
        if self.cells[self.focus].is_some() {
            self.cells[self.focus] = None;
        } else if self.focus > 0 {
            self.focus -= 1;
        }
    }

    /// Paste: digits from `text` fill the cells from index 0 (non-digits are
    /// ignored); focus lands on the first still-empty cell, or the last cell
    /// if all are filled.
    pub fn paste(&mut self, text: &str) {
        let digits: Vec<char> = text.chars().filter(char::is_ascii_digit).collect();
        for (i, digit) in digits.into_iter().take(CODE_LEN).enumerate() {
            self.cells[i] = Some(digit);
        }
        self.focus = self
            .cells
            .iter()
            .position(Option::is_none)
            .unwrap_or(CODE_LEN - 1);
    }

    /// Clear all cells and refocus cell 0.
    pub fn clear(&mut self) {
        self.cells = [None; CODE_LEN];
        self.focus = 0;
    }

    /// Whether every cell is filled.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// The full 6-digit code, when complete.
    pub fn code(&self) -> Option<String> {
        if self.is_complete() {
            Some(self.cells.iter().flatten().collect())
        } else {
            None
        }
    }
}
