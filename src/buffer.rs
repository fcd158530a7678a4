//! [`TextBuffer`] — the visible text and the insertion point.
//!
//! Lengths and cursor positions count `char`s, not bytes.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    output: String,
    cursor: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of characters in the output.
    pub fn len(&self) -> usize {
        self.output.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Insert `ch` at the cursor and move the cursor past it.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_offset(self.cursor);
        self.output.insert(at, ch);
        self.cursor += 1;
    }

    /// Remove the character before the cursor. Returns `false` at the start of
    /// the text, where there is nothing to remove.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let at = self.byte_offset(self.cursor - 1);
        self.output.remove(at);
        self.cursor -= 1;
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }

    pub fn clear(&mut self) {
        self.output.clear();
        self.cursor = 0;
    }

    /// Map an arbitrary step count into `0..=len`, wrapping modulo `len + 1`.
    ///
    /// With five characters, `-1` becomes `5` and `7` becomes `1`.
    pub fn normalize_count(&self, count: i64) -> usize {
        let modulus = i64::try_from(self.len()).map_or(i64::MAX, |len| len.saturating_add(1));
        usize::try_from(count.rem_euclid(modulus)).unwrap_or_default()
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.output
            .char_indices()
            .nth(char_index)
            .map_or(self.output.len(), |(i, _)| i)
    }
}
