/// Gap buffer for efficient text storage and manipulation.
use std::fmt;

use anyhow::Result;

/// Capacity of a freshly created buffer, in bytes.
const INITIAL_CAPACITY: usize = 64;

/// A text buffer backed by a byte array with a movable gap.
///
/// The storage holds `count` logical bytes plus an unused gap of
/// `capacity - count` slots. The gap always starts at the physical slot of
/// the cursor, so logical positions before the cursor map directly to the
/// same physical index and positions at or after it map past the gap.
/// Inserting and deleting at the cursor is O(1); moving the cursor costs
/// O(distance moved), never O(buffer size).
///
/// The buffer owns the cursor and mark positions. Both are logical indices
/// in `0..=count`, where `count` denotes the append position.
#[derive(Debug, Clone)]
pub struct GapBuffer {
    data: Vec<u8>,
    count: usize,
    cursor: usize,
    mark: usize,
}

impl Default for GapBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for GapBuffer {
    fn from(text: &str) -> Self {
        let mut buf = Self::with_capacity(text.len().max(INITIAL_CAPACITY));
        buf.insert(text.as_bytes());
        buf
    }
}

impl fmt::Display for GapBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.data[..self.cursor]))?;
        write!(
            f,
            "{}",
            String::from_utf8_lossy(&self.data[self.cursor + self.gap_len()..])
        )
    }
}

impl GapBuffer {
    /// Creates an empty gap buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Creates an empty gap buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity.max(1)],
            count: 0,
            cursor: 0,
            mark: 0,
        }
    }

    /// Returns the logical length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the total number of storage slots (live bytes plus gap).
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns the cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the mark position.
    pub fn mark(&self) -> usize {
        self.mark
    }

    /// Returns the selection range as `(start, end)`, ordered.
    pub fn selection(&self) -> (usize, usize) {
        (self.cursor.min(self.mark), self.cursor.max(self.mark))
    }

    fn gap_len(&self) -> usize {
        self.data.len() - self.count
    }

    /// Maps a logical position to its physical index in storage.
    ///
    /// Valid for `pos < count`; positions at or after the cursor sit past
    /// the gap.
    fn physical(&self, pos: usize) -> usize {
        if pos < self.cursor {
            pos
        } else {
            pos + self.gap_len()
        }
    }

    /// Returns the byte at a given logical position.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is out of bounds.
    pub fn byte_at(&self, pos: usize) -> Result<u8> {
        if pos >= self.count {
            anyhow::bail!(
                "position {} out of bounds (buffer has {} bytes)",
                pos,
                self.count
            );
        }
        Ok(self.data[self.physical(pos)])
    }

    /// Returns the byte at a given logical position, or `None` at or past
    /// the end. Lets scanners treat the end of the buffer as a sentinel.
    pub fn get(&self, pos: usize) -> Option<u8> {
        if pos < self.count {
            Some(self.data[self.physical(pos)])
        } else {
            None
        }
    }

    /// Moves the cursor (and therefore the gap) to a logical position.
    ///
    /// Only the bytes between the old and new cursor are copied across the
    /// gap, so the cost is proportional to the distance moved.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is out of bounds.
    pub fn set_cursor(&mut self, pos: usize) -> Result<()> {
        if pos > self.count {
            anyhow::bail!(
                "cursor position {} out of bounds (buffer has {} bytes)",
                pos,
                self.count
            );
        }
        let gap = self.gap_len();
        if pos < self.cursor {
            // Gap moves left: the bytes at [pos..cursor] slide to the far
            // end of the gap.
            self.data.copy_within(pos..self.cursor, pos + gap);
        } else if pos > self.cursor {
            // Gap moves right: the bytes just past the gap slide down into
            // the vacated slots.
            self.data
                .copy_within(self.cursor + gap..pos + gap, self.cursor);
        }
        self.cursor = pos;
        Ok(())
    }

    /// Moves the mark to a logical position.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is out of bounds.
    pub fn set_mark(&mut self, pos: usize) -> Result<()> {
        if pos > self.count {
            anyhow::bail!(
                "mark position {} out of bounds (buffer has {} bytes)",
                pos,
                self.count
            );
        }
        self.mark = pos;
        Ok(())
    }

    /// Grows storage until at least `needed` live bytes fit, doubling the
    /// capacity each step. Both live regions are copied into the new array
    /// and the gap is re-established at the cursor.
    fn grow(&mut self, needed: usize) {
        let mut new_capacity = self.data.len();
        while new_capacity < needed {
            new_capacity *= 2;
        }
        let mut data = vec![0; new_capacity];
        data[..self.cursor].copy_from_slice(&self.data[..self.cursor]);
        let tail = self.count - self.cursor;
        if tail > 0 {
            let old_tail_start = self.cursor + self.gap_len();
            data[new_capacity - tail..].copy_from_slice(&self.data[old_tail_start..]);
        }
        self.data = data;
    }

    /// Inserts bytes at the cursor.
    ///
    /// The cursor advances past the inserted text. The mark shifts right
    /// when it sat at or beyond the insertion point.
    pub fn insert(&mut self, text: &[u8]) {
        if self.count + text.len() > self.data.len() {
            self.grow(self.count + text.len());
        }
        self.data[self.cursor..self.cursor + text.len()].copy_from_slice(text);
        if self.mark >= self.cursor {
            self.mark += text.len();
        }
        self.cursor += text.len();
        self.count += text.len();
    }

    /// Removes `n` bytes before the cursor (backspace).
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than `n` bytes precede the cursor.
    pub fn remove_backward(&mut self, n: usize) -> Result<()> {
        if n > self.cursor {
            anyhow::bail!(
                "cannot remove {} bytes before cursor at {}",
                n,
                self.cursor
            );
        }
        let start = self.cursor - n;
        self.cursor = start;
        self.count -= n;
        // Positions inside the removed range collapse to its start.
        if self.mark >= start + n {
            self.mark -= n;
        } else if self.mark > start {
            self.mark = start;
        }
        Ok(())
    }

    /// Removes `n` bytes after the cursor (delete key).
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than `n` bytes follow the cursor.
    pub fn remove_forward(&mut self, n: usize) -> Result<()> {
        if n > self.count - self.cursor {
            anyhow::bail!(
                "cannot remove {} bytes after cursor at {} (buffer has {} bytes)",
                n,
                self.cursor,
                self.count
            );
        }
        self.count -= n;
        if self.mark >= self.cursor + n {
            self.mark -= n;
        } else if self.mark > self.cursor {
            self.mark = self.cursor;
        }
        Ok(())
    }

    /// Returns an iterator over all bytes in logical order.
    pub fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.data[..self.cursor]
            .iter()
            .chain(self.data[self.cursor + self.gap_len()..].iter())
            .copied()
    }

    /// Returns the text in the given logical range, decoded lossily.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds.
    pub fn slice(&self, start: usize, end: usize) -> Result<String> {
        if start > end {
            anyhow::bail!("invalid range: start ({}) > end ({})", start, end);
        }
        if end > self.count {
            anyhow::bail!(
                "range end {} out of bounds (buffer has {} bytes)",
                end,
                self.count
            );
        }
        let mut bytes = Vec::with_capacity(end - start);
        for pos in start..end {
            bytes.push(self.data[self.physical(pos)]);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_empty() {
        let buf = GapBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.cursor(), 0);
        assert_eq!(buf.mark(), 0);
    }

    #[test]
    fn test_from_str() {
        let buf = GapBuffer::from("hello\nworld");
        assert_eq!(buf.len(), 11);
        assert_eq!(buf.to_string(), "hello\nworld");
        assert_eq!(buf.cursor(), 11);
    }

    #[test]
    fn test_insert_at_cursor() {
        let mut buf = GapBuffer::new();
        buf.insert(b"hello");
        assert_eq!(buf.to_string(), "hello");
        assert_eq!(buf.cursor(), 5);

        buf.set_cursor(0).unwrap();
        buf.insert(b">> ");
        assert_eq!(buf.to_string(), ">> hello");
    }

    #[test]
    fn test_insert_in_middle() {
        let mut buf = GapBuffer::from("ac");
        buf.set_cursor(1).unwrap();
        buf.insert(b"b");
        assert_eq!(buf.to_string(), "abc");
    }

    #[test]
    fn test_byte_at() {
        let buf = GapBuffer::from("hello");
        assert_eq!(buf.byte_at(0).unwrap(), b'h');
        assert_eq!(buf.byte_at(4).unwrap(), b'o');
        assert!(buf.byte_at(5).is_err());
    }

    #[test]
    fn test_get_returns_none_past_end() {
        let buf = GapBuffer::from("abc");
        assert_eq!(buf.get(2), Some(b'c'));
        assert_eq!(buf.get(3), None);
        assert_eq!(buf.get(100), None);
    }

    #[test]
    fn test_byte_at_with_gap_in_middle() {
        let mut buf = GapBuffer::from("hello");
        buf.set_cursor(2).unwrap();
        for (i, expected) in b"hello".iter().enumerate() {
            assert_eq!(buf.byte_at(i).unwrap(), *expected);
        }
    }

    // ── Cursor moves are observationally a no-op ─────────────────────

    #[test]
    fn test_set_cursor_preserves_content() {
        let mut buf = GapBuffer::from("abcdef");
        for pos in [3, 0, 6, 2, 5] {
            buf.set_cursor(pos).unwrap();
            assert_eq!(buf.cursor(), pos);
            assert_eq!(buf.to_string(), "abcdef");
        }
    }

    #[test]
    fn test_set_cursor_at_end_is_append_position() {
        let mut buf = GapBuffer::from("ab");
        buf.set_cursor(2).unwrap();
        buf.insert(b"c");
        assert_eq!(buf.to_string(), "abc");
    }

    #[test]
    fn test_set_cursor_out_of_bounds() {
        let mut buf = GapBuffer::from("abc");
        assert!(buf.set_cursor(4).is_err());
    }

    // ── Removal ──────────────────────────────────────────────────────

    #[test]
    fn test_remove_backward() {
        let mut buf = GapBuffer::from("hello");
        buf.remove_backward(2).unwrap();
        assert_eq!(buf.to_string(), "hel");
        assert_eq!(buf.cursor(), 3);
    }

    #[test]
    fn test_remove_forward() {
        let mut buf = GapBuffer::from("hello");
        buf.set_cursor(0).unwrap();
        buf.remove_forward(2).unwrap();
        assert_eq!(buf.to_string(), "llo");
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn test_remove_backward_past_start_errors() {
        let mut buf = GapBuffer::from("ab");
        buf.set_cursor(1).unwrap();
        assert!(buf.remove_backward(2).is_err());
        assert_eq!(buf.to_string(), "ab");
    }

    #[test]
    fn test_remove_forward_past_end_errors() {
        let mut buf = GapBuffer::from("ab");
        buf.set_cursor(1).unwrap();
        assert!(buf.remove_forward(2).is_err());
        assert_eq!(buf.to_string(), "ab");
    }

    // ── Growth ───────────────────────────────────────────────────────

    #[test]
    fn test_growth_preserves_content() {
        let mut buf = GapBuffer::with_capacity(4);
        buf.insert(b"abcd");
        buf.set_cursor(2).unwrap();
        buf.insert(b"0123456789");
        assert_eq!(buf.to_string(), "ab0123456789cd");
    }

    #[test]
    fn test_growth_doubles_capacity() {
        let mut buf = GapBuffer::with_capacity(8);
        buf.insert(b"0123456789abcdef0");
        assert!(buf.capacity() >= buf.len());
        // Doubling from 8 keeps the capacity a power-of-two multiple.
        assert_eq!(buf.capacity() % 8, 0);
        assert!(buf.capacity().is_power_of_two());
    }

    #[test]
    fn test_large_insert() {
        let mut buf = GapBuffer::new();
        for i in 0..1000u32 {
            buf.insert(&[b'a' + (i % 26) as u8]);
        }
        assert_eq!(buf.len(), 1000);
        assert_eq!(buf.byte_at(999).unwrap(), b'a' + (999 % 26) as u8);
    }

    // ── Mark adjustment ──────────────────────────────────────────────

    #[test]
    fn test_mark_shifts_on_insert_before_it() {
        let mut buf = GapBuffer::from("hello");
        buf.set_mark(4).unwrap();
        buf.set_cursor(2).unwrap();
        buf.insert(b"XY");
        assert_eq!(buf.mark(), 6);
    }

    #[test]
    fn test_mark_unmoved_on_insert_after_it() {
        let mut buf = GapBuffer::from("hello");
        buf.set_mark(1).unwrap();
        buf.set_cursor(3).unwrap();
        buf.insert(b"XY");
        assert_eq!(buf.mark(), 1);
    }

    #[test]
    fn test_mark_shifts_on_remove_backward() {
        let mut buf = GapBuffer::from("hello");
        buf.set_mark(5).unwrap();
        buf.remove_backward(2).unwrap();
        assert_eq!(buf.mark(), 3);
    }

    #[test]
    fn test_mark_inside_removed_range_collapses() {
        let mut buf = GapBuffer::from("hello");
        buf.set_mark(4).unwrap();
        buf.remove_backward(3).unwrap();
        assert_eq!(buf.mark(), 2);
    }

    #[test]
    fn test_mark_shifts_on_remove_forward() {
        let mut buf = GapBuffer::from("hello");
        buf.set_cursor(1).unwrap();
        buf.set_mark(4).unwrap();
        buf.remove_forward(2).unwrap();
        assert_eq!(buf.mark(), 2);
    }

    #[test]
    fn test_selection_is_ordered() {
        let mut buf = GapBuffer::from("hello");
        buf.set_cursor(1).unwrap();
        buf.set_mark(4).unwrap();
        assert_eq!(buf.selection(), (1, 4));
        buf.set_mark(0).unwrap();
        assert_eq!(buf.selection(), (0, 1));
    }

    // ── slice, bytes, Display ────────────────────────────────────────

    #[test]
    fn test_slice() {
        let mut buf = GapBuffer::from("hello world");
        buf.set_cursor(5).unwrap();
        assert_eq!(buf.slice(0, 5).unwrap(), "hello");
        assert_eq!(buf.slice(6, 11).unwrap(), "world");
        assert_eq!(buf.slice(3, 3).unwrap(), "");
    }

    #[test]
    fn test_slice_out_of_bounds() {
        let buf = GapBuffer::from("hello");
        assert!(buf.slice(0, 100).is_err());
        assert!(buf.slice(3, 1).is_err());
    }

    #[test]
    fn test_bytes_iterator_spans_gap() {
        let mut buf = GapBuffer::from("abc");
        buf.set_cursor(1).unwrap();
        let collected: Vec<u8> = buf.bytes().collect();
        assert_eq!(collected, b"abc");
    }

    #[test]
    fn test_display_empty_buffer() {
        let buf = GapBuffer::new();
        assert_eq!(buf.to_string(), "");
    }

    #[test]
    fn test_arbitrary_bytes_round_trip() {
        let mut buf = GapBuffer::new();
        buf.insert(&[0xff, 0x00, 0x80]);
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.byte_at(0).unwrap(), 0xff);
        assert_eq!(buf.byte_at(1).unwrap(), 0x00);
        assert_eq!(buf.byte_at(2).unwrap(), 0x80);
    }

    // ── Model check against a naive string ───────────────────────────

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            SetCursor(usize),
            Insert(String),
            RemoveBackward(usize),
            RemoveForward(usize),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0..64usize).prop_map(Op::SetCursor),
                "[a-z \\n]{0,8}".prop_map(Op::Insert),
                (1..4usize).prop_map(Op::RemoveBackward),
                (1..4usize).prop_map(Op::RemoveForward),
            ]
        }

        proptest! {
            #[test]
            fn matches_naive_string_model(ops in proptest::collection::vec(op_strategy(), 0..40)) {
                let mut buf = GapBuffer::with_capacity(4);
                let mut model = String::new();
                let mut cursor = 0usize;

                for op in ops {
                    match op {
                        Op::SetCursor(pos) => {
                            let pos = pos.min(model.len());
                            buf.set_cursor(pos).unwrap();
                            cursor = pos;
                        }
                        Op::Insert(text) => {
                            buf.insert(text.as_bytes());
                            model.insert_str(cursor, &text);
                            cursor += text.len();
                        }
                        Op::RemoveBackward(n) => {
                            let n = n.min(cursor);
                            buf.remove_backward(n).unwrap();
                            model.drain(cursor - n..cursor);
                            cursor -= n;
                        }
                        Op::RemoveForward(n) => {
                            let n = n.min(model.len() - cursor);
                            buf.remove_forward(n).unwrap();
                            model.drain(cursor..cursor + n);
                        }
                    }
                    prop_assert_eq!(buf.to_string(), model.clone());
                    prop_assert_eq!(buf.cursor(), cursor);
                    prop_assert_eq!(buf.len(), model.len());
                }
            }

            #[test]
            fn capacity_stays_power_of_two_multiple(text in "[a-z]{0,200}") {
                let mut buf = GapBuffer::with_capacity(8);
                buf.insert(text.as_bytes());
                prop_assert!(buf.capacity() >= buf.len());
                prop_assert_eq!(buf.capacity() % 8, 0);
            }
        }
    }
}
