//! Document model combining the gap buffer with derived syntax analysis.
//!
//! A `Document` ties together a `GapBuffer` and the token, role, and
//! symbol caches derived from it. Every mutation re-tokenizes and
//! re-parses the whole buffer before returning, so readers (navigation,
//! rendering) always observe analysis state consistent with the current
//! content. The caches are disposable: they are rebuilt from scratch, not
//! patched.

use anyhow::Result;
use tracing::debug_span;

use cedit_core::navigation::{self, VerticalDirection};
use cedit_core::{FontMetrics, GapBuffer, ScreenPos};
use cedit_syntax::{parse, tokenize, SymbolTable, Token, TokenRole};

/// A cursor movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// A single document with its buffer and derived analysis state.
pub struct Document {
    buffer: GapBuffer,
    tokens: Vec<Token>,
    roles: Vec<TokenRole>,
    symbols: SymbolTable,
    /// Monotonically increasing version counter, bumped on every buffer
    /// mutation. Lets host caches detect changes without comparing
    /// content.
    content_version: u64,
    /// Pixel column remembered across consecutive vertical moves, so
    /// repeated up/down movement does not ratchet toward the left margin.
    /// Any horizontal move or edit resets it.
    preferred_x: Option<f32>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        let mut doc = Self::new();
        doc.insert_text(text);
        doc
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("buffer", &self.buffer)
            .field("token_count", &self.tokens.len())
            .field("content_version", &self.content_version)
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self {
            buffer: GapBuffer::new(),
            tokens: Vec::new(),
            roles: Vec::new(),
            symbols: SymbolTable::new(),
            content_version: 0,
            preferred_x: None,
        }
    }

    /// Bumps the content version counter.
    #[inline]
    fn bump_version(&mut self) {
        self.content_version = self.content_version.wrapping_add(1);
    }

    /// Rebuilds the token sequence, role table, and symbol table from the
    /// current buffer content.
    fn reanalyze(&mut self) {
        let span = debug_span!("reanalyze", version = self.content_version);
        let _guard = span.enter();
        self.tokens = tokenize(&self.buffer);
        let analysis = parse(&self.buffer, &self.tokens);
        self.roles = analysis.roles;
        self.symbols = analysis.symbols;
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Inserts text at the cursor and re-analyzes.
    pub fn insert_text(&mut self, text: &str) {
        self.insert_bytes(text.as_bytes());
    }

    /// Inserts raw bytes at the cursor and re-analyzes. Input is not
    /// required to be valid UTF-8.
    pub fn insert_bytes(&mut self, bytes: &[u8]) {
        self.buffer.insert(bytes);
        self.preferred_x = None;
        self.bump_version();
        self.reanalyze();
    }

    /// Deletes `n` bytes before the cursor and re-analyzes.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than `n` bytes precede the cursor.
    pub fn delete_backward(&mut self, n: usize) -> Result<()> {
        self.buffer.remove_backward(n)?;
        self.preferred_x = None;
        self.bump_version();
        self.reanalyze();
        Ok(())
    }

    /// Deletes `n` bytes after the cursor and re-analyzes.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than `n` bytes follow the cursor.
    pub fn delete_forward(&mut self, n: usize) -> Result<()> {
        self.buffer.remove_forward(n)?;
        self.preferred_x = None;
        self.bump_version();
        self.reanalyze();
        Ok(())
    }

    // ── Cursor and selection ─────────────────────────────────────────

    /// Moves the cursor to a logical position.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is out of bounds.
    pub fn set_cursor(&mut self, pos: usize) -> Result<()> {
        self.buffer.set_cursor(pos)?;
        self.preferred_x = None;
        Ok(())
    }

    /// Moves the mark to a logical position.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is out of bounds.
    pub fn set_mark(&mut self, pos: usize) -> Result<()> {
        self.buffer.set_mark(pos)
    }

    pub fn cursor(&self) -> usize {
        self.buffer.cursor()
    }

    pub fn mark(&self) -> usize {
        self.buffer.mark()
    }

    /// Returns the selection range as `(start, end)`, ordered.
    pub fn selection(&self) -> (usize, usize) {
        self.buffer.selection()
    }

    /// Moves the cursor one step in a direction.
    ///
    /// Horizontal moves step one byte and reset the remembered pixel
    /// column. Vertical moves capture the current pixel column on the
    /// first move of a run and keep it across consecutive moves, landing
    /// on the nearest pixel column of the target line.
    ///
    /// # Errors
    ///
    /// Returns an error if pixel mapping fails (cursor out of bounds,
    /// which the document never produces itself).
    pub fn move_cursor(&mut self, direction: Direction, metrics: &dyn FontMetrics) -> Result<()> {
        match direction {
            Direction::Left => {
                if self.buffer.cursor() > 0 {
                    let target = self.buffer.cursor() - 1;
                    self.buffer.set_cursor(target)?;
                }
                self.preferred_x = None;
            }
            Direction::Right => {
                if self.buffer.cursor() < self.buffer.len() {
                    let target = self.buffer.cursor() + 1;
                    self.buffer.set_cursor(target)?;
                }
                self.preferred_x = None;
            }
            Direction::Up | Direction::Down => {
                let x = match self.preferred_x {
                    Some(x) => x,
                    None => {
                        navigation::screen_position(&self.buffer, metrics, self.buffer.cursor())?.x
                    }
                };
                let vertical = if direction == Direction::Up {
                    VerticalDirection::Up
                } else {
                    VerticalDirection::Down
                };
                let target = navigation::move_vertical(
                    &self.buffer,
                    metrics,
                    self.buffer.cursor(),
                    vertical,
                    x,
                )?;
                self.buffer.set_cursor(target)?;
                self.preferred_x = Some(x);
            }
        }
        Ok(())
    }

    /// Moves the cursor to the start of the current line.
    pub fn move_line_start(&mut self) -> Result<()> {
        let target = navigation::seek_line_start(&self.buffer, self.buffer.cursor());
        self.buffer.set_cursor(target)?;
        self.preferred_x = None;
        Ok(())
    }

    /// Moves the cursor to the end of the current line.
    pub fn move_line_end(&mut self) -> Result<()> {
        let target = navigation::seek_line_end(&self.buffer, self.buffer.cursor());
        self.buffer.set_cursor(target)?;
        self.preferred_x = None;
        Ok(())
    }

    /// Moves the cursor to the start of the previous word.
    pub fn move_word_left(&mut self) -> Result<()> {
        let target = navigation::seek_word_left(&self.buffer, self.buffer.cursor());
        self.buffer.set_cursor(target)?;
        self.preferred_x = None;
        Ok(())
    }

    /// Moves the cursor to the start of the next word.
    pub fn move_word_right(&mut self) -> Result<()> {
        let target = navigation::seek_word_right(&self.buffer, self.buffer.cursor());
        self.buffer.set_cursor(target)?;
        self.preferred_x = None;
        Ok(())
    }

    // ── Read-only surface for the renderer ───────────────────────────

    /// Buffer length in bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the byte at a logical position.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is out of bounds.
    pub fn byte_at(&self, pos: usize) -> Result<u8> {
        self.buffer.byte_at(pos)
    }

    /// Returns the whole buffer content, decoded lossily.
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// The current token sequence. Spans tile the buffer exactly.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The role side table, one entry per token.
    pub fn roles(&self) -> &[TokenRole] {
        &self.roles
    }

    /// Role of the token at `index`, or `None` past the end.
    pub fn token_role(&self, index: usize) -> Option<TokenRole> {
        self.roles.get(index).copied()
    }

    /// The symbol table built by the last parse.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn content_version(&self) -> u64 {
        self.content_version
    }

    /// Screen coordinates of the cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if pixel mapping fails.
    pub fn screen_position(&self, metrics: &dyn FontMetrics) -> Result<ScreenPos> {
        navigation::screen_position(&self.buffer, metrics, self.buffer.cursor())
    }

    /// Screen coordinates of an arbitrary logical position.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is out of bounds.
    pub fn screen_position_at(&self, metrics: &dyn FontMetrics, pos: usize) -> Result<ScreenPos> {
        navigation::screen_position(&self.buffer, metrics, pos)
    }
}
