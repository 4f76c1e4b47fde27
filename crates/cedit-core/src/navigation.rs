/// Line seeking, pixel mapping, and vertical cursor movement.
use anyhow::Result;

use crate::buffer::GapBuffer;
use crate::metrics::FontMetrics;

/// Direction of a vertical cursor move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalDirection {
    Up,
    Down,
}

/// A position in screen space, in pixels from the buffer origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPos {
    pub x: f32,
    pub y: f32,
}

/// Returns the position of the first byte of the line containing `pos`.
///
/// Scans backward until a newline or the buffer start. O(line length).
pub fn seek_line_start(buf: &GapBuffer, pos: usize) -> usize {
    let mut i = pos.min(buf.len());
    while i > 0 {
        if buf.get(i - 1) == Some(b'\n') {
            break;
        }
        i -= 1;
    }
    i
}

/// Returns the position just past the last byte of the line containing
/// `pos` (the newline itself, or the buffer end).
pub fn seek_line_end(buf: &GapBuffer, pos: usize) -> usize {
    let mut i = pos.min(buf.len());
    while let Some(b) = buf.get(i) {
        if b == b'\n' {
            break;
        }
        i += 1;
    }
    i
}

/// Maps a logical position to screen coordinates.
///
/// Accumulates per-byte-pair advances from the buffer start, resetting the
/// horizontal accumulator and stepping down one line height at each
/// newline. O(pos).
///
/// # Errors
///
/// Returns an error if the position is out of bounds.
pub fn screen_position(
    buf: &GapBuffer,
    metrics: &dyn FontMetrics,
    pos: usize,
) -> Result<ScreenPos> {
    if pos > buf.len() {
        anyhow::bail!(
            "position {} out of bounds (buffer has {} bytes)",
            pos,
            buf.len()
        );
    }
    let mut screen = ScreenPos::default();
    for i in 0..pos {
        let b = buf.byte_at(i)?;
        if b == b'\n' {
            screen.x = 0.0;
            screen.y += metrics.line_height();
        } else {
            screen.x += metrics.advance(b, buf.get(i + 1).unwrap_or(0));
        }
    }
    Ok(screen)
}

/// Moves `pos` one line up or down, landing on the byte whose pixel
/// position is nearest to `preferred_x`.
///
/// The target line is walked from its start, accumulating advances. When
/// the accumulated advance would pass `preferred_x`, whichever of the
/// undershoot and overshoot candidates is numerically closer in pixels
/// wins; ties stay left. If the line ends first, the move lands at the
/// line end. At the first or last line the position is returned unchanged.
///
/// # Errors
///
/// Returns an error if the position is out of bounds.
pub fn move_vertical(
    buf: &GapBuffer,
    metrics: &dyn FontMetrics,
    pos: usize,
    direction: VerticalDirection,
    preferred_x: f32,
) -> Result<usize> {
    if pos > buf.len() {
        anyhow::bail!(
            "position {} out of bounds (buffer has {} bytes)",
            pos,
            buf.len()
        );
    }
    let line_start = seek_line_start(buf, pos);
    let (target_start, target_end) = match direction {
        VerticalDirection::Up => {
            if line_start == 0 {
                return Ok(pos);
            }
            // The newline at line_start - 1 ends the line above.
            (seek_line_start(buf, line_start - 1), line_start - 1)
        }
        VerticalDirection::Down => {
            let line_end = seek_line_end(buf, pos);
            if line_end >= buf.len() {
                return Ok(pos);
            }
            let start = line_end + 1;
            (start, seek_line_end(buf, start))
        }
    };
    nearest_column(buf, metrics, target_start, target_end, preferred_x)
}

/// Walks a line accumulating pixel advances and returns the position
/// nearest to `target_x`.
fn nearest_column(
    buf: &GapBuffer,
    metrics: &dyn FontMetrics,
    start: usize,
    end: usize,
    target_x: f32,
) -> Result<usize> {
    let mut x = 0.0f32;
    let mut i = start;
    while i < end {
        let b = buf.byte_at(i)?;
        let advance = metrics.advance(b, buf.get(i + 1).unwrap_or(0));
        if x + advance > target_x {
            let undershoot = target_x - x;
            let overshoot = (x + advance) - target_x;
            if undershoot <= overshoot {
                return Ok(i);
            }
            return Ok(i + 1);
        }
        x += advance;
        i += 1;
    }
    Ok(end)
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Returns the start of the word at or before `pos`.
pub fn seek_word_left(buf: &GapBuffer, pos: usize) -> usize {
    let mut i = pos.min(buf.len());
    if i == 0 {
        return 0;
    }
    i -= 1;
    // Skip separators backwards
    while i > 0 {
        if is_word_byte(buf.byte_at(i).unwrap_or(b' ')) {
            break;
        }
        i -= 1;
    }
    // Skip word bytes backwards
    while i > 0 {
        if !is_word_byte(buf.byte_at(i - 1).unwrap_or(b' ')) {
            break;
        }
        i -= 1;
    }
    i
}

/// Returns the start of the next word after `pos`.
pub fn seek_word_right(buf: &GapBuffer, pos: usize) -> usize {
    let total = buf.len();
    let mut i = pos.min(total);
    // Skip current word bytes
    while i < total {
        if !is_word_byte(buf.byte_at(i).unwrap_or(b' ')) {
            break;
        }
        i += 1;
    }
    // Skip separators
    while i < total {
        if is_word_byte(buf.byte_at(i).unwrap_or(b' ')) {
            break;
        }
        i += 1;
    }
    i
}
