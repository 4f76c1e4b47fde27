pub mod document;

pub use document::{Direction, Document};

pub use cedit_core::{FontMetrics, GapBuffer, Monospace, ScreenPos};
pub use cedit_syntax::{Token, TokenKind, TokenRole};
