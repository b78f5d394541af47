use serde::{Deserialize, Serialize};

/// Source unit holding the injected standard library text.
pub const STDLIB_FILE: u32 = 1;
/// Source unit holding the user's text.
pub const USER_FILE: u32 = 0;

/// Byte-offset span in source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub file_id: u32,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end, file_id: USER_FILE }
    }

    pub fn with_file(start: usize, end: usize, file_id: u32) -> Self {
        Self { start, end, file_id }
    }

    pub fn is_stdlib(&self) -> bool {
        self.file_id == STDLIB_FILE
    }
}
