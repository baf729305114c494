//! Fixed-width overlapping windows over document text.
//!
//! Windows are measured in characters, not bytes, so multi-byte text never
//! splits inside a code point. Consecutive windows share `overlap` characters.

use crate::error::StoreError;

/// Window geometry for ingestion. Only [`WindowConfig::new`] and `Default`
/// build one, so `overlap < size` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
    size: usize,
    overlap: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            size: 1000,
            overlap: 200,
        }
    }
}

impl WindowConfig {
    /// Build a validated geometry.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidState` when `size` is zero or `overlap`
    /// is not smaller than `size`.
    pub fn new(size: usize, overlap: usize) -> Result<Self, StoreError> {
        if size == 0 {
            return Err(StoreError::InvalidState("window size must be positive".into()));
        }
        if overlap >= size {
            return Err(StoreError::InvalidState(format!(
                "window overlap {overlap} must be smaller than window size {size}"
            )));
        }
        Ok(Self { size, overlap })
    }

    #[must_use]
    pub const fn size(self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn overlap(self) -> usize {
        self.overlap
    }

    const fn step(self) -> usize {
        self.size - self.overlap
    }

    /// Split `text` into windows. Whitespace-only windows are dropped.
    #[must_use]
    pub fn split(self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut windows = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.size).min(chars.len());
            let window: String = chars[start..end].iter().collect();
            if !window.trim().is_empty() {
                windows.push(window);
            }
            if end == chars.len() {
                break;
            }
            start += self.step();
        }

        windows
    }
}
