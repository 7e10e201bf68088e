//! The byte window supplied to the scanner by the driver.

/// An immutable view over one contiguous stretch of the captured file.
///
/// The driver owns the bytes; scanners only read them and report how many
/// they consumed. `file_offset` is the absolute position of `data[0]` in
/// the whole file, so `abs(i)` maps window-local indices to file offsets.
#[derive(Debug, Clone, Copy)]
pub struct ByteWindow<'a> {
    data: &'a [u8],
    file_offset: u64,
}

impl<'a> ByteWindow<'a> {
    /// Create a window over `data` starting at absolute offset `file_offset`.
    pub fn new(data: &'a [u8], file_offset: u64) -> Self {
        Self { data, file_offset }
    }

    /// The window's bytes.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Window length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Absolute file offset of `data[0]`.
    pub fn file_offset(&self) -> u64 {
        self.file_offset
    }

    /// Absolute file offset of the byte at window index `i`.
    pub fn abs(&self, i: usize) -> u64 {
        self.file_offset + i as u64
    }

    /// Bytes left in the window from index `at`.
    pub fn remaining(&self, at: usize) -> usize {
        self.data.len().saturating_sub(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_offsets() {
        let win = ByteWindow::new(b"abcdef", 1000);
        assert_eq!(win.abs(0), 1000);
        assert_eq!(win.abs(5), 1005);
        assert_eq!(win.len(), 6);
        assert_eq!(win.remaining(4), 2);
        assert_eq!(win.remaining(6), 0);
        assert_eq!(win.remaining(100), 0);
    }
}
